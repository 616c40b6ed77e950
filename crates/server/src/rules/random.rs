use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use realm_engine::rules::RandomUtils;

pub struct StdRandomUtils {
    rng: StdRng,
}

impl StdRandomUtils {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl RandomUtils for StdRandomUtils {
    fn next_int(&mut self, bound: usize) -> usize {
        self.rng.gen_range(0..bound)
    }
}
