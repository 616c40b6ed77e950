//! The game rules the session plugs into the world update engine.

pub mod cities;
pub mod combat_map;
pub mod fog_of_war;
pub mod random;
pub mod units;
pub mod visibility;

use realm_engine::rules::UpdateServices;

use crate::config::SessionConfig;

/// The standard rule set, seeded from `config` when it fixes a seed.
pub fn standard(config: &SessionConfig) -> UpdateServices {
    let random = match config.random_seed {
        Some(seed) => random::StdRandomUtils::seeded(seed),
        None => random::StdRandomUtils::from_entropy(),
    };
    UpdateServices {
        visibility: Box::new(visibility::FogOfWarVisibility),
        units: Box::new(units::StandardUnitCalculations),
        cities: Box::new(cities::StandardCityCalculations),
        production: Box::new(cities::StandardProductionCalculations),
        fog_of_war: Box::new(fog_of_war::StandardFogOfWarProcessing::new(config.fog_of_war)),
        combat_map: Box::new(combat_map::StandardCombatMapGenerator),
        random: Box::new(random),
    }
}
