//! Session persistence as JSON files.
//!
//! A save directory holds `true_map.json` plus one `player_<id>.json` per
//! player with that player's memory and fog of war. Connections are never
//! saved.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use realm_engine::world::map::MapVolume;
use realm_engine::world::player::{FogOfWarState, PendingMovement, PlayerId, PlayerServerDetails};
use realm_engine::world::{FogOfWarMemory, ServerWorld};

const TRUE_MAP_FILE: &str = "true_map.json";

fn player_file(player_id: PlayerId) -> String {
    format!("player_{}.json", player_id.0)
}

#[derive(Serialize, Deserialize, Debug)]
struct PlayerSave {
    player_id: PlayerId,
    name: String,
    human: bool,
    tax_rate_id: String,
    memory: FogOfWarMemory,
    fog_of_war: MapVolume<FogOfWarState>,
    pending_movements: Vec<PendingMovement>,
    production: BTreeMap<String, i32>,
}

impl PlayerSave {
    fn from_player(player: &PlayerServerDetails) -> Self {
        Self {
            player_id: player.player_id,
            name: player.name.clone(),
            human: player.human,
            tax_rate_id: player.tax_rate_id.clone(),
            memory: player.memory.clone(),
            fog_of_war: player.fog_of_war.clone(),
            pending_movements: player.pending_movements.clone(),
            production: player.production.clone(),
        }
    }

    fn restore_into(self, player: &mut PlayerServerDetails) {
        player.name = self.name;
        player.human = self.human;
        player.tax_rate_id = self.tax_rate_id;
        player.memory = self.memory;
        player.fog_of_war = self.fog_of_war;
        player.pending_movements = self.pending_movements;
        player.production = self.production;
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(value).with_context(|| format!("serializing {}", path.display()))?;
    fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("parsing {}", path.display()))
}

// ── Save ─────────────────────────────────────────────────────────────────────

/// Write the true map and every player's memory under `dir`. Returns the number of files written.
pub fn save_session(world: &ServerWorld, dir: &Path) -> Result<usize> {
    let start = Instant::now();
    fs::create_dir_all(dir).with_context(|| format!("creating save directory {}", dir.display()))?;

    write_json(&dir.join(TRUE_MAP_FILE), &world.true_map)?;
    let mut files = 1;
    for player in world.players.values() {
        write_json(&dir.join(player_file(player.player_id)), &PlayerSave::from_player(player))?;
        files += 1;
    }

    tracing::info!(
        "Session saved to {}: {} files ({:.2?})",
        dir.display(),
        files,
        start.elapsed()
    );
    Ok(files)
}

// ── Load ─────────────────────────────────────────────────────────────────────

/// Restore a save from `dir` into `world`. Returns the number of files loaded,
/// or 0 if `dir` holds no save.
///
/// Players already in `world` keep their connection; players only in the save
/// are added without one.
pub fn load_into(world: &mut ServerWorld, dir: &Path) -> Result<usize> {
    let true_map_path = dir.join(TRUE_MAP_FILE);
    if !true_map_path.is_file() {
        return Ok(0);
    }

    let start = Instant::now();
    let true_map: FogOfWarMemory = read_json(&true_map_path)?;
    anyhow::ensure!(
        true_map.map.size() == world.map_size(),
        "{}: saved map is {:?}, session map is {:?}",
        true_map_path.display(),
        true_map.map.size(),
        world.map_size()
    );
    world.true_map = true_map;
    let mut files = 1;

    for entry in fs::read_dir(dir).with_context(|| format!("listing {}", dir.display()))? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !(name.starts_with("player_") && name.ends_with(".json")) {
            continue;
        }

        let save: PlayerSave = read_json(&path)?;
        anyhow::ensure!(
            save.memory.map.size() == world.map_size() && save.fog_of_war.size() == world.map_size(),
            "{}: saved memory is {:?} with fog of war {:?}, session map is {:?}",
            path.display(),
            save.memory.map.size(),
            save.fog_of_war.size(),
            world.map_size()
        );
        match world.players.get_mut(&save.player_id) {
            Some(player) => save.restore_into(player),
            None => {
                let mut player =
                    PlayerServerDetails::new(save.player_id, &save.name, save.human, &save.tax_rate_id, world.map_size());
                save.restore_into(&mut player);
                world.add_player(player);
            }
        }
        files += 1;
    }

    tracing::info!(
        "Session loaded from {}: {} files ({:.2?})",
        dir.display(),
        files,
        start.elapsed()
    );
    Ok(files)
}
