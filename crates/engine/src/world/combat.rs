use serde::{Deserialize, Serialize};

use super::player::PlayerId;
use super::position::{CombatPosition, MapCoords3D};
use super::unit::HeroItem;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatMapTile {
    pub tile_type_id: String,
    /// Border features drawn around the tile (city walls, wall of fire, ...).
    #[serde(default)]
    pub borders: Vec<String>,
}

/// The tactical map a combat is fought on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatMap {
    pub width: i32,
    pub height: i32,
    tiles: Vec<CombatMapTile>,
}

impl CombatMap {
    pub fn new_filled(width: i32, height: i32, tile_type_id: &str) -> Self {
        let tile = CombatMapTile {
            tile_type_id: tile_type_id.to_string(),
            borders: Vec::new(),
        };
        Self {
            width,
            height,
            tiles: vec![tile; (width.max(0) * height.max(0)) as usize],
        }
    }

    fn index(&self, pos: CombatPosition) -> Option<usize> {
        if pos.x < 0 || pos.y < 0 || pos.x >= self.width || pos.y >= self.height {
            return None;
        }
        Some((pos.y * self.width + pos.x) as usize)
    }

    pub fn tile(&self, pos: CombatPosition) -> Option<&CombatMapTile> {
        self.index(pos).map(|i| &self.tiles[i])
    }

    pub fn tile_mut(&mut self, pos: CombatPosition) -> Option<&mut CombatMapTile> {
        self.index(pos).map(|i| &mut self.tiles[i])
    }

    pub fn tiles_mut(&mut self) -> impl Iterator<Item = &mut CombatMapTile> {
        self.tiles.iter_mut()
    }
}

/// A combat in progress at one overland location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatDetails {
    pub combat_location: MapCoords3D,
    /// Either side may be unresolved while the combat is being set up.
    pub attacking_player_id: Option<PlayerId>,
    pub defending_player_id: Option<PlayerId>,
    pub combat_map: CombatMap,
    /// Loot pool: items dropped by heroes who died here, claimed by the winner.
    #[serde(default)]
    pub items_from_heroes_who_died_in_combat: Vec<HeroItem>,
}

impl CombatDetails {
    pub fn is_combatant(&self, player: PlayerId) -> bool {
        self.attacking_player_id == Some(player) || self.defending_player_id == Some(player)
    }
}
