pub mod city;
pub mod combat;
pub mod map;
pub mod player;
pub mod position;
pub mod spell;
pub mod unit;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Result, UpdateError};
use city::{MemoryGridCell, OverlandMapCity};
use combat::CombatDetails;
use map::{MapSize, MapVolume};
use player::{PlayerId, PlayerServerDetails};
use position::MapCoords3D;
use spell::{MemoryCombatAreaEffect, MemoryMaintainedSpell};
use unit::MemoryUnit;

/// One copy of the world's entities.
///
/// The server keeps one of these as the authoritative true map, plus one per
/// player holding exactly what that player's client has been told.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FogOfWarMemory {
    pub map: MapVolume<MemoryGridCell>,
    pub units: Vec<MemoryUnit>,
    pub spells: Vec<MemoryMaintainedSpell>,
    pub combat_area_effects: Vec<MemoryCombatAreaEffect>,
}

impl FogOfWarMemory {
    pub fn new(size: MapSize) -> Self {
        Self {
            map: MapVolume::new(size),
            units: Vec::new(),
            spells: Vec::new(),
            combat_area_effects: Vec::new(),
        }
    }

    pub fn find_unit(&self, unit_urn: u32) -> Option<&MemoryUnit> {
        self.units.iter().find(|u| u.unit_urn == unit_urn)
    }

    pub fn find_unit_mut(&mut self, unit_urn: u32) -> Option<&mut MemoryUnit> {
        self.units.iter_mut().find(|u| u.unit_urn == unit_urn)
    }

    pub fn remove_unit(&mut self, unit_urn: u32) -> Option<MemoryUnit> {
        let index = self.units.iter().position(|u| u.unit_urn == unit_urn)?;
        Some(self.units.remove(index))
    }

    pub fn find_spell(&self, spell_urn: u32) -> Option<&MemoryMaintainedSpell> {
        self.spells.iter().find(|s| s.spell_urn == spell_urn)
    }

    pub fn remove_spell(&mut self, spell_urn: u32) -> Option<MemoryMaintainedSpell> {
        let index = self.spells.iter().position(|s| s.spell_urn == spell_urn)?;
        Some(self.spells.remove(index))
    }

    pub fn find_combat_area_effect(&self, cae_urn: u32) -> Option<&MemoryCombatAreaEffect> {
        self.combat_area_effects.iter().find(|c| c.cae_urn == cae_urn)
    }

    /// Find a live instance of a combat area effect by what it is, where, and whose.
    pub fn find_combat_area_effect_instance(
        &self,
        combat_area_effect_id: &str,
        map_location: Option<MapCoords3D>,
        casting_player_id: Option<PlayerId>,
    ) -> Option<&MemoryCombatAreaEffect> {
        self.combat_area_effects.iter().find(|c| {
            c.combat_area_effect_id == combat_area_effect_id
                && c.map_location == map_location
                && c.casting_player_id == casting_player_id
        })
    }

    pub fn remove_combat_area_effect(&mut self, cae_urn: u32) -> Option<MemoryCombatAreaEffect> {
        let index = self.combat_area_effects.iter().position(|c| c.cae_urn == cae_urn)?;
        Some(self.combat_area_effects.remove(index))
    }

    pub fn cell(&self, coords: MapCoords3D) -> Result<&MemoryGridCell> {
        self.map
            .get(coords)
            .ok_or_else(|| UpdateError::Logic(format!("map location {coords} is outside the map")))
    }

    pub fn cell_mut(&mut self, coords: MapCoords3D) -> Result<&mut MemoryGridCell> {
        self.map
            .get_mut(coords)
            .ok_or_else(|| UpdateError::Logic(format!("map location {coords} is outside the map")))
    }

    pub fn city(&self, coords: MapCoords3D) -> Option<&OverlandMapCity> {
        self.map.get(coords).and_then(|cell| cell.terrain.city.as_ref())
    }
}

/// The session's authoritative state: true map, every player, and any combats in progress.
#[derive(Debug)]
pub struct ServerWorld {
    pub true_map: FogOfWarMemory,
    pub players: IndexMap<PlayerId, PlayerServerDetails>,
    pub combats: Vec<CombatDetails>,
}

impl ServerWorld {
    pub fn new(size: MapSize) -> Self {
        Self {
            true_map: FogOfWarMemory::new(size),
            players: IndexMap::new(),
            combats: Vec::new(),
        }
    }

    pub fn map_size(&self) -> MapSize {
        self.true_map.map.size()
    }

    pub fn add_player(&mut self, player: PlayerServerDetails) {
        self.players.insert(player.player_id, player);
    }

    pub fn player_ids(&self) -> Vec<PlayerId> {
        self.players.keys().copied().collect()
    }

    pub fn player(&self, player_id: PlayerId, caller: &'static str) -> Result<&PlayerServerDetails> {
        self.players
            .get(&player_id)
            .ok_or_else(|| UpdateError::not_found("player", player_id.0, caller))
    }

    pub fn player_mut(&mut self, player_id: PlayerId, caller: &'static str) -> Result<&mut PlayerServerDetails> {
        self.players
            .get_mut(&player_id)
            .ok_or_else(|| UpdateError::not_found("player", player_id.0, caller))
    }

    pub fn find_combat(&self, location: MapCoords3D) -> Option<&CombatDetails> {
        self.combats.iter().find(|c| c.combat_location == location)
    }

    pub fn find_combat_mut(&mut self, location: MapCoords3D, caller: &'static str) -> Result<&mut CombatDetails> {
        self.combats
            .iter_mut()
            .find(|c| c.combat_location == location)
            .ok_or_else(|| UpdateError::not_found("combat", location, caller))
    }
}
