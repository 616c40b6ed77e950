use serde::{Deserialize, Serialize};

use super::player::PlayerId;
use super::position::{CombatPosition, MapCoords3D};

/// Lifecycle state of a unit, as held in the true map or in a player's memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitStatus {
    Alive,
    /// Killed, but kept around so it can be healed or resurrected.
    Dead,
    /// A hero not currently in play; available to be summoned again.
    Generated,
    /// Disbanded because the owner could not pay its upkeep. Only ever sent to
    /// the owner's client so it can explain why the unit vanished.
    KilledByLackOfProduction,
}

/// An item equipped by a hero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeroItem {
    pub hero_item_urn: u32,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeroItemSlot {
    pub hero_item: Option<HeroItem>,
}

/// One unit instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryUnit {
    pub unit_urn: u32,
    pub unit_id: String,
    pub owning_player_id: PlayerId,
    pub status: UnitStatus,
    pub unit_location: Option<MapCoords3D>,
    /// Set while the unit takes part in a combat; the overland cell the combat is at.
    pub combat_location: Option<MapCoords3D>,
    pub combat_position: Option<CombatPosition>,
    /// Total hit points lost across all figures.
    #[serde(default)]
    pub damage_taken: i32,
    #[serde(default)]
    pub hero_item_slots: Vec<HeroItemSlot>,
}

impl MemoryUnit {
    pub fn new(unit_urn: u32, unit_id: &str, owner: PlayerId, location: MapCoords3D) -> Self {
        Self {
            unit_urn,
            unit_id: unit_id.to_string(),
            owning_player_id: owner,
            status: UnitStatus::Alive,
            unit_location: Some(location),
            combat_location: None,
            combat_position: None,
            damage_taken: 0,
            hero_item_slots: Vec::new(),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.status == UnitStatus::Alive
    }
}
