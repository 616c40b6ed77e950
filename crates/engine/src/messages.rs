//! Incremental messages pushed to human players' clients.
//!
//! Each message describes one change to the player's memory, so the client
//! copy stays in step with the server-side copy without resending the world.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::world::city::{OverlandMapCity, TerrainData};
use crate::world::combat::CombatMap;
use crate::world::position::MapCoords3D;
use crate::world::spell::{MemoryCombatAreaEffect, MemoryMaintainedSpell};
use crate::world::unit::{MemoryUnit, UnitStatus};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ServerMessage {
    /// `new_status` of `None` means "forget this unit entirely".
    KillUnit {
        unit_urn: u32,
        new_status: Option<UnitStatus>,
    },
    SwitchOffSpell {
        spell_urn: u32,
    },
    RemoveCombatAreaEffect {
        cae_urn: u32,
    },
    UpdateCity {
        location: MapCoords3D,
        city: Option<OverlandMapCity>,
    },
    UpdateCombatMap {
        combat_location: MapCoords3D,
        combat_map: CombatMap,
    },
    FogOfWarVisibleAreaChanged {
        revealed: Vec<(MapCoords3D, TerrainData)>,
        hidden: Vec<MapCoords3D>,
        units_added: Vec<MemoryUnit>,
        units_removed: Vec<u32>,
        spells_added: Vec<MemoryMaintainedSpell>,
        combat_area_effects_added: Vec<MemoryCombatAreaEffect>,
    },
}

/// Outbound half of a human player's connection.
///
/// Sends are fire-and-forget from the engine's point of view; a failure is
/// reported upward and never retried here.
pub trait ClientConnection {
    fn send(&mut self, message: ServerMessage) -> Result<()>;
}
