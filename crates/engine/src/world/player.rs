use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::FogOfWarMemory;
use super::map::{MapSize, MapVolume};
use super::position::MapCoords3D;
use crate::error::Result;
use crate::messages::{ClientConnection, ServerMessage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub i32);

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "player {}", self.0)
    }
}

/// What a player currently knows about one map cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FogOfWarState {
    #[default]
    NeverSeen,
    /// Seen before; the player's memory of it may be stale.
    HaveSeen,
    CanSee,
}

/// A unit stack's queued overland move, executed at end of turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingMovement {
    pub unit_stack: Vec<u32>,
    pub destination: MapCoords3D,
}

/// Everything the server holds about one player.
pub struct PlayerServerDetails {
    pub player_id: PlayerId,
    pub name: String,
    pub human: bool,
    pub tax_rate_id: String,
    /// Server-side copy of what this player's client currently believes.
    pub memory: FogOfWarMemory,
    pub fog_of_war: MapVolume<FogOfWarState>,
    pub pending_movements: Vec<PendingMovement>,
    /// Per-turn production/consumption totals keyed by production type.
    pub production: BTreeMap<String, i32>,
    /// Live client connection; only human players have one.
    pub connection: Option<Box<dyn ClientConnection>>,
}

impl PlayerServerDetails {
    pub fn new(player_id: PlayerId, name: &str, human: bool, tax_rate_id: &str, map_size: MapSize) -> Self {
        Self {
            player_id,
            name: name.to_string(),
            human,
            tax_rate_id: tax_rate_id.to_string(),
            memory: FogOfWarMemory::new(map_size),
            fog_of_war: MapVolume::new(map_size),
            pending_movements: Vec::new(),
            production: BTreeMap::new(),
            connection: None,
        }
    }

    pub fn with_connection(mut self, connection: Box<dyn ClientConnection>) -> Self {
        self.connection = Some(connection);
        self
    }

    pub fn can_see_cell(&self, coords: MapCoords3D) -> bool {
        self.fog_of_war.get(coords) == Some(&FogOfWarState::CanSee)
    }

    /// Remove a unit from every pending move, dropping moves left with no units.
    pub fn remove_unit_from_pending_movements(&mut self, unit_urn: u32) {
        for movement in &mut self.pending_movements {
            movement.unit_stack.retain(|urn| *urn != unit_urn);
        }
        self.pending_movements.retain(|m| !m.unit_stack.is_empty());
    }

    /// Send to this player's client, if they have one. AI players are a no-op.
    pub fn send(&mut self, message: ServerMessage) -> Result<()> {
        match self.connection.as_mut() {
            Some(connection) if self.human => connection.send(message),
            _ => Ok(()),
        }
    }
}

impl std::fmt::Debug for PlayerServerDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerServerDetails")
            .field("player_id", &self.player_id)
            .field("name", &self.name)
            .field("human", &self.human)
            .field("connected", &self.connection.is_some())
            .finish_non_exhaustive()
    }
}
