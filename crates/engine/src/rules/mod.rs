//! The seams between the update engine and the game's calculation rules.
//!
//! World updates decide *what* has to change and *who* must be told; how a
//! city's rebels are counted or which cells a player can see is delegated to
//! these traits. The server supplies the standard implementations; tests
//! supply recording fakes.

pub mod database;

use std::collections::BTreeSet;

use crate::error::Result;
use crate::world::ServerWorld;
use crate::world::FogOfWarMemory;
use crate::world::city::OverlandMapCity;
use crate::world::combat::{CombatMap, CombatMapTile};
use crate::world::player::PlayerId;
use crate::world::position::MapCoords3D;
use crate::world::spell::{MemoryCombatAreaEffect, MemoryMaintainedSpell};
use crate::world::unit::MemoryUnit;
use database::{Database, LifeformType};

/// A unit with every skill and stat derived from its definition, the spells
/// on it, and the combat area effects around it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandedUnitDetails {
    pub unit_urn: u32,
    pub unit_id: String,
    pub owning_player_id: PlayerId,
    pub lifeform_type: LifeformType,
    pub skills: BTreeSet<String>,
    pub transport_capacity: i32,
    pub alive_figure_count: i32,
}

impl ExpandedUnitDetails {
    pub fn is_transport(&self) -> bool {
        self.transport_capacity > 0
    }
}

/// "Can player P currently see X". Pure queries, evaluated against the true map.
pub trait Visibility {
    fn can_see_unit(&self, world: &ServerWorld, unit: &MemoryUnit, player: PlayerId) -> bool;

    fn can_see_spell(&self, world: &ServerWorld, spell: &MemoryMaintainedSpell, player: PlayerId) -> bool;

    fn can_see_combat_area_effect(
        &self,
        world: &ServerWorld,
        cae: &MemoryCombatAreaEffect,
        player: PlayerId,
    ) -> bool;

    fn can_see_city(&self, world: &ServerWorld, location: MapCoords3D, player: PlayerId) -> bool;
}

pub trait UnitCalculations {
    fn expand_unit(&self, world: &ServerWorld, unit: &MemoryUnit, db: &Database) -> Result<ExpandedUnitDetails>;

    /// Cost for `unit` to enter a tile of `tile_type_id` while stacked with
    /// units holding `stack_skills`. `None` means the tile is impassable.
    fn movement_cost_to_enter(
        &self,
        unit: &ExpandedUnitDetails,
        stack_skills: &BTreeSet<String>,
        tile_type_id: &str,
        db: &Database,
    ) -> Result<Option<i32>>;

    /// Whether `unit` may legally stand on `tile` of a combat map.
    fn can_occupy_combat_tile(
        &self,
        unit: &ExpandedUnitDetails,
        tile: &CombatMapTile,
        db: &Database,
    ) -> Result<bool>;
}

pub trait CityCalculations {
    fn city_size_id(&self, city: &OverlandMapCity, db: &Database) -> Result<Option<String>>;

    fn minimum_farmers(&self, world: &ServerWorld, location: MapCoords3D, db: &Database) -> Result<i32>;

    fn number_of_rebels(
        &self,
        world: &ServerWorld,
        location: MapCoords3D,
        tax_rate_id: &str,
        db: &Database,
    ) -> Result<i32>;
}

pub trait ProductionCalculations {
    /// Recompute a player's per-turn production and consumption totals from scratch.
    fn recalculate_global_production_values(
        &self,
        world: &mut ServerWorld,
        player: PlayerId,
        db: &Database,
    ) -> Result<()>;
}

pub trait FogOfWarProcessing {
    /// Recompute a player's visible area, update their memory, and push the
    /// difference to their client.
    fn update_and_send_fog_of_war(&self, world: &mut ServerWorld, player: PlayerId, db: &Database) -> Result<()>;
}

pub trait CombatMapGenerator {
    /// Rebuild tile borders after a terrain-altering spell at `combat_location`
    /// has been removed from `true_map`.
    fn regenerate_borders(
        &self,
        true_map: &FogOfWarMemory,
        combat_location: MapCoords3D,
        combat_map: &mut CombatMap,
        db: &Database,
    ) -> Result<()>;
}

pub trait RandomUtils {
    /// Uniform in `0..bound`. `bound` is never zero.
    fn next_int(&mut self, bound: usize) -> usize;
}

/// Every collaborator a world update may call, bundled so a session can hand
/// them to the queue in one piece.
pub struct UpdateServices {
    pub visibility: Box<dyn Visibility>,
    pub units: Box<dyn UnitCalculations>,
    pub cities: Box<dyn CityCalculations>,
    pub production: Box<dyn ProductionCalculations>,
    pub fog_of_war: Box<dyn FogOfWarProcessing>,
    pub combat_map: Box<dyn CombatMapGenerator>,
    pub random: Box<dyn RandomUtils>,
}
