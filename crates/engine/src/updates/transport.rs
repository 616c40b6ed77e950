use std::collections::BTreeSet;

use super::kill_unit::KillUnitAction;
use super::queue::WorldUpdates;
use super::update::{UpdateContext, WorldUpdateResult};
use crate::error::{Result, UpdateError};
use crate::rules::ExpandedUnitDetails;
use crate::world::ServerWorld;
use crate::world::position::MapCoords3D;

const CALLER: &str = "RecheckTransportCapacityUpdate";

/// Check that the units on one cell can still all stay there.
///
/// Skills like flight are shared by the whole stack. A transport stranded on
/// terrain it can't enter sinks; if the remaining transports can't carry every
/// unit that can't enter the terrain itself, randomly chosen ones drown until
/// the rest fit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecheckTransportCapacityUpdate {
    pub map_location: MapCoords3D,
}

impl RecheckTransportCapacityUpdate {
    pub fn new(map_location: MapCoords3D) -> Self {
        Self { map_location }
    }

    pub(super) fn process(
        &mut self,
        ctx: &mut UpdateContext<'_>,
        queue: &mut WorldUpdates,
    ) -> Result<WorldUpdateResult> {
        let tile_type_id = ctx
            .world
            .true_map
            .cell(self.map_location)?
            .terrain
            .tile_type_id
            .clone()
            .ok_or_else(|| UpdateError::not_found("tile type at", self.map_location, CALLER))?;

        let world: &ServerWorld = ctx.world;
        let calculations = &ctx.services.units;
        let db = ctx.db;
        let stack = world
            .true_map
            .units
            .iter()
            .filter(|u| u.is_alive() && u.unit_location == Some(self.map_location))
            .map(|u| calculations.expand_unit(world, u, db))
            .collect::<Result<Vec<ExpandedUnitDetails>>>()?;

        let stack_skills: BTreeSet<String> = stack.iter().flat_map(|xu| xu.skills.iter().cloned()).collect();

        let mut added = false;
        let mut space_required: i32 = 0;
        let mut stranded = Vec::new();

        for xu in &stack {
            let impassable = ctx
                .services
                .units
                .movement_cost_to_enter(xu, &stack_skills, &tile_type_id, ctx.db)?
                .is_none();

            if xu.is_transport() {
                if impassable {
                    added |= queue.add_kill_unit(xu.unit_urn, KillUnitAction::HealableOverlandDamage);
                } else {
                    space_required -= xu.transport_capacity;
                }
            } else if impassable {
                space_required += 1;
                stranded.push(xu.unit_urn);
            }
        }

        while space_required > 0 && !stranded.is_empty() {
            let index = ctx.services.random.next_int(stranded.len());
            let unit_urn = stranded.remove(index);
            tracing::debug!(
                "Unit {} drowns at {}: not enough transport capacity",
                unit_urn,
                self.map_location
            );
            added |= queue.add_kill_unit(unit_urn, KillUnitAction::HealableOverlandDamage);
            space_required -= 1;
        }

        Ok(WorldUpdateResult::done(added))
    }
}
