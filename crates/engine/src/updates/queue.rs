use std::collections::VecDeque;

use super::kill_unit::{KillUnitAction, KillUnitUpdate};
use super::recalculate::{RecalculateCityUpdate, RecalculateFogOfWarUpdate, RecalculateProductionUpdate};
use super::remove_cae::RemoveCombatAreaEffectUpdate;
use super::switch_off_spell::SwitchOffSpellUpdate;
use super::transport::RecheckTransportCapacityUpdate;
use super::update::{UpdateContext, WorldUpdate, WorldUpdateResult};
use crate::error::{Result, UpdateError};
use crate::world::player::PlayerId;
use crate::world::position::MapCoords3D;

/// Safety bound on update invocations within one `process` call.
pub const DEFAULT_MAX_INVOCATIONS: usize = 100_000;

/// The session's pending world updates.
///
/// Game logic registers root events with the `add_*` methods, then calls
/// [`process`](Self::process), which drains the queue to a fixed point:
/// updates run in [`KindOfWorldUpdate`](super::kind::KindOfWorldUpdate) order
/// and may queue further updates as they go.
///
/// Invariant: no two pending updates are equal. The `add_*` methods are the
/// only way in and each checks for a duplicate first.
#[derive(Debug)]
pub struct WorldUpdates {
    updates: VecDeque<WorldUpdate>,
    /// The update currently being processed. Still counts for deduplication.
    in_progress: Option<WorldUpdate>,
    max_invocations: usize,
}

impl WorldUpdates {
    pub fn new() -> Self {
        Self {
            updates: VecDeque::new(),
            in_progress: None,
            max_invocations: DEFAULT_MAX_INVOCATIONS,
        }
    }

    pub fn with_max_invocations(mut self, max_invocations: usize) -> Self {
        self.max_invocations = max_invocations;
        self
    }

    // ── Registration ────────────────────────────────────────────────────

    /// Queue `update` unless an equal one is already pending. Returns whether it was added.
    pub fn add(&mut self, update: WorldUpdate) -> bool {
        if self.contains(&update) {
            tracing::trace!("Suppressed duplicate {}", update);
            return false;
        }
        self.updates.push_back(update);
        true
    }

    pub fn add_kill_unit(&mut self, unit_urn: u32, action: KillUnitAction) -> bool {
        self.add(WorldUpdate::KillUnit(KillUnitUpdate::new(unit_urn, action)))
    }

    pub fn add_remove_combat_area_effect(&mut self, cae_urn: u32) -> bool {
        self.add(WorldUpdate::RemoveCombatAreaEffect(RemoveCombatAreaEffectUpdate::new(cae_urn)))
    }

    /// Switch off a spell, also removing it from the true map.
    pub fn add_switch_off_spell(&mut self, spell_urn: u32) -> bool {
        self.add_switch_off_spell_with_retention(spell_urn, false)
    }

    /// Switch off a spell for every player; with `retain_spell_in_server_true_memory`
    /// the true map keeps it (the target may yet be resurrected).
    pub fn add_switch_off_spell_with_retention(
        &mut self,
        spell_urn: u32,
        retain_spell_in_server_true_memory: bool,
    ) -> bool {
        self.add(WorldUpdate::SwitchOffSpell(SwitchOffSpellUpdate::new(
            spell_urn,
            retain_spell_in_server_true_memory,
        )))
    }

    pub fn add_recheck_transport_capacity(&mut self, map_location: MapCoords3D) -> bool {
        self.add(WorldUpdate::RecheckTransportCapacity(RecheckTransportCapacityUpdate::new(
            map_location,
        )))
    }

    pub fn add_recalculate_city(&mut self, city_location: MapCoords3D) -> bool {
        self.add(WorldUpdate::RecalculateCity(RecalculateCityUpdate::new(city_location)))
    }

    pub fn add_recalculate_production(&mut self, player_id: PlayerId) -> bool {
        self.add(WorldUpdate::RecalculateProduction(RecalculateProductionUpdate::new(player_id)))
    }

    pub fn add_recalculate_fog_of_war(&mut self, player_id: PlayerId) -> bool {
        self.add(WorldUpdate::RecalculateFogOfWar(RecalculateFogOfWarUpdate::new(player_id)))
    }

    // ── Inspection ──────────────────────────────────────────────────────

    pub fn contains(&self, update: &WorldUpdate) -> bool {
        self.in_progress.as_ref() == Some(update) || self.updates.contains(update)
    }

    pub fn len(&self) -> usize {
        self.updates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }

    /// Pending updates in their current order (sorted only while processing).
    pub fn iter(&self) -> impl Iterator<Item = &WorldUpdate> {
        self.updates.iter()
    }

    /// Stable sort by kind; updates of the same kind keep their insertion order.
    pub fn sort(&mut self) {
        self.updates.make_contiguous().sort_by_key(WorldUpdate::kind);
    }

    // ── Processing ──────────────────────────────────────────────────────

    /// Run pending updates until none remain. Returns the number of invocations.
    ///
    /// An error aborts the batch: the failing update stays at the front and
    /// everything after it stays queued for a later call.
    pub fn process(&mut self, ctx: &mut UpdateContext<'_>) -> Result<usize> {
        let mut resort = true;
        let mut invocations = 0;

        loop {
            if resort && !self.updates.is_empty() {
                self.sort();
                resort = false;
            }
            let Some(mut update) = self.updates.pop_front() else {
                break;
            };

            if invocations >= self.max_invocations {
                self.updates.push_front(update);
                return Err(UpdateError::IterationLimit {
                    limit: self.max_invocations,
                    pending: self.updates.len(),
                });
            }
            invocations += 1;

            tracing::debug!("Processing {}", update);
            self.in_progress = Some(update.clone());
            let result = update.process(ctx, self);
            self.in_progress = None;

            match result {
                Ok(WorldUpdateResult::Done) => {}
                Ok(WorldUpdateResult::DoneAndLaterUpdatesAdded) => resort = true,
                Ok(WorldUpdateResult::RedoBecauseEarlierUpdatesAdded) => {
                    self.updates.push_front(update);
                    resort = true;
                }
                Err(e) => {
                    self.updates.push_front(update);
                    return Err(e);
                }
            }
        }

        Ok(invocations)
    }
}

impl Default for WorldUpdates {
    fn default() -> Self {
        Self::new()
    }
}
