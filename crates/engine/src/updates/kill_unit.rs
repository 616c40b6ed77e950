use serde::{Deserialize, Serialize};

use super::queue::WorldUpdates;
use super::update::{UpdateContext, WorldUpdateResult};
use crate::error::Result;
use crate::messages::ServerMessage;
use crate::rules::database::LifeformType;
use crate::world::unit::{HeroItem, UnitStatus};

/// Why a unit is being killed. Decides what is kept of it and who is told what.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KillUnitAction {
    /// Gone for good; no resurrection.
    PermanentDamage,
    Dismiss,
    /// Disbanded for lack of upkeep.
    LackOfProduction,
    /// Died in combat; may be healed or raised before the combat ends.
    HealableCombatDamage,
    /// Died overland; only heroes leave anything to resurrect.
    HealableOverlandDamage,
}

impl KillUnitAction {
    /// Status of the unit in the true map afterwards. `None` deletes it.
    pub fn true_map_status(self, is_hero: bool) -> Option<UnitStatus> {
        match self {
            Self::PermanentDamage => None,
            Self::Dismiss | Self::LackOfProduction if is_hero => Some(UnitStatus::Generated),
            Self::Dismiss | Self::LackOfProduction => None,
            Self::HealableCombatDamage => Some(UnitStatus::Dead),
            Self::HealableOverlandDamage if is_hero => Some(UnitStatus::Dead),
            Self::HealableOverlandDamage => None,
        }
    }

    /// Status of the unit in one player's memory, and the status sent to that
    /// player's client. `None` means forget the unit.
    pub fn player_statuses(
        self,
        owns_unit: bool,
        is_hero: bool,
        is_combatant: bool,
    ) -> (Option<UnitStatus>, Option<UnitStatus>) {
        match self {
            Self::PermanentDamage | Self::Dismiss => (None, None),
            Self::LackOfProduction if owns_unit => (None, Some(UnitStatus::KilledByLackOfProduction)),
            Self::LackOfProduction => (None, None),
            Self::HealableCombatDamage if owns_unit || is_combatant => {
                (Some(UnitStatus::Dead), Some(UnitStatus::Dead))
            }
            Self::HealableCombatDamage => (None, None),
            Self::HealableOverlandDamage if is_hero && owns_unit => {
                (Some(UnitStatus::Dead), Some(UnitStatus::Dead))
            }
            Self::HealableOverlandDamage => (None, None),
        }
    }
}

/// Kill a unit on the server and in every player's memory that can see it.
///
/// Spells cast on the unit are switched off first; if that queues anything the
/// update asks to be redone, and the latch keeps the spell pass from running a
/// second time.
#[derive(Debug, Clone)]
pub struct KillUnitUpdate {
    pub unit_urn: u32,
    pub action: KillUnitAction,
    spells_switched_off: bool,
}

impl KillUnitUpdate {
    pub fn new(unit_urn: u32, action: KillUnitAction) -> Self {
        Self {
            unit_urn,
            action,
            spells_switched_off: false,
        }
    }

    pub fn spells_switched_off(&self) -> bool {
        self.spells_switched_off
    }

    pub(super) fn process(
        &mut self,
        ctx: &mut UpdateContext<'_>,
        queue: &mut WorldUpdates,
    ) -> Result<WorldUpdateResult> {
        // ── Spells cast on the unit ────────────────────────────────────────
        if !self.spells_switched_off {
            self.spells_switched_off = true;

            // A unit killed in combat may be raised before the combat ends, so
            // the server keeps its spells.
            let retain = self.action == KillUnitAction::HealableCombatDamage;
            let spell_urns: Vec<u32> = ctx
                .world
                .true_map
                .spells
                .iter()
                .filter(|s| s.unit_urn == Some(self.unit_urn))
                .map(|s| s.spell_urn)
                .collect();

            let mut added = false;
            for spell_urn in spell_urns {
                if queue.add_switch_off_spell_with_retention(spell_urn, retain) {
                    added = true;
                }
            }
            if added {
                return Ok(WorldUpdateResult::RedoBecauseEarlierUpdatesAdded);
            }
        }

        let Some(true_unit) = ctx.world.true_map.find_unit(self.unit_urn).cloned() else {
            tracing::warn!(
                "KillUnitUpdate: unit {} is already gone from the true map, nothing to kill",
                self.unit_urn
            );
            return Ok(WorldUpdateResult::Done);
        };

        let lifeform = ctx.db.lifeform_type(&true_unit.unit_id, "KillUnitUpdate")?;
        let is_hero = lifeform == LifeformType::Hero;

        // ── Hero items go to the loot pool ─────────────────────────────────
        if let Some(combat_location) = true_unit.combat_location {
            if self.action != KillUnitAction::PermanentDamage {
                let items: Vec<HeroItem> = match ctx.world.true_map.find_unit_mut(self.unit_urn) {
                    Some(unit) => unit
                        .hero_item_slots
                        .iter_mut()
                        .filter_map(|slot| slot.hero_item.take())
                        .collect(),
                    None => Vec::new(),
                };
                let combat = ctx.world.find_combat_mut(combat_location, "KillUnitUpdate")?;
                combat.items_from_heroes_who_died_in_combat.extend(items);
            }
        }

        let combat = true_unit.combat_location.and_then(|loc| ctx.world.find_combat(loc)).cloned();

        // ── Every player who can see it ────────────────────────────────────
        for player_id in ctx.world.player_ids() {
            if !ctx.services.visibility.can_see_unit(ctx.world, &true_unit, player_id) {
                continue;
            }

            let owns_unit = true_unit.owning_player_id == player_id;
            let is_combatant = combat.as_ref().is_some_and(|c| c.is_combatant(player_id));
            let (memory_status, client_status) = self.action.player_statuses(owns_unit, is_hero, is_combatant);

            let player = ctx.world.player_mut(player_id, "KillUnitUpdate")?;
            player.remove_unit_from_pending_movements(self.unit_urn);

            if player.memory.find_unit(self.unit_urn).is_none() {
                // Seen but never remembered: its fog of war has not caught up yet.
                tracing::warn!(
                    "KillUnitUpdate: {} can see unit {} but has no memory of it",
                    player_id,
                    self.unit_urn
                );
            }
            match memory_status {
                None => {
                    player.memory.remove_unit(self.unit_urn);
                }
                Some(status) => {
                    if let Some(unit) = player.memory.find_unit_mut(self.unit_urn) {
                        unit.status = status;
                    }
                }
            }

            player.send(ServerMessage::KillUnit {
                unit_urn: self.unit_urn,
                new_status: client_status,
            })?;
        }

        // ── True map ───────────────────────────────────────────────────────
        match self.action.true_map_status(is_hero) {
            None => {
                ctx.world.true_map.remove_unit(self.unit_urn);
            }
            Some(status) => {
                if let Some(unit) = ctx.world.true_map.find_unit_mut(self.unit_urn) {
                    unit.status = status;
                }
            }
        }

        // ── Knock-on effects ───────────────────────────────────────────────
        let mut added = false;
        if true_unit.combat_location.is_none() {
            if let Some(location) = true_unit.unit_location {
                let in_city = ctx.world.true_map.city(location).is_some();
                if in_city && lifeform != LifeformType::Summoned {
                    added |= queue.add_recalculate_city(location);
                } else {
                    added |= queue.add_recheck_transport_capacity(location);
                }
            }
        }

        // Upkeep and visible area may both have changed.
        added |= queue.add_recalculate_production(true_unit.owning_player_id);
        added |= queue.add_recalculate_fog_of_war(true_unit.owning_player_id);

        tracing::debug!(
            "Killed unit {} ({}) with {:?}",
            self.unit_urn,
            true_unit.unit_id,
            self.action
        );
        Ok(WorldUpdateResult::done(added))
    }
}

/// Identity is the unit alone: a second kill of the same unit is a duplicate
/// whatever its action.
impl PartialEq for KillUnitUpdate {
    fn eq(&self, other: &Self) -> bool {
        self.unit_urn == other.unit_urn
    }
}

impl Eq for KillUnitUpdate {}
