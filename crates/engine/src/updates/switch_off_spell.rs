use super::kill_unit::KillUnitAction;
use super::queue::WorldUpdates;
use super::update::{UpdateContext, WorldUpdateResult};
use crate::error::{Result, UpdateError};
use crate::messages::ServerMessage;
use crate::rules::database::{CombatAreaAffectsPlayers, SpellBookSection, SpellDefinition};
use crate::world::position::MapCoords3D;
use crate::world::spell::MemoryMaintainedSpell;

const CALLER: &str = "SwitchOffSpellUpdate";

/// Switch off a maintained spell and deal with everything that depended on it.
#[derive(Debug, Clone)]
pub struct SwitchOffSpellUpdate {
    pub spell_urn: u32,
    /// Keep the spell in the true map (switched off for players only), used
    /// when the target may still be resurrected before its combat ends.
    pub retain_spell_in_server_true_memory: bool,
}

impl SwitchOffSpellUpdate {
    pub fn new(spell_urn: u32, retain_spell_in_server_true_memory: bool) -> Self {
        Self {
            spell_urn,
            retain_spell_in_server_true_memory,
        }
    }

    pub(super) fn process(
        &mut self,
        ctx: &mut UpdateContext<'_>,
        queue: &mut WorldUpdates,
    ) -> Result<WorldUpdateResult> {
        let true_spell = ctx
            .world
            .true_map
            .find_spell(self.spell_urn)
            .cloned()
            .ok_or_else(|| UpdateError::not_found("maintained spell", self.spell_urn, CALLER))?;
        let spell_def = ctx.db.find_spell(&true_spell.spell_id, CALLER)?.clone();

        // The combat area effects the spell grants must go first.
        if self.remove_granted_combat_area_effects(ctx, queue, &true_spell, &spell_def)? {
            return Ok(WorldUpdateResult::RedoBecauseEarlierUpdatesAdded);
        }

        // ── Switch it off everywhere ───────────────────────────────────────
        if !self.retain_spell_in_server_true_memory {
            ctx.world.true_map.remove_spell(self.spell_urn);
        }

        for player_id in ctx.world.player_ids() {
            let remembers = ctx
                .world
                .player(player_id, CALLER)?
                .memory
                .find_spell(self.spell_urn)
                .is_some();
            if !remembers || !ctx.services.visibility.can_see_spell(ctx.world, &true_spell, player_id) {
                continue;
            }

            let player = ctx.world.player_mut(player_id, CALLER)?;
            player.memory.remove_spell(self.spell_urn);
            player.send(ServerMessage::SwitchOffSpell {
                spell_urn: self.spell_urn,
            })?;
        }

        // Walls of fire and darkness are drawn on the combat map.
        if spell_def.combat_casting_cost.is_some()
            && matches!(
                spell_def.spell_book_section,
                SpellBookSection::CityEnchantments | SpellBookSection::CityCurses
            )
        {
            if let (Some(effect_id), Some(city_location)) =
                (&true_spell.city_spell_effect_id, true_spell.city_location)
            {
                if ctx
                    .db
                    .find_city_spell_effect(effect_id, CALLER)?
                    .combat_area_effect_id
                    .is_some()
                {
                    regenerate_combat_map(ctx, city_location)?;
                }
            }
        }

        // ── Knock-on effects on whatever the spell was cast on ─────────────
        let mut added = false;
        if let Some(unit_urn) = true_spell.unit_urn {
            added |= self.recheck_unit(ctx, queue, unit_urn, &true_spell)?;
        } else if let Some(city_location) = true_spell.city_location {
            added |= queue.add_recalculate_city(city_location);
        } else if spell_def.spell_book_section == SpellBookSection::OverlandEnchantments
            && grants_caster_hit_points(ctx, &spell_def)?
        {
            // e.g. Charm of Life: damaged units may have been relying on the extra hit points.
            let units: Vec<_> = ctx
                .world
                .true_map
                .units
                .iter()
                .filter(|u| u.owning_player_id == true_spell.casting_player_id && u.is_alive())
                .cloned()
                .collect();
            for unit in units {
                let expanded = ctx.services.units.expand_unit(ctx.world, &unit, ctx.db)?;
                if expanded.alive_figure_count <= 0 {
                    added |= queue.add_kill_unit(unit.unit_urn, KillUnitAction::HealableOverlandDamage);
                }
            }
        }

        // Losing any spell may change what the caster can see and what they pay.
        added |= queue.add_recalculate_fog_of_war(true_spell.casting_player_id);
        added |= queue.add_recalculate_production(true_spell.casting_player_id);

        tracing::debug!(
            "Switched off spell {} ({}) cast by {}",
            self.spell_urn,
            true_spell.spell_id,
            true_spell.casting_player_id
        );
        Ok(WorldUpdateResult::done(added))
    }

    /// Queue removal of any combat area effects this spell grants. Returns
    /// whether anything new was queued.
    fn remove_granted_combat_area_effects(
        &self,
        ctx: &UpdateContext<'_>,
        queue: &mut WorldUpdates,
        true_spell: &MemoryMaintainedSpell,
        spell_def: &SpellDefinition,
    ) -> Result<bool> {
        let caster = Some(true_spell.casting_player_id);
        let mut cae_urns = Vec::new();

        if spell_def.spell_book_section == SpellBookSection::OverlandEnchantments {
            for cae_id in &spell_def.combat_area_effects {
                if let Some(cae) = ctx.world.true_map.find_combat_area_effect_instance(cae_id, None, caster) {
                    cae_urns.push(cae.cae_urn);
                }
            }
        } else if let Some(effect_id) = &true_spell.city_spell_effect_id {
            let effect = ctx.db.find_city_spell_effect(effect_id, CALLER)?;
            if let Some(cae_id) = &effect.combat_area_effect_id {
                if let Some(cae) =
                    ctx.world
                        .true_map
                        .find_combat_area_effect_instance(cae_id, true_spell.city_location, caster)
                {
                    cae_urns.push(cae.cae_urn);
                }
            }
        }

        let mut added = false;
        for cae_urn in cae_urns {
            added |= queue.add_remove_combat_area_effect(cae_urn);
        }
        Ok(added)
    }

    /// The spell was on a unit: it may now be dead, stranded on its combat
    /// tile, or break the stacking rules of its overland cell.
    fn recheck_unit(
        &self,
        ctx: &mut UpdateContext<'_>,
        queue: &mut WorldUpdates,
        unit_urn: u32,
        true_spell: &MemoryMaintainedSpell,
    ) -> Result<bool> {
        let unit = ctx
            .world
            .true_map
            .find_unit(unit_urn)
            .cloned()
            .ok_or_else(|| UpdateError::not_found("unit", unit_urn, CALLER))?;
        let mut added = false;

        if unit.is_alive() {
            let expanded = ctx.services.units.expand_unit(ctx.world, &unit, ctx.db)?;
            let granted_health = match &true_spell.unit_skill_id {
                Some(skill_id) => {
                    let skill = ctx.db.find_unit_skill(skill_id, CALLER)?;
                    skill.hit_points_bonus > 0 || skill.modifies_experience
                }
                None => false,
            };
            let action = if unit.combat_location.is_some() {
                KillUnitAction::HealableCombatDamage
            } else {
                KillUnitAction::HealableOverlandDamage
            };

            if granted_health && expanded.alive_figure_count <= 0 {
                added |= queue.add_kill_unit(unit_urn, action);
            } else if let (Some(combat_location), Some(position)) = (unit.combat_location, unit.combat_position) {
                // e.g. lost Flight while over water.
                let combat = ctx
                    .world
                    .find_combat(combat_location)
                    .ok_or_else(|| UpdateError::not_found("combat", combat_location, CALLER))?;
                let tile = combat.combat_map.tile(position).ok_or_else(|| {
                    UpdateError::Logic(format!(
                        "unit {unit_urn} is at combat position ({}, {}) outside the combat map",
                        position.x, position.y
                    ))
                })?;
                if !ctx.services.units.can_occupy_combat_tile(&expanded, tile, ctx.db)? {
                    added |= queue.add_kill_unit(unit_urn, KillUnitAction::HealableCombatDamage);
                }
            }
        }

        // e.g. lost Wind Walking, and the stack can no longer cross the water it is on.
        if unit.combat_location.is_none() {
            if let Some(location) = unit.unit_location {
                added |= queue.add_recheck_transport_capacity(location);
            }
        }

        Ok(added)
    }
}

/// Whether an overland enchantment grants its caster's units extra hit points
/// through a caster-only combat area effect.
fn grants_caster_hit_points(ctx: &UpdateContext<'_>, spell_def: &SpellDefinition) -> Result<bool> {
    for cae_id in &spell_def.combat_area_effects {
        let cae = ctx.db.find_combat_area_effect(cae_id, CALLER)?;
        if cae.affects_players != CombatAreaAffectsPlayers::CasterOnly {
            continue;
        }
        for skill_id in &cae.unit_skills {
            if ctx.db.find_unit_skill(skill_id, CALLER)?.hit_points_bonus > 0 {
                return Ok(true);
            }
        }
    }
    Ok(false)
}

/// Redraw the borders of the combat map at `location` and push it to both
/// sides, if the combat there has both sides resolved.
fn regenerate_combat_map(ctx: &mut UpdateContext<'_>, location: MapCoords3D) -> Result<()> {
    let world = &mut *ctx.world;
    let Some(combat) = world.combats.iter_mut().find(|c| c.combat_location == location) else {
        return Ok(());
    };
    let (Some(attacker), Some(defender)) = (combat.attacking_player_id, combat.defending_player_id) else {
        return Ok(());
    };

    ctx.services
        .combat_map
        .regenerate_borders(&world.true_map, location, &mut combat.combat_map, ctx.db)?;
    let combat_map = combat.combat_map.clone();

    for player_id in [attacker, defender] {
        world.player_mut(player_id, CALLER)?.send(ServerMessage::UpdateCombatMap {
            combat_location: location,
            combat_map: combat_map.clone(),
        })?;
    }
    Ok(())
}

impl PartialEq for SwitchOffSpellUpdate {
    fn eq(&self, other: &Self) -> bool {
        self.spell_urn == other.spell_urn
    }
}

impl Eq for SwitchOffSpellUpdate {}
