//! Expanded unit stats and terrain passability.

use std::collections::BTreeSet;

use realm_engine::error::Result;
use realm_engine::rules::database::{CombatAreaAffectsPlayers, Database};
use realm_engine::rules::{ExpandedUnitDetails, UnitCalculations};
use realm_engine::world::ServerWorld;
use realm_engine::world::combat::CombatMapTile;
use realm_engine::world::spell::MemoryCombatAreaEffect;
use realm_engine::world::unit::MemoryUnit;

const CALLER: &str = "StandardUnitCalculations";

pub struct StandardUnitCalculations;

/// Whether `cae` grants its skills to `unit`.
fn combat_area_effect_applies(cae: &MemoryCombatAreaEffect, unit: &MemoryUnit, db: &Database) -> Result<bool> {
    let where_unit_is = unit.combat_location.or(unit.unit_location);
    if cae.map_location.is_some() && cae.map_location != where_unit_is {
        return Ok(false);
    }
    let in_combat = unit.combat_location.is_some();
    let cast_by_owner = cae.casting_player_id == Some(unit.owning_player_id);

    let def = db.find_combat_area_effect(&cae.combat_area_effect_id, CALLER)?;
    Ok(match def.affects_players {
        CombatAreaAffectsPlayers::AllEvenNotInCombat => true,
        CombatAreaAffectsPlayers::CasterOnly => cast_by_owner,
        CombatAreaAffectsPlayers::BothPlayersInCombat => in_combat,
        CombatAreaAffectsPlayers::CombatOpponent => in_combat && !cast_by_owner,
    })
}

/// Figures still standing once `damage_taken` is spread over figures of
/// `hp_per_figure` each. A partly damaged figure still counts.
pub fn alive_figures(figure_count: i32, hp_per_figure: i32, damage_taken: i32) -> i32 {
    let hp_per_figure = hp_per_figure.max(1);
    let remaining = figure_count * hp_per_figure - damage_taken;
    if remaining <= 0 {
        0
    } else {
        (remaining + hp_per_figure - 1) / hp_per_figure
    }
}

impl UnitCalculations for StandardUnitCalculations {
    fn expand_unit(&self, world: &ServerWorld, unit: &MemoryUnit, db: &Database) -> Result<ExpandedUnitDetails> {
        let def = db.find_unit(&unit.unit_id, CALLER)?;
        let mut skills: BTreeSet<String> = def.skills.iter().cloned().collect();

        for spell in &world.true_map.spells {
            if spell.unit_urn == Some(unit.unit_urn) {
                skills.extend(spell.unit_skill_id.iter().cloned());
            }
        }
        for cae in &world.true_map.combat_area_effects {
            if combat_area_effect_applies(cae, unit, db)? {
                let cae_def = db.find_combat_area_effect(&cae.combat_area_effect_id, CALLER)?;
                skills.extend(cae_def.unit_skills.iter().cloned());
            }
        }

        let mut hp_per_figure = def.hit_points;
        for skill_id in &skills {
            hp_per_figure += db.find_unit_skill(skill_id, CALLER)?.hit_points_bonus;
        }

        Ok(ExpandedUnitDetails {
            unit_urn: unit.unit_urn,
            unit_id: unit.unit_id.clone(),
            owning_player_id: unit.owning_player_id,
            lifeform_type: db.lifeform_type(&unit.unit_id, CALLER)?,
            skills,
            transport_capacity: def.transport_capacity,
            alive_figure_count: alive_figures(def.figure_count, hp_per_figure, unit.damage_taken),
        })
    }

    fn movement_cost_to_enter(
        &self,
        unit: &ExpandedUnitDetails,
        stack_skills: &BTreeSet<String>,
        tile_type_id: &str,
        db: &Database,
    ) -> Result<Option<i32>> {
        if let Some(cost) = db.find_tile_type(tile_type_id, CALLER)?.movement_cost {
            return Ok(Some(cost));
        }
        for skill_id in stack_skills {
            let skill = db.find_unit_skill(skill_id, CALLER)?;
            let usable = skill.applies_to_stack || unit.skills.contains(skill_id);
            if usable && skill.passable_tile_types.iter().any(|t| t == tile_type_id) {
                return Ok(Some(1));
            }
        }
        Ok(None)
    }

    /// Combat tile types share the ruleset's tile type table.
    fn can_occupy_combat_tile(&self, unit: &ExpandedUnitDetails, tile: &CombatMapTile, db: &Database) -> Result<bool> {
        Ok(self
            .movement_cost_to_enter(unit, &unit.skills, &tile.tile_type_id, db)?
            .is_some())
    }
}
