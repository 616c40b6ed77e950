//! Recomputing what each player can see and bringing their memory up to date.

use std::collections::BTreeSet;

use realm_engine::error::{Result, UpdateError};
use realm_engine::messages::ServerMessage;
use realm_engine::rules::database::Database;
use realm_engine::rules::{FogOfWarProcessing, Visibility};
use realm_engine::world::ServerWorld;
use realm_engine::world::player::{FogOfWarState, PlayerId};
use realm_engine::world::position::MapCoords3D;
use realm_engine::world::spell::{MemoryCombatAreaEffect, MemoryMaintainedSpell};
use realm_engine::world::unit::MemoryUnit;

use super::visibility::FogOfWarVisibility;
use crate::config::FogOfWarSettings;

const CALLER: &str = "StandardFogOfWarProcessing";

pub struct StandardFogOfWarProcessing {
    settings: FogOfWarSettings,
}

impl StandardFogOfWarProcessing {
    pub fn new(settings: FogOfWarSettings) -> Self {
        Self { settings }
    }

    /// Every cell the player's units and cities can see.
    fn visible_cells(&self, world: &ServerWorld, player: PlayerId) -> BTreeSet<MapCoords3D> {
        let size = world.map_size();
        let mut visible = BTreeSet::new();
        let mut look = |centre: MapCoords3D, radius: i32| {
            visible.extend(centre.area(radius).into_iter().filter(|c| size.contains(*c)));
        };

        for unit in &world.true_map.units {
            if unit.owning_player_id == player && unit.is_alive() {
                if let Some(location) = unit.unit_location {
                    look(location, self.settings.unit_view_radius);
                }
            }
        }
        for (location, cell) in world.true_map.map.iter() {
            if cell.terrain.city.as_ref().is_some_and(|c| c.city_owner_id == player) {
                look(location, self.settings.city_view_radius);
            }
        }
        visible
    }
}

/// Put `entity` into `remembered` if it is missing or stale. Returns whether it changed.
fn remember<T: Clone + PartialEq>(remembered: &mut Vec<T>, entity: &T, same: impl Fn(&T) -> bool) -> bool {
    match remembered.iter_mut().find(|r| same(r)) {
        Some(r) if *r == *entity => false,
        Some(r) => {
            *r = entity.clone();
            true
        }
        None => {
            remembered.push(entity.clone());
            true
        }
    }
}

impl FogOfWarProcessing for StandardFogOfWarProcessing {
    fn update_and_send_fog_of_war(&self, world: &mut ServerWorld, player_id: PlayerId, _db: &Database) -> Result<()> {
        let visible = self.visible_cells(world, player_id);

        // ── Fog-of-war states and terrain ──────────────────────────────────
        let mut revealed = Vec::new();
        let mut hidden = Vec::new();
        {
            let ServerWorld { true_map, players, .. } = &mut *world;
            let player = players
                .get_mut(&player_id)
                .ok_or_else(|| UpdateError::not_found("player", player_id.0, CALLER))?;
            let states: Vec<(MapCoords3D, FogOfWarState)> =
                player.fog_of_war.iter().map(|(coords, state)| (coords, *state)).collect();

            for (coords, old) in states {
                let now_visible = visible.contains(&coords);
                let new = match (now_visible, old) {
                    (true, _) => FogOfWarState::CanSee,
                    (false, FogOfWarState::CanSee) => FogOfWarState::HaveSeen,
                    (false, other) => other,
                };
                if let Some(state) = player.fog_of_war.get_mut(coords) {
                    *state = new;
                }

                if now_visible {
                    let terrain = &true_map.cell(coords)?.terrain;
                    let remembered = player.memory.cell_mut(coords)?;
                    if remembered.terrain != *terrain {
                        remembered.terrain = terrain.clone();
                        revealed.push((coords, terrain.clone()));
                    }
                } else if old == FogOfWarState::CanSee {
                    hidden.push(coords);
                }
            }
        }

        // ── Entities, judged against the new fog of war ────────────────────
        let visibility = FogOfWarVisibility;
        let view: &ServerWorld = world;
        let seen_units: Vec<MemoryUnit> = view
            .true_map
            .units
            .iter()
            .filter(|u| u.is_alive() && u.combat_location.is_none())
            .filter(|u| visibility.can_see_unit(view, u, player_id))
            .cloned()
            .collect();
        let seen_unit_urns: BTreeSet<u32> = seen_units.iter().map(|u| u.unit_urn).collect();
        let seen_spells: Vec<MemoryMaintainedSpell> = view
            .true_map
            .spells
            .iter()
            .filter(|s| visibility.can_see_spell(view, s, player_id))
            .cloned()
            .collect();
        let seen_caes: Vec<MemoryCombatAreaEffect> = view
            .true_map
            .combat_area_effects
            .iter()
            .filter(|c| visibility.can_see_combat_area_effect(view, c, player_id))
            .cloned()
            .collect();

        let player = world.player_mut(player_id, CALLER)?;
        let memory = &mut player.memory;

        let units_added: Vec<MemoryUnit> = seen_units
            .into_iter()
            .filter(|unit| remember(&mut memory.units, unit, |r| r.unit_urn == unit.unit_urn))
            .collect();

        // Foreign units out of sight are forgotten; only combat keeps them.
        let units_removed: Vec<u32> = memory
            .units
            .iter()
            .filter(|r| r.owning_player_id != player_id && r.combat_location.is_none())
            .filter(|r| !seen_unit_urns.contains(&r.unit_urn))
            .map(|r| r.unit_urn)
            .collect();
        for unit_urn in &units_removed {
            memory.remove_unit(*unit_urn);
        }

        let spells_added: Vec<MemoryMaintainedSpell> = seen_spells
            .into_iter()
            .filter(|spell| remember(&mut memory.spells, spell, |r| r.spell_urn == spell.spell_urn))
            .collect();
        let combat_area_effects_added: Vec<MemoryCombatAreaEffect> = seen_caes
            .into_iter()
            .filter(|cae| remember(&mut memory.combat_area_effects, cae, |r| r.cae_urn == cae.cae_urn))
            .collect();

        if revealed.is_empty()
            && hidden.is_empty()
            && units_added.is_empty()
            && units_removed.is_empty()
            && spells_added.is_empty()
            && combat_area_effects_added.is_empty()
        {
            return Ok(());
        }
        tracing::debug!(
            "Fog of war for {}: {} revealed, {} hidden, {} units added, {} units removed, {} spells added",
            player_id,
            revealed.len(),
            hidden.len(),
            units_added.len(),
            units_removed.len(),
            spells_added.len()
        );
        player.send(ServerMessage::FogOfWarVisibleAreaChanged {
            revealed,
            hidden,
            units_added,
            units_removed,
            spells_added,
            combat_area_effects_added,
        })
    }
}
