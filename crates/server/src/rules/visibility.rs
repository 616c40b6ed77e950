//! Fog-of-war visibility: what a player can currently see, judged against the
//! true map and the player's own fog-of-war grid.

use realm_engine::rules::Visibility;
use realm_engine::world::ServerWorld;
use realm_engine::world::player::PlayerId;
use realm_engine::world::position::MapCoords3D;
use realm_engine::world::spell::{MemoryCombatAreaEffect, MemoryMaintainedSpell};
use realm_engine::world::unit::MemoryUnit;

pub struct FogOfWarVisibility;

fn can_see_cell(world: &ServerWorld, player: PlayerId, location: MapCoords3D) -> bool {
    world.players.get(&player).is_some_and(|p| p.can_see_cell(location))
}

impl Visibility for FogOfWarVisibility {
    fn can_see_unit(&self, world: &ServerWorld, unit: &MemoryUnit, player: PlayerId) -> bool {
        if unit.owning_player_id == player {
            return true;
        }
        // Units in combat are only on the combat map.
        if let Some(combat_location) = unit.combat_location {
            return world
                .find_combat(combat_location)
                .is_some_and(|combat| combat.is_combatant(player));
        }
        unit.unit_location.is_some_and(|location| can_see_cell(world, player, location))
    }

    fn can_see_spell(&self, world: &ServerWorld, spell: &MemoryMaintainedSpell, player: PlayerId) -> bool {
        if spell.casting_player_id == player {
            return true;
        }
        if let Some(unit_urn) = spell.unit_urn {
            return world
                .true_map
                .find_unit(unit_urn)
                .is_some_and(|unit| self.can_see_unit(world, unit, player));
        }
        match spell.city_location {
            Some(location) => self.can_see_city(world, location, player),
            None => true,
        }
    }

    fn can_see_combat_area_effect(
        &self,
        world: &ServerWorld,
        cae: &MemoryCombatAreaEffect,
        player: PlayerId,
    ) -> bool {
        if cae.casting_player_id == Some(player) {
            return true;
        }
        match cae.map_location {
            Some(location) => can_see_cell(world, player, location),
            None => true,
        }
    }

    fn can_see_city(&self, world: &ServerWorld, location: MapCoords3D, player: PlayerId) -> bool {
        world
            .true_map
            .city(location)
            .is_some_and(|city| city.city_owner_id == player)
            || can_see_cell(world, player, location)
    }
}
