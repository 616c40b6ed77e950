//! Derived-value refreshes. These read settled state, never queue further
//! updates, and always finish in one pass.

use super::update::{UpdateContext, WorldUpdateResult};
use crate::error::Result;
use crate::messages::ServerMessage;
use crate::world::player::PlayerId;
use crate::world::position::MapCoords3D;

/// Re-derive a city's size, farmers and rebels, and show the result to everyone who can see it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecalculateCityUpdate {
    pub city_location: MapCoords3D,
}

impl RecalculateCityUpdate {
    pub fn new(city_location: MapCoords3D) -> Self {
        Self { city_location }
    }

    pub(super) fn process(&mut self, ctx: &mut UpdateContext<'_>) -> Result<WorldUpdateResult> {
        const CALLER: &str = "RecalculateCityUpdate";
        let location = self.city_location;

        let Some(city) = ctx.world.true_map.city(location).cloned() else {
            tracing::warn!("RecalculateCityUpdate: no city at {} any more", location);
            return Ok(WorldUpdateResult::Done);
        };
        let tax_rate_id = ctx.world.player(city.city_owner_id, CALLER)?.tax_rate_id.clone();
        let cities = &ctx.services.cities;

        let city_size_id = cities.city_size_id(&city, ctx.db)?;
        let minimum_farmers = cities.minimum_farmers(ctx.world, location, ctx.db)?;
        if let Some(true_city) = ctx.world.true_map.cell_mut(location)?.terrain.city.as_mut() {
            true_city.city_size_id = city_size_id;
            true_city.minimum_farmers = minimum_farmers;
        }

        let number_of_rebels = cities.number_of_rebels(ctx.world, location, &tax_rate_id, ctx.db)?;
        let Some(true_city) = ctx.world.true_map.cell_mut(location)?.terrain.city.as_mut() else {
            return Ok(WorldUpdateResult::Done);
        };
        true_city.number_of_rebels = number_of_rebels;
        let max_optional_farmers = (true_city.population_thousands() - true_city.minimum_farmers).max(0);
        true_city.optional_farmers = true_city.optional_farmers.min(max_optional_farmers);
        let updated = true_city.clone();

        for player_id in ctx.world.player_ids() {
            if !ctx.services.visibility.can_see_city(ctx.world, location, player_id) {
                continue;
            }
            let player = ctx.world.player_mut(player_id, CALLER)?;
            player.memory.cell_mut(location)?.terrain.city = Some(updated.clone());
            player.send(ServerMessage::UpdateCity {
                location,
                city: Some(updated.clone()),
            })?;
        }

        Ok(WorldUpdateResult::Done)
    }
}

/// Recompute a player's per-turn production and consumption totals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecalculateProductionUpdate {
    pub player_id: PlayerId,
}

impl RecalculateProductionUpdate {
    pub fn new(player_id: PlayerId) -> Self {
        Self { player_id }
    }

    pub(super) fn process(&mut self, ctx: &mut UpdateContext<'_>) -> Result<WorldUpdateResult> {
        ctx.services
            .production
            .recalculate_global_production_values(ctx.world, self.player_id, ctx.db)?;
        Ok(WorldUpdateResult::Done)
    }
}

/// Recompute a player's visible area and push the changes to their client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecalculateFogOfWarUpdate {
    pub player_id: PlayerId,
}

impl RecalculateFogOfWarUpdate {
    pub fn new(player_id: PlayerId) -> Self {
        Self { player_id }
    }

    pub(super) fn process(&mut self, ctx: &mut UpdateContext<'_>) -> Result<WorldUpdateResult> {
        ctx.services
            .fog_of_war
            .update_and_send_fog_of_war(ctx.world, self.player_id, ctx.db)?;
        Ok(WorldUpdateResult::Done)
    }
}
