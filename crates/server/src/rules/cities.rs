//! City sizes, farmers, rebels, and per-player production totals.

use std::collections::BTreeMap;

use realm_engine::error::{Result, UpdateError};
use realm_engine::rules::database::Database;
use realm_engine::rules::{CityCalculations, ProductionCalculations};
use realm_engine::world::ServerWorld;
use realm_engine::world::city::OverlandMapCity;
use realm_engine::world::player::PlayerId;
use realm_engine::world::position::MapCoords3D;

/// Production type cities yield from their population.
pub const GOLD: &str = "RE01";

pub struct StandardCityCalculations;

fn find_city<'a>(world: &'a ServerWorld, location: MapCoords3D, caller: &'static str) -> Result<&'a OverlandMapCity> {
    world
        .true_map
        .city(location)
        .ok_or_else(|| UpdateError::not_found("city", location, caller))
}

impl CityCalculations for StandardCityCalculations {
    fn city_size_id(&self, city: &OverlandMapCity, db: &Database) -> Result<Option<String>> {
        Ok(db
            .city_sizes
            .iter()
            .filter(|(_, size)| size.min_population <= city.city_population)
            .max_by_key(|(_, size)| size.min_population)
            .map(|(id, _)| id.clone()))
    }

    fn minimum_farmers(&self, world: &ServerWorld, location: MapCoords3D, _db: &Database) -> Result<i32> {
        let city = find_city(world, location, "StandardCityCalculations::minimum_farmers")?;
        Ok((city.population_thousands() + 1) / 2)
    }

    fn number_of_rebels(
        &self,
        world: &ServerWorld,
        location: MapCoords3D,
        tax_rate_id: &str,
        db: &Database,
    ) -> Result<i32> {
        const CALLER: &str = "StandardCityCalculations::number_of_rebels";
        let city = find_city(world, location, CALLER)?;
        let unrest = db.find_tax_rate(tax_rate_id, CALLER)?.unrest_percent;
        let population = city.population_thousands();
        let most = (population - city.minimum_farmers).max(0);
        Ok((population * unrest / 100).min(most))
    }
}

pub struct StandardProductionCalculations;

impl ProductionCalculations for StandardProductionCalculations {
    fn recalculate_global_production_values(
        &self,
        world: &mut ServerWorld,
        player: PlayerId,
        db: &Database,
    ) -> Result<()> {
        const CALLER: &str = "StandardProductionCalculations";
        let mut totals: BTreeMap<String, i32> = BTreeMap::new();

        for unit in world.true_map.units.iter().filter(|u| u.owning_player_id == player && u.is_alive()) {
            for (production_type, amount) in &db.find_unit(&unit.unit_id, CALLER)?.upkeep {
                *totals.entry(production_type.clone()).or_default() -= amount;
            }
        }
        for spell in world.true_map.spells.iter().filter(|s| s.casting_player_id == player) {
            for (production_type, amount) in &db.find_spell(&spell.spell_id, CALLER)?.upkeep {
                *totals.entry(production_type.clone()).or_default() -= amount;
            }
        }
        for (_, cell) in world.true_map.map.iter() {
            if let Some(city) = cell.terrain.city.as_ref().filter(|c| c.city_owner_id == player) {
                *totals.entry(GOLD.to_string()).or_default() += city.population_thousands();
            }
        }

        tracing::debug!("Production for {}: {:?}", player, totals);
        world.player_mut(player, CALLER)?.production = totals;
        Ok(())
    }
}
