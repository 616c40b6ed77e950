use realm_engine::error::Result;
use realm_engine::rules::CombatMapGenerator;
use realm_engine::rules::database::Database;
use realm_engine::world::FogOfWarMemory;
use realm_engine::world::combat::CombatMap;
use realm_engine::world::position::MapCoords3D;

/// Draws wall-type city spell effects (those backed by a combat area effect)
/// as borders on every tile of the combat map.
pub struct StandardCombatMapGenerator;

impl CombatMapGenerator for StandardCombatMapGenerator {
    fn regenerate_borders(
        &self,
        true_map: &FogOfWarMemory,
        combat_location: MapCoords3D,
        combat_map: &mut CombatMap,
        db: &Database,
    ) -> Result<()> {
        let mut borders = Vec::new();
        for spell in true_map.spells.iter().filter(|s| s.city_location == Some(combat_location)) {
            let Some(effect_id) = &spell.city_spell_effect_id else {
                continue;
            };
            let effect = db.find_city_spell_effect(effect_id, "StandardCombatMapGenerator")?;
            if effect.combat_area_effect_id.is_some() && !borders.contains(effect_id) {
                borders.push(effect_id.clone());
            }
        }
        borders.sort();

        for tile in combat_map.tiles_mut() {
            tile.borders = borders.clone();
        }
        Ok(())
    }
}
