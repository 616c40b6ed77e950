use serde::{Deserialize, Serialize};

use super::player::PlayerId;
use super::position::MapCoords3D;

/// A spell that stays in effect after casting (an enchantment or curse).
///
/// At most one of `unit_urn` / `city_location` is set. Neither means an
/// overland enchantment that affects the caster globally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryMaintainedSpell {
    pub spell_urn: u32,
    pub spell_id: String,
    pub casting_player_id: PlayerId,
    pub unit_urn: Option<u32>,
    /// The unit skill this spell grants to `unit_urn`.
    pub unit_skill_id: Option<String>,
    pub city_location: Option<MapCoords3D>,
    pub city_spell_effect_id: Option<String>,
}

impl MemoryMaintainedSpell {
    pub fn overland(spell_urn: u32, spell_id: &str, caster: PlayerId) -> Self {
        Self {
            spell_urn,
            spell_id: spell_id.to_string(),
            casting_player_id: caster,
            unit_urn: None,
            unit_skill_id: None,
            city_location: None,
            city_spell_effect_id: None,
        }
    }

    pub fn on_unit(spell_urn: u32, spell_id: &str, caster: PlayerId, unit_urn: u32, unit_skill_id: &str) -> Self {
        Self {
            unit_urn: Some(unit_urn),
            unit_skill_id: Some(unit_skill_id.to_string()),
            ..Self::overland(spell_urn, spell_id, caster)
        }
    }

    pub fn on_city(
        spell_urn: u32,
        spell_id: &str,
        caster: PlayerId,
        city_location: MapCoords3D,
        city_spell_effect_id: &str,
    ) -> Self {
        Self {
            city_location: Some(city_location),
            city_spell_effect_id: Some(city_spell_effect_id.to_string()),
            ..Self::overland(spell_urn, spell_id, caster)
        }
    }
}

/// A live combat area effect. `map_location` of `None` means it applies globally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryCombatAreaEffect {
    pub cae_urn: u32,
    pub combat_area_effect_id: String,
    pub map_location: Option<MapCoords3D>,
    pub casting_player_id: Option<PlayerId>,
}
