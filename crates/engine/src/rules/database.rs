//! Static ruleset lookups, keyed by string ID.
//!
//! The server loads this once per session from JSON; the engine only reads it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, UpdateError};

/// Lifeform classification of a unit magic realm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifeformType {
    Normal,
    Hero,
    Summoned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpellBookSection {
    Summoning,
    OverlandEnchantments,
    CityEnchantments,
    CityCurses,
    UnitEnchantments,
    UnitCurses,
    SpecialOverlandSpells,
    SpecialCombatSpells,
}

/// Which players a combat area effect applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombatAreaAffectsPlayers {
    AllEvenNotInCombat,
    CasterOnly,
    BothPlayersInCombat,
    CombatOpponent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitDefinition {
    pub unit_magic_realm: String,
    #[serde(default = "one")]
    pub figure_count: i32,
    #[serde(default = "one")]
    pub hit_points: i32,
    #[serde(default)]
    pub transport_capacity: i32,
    #[serde(default)]
    pub skills: Vec<String>,
    /// Per-turn upkeep keyed by production type.
    #[serde(default)]
    pub upkeep: BTreeMap<String, i32>,
}

fn one() -> i32 {
    1
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitMagicRealm {
    pub lifeform_type: LifeformType,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitSkill {
    #[serde(default)]
    pub hit_points_bonus: i32,
    #[serde(default)]
    pub modifies_experience: bool,
    /// Tile types a unit with this skill may enter even if impassable.
    #[serde(default)]
    pub passable_tile_types: Vec<String>,
    /// The passage also extends to every other unit in the same stack.
    #[serde(default)]
    pub applies_to_stack: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpellDefinition {
    pub spell_book_section: SpellBookSection,
    #[serde(default)]
    pub combat_casting_cost: Option<i32>,
    /// Combat area effects an overland enchantment grants while it is in effect.
    #[serde(default)]
    pub combat_area_effects: Vec<String>,
    #[serde(default)]
    pub upkeep: BTreeMap<String, i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitySpellEffect {
    #[serde(default)]
    pub combat_area_effect_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatAreaEffectDefinition {
    pub affects_players: CombatAreaAffectsPlayers,
    #[serde(default)]
    pub unit_skills: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileType {
    /// `None` means impassable unless some skill in the stack grants passage.
    #[serde(default)]
    pub movement_cost: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitySize {
    pub min_population: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRate {
    pub unrest_percent: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Database {
    pub units: BTreeMap<String, UnitDefinition>,
    pub unit_magic_realms: BTreeMap<String, UnitMagicRealm>,
    pub unit_skills: BTreeMap<String, UnitSkill>,
    pub spells: BTreeMap<String, SpellDefinition>,
    pub city_spell_effects: BTreeMap<String, CitySpellEffect>,
    pub combat_area_effects: BTreeMap<String, CombatAreaEffectDefinition>,
    pub tile_types: BTreeMap<String, TileType>,
    pub city_sizes: BTreeMap<String, CitySize>,
    pub tax_rates: BTreeMap<String, TaxRate>,
}

fn find<'a, T>(
    map: &'a BTreeMap<String, T>,
    record: &'static str,
    id: &str,
    caller: &'static str,
) -> Result<&'a T> {
    map.get(id).ok_or_else(|| UpdateError::not_found(record, id, caller))
}

impl Database {
    pub fn find_unit(&self, unit_id: &str, caller: &'static str) -> Result<&UnitDefinition> {
        find(&self.units, "unit", unit_id, caller)
    }

    pub fn find_unit_magic_realm(&self, realm_id: &str, caller: &'static str) -> Result<&UnitMagicRealm> {
        find(&self.unit_magic_realms, "unit magic realm", realm_id, caller)
    }

    pub fn find_unit_skill(&self, unit_skill_id: &str, caller: &'static str) -> Result<&UnitSkill> {
        find(&self.unit_skills, "unit skill", unit_skill_id, caller)
    }

    pub fn find_spell(&self, spell_id: &str, caller: &'static str) -> Result<&SpellDefinition> {
        find(&self.spells, "spell", spell_id, caller)
    }

    pub fn find_city_spell_effect(&self, effect_id: &str, caller: &'static str) -> Result<&CitySpellEffect> {
        find(&self.city_spell_effects, "city spell effect", effect_id, caller)
    }

    pub fn find_combat_area_effect(
        &self,
        cae_id: &str,
        caller: &'static str,
    ) -> Result<&CombatAreaEffectDefinition> {
        find(&self.combat_area_effects, "combat area effect", cae_id, caller)
    }

    pub fn find_tile_type(&self, tile_type_id: &str, caller: &'static str) -> Result<&TileType> {
        find(&self.tile_types, "tile type", tile_type_id, caller)
    }

    pub fn find_tax_rate(&self, tax_rate_id: &str, caller: &'static str) -> Result<&TaxRate> {
        find(&self.tax_rates, "tax rate", tax_rate_id, caller)
    }

    /// Lifeform type of a unit definition, via its magic realm.
    pub fn lifeform_type(&self, unit_id: &str, caller: &'static str) -> Result<LifeformType> {
        let unit = self.find_unit(unit_id, caller)?;
        Ok(self.find_unit_magic_realm(&unit.unit_magic_realm, caller)?.lifeform_type)
    }
}
