//! Loading the ruleset the engine reads.

use std::path::Path;

use anyhow::{Context, Result};

use realm_engine::rules::database::Database;

/// The ruleset compiled into the binary, used when the config names none.
const BUILTIN_RULESET: &str = include_str!("../data/ruleset.json");

pub fn builtin() -> Result<Database> {
    serde_json::from_str(BUILTIN_RULESET).context("parsing built-in ruleset")
}

pub fn load(path: &Path) -> Result<Database> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("reading ruleset {}", path.display()))?;
    let db: Database =
        serde_json::from_str(&text).with_context(|| format!("parsing ruleset {}", path.display()))?;
    check_references(&db).with_context(|| format!("checking ruleset {}", path.display()))?;
    tracing::info!(
        "Loaded ruleset {}: {} units, {} spells, {} tile types",
        path.display(),
        db.units.len(),
        db.spells.len(),
        db.tile_types.len()
    );
    Ok(db)
}

/// Every ID one record uses to refer to another must resolve.
pub fn check_references(db: &Database) -> Result<()> {
    const CALLER: &str = "check_references";
    for unit in db.units.values() {
        db.find_unit_magic_realm(&unit.unit_magic_realm, CALLER)?;
        for skill in &unit.skills {
            db.find_unit_skill(skill, CALLER)?;
        }
    }
    for spell in db.spells.values() {
        for cae in &spell.combat_area_effects {
            db.find_combat_area_effect(cae, CALLER)?;
        }
    }
    for effect in db.city_spell_effects.values() {
        if let Some(cae) = &effect.combat_area_effect_id {
            db.find_combat_area_effect(cae, CALLER)?;
        }
    }
    for cae in db.combat_area_effects.values() {
        for skill in &cae.unit_skills {
            db.find_unit_skill(skill, CALLER)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_ruleset_is_consistent() {
        let db = builtin().unwrap();
        check_references(&db).unwrap();
        assert!(db.units.contains_key("UN_TRIREME"));
        assert_eq!(db.find_unit("UN_TRIREME", "test").unwrap().transport_capacity, 2);
    }

    #[test]
    fn dangling_skill_is_rejected() {
        let mut db = builtin().unwrap();
        db.units.get_mut("UN_SPEARMEN").unwrap().skills.push("US_NOWHERE".into());
        let err = check_references(&db).unwrap_err();
        assert!(err.to_string().contains("US_NOWHERE"), "{err}");
    }
}
