//! Session configuration, loaded from a JSON file.
//!
//! Every field has a default, so a config file only needs the values it
//! changes and `{}` is a valid config.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use realm_engine::updates::DEFAULT_MAX_INVOCATIONS;
use realm_engine::world::map::MapSize;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub width: i32,
    pub height: i32,
    pub planes: i32,
    pub fog_of_war: FogOfWarSettings,
    /// Safety bound on update invocations for one `process_updates` call.
    pub max_update_invocations: usize,
    /// Fixed seed for the session RNG. Unset means seeded from entropy.
    pub random_seed: Option<u64>,
    /// Ruleset JSON file. Unset means the built-in ruleset.
    pub database: Option<PathBuf>,
    pub save_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FogOfWarSettings {
    pub unit_view_radius: i32,
    pub city_view_radius: i32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            width: 60,
            height: 40,
            planes: 2,
            fog_of_war: FogOfWarSettings::default(),
            max_update_invocations: DEFAULT_MAX_INVOCATIONS,
            random_seed: None,
            database: None,
            save_dir: None,
        }
    }
}

impl Default for FogOfWarSettings {
    fn default() -> Self {
        Self {
            unit_view_radius: 1,
            city_view_radius: 2,
        }
    }
}

impl SessionConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading session config {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("parsing session config {}", path.display()))?;
        anyhow::ensure!(
            config.width > 0 && config.height > 0 && config.planes > 0,
            "session config {}: map must be at least 1x1x1, got {}x{}x{}",
            path.display(),
            config.width,
            config.height,
            config.planes
        );
        Ok(config)
    }

    pub fn map_size(&self) -> MapSize {
        MapSize::new(self.width, self.height, self.planes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_is_the_default_config() {
        let config: SessionConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, SessionConfig::default());
    }

    #[test]
    fn partial_config_keeps_other_defaults() {
        let config: SessionConfig =
            serde_json::from_str(r#"{ "width": 10, "fog_of_war": { "unit_view_radius": 3 } }"#).unwrap();
        assert_eq!(config.width, 10);
        assert_eq!(config.height, 40);
        assert_eq!(config.fog_of_war.unit_view_radius, 3);
        assert_eq!(config.fog_of_war.city_view_radius, 2);
    }
}
