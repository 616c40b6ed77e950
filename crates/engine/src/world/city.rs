use serde::{Deserialize, Serialize};

use super::player::PlayerId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlandMapCity {
    pub city_name: String,
    pub city_owner_id: PlayerId,
    pub city_population: i32,
    pub city_size_id: Option<String>,
    pub minimum_farmers: i32,
    pub optional_farmers: i32,
    pub number_of_rebels: i32,
}

impl OverlandMapCity {
    pub fn new(name: &str, owner: PlayerId, population: i32) -> Self {
        Self {
            city_name: name.to_string(),
            city_owner_id: owner,
            city_population: population,
            city_size_id: None,
            minimum_farmers: 0,
            optional_farmers: 0,
            number_of_rebels: 0,
        }
    }

    /// Population in whole thousands, the unit every city formula works in.
    pub fn population_thousands(&self) -> i32 {
        self.city_population / 1000
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerrainData {
    pub tile_type_id: Option<String>,
    pub city: Option<OverlandMapCity>,
}

/// One overland map cell.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryGridCell {
    pub terrain: TerrainData,
}
