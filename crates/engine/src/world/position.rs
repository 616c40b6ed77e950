use serde::{Deserialize, Serialize};

/// Absolute overland map position: a cell on one of the map's planes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MapCoords3D {
    pub x: i32,
    pub y: i32,
    pub plane: i32,
}

impl MapCoords3D {
    pub const fn new(x: i32, y: i32, plane: i32) -> Self {
        Self { x, y, plane }
    }

    /// Every cell within `radius` (square distance) on the same plane,
    /// including this one. May contain coordinates outside the map.
    pub fn area(&self, radius: i32) -> Vec<MapCoords3D> {
        let mut out = Vec::new();
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                out.push(Self::new(self.x + dx, self.y + dy, self.plane));
            }
        }
        out
    }
}

impl std::fmt::Display for MapCoords3D {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.plane)
    }
}

/// Position of a unit on a combat map (2D, combat maps have no planes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CombatPosition {
    pub x: i32,
    pub y: i32,
}

impl CombatPosition {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}
