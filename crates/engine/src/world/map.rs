use serde::{Deserialize, Serialize};

use super::position::MapCoords3D;

/// Dimensions of an overland map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapSize {
    pub width: i32,
    pub height: i32,
    pub planes: i32,
}

impl MapSize {
    pub const fn new(width: i32, height: i32, planes: i32) -> Self {
        Self {
            width,
            height,
            planes,
        }
    }

    pub const fn contains(&self, coords: MapCoords3D) -> bool {
        coords.x >= 0
            && coords.x < self.width
            && coords.y >= 0
            && coords.y < self.height
            && coords.plane >= 0
            && coords.plane < self.planes
    }
}

/// A dense `width x height x planes` grid of cells.
///
/// Stored as a flat vector in plane-major, then row-major order. Used both for
/// terrain (true map and each player's memory of it) and for per-player
/// fog-of-war states.
///
/// Deserializing checks that the cell count matches the size, so a loaded
/// volume always has a cell for every coordinate it contains.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "RawMapVolume<T>",
    bound(deserialize = "T: Deserialize<'de>")
)]
pub struct MapVolume<T> {
    size: MapSize,
    cells: Vec<T>,
}

#[derive(Deserialize)]
struct RawMapVolume<T> {
    size: MapSize,
    cells: Vec<T>,
}

impl<T> TryFrom<RawMapVolume<T>> for MapVolume<T> {
    type Error = String;

    fn try_from(raw: RawMapVolume<T>) -> Result<Self, Self::Error> {
        let MapSize { width, height, planes } = raw.size;
        if width < 0 || height < 0 || planes < 0 {
            return Err(format!("map size {width}x{height}x{planes} is negative"));
        }
        let expected = width as usize * height as usize * planes as usize;
        if raw.cells.len() != expected {
            return Err(format!(
                "map of {width}x{height}x{planes} needs {expected} cells, found {}",
                raw.cells.len()
            ));
        }
        Ok(Self {
            size: raw.size,
            cells: raw.cells,
        })
    }
}

impl<T: Clone> MapVolume<T> {
    pub fn new_filled(size: MapSize, value: T) -> Self {
        let volume = (size.width.max(0) * size.height.max(0) * size.planes.max(0)) as usize;
        Self {
            size,
            cells: vec![value; volume],
        }
    }
}

impl<T: Default + Clone> MapVolume<T> {
    pub fn new(size: MapSize) -> Self {
        Self::new_filled(size, T::default())
    }
}

impl<T> MapVolume<T> {
    #[inline]
    fn index(&self, coords: MapCoords3D) -> Option<usize> {
        if !self.size.contains(coords) {
            return None;
        }
        let plane_len = (self.size.width * self.size.height) as usize;
        Some(
            coords.plane as usize * plane_len
                + coords.y as usize * self.size.width as usize
                + coords.x as usize,
        )
    }

    pub fn size(&self) -> MapSize {
        self.size
    }

    pub fn get(&self, coords: MapCoords3D) -> Option<&T> {
        self.index(coords).and_then(|i| self.cells.get(i))
    }

    pub fn get_mut(&mut self, coords: MapCoords3D) -> Option<&mut T> {
        self.index(coords).and_then(|i| self.cells.get_mut(i))
    }

    /// All coordinates in the volume paired with their cell.
    pub fn iter(&self) -> impl Iterator<Item = (MapCoords3D, &T)> {
        let w = self.size.width;
        let h = self.size.height;
        self.cells.iter().enumerate().map(move |(i, cell)| {
            let i = i as i32;
            let plane = i / (w * h);
            let rest = i % (w * h);
            (MapCoords3D::new(rest % w, rest / w, plane), cell)
        })
    }
}
