//! Tile grids, procedural generation, autotiling and lighting.
//!
//! A [`Zone`] is a fixed-size grid of [`TileCode`]s plus a parallel grid of
//! light intensities. Coordinates outside the grid never fail: tile lookups
//! return [`TileCode::OUT_OF_BOUNDS`] and light lookups return `0.0`.
mod autotile;
mod light;
mod maze;
mod tile;

pub use autotile::{Openness, WallShape};
pub use light::{LightCell, LightRings, LightSource};
pub use maze::{GenerationError, MazeReport};
pub use tile::{TileCode, TileProperties};

use arrayvec::ArrayVec;
use sha2::{Digest, Sha256};

use crate::state::GridVector;

/// Light value of a cell the current propagation pass left unlit.
pub const UNLIT: f64 = -1.0;

/// In-bounds 8-neighbourhood of a cell.
pub type Neighbors = ArrayVec<(GridVector, TileCode), 8>;

/// One dungeon level: tile codes, light intensities and the generation seed.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Zone {
    width: u32,
    height: u32,
    tiles: Vec<TileCode>,
    light: Vec<f64>,
    seed: String,
}

impl Zone {
    /// Creates an all-floor zone. Dimensions are fixed for the zone's lifetime.
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, TileCode::FLOOR)
    }

    /// Creates a zone with every cell set to `tile`.
    pub fn filled(width: u32, height: u32, tile: TileCode) -> Self {
        let cells = width as usize * height as usize;
        Self {
            width,
            height,
            tiles: vec![tile; cells],
            light: vec![0.0; cells],
            seed: String::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// True when the tile and light grids both hold `width * height` cells.
    ///
    /// Always holds for zones built in process; a deserialized zone may not.
    pub fn is_well_formed(&self) -> bool {
        let cells = self.width as usize * self.height as usize;
        self.tiles.len() == cells && self.light.len() == cells
    }

    /// Seed string of the last [`Zone::create_maze`] call (empty if never generated).
    pub fn seed(&self) -> &str {
        &self.seed
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        self.contains(x, y)
            .then(|| y as usize * self.width as usize + x as usize)
    }

    /// Tile code at `(x, y)`, or [`TileCode::OUT_OF_BOUNDS`].
    pub fn get(&self, x: i32, y: i32) -> TileCode {
        self.index(x, y)
            .map_or(TileCode::OUT_OF_BOUNDS, |index| self.tiles[index])
    }

    /// Sets the tile at `(x, y)`. Returns false (and does nothing) out of bounds.
    pub fn set(&mut self, x: i32, y: i32, tile: TileCode) -> bool {
        match self.index(x, y) {
            Some(index) => {
                self.tiles[index] = tile;
                true
            }
            None => false,
        }
    }

    /// Overwrites every cell with `tile`.
    pub fn fill(&mut self, tile: TileCode) {
        self.tiles.fill(tile);
    }

    /// Light at `(x, y)` from the last propagation pass; `0.0` out of bounds.
    ///
    /// Cells the pass reached but left dark hold [`UNLIT`].
    pub fn get_light(&self, x: i32, y: i32) -> f64 {
        self.index(x, y).map_or(0.0, |index| self.light[index])
    }

    pub(crate) fn set_light(&mut self, x: i32, y: i32, value: f64) {
        if let Some(index) = self.index(x, y) {
            self.light[index] = value;
        }
    }

    pub(crate) fn reset_light(&mut self) {
        self.light.fill(0.0);
    }

    pub(crate) fn set_seed(&mut self, seed: &str) {
        self.seed.clear();
        self.seed.push_str(seed);
    }

    /// True when the cell is inside the grid and not a wall.
    pub fn is_open(&self, x: i32, y: i32) -> bool {
        let tile = self.get(x, y);
        !tile.is_out_of_bounds() && !tile.is_wall()
    }

    /// In-bounds cells of the 8-neighbourhood of `(x, y)`, row by row.
    pub fn neighbors(&self, x: i32, y: i32) -> Neighbors {
        let mut out = Neighbors::new();
        let (x0, x1) = ((x - 1).max(0), (x + 1).min(self.width as i32 - 1));
        let (y0, y1) = ((y - 1).max(0), (y + 1).min(self.height as i32 - 1));
        for yy in y0..=y1 {
            for xx in x0..=x1 {
                if xx == x && yy == y {
                    continue;
                }
                out.push((GridVector::new(xx, yy), self.get(xx, yy)));
            }
        }
        out
    }

    /// Number of `WALL` cells in the in-bounds 8-neighbourhood of `(x, y)`.
    pub fn wall_neighbor_count(&self, x: i32, y: i32) -> usize {
        self.neighbors(x, y)
            .iter()
            .filter(|(_, tile)| tile.is_wall())
            .count()
    }

    /// Iterates `(position, tile)` over the whole grid, row by row.
    pub fn cells(&self) -> impl Iterator<Item = (GridVector, TileCode)> + '_ {
        let width = self.width as usize;
        self.tiles.iter().enumerate().map(move |(index, tile)| {
            let position = GridVector::new((index % width) as i32, (index / width) as i32);
            (position, *tile)
        })
    }

    /// SHA-256 over the dimensions and tile codes; equal layouts hash equally.
    pub fn layout_digest(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(self.width.to_le_bytes());
        hasher.update(self.height.to_le_bytes());
        for tile in &self.tiles {
            hasher.update(tile.0.to_le_bytes());
        }
        hasher.finalize().into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_bounds_queries_return_sentinels() {
        let zone = Zone::new(4, 3);
        assert_eq!(zone.get(-1, 0), TileCode::OUT_OF_BOUNDS);
        assert_eq!(zone.get(4, 0), TileCode::OUT_OF_BOUNDS);
        assert_eq!(zone.get(0, 3), TileCode::OUT_OF_BOUNDS);
        assert_eq!(zone.get_light(10, 10), 0.0);
        assert_eq!(zone.get(3, 2), TileCode::FLOOR);
    }

    #[test]
    fn set_outside_grid_is_ignored() {
        let mut zone = Zone::new(2, 2);
        assert!(!zone.set(2, 0, TileCode::WALL));
        assert!(zone.set(1, 1, TileCode::WALL));
        assert_eq!(zone.get(1, 1), TileCode::WALL);
    }

    #[test]
    fn isolated_wall_has_no_wall_neighbors() {
        let mut zone = Zone::new(10, 10);
        zone.set(5, 5, TileCode::WALL);
        assert_eq!(zone.wall_neighbor_count(5, 5), 0);
        assert_eq!(zone.wall_neighbor_count(4, 4), 1);
    }

    #[test]
    fn neighbors_are_clamped_at_edges() {
        let zone = Zone::new(5, 5);
        assert_eq!(zone.neighbors(0, 0).len(), 3);
        assert_eq!(zone.neighbors(4, 2).len(), 5);
        assert_eq!(zone.neighbors(2, 2).len(), 8);
    }

    #[test]
    fn wall_neighbor_count_ignores_other_codes() {
        let mut zone = Zone::new(3, 3);
        zone.set(0, 0, TileCode::WINDOW);
        zone.set(2, 0, TileCode::DOOR_CLOSED);
        zone.set(0, 2, TileCode::WALL);
        assert_eq!(zone.wall_neighbor_count(1, 1), 1);
    }

    #[test]
    fn built_zones_are_well_formed() {
        assert!(Zone::new(4, 3).is_well_formed());
        assert!(Zone::new(0, 0).is_well_formed());
        let mut zone = Zone::filled(2, 5, TileCode::WALL);
        zone.update_light(0, 0, 3, 0.1, 0.1);
        assert!(zone.is_well_formed());
    }

    #[test]
    fn layout_digest_tracks_tiles() {
        let mut a = Zone::new(6, 6);
        let b = Zone::new(6, 6);
        assert_eq!(hex::encode(a.layout_digest()), hex::encode(b.layout_digest()));
        a.set(3, 3, TileCode::WALL);
        assert_ne!(a.layout_digest(), b.layout_digest());
    }
}
