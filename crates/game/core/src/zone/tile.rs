use core::fmt;

/// Terrain code of a single grid cell.
///
/// The set of codes is open: zones may carry codes this crate does not name.
/// Exactly one code, [`TileCode::WALL`], blocks light and counts as a wall
/// neighbour. Movement blocking is decided by [`TileProperties`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct TileCode(pub i32);

impl TileCode {
    /// Sentinel returned for coordinates outside the grid.
    pub const OUT_OF_BOUNDS: Self = Self(-1);
    pub const FLOOR: Self = Self(0);
    pub const WINDOW: Self = Self(1);
    pub const CURTAIN: Self = Self(2);
    pub const DOOR_CLOSED: Self = Self(3);
    pub const DOOR_OPEN: Self = Self(4);
    pub const WALL: Self = Self(100);

    #[inline]
    pub const fn is_wall(self) -> bool {
        self.0 == Self::WALL.0
    }

    #[inline]
    pub const fn is_out_of_bounds(self) -> bool {
        self.0 == Self::OUT_OF_BOUNDS.0
    }

    pub const fn is_door(self) -> bool {
        self.0 == Self::DOOR_CLOSED.0 || self.0 == Self::DOOR_OPEN.0
    }

    /// Movement/collision properties of this code.
    pub const fn properties(self) -> TileProperties {
        TileProperties::of(self)
    }
}

impl fmt::Display for TileCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::OUT_OF_BOUNDS => f.write_str("out_of_bounds"),
            Self::FLOOR => f.write_str("floor"),
            Self::WINDOW => f.write_str("window"),
            Self::CURTAIN => f.write_str("curtain"),
            Self::DOOR_CLOSED => f.write_str("door_closed"),
            Self::DOOR_OPEN => f.write_str("door_open"),
            Self::WALL => f.write_str("wall"),
            Self(code) => write!(f, "tile_{code}"),
        }
    }
}

/// Per-code lookup table consulted by movement legality checks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileProperties {
    /// Actors cannot enter a colliding tile.
    pub collision: bool,
}

impl TileProperties {
    pub const fn of(code: TileCode) -> Self {
        let collision = matches!(
            code,
            TileCode::WALL | TileCode::WINDOW | TileCode::DOOR_CLOSED
        );
        Self { collision }
    }
}
