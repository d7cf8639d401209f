use core::fmt;
use core::ops::{Add, AddAssign, Sub};

/// Unique identifier for any entity tracked by the world.
///
/// Ids are assigned by the owning registry and stay stable for the lifetime
/// of the entity. Other components (spatial index, queued tasks) refer to
/// entities through this id only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityId(pub u32);

impl EntityId {
    pub const FIRST: Self = Self(0);

    /// Returns the id that follows this one.
    #[inline]
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Discrete grid coordinate (or displacement) expressed in tiles.
///
/// `y` grows downwards: "up" is `y - 1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridVector {
    pub x: i32,
    pub y: i32,
}

impl GridVector {
    pub const ZERO: Self = Self { x: 0, y: 0 };
    pub const UP: Self = Self { x: 0, y: -1 };
    pub const DOWN: Self = Self { x: 0, y: 1 };
    pub const LEFT: Self = Self { x: -1, y: 0 };
    pub const RIGHT: Self = Self { x: 1, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Chebyshev length (king-move distance), saturating at `i32::MAX`.
    pub fn chebyshev_len(self) -> i32 {
        let len = self.x.unsigned_abs().max(self.y.unsigned_abs());
        i32::try_from(len).unwrap_or(i32::MAX)
    }

    /// Component-wise sum, or `None` when either axis overflows.
    pub fn checked_add(self, rhs: GridVector) -> Option<Self> {
        Some(Self::new(self.x.checked_add(rhs.x)?, self.y.checked_add(rhs.y)?))
    }

    pub fn is_zero(self) -> bool {
        self.x == 0 && self.y == 0
    }

    /// True when both components are non-zero.
    pub fn is_diagonal(self) -> bool {
        self.x != 0 && self.y != 0
    }

    /// Component-wise sign, e.g. `(3, -2)` becomes `(1, -1)`.
    pub fn signum(self) -> Self {
        Self::new(self.x.signum(), self.y.signum())
    }

    /// Snaps the vector to one of the eight unit grid directions.
    ///
    /// A vector whose minor component is below `sin(22.5°)` times its major
    /// component collapses onto the major axis; anything steeper becomes a
    /// diagonal. The zero vector maps to itself.
    pub fn grid_direction(self) -> Self {
        const SECTOR_SLOPE: f64 = 0.382_683_432_36;

        if self.is_zero() {
            return Self::ZERO;
        }

        let x = f64::from(self.x);
        let y = f64::from(self.y);
        if x > 0.0 {
            if y > 0.0 {
                if y < x * SECTOR_SLOPE {
                    Self::RIGHT
                } else if x < y * SECTOR_SLOPE {
                    Self::DOWN
                } else {
                    Self::new(1, 1)
                }
            } else if y > x * -SECTOR_SLOPE {
                Self::RIGHT
            } else if x < y * -SECTOR_SLOPE {
                Self::UP
            } else {
                Self::new(1, -1)
            }
        } else if y > 0.0 {
            if y < x * -SECTOR_SLOPE {
                Self::LEFT
            } else if x > y * -SECTOR_SLOPE {
                Self::DOWN
            } else {
                Self::new(-1, 1)
            }
        } else if y > x * SECTOR_SLOPE {
            Self::LEFT
        } else if x > y * SECTOR_SLOPE {
            Self::UP
        } else {
            Self::new(-1, -1)
        }
    }
}

impl Add for GridVector {
    type Output = GridVector;

    fn add(self, rhs: GridVector) -> GridVector {
        GridVector::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for GridVector {
    fn add_assign(&mut self, rhs: GridVector) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for GridVector {
    type Output = GridVector;

    fn sub(self, rhs: GridVector) -> GridVector {
        GridVector::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl From<(i32, i32)> for GridVector {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

impl fmt::Display for GridVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Discrete simulation step counter, advanced only by the scheduler.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Self = Self(0);

    pub fn new(value: u64) -> Self {
        Self(value)
    }
}

impl Add<u64> for Tick {
    type Output = Tick;
    fn add(self, rhs: u64) -> Tick {
        Tick(self.0 + rhs)
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_direction_snaps_to_octants() {
        assert_eq!(GridVector::new(5, 1).grid_direction(), GridVector::RIGHT);
        assert_eq!(GridVector::new(1, 5).grid_direction(), GridVector::DOWN);
        assert_eq!(GridVector::new(3, 3).grid_direction(), GridVector::new(1, 1));
        assert_eq!(GridVector::new(-4, -3).grid_direction(), GridVector::new(-1, -1));
        assert_eq!(GridVector::new(0, -2).grid_direction(), GridVector::UP);
        assert_eq!(GridVector::new(-2, 0).grid_direction(), GridVector::LEFT);
        assert_eq!(GridVector::ZERO.grid_direction(), GridVector::ZERO);
    }

    #[test]
    fn chebyshev_len_uses_major_axis() {
        assert_eq!(GridVector::new(2, -5).chebyshev_len(), 5);
        assert_eq!(GridVector::new(-3, 1).chebyshev_len(), 3);
        assert_eq!(GridVector::ZERO.chebyshev_len(), 0);
        assert_eq!(GridVector::new(i32::MIN, 0).chebyshev_len(), i32::MAX);
        assert_eq!(GridVector::new(7, i32::MIN + 1).chebyshev_len(), i32::MAX);
    }

    #[test]
    fn checked_add_reports_overflow() {
        let origin = GridVector::new(3, -2);
        assert_eq!(origin.checked_add(GridVector::new(1, 1)), Some(GridVector::new(4, -1)));
        assert_eq!(origin.checked_add(GridVector::new(i32::MAX, 0)), None);
        assert_eq!(origin.checked_add(GridVector::new(0, i32::MIN)), None);
    }
}
