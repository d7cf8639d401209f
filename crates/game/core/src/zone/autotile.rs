//! Local wall-shape classification used to pick matching wall visuals.
//!
//! Each wall cell is classified from the openness of its eight neighbours.
//! Cardinal openness decides the family; a diagonal corner only matters when
//! both cardinals next to it are closed, which makes the mapping from the
//! 8-bit pattern to a shape total and unambiguous.

use bitflags::bitflags;

use super::Zone;

bitflags! {
    /// Which neighbours of a cell are open (inside the grid and not `WALL`).
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct Openness: u8 {
        const UP         = 1 << 0;
        const DOWN       = 1 << 1;
        const LEFT       = 1 << 2;
        const RIGHT      = 1 << 3;
        const UP_LEFT    = 1 << 4;
        const UP_RIGHT   = 1 << 5;
        const DOWN_LEFT  = 1 << 6;
        const DOWN_RIGHT = 1 << 7;

        const CARDINALS = Self::UP.bits() | Self::DOWN.bits() | Self::LEFT.bits() | Self::RIGHT.bits();
    }
}

impl Openness {
    /// Diagonal corners whose two adjacent cardinals are both closed.
    pub fn enclosed_corners(self) -> Openness {
        let mut corners = Openness::empty();
        let closed = |side: Openness| !self.contains(side);
        if closed(Self::UP) && closed(Self::LEFT) {
            corners |= self & Self::UP_LEFT;
        }
        if closed(Self::UP) && closed(Self::RIGHT) {
            corners |= self & Self::UP_RIGHT;
        }
        if closed(Self::DOWN) && closed(Self::LEFT) {
            corners |= self & Self::DOWN_LEFT;
        }
        if closed(Self::DOWN) && closed(Self::RIGHT) {
            corners |= self & Self::DOWN_RIGHT;
        }
        corners
    }
}

/// Symbolic local wall shape. The string form is the sprite key suffix.
///
/// Letters name the open sides (`u`p, `d`own, `l`eft, `r`ight); a `c` marks
/// open corners on the closed side; `cn..` means "every corner except".
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::AsRefStr,
    strum::EnumString,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "lowercase")]
pub enum WallShape {
    /// Not a wall.
    Floor,
    /// Isolated wall: all four sides open. This is the shape of a lone
    /// wall cell with no wall neighbours.
    #[doc(alias = "isolated")]
    Pillar,

    // Three sides open.
    Lru,
    Lrd,
    Udr,
    Udl,

    // Two opposite sides open.
    Lr,
    Ud,

    // Two adjacent sides open, optionally with the far corner open.
    Ul,
    Ur,
    Dl,
    Dr,
    Ulc,
    Urc,
    Dlc,
    Drc,

    // One side open, with the corners of the opposite side.
    U,
    Ucl,
    Ucr,
    Uclr,
    D,
    Dcl,
    Dcr,
    Dclr,
    L,
    Lcu,
    Lcd,
    Lcud,
    R,
    Rcu,
    Rcd,
    Rcud,

    // All sides closed; shape decided by open corners alone.
    #[strum(serialize = "n")]
    None,
    #[strum(serialize = "call")]
    CornerAll,
    Cndr,
    Cnur,
    Cndl,
    Cnul,
    Cdr,
    Cur,
    Cdl,
    Cul,
    Cl,
    Cr,
    Cu,
    Cd,
    Cfor,
    Cback,
}

impl WallShape {
    /// Classifies a wall cell from its neighbour openness.
    pub fn classify(open: Openness) -> WallShape {
        let up = open.contains(Openness::UP);
        let down = open.contains(Openness::DOWN);
        let left = open.contains(Openness::LEFT);
        let right = open.contains(Openness::RIGHT);
        let corners = open.enclosed_corners();
        let ul = corners.contains(Openness::UP_LEFT);
        let ur = corners.contains(Openness::UP_RIGHT);
        let dl = corners.contains(Openness::DOWN_LEFT);
        let dr = corners.contains(Openness::DOWN_RIGHT);

        match (up, down, left, right) {
            (true, true, true, true) => WallShape::Pillar,

            (true, false, true, true) => WallShape::Lru,
            (false, true, true, true) => WallShape::Lrd,
            (true, true, false, true) => WallShape::Udr,
            (true, true, true, false) => WallShape::Udl,

            (false, false, true, true) => WallShape::Lr,
            (true, true, false, false) => WallShape::Ud,

            (true, false, true, false) => pick(dr, WallShape::Ulc, WallShape::Ul),
            (true, false, false, true) => pick(dl, WallShape::Urc, WallShape::Ur),
            (false, true, true, false) => pick(ur, WallShape::Dlc, WallShape::Dl),
            (false, true, false, true) => pick(ul, WallShape::Drc, WallShape::Dr),

            (true, false, false, false) => match (dl, dr) {
                (true, true) => WallShape::Uclr,
                (true, false) => WallShape::Ucl,
                (false, true) => WallShape::Ucr,
                (false, false) => WallShape::U,
            },
            (false, true, false, false) => match (ul, ur) {
                (true, true) => WallShape::Dclr,
                (true, false) => WallShape::Dcl,
                (false, true) => WallShape::Dcr,
                (false, false) => WallShape::D,
            },
            (false, false, true, false) => match (ur, dr) {
                (true, true) => WallShape::Lcud,
                (true, false) => WallShape::Lcu,
                (false, true) => WallShape::Lcd,
                (false, false) => WallShape::L,
            },
            (false, false, false, true) => match (ul, dl) {
                (true, true) => WallShape::Rcud,
                (true, false) => WallShape::Rcu,
                (false, true) => WallShape::Rcd,
                (false, false) => WallShape::R,
            },

            (false, false, false, false) => match (ul, ur, dl, dr) {
                (true, true, true, true) => WallShape::CornerAll,
                (true, true, true, false) => WallShape::Cndr,
                (true, true, false, true) => WallShape::Cndl,
                (true, false, true, true) => WallShape::Cnur,
                (false, true, true, true) => WallShape::Cnul,
                (true, true, false, false) => WallShape::Cu,
                (false, false, true, true) => WallShape::Cd,
                (true, false, true, false) => WallShape::Cl,
                (false, true, false, true) => WallShape::Cr,
                (false, true, true, false) => WallShape::Cfor,
                (true, false, false, true) => WallShape::Cback,
                (true, false, false, false) => WallShape::Cul,
                (false, true, false, false) => WallShape::Cur,
                (false, false, true, false) => WallShape::Cdl,
                (false, false, false, true) => WallShape::Cdr,
                (false, false, false, false) => WallShape::None,
            },
        }
    }
}

fn pick(corner: bool, with_corner: WallShape, plain: WallShape) -> WallShape {
    if corner { with_corner } else { plain }
}

impl Zone {
    /// Openness of the eight neighbours of `(x, y)`; out-of-bounds counts as closed.
    pub fn openness(&self, x: i32, y: i32) -> Openness {
        const OFFSETS: [(i32, i32, Openness); 8] = [
            (0, -1, Openness::UP),
            (0, 1, Openness::DOWN),
            (-1, 0, Openness::LEFT),
            (1, 0, Openness::RIGHT),
            (-1, -1, Openness::UP_LEFT),
            (1, -1, Openness::UP_RIGHT),
            (-1, 1, Openness::DOWN_LEFT),
            (1, 1, Openness::DOWN_RIGHT),
        ];

        OFFSETS
            .iter()
            .filter(|(dx, dy, _)| self.is_open(x + dx, y + dy))
            .fold(Openness::empty(), |acc, (_, _, flag)| acc | *flag)
    }

    /// Local wall shape at `(x, y)`.
    ///
    /// Returns `None` outside the grid and [`WallShape::Floor`] for non-wall cells.
    pub fn wall_direction(&self, x: i32, y: i32) -> Option<WallShape> {
        let tile = self.get(x, y);
        if tile.is_out_of_bounds() {
            return None;
        }
        if !tile.is_wall() {
            return Some(WallShape::Floor);
        }
        Some(WallShape::classify(self.openness(x, y)))
    }
}
