//! Ring-based light propagation.
//!
//! [`LightRings`] is derived data: for every ring radius it lists the offsets
//! on that ring together with the weighted offsets of the previous ring that
//! can illuminate them. The table is built once and replayed against a
//! [`Zone`] from any origin, so a propagation pass is a fixed sweep with no
//! graph search.

use std::sync::OnceLock;

use arrayvec::ArrayVec;

use crate::config::{GameConfig, LightConfig};
use crate::state::GridVector;

use super::{UNLIT, Zone};

/// Light a cell can attain before wall-density attenuation stops applying.
const ATTENUATION_CEILING: f64 = 0.99;
/// Light lost per adjacent wall in dense spots.
const WALL_ATTENUATION: f64 = 0.05;

/// Weighted offset on the previous ring that feeds a [`LightCell`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightSource {
    pub offset: GridVector,
    pub weight: f64,
}

/// One destination offset on a ring.
#[derive(Clone, Debug, PartialEq)]
pub struct LightCell {
    pub offset: GridVector,
    pub sources: ArrayVec<LightSource, 8>,
}

/// Concentric ring table shared by every propagation pass.
#[derive(Clone, Debug, PartialEq)]
pub struct LightRings {
    rings: Vec<Vec<LightCell>>,
}

impl LightRings {
    /// Builds rings `1..=depth`.
    pub fn new(depth: usize) -> Self {
        let mut rings = Vec::with_capacity(depth);
        if depth > 0 {
            rings.push(Self::first_ring());
        }
        for radius in 2..=depth as i32 {
            rings.push(Self::build_ring(radius));
        }
        Self { rings }
    }

    /// Process-wide table of depth [`GameConfig::MAX_LIGHT_RADIUS`].
    pub fn shared() -> &'static LightRings {
        static SHARED: OnceLock<LightRings> = OnceLock::new();
        SHARED.get_or_init(|| LightRings::new(GameConfig::MAX_LIGHT_RADIUS))
    }

    pub fn depth(&self) -> usize {
        self.rings.len()
    }

    /// Cells of ring `radius` (1-based); empty past the table depth.
    pub fn ring(&self, radius: usize) -> &[LightCell] {
        radius
            .checked_sub(1)
            .and_then(|index| self.rings.get(index))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = &[LightCell]> {
        self.rings.iter().map(Vec::as_slice)
    }

    fn first_ring() -> Vec<LightCell> {
        let origin = |weight| {
            let mut sources = ArrayVec::new();
            sources.push(LightSource {
                offset: GridVector::ZERO,
                weight,
            });
            sources
        };

        [
            (1, 0, 1.0),
            (0, 1, 1.0),
            (-1, 0, 1.0),
            (0, -1, 1.0),
            (1, 1, 0.99),
            (1, -1, 0.99),
            (-1, 1, 0.99),
            (-1, -1, 0.99),
        ]
        .into_iter()
        .map(|(x, y, weight)| LightCell {
            offset: GridVector::new(x, y),
            sources: origin(weight),
        })
        .collect()
    }

    fn build_ring(radius: i32) -> Vec<LightCell> {
        let mut cells = Vec::new();
        for y in -radius..=radius {
            for x in -radius..=radius {
                if x.abs() != radius && y.abs() != radius {
                    continue;
                }

                // Sources lie strictly inside this ring and never further out
                // than the destination on either axis.
                let mut offsets: ArrayVec<GridVector, 8> = ArrayVec::new();
                for sx in x - 1..=x + 1 {
                    for sy in y - 1..=y + 1 {
                        let inside = sx.abs() < radius && sy.abs() < radius;
                        let directed = sx.abs() <= x.abs() && sy.abs() <= y.abs();
                        if (sx, sy) != (x, y) && inside && directed {
                            offsets.push(GridVector::new(sx, sy));
                        }
                    }
                }

                let sole = offsets.len() == 1;
                let sources = offsets
                    .into_iter()
                    .map(|offset| {
                        let weight = if sole || offset.x == x || offset.y == y {
                            1.0
                        } else {
                            0.7
                        };
                        LightSource { offset, weight }
                    })
                    .collect();

                cells.push(LightCell {
                    offset: GridVector::new(x, y),
                    sources,
                });
            }
        }
        cells
    }
}

impl Zone {
    /// Recomputes the light grid from a single origin using the shared ring table.
    ///
    /// Every cell is reset to `0.0`, the origin is set to `1.0`, then rings
    /// `1..=min(range, depth)` are swept outward. Walls receive light on their
    /// face but never pass it on. Cells a ring reaches but leaves below the
    /// dispersion threshold hold [`UNLIT`].
    pub fn update_light(&mut self, x: i32, y: i32, range: usize, dispersion: f64, darkness: f64) {
        self.update_light_with(LightRings::shared(), x, y, range, dispersion, darkness);
    }

    /// [`Zone::update_light`] with parameters taken from a [`LightConfig`].
    pub fn update_light_from(&mut self, origin: GridVector, config: &LightConfig) {
        self.update_light(
            origin.x,
            origin.y,
            config.range,
            config.dispersion,
            config.darkness,
        );
    }

    /// [`Zone::update_light`] against an explicit ring table.
    pub fn update_light_with(
        &mut self,
        rings: &LightRings,
        x: i32,
        y: i32,
        range: usize,
        dispersion: f64,
        darkness: f64,
    ) {
        self.reset_light();
        self.set_light(x, y, 1.0);

        let mut falloff = 1.0;
        for ring in rings.iter().take(range) {
            for cell in ring {
                let (cx, cy) = (x + cell.offset.x, y + cell.offset.y);
                let blocked = self.get(cx, cy).is_wall();

                let mut sum: f64 = 0.0;
                for source in &cell.sources {
                    let (sx, sy) = (x + source.offset.x, y + source.offset.y);
                    if source.offset.is_zero() || !self.get(sx, sy).is_wall() {
                        sum = sum.max(self.get_light(sx, sy) * source.weight);
                    }
                }

                if !blocked && sum <= ATTENUATION_CEILING {
                    let walls = self.wall_neighbor_count(cx, cy) as f64;
                    if walls >= 3.0 + 3.0 * sum {
                        sum = (sum - WALL_ATTENUATION * walls).max(0.0);
                    }
                }

                if sum < dispersion * falloff {
                    sum = 0.0;
                }

                let value = if sum > 0.0 {
                    falloff * sum.min(1.0)
                } else {
                    UNLIT
                };
                self.set_light(cx, cy, value);
            }
            falloff *= 1.0 - darkness;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zone::TileCode;

    #[test]
    fn ring_table_shape() {
        let rings = LightRings::new(6);
        assert_eq!(rings.depth(), 6);
        for radius in 1..=6 {
            let ring = rings.ring(radius);
            assert_eq!(ring.len(), 8 * radius, "ring {radius}");
            for cell in ring {
                assert_eq!(cell.offset.chebyshev_len() as usize, radius);
                assert!(!cell.sources.is_empty());
                for source in &cell.sources {
                    assert_eq!(source.offset.chebyshev_len() as usize, radius - 1);
                    assert!(source.weight > 0.0 && source.weight <= 1.0);
                }
            }
        }
        assert!(rings.ring(0).is_empty());
        assert!(rings.ring(7).is_empty());
    }

    #[test]
    fn shared_table_has_max_depth() {
        assert_eq!(LightRings::shared().depth(), GameConfig::MAX_LIGHT_RADIUS);
    }

    #[test]
    fn origin_is_fully_lit() {
        let mut zone = Zone::new(15, 15);
        zone.update_light(7, 7, 10, 0.1, 0.1);
        assert_eq!(zone.get_light(7, 7), 1.0);
        for (position, _) in zone.cells() {
            assert!(zone.get_light(position.x, position.y) <= 1.0);
        }
    }

    #[test]
    fn light_fades_along_open_corridor() {
        let mut zone = Zone::new(21, 21);
        zone.update_light(10, 10, 10, 0.05, 0.1);
        let mut previous = zone.get_light(10, 10);
        for x in 11..=18 {
            let current = zone.get_light(x, 10);
            assert!(
                current <= previous,
                "light rose from {previous} to {current} at x={x}"
            );
            previous = current;
        }
    }

    #[test]
    fn walls_are_lit_but_block_propagation() {
        let mut zone = Zone::new(15, 11);
        for y in 0..11 {
            zone.set(7, y, TileCode::WALL);
        }
        zone.update_light(5, 5, 10, 0.1, 0.1);

        assert!(zone.get_light(7, 5) > 0.0, "wall face should be lit");
        for y in 0..11 {
            for x in 8..15 {
                assert!(
                    zone.get_light(x, y) <= 0.0,
                    "({x}, {y}) behind the wall received light"
                );
            }
        }
    }

    #[test]
    fn dim_cells_between_dense_walls_lose_light() {
        // One-wide corridor along y = 1, lit from its west end. With darkness
        // 0.5 the cell at x = 3 receives 0.5 from x = 2 on ring 3 (falloff 0.25).
        let corridor = |walled_below: bool| {
            let mut zone = Zone::new(5, 3);
            for x in 0..5 {
                zone.set(x, 0, TileCode::WALL);
                if walled_below {
                    zone.set(x, 2, TileCode::WALL);
                }
            }
            zone.update_light(0, 1, 3, 0.0, 0.5);
            zone
        };

        // Three walls around (3, 1): below the 3 + 3 * 0.5 threshold.
        let open = corridor(false);
        assert_eq!(open.wall_neighbor_count(3, 1), 3);
        assert_eq!(open.get_light(2, 1), 0.5);
        assert!((open.get_light(3, 1) - 0.125).abs() < 1e-9);

        // Six walls: the cell loses 0.05 per wall before falloff.
        let dense = corridor(true);
        assert_eq!(dense.wall_neighbor_count(3, 1), 6);
        assert_eq!(dense.get_light(2, 1), 0.5);
        assert!((dense.get_light(3, 1) - 0.25 * (0.5 - 0.05 * 6.0)).abs() < 1e-9);
    }

    #[test]
    fn bright_cells_ignore_wall_density() {
        // Full-strength light (sum above 0.99) is never attenuated.
        let mut zone = Zone::new(3, 3);
        for (x, y) in [(0, 0), (1, 0), (2, 0), (0, 2), (1, 2), (2, 2), (2, 1)] {
            zone.set(x, y, TileCode::WALL);
        }
        zone.update_light(0, 1, 1, 0.0, 0.5);
        assert_eq!(zone.wall_neighbor_count(1, 1), 7);
        assert_eq!(zone.get_light(1, 1), 1.0);
    }

    #[test]
    fn range_limits_reach() {
        let mut zone = Zone::new(21, 21);
        zone.update_light(10, 10, 2, 0.0, 0.0);
        assert!(zone.get_light(12, 10) > 0.0);
        assert_eq!(zone.get_light(13, 10), 0.0);
    }

    #[test]
    fn dispersion_threshold_leaves_cells_unlit() {
        let mut zone = Zone::new(21, 21);
        zone.update_light(10, 10, 10, 0.95, 0.5);
        assert_eq!(zone.get_light(10, 10), 1.0);
        assert_eq!(zone.get_light(15, 10), UNLIT);
    }

    #[test]
    fn recompute_resets_previous_pass() {
        let mut zone = Zone::new(21, 21);
        zone.update_light(2, 2, 3, 0.1, 0.1);
        assert!(zone.get_light(3, 2) > 0.0);
        zone.update_light(18, 18, 3, 0.1, 0.1);
        assert_eq!(zone.get_light(3, 2), 0.0);
        assert_eq!(zone.get_light(18, 18), 1.0);
    }
}
