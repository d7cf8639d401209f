//! Seeded growth of a maze on the coarse lattice.
//!
//! Room cells sit on even coordinates; the odd cells between them are
//! corridors (when carved) or walls. Growth keeps a list of active open cells
//! and repeatedly extends a random one towards a random closed lattice
//! neighbour, occasionally carving an extra loop into an already open one.

use arrayvec::ArrayVec;
use tracing::{debug, warn};

use crate::config::MazeConfig;
use crate::error::{ErrorSeverity, GameError};
use crate::rng::SeededStream;
use crate::state::GridVector;

use super::{TileCode, Zone};

/// Summary of a finished generation pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MazeReport {
    /// Growth iterations performed.
    pub iterations: usize,
    /// Extra loops carved between already connected cells.
    pub loops: usize,
    /// Wall protrusions and pillars opened by post-processing.
    pub removed_walls: usize,
    /// Non-wall cells after generation.
    pub open_cells: usize,
}

/// Generation anomalies. The zone keeps whatever was carved before the failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    #[error("maze start {start} lies outside the zone")]
    StartOutOfBounds { start: GridVector },

    #[error("maze growth stopped after {iterations} iterations with {open_cells} open cells")]
    IterationCapReached { iterations: usize, open_cells: usize },
}

impl GameError for GenerationError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Internal
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::StartOutOfBounds { .. } => "MAZE_START_OUT_OF_BOUNDS",
            Self::IterationCapReached { .. } => "MAZE_ITERATION_CAP",
        }
    }
}

const LATTICE_STEPS: [GridVector; 4] = [
    GridVector::new(2, 0),
    GridVector::new(-2, 0),
    GridVector::new(0, 2),
    GridVector::new(0, -2),
];

impl Zone {
    /// Regenerates the zone as a maze using [`MazeConfig::default`].
    pub fn create_maze(&mut self, seed: &str) -> Result<MazeReport, GenerationError> {
        self.create_maze_with(seed, &MazeConfig::default())
    }

    /// Regenerates the zone as a maze.
    ///
    /// The same seed and config on zones of equal dimensions always produce
    /// the same grid. Hitting the iteration cap keeps the partial maze and
    /// returns [`GenerationError::IterationCapReached`].
    pub fn create_maze_with(
        &mut self,
        seed: &str,
        config: &MazeConfig,
    ) -> Result<MazeReport, GenerationError> {
        self.set_seed(seed);
        self.fill(TileCode::WALL);
        self.reset_light();

        let start = config.start;
        if !self.contains(start.x, start.y) {
            warn!(%start, width = self.width(), height = self.height(), "maze start outside zone");
            return Err(GenerationError::StartOutOfBounds { start });
        }

        let mut stream = SeededStream::new(seed);
        let mut active = vec![start];
        let mut iterations = 0;
        let mut loops = 0;
        let mut capped = false;
        self.open(start);

        while !active.is_empty() {
            if iterations >= config.max_iterations {
                capped = true;
                break;
            }
            iterations += 1;

            let picked = stream.next_index(active.len());
            let cell = active[picked];
            self.open(cell);

            let candidates = self.lattice_neighbors(cell);
            let mut fresh = false;
            for _ in 0..candidates.len() * 2 {
                let next = candidates[stream.next_index(candidates.len())];
                let mid = GridVector::new((cell.x + next.x) / 2, (cell.y + next.y) / 2);

                if self.is_open(mid.x, mid.y) {
                    continue;
                }
                if self.is_open(next.x, next.y) {
                    if stream.chance(config.reconnect_chance) {
                        self.open(mid);
                        loops += 1;
                        break;
                    }
                    continue;
                }

                self.open(next);
                self.open(mid);
                active.push(next);
                fresh = true;
                break;
            }

            if !fresh && !stream.chance(config.branch_chance) {
                active.remove(picked);
            }
        }

        let removed_walls = self.remove_stray_walls(&mut stream, config);
        let open_cells = self.cells().filter(|(_, tile)| !tile.is_wall()).count();

        if capped {
            warn!(
                seed,
                iterations,
                open_cells,
                pending = active.len(),
                "maze growth hit its iteration cap; layout may be incomplete"
            );
            return Err(GenerationError::IterationCapReached {
                iterations,
                open_cells,
            });
        }

        debug!(seed, iterations, loops, removed_walls, open_cells, "maze generated");
        Ok(MazeReport {
            iterations,
            loops,
            removed_walls,
            open_cells,
        })
    }

    fn open(&mut self, cell: GridVector) {
        self.set(cell.x, cell.y, TileCode::FLOOR);
    }

    fn lattice_neighbors(&self, cell: GridVector) -> ArrayVec<GridVector, 4> {
        LATTICE_STEPS
            .iter()
            .map(|step| cell + *step)
            .filter(|next| self.contains(next.x, next.y))
            .collect()
    }

    /// Opens one-wide wall protrusions and isolated pillars on the junction
    /// posts (odd, odd) according to their keep chances.
    fn remove_stray_walls(&mut self, stream: &mut SeededStream, config: &MazeConfig) -> usize {
        let mut removed = 0;
        for y in (1..self.height() as i32).step_by(2) {
            for x in (1..self.width() as i32).step_by(2) {
                if !self.get(x, y).is_wall() {
                    continue;
                }

                let walls = [(1, 0), (-1, 0), (0, 1), (0, -1)]
                    .iter()
                    .filter(|(dx, dy)| !self.is_open(x + dx, y + dy))
                    .count();
                let keep_chance = match walls {
                    0 => config.pillar_keep_chance,
                    1 => config.freewall_keep_chance,
                    _ => continue,
                };

                if !stream.chance(keep_chance) {
                    self.set(x, y, TileCode::FLOOR);
                    removed += 1;
                }
            }
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeSet, VecDeque};

    use super::*;
    use crate::config::GameConfig;

    fn reachable_from(zone: &Zone, start: GridVector) -> BTreeSet<GridVector> {
        let mut seen = BTreeSet::from([start]);
        let mut queue = VecDeque::from([start]);
        while let Some(cell) = queue.pop_front() {
            for step in [GridVector::UP, GridVector::DOWN, GridVector::LEFT, GridVector::RIGHT] {
                let next = cell + step;
                if zone.is_open(next.x, next.y) && seen.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        seen
    }

    #[test]
    fn same_seed_same_layout() {
        let mut a = Zone::new(31, 21);
        let mut b = Zone::new(31, 21);
        a.create_maze("barrow").unwrap();
        b.create_maze("barrow").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.layout_digest(), b.layout_digest());
        assert_eq!(a.seed(), "barrow");
    }

    #[test]
    fn different_seeds_produce_different_layouts() {
        let mut a = Zone::new(31, 31);
        let mut b = Zone::new(31, 31);
        a.create_maze("first").unwrap();
        b.create_maze("second").unwrap();
        assert_ne!(a.layout_digest(), b.layout_digest());
    }

    #[test]
    fn carved_cells_form_one_connected_region() {
        let mut zone = Zone::new(41, 25);
        let report = zone.create_maze("catacomb").unwrap();

        let start = GameConfig::default().maze.start;
        assert!(zone.is_open(start.x, start.y));

        let reachable = reachable_from(&zone, start);
        assert_eq!(reachable.len(), report.open_cells);
    }

    #[test]
    fn odd_junctions_are_never_left_as_stubs_or_pillars() {
        let mut zone = Zone::new(33, 33);
        zone.create_maze("posts").unwrap();

        for y in (1..33).step_by(2) {
            for x in (1..33).step_by(2) {
                if !zone.get(x, y).is_wall() {
                    continue;
                }
                let walls = [(1, 0), (-1, 0), (0, 1), (0, -1)]
                    .iter()
                    .filter(|(dx, dy)| !zone.is_open(x + dx, y + dy))
                    .count();
                assert!(walls >= 2, "post ({x}, {y}) has {walls} wall neighbours");
            }
        }
    }

    #[test]
    fn iteration_cap_keeps_partial_maze() {
        let mut zone = Zone::new(41, 41);
        let config = MazeConfig {
            max_iterations: 3,
            ..MazeConfig::default()
        };

        let err = zone.create_maze_with("short", &config).unwrap_err();
        match err {
            GenerationError::IterationCapReached { iterations, open_cells } => {
                assert_eq!(iterations, 3);
                assert!(open_cells >= 1);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(zone.is_open(0, 0));
        assert_eq!(err.severity(), ErrorSeverity::Internal);
    }

    #[test]
    fn start_outside_zone_is_reported() {
        let mut zone = Zone::new(4, 4);
        let config = MazeConfig {
            start: GridVector::new(8, 8),
            ..MazeConfig::default()
        };
        assert_eq!(
            zone.create_maze_with("nowhere", &config),
            Err(GenerationError::StartOutOfBounds {
                start: GridVector::new(8, 8)
            })
        );
    }
}
