use crate::state::GridVector;

/// Simulation constants and tunable parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameConfig {
    /// Light propagation parameters applied on every world update.
    pub light: LightConfig,
    /// Procedural generation parameters for new zones.
    pub maze: MazeConfig,
    /// Spatial index tuning.
    pub spatial: SpatialConfig,
    /// Pixel size of one tile, used by render interpolation.
    pub tile_size: f64,
}

impl GameConfig {
    // ===== compile-time constants =====
    /// Deepest ring of the shared light ring table.
    pub const MAX_LIGHT_RADIUS: usize = 10;
    /// Safety cap on maze growth iterations.
    pub const MAX_MAZE_ITERATIONS: usize = 10_000;
    /// Safety cap on spatial index root expansions per insertion.
    pub const MAX_EXPANSIONS: usize = 1_000;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_TILE_SIZE: f64 = 64.0;

    pub fn new() -> Self {
        Self {
            light: LightConfig::default(),
            maze: MazeConfig::default(),
            spatial: SpatialConfig::default(),
            tile_size: Self::DEFAULT_TILE_SIZE,
        }
    }

    pub fn with_light(mut self, light: LightConfig) -> Self {
        self.light = light;
        self
    }

    pub fn with_maze(mut self, maze: MazeConfig) -> Self {
        self.maze = maze;
        self
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Parameters of [`crate::zone::Zone::update_light`].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LightConfig {
    /// Number of rings propagated outward from the origin.
    pub range: usize,
    /// Values below `dispersion * falloff` are treated as unlit.
    pub dispersion: f64,
    /// Per-ring multiplicative falloff is `1 - darkness`.
    pub darkness: f64,
}

impl LightConfig {
    pub const DEFAULT_RANGE: usize = 10;
    pub const DEFAULT_DISPERSION: f64 = 0.1;
    pub const DEFAULT_DARKNESS: f64 = 0.1;
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            range: Self::DEFAULT_RANGE,
            dispersion: Self::DEFAULT_DISPERSION,
            darkness: Self::DEFAULT_DARKNESS,
        }
    }
}

/// Parameters of the coarse-lattice maze growth.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MazeConfig {
    /// Root open cell; should sit on even coordinates.
    pub start: GridVector,
    /// Probability of carving an extra loop into an already open neighbour.
    pub reconnect_chance: f64,
    /// Probability that a cell with no fresh neighbour stays active.
    pub branch_chance: f64,
    /// Probability of keeping a one-wide wall protrusion.
    pub freewall_keep_chance: f64,
    /// Probability of keeping an isolated single-cell pillar.
    pub pillar_keep_chance: f64,
    /// Growth iteration cap.
    pub max_iterations: usize,
}

impl MazeConfig {
    pub const DEFAULT_RECONNECT_CHANCE: f64 = 0.2;
    pub const DEFAULT_BRANCH_CHANCE: f64 = 0.4;
}

impl Default for MazeConfig {
    fn default() -> Self {
        Self {
            start: GridVector::ZERO,
            reconnect_chance: Self::DEFAULT_RECONNECT_CHANCE,
            branch_chance: Self::DEFAULT_BRANCH_CHANCE,
            freewall_keep_chance: 0.0,
            pillar_keep_chance: 0.0,
            max_iterations: GameConfig::MAX_MAZE_ITERATIONS,
        }
    }
}

/// Tuning of the adaptive quadrant tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpatialConfig {
    /// References a leaf holds before it subdivides.
    pub cell_capacity: usize,
    /// Leaves at or below this half-width never subdivide.
    pub min_half_width: i64,
    /// Half-width of the root cell centred on the origin.
    pub initial_half_width: i64,
}

impl SpatialConfig {
    pub const DEFAULT_CELL_CAPACITY: usize = 10;
    pub const DEFAULT_MIN_HALF_WIDTH: i64 = 10;
    pub const DEFAULT_INITIAL_HALF_WIDTH: i64 = 64;
}

impl Default for SpatialConfig {
    fn default() -> Self {
        Self {
            cell_capacity: Self::DEFAULT_CELL_CAPACITY,
            min_half_width: Self::DEFAULT_MIN_HALF_WIDTH,
            initial_half_width: Self::DEFAULT_INITIAL_HALF_WIDTH,
        }
    }
}
