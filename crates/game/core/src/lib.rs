//! Deterministic dungeon simulation core.
//!
//! `game-core` holds the canonical world model (actors, zones, light) and the
//! algorithms that act on it: seeded maze generation, wall-shape
//! classification, ring-based light propagation, an adaptive spatial index
//! and movement resolution. Everything is single-threaded, clock-free and a
//! pure function of its inputs and seed strings; pacing in real time is the
//! runtime crate's job.
pub mod action;
pub mod config;
pub mod error;
pub mod rng;
pub mod spatial;
pub mod state;
pub mod world;
pub mod zone;

pub use action::{MoveError, MoveOutcome, MoveTask, Rounding, Task, TaskOutcome};
pub use config::{GameConfig, LightConfig, MazeConfig, SpatialConfig};
pub use error::{ErrorSeverity, GameError};
pub use rng::SeededStream;
pub use spatial::{SpatialIndex, SpatialIndexError};
pub use state::{
    Actor, ActorData, ActorType, Capability, DestroyOutcome, DoorState, EntityId, Facing,
    GridVector, Tick,
};
pub use world::{
    HookContext, HookRegistry, RenderState, UpdateHook, World, WorldError, WorldSnapshot,
};
pub use zone::{
    GenerationError, LightRings, MazeReport, Openness, TileCode, TileProperties, UNLIT,
    WallShape, Zone,
};
