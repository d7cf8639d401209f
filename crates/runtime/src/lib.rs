//! Real-time driver for the deterministic dungeon simulation.
//!
//! `game-core` is clock-free; this crate adds the pieces that deal with real
//! time and ownership:
//! - [`scheduler`] paces tick requests behind a real-time gate and drains
//!   queued tasks once per tick
//! - [`clock`] abstracts the time source so pacing is testable
//! - [`simulation`] owns the world, scheduler and seed stream together
//! - [`config`] assembles settings from defaults and the environment
pub mod clock;
pub mod config;
pub mod error;
pub mod scheduler;
pub mod simulation;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::RuntimeConfig;
pub use error::{Result, RuntimeError};
pub use scheduler::{Scheduler, UpdateReport};
pub use simulation::Simulation;
