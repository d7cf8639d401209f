//! In-memory model of the simulated world: ids, coordinates and actors.
//!
//! Everything here is plain data. Mutation goes through [`crate::world::World`],
//! which owns the actor table and keeps the spatial index in sync.
mod actor;
mod common;

pub use actor::{Actor, ActorData, ActorType, Capability, DestroyOutcome, DoorState, Facing};
pub use common::{EntityId, GridVector, Tick};
