//! Queued intents and their resolution against the world.
//!
//! A [`Task`] is an ephemeral intent referencing one actor by id. Tasks are
//! queued by the runtime scheduler and consumed exactly once when a tick is
//! processed.
//!
//! # Module Structure
//!
//! - `movement`: move requests, rounding policies and corner sliding
mod movement;

pub use movement::{MoveError, MoveOutcome, MoveTask, Rounding};

use crate::state::EntityId;
use crate::world::World;

/// Every kind of intent the scheduler can queue.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Task {
    Move(MoveTask),
}

/// Result of executing a [`Task`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskOutcome {
    Move(MoveOutcome),
}

impl TaskOutcome {
    /// True when the task changed the world.
    pub fn is_applied(&self) -> bool {
        match self {
            TaskOutcome::Move(outcome) => outcome.is_moved(),
        }
    }
}

impl Task {
    /// Actor the task acts on.
    pub fn actor(&self) -> EntityId {
        match self {
            Task::Move(task) => task.actor,
        }
    }

    pub fn execute(&self, world: &mut World) -> TaskOutcome {
        match self {
            Task::Move(task) => TaskOutcome::Move(task.execute(world)),
        }
    }
}

impl From<MoveTask> for Task {
    fn from(task: MoveTask) -> Self {
        Task::Move(task)
    }
}
