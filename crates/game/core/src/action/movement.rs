use tracing::debug;

use crate::error::{ErrorSeverity, GameError};
use crate::state::{EntityId, GridVector};
use crate::world::World;

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MoveError {
    #[error("actor {0} not found")]
    ActorNotFound(EntityId),

    #[error("move request for actor {0} has no direction")]
    ZeroDirection(EntityId),

    #[error("move of actor {actor} by {direction} leaves the coordinate range")]
    OutOfRange {
        actor: EntityId,
        direction: GridVector,
    },

    #[error("actor {actor} is blocked towards {destination}")]
    Blocked {
        actor: EntityId,
        destination: GridVector,
    },
}

impl GameError for MoveError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::ActorNotFound(_) | Self::OutOfRange { .. } => ErrorSeverity::Validation,
            Self::ZeroDirection(_) | Self::Blocked { .. } => ErrorSeverity::Recoverable,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::ActorNotFound(_) => "MOVE_ACTOR_NOT_FOUND",
            Self::ZeroDirection(_) => "MOVE_ZERO_DIRECTION",
            Self::OutOfRange { .. } => "MOVE_OUT_OF_RANGE",
            Self::Blocked { .. } => "MOVE_BLOCKED",
        }
    }
}

/// Per-axis rounding used to shorten a move request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum Rounding {
    /// `(v + 0.5).floor()`
    HalfUp,
    Floor,
    Ceil,
}

impl Rounding {
    /// Policies in the order candidates are tried.
    pub const PRIORITY: [Rounding; 3] = [Rounding::HalfUp, Rounding::Floor, Rounding::Ceil];

    pub fn apply(self, value: f64) -> i32 {
        let rounded = match self {
            Rounding::HalfUp => (value + 0.5).floor(),
            Rounding::Floor => value.floor(),
            Rounding::Ceil => value.ceil(),
        };
        rounded as i32
    }

    /// `direction` scaled to Chebyshev length `magnitude`, rounded per axis.
    pub fn scale(self, direction: GridVector, magnitude: i32) -> GridVector {
        let length = f64::from(direction.chebyshev_len());
        if length == 0.0 {
            return GridVector::ZERO;
        }
        let magnitude = f64::from(magnitude);
        GridVector::new(
            self.apply(f64::from(direction.x) * magnitude / length),
            self.apply(f64::from(direction.y) * magnitude / length),
        )
    }
}

/// Intent to move one actor by a direction vector.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MoveTask {
    pub actor: EntityId,
    pub direction: GridVector,
}

/// What executing a [`MoveTask`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The actor moved by `applied`, which may be shorter than requested.
    Moved { applied: GridVector, distance: i32 },
    Rejected(MoveError),
}

impl MoveOutcome {
    pub fn is_moved(&self) -> bool {
        matches!(self, MoveOutcome::Moved { .. })
    }
}

impl MoveTask {
    pub fn new(actor: EntityId, direction: GridVector) -> Self {
        Self { actor, direction }
    }

    /// Picks the step to apply without touching the world.
    ///
    /// When the full destination is walkable, magnitudes `1..=n` are scanned
    /// and the longest run of walkable candidates wins: at each magnitude the
    /// first walkable of the [`Rounding::PRIORITY`] candidates is kept, and the
    /// scan stops at the first magnitude with none. A diagonal request that
    /// cannot move this way slides along the wall instead, trying the unit x
    /// step and then the unit y step.
    pub fn resolve(&self, world: &World) -> Result<GridVector, MoveError> {
        let origin = world
            .actor(self.actor)
            .ok_or(MoveError::ActorNotFound(self.actor))?
            .position;
        if self.direction.is_zero() {
            return Err(MoveError::ZeroDirection(self.actor));
        }

        let destination = origin
            .checked_add(self.direction)
            .ok_or(MoveError::OutOfRange {
                actor: self.actor,
                direction: self.direction,
            })?;
        let walkable = |step: GridVector| {
            origin
                .checked_add(step)
                .is_some_and(|cell| world.actor_can_move(self.actor, cell.x, cell.y))
        };

        if walkable(self.direction) {
            let mut best = None;
            for magnitude in 1..=self.direction.chebyshev_len() {
                let candidate = Rounding::PRIORITY
                    .iter()
                    .map(|rounding| rounding.scale(self.direction, magnitude))
                    .find(|step| !step.is_zero() && walkable(*step));
                match candidate {
                    Some(step) => best = Some(step),
                    None => break,
                }
            }
            if let Some(step) = best {
                return Ok(step);
            }
        }

        if self.direction.is_diagonal() {
            let unit = self.direction.signum();
            let slides = [GridVector::new(unit.x, 0), GridVector::new(0, unit.y)];
            if let Some(step) = slides.into_iter().find(|step| walkable(*step)) {
                debug!(actor = %self.actor, requested = %self.direction, %step, "diagonal move slid along wall");
                return Ok(step);
            }
        }

        Err(MoveError::Blocked {
            actor: self.actor,
            destination,
        })
    }

    /// Resolves and applies the move.
    pub fn execute(&self, world: &mut World) -> MoveOutcome {
        match self.resolve(world) {
            Ok(step) => {
                let distance = world.move_actor(self.actor, step);
                MoveOutcome::Moved {
                    applied: step,
                    distance,
                }
            }
            Err(err) => {
                debug!(actor = %self.actor, direction = %self.direction, %err, "move rejected");
                MoveOutcome::Rejected(err)
            }
        }
    }
}
