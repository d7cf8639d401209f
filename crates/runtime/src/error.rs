//! Unified error type surfaced by the runtime.
//!
//! Wraps game-core failures so callers can bubble them up with `?` and still
//! classify them through [`GameError`].
use thiserror::Error;

use game_core::{ErrorSeverity, GameError, GenerationError, WorldError};

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    World(#[from] WorldError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("world has no player to act for")]
    NoPlayer,
}

impl GameError for RuntimeError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::World(err) => err.severity(),
            Self::Generation(err) => err.severity(),
            Self::NoPlayer => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::World(err) => err.error_code(),
            Self::Generation(err) => err.error_code(),
            Self::NoPlayer => "RUNTIME_NO_PLAYER",
        }
    }
}
