//! Error types shared across the simulation core.

use thiserror::Error;

use crate::character::GameMode;

/// Errors raised when balance or configuration invariants are violated.
///
/// These are startup errors: a registry or engine is never built from a
/// configuration that fails validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("min_level and bias must be positive (got min_level {min_level}, bias {bias})")]
    NonPositiveParameter { min_level: u32, bias: u32 },
    #[error("{field} overflows for min_level {min_level}, bias {bias}")]
    Overflow {
        field: &'static str,
        min_level: u32,
        bias: u32,
    },
    #[error("species table is empty")]
    EmptySpeciesTable,
    #[error("species tag `{0}` appears more than once")]
    DuplicateSpecies(String),
    #[error("level cap must be at least 1 (got {0})")]
    InvalidLevelCap(u32),
    #[error("experience per level must be at least 1 (got {0})")]
    InvalidThreshold(u32),
    #[error("starting stats invalid: {0}")]
    InvalidStartingStats(&'static str),
    #[error("config could not be parsed: {0}")]
    Parse(String),
}

/// Errors surfaced by gameplay operations.
#[derive(Debug, Error)]
pub enum GameError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("no character exists for user {user_id}")]
    NotFound { user_id: String },
    #[error("user {user_id} already has a character")]
    AlreadyExists { user_id: String },
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("cannot {operation} while in {actual:?} mode (requires {expected:?})")]
    InvalidMode {
        operation: &'static str,
        expected: GameMode,
        actual: GameMode,
    },
    #[error("unknown species tag `{0}`")]
    UnknownSpecies(String),
    #[error("stored record for user {user_id} is corrupt: {reason}")]
    CorruptRecord { user_id: String, reason: String },
    #[error("character store unavailable: {0}")]
    StoreUnavailable(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl GameError {
    pub(crate) fn store<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::StoreUnavailable(Box::new(err))
    }

    /// Argument or mode mistakes made by the caller; the operation was a no-op.
    #[must_use]
    pub const fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_) | Self::InvalidMode { .. })
    }

    /// Errors the caller can resolve by issuing a different command.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. }
                | Self::AlreadyExists { .. }
                | Self::InvalidArgument(_)
                | Self::InvalidMode { .. }
        )
    }
}

pub type GameResult<T> = Result<T, GameError>;
