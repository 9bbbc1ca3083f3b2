//! Game error types

use thiserror::Error;

/// Errors that can occur while setting up or running a game
///
/// Nothing here is retryable: the game has no I/O that fails on its own, so
/// every variant is either bad input caught before the first task starts or
/// a broken synchronization contract that aborts the run.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invariant violated: {0}")]
    InvariantViolation(String),

    #[error("Music gate closed while players were still waiting")]
    GateClosed,

    #[error("Task failed: {0}")]
    TaskFailed(String),
}

impl GameError {
    /// Build a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        GameError::Configuration(message.into())
    }

    /// Build an invariant violation
    pub fn invariant(message: impl Into<String>) -> Self {
        GameError::InvariantViolation(message.into())
    }

    /// Check if this is a configuration error
    pub fn is_configuration(&self) -> bool {
        matches!(self, GameError::Configuration(_))
    }

    /// Check if this is an internal invariant violation
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, GameError::InvariantViolation(_))
    }
}

impl From<tokio::task::JoinError> for GameError {
    fn from(err: tokio::task::JoinError) -> Self {
        GameError::TaskFailed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert!(GameError::config("players must be at least 2").is_configuration());
        assert!(!GameError::config("x").is_invariant_violation());

        assert!(GameError::invariant("negative capacity").is_invariant_violation());
        assert!(!GameError::GateClosed.is_configuration());
    }

    #[test]
    fn test_display() {
        let err = GameError::config("players must be at least 2, got 1");
        assert_eq!(err.to_string(), "Configuration error: players must be at least 2, got 1");

        let err = GameError::invariant("player 3 attempted twice in generation 2");
        assert!(err.to_string().starts_with("Invariant violated"));
    }
}
