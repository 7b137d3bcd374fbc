//! Centralized error types for the maze core.
//!
//! Gameplay itself is infallible; these errors cover level data and setup.

use bevy_ecs::event::Event;

/// Main error type for the game.
///
/// This is the primary error type that should be used in public APIs.
#[derive(thiserror::Error, Debug, Event)]
pub enum GameError {
    #[error("Level parsing error: {0}")]
    LevelParse(#[from] ParseError),

    #[error("Level error: {0}")]
    Level(#[from] LevelError),
}

/// Error type for level grid parsing.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("Level grid has no rows")]
    EmptyGrid,

    #[error("Row {row} has width {found}, expected {expected}")]
    RaggedRow { row: usize, expected: usize, found: usize },

    #[error("Level grid has no '{0}' marker")]
    MissingMarker(char),

    #[error("Level grid has more than one '{0}' marker")]
    DuplicateMarker(char),
}

/// Errors related to level selection and loading.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum LevelError {
    #[error("Level {index} does not exist ({available} available)")]
    OutOfRange { index: usize, available: usize },
}

/// Result type for game operations.
pub type GameResult<T> = Result<T, GameError>;
