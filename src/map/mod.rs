//! This module turns level grids into world-space placements.

use crate::constants::{LevelDefinition, LEVELS};
use crate::error::LevelError;

pub mod builder;
pub mod parser;

/// Looks up a level definition by index.
///
/// # Errors
///
/// Returns `LevelError::OutOfRange` if `index` is past the last level.
pub fn level(index: usize) -> Result<&'static LevelDefinition, LevelError> {
    LEVELS.get(index).ok_or(LevelError::OutOfRange {
        index,
        available: LEVELS.len(),
    })
}

/// Clamps a requested starting level to a playable one, falling back to the first level.
pub fn clamp_level(index: usize) -> usize {
    match level(index) {
        Ok(_) => index,
        Err(e) => {
            tracing::warn!(error = %e, "Invalid level selection, starting from the first level");
            0
        }
    }
}

/// Resolves the index a rebuild should load; building past the last level wraps around.
pub fn wrap_level(index: usize) -> usize {
    if index >= LEVELS.len() {
        0
    } else {
        index
    }
}
