//! This module contains all the constants used in the game.

use std::time::Duration;

pub const LOOP_TIME: Duration = Duration::from_nanos((1_000_000_000.0 / 60.0) as u64);

/// Maze geometry, in world units.
pub mod maze {
    /// The edge length of one grid cell.
    pub const GRID_UNIT: f32 = 5.0;
    /// The height of every wall and moving obstacle.
    pub const WALL_HEIGHT: f32 = 6.0;
    /// The short side of a wall's footprint.
    pub const WALL_THICKNESS: f32 = 2.0;
}

/// Player tuning.
pub mod player {
    use std::f32::consts::FRAC_PI_2;

    /// Base walking speed, in units per second.
    pub const MOVE_SPEED: f32 = 5.0;
    /// Speed while carrying the key on the final level.
    pub const MOVE_SPEED_WITH_KEY: f32 = 3.0;
    /// Speed while looking back at the stalker.
    pub const MOVE_SPEED_FACING_ENTITY: f32 = 1.5;
    /// Radians of rotation per unit of look input.
    pub const ROTATION_SPEED: f32 = 0.002;
    /// Eye height; the player never leaves this plane.
    pub const HEIGHT: f32 = 1.8;
    /// Radius of the player's collision sphere.
    pub const RADIUS: f32 = 0.5;
    pub const MAX_PITCH: f32 = FRAC_PI_2;
}

/// Stalker tuning.
pub mod entity {
    /// Seconds the player survives without facing the stalker.
    pub const TIMER: f32 = 5.0;
    /// Spawn distance behind the player.
    pub const SPAWN_DISTANCE: f32 = 15.0;
    pub const SPEED: f32 = 2.0;
    /// Half-angle of the view cone used for the flashlight test, in radians.
    pub const VIEW_HALF_ANGLE: f32 = 0.6;
    /// Maximum distance at which the flashlight reveals the stalker.
    pub const VIEW_RANGE: f32 = 50.0;
    /// Remaining time at or below which the timer is shown as critical.
    pub const CRITICAL_THRESHOLD: f32 = 1.0;
    /// Remaining time at or below which the timer is shown as a warning.
    pub const WARNING_THRESHOLD: f32 = 2.5;
}

/// Session rules.
pub mod game {
    /// Seconds allotted to every level but the last.
    pub const TIME_LIMIT: f32 = 60.0;
    /// Seconds allotted to the final level.
    pub const TIME_LIMIT_FINAL: f32 = 120.0;
    /// Flat distance under which the key or exit is reached.
    pub const COLLECTION_DISTANCE: f32 = 3.0;
}

pub mod animation {
    /// Key crystal spin, in radians per second.
    pub const KEY_ROTATION_SPEED: f32 = 1.0;
    /// Angular speed of the obstacle oscillation.
    pub const OBSTACLE_MOVE_SPEED: f32 = 1.5;
    /// Amplitude of the obstacle oscillation along z.
    pub const OBSTACLE_MAX_OFFSET: f32 = 3.0;
}

/// False echo pacing on the final level.
pub mod echo {
    /// Seconds the player must stand still before an echo fires.
    pub const DELAY: f32 = 0.5;
    /// Minimum seconds between two echoes.
    pub const COOLDOWN: f32 = 3.0;
}

pub mod lighting {
    use std::f32::consts::PI;

    /// Flashlight reach; kept equal to the stalker's view range.
    pub const FLASHLIGHT_DISTANCE: f32 = 50.0;
    /// Flashlight cone angle.
    pub const FLASHLIGHT_ANGLE: f32 = PI * 0.15;
    /// Resting intensity of the ambient light.
    pub const BREATHING_BASE: f32 = 2.0;
    /// Fraction of the base intensity the breathing effect swings by.
    pub const BREATHING_AMPLITUDE: f32 = 0.25;
    /// Breathing rate, in radians per second.
    pub const BREATHING_RATE: f32 = 1.2;
}

/// Proximity audio falloff.
pub mod audio {
    /// Distance at which the key crystal hum becomes silent.
    pub const KEY_FALLOFF: f32 = 20.0;
    pub const KEY_MAX_VOLUME: f32 = 0.3;
    /// Distance at which the exit portal hum becomes silent.
    pub const EXIT_FALLOFF: f32 = 25.0;
    pub const EXIT_MAX_VOLUME: f32 = 0.45;
}

/// A named, rectangular level layout.
///
/// Characters: `W` wall, `S` player start, `K` key, `E` exit, `M` moving obstacle, anything else is open floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelDefinition {
    pub name: &'static str,
    pub rows: &'static [&'static str],
}

/// All levels, in play order. The last one is the stalker level.
pub const LEVELS: [LevelDefinition; 3] = [
    LevelDefinition {
        name: "Shadow Passage",
        rows: &[
            "WWWWWWWWWWWWWW",
            "W            W",
            "W  S      K  W",
            "W     WW     W",
            "W  M  WW  E  W",
            "W            W",
            "WWWWWWWWWWWWWW",
        ],
    },
    LevelDefinition {
        name: "The Haunted Halls",
        rows: &[
            "WWWWWWWWWWWWWWWWWWWWW",
            "W S W       W K     W",
            "W   W WWW W W W WWW W",
            "W     W   W   W W   W",
            "WWWWWWW W WWWWWWW W W",
            "W       W    M    W W",
            "W WWWWWWWWWWWWWWWWW W",
            "W                   W",
            "WWWWWWWWWWWWWWWWWWW W",
            "W         E         W",
            "WWWWWWWWWWWWWWWWWWWWW",
        ],
    },
    LevelDefinition {
        name: "Trapped Soul",
        rows: &[
            "WWWWWWWWWWWWWWWWWWWWWWWWW",
            "W S                     W",
            "W   WWWWWWWWW   WWWWW   W",
            "W   W       W   W   W   W",
            "W   W   K   W   W   W   W",
            "W   W       W       W   W",
            "W   WWWWW   WWWWWWWWW   W",
            "W       W       M       W",
            "WWWWW   W   WWWWWWWWW   W",
            "W       W           W   W",
            "W   WWWWWWWWW   W   W   W",
            "W               W       W",
            "W   WWWWWWWWWWWWWWWWW   W",
            "W   W               W   W",
            "W   W   WWWWWWWWW   W   W",
            "W       W       W       W",
            "WWWWW   W   E   W   WWWWW",
            "W       W       W       W",
            "W   WWWWWWWWWWWWWWWWW   W",
            "W                       W",
            "WWWWWWWWWWWWWWWWWWWWWWWWW",
        ],
    },
];

/// Index of the level that carries the stalker, the longer timer and the ambient effects.
pub const FINAL_LEVEL: usize = LEVELS.len() - 1;

/// Returns the master timer allotment for a level.
pub fn time_limit(level: usize) -> f32 {
    if level == FINAL_LEVEL {
        game::TIME_LIMIT_FINAL
    } else {
        game::TIME_LIMIT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loop_time() {
        // 60 FPS = 16.67ms per frame
        let expected_nanos = (1_000_000_000.0 / 60.0) as u64;
        assert_eq!(LOOP_TIME.as_nanos() as u64, expected_nanos);
    }

    #[test]
    fn test_levels_are_rectangular() {
        for level in LEVELS {
            let width = level.rows[0].len();
            assert!(level.rows.iter().all(|row| row.len() == width), "{} is ragged", level.name);
        }
    }

    #[test]
    fn test_level_dimensions() {
        let dims: Vec<_> = LEVELS.iter().map(|l| (l.rows[0].len(), l.rows.len())).collect();
        assert_eq!(dims, vec![(14, 7), (21, 11), (25, 21)]);
    }

    #[test]
    fn test_time_limit() {
        assert_eq!(time_limit(0), 60.0);
        assert_eq!(time_limit(1), 60.0);
        assert_eq!(time_limit(FINAL_LEVEL), 120.0);
    }

    #[test]
    fn test_flashlight_matches_view_range() {
        assert_eq!(lighting::FLASHLIGHT_DISTANCE, entity::VIEW_RANGE);
    }
}
