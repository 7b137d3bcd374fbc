use bevy_ecs::prelude::*;

use crate::systems::MovementIntent;

/// Abstracted input from the presentation host.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GameCommand {
    Exit,
    /// Begin a session on the given level; out-of-range indices fall back to the first level.
    Start { level: usize },
    /// Leave the level transition screen and load the next level.
    Continue,
    /// The death cutscene finished playing.
    DeathSequenceFinished,
    /// Replace the held movement keys.
    Move(MovementIntent),
    /// Mouse-look delta, in raw input units.
    Look { yaw: f32, pitch: f32 },
    /// The look-back key was pressed (`true`) or released (`false`).
    LookBack(bool),
}

#[derive(Event, Clone, Copy, Debug, PartialEq)]
pub enum GameEvent {
    Command(GameCommand),
}

impl From<GameCommand> for GameEvent {
    fn from(command: GameCommand) -> Self {
        GameEvent::Command(command)
    }
}

/// Requests a level (re)build, consumed by the level loader after stage changes.
#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadLevel(pub usize);

/// Emitted when the player starts or stops walking.
#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub enum MotionEvent {
    Started,
    Stopped,
}

/// The stalker's timer ran out while it was unobserved.
#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlayerCaught;

/// Outputs for the presentation host. The core never renders; it only asks.
#[derive(Event, Clone, Debug, PartialEq)]
pub enum PresentationEvent {
    LevelStarted { level: usize, name: &'static str },
    ShowTimer,
    ShowEntityTimer,
    HideEntityTimer,
    ShowTransition { completed_level: usize, time_remaining: f32 },
    ShowDeathSequence,
    GameOver { won: bool },
}
