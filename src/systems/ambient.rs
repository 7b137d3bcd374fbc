//! Final-level ambience: the false echo and the breathing light. Also the key crystal spin.

use bevy_ecs::{
    event::{EventReader, EventWriter},
    resource::Resource,
    system::{Query, Res, ResMut},
};
use strum::{EnumCount, IntoEnumIterator};
use tracing::{debug, trace};

use crate::constants::{animation, echo, lighting};
use crate::events::MotionEvent;
use crate::systems::{AudioEvent, DeltaTime, EchoSound, ElapsedTime, Spin};

/// A one-shot countdown that can be cancelled before it fires.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ScheduledTask {
    #[default]
    Idle,
    Pending {
        remaining: f32,
    },
}

impl ScheduledTask {
    pub fn schedule(&mut self, delay: f32) {
        *self = ScheduledTask::Pending { remaining: delay };
    }

    /// Drops a pending task. Returns whether anything was cancelled.
    pub fn cancel(&mut self) -> bool {
        std::mem::take(self) != ScheduledTask::Idle
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, ScheduledTask::Pending { .. })
    }

    /// Advances the countdown; returns `true` exactly once, on the frame it fires.
    pub fn tick(&mut self, dt: f32) -> bool {
        match self {
            ScheduledTask::Idle => false,
            ScheduledTask::Pending { remaining } => {
                *remaining -= dt;
                if *remaining <= 0.0 {
                    *self = ScheduledTask::Idle;
                    true
                } else {
                    false
                }
            }
        }
    }
}

/// Plays a phantom sound shortly after the player stops walking.
///
/// Stopping schedules one echo after [`echo::DELAY`] (or once the cooldown from the previous echo
/// has passed, whichever is later). Walking again before it fires cancels it.
#[derive(Resource, Debug, Clone, Default)]
pub struct FalseEcho {
    active: bool,
    task: ScheduledTask,
    cooldown: f32,
    played: usize,
}

impl FalseEcho {
    pub fn activate(&mut self) {
        if !self.active {
            debug!("False echo activated");
        }
        self.active = true;
    }

    pub fn deactivate(&mut self) {
        if self.active {
            debug!("False echo deactivated");
        }
        *self = Self {
            played: self.played,
            ..Self::default()
        };
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_pending(&self) -> bool {
        self.task.is_pending()
    }

    pub fn player_started_moving(&mut self) {
        if self.task.cancel() {
            trace!("False echo cancelled by movement");
        }
    }

    pub fn player_stopped(&mut self) {
        if self.active {
            self.task.schedule(echo::DELAY.max(self.cooldown));
        }
    }

    /// Advances timers and returns the sound to play, if the echo fires this frame.
    pub fn tick(&mut self, dt: f32) -> Option<EchoSound> {
        if !self.active {
            return None;
        }
        self.cooldown = (self.cooldown - dt).max(0.0);
        if !self.task.tick(dt) {
            return None;
        }

        let sound = EchoSound::iter().nth(self.played % EchoSound::COUNT).unwrap_or_default();
        self.played += 1;
        self.cooldown = echo::COOLDOWN;
        Some(sound)
    }
}

pub fn false_echo_system(
    delta_time: Res<DeltaTime>,
    mut echo: ResMut<FalseEcho>,
    mut motion: EventReader<MotionEvent>,
    mut audio: EventWriter<AudioEvent>,
) {
    for event in motion.read() {
        match event {
            MotionEvent::Started => echo.player_started_moving(),
            MotionEvent::Stopped => echo.player_stopped(),
        }
    }

    if let Some(sound) = echo.tick(delta_time.seconds) {
        debug!(%sound, "False echo");
        audio.write(AudioEvent::Echo(sound));
    }
}

/// Slow pulsing of the ambient light on the final level.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct BreathingLight {
    pub active: bool,
    pub intensity: f32,
}

impl Default for BreathingLight {
    fn default() -> Self {
        Self {
            active: false,
            intensity: lighting::BREATHING_BASE,
        }
    }
}

impl BreathingLight {
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
        if !active {
            self.intensity = lighting::BREATHING_BASE;
        }
    }

    pub fn intensity_at(elapsed: f32) -> f32 {
        lighting::BREATHING_BASE * (1.0 + lighting::BREATHING_AMPLITUDE * (elapsed * lighting::BREATHING_RATE).sin())
    }
}

pub fn breathing_light_system(elapsed: Res<ElapsedTime>, mut light: ResMut<BreathingLight>) {
    if light.active {
        light.intensity = BreathingLight::intensity_at(elapsed.0);
    }
}

pub fn key_spin_system(delta_time: Res<DeltaTime>, mut keys: Query<&mut Spin>) {
    for mut spin in keys.iter_mut() {
        spin.0 = (spin.0 + animation::KEY_ROTATION_SPEED * delta_time.seconds) % std::f32::consts::TAU;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_fires_once() {
        let mut task = ScheduledTask::default();
        task.schedule(0.5);
        assert!(!task.tick(0.25));
        assert!(task.tick(0.25));
        assert!(!task.tick(1.0));
    }

    #[test]
    fn test_cancel_reports_pending() {
        let mut task = ScheduledTask::default();
        assert!(!task.cancel());
        task.schedule(1.0);
        assert!(task.cancel());
        assert!(!task.is_pending());
    }

    #[test]
    fn test_breathing_intensity_bounds() {
        let peak = BreathingLight::intensity_at(std::f32::consts::FRAC_PI_2 / lighting::BREATHING_RATE);
        assert!((peak - 2.5).abs() < 1e-4);
    }
}
