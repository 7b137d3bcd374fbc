use std::time::{Duration, Instant};

use glam::Vec3Swizzles;
use tracing::{debug, info, warn};

use crate::constants::{player, LOOP_TIME};
use crate::error::GameResult;
use crate::events::{GameCommand, PresentationEvent};
use crate::formatter;
use crate::game::Game;
use crate::systems::MovementIntent;

/// Frames between timing summaries.
const TIMING_PERIOD: u64 = 60 * 10;

/// Yaw error, in radians, below which the autopilot walks instead of turning on the spot.
const STEERING_TOLERANCE: f32 = 0.35;

/// Headless host: drives the game at a fixed rate and plays it with a naive autopilot.
///
/// The autopilot turns toward the current objective and walks; the collision resolver's
/// sliding gets it around shallow corners, nothing more. It answers the host callbacks the
/// same way a real frontend would: continue on transitions, finish the death sequence at once.
pub struct App {
    pub game: Game,
    last_tick: Instant,
    frames: u64,
    intent: MovementIntent,
}

impl App {
    pub fn new(start_level: usize) -> GameResult<Self> {
        let mut game = Game::new()?;
        game.send(GameCommand::Start { level: start_level });

        Ok(Self {
            game,
            last_tick: Instant::now(),
            frames: 0,
            intent: MovementIntent::empty(),
        })
    }

    /// Runs one frame. Returns `false` once the session is over or an exit was requested.
    pub fn run(&mut self) -> bool {
        let start = Instant::now();

        let dt = self.last_tick.elapsed().as_secs_f32();
        self.last_tick = Instant::now();

        self.steer();

        formatter::increment_tick();
        let exit = self.game.tick(dt);
        self.frames += 1;

        let mut keep_running = !exit;
        for event in self.game.drain_presentation() {
            keep_running &= self.present(event);
        }

        if self.frames % TIMING_PERIOD == 0 {
            let hud = self.game.hud();
            debug!(level = hud.level_name, timer = %hud.timer, status = %hud.status, "HUD");
            self.game.log_timings();
        }

        if start.elapsed() < LOOP_TIME {
            let time = LOOP_TIME.saturating_sub(start.elapsed());
            if time != Duration::ZERO {
                spin_sleep::sleep(time);
            }
        } else {
            warn!(behind = ?(start.elapsed() - LOOP_TIME), "Game loop behind schedule");
        }

        keep_running
    }

    /// Reacts to a presentation request. Returns `false` when the session has ended.
    fn present(&mut self, event: PresentationEvent) -> bool {
        match event {
            PresentationEvent::LevelStarted { level, name } => {
                info!(level, name, "Level started");
            }
            PresentationEvent::ShowTransition {
                completed_level,
                time_remaining,
            } => {
                info!(completed_level, time_remaining, "Level conquered");
                self.game.send(GameCommand::Continue);
            }
            PresentationEvent::ShowDeathSequence => {
                info!("Caught");
                self.game.send(GameCommand::DeathSequenceFinished);
            }
            PresentationEvent::GameOver { won } => {
                info!(won, frames = self.frames, "Game over");
                return false;
            }
            PresentationEvent::ShowTimer | PresentationEvent::ShowEntityTimer | PresentationEvent::HideEntityTimer => {
                debug!(?event, "Presentation");
            }
        }
        true
    }

    fn steer(&mut self) {
        if !self.game.stage().is_running() {
            return;
        }
        let (Some((position, facing)), Some(target)) = (self.game.player(), self.game.objective()) else {
            return;
        };

        let offset = (target - position).xz();
        if offset.length_squared() <= f32::EPSILON {
            return;
        }

        // Forward is -z at zero yaw; yaw turns counter-clockwise seen from above.
        let desired = (-offset.x).atan2(-offset.y);
        let error = wrap_angle(desired - facing.yaw);
        if error.abs() > f32::EPSILON {
            self.game.send(GameCommand::Look {
                yaw: -error / player::ROTATION_SPEED,
                pitch: 0.0,
            });
        }

        let intent = if error.abs() < STEERING_TOLERANCE {
            MovementIntent::FORWARD
        } else {
            MovementIntent::empty()
        };
        if intent != self.intent {
            self.intent = intent;
            self.game.send(GameCommand::Move(intent));
        }
    }
}

/// Wraps an angle into `-PI..=PI`.
fn wrap_angle(angle: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    (angle + PI).rem_euclid(TAU) - PI
}
