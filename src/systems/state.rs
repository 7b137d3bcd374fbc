//! Session and level flow: start, objectives, master timer, transitions, win and loss.

use bevy_ecs::{
    entity::Entity,
    event::{EventReader, EventWriter},
    query::With,
    resource::Resource,
    system::{Commands, Query, Res, ResMut, Single},
};
use tracing::{debug, info, warn};

use crate::constants::{self, game, FINAL_LEVEL, LEVELS};
use crate::events::{GameCommand, GameEvent, LoadLevel, PlayerCaught, PresentationEvent};
use crate::map::{self, builder::LevelObject};
use crate::systems::{
    flat_distance, AudioEvent, AudioLayer, BreathingLight, CarryingKey, Cue, DeltaTime, Facing, FalseEcho, GlobalState,
    PlayerControlled, Position, Pursuit,
};

/// Why a session ended in defeat.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum LossCause {
    TimeUp,
    Caught,
}

/// A resource to track the overall stage of the session.
#[derive(Resource, Debug, PartialEq, Clone, Copy, Default)]
pub enum GameStage {
    /// Waiting for a start command.
    #[default]
    NotStarted,
    /// A level is being played; the only stage in which gameplay systems run.
    LevelRunning,
    /// A non-final level was completed; waiting for the continue command.
    LevelTransition { completed_level: usize, time_remaining: f32 },
    GameWon,
    GameLost(LossCause),
}

impl GameStage {
    pub fn is_running(&self) -> bool {
        matches!(self, GameStage::LevelRunning)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, GameStage::GameWon | GameStage::GameLost(_))
    }
}

/// Progress within the current session.
#[derive(Resource, Debug, PartialEq, Clone, Copy, Default)]
pub struct Session {
    pub level: usize,
    /// Seconds left on the master timer.
    pub remaining: f32,
    pub key_collected: bool,
    pub has_started: bool,
    pub won: bool,
    /// Set once the final game-over screen has been requested.
    pub game_over_reported: bool,
}

impl Session {
    /// A fresh session on `level`, which must already be valid.
    pub fn begin(level: usize) -> Self {
        Self {
            level,
            remaining: constants::time_limit(level),
            has_started: true,
            ..Self::default()
        }
    }

    /// Moves on to `level`, keeping the session itself alive.
    pub fn advance_to(&mut self, level: usize) {
        self.level = level;
        self.key_collected = false;
        self.remaining = constants::time_limit(level);
    }

    pub fn is_final_level(&self) -> bool {
        self.level == FINAL_LEVEL
    }

    pub fn has_next_level(&self) -> bool {
        self.level + 1 < LEVELS.len()
    }

    /// Counts the master timer down, never below zero. Returns `true` once it has run out.
    pub fn tick_timer(&mut self, dt: f32) -> bool {
        self.remaining = (self.remaining - dt.max(0.0)).max(0.0);
        self.remaining <= 0.0
    }
}

/// Switches level-scoped effects and sound on for a level that is about to run.
fn enter_level(
    level: usize,
    echo: &mut FalseEcho,
    light: &mut BreathingLight,
    audio: &mut EventWriter<AudioEvent>,
    presentation: &mut EventWriter<PresentationEvent>,
) {
    let final_level = level == FINAL_LEVEL;
    light.set_active(final_level);
    if final_level {
        echo.activate();
    } else {
        echo.deactivate();
    }

    audio.write(AudioEvent::Activate {
        layer: AudioLayer::Background,
        level,
    });
    audio.write(AudioEvent::Activate {
        layer: AudioLayer::KeyCrystal,
        level,
    });
    presentation.write(PresentationEvent::LevelStarted {
        level,
        name: LEVELS[level].name,
    });
}

/// Handles session-level commands: start, continue, the death cutscene callback and exit.
#[allow(clippy::too_many_arguments)]
pub fn command_system(
    mut events: EventReader<GameEvent>,
    mut stage: ResMut<GameStage>,
    mut session: ResMut<Session>,
    mut pursuit: ResMut<Pursuit>,
    mut echo: ResMut<FalseEcho>,
    mut light: ResMut<BreathingLight>,
    mut global: ResMut<GlobalState>,
    mut load: EventWriter<LoadLevel>,
    mut audio: EventWriter<AudioEvent>,
    mut presentation: EventWriter<PresentationEvent>,
) {
    for event in events.read() {
        let GameEvent::Command(command) = event;
        match *command {
            GameCommand::Start { level } => {
                if !matches!(*stage, GameStage::NotStarted) && !stage.is_terminal() {
                    debug!(stage = ?*stage, "Ignoring start while a session is in progress");
                    continue;
                }

                let level = map::clamp_level(level);
                info!(level, name = LEVELS[level].name, "Session started");

                *session = Session::begin(level);
                *stage = GameStage::LevelRunning;
                pursuit.remove();
                audio.write(AudioEvent::StopAll);
                load.write(LoadLevel(level));
                presentation.write(PresentationEvent::ShowTimer);
                enter_level(level, &mut echo, &mut light, &mut audio, &mut presentation);
            }
            GameCommand::Continue => {
                let GameStage::LevelTransition { completed_level, .. } = *stage else {
                    debug!(stage = ?*stage, "Ignoring continue outside a level transition");
                    continue;
                };

                let level = map::wrap_level(completed_level + 1);
                info!(completed_level, level, name = LEVELS[level].name, "Continuing to next level");

                session.advance_to(level);
                *stage = GameStage::LevelRunning;
                pursuit.remove();
                load.write(LoadLevel(level));
                enter_level(level, &mut echo, &mut light, &mut audio, &mut presentation);
            }
            GameCommand::DeathSequenceFinished => {
                if matches!(*stage, GameStage::GameLost(LossCause::Caught)) && !session.game_over_reported {
                    session.game_over_reported = true;
                    presentation.write(PresentationEvent::GameOver { won: false });
                }
            }
            GameCommand::Exit => {
                info!("Exit requested");
                global.exit = true;
            }
            GameCommand::Move(_) | GameCommand::Look { .. } | GameCommand::LookBack(_) => {}
        }
    }
}

/// Ends the session in defeat.
#[allow(clippy::too_many_arguments)]
fn lose(
    cause: LossCause,
    stage: &mut GameStage,
    session: &mut Session,
    pursuit: &mut Pursuit,
    echo: &mut FalseEcho,
    light: &mut BreathingLight,
    audio: &mut EventWriter<AudioEvent>,
    presentation: &mut EventWriter<PresentationEvent>,
) {
    warn!(?cause, level = session.level, remaining = session.remaining, "Session lost");

    audio.write(AudioEvent::StopAll);
    if pursuit.is_active() {
        presentation.write(PresentationEvent::HideEntityTimer);
    }
    pursuit.remove();
    echo.deactivate();
    light.set_active(false);

    match cause {
        LossCause::Caught => {
            audio.write(AudioEvent::OneShot(Cue::Jumpscare));
            presentation.write(PresentationEvent::ShowDeathSequence);
        }
        LossCause::TimeUp => {
            session.game_over_reported = true;
            presentation.write(PresentationEvent::GameOver { won: false });
        }
    }
    *stage = GameStage::GameLost(cause);
}

/// Per-frame level logic: stalker catch, key pickup, exit, then the master timer.
#[allow(clippy::too_many_arguments)]
pub fn level_system(
    mut commands: Commands,
    delta_time: Res<DeltaTime>,
    mut stage: ResMut<GameStage>,
    mut session: ResMut<Session>,
    mut pursuit: ResMut<Pursuit>,
    mut echo: ResMut<FalseEcho>,
    mut light: ResMut<BreathingLight>,
    mut caught: EventReader<PlayerCaught>,
    mut audio: EventWriter<AudioEvent>,
    mut presentation: EventWriter<PresentationEvent>,
    player: Single<(&Position, &Facing, &mut CarryingKey), With<PlayerControlled>>,
    objects: Query<(Entity, &LevelObject, &Position)>,
) {
    if !stage.is_running() {
        return;
    }

    if caught.read().count() > 0 {
        lose(
            LossCause::Caught,
            &mut stage,
            &mut session,
            &mut pursuit,
            &mut echo,
            &mut light,
            &mut audio,
            &mut presentation,
        );
        return;
    }

    let (player_position, facing, mut carrying_key) = player.into_inner();
    let player_position = player_position.0;
    let within_reach = |target: &Position| flat_distance(player_position, target.0) < game::COLLECTION_DISTANCE;

    if !session.key_collected {
        let key = objects
            .iter()
            .find(|&(_, object, position)| matches!(object, LevelObject::Key) && within_reach(position));

        if let Some((entity, _, _)) = key {
            info!(level = session.level, remaining = session.remaining, "Key collected");
            session.key_collected = true;
            commands.entity(entity).despawn();
            audio.write(AudioEvent::Deactivate(AudioLayer::KeyCrystal));

            if session.is_final_level() {
                carrying_key.0 = true;
                pursuit.spawn(player_position, facing.body());
                presentation.write(PresentationEvent::ShowEntityTimer);
            }

            audio.write(AudioEvent::Deactivate(AudioLayer::Background));
            audio.write(AudioEvent::Activate {
                layer: AudioLayer::AfterKeyMusic,
                level: session.level,
            });
            audio.write(AudioEvent::Activate {
                layer: AudioLayer::ExitPortal,
                level: session.level,
            });
        }
    }

    if session.key_collected && !session.won {
        let at_exit = objects
            .iter()
            .any(|(_, object, position)| matches!(object, LevelObject::Exit) && within_reach(position));

        if at_exit {
            if pursuit.is_active() {
                presentation.write(PresentationEvent::HideEntityTimer);
            }
            pursuit.remove();

            if session.has_next_level() {
                info!(level = session.level, remaining = session.remaining, "Level complete");
                audio.write(AudioEvent::Deactivate(AudioLayer::AfterKeyMusic));
                audio.write(AudioEvent::Deactivate(AudioLayer::ExitPortal));
                audio.write(AudioEvent::OneShot(Cue::LevelComplete));
                presentation.write(PresentationEvent::ShowTransition {
                    completed_level: session.level,
                    time_remaining: session.remaining,
                });
                *stage = GameStage::LevelTransition {
                    completed_level: session.level,
                    time_remaining: session.remaining,
                };
            } else {
                info!(remaining = session.remaining, "Labyrinth escaped");
                session.won = true;
                session.game_over_reported = true;
                echo.deactivate();
                light.set_active(false);
                audio.write(AudioEvent::StopAll);
                presentation.write(PresentationEvent::GameOver { won: true });
                *stage = GameStage::GameWon;
            }
            return;
        }
    }

    if session.tick_timer(delta_time.seconds) && !session.won {
        lose(
            LossCause::TimeUp,
            &mut stage,
            &mut session,
            &mut pursuit,
            &mut echo,
            &mut light,
            &mut audio,
            &mut presentation,
        );
    }
}
