//! This module contains the main game logic and state.

use bevy_ecs::event::{EventRegistry, Events};
use bevy_ecs::query::With;
use bevy_ecs::schedule::{IntoScheduleConfigs, Schedule, SystemSet};
use bevy_ecs::system::Res;
use bevy_ecs::world::World;
use glam::Vec3;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use crate::constants::{player, LEVELS};
use crate::error::{GameError, GameResult};
use crate::events::{GameCommand, GameEvent, LoadLevel, MotionEvent, PlayerCaught, PresentationEvent};
use crate::map::{builder::LevelObject, parser::LevelParser};
use crate::systems::{
    self, profile, AudioEvent, AudioState, BreathingLight, ColliderSet, DeltaTime, ElapsedTime, Facing, FalseEcho,
    GameStage, GlobalState, Hud, LevelRng, PlayerBundle, PlayerControlled, Position, Pursuit, Session, SystemId,
    SystemTimings,
};

/// System sets, run in declaration order every tick.
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
enum GameplaySet {
    /// Player commands, session commands and level loading
    Input,
    /// Final-level ambience and level animation
    Ambient,
    /// Player movement and the stalker
    Simulation,
    /// Key, exit and the master timer
    Objectives,
    /// Outputs for the presentation host
    Respond,
}

/// Core game state manager built on the Bevy ECS architecture.
///
/// All session state lives in the `World`; the `Schedule` fixes the per-frame order:
/// input, ambience and animation, movement, pursuit, objectives, then outputs.
/// Gameplay sets only run while a level is running.
pub struct Game {
    pub world: World,
    pub schedule: Schedule,
}

impl Game {
    /// Creates an idle game waiting for a start command, with a randomly seeded level builder.
    ///
    /// # Errors
    ///
    /// Returns `GameError::LevelParse` if any bundled level grid is malformed.
    pub fn new() -> GameResult<Self> {
        Self::with_rng(SmallRng::from_rng(&mut rand::rng()))
    }

    /// Creates a game whose wall orientations are reproducible.
    pub fn with_seed(seed: u64) -> GameResult<Self> {
        Self::with_rng(SmallRng::seed_from_u64(seed))
    }

    fn with_rng(rng: SmallRng) -> GameResult<Self> {
        for level in &LEVELS {
            LevelParser::parse_level(level)?;
        }
        debug!(levels = LEVELS.len(), "Level grids validated");

        let mut world = World::default();
        let mut schedule = Schedule::default();

        Self::setup_ecs(&mut world);
        Self::insert_resources(&mut world, rng);
        Self::configure_schedule(&mut schedule);

        world.spawn(PlayerBundle::at(Vec3::new(0.0, player::HEIGHT, 0.0)));

        info!("Game initialized");
        Ok(Game { world, schedule })
    }

    fn setup_ecs(world: &mut World) {
        EventRegistry::register_event::<GameError>(world);
        EventRegistry::register_event::<GameEvent>(world);
        EventRegistry::register_event::<AudioEvent>(world);
        EventRegistry::register_event::<LoadLevel>(world);
        EventRegistry::register_event::<MotionEvent>(world);
        EventRegistry::register_event::<PlayerCaught>(world);
        EventRegistry::register_event::<PresentationEvent>(world);
    }

    fn insert_resources(world: &mut World, rng: SmallRng) {
        world.insert_resource(GlobalState::default());
        world.insert_resource(DeltaTime::from_seconds(0.0));
        world.insert_resource(ElapsedTime::default());
        world.insert_resource(GameStage::default());
        world.insert_resource(Session::default());
        world.insert_resource(ColliderSet::default());
        world.insert_resource(Pursuit::default());
        world.insert_resource(FalseEcho::default());
        world.insert_resource(BreathingLight::default());
        world.insert_resource(AudioState::default());
        world.insert_resource(Hud::default());
        world.insert_resource(LevelRng(rng));
        world.insert_resource(SystemTimings::default());
    }

    fn configure_schedule(schedule: &mut Schedule) {
        let player_control_system = profile(SystemId::Controls, systems::player_control_system);
        let command_system = profile(SystemId::Commands, systems::command_system);
        let level_load_system = profile(SystemId::LevelLoad, systems::level_load_system);
        let breathing_light_system = profile(SystemId::Ambient, systems::breathing_light_system);
        let false_echo_system = profile(SystemId::Ambient, systems::false_echo_system);
        let obstacle_system = profile(SystemId::Obstacles, systems::obstacle_system);
        let key_spin_system = profile(SystemId::Obstacles, systems::key_spin_system);
        let player_movement_system = profile(SystemId::Movement, systems::player_movement_system);
        let pursuit_system = profile(SystemId::Pursuit, systems::pursuit_system);
        let level_system = profile(SystemId::Level, systems::level_system);
        let proximity_audio_system = profile(SystemId::ProximityAudio, systems::proximity_audio_system);
        let footstep_system = profile(SystemId::Audio, systems::footstep_system);
        let hud_system = profile(SystemId::Hud, systems::hud_system);
        let audio_system = profile(SystemId::Audio, systems::audio_system);

        let running = |stage: Res<GameStage>| stage.is_running();

        schedule
            .add_systems((
                (player_control_system, command_system, level_load_system)
                    .chain()
                    .in_set(GameplaySet::Input),
                (breathing_light_system, false_echo_system, obstacle_system, key_spin_system)
                    .chain()
                    .in_set(GameplaySet::Ambient),
                (player_movement_system, pursuit_system)
                    .chain()
                    .in_set(GameplaySet::Simulation),
                (level_system, proximity_audio_system)
                    .chain()
                    .in_set(GameplaySet::Objectives),
                (footstep_system, hud_system, audio_system)
                    .chain()
                    .in_set(GameplaySet::Respond),
            ))
            .configure_sets(
                (
                    GameplaySet::Input,
                    GameplaySet::Ambient.run_if(running),
                    GameplaySet::Simulation.run_if(running),
                    GameplaySet::Objectives.run_if(running),
                    GameplaySet::Respond,
                )
                    .chain(),
            );
    }

    /// Queues a command for the next tick.
    pub fn send(&mut self, command: GameCommand) {
        self.world.send_event(GameEvent::Command(command));
    }

    /// Presentation outputs emitted since the last call.
    pub fn drain_presentation(&mut self) -> Vec<PresentationEvent> {
        self.world
            .resource_mut::<Events<PresentationEvent>>()
            .drain()
            .collect()
    }

    /// Executes one frame of game logic by running all scheduled ECS systems.
    ///
    /// # Returns
    ///
    /// `true` if the game should terminate (exit command received), `false` to continue
    pub fn tick(&mut self, dt: f32) -> bool {
        let delta = DeltaTime::from_seconds(dt);
        let dt = delta.seconds;
        self.world.insert_resource(delta);
        self.world.resource_mut::<ElapsedTime>().0 += dt;

        let start = std::time::Instant::now();
        self.schedule.run(&mut self.world);
        let total = start.elapsed();

        if let Some(timings) = self.world.get_resource::<SystemTimings>() {
            timings.record(SystemId::Total, total);

            // 20% headroom over the frame's own delta
            let budget = std::time::Duration::from_secs_f32(dt * 1.2);
            if dt > 0.0 && total > budget {
                warn!(
                    total = format!("{total:.3?}"),
                    budget = format!("{budget:.3?}"),
                    slowest = ?timings.slowest(3),
                    "Frame took longer than expected"
                );
            }
        }

        self.update_events();

        self.world.get_resource::<GlobalState>().is_some_and(|state| state.exit)
    }

    /// Rotates event buffers so events live for at most two ticks.
    fn update_events(&mut self) {
        self.world.resource_mut::<Events<GameError>>().update();
        self.world.resource_mut::<Events<GameEvent>>().update();
        self.world.resource_mut::<Events<AudioEvent>>().update();
        self.world.resource_mut::<Events<LoadLevel>>().update();
        self.world.resource_mut::<Events<MotionEvent>>().update();
        self.world.resource_mut::<Events<PlayerCaught>>().update();
        self.world.resource_mut::<Events<PresentationEvent>>().update();
    }

    pub fn stage(&self) -> GameStage {
        *self.world.resource::<GameStage>()
    }

    pub fn session(&self) -> Session {
        *self.world.resource::<Session>()
    }

    pub fn hud(&self) -> &Hud {
        self.world.resource::<Hud>()
    }

    /// The player's position and facing, if a player exists.
    pub fn player(&mut self) -> Option<(Vec3, Facing)> {
        self.world
            .query_filtered::<(&Position, &Facing), With<PlayerControlled>>()
            .single(&self.world)
            .ok()
            .map(|(position, facing)| (position.0, *facing))
    }

    /// Where the player should head next: the key until it is collected, then the exit.
    pub fn objective(&mut self) -> Option<Vec3> {
        let key_collected = self.session().key_collected;
        self.world
            .query::<(&LevelObject, &Position)>()
            .iter(&self.world)
            .find(|(object, _)| match object {
                LevelObject::Key => !key_collected,
                LevelObject::Exit => key_collected,
                _ => false,
            })
            .map(|(_, position)| position.0)
    }

    pub fn log_timings(&self) {
        for line in self.world.resource::<SystemTimings>().summary() {
            debug!("{line}");
        }
    }
}
