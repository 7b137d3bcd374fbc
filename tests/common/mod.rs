#![allow(dead_code)]

use bevy_ecs::{
    entity::Entity,
    event::{EventRegistry, Events},
    query::With,
    world::World,
};
use glam::Vec3;
use labyrinth::{
    constants::player,
    events::{GameCommand, GameEvent, MotionEvent, PlayerCaught, PresentationEvent},
    game::Game,
    systems::{
        AudioEvent, ColliderSet, DeltaTime, ElapsedTime, FalseEcho, GameStage, PlayerBundle, PlayerControlled, Position,
        Pursuit,
    },
};

/// A bare world with the events and resources the player systems need.
pub fn create_test_world() -> World {
    let mut world = World::new();

    EventRegistry::register_event::<GameEvent>(&mut world);
    EventRegistry::register_event::<MotionEvent>(&mut world);
    EventRegistry::register_event::<AudioEvent>(&mut world);
    EventRegistry::register_event::<PlayerCaught>(&mut world);
    EventRegistry::register_event::<PresentationEvent>(&mut world);

    world.insert_resource(DeltaTime::from_seconds(1.0 / 60.0));
    world.insert_resource(ElapsedTime::default());
    world.insert_resource(ColliderSet::default());
    world.insert_resource(Pursuit::default());
    world.insert_resource(FalseEcho::default());
    world.insert_resource(GameStage::LevelRunning);

    world
}

pub fn spawn_test_player(world: &mut World, at: Vec3) -> Entity {
    world.spawn(PlayerBundle::at(at)).id()
}

pub fn send_game_event(world: &mut World, command: GameCommand) {
    world.send_event(GameEvent::Command(command));
}

pub fn drain<E: bevy_ecs::event::Event>(world: &mut World) -> Vec<E> {
    world.resource_mut::<Events<E>>().drain().collect()
}

/// A seeded game with `level` already loaded and running.
pub fn started_game(level: usize) -> Game {
    let mut game = Game::with_seed(7).unwrap();
    game.send(GameCommand::Start { level });
    game.tick(0.0);
    game
}

/// Moves the player, keeping eye height.
pub fn teleport(game: &mut Game, to: Vec3) {
    let mut query = game.world.query_filtered::<&mut Position, With<PlayerControlled>>();
    query.single_mut(&mut game.world).unwrap().0 = to.with_y(player::HEIGHT);
}

/// Teleports onto the current objective (key, then exit) and runs one frame.
pub fn reach_objective(game: &mut Game, dt: f32) {
    let target = game.objective().expect("level has an objective");
    teleport(game, target);
    game.tick(dt);
}
