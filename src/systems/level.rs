//! Level loading: despawn the old level, build and spawn the new one, reset the player.

use bevy_ecs::{
    entity::Entity,
    event::{EventReader, EventWriter},
    query::With,
    resource::Resource,
    system::{Commands, Query, ResMut},
};
use rand::rngs::SmallRng;
use tracing::{debug, error, info};

use crate::error::{GameError, GameResult};
use crate::events::LoadLevel;
use crate::map::{
    self,
    builder::{LevelObject, Maze},
    parser::LevelParser,
};
use crate::systems::{
    CarryingKey, ColliderHandle, ColliderSet, Facing, LookBack, MovingObstacle, PlayerControlled, Position, Spin,
};

/// Randomness used for wall orientation when building levels.
#[derive(Resource, Debug, Clone)]
pub struct LevelRng(pub SmallRng);

/// Parses and places a level by index.
pub fn build_level(index: usize, rng: &mut SmallRng) -> GameResult<Maze> {
    let definition = map::level(index)?;
    let parsed = LevelParser::parse_level(definition)?;
    Ok(Maze::build(&parsed, rng))
}

/// Spawns one entity per placement. Moving obstacles get collider handles in placement order.
pub fn spawn_maze(commands: &mut Commands, maze: &Maze) {
    let mut next_handle = 0;
    for placement in &maze.placements {
        let position = Position(placement.position);
        match placement.object {
            LevelObject::Key => {
                commands.spawn((placement.object, position, Spin::default()));
            }
            LevelObject::MovingObstacle { half_extents, origin_z } => {
                commands.spawn((
                    placement.object,
                    position,
                    MovingObstacle { origin_z, half_extents },
                    ColliderHandle(next_handle),
                ));
                next_handle += 1;
            }
            LevelObject::Wall { .. } | LevelObject::Exit | LevelObject::Floor { .. } => {
                commands.spawn((placement.object, position));
            }
        }
    }
}

/// Swaps in the most recently requested level.
#[allow(clippy::type_complexity)]
pub fn level_load_system(
    mut commands: Commands,
    mut requests: EventReader<LoadLevel>,
    mut rng: ResMut<LevelRng>,
    mut colliders: ResMut<ColliderSet>,
    mut errors: EventWriter<GameError>,
    existing: Query<Entity, With<LevelObject>>,
    mut player: Query<(&mut Position, &mut Facing, &mut LookBack, &mut CarryingKey), With<PlayerControlled>>,
) {
    let Some(LoadLevel(index)) = requests.read().last().copied() else {
        return;
    };

    let maze = match build_level(map::wrap_level(index), &mut rng.0) {
        Ok(maze) => maze,
        Err(e) => {
            error!(error = %e, index, "Failed to build level");
            errors.write(e);
            return;
        }
    };

    let despawned = existing.iter().count();
    for entity in existing.iter() {
        commands.entity(entity).despawn();
    }
    debug!(despawned, "Previous level cleared");

    spawn_maze(&mut commands, &maze);
    *colliders = ColliderSet::rebuild(&maze);

    if let Ok((mut position, mut facing, mut look_back, mut carrying_key)) = player.single_mut() {
        position.0 = maze.player_start;
        *facing = Facing::default();
        *look_back = LookBack::Inactive;
        carrying_key.0 = false;
    }

    info!(index, name = maze.name, colliders = colliders.len(), "Level loaded");
}
