//! Map construction: grid cells to world-space level objects.

use bevy_ecs::component::Component;
use glam::{UVec2, Vec2, Vec3};
use rand::Rng;
use tracing::debug;

use crate::constants::{maze, player};
use crate::map::parser::{GridCell, ParsedLevel};

/// Everything a level can place into the world.
///
/// Each variant carries only the data its behaviour needs.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub enum LevelObject {
    Wall { half_extents: Vec3 },
    Key,
    Exit,
    MovingObstacle { half_extents: Vec3, origin_z: f32 },
    Floor { half_extents: Vec2 },
}

/// A level object and where its center sits in the world.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub object: LevelObject,
    pub position: Vec3,
}

/// A fully placed level, centred on the world origin.
#[derive(Debug, Clone)]
pub struct Maze {
    pub name: &'static str,
    pub placements: Vec<Placement>,
    /// Player start, at eye height.
    pub player_start: Vec3,
}

/// Converts a grid coordinate to the world-space center of that cell on the ground plane.
pub fn cell_to_world(cell: UVec2, size: UVec2) -> Vec2 {
    let unit = maze::GRID_UNIT;
    Vec2::new(
        cell.x as f32 * unit - (size.x as f32 * unit / 2.0) + unit / 2.0,
        cell.y as f32 * unit - (size.y as f32 * unit / 2.0) + unit / 2.0,
    )
}

impl Maze {
    /// Places every object of a parsed level.
    ///
    /// Walls pick one of two footprints at random: thin along x or thin along z.
    pub fn build(level: &ParsedLevel, rng: &mut impl Rng) -> Maze {
        let mid_height = maze::WALL_HEIGHT / 2.0;
        let mut placements = Vec::with_capacity(level.cells.len() / 2);

        for (at, cell) in level.iter() {
            let ground = cell_to_world(at, level.size);
            let position = Vec3::new(ground.x, mid_height, ground.y);

            let object = match cell {
                GridCell::Wall => {
                    let thin_x = rng.random_bool(0.5);
                    let (x, z) = if thin_x {
                        (maze::WALL_THICKNESS, maze::GRID_UNIT)
                    } else {
                        (maze::GRID_UNIT, maze::WALL_THICKNESS)
                    };
                    LevelObject::Wall {
                        half_extents: Vec3::new(x, maze::WALL_HEIGHT, z) / 2.0,
                    }
                }
                GridCell::Key => LevelObject::Key,
                GridCell::Exit => LevelObject::Exit,
                GridCell::MovingObstacle => LevelObject::MovingObstacle {
                    half_extents: Vec3::new(maze::WALL_THICKNESS * 2.0, maze::WALL_HEIGHT, maze::GRID_UNIT * 0.8) / 2.0,
                    origin_z: position.z,
                },
                GridCell::Start | GridCell::Empty => continue,
            };

            placements.push(Placement { object, position });
        }

        let extent = level.size.as_vec2() * maze::GRID_UNIT / 2.0;
        placements.push(Placement {
            object: LevelObject::Floor { half_extents: extent },
            position: Vec3::ZERO,
        });

        let start = cell_to_world(level.start, level.size);
        debug!(
            name = level.name,
            placements = placements.len(),
            start = ?start,
            "Maze built"
        );

        Maze {
            name: level.name,
            placements,
            player_start: Vec3::new(start.x, player::HEIGHT, start.y),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_to_world_centres_grid() {
        let size = UVec2::new(14, 7);
        assert_eq!(cell_to_world(UVec2::new(0, 0), size), Vec2::new(-32.5, -15.0));
        assert_eq!(cell_to_world(UVec2::new(13, 6), size), Vec2::new(32.5, 15.0));
    }
}
