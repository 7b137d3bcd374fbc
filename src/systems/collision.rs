//! Axis-aligned collision geometry for walls and moving obstacles.
//!
//! Static colliders are computed once when a level is built and never revisited.
//! Dynamic colliders follow their obstacle and are refreshed from its transform every frame.

use bevy_ecs::{
    component::Component,
    query::With,
    system::{Query, Res, ResMut},
};
use glam::Vec3;
use tracing::{debug, trace};

use crate::constants::animation;
use crate::map::builder::{LevelObject, Maze};
use crate::systems::{ElapsedTime, Position};

/// An axis-aligned bounding box in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) / 2.0
    }

    /// The point of the box nearest to `point`; `point` itself if it lies inside.
    pub fn closest_point(&self, point: Vec3) -> Vec3 {
        point.clamp(self.min, self.max)
    }

    /// True when the sphere's center is closer to the box than its radius.
    pub fn intersects_sphere(&self, sphere: &Sphere) -> bool {
        self.closest_point(sphere.center).distance_squared(sphere.center) < sphere.radius * sphere.radius
    }
}

/// The player's collision volume.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
}

/// Index of a dynamic collider inside a [`ColliderSet`].
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColliderHandle(pub usize);

/// Every collider of the loaded level.
///
/// Rebuilt whenever a level loads; dynamic members are mutated in place.
#[derive(bevy_ecs::resource::Resource, Debug, Default, Clone)]
pub struct ColliderSet {
    statics: Vec<Aabb>,
    dynamics: Vec<Aabb>,
}

impl ColliderSet {
    pub fn new(statics: Vec<Aabb>, dynamics: Vec<Aabb>) -> Self {
        Self { statics, dynamics }
    }

    /// Computes colliders for a freshly built maze.
    ///
    /// Dynamic handles are assigned in placement order, matching the order the level loader
    /// spawns moving obstacles in.
    pub fn rebuild(maze: &Maze) -> Self {
        let mut set = Self::default();
        for placement in &maze.placements {
            match placement.object {
                LevelObject::Wall { half_extents } => {
                    set.statics
                        .push(Aabb::from_center_half_extents(placement.position, half_extents));
                }
                LevelObject::MovingObstacle { half_extents, .. } => {
                    set.dynamics
                        .push(Aabb::from_center_half_extents(placement.position, half_extents));
                }
                LevelObject::Key | LevelObject::Exit | LevelObject::Floor { .. } => {}
            }
        }

        debug!(
            statics = set.statics.len(),
            dynamics = set.dynamics.len(),
            "Collider set rebuilt"
        );
        set
    }

    /// Recomputes a dynamic collider from its owner's current transform.
    pub fn refresh_dynamic(&mut self, handle: ColliderHandle, center: Vec3, half_extents: Vec3) {
        if let Some(collider) = self.dynamics.get_mut(handle.0) {
            *collider = Aabb::from_center_half_extents(center, half_extents);
        }
    }

    pub fn dynamic(&self, handle: ColliderHandle) -> Option<&Aabb> {
        self.dynamics.get(handle.0)
    }

    /// True if the sphere overlaps any collider. An empty set never blocks.
    pub fn intersects(&self, sphere: &Sphere) -> bool {
        self.iter().any(|collider| collider.intersects_sphere(sphere))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Aabb> {
        self.statics.iter().chain(self.dynamics.iter())
    }

    pub fn len(&self) -> usize {
        self.statics.len() + self.dynamics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A moving obstacle that slides back and forth along z around its spawn point.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct MovingObstacle {
    pub origin_z: f32,
    pub half_extents: Vec3,
}

impl MovingObstacle {
    /// Z coordinate of the obstacle at a given session time.
    pub fn z_at(&self, elapsed: f32) -> f32 {
        self.origin_z + (elapsed * animation::OBSTACLE_MOVE_SPEED).sin() * animation::OBSTACLE_MAX_OFFSET
    }
}

/// Moves obstacles along their oscillation and keeps their colliders glued to them.
pub fn obstacle_system(
    elapsed: Res<ElapsedTime>,
    mut colliders: ResMut<ColliderSet>,
    mut obstacles: Query<(&MovingObstacle, &ColliderHandle, &mut Position), With<MovingObstacle>>,
) {
    for (obstacle, handle, mut position) in obstacles.iter_mut() {
        position.0.z = obstacle.z_at(elapsed.0);
        colliders.refresh_dynamic(*handle, position.0, obstacle.half_extents);
        trace!(handle = handle.0, z = position.0.z, "Obstacle collider refreshed");
    }
}
