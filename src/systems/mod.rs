//! The Entity-Component-System (ECS) module.
//!
//! This module contains all the ECS-related logic, including components, systems,
//! and resources.

use glam::{Vec3, Vec3Swizzles};

pub mod ambient;
pub mod audio;
pub mod collision;
pub mod components;
pub mod hud;
pub mod level;
pub mod movement;
pub mod profiling;
pub mod pursuit;
pub mod state;

pub use self::ambient::*;
pub use self::audio::*;
pub use self::collision::*;
pub use self::components::*;
pub use self::hud::*;
pub use self::level::*;
pub use self::movement::*;
pub use self::profiling::*;
pub use self::pursuit::*;
pub use self::state::*;

/// Distance on the ground plane; height differences are ignored.
pub fn flat_distance(a: Vec3, b: Vec3) -> f32 {
    a.xz().distance(b.xz())
}
