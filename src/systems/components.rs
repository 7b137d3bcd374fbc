use bevy_ecs::{bundle::Bundle, component::Component, resource::Resource};
use bitflags::bitflags;
use glam::{EulerRot, Quat, Vec3};

use crate::constants::player;

/// A tag component for the entity driven by player commands.
#[derive(Default, Component)]
pub struct PlayerControlled;

/// World-space center of an entity.
#[derive(Component, Debug, Clone, Copy, PartialEq, Default)]
pub struct Position(pub Vec3);

/// Where the player is looking. Yaw turns the body; pitch only tilts the camera.
#[derive(Component, Debug, Clone, Copy, PartialEq, Default)]
pub struct Facing {
    pub yaw: f32,
    pub pitch: f32,
}

impl Facing {
    /// Rotation of the body, used for movement. Pitch is ignored.
    pub fn body(&self) -> Quat {
        Quat::from_rotation_y(self.yaw)
    }

    /// Rotation of the camera, including pitch.
    pub fn camera(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0)
    }

    /// Unit vector the camera looks along.
    pub fn camera_forward(&self) -> Vec3 {
        self.camera() * Vec3::NEG_Z
    }

    /// Applies a raw mouse-look delta, keeping pitch within straight up and straight down.
    pub fn look(&mut self, yaw_delta: f32, pitch_delta: f32) {
        self.yaw -= yaw_delta * player::ROTATION_SPEED;
        self.pitch = (self.pitch - pitch_delta * player::ROTATION_SPEED).clamp(-player::MAX_PITCH, player::MAX_PITCH);
    }
}

bitflags! {
    /// Held movement keys. Opposing keys cancel out.
    #[derive(Component, Default, Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct MovementIntent: u8 {
        const FORWARD = 1 << 0;
        const BACKWARD = 1 << 1;
        const LEFT = 1 << 2;
        const RIGHT = 1 << 3;
    }
}

impl MovementIntent {
    /// Forward/back axis in `-1..=1`, positive is forward.
    pub fn forward_axis(&self) -> f32 {
        self.contains(Self::FORWARD) as i8 as f32 - self.contains(Self::BACKWARD) as i8 as f32
    }

    /// Left/right axis in `-1..=1`, positive is right.
    pub fn right_axis(&self) -> f32 {
        self.contains(Self::RIGHT) as i8 as f32 - self.contains(Self::LEFT) as i8 as f32
    }
}

/// Tracks the look-back key and the yaw to restore on release.
#[derive(Component, Debug, Clone, Copy, PartialEq, Default)]
pub enum LookBack {
    #[default]
    Inactive,
    Active {
        restore_yaw: f32,
    },
}

impl LookBack {
    pub fn active(&self) -> bool {
        matches!(self, LookBack::Active { .. })
    }
}

/// Whether the player moved this frame.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlayerMotion {
    pub moving: bool,
}

/// Set once the key is picked up on the final level; slows the player down.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CarryingKey(pub bool);

/// Cosmetic spin of the key crystal, in radians.
#[derive(Component, Debug, Clone, Copy, PartialEq, Default)]
pub struct Spin(pub f32);

#[derive(Bundle)]
pub struct PlayerBundle {
    pub player: PlayerControlled,
    pub position: Position,
    pub facing: Facing,
    pub intent: MovementIntent,
    pub look_back: LookBack,
    pub motion: PlayerMotion,
    pub carrying_key: CarryingKey,
}

impl PlayerBundle {
    pub fn at(start: Vec3) -> Self {
        Self {
            player: PlayerControlled,
            position: Position(start),
            facing: Facing::default(),
            intent: MovementIntent::empty(),
            look_back: LookBack::default(),
            motion: PlayerMotion::default(),
            carrying_key: CarryingKey::default(),
        }
    }
}

/// Frame delta for the current tick. Never negative.
#[derive(Resource, Debug, Clone, Copy)]
pub struct DeltaTime {
    pub seconds: f32,
}

impl DeltaTime {
    /// Creates a new DeltaTime from a host-supplied delta; negative or NaN deltas become zero.
    pub fn from_seconds(seconds: f32) -> Self {
        Self {
            seconds: seconds.max(0.0),
        }
    }
}

/// Seconds since the session started, used by oscillating effects.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct ElapsedTime(pub f32);

#[derive(Resource, Debug, Default)]
pub struct GlobalState {
    pub exit: bool,
}
