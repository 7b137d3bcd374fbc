//! Player movement: intent to displacement, resolved against the level's colliders.

use bevy_ecs::{
    event::{EventReader, EventWriter},
    query::With,
    system::{Res, Single},
};
use glam::{Quat, Vec3};
use std::f32::consts::PI;
use tracing::{debug, trace};

use crate::constants::player;
use crate::events::{GameCommand, GameEvent, MotionEvent};
use crate::systems::{
    CarryingKey, ColliderSet, DeltaTime, Facing, GameStage, LookBack, MovementIntent, PlayerControlled, PlayerMotion,
    Position, Pursuit, Sphere,
};

/// One frame's worth of player movement input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveRequest {
    pub position: Vec3,
    /// Forward/back intent in `-1..=1`.
    pub forward: f32,
    /// Right/left intent in `-1..=1`.
    pub right: f32,
    pub facing: Quat,
    pub speed: f32,
    pub dt: f32,
}

impl MoveRequest {
    /// The unconstrained displacement for this frame, always on the ground plane.
    pub fn displacement(&self) -> Vec3 {
        let forward = (self.facing * Vec3::NEG_Z).with_y(0.0).normalize_or_zero();
        let right = (self.facing * Vec3::X).with_y(0.0).normalize_or_zero();
        let step = self.speed * self.dt;
        forward * (self.forward * step) + right * (self.right * step)
    }
}

/// Moves the player sphere as far as the colliders allow.
///
/// The full displacement is tried first, then only its depth (z) component, then only its
/// lateral (x) component. The first one that leaves the sphere clear is committed; if none
/// does, the player stays put. The y coordinate is never touched.
pub fn resolve(request: &MoveRequest, colliders: &ColliderSet) -> Vec3 {
    let displacement = request.displacement();
    if displacement == Vec3::ZERO {
        return request.position;
    }

    let candidates = [
        displacement,
        Vec3::new(0.0, 0.0, displacement.z),
        Vec3::new(displacement.x, 0.0, 0.0),
    ];

    for candidate in candidates.into_iter().filter(|c| *c != Vec3::ZERO) {
        let target = request.position + candidate;
        let sphere = Sphere {
            center: target,
            radius: player::RADIUS,
        };
        if !colliders.intersects(&sphere) {
            return target;
        }
    }

    trace!(position = ?request.position, "Movement fully blocked");
    request.position
}

/// Picks the single speed that applies; looking back at the stalker beats carrying the key.
pub fn player_speed(looking_back: bool, pursued: bool, carrying_key: bool) -> f32 {
    if looking_back && pursued {
        player::MOVE_SPEED_FACING_ENTITY
    } else if carrying_key {
        player::MOVE_SPEED_WITH_KEY
    } else {
        player::MOVE_SPEED
    }
}

/// Applies movement, look and look-back commands to the player.
///
/// Held movement keys are always tracked; the view only turns while a level is running.
pub fn player_control_system(
    stage: Res<GameStage>,
    mut events: EventReader<GameEvent>,
    player: Single<(&mut MovementIntent, &mut Facing, &mut LookBack), With<PlayerControlled>>,
) {
    let (mut intent, mut facing, mut look_back) = player.into_inner();

    for event in events.read() {
        let GameEvent::Command(command) = event;
        if let GameCommand::Move(new_intent) = *command {
            *intent = new_intent;
            continue;
        }
        if !stage.is_running() {
            trace!(?command, ?stage, "View command ignored outside a running level");
            continue;
        }
        match *command {
            GameCommand::Look { yaw, pitch } => {
                facing.look(yaw, pitch);
            }
            GameCommand::LookBack(true) if !look_back.active() => {
                *look_back = LookBack::Active { restore_yaw: facing.yaw };
                facing.yaw += PI;
                debug!(yaw = facing.yaw, "Looking back");
            }
            GameCommand::LookBack(false) => {
                if let LookBack::Active { restore_yaw } = *look_back {
                    facing.yaw = restore_yaw;
                    debug!(yaw = facing.yaw, "Facing forward again");
                }
                *look_back = LookBack::Inactive;
            }
            _ => {}
        }
    }
}

/// Moves the player for this frame and reports when walking starts or stops.
pub fn player_movement_system(
    delta_time: Res<DeltaTime>,
    colliders: Res<ColliderSet>,
    pursuit: Res<Pursuit>,
    mut motion_events: EventWriter<MotionEvent>,
    player: Single<
        (
            &MovementIntent,
            &Facing,
            &LookBack,
            &CarryingKey,
            &mut Position,
            &mut PlayerMotion,
        ),
        With<PlayerControlled>,
    >,
) {
    let (intent, facing, look_back, carrying_key, mut position, mut motion) = player.into_inner();

    let request = MoveRequest {
        position: position.0,
        forward: intent.forward_axis(),
        right: intent.right_axis(),
        facing: facing.body(),
        speed: player_speed(look_back.active(), pursuit.is_active(), carrying_key.0),
        dt: delta_time.seconds,
    };
    position.0 = resolve(&request, &colliders);

    let moving = request.forward != 0.0 || request.right != 0.0;
    if moving != motion.moving {
        motion.moving = moving;
        motion_events.write(if moving { MotionEvent::Started } else { MotionEvent::Stopped });
        trace!(moving, "Player motion changed");
    }
}
