//! The final level's stalker: it closes in while unobserved and kills when its timer runs out.
//!
//! The stalker freezes, and its timer refills, only while the player is looking back and the
//! stalker sits inside the flashlight cone. Each frame decides freeze or advance first, then
//! applies the timer, then moves.

use bevy_ecs::{
    event::EventWriter,
    query::With,
    resource::Resource,
    system::{Res, ResMut, Single},
};
use glam::{Quat, Vec3};
use tracing::{debug, info, trace, warn};

use crate::constants::{entity, player};
use crate::events::PlayerCaught;
use crate::systems::{DeltaTime, Facing, LookBack, PlayerControlled, Position};

/// A cone of vision with its apex at the viewer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisionCone {
    /// Maximum angle from the view direction, in radians (exclusive).
    pub half_angle: f32,
    /// Maximum distance from the viewer (inclusive).
    pub range: f32,
}

impl VisionCone {
    /// The cone lit by the player's flashlight.
    pub const FLASHLIGHT: VisionCone = VisionCone {
        half_angle: entity::VIEW_HALF_ANGLE,
        range: entity::VIEW_RANGE,
    };

    /// Whether `target` is seen from `origin` looking along `forward`.
    ///
    /// A target sitting exactly on the origin has no direction and is not seen.
    pub fn contains(&self, origin: Vec3, forward: Vec3, target: Vec3) -> bool {
        let to_target = target - origin;
        let distance = to_target.length();
        if distance > self.range || distance <= f32::EPSILON {
            return false;
        }
        forward.angle_between(to_target) < self.half_angle
    }
}

/// Where the camera is and where it points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewpoint {
    pub position: Vec3,
    pub forward: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stalker {
    pub position: Vec3,
    /// Seconds left before the stalker reaches the player.
    pub timer: f32,
}

/// Result of one pursuit update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PursuitOutcome {
    /// No stalker is active.
    Dormant,
    /// Seen in the flashlight while the player looks back; timer refilled.
    Frozen,
    /// Unseen; timer ticked down and the stalker moved closer.
    Advancing,
    /// The timer ran out this frame. The caller must `remove()` the stalker.
    Caught,
}

/// At most one stalker, plus the player's look-back state as it concerns the stalker.
#[derive(Resource, Debug, Clone)]
pub struct Pursuit {
    stalker: Option<Stalker>,
    looking_back: bool,
    cone: VisionCone,
}

impl Default for Pursuit {
    fn default() -> Self {
        Self {
            stalker: None,
            looking_back: false,
            cone: VisionCone::FLASHLIGHT,
        }
    }
}

impl Pursuit {
    /// Places the stalker directly behind the player, at eye height, with a full timer.
    pub fn spawn(&mut self, player_position: Vec3, facing: Quat) {
        let forward = (facing * Vec3::NEG_Z).with_y(0.0).normalize_or_zero();
        let position = (player_position - forward * entity::SPAWN_DISTANCE).with_y(player::HEIGHT);

        if self.stalker.is_some() {
            warn!("Stalker spawned while one was already active; replacing it");
        }
        info!(position = ?position, "Stalker spawned");
        self.stalker = Some(Stalker {
            position,
            timer: entity::TIMER,
        });
    }

    /// Returns to dormant, resetting the timer and the look-back flag.
    pub fn remove(&mut self) {
        if self.stalker.take().is_some() {
            debug!("Stalker removed");
        }
        self.looking_back = false;
    }

    pub fn set_looking_back(&mut self, looking_back: bool) {
        self.looking_back = looking_back;
    }

    pub fn looking_back(&self) -> bool {
        self.looking_back
    }

    pub fn is_active(&self) -> bool {
        self.stalker.is_some()
    }

    /// Remaining seconds, or the full timer when dormant.
    pub fn timer(&self) -> f32 {
        self.stalker.map_or(entity::TIMER, |s| s.timer)
    }

    pub fn position(&self) -> Option<Vec3> {
        self.stalker.map(|s| s.position)
    }

    pub fn stalker(&self) -> Option<&Stalker> {
        self.stalker.as_ref()
    }

    /// Whether the stalker is currently inside the flashlight cone.
    pub fn visible_from(&self, view: &Viewpoint) -> bool {
        self.stalker
            .is_some_and(|s| self.cone.contains(view.position, view.forward, s.position))
    }

    /// Advances the pursuit by one frame.
    pub fn update(&mut self, dt: f32, view: &Viewpoint) -> PursuitOutcome {
        let dt = dt.max(0.0);
        let frozen = self.looking_back && self.visible_from(view);
        let Some(stalker) = self.stalker.as_mut() else {
            return PursuitOutcome::Dormant;
        };

        if frozen {
            stalker.timer = entity::TIMER;
            return PursuitOutcome::Frozen;
        }

        stalker.timer = (stalker.timer - dt).max(0.0);
        if stalker.timer <= 0.0 {
            return PursuitOutcome::Caught;
        }

        // Straight at the player's current spot; no maze awareness.
        let to_player = (view.position - stalker.position).with_y(0.0);
        let step = to_player.normalize_or_zero() * entity::SPEED * dt;
        stalker.position = (stalker.position + step.clamp_length_max(to_player.length())).with_y(player::HEIGHT);

        PursuitOutcome::Advancing
    }
}

/// How close the stalker timer is to running out, for the HUD.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Urgency {
    Safe,
    Warning,
    Critical,
}

impl Urgency {
    pub fn from_remaining(seconds: f32) -> Self {
        if seconds <= entity::CRITICAL_THRESHOLD {
            Urgency::Critical
        } else if seconds <= entity::WARNING_THRESHOLD {
            Urgency::Warning
        } else {
            Urgency::Safe
        }
    }
}

/// Runs the stalker for this frame and reports a catch.
pub fn pursuit_system(
    delta_time: Res<DeltaTime>,
    mut pursuit: ResMut<Pursuit>,
    mut caught: EventWriter<PlayerCaught>,
    player: Single<(&Position, &Facing, &LookBack), With<PlayerControlled>>,
) {
    if !pursuit.is_active() {
        return;
    }

    let (position, facing, look_back) = player.into_inner();
    pursuit.set_looking_back(look_back.active());

    let view = Viewpoint {
        position: position.0,
        forward: facing.camera_forward(),
    };

    match pursuit.update(delta_time.seconds, &view) {
        PursuitOutcome::Caught => {
            info!("Stalker timer expired");
            caught.write(PlayerCaught);
        }
        outcome => {
            trace!(?outcome, timer = pursuit.timer(), "Pursuit updated");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urgency_thresholds() {
        assert_eq!(Urgency::from_remaining(5.0), Urgency::Safe);
        assert_eq!(Urgency::from_remaining(2.5), Urgency::Warning);
        assert_eq!(Urgency::from_remaining(1.0), Urgency::Critical);
        assert_eq!(Urgency::from_remaining(0.0), Urgency::Critical);
    }

    #[test]
    fn test_cone_rejects_out_of_range() {
        let cone = VisionCone::FLASHLIGHT;
        assert!(cone.contains(Vec3::ZERO, Vec3::NEG_Z, Vec3::new(0.0, 0.0, -50.0)));
        assert!(!cone.contains(Vec3::ZERO, Vec3::NEG_Z, Vec3::new(0.0, 0.0, -50.5)));
    }

    #[test]
    fn test_cone_rejects_wide_angle() {
        let cone = VisionCone::FLASHLIGHT;
        // atan(1) = 0.785 rad, outside the 0.6 rad half-angle
        assert!(!cone.contains(Vec3::ZERO, Vec3::NEG_Z, Vec3::new(10.0, 0.0, -10.0)));
        // atan(0.5) = 0.46 rad, inside
        assert!(cone.contains(Vec3::ZERO, Vec3::NEG_Z, Vec3::new(5.0, 0.0, -10.0)));
    }
}
