//! Audio layer bookkeeping.
//!
//! The core never plays sound. It emits [`AudioEvent`]s naming layers symbolically, and keeps a
//! small mixer model ([`AudioState`]) in sync with them so the host and tests can inspect what
//! should currently be audible.

use bevy_ecs::{
    event::{Event, EventReader, EventWriter},
    query::With,
    resource::Resource,
    system::{Query, Res, ResMut, Single},
};
use smallvec::SmallVec;
use strum_macros::{AsRefStr, Display, EnumCount, EnumIter};
use tracing::{debug, trace};

use crate::constants::audio;
use crate::events::MotionEvent;
use crate::map::builder::LevelObject;
use crate::systems::{PlayerControlled, Position};

/// Looping sound layers. The level index of an activation selects the concrete track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumCount, AsRefStr, Display)]
#[strum(serialize_all = "snake_case")]
pub enum AudioLayer {
    Background,
    AfterKeyMusic,
    KeyCrystal,
    ExitPortal,
    Footsteps,
}

impl AudioLayer {
    /// Volume a layer starts at when activated. Proximity hums start silent until the first
    /// distance update.
    pub fn initial_volume(self) -> f32 {
        match self {
            AudioLayer::KeyCrystal | AudioLayer::ExitPortal => 0.0,
            _ => 1.0,
        }
    }
}

/// Fire-and-forget sounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Cue {
    LevelComplete,
    Jumpscare,
}

/// The sounds the false echo cycles through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, EnumIter, EnumCount, AsRefStr, Display)]
#[strum(serialize_all = "snake_case")]
pub enum EchoSound {
    #[default]
    Footsteps,
    CrystalScream,
    GhostWhispers,
}

/// Events for the host's audio backend.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub enum AudioEvent {
    Activate { layer: AudioLayer, level: usize },
    Deactivate(AudioLayer),
    SetVolume(AudioLayer, f32),
    OneShot(Cue),
    Echo(EchoSound),
    StopAll,
}

/// One active layer as the mixer model sees it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerState {
    pub layer: AudioLayer,
    pub level: usize,
    pub volume: f32,
}

/// What should currently be audible.
#[derive(Resource, Debug, Clone, Default)]
pub struct AudioState {
    layers: SmallVec<[LayerState; 5]>,
    /// One-shots and echoes fired this session.
    pub one_shots: u32,
}

impl AudioState {
    pub fn layer(&self, layer: AudioLayer) -> Option<&LayerState> {
        self.layers.iter().find(|l| l.layer == layer)
    }

    pub fn is_active(&self, layer: AudioLayer) -> bool {
        self.layer(layer).is_some()
    }

    pub fn active_layers(&self) -> impl Iterator<Item = AudioLayer> + '_ {
        self.layers.iter().map(|l| l.layer)
    }

    fn apply(&mut self, event: &AudioEvent) {
        match *event {
            AudioEvent::Activate { layer, level } => {
                self.layers.retain(|l| l.layer != layer);
                self.layers.push(LayerState {
                    layer,
                    level,
                    volume: layer.initial_volume(),
                });
            }
            AudioEvent::Deactivate(layer) => self.layers.retain(|l| l.layer != layer),
            AudioEvent::SetVolume(layer, volume) => {
                if let Some(state) = self.layers.iter_mut().find(|l| l.layer == layer) {
                    state.volume = volume;
                }
            }
            AudioEvent::OneShot(_) | AudioEvent::Echo(_) => self.one_shots += 1,
            AudioEvent::StopAll => self.layers.clear(),
        }
    }
}

/// Keeps the mixer model in sync with this frame's audio events.
pub fn audio_system(mut state: ResMut<AudioState>, mut events: EventReader<AudioEvent>) {
    for event in events.read() {
        match event {
            AudioEvent::SetVolume(..) => trace!(?event, "Audio event"),
            _ => debug!(?event, "Audio event"),
        }
        state.apply(event);
    }
}

/// Volume of a proximity hum: linear falloff to silence at `falloff`.
pub fn proximity_volume(distance: f32, falloff: f32, max_volume: f32) -> f32 {
    (1.0 - distance / falloff).max(0.0) * max_volume
}

/// Scales the key and exit hums by the player's distance to them.
pub fn proximity_audio_system(
    state: Res<AudioState>,
    mut events: EventWriter<AudioEvent>,
    player: Single<&Position, With<PlayerControlled>>,
    objects: Query<(&LevelObject, &Position)>,
) {
    let player = player.0;
    for (object, position) in objects.iter() {
        let (layer, falloff, max_volume) = match object {
            LevelObject::Key => (AudioLayer::KeyCrystal, audio::KEY_FALLOFF, audio::KEY_MAX_VOLUME),
            LevelObject::Exit => (AudioLayer::ExitPortal, audio::EXIT_FALLOFF, audio::EXIT_MAX_VOLUME),
            _ => continue,
        };
        if state.is_active(layer) {
            let volume = proximity_volume(player.distance(position.0), falloff, max_volume);
            events.write(AudioEvent::SetVolume(layer, volume));
        }
    }
}

/// Footsteps follow the player's motion.
pub fn footstep_system(mut motion: EventReader<MotionEvent>, mut events: EventWriter<AudioEvent>) {
    for event in motion.read() {
        events.write(match event {
            MotionEvent::Started => AudioEvent::Activate {
                layer: AudioLayer::Footsteps,
                level: 0,
            },
            MotionEvent::Stopped => AudioEvent::Deactivate(AudioLayer::Footsteps),
        });
    }
}
