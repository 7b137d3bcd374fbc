use bevy_ecs::{
    resource::Resource,
    system::{Res, ResMut},
};

use crate::constants::LEVELS;
use crate::systems::{GameStage, LossCause, Pursuit, Session, Urgency};

/// Text the presentation host shows every frame.
#[derive(Resource, Debug, Clone, PartialEq, Default)]
pub struct Hud {
    pub level_name: &'static str,
    pub timer: String,
    pub status: String,
    /// Shown only while the stalker hunts.
    pub entity_timer: Option<(String, Urgency)>,
}

pub fn status_line(stage: &GameStage, key_collected: bool) -> &'static str {
    match stage {
        GameStage::NotStarted => "STATUS: Waiting",
        GameStage::LevelRunning if key_collected => "KEY STATUS: Acquired (Find the Exit!)",
        GameStage::LevelRunning => "KEY STATUS: Missing",
        GameStage::LevelTransition { .. } => "STATUS: Level Conquered",
        GameStage::GameWon => "STATUS: ESCAPED! (WIN)",
        GameStage::GameLost(LossCause::TimeUp) => "STATUS: TIME OUT (LOSS)",
        GameStage::GameLost(LossCause::Caught) => "STATUS: CAUGHT (LOSS)",
    }
}

pub fn hud_system(stage: Res<GameStage>, session: Res<Session>, pursuit: Res<Pursuit>, mut hud: ResMut<Hud>) {
    let remaining = match *stage {
        GameStage::LevelTransition { time_remaining, .. } => time_remaining,
        _ => session.remaining,
    };

    hud.level_name = LEVELS.get(session.level).map_or("", |l| l.name);
    hud.timer = format!("TIME: {remaining:.1}");
    hud.status = status_line(&stage, session.key_collected).to_string();
    hud.entity_timer = pursuit
        .is_active()
        .then(|| (format!("ENTITY: {:.1}s", pursuit.timer()), Urgency::from_remaining(pursuit.timer())));
}
