use labyrinth::{
    constants::{
        audio::{EXIT_MAX_VOLUME, KEY_MAX_VOLUME},
        game, LEVELS,
    },
    events::{GameCommand, PresentationEvent},
    game::Game,
    systems::{AudioLayer, AudioState, BreathingLight, CarryingKey, FalseEcho, GameStage, LossCause, PlayerControlled},
};
use pretty_assertions::assert_eq;
use speculoos::prelude::*;

mod common;

#[test]
fn test_new_game_waits_for_start() {
    let mut game = Game::with_seed(1).unwrap();

    game.tick(5.0);

    assert_eq!(game.stage(), GameStage::NotStarted);
    assert_that(&game.session().has_started).is_false();
    assert_that(&game.drain_presentation()).is_empty();
}

#[test]
fn test_start_loads_level_and_announces_it() {
    let mut game = Game::with_seed(1).unwrap();
    game.send(GameCommand::Start { level: 0 });

    game.tick(0.0);

    assert_eq!(game.stage(), GameStage::LevelRunning);
    assert_eq!(game.session().remaining, game::TIME_LIMIT);
    assert_eq!(
        game.drain_presentation(),
        vec![
            PresentationEvent::ShowTimer,
            PresentationEvent::LevelStarted {
                level: 0,
                name: LEVELS[0].name,
            },
        ]
    );
    assert_that(&game.objective().is_some()).is_true();

    let audio = game.world.resource::<AudioState>();
    assert_that(&audio.is_active(AudioLayer::Background)).is_true();
    assert_that(&audio.is_active(AudioLayer::KeyCrystal)).is_true();
    assert_that(&audio.is_active(AudioLayer::ExitPortal)).is_false();
}

#[test]
fn test_proximity_hums_never_exceed_their_caps() {
    let mut game = common::started_game(0);

    let key_volume = game.world.resource::<AudioState>().layer(AudioLayer::KeyCrystal).map(|l| l.volume);
    assert_that(&key_volume.unwrap()).is_less_than_or_equal_to(KEY_MAX_VOLUME);

    common::reach_objective(&mut game, 0.1);

    let exit_volume = game.world.resource::<AudioState>().layer(AudioLayer::ExitPortal).map(|l| l.volume);
    assert_that(&exit_volume.unwrap()).is_less_than_or_equal_to(EXIT_MAX_VOLUME);
}

#[test]
fn test_invalid_start_level_falls_back_to_first() {
    let game = common::started_game(7);

    assert_eq!(game.session().level, 0);
    assert_eq!(game.stage(), GameStage::LevelRunning);
}

#[test]
fn test_start_is_ignored_mid_session() {
    let mut game = common::started_game(1);

    game.send(GameCommand::Start { level: 0 });
    game.tick(0.0);

    assert_eq!(game.session().level, 1);
}

#[test]
fn test_timer_counts_down_while_running() {
    let mut game = common::started_game(0);

    game.tick(1.5);

    assert_eq!(game.session().remaining, game::TIME_LIMIT - 1.5);
    assert_eq!(game.hud().timer, "TIME: 58.5");
    assert_eq!(game.hud().status, "KEY STATUS: Missing");
}

#[test]
fn test_negative_delta_never_adds_time() {
    let mut game = common::started_game(0);
    game.tick(1.0);

    game.tick(-5.0);
    game.tick(f32::NAN);

    assert_eq!(game.session().remaining, game::TIME_LIMIT - 1.0);
    assert_eq!(game.stage(), GameStage::LevelRunning);
}

#[test]
fn test_exit_without_key_does_nothing() {
    let mut game = common::started_game(0);
    let key = game.objective().unwrap();

    // The exit sits two cells below the key on the first level.
    common::teleport(&mut game, key + glam::Vec3::new(0.0, 0.0, 10.0));
    game.tick(0.1);

    assert_eq!(game.stage(), GameStage::LevelRunning);
    assert_that(&game.session().key_collected).is_false();
}

#[test]
fn test_key_collection_swaps_music() {
    let mut game = common::started_game(0);

    common::reach_objective(&mut game, 0.1);

    assert_that(&game.session().key_collected).is_true();
    assert_eq!(game.hud().status, "KEY STATUS: Acquired (Find the Exit!)");

    let audio = game.world.resource::<AudioState>();
    assert_that(&audio.is_active(AudioLayer::Background)).is_false();
    assert_that(&audio.is_active(AudioLayer::KeyCrystal)).is_false();
    assert_that(&audio.is_active(AudioLayer::AfterKeyMusic)).is_true();
    assert_that(&audio.is_active(AudioLayer::ExitPortal)).is_true();

    // Only the final level slows the player down.
    let mut query = game.world.query_filtered::<&CarryingKey, bevy_ecs::query::With<PlayerControlled>>();
    assert_that(&query.single(&game.world).unwrap().0).is_false();
}

#[test]
fn test_exit_on_early_level_pauses_in_transition() {
    let mut game = common::started_game(0);
    common::reach_objective(&mut game, 2.0);
    let remaining = game.session().remaining;
    game.drain_presentation();

    common::reach_objective(&mut game, 3.0);

    assert_eq!(
        game.stage(),
        GameStage::LevelTransition {
            completed_level: 0,
            time_remaining: remaining,
        }
    );
    assert_eq!(game.session().remaining, remaining);
    assert_that(&game.drain_presentation()).contains(PresentationEvent::ShowTransition {
        completed_level: 0,
        time_remaining: remaining,
    });

    // Time stays frozen until the player continues.
    game.tick(10.0);
    assert_eq!(game.session().remaining, remaining);
    assert_eq!(game.hud().status, "STATUS: Level Conquered");
}

#[test]
fn test_view_is_frozen_during_transition() {
    let mut game = common::started_game(0);
    common::reach_objective(&mut game, 0.1);
    common::reach_objective(&mut game, 0.1);
    assert_that(&matches!(game.stage(), GameStage::LevelTransition { .. })).is_true();
    let (_, before) = game.player().unwrap();

    game.send(GameCommand::Look { yaw: 40.0, pitch: 0.0 });
    game.send(GameCommand::LookBack(true));
    game.tick(0.1);

    let (_, after) = game.player().unwrap();
    assert_eq!(after, before);
}

#[test]
fn test_continue_loads_next_level_once() {
    let mut game = common::started_game(0);
    common::reach_objective(&mut game, 0.1);
    common::reach_objective(&mut game, 0.1);

    game.send(GameCommand::Continue);
    game.send(GameCommand::Continue);
    game.tick(0.0);

    assert_eq!(game.stage(), GameStage::LevelRunning);
    let session = game.session();
    assert_eq!(session.level, 1);
    assert_eq!(session.remaining, game::TIME_LIMIT);
    assert_that(&session.key_collected).is_false();
    assert_that(&game.drain_presentation()).contains(PresentationEvent::LevelStarted {
        level: 1,
        name: LEVELS[1].name,
    });
}

#[test]
fn test_continue_outside_transition_is_ignored() {
    let mut game = common::started_game(0);

    game.send(GameCommand::Continue);
    game.tick(0.0);

    assert_eq!(game.session().level, 0);
    assert_eq!(game.stage(), GameStage::LevelRunning);
}

#[test]
fn test_exit_on_final_level_wins() {
    let mut game = common::started_game(2);
    common::reach_objective(&mut game, 0.1);
    game.drain_presentation();

    common::reach_objective(&mut game, 0.1);

    assert_eq!(game.stage(), GameStage::GameWon);
    assert_that(&game.session().won).is_true();
    let events = game.drain_presentation();
    assert_that(&events).contains(PresentationEvent::HideEntityTimer);
    assert_that(&events).contains(PresentationEvent::GameOver { won: true });
    assert_eq!(game.hud().status, "STATUS: ESCAPED! (WIN)");
    assert_that(&game.world.resource::<AudioState>().active_layers().count()).is_equal_to(0);
}

#[test]
fn test_time_running_out_loses() {
    let mut game = common::started_game(0);
    game.drain_presentation();

    game.tick(game::TIME_LIMIT + 1.0);

    assert_eq!(game.stage(), GameStage::GameLost(LossCause::TimeUp));
    assert_eq!(game.session().remaining, 0.0);
    assert_eq!(game.drain_presentation(), vec![PresentationEvent::GameOver { won: false }]);
    assert_eq!(game.hud().status, "STATUS: TIME OUT (LOSS)");
}

#[test]
fn test_restart_after_loss() {
    let mut game = common::started_game(0);
    game.tick(game::TIME_LIMIT + 1.0);

    game.send(GameCommand::Start { level: 1 });
    game.tick(0.0);

    assert_eq!(game.stage(), GameStage::LevelRunning);
    assert_eq!(game.session().level, 1);
    assert_eq!(game.session().remaining, game::TIME_LIMIT);
}

#[test]
fn test_final_level_ambience_follows_level() {
    let game = common::started_game(2);
    assert_that(&game.world.resource::<BreathingLight>().active).is_true();
    assert_that(&game.world.resource::<FalseEcho>().is_active()).is_true();
    assert_eq!(game.session().remaining, game::TIME_LIMIT_FINAL);

    let game = common::started_game(0);
    assert_that(&game.world.resource::<BreathingLight>().active).is_false();
    assert_that(&game.world.resource::<FalseEcho>().is_active()).is_false();
}

#[test]
fn test_exit_command_requests_shutdown() {
    let mut game = Game::with_seed(1).unwrap();
    game.send(GameCommand::Exit);

    assert_that(&game.tick(0.0)).is_true();
}
