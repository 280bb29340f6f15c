use breakout_engine::game::{Game, GameConfig, GameStatus};
use breakout_engine::mechanics::{GameInput, PaddleControl};

#[ctor::ctor]
fn init() {
    use log::LevelFilter;
    env_logger::builder()
        .format_timestamp_secs()
        .filter_level(LevelFilter::Debug)
        .parse_default_env()
        .try_init()
        .ok();
}

const TRIANGLE_BLOCKS: i32 = 42;
// frame, arena, death strip and paddle stay registered for the whole game
const STATIC_COLLIDABLES: usize = 4;

/// Runs a deterministic game (no random kick) and checks the bookkeeping
/// invariants after every step.
#[test]
fn deterministic_game_keeps_registry_and_score_consistent() {
    let mut game = Game::new(GameConfig::default()).unwrap();
    assert_eq!(game.remaining_blocks(), TRIANGLE_BLOCKS);

    for _ in 0..20_000 {
        let status = game.time_step(GameInput::none());

        let remaining = game.remaining_blocks();
        assert_eq!(
            game.environment().collidables().len(),
            STATIC_COLLIDABLES + remaining as usize
        );
        assert_eq!(game.remaining_balls() as usize, game.balls().len());

        let destroyed = TRIANGLE_BLOCKS - remaining;
        let bonus = if status == GameStatus::Won { 100 } else { 0 };
        assert_eq!(game.score(), destroyed + bonus);

        for ball in game.balls() {
            let c = ball.center();
            assert!(c.x >= 0.0 && c.x <= 800.0, "ball escaped: {:?}", c);
            assert!(c.y >= 0.0 && c.y <= 600.0, "ball escaped: {:?}", c);
        }

        if status != GameStatus::Running {
            break;
        }
    }

    // the center ball bounces between paddle and triangle from step one
    assert!(game.score() > 0);
}

#[test]
fn paddle_wraps_to_the_right_frame_edge() {
    let mut game = Game::new(GameConfig::default()).unwrap();
    assert_eq!(game.paddle_rect().upper_left().x, 340.0);

    // 45 impulses reach the left margin, the 46th wraps
    for _ in 0..46 {
        game.time_step(GameInput::action(PaddleControl::MoveLeft));
    }
    assert_eq!(game.paddle_rect().upper_left().x, 650.0);
}

#[test]
fn won_and_lost_are_terminal() {
    let mut game = Game::new(GameConfig::default()).unwrap();
    let mut last = GameStatus::Running;
    for _ in 0..200_000 {
        last = game.time_step(GameInput::none());
        if last != GameStatus::Running {
            break;
        }
    }
    // whatever the outcome, a finished game stays finished
    if last != GameStatus::Running {
        let score = game.score();
        assert_eq!(game.time_step(GameInput::none()), last);
        assert_eq!(game.score(), score);
    }
}
