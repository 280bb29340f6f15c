//! Runs a game to completion without rendering, steering the paddle towards
//! the lowest ball. Useful for watching the mechanics via `RUST_LOG=debug`.

use anyhow::Result;
use itertools::Itertools;

use breakout_engine::game::{Game, GameConfig, GameStatus};
use breakout_engine::mechanics::{GameInput, PaddleControl};

const MAX_STEPS: usize = 100_000;

fn main() -> Result<()> {
    env_logger::builder()
        .format_target(false)
        .format_timestamp_secs()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let mut game = Game::new(GameConfig {
        random_ball_kick: true,
        ..GameConfig::default()
    })?;

    let mut steps = 0;
    while game.status() == GameStatus::Running && steps < MAX_STEPS {
        game.time_step(GameInput::action(chase_lowest_ball(&game)));
        steps += 1;
    }

    log::info!(
        "finished after {} steps: {:?}, score {}, {} blocks and {} balls left",
        steps,
        game.status(),
        game.score(),
        game.remaining_blocks(),
        game.remaining_balls()
    );
    Ok(())
}

/// Moves the paddle center towards the x position of the lowest ball.
fn chase_lowest_ball(game: &Game) -> PaddleControl {
    let Some(target) = game
        .balls()
        .iter()
        .position_max_by(|a, b| a.center().y.total_cmp(&b.center().y))
        .map(|idx| game.balls()[idx].center().x)
    else {
        return PaddleControl::None;
    };

    let paddle = game.paddle_rect();
    let paddle_center = paddle.start_x() + paddle.width() / 2.0;
    if target < paddle_center - paddle.width() / 4.0 {
        PaddleControl::MoveLeft
    } else if target > paddle_center + paddle.width() / 4.0 {
        PaddleControl::MoveRight
    } else {
        PaddleControl::None
    }
}
