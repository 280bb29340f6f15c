use std::cell::RefCell;
use std::rc::Rc;

use anyhow::{bail, Result};

use crate::algebra_2d::{Point, Rect, Velocity};
use crate::environment::{GameEnvironment, ObjectId, SharedCollidable};
use crate::listeners::{
    shared_counter, shared_op_queue, BallRemover, BlockRemover, GameOp, ScoreTrackingListener,
    SharedCounter, SharedOpQueue,
};
use crate::mechanics::{Ball, Block, Color, GameInput, PaddleControl, Paddle};

pub const ARENA_WIDTH: f64 = 800.0;
pub const ARENA_HEIGHT: f64 = 600.0;
const MARGIN: f64 = 30.0;

const BLOCK_WIDTH: f64 = 50.0;
const BLOCK_HEIGHT: f64 = 25.0;
const BLOCK_SPACING: f64 = 0.0;
const TOP_ROW_BLOCKS: usize = 12;

const PADDLE_WIDTH: f64 = 120.0;
const PADDLE_HEIGHT: f64 = 5.0;
const PADDLE_RAISE: f64 = 30.0;

const BALL_RADIUS: f64 = 7.0;
const BALL_SPACING: f64 = 32.0;
const START_SPEED: f64 = 7.0;

const WIN_BONUS: i32 = 100;

const WHITE: Color = Color::rgb(238, 238, 238);
const BLOCK_COLORS: [Color; 4] = [
    Color::rgb(0, 145, 234),
    Color::rgb(0, 200, 83),
    Color::rgb(197, 17, 98),
    Color::rgb(255, 214, 0),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    Running,
    Won,
    Lost,
}

#[derive(Clone, Copy, Debug)]
pub struct GameConfig {
    pub arena_width: f64,
    pub arena_height: f64,
    pub top_row_blocks: usize,
    /// Kick each ball in a random direction instead of straight down.
    pub random_ball_kick: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            arena_width: ARENA_WIDTH,
            arena_height: ARENA_HEIGHT,
            top_row_blocks: TOP_ROW_BLOCKS,
            random_ball_kick: false,
        }
    }
}

/// The assembled level: nested frame blocks, a death strip above the bottom
/// margin, a triangle of destroyable blocks, the paddle and three balls.
///
/// One `time_step` call applies the paddle control, moves every ball one
/// step and settles the registry mutations the hit listeners requested.
pub struct Game {
    environment: GameEnvironment,
    balls: Vec<Ball>,
    paddle: Rc<RefCell<Paddle>>,
    ops: SharedOpQueue,
    remaining_blocks: SharedCounter,
    remaining_balls: SharedCounter,
    score: SharedCounter,
    status: GameStatus,
    next_id: u32,
}

impl Game {
    pub fn new(config: GameConfig) -> Result<Self> {
        let playfield_width = config.arena_width - 2.0 * MARGIN;
        if playfield_width < PADDLE_WIDTH {
            bail!(
                "arena width {} leaves no room for the paddle inside the margins",
                config.arena_width
            );
        }
        if config.arena_height < 2.0 * MARGIN + 2.0 * PADDLE_RAISE {
            bail!("arena height {} is too small", config.arena_height);
        }
        if config.top_row_blocks == 0 {
            bail!("a level needs at least one destroyable block");
        }
        if config.top_row_blocks as f64 * (BLOCK_WIDTH + BLOCK_SPACING) > playfield_width {
            bail!(
                "{} blocks of width {} do not fit into the playfield",
                config.top_row_blocks,
                BLOCK_WIDTH
            );
        }

        let mut game = Self {
            environment: GameEnvironment::new(),
            balls: Vec::new(),
            paddle: Rc::new(RefCell::new(Paddle::new(
                ObjectId(0),
                Point::new(0.0, 0.0),
                PADDLE_WIDTH,
                PADDLE_HEIGHT,
                Rect::new(Point::new(0.0, 0.0), 1.0, 1.0),
            ))),
            ops: shared_op_queue(),
            remaining_blocks: shared_counter(),
            remaining_balls: shared_counter(),
            score: shared_counter(),
            status: GameStatus::Running,
            next_id: 0,
        };
        game.assemble(&config);
        Ok(game)
    }

    fn next_id(&mut self) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        id
    }

    fn assemble(&mut self, config: &GameConfig) {
        let width = config.arena_width;
        let height = config.arena_height;

        // outer frame, then the arena the ball actually lives in
        let frame_id = self.next_id();
        self.environment.add_collidable(Rc::new(RefCell::new(Block::new(
            frame_id,
            Rect::new(Point::new(0.0, 0.0), width, height),
            WHITE,
        ))));

        let arena_rect = Rect::new(
            Point::new(MARGIN, MARGIN),
            width - 2.0 * MARGIN,
            height - 2.0 * MARGIN,
        );
        let arena_id = self.next_id();
        self.environment.add_collidable(Rc::new(RefCell::new(Block::new(
            arena_id,
            arena_rect,
            Color::BACKGROUND,
        ))));

        // death strip just above the bottom margin
        let death_id = self.next_id();
        let mut death_strip = Block::new(
            death_id,
            Rect::new(
                Point::new(MARGIN, height - MARGIN - 1.0),
                width - 2.0 * MARGIN,
                1.0,
            ),
            Color::BACKGROUND,
        );
        death_strip.add_hit_listener(Rc::new(RefCell::new(BallRemover::new(
            Rc::clone(&self.ops),
            Rc::clone(&self.remaining_balls),
        ))));
        self.environment
            .add_collidable(Rc::new(RefCell::new(death_strip)));

        self.add_triangle_blocks(config);

        // balls start around the arena center, heading straight down
        for offset in [
            Point::new(BALL_SPACING, 0.0),
            Point::new(-BALL_SPACING, 0.0),
            Point::new(0.0, 1.5),
        ] {
            let id = self.next_id();
            let mut ball = Ball::new(
                id,
                Point::new(width / 2.0 + offset.x, height / 2.0 + offset.y),
                BALL_RADIUS,
                WHITE,
            );
            if config.random_ball_kick {
                ball.set_random_speed();
            } else {
                ball.set_velocity(Velocity::new(0.0, START_SPEED));
            }
            self.balls.push(ball);
        }
        self.remaining_balls.borrow_mut().increase(self.balls.len() as i32);

        let paddle_id = self.next_id();
        self.paddle = Rc::new(RefCell::new(Paddle::new(
            paddle_id,
            Point::new((width - PADDLE_WIDTH) / 2.0, height - 2.0 * PADDLE_RAISE),
            PADDLE_WIDTH,
            PADDLE_HEIGHT,
            arena_rect,
        )));
        let shared: SharedCollidable = self.paddle.clone();
        self.environment.add_collidable(shared);
    }

    fn add_triangle_blocks(&mut self, config: &GameConfig) {
        let start_y = 2.0 * MARGIN;
        let mut level = 0usize;
        let mut number_of_blocks = config.top_row_blocks;
        while number_of_blocks > 0 {
            let start_x =
                (config.arena_width - number_of_blocks as f64 * (BLOCK_WIDTH + BLOCK_SPACING)) / 2.0;
            for i in 0..number_of_blocks {
                let x = start_x + (BLOCK_WIDTH + BLOCK_SPACING) * i as f64;
                let y = start_y + (BLOCK_HEIGHT + BLOCK_SPACING) * level as f64;
                let id = self.next_id();
                let mut block = Block::new(
                    id,
                    Rect::new(Point::new(x, y), BLOCK_WIDTH, BLOCK_HEIGHT),
                    BLOCK_COLORS[level % BLOCK_COLORS.len()],
                );
                block.add_hit_listener(Rc::new(RefCell::new(BlockRemover::new(
                    Rc::clone(&self.ops),
                    Rc::clone(&self.remaining_blocks),
                ))));
                block.add_hit_listener(Rc::new(RefCell::new(ScoreTrackingListener::new(
                    Rc::clone(&self.score),
                ))));
                self.environment.add_collidable(Rc::new(RefCell::new(block)));
            }
            self.remaining_blocks
                .borrow_mut()
                .increase(number_of_blocks as i32);
            number_of_blocks = number_of_blocks.saturating_sub(2);
            level += 1;
        }
    }

    /// Advances the simulation by one step: paddle control, one move per
    /// ball, then the registry mutations requested by hit listeners.
    pub fn time_step(&mut self, input: GameInput) -> GameStatus {
        if self.status != GameStatus::Running {
            return self.status;
        }

        match input.control {
            PaddleControl::MoveLeft => self.paddle.borrow_mut().move_left(),
            PaddleControl::MoveRight => self.paddle.borrow_mut().move_right(),
            PaddleControl::None => {}
        }

        // snapshot the ids: a listener may remove a ball mid-iteration
        let ball_ids: Vec<ObjectId> = self.balls.iter().map(Ball::id).collect();
        for id in ball_ids {
            if let Some(ball) = self.balls.iter_mut().find(|b| b.id() == id) {
                ball.move_one_step(&self.environment);
            }
            self.apply_pending_ops();
        }

        self.update_status();
        self.status
    }

    fn apply_pending_ops(&mut self) {
        for op in self.ops.borrow_mut().drain() {
            match op {
                GameOp::RemoveBlock(id) => {
                    log::debug!("removing block {:?}", id);
                    self.environment.remove_collidable(id);
                }
                GameOp::RemoveBall(id) => {
                    log::debug!("removing ball {:?}", id);
                    self.balls.retain(|b| b.id() != id);
                }
            }
        }
    }

    fn update_status(&mut self) {
        if self.remaining_blocks.borrow().value() == 0 {
            self.score.borrow_mut().increase(WIN_BONUS);
            self.status = GameStatus::Won;
            log::info!("all blocks cleared, final score {}", self.score());
        } else if self.remaining_balls.borrow().value() == 0 {
            self.status = GameStatus::Lost;
            log::info!("all balls lost, final score {}", self.score());
        }
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn score(&self) -> i32 {
        self.score.borrow().value()
    }

    pub fn remaining_blocks(&self) -> i32 {
        self.remaining_blocks.borrow().value()
    }

    pub fn remaining_balls(&self) -> i32 {
        self.remaining_balls.borrow().value()
    }

    pub fn balls(&self) -> &[Ball] {
        &self.balls
    }

    pub fn paddle_rect(&self) -> Rect {
        self.paddle.borrow().rect()
    }

    pub fn environment(&self) -> &GameEnvironment {
        &self.environment
    }
}
