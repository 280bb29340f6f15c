use std::cell::RefCell;
use std::rc::Rc;

use crate::environment::ObjectId;
use crate::mechanics::{Ball, Block};

/// Receives block hit events. Dispatch always runs on a snapshot of the
/// listener list, so implementations may re-register freely.
pub trait HitListener {
    fn hit_event(&mut self, being_hit: &Block, hitter: &mut Ball);
}

pub type SharedHitListener = Rc<RefCell<dyn HitListener>>;

/// Plain up/down counter; shared between the game loop and its listeners as
/// an opaque handle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Counter {
    count: i32,
}

impl Counter {
    pub fn increase(&mut self, number: i32) {
        self.count += number;
    }

    pub fn decrease(&mut self, number: i32) {
        self.count -= number;
    }

    pub fn value(&self) -> i32 {
        self.count
    }
}

pub type SharedCounter = Rc<RefCell<Counter>>;

pub fn shared_counter() -> SharedCounter {
    Rc::new(RefCell::new(Counter::default()))
}

/// Registry mutation requested by a hit listener. Listeners never touch the
/// environment directly; the game loop drains the queue between steps so a
/// callback cannot invalidate an iteration that is still in flight.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameOp {
    RemoveBlock(ObjectId),
    RemoveBall(ObjectId),
}

#[derive(Default)]
pub struct OpQueue {
    ops: Vec<GameOp>,
}

impl OpQueue {
    pub fn push(&mut self, op: GameOp) {
        self.ops.push(op);
    }

    pub fn drain(&mut self) -> Vec<GameOp> {
        std::mem::take(&mut self.ops)
    }
}

pub type SharedOpQueue = Rc<RefCell<OpQueue>>;

pub fn shared_op_queue() -> SharedOpQueue {
    Rc::new(RefCell::new(OpQueue::default()))
}

/// Takes a struck block out of play and keeps the remaining-blocks count.
pub struct BlockRemover {
    ops: SharedOpQueue,
    remaining_blocks: SharedCounter,
}

impl BlockRemover {
    pub fn new(ops: SharedOpQueue, remaining_blocks: SharedCounter) -> Self {
        Self {
            ops,
            remaining_blocks,
        }
    }
}

impl HitListener for BlockRemover {
    fn hit_event(&mut self, being_hit: &Block, _hitter: &mut Ball) {
        self.ops
            .borrow_mut()
            .push(GameOp::RemoveBlock(being_hit.id()));
        self.remaining_blocks.borrow_mut().decrease(1);
    }
}

/// Takes the hitting ball out of play; attached to the death strip.
pub struct BallRemover {
    ops: SharedOpQueue,
    remaining_balls: SharedCounter,
}

impl BallRemover {
    pub fn new(ops: SharedOpQueue, remaining_balls: SharedCounter) -> Self {
        Self {
            ops,
            remaining_balls,
        }
    }
}

impl HitListener for BallRemover {
    fn hit_event(&mut self, _being_hit: &Block, hitter: &mut Ball) {
        hitter.park_off_arena();
        self.ops.borrow_mut().push(GameOp::RemoveBall(hitter.id()));
        self.remaining_balls.borrow_mut().decrease(1);
    }
}

/// Scores one point per block hit.
pub struct ScoreTrackingListener {
    current_score: SharedCounter,
}

impl ScoreTrackingListener {
    pub fn new(current_score: SharedCounter) -> Self {
        Self { current_score }
    }
}

impl HitListener for ScoreTrackingListener {
    fn hit_event(&mut self, _being_hit: &Block, _hitter: &mut Ball) {
        self.current_score.borrow_mut().increase(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra_2d::{Point, Rect, Velocity};
    use crate::environment::Collidable;
    use crate::mechanics::Color;

    fn white_ball(id: u32) -> Ball {
        Ball::new(ObjectId(id), Point::new(0.0, 0.0), 5.0, Color::rgb(238, 238, 238))
    }

    #[test]
    fn counter_tracks_value() {
        let mut counter = Counter::default();
        counter.increase(3);
        counter.decrease(1);
        assert_eq!(counter.value(), 2);
    }

    #[test]
    fn block_remover_queues_removal_and_counts_down() {
        let ops = shared_op_queue();
        let remaining = shared_counter();
        remaining.borrow_mut().increase(5);

        let mut block = Block::new(
            ObjectId(11),
            Rect::new(Point::new(0.0, 0.0), 10.0, 10.0),
            Color::rgb(0, 200, 83),
        );
        block.add_hit_listener(Rc::new(RefCell::new(BlockRemover::new(
            Rc::clone(&ops),
            Rc::clone(&remaining),
        ))));

        let mut ball = white_ball(1);
        block.hit(&mut ball, Point::new(5.0, 0.0), Velocity::new(0.0, 3.0));

        assert_eq!(remaining.borrow().value(), 4);
        assert_eq!(ops.borrow_mut().drain(), vec![GameOp::RemoveBlock(ObjectId(11))]);
    }

    #[test]
    fn matching_ball_color_suppresses_notification() {
        let green = Color::rgb(0, 200, 83);
        let ops = shared_op_queue();
        let remaining = shared_counter();

        let mut block = Block::new(
            ObjectId(11),
            Rect::new(Point::new(0.0, 0.0), 10.0, 10.0),
            green,
        );
        block.add_hit_listener(Rc::new(RefCell::new(BlockRemover::new(
            Rc::clone(&ops),
            Rc::clone(&remaining),
        ))));

        let mut ball = white_ball(1);
        ball.set_color(green);
        block.hit(&mut ball, Point::new(5.0, 0.0), Velocity::new(0.0, 3.0));

        assert_eq!(remaining.borrow().value(), 0);
        assert!(ops.borrow_mut().drain().is_empty());
    }

    #[test]
    fn ball_remover_parks_ball_and_counts_down() {
        let ops = shared_op_queue();
        let remaining = shared_counter();
        remaining.borrow_mut().increase(3);

        let mut death_strip = Block::new(
            ObjectId(3),
            Rect::new(Point::new(30.0, 569.0), 740.0, 1.0),
            Color::BACKGROUND,
        );
        death_strip.add_hit_listener(Rc::new(RefCell::new(BallRemover::new(
            Rc::clone(&ops),
            Rc::clone(&remaining),
        ))));

        let mut ball = white_ball(42);
        ball.set_velocity(Velocity::new(0.0, 7.0));
        death_strip.hit(&mut ball, Point::new(100.0, 569.0), Velocity::new(0.0, 7.0));

        assert_eq!(ball.center(), Point::new(-100.0, -100.0));
        assert_eq!(ball.velocity(), Velocity::new(0.0, 0.0));
        assert_eq!(remaining.borrow().value(), 2);
        assert_eq!(ops.borrow_mut().drain(), vec![GameOp::RemoveBall(ObjectId(42))]);
    }

    #[test]
    fn removed_listener_no_longer_fires() {
        let score = shared_counter();
        let mut block = Block::new(
            ObjectId(9),
            Rect::new(Point::new(0.0, 0.0), 10.0, 10.0),
            Color::BACKGROUND,
        );
        let listener: SharedHitListener =
            Rc::new(RefCell::new(ScoreTrackingListener::new(Rc::clone(&score))));
        block.add_hit_listener(Rc::clone(&listener));

        let mut ball = white_ball(1);
        block.hit(&mut ball, Point::new(5.0, 0.0), Velocity::new(0.0, 3.0));
        assert_eq!(score.borrow().value(), 1);

        block.remove_hit_listener(&listener);
        block.hit(&mut ball, Point::new(5.0, 0.0), Velocity::new(0.0, 3.0));
        assert_eq!(score.borrow().value(), 1);
    }

    #[test]
    fn all_listeners_fire_even_when_one_mutates_the_ball() {
        let ops = shared_op_queue();
        let balls = shared_counter();
        let score = shared_counter();
        balls.borrow_mut().increase(1);

        let mut block = Block::new(
            ObjectId(5),
            Rect::new(Point::new(0.0, 0.0), 10.0, 10.0),
            Color::BACKGROUND,
        );
        block.add_hit_listener(Rc::new(RefCell::new(BallRemover::new(
            Rc::clone(&ops),
            Rc::clone(&balls),
        ))));
        block.add_hit_listener(Rc::new(RefCell::new(ScoreTrackingListener::new(
            Rc::clone(&score),
        ))));

        let mut ball = white_ball(1);
        block.hit(&mut ball, Point::new(5.0, 0.0), Velocity::new(0.0, 3.0));

        // the second listener still ran after the first parked the ball
        assert_eq!(balls.borrow().value(), 0);
        assert_eq!(score.borrow().value(), 1);
    }
}
