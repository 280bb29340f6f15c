use rand::Rng;

use crate::algebra_2d::{Line, Point, Rect, Velocity};
use crate::environment::{Collidable, GameEnvironment, ObjectId};
use crate::listeners::SharedHitListener;

/// Positional offset applied after a collision response, along the post-hit
/// velocity. Without it the next step's trajectory would start exactly on the
/// struck boundary and re-detect the same collision at distance ~0.
pub const NUDGE_EPSILON: f64 = 1e-4;

/// Max distance between a collision point coordinate and an edge coordinate
/// to count the edge as the struck one.
const EDGE_MATCH_EPSILON: f64 = 1e-3;

const MIN_BALL_RADIUS: f64 = 5.0;
const MAX_SPEED_RADIUS: f64 = 60.0;
const SPEED_RAMP: f64 = 0.1;
const MIN_SPEED: f64 = 10.0;
const ANGLE_RANGE: f64 = 360.0;

/// Distance the paddle travels per control impulse.
const PADDLE_MOVE: f64 = 7.0;
const PADDLE_HIT_ZONES: usize = 5;
const PADDLE_HIT_START_DEGREE: f64 = 30.01;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GameInput {
    pub control: PaddleControl,
}

impl GameInput {
    pub fn none() -> Self {
        Self {
            control: PaddleControl::None,
        }
    }

    pub fn action(control: PaddleControl) -> Self {
        Self { control }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PaddleControl {
    None,
    MoveLeft,
    MoveRight,
}

/// Plain RGB value; obstacles and balls carry one so blocks can gate their
/// hit notification on a color match.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Arena background; blocks painted in it (walls, the death strip) always
    /// notify their listeners.
    pub const BACKGROUND: Color = Color::rgb(33, 33, 33);
}

/// The moving body. Each step builds a trajectory segment from center and
/// velocity, asks the environment for the first obstacle on it and either
/// moves freely or snaps to the hit point and takes the obstacle's response
/// velocity.
#[derive(Clone, Debug)]
pub struct Ball {
    id: ObjectId,
    center: Point,
    radius: f64,
    color: Color,
    velocity: Velocity,
}

impl Ball {
    pub fn new(id: ObjectId, center: Point, radius: f64, color: Color) -> Self {
        Self {
            id,
            center,
            radius: radius.abs().max(MIN_BALL_RADIUS),
            color,
            velocity: Velocity::new(0.0, 0.0),
        }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn center(&self) -> Point {
        self.center
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    pub fn velocity(&self) -> Velocity {
        self.velocity
    }

    pub fn set_velocity(&mut self, velocity: Velocity) {
        self.velocity = velocity;
    }

    /// Random direction at a speed derived from the radius (small balls fly
    /// faster, within fixed limits).
    pub fn set_random_speed(&mut self) {
        let speed = MIN_SPEED + (MAX_SPEED_RADIUS - self.radius) * SPEED_RAMP;
        let angle = rand::thread_rng().gen_range(0.0..ANGLE_RANGE);
        self.velocity = Velocity::from_angle_and_speed(angle, speed);
    }

    /// Relocates the ball off-arena and stops it; used when a death strip
    /// takes it out of play.
    pub fn park_off_arena(&mut self) {
        self.center = Point::new(-100.0, -100.0);
        self.velocity = Velocity::new(0.0, 0.0);
    }

    /// One simulation step against the registered obstacles.
    pub fn move_one_step(&mut self, environment: &GameEnvironment) {
        let next = self.velocity.apply_to_point(self.center);
        let trajectory = Line::new(self.center, next);

        match environment.closest_collision(&trajectory) {
            Some(collision) => {
                log::debug!(
                    "ball {:?} hits {:?} at {:?} (distance {:.4})",
                    self.id,
                    collision.object.borrow().id(),
                    collision.point,
                    collision.distance
                );
                self.center = collision.point;
                let current_velocity = self.velocity;
                let new_velocity =
                    collision
                        .object
                        .borrow_mut()
                        .hit(self, collision.point, current_velocity);
                self.velocity = new_velocity;
                // step just past the boundary along the new direction
                self.center = (self.velocity * NUDGE_EPSILON).apply_to_point(self.center);
            }
            None => self.center = self.velocity.apply_to_point(self.center),
        }
    }
}

/// A rectangular obstacle. Walls, the death strip and the destroyable bricks
/// are all blocks; they differ only in color and attached listeners.
pub struct Block {
    id: ObjectId,
    rect: Rect,
    color: Color,
    hit_listeners: Vec<SharedHitListener>,
}

impl Block {
    pub fn new(id: ObjectId, rect: Rect, color: Color) -> Self {
        Self {
            id,
            rect,
            color,
            hit_listeners: Vec::new(),
        }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn add_hit_listener(&mut self, listener: SharedHitListener) {
        self.hit_listeners.push(listener);
    }

    pub fn remove_hit_listener(&mut self, listener: &SharedHitListener) {
        self.hit_listeners
            .retain(|l| !std::rc::Rc::ptr_eq(l, listener));
    }

    /// True when the ball already carries this block's color. On a mismatch
    /// the ball is repainted. Background-colored blocks never match.
    fn ball_color_match(&self, ball: &mut Ball) -> bool {
        if self.color == Color::BACKGROUND {
            return false;
        }
        if ball.color() == self.color {
            true
        } else {
            ball.set_color(self.color);
            false
        }
    }

    fn notify_hit(&self, hitter: &mut Ball) {
        // snapshot before dispatch; a listener mutating the registration
        // must not skip or corrupt in-flight notifications
        let listeners = self.hit_listeners.clone();
        for listener in listeners {
            listener.borrow_mut().hit_event(self, hitter);
        }
    }
}

fn on_edge_coordinate(edge: f64, location: f64) -> bool {
    (edge - location).abs() < EDGE_MATCH_EPSILON
}

impl Collidable for Block {
    fn id(&self) -> ObjectId {
        self.id
    }

    fn collision_rect(&self) -> Rect {
        self.rect
    }

    /// Reflects the ball: striking a vertical edge negates dx, a horizontal
    /// edge negates dy, a corner both.
    fn hit(&mut self, hitter: &mut Ball, collision_point: Point, current_velocity: Velocity) -> Velocity {
        let mut new_dx = current_velocity.dx;
        let mut new_dy = current_velocity.dy;

        for corner in self.collision_points() {
            if on_edge_coordinate(corner.x, collision_point.x) {
                new_dx = -current_velocity.dx;
            }
            if on_edge_coordinate(corner.y, collision_point.y) {
                new_dy = -current_velocity.dy;
            }
        }

        if !self.ball_color_match(hitter) {
            self.notify_hit(hitter);
        }

        Velocity::new(new_dx, new_dy)
    }
}

/// The player-controlled bat. Moves horizontally inside the arena frame and
/// wraps to the opposite edge when pushed past a side.
pub struct Paddle {
    id: ObjectId,
    rect: Rect,
    frame: Rect,
}

impl Paddle {
    pub fn new(id: ObjectId, upper_left: Point, width: f64, height: f64, frame: Rect) -> Self {
        Self {
            id,
            rect: Rect::new(upper_left, width, height),
            frame,
        }
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn move_left(&mut self) {
        let current = self.rect.upper_left();
        if self.frame.start_x() < current.x {
            self.rect
                .change_position(Point::new(current.x - PADDLE_MOVE, current.y));
        } else {
            self.rect
                .change_position(Point::new(self.frame.end_x() - self.rect.width(), current.y));
        }
    }

    pub fn move_right(&mut self) {
        let current = self.rect.upper_left();
        if self.frame.end_x() - self.rect.width() > current.x {
            self.rect
                .change_position(Point::new(current.x + PADDLE_MOVE, current.y));
        } else {
            self.rect
                .change_position(Point::new(self.frame.start_x(), current.y));
        }
    }
}

impl Collidable for Paddle {
    fn id(&self) -> ObjectId {
        self.id
    }

    fn collision_rect(&self) -> Rect {
        self.rect
    }

    /// Zone-based bounce: the paddle width is split into equal zones mapping
    /// the exit angle from steep-left over straight-up to steep-right, at
    /// unchanged speed. Hits on the underside mirror the angle downwards.
    fn hit(&mut self, _hitter: &mut Ball, collision_point: Point, current_velocity: Velocity) -> Velocity {
        let pos_x = collision_point.x - self.rect.start_x() - 1.0;
        let pos_y = collision_point.y - self.rect.end_y() + 1.0;

        let zone_width = self.rect.width() / PADDLE_HIT_ZONES as f64;
        let degree_range = 180.0 - PADDLE_HIT_START_DEGREE * 2.0;
        let speed = current_velocity.speed();

        for zone in 0..PADDLE_HIT_ZONES {
            if zone as f64 * zone_width <= pos_x && pos_x <= (zone + 1) as f64 * zone_width {
                let degree = PADDLE_HIT_START_DEGREE
                    + degree_range / (PADDLE_HIT_ZONES - 1) as f64 * zone as f64;
                let angle = if pos_y < 0.0 {
                    degree - 180.0
                } else {
                    180.0 - degree
                };
                return Velocity::from_angle_and_speed(angle, speed);
            }
        }
        current_velocity
    }
}
