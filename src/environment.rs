use std::cell::RefCell;
use std::rc::Rc;

use crate::algebra_2d::{Line, Point, Rect, Velocity};
use crate::mechanics::Ball;

/// Stable identity of a registered object, assigned at game assembly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct ObjectId(pub u32);

/// Something a moving ball can strike: a bounding rectangle plus a hit
/// response. Obstacles own their geometry; the environment only reads it.
pub trait Collidable {
    fn id(&self) -> ObjectId;

    /// Read-only snapshot of the current bounds.
    fn collision_rect(&self) -> Rect;

    /// The four corners, in the same order as [`Rect::corner_points`].
    fn collision_points(&self) -> [Point; 4] {
        self.collision_rect().corner_points()
    }

    /// Notifies the object it was struck at `collision_point` and returns the
    /// velocity the ball leaves with.
    fn hit(&mut self, hitter: &mut Ball, collision_point: Point, current_velocity: Velocity)
        -> Velocity;
}

pub type SharedCollidable = Rc<RefCell<dyn Collidable>>;

/// Result of a closest-collision query.
#[derive(Clone)]
pub struct Collision {
    pub point: Point,
    pub object: SharedCollidable,
    pub distance: f64,
}

/// Registry of everything a ball can collide with.
///
/// Registration order carries no meaning beyond tie-breaking: on an exact
/// distance tie the first registered object wins.
#[derive(Default)]
pub struct GameEnvironment {
    collidables: Vec<SharedCollidable>,
}

impl GameEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_collidable(&mut self, collidable: SharedCollidable) {
        self.collidables.push(collidable);
    }

    pub fn remove_collidable(&mut self, id: ObjectId) {
        self.collidables.retain(|c| c.borrow().id() != id);
    }

    pub fn collidables(&self) -> &[SharedCollidable] {
        &self.collidables
    }

    /// Assumes an object moving from `trajectory.start()` to
    /// `trajectory.end()` and returns the closest collision on the way, or
    /// `None` when the path is unobstructed.
    ///
    /// Every registered rectangle is tested exhaustively; obstacle counts are
    /// small and the query runs once per ball per step.
    pub fn closest_collision(&self, trajectory: &Line) -> Option<Collision> {
        let mut closest: Option<Collision> = None;
        for collidable in &self.collidables {
            let rect = collidable.borrow().collision_rect();
            let points = rect.intersection_points(trajectory, true);
            if let Some(point) = trajectory.start().closest_point(&points) {
                let distance = trajectory.start().distance(point);
                // strict `<` keeps the first registered object on exact ties
                if closest.as_ref().map_or(true, |c| distance < c.distance) {
                    closest = Some(Collision {
                        point,
                        object: Rc::clone(collidable),
                        distance,
                    });
                }
            }
        }
        closest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algebra_2d::{Line, Point, Rect, Velocity};

    struct Obstacle {
        id: ObjectId,
        rect: Rect,
    }

    impl Collidable for Obstacle {
        fn id(&self) -> ObjectId {
            self.id
        }

        fn collision_rect(&self) -> Rect {
            self.rect
        }

        fn hit(&mut self, _hitter: &mut Ball, _collision_point: Point, current_velocity: Velocity) -> Velocity {
            current_velocity
        }
    }

    fn obstacle(id: u32, upper_left: (f64, f64), width: f64, height: f64) -> SharedCollidable {
        Rc::new(RefCell::new(Obstacle {
            id: ObjectId(id),
            rect: Rect::new(Point::new(upper_left.0, upper_left.1), width, height),
        }))
    }

    #[test]
    fn no_registered_obstacle_intersects() {
        let mut env = GameEnvironment::new();
        env.add_collidable(obstacle(1, (0.0, 0.0), 5.0, 5.0));
        env.add_collidable(obstacle(2, (10.0, 0.0), 5.0, 5.0));
        let trajectory = Line::from_coordinates(0.0, 20.0, 20.0, 20.0);
        assert!(env.closest_collision(&trajectory).is_none());
    }

    #[test]
    fn nearest_of_two_obstacles_wins() {
        // x in [0,5] and x in [10,15], same y range
        let mut env = GameEnvironment::new();
        env.add_collidable(obstacle(1, (0.0, 0.0), 5.0, 5.0));
        env.add_collidable(obstacle(2, (10.0, 0.0), 5.0, 5.0));

        let trajectory = Line::from_coordinates(-2.0, 2.0, 20.0, 2.0);
        let collision = env.closest_collision(&trajectory).unwrap();
        assert_eq!(collision.point, Point::new(0.0, 2.0));
        assert_eq!(collision.distance, 2.0);
        assert_eq!(collision.object.borrow().id(), ObjectId(1));
    }

    #[test]
    fn registration_order_decides_exact_ties() {
        let mut env = GameEnvironment::new();
        // two coincident obstacles; both intersect at (0,2)
        env.add_collidable(obstacle(7, (0.0, 0.0), 5.0, 5.0));
        env.add_collidable(obstacle(8, (0.0, 0.0), 5.0, 5.0));

        let trajectory = Line::from_coordinates(-2.0, 2.0, 20.0, 2.0);
        let collision = env.closest_collision(&trajectory).unwrap();
        assert_eq!(collision.object.borrow().id(), ObjectId(7));
    }

    #[test]
    fn per_object_reduction_picks_near_boundary_point() {
        let mut env = GameEnvironment::new();
        env.add_collidable(obstacle(1, (0.0, 0.0), 10.0, 10.0));
        // traversing trajectory crosses both vertical edges; the entry edge
        // is the collision point
        let trajectory = Line::from_coordinates(-5.0, 5.0, 15.0, 5.0);
        let collision = env.closest_collision(&trajectory).unwrap();
        assert_eq!(collision.point, Point::new(0.0, 5.0));
        assert_eq!(collision.distance, 5.0);
    }

    #[test]
    fn removal_unregisters_by_id() {
        let mut env = GameEnvironment::new();
        env.add_collidable(obstacle(1, (0.0, 0.0), 5.0, 5.0));
        env.add_collidable(obstacle(2, (10.0, 0.0), 5.0, 5.0));
        env.remove_collidable(ObjectId(1));
        assert_eq!(env.collidables().len(), 1);

        let trajectory = Line::from_coordinates(-2.0, 2.0, 20.0, 2.0);
        let collision = env.closest_collision(&trajectory).unwrap();
        assert_eq!(collision.object.borrow().id(), ObjectId(2));
        assert_eq!(collision.point, Point::new(10.0, 2.0));
    }
}
