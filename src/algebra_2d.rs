use std::ops::Mul;

use itertools::Itertools;
use rand::Rng;

/// A coordinate in the 2D model space. TOP / LEFT corner is 0/0.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: Point) -> f64 {
        let delta_x = self.x - other.x;
        let delta_y = self.y - other.y;
        (delta_x * delta_x + delta_y * delta_y).sqrt()
    }

    /// Element of `points` with minimal distance to `self`.
    /// The first of several equidistant candidates wins.
    pub fn closest_point(&self, points: &[Point]) -> Option<Point> {
        points
            .iter()
            .map(|p| p.distance(*self))
            .position_min_by(|a, b| a.total_cmp(b))
            .map(|idx| points[idx])
    }
}

impl From<(f64, f64)> for Point {
    fn from(value: (f64, f64)) -> Self {
        Self {
            x: value.0,
            y: value.1,
        }
    }
}

/// Displacement per time step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Velocity {
    pub dx: f64,
    pub dy: f64,
}

impl Velocity {
    pub fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }

    /// dx/dy from a direction given in degrees and a speed (vector length).
    pub fn from_angle_and_speed(angle_degrees: f64, speed: f64) -> Self {
        let rad = angle_degrees.to_radians();
        Self {
            dx: rad.cos() * speed,
            dy: rad.sin() * speed,
        }
    }

    pub fn speed(&self) -> f64 {
        (self.dx * self.dx + self.dy * self.dy).sqrt()
    }

    pub fn apply_to_point(&self, p: Point) -> Point {
        Point::new(p.x + self.dx, p.y + self.dy)
    }
}

impl Mul<f64> for Velocity {
    type Output = Velocity;

    fn mul(self, rhs: f64) -> Self::Output {
        Velocity {
            dx: self.dx * rhs,
            dy: self.dy * rhs,
        }
    }
}

/// A finite segment between two points.
///
/// The parameters of the carrier line are derived at construction: a vertical
/// segment stores its fixed x in `b`, any other stores slope `a` and
/// intercept `b` of `y = a*x + b`. All parallelism / collinearity decisions
/// below compare these parameters with exact float equality. Callers must
/// pre-round their coordinates if they need tolerant behavior.
#[derive(Clone, Copy, Debug)]
pub struct Line {
    start: Point,
    end: Point,
    vertical: bool,
    a: f64,
    b: f64,
}

impl Line {
    pub fn new(start: Point, end: Point) -> Self {
        if start.x == end.x {
            // infinite slope; the carrier line is x = b
            Self {
                start,
                end,
                vertical: true,
                a: 0.0,
                b: start.x,
            }
        } else {
            let a = (start.y - end.y) / (start.x - end.x);
            let b = start.y - a * start.x;
            Self {
                start,
                end,
                vertical: false,
                a,
                b,
            }
        }
    }

    pub fn from_coordinates(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self::new(Point::new(x1, y1), Point::new(x2, y2))
    }

    pub fn start(&self) -> Point {
        self.start
    }

    pub fn end(&self) -> Point {
        self.end
    }

    pub fn length(&self) -> f64 {
        self.start.distance(self.end)
    }

    /// Single intersection point of two segments, `None` when there is none
    /// or when it is not unique (collinear segments sharing more than one
    /// point).
    ///
    /// With `inside_segments` a candidate is only accepted when it lies
    /// within the closed bounding boxes of both segments; without it the
    /// carrier lines are intersected unconditionally.
    pub fn intersection_with(&self, other: &Line, inside_segments: bool) -> Option<Point> {
        if self.vertical {
            if other.vertical {
                if self.b == other.b {
                    // same carrier line; an overlap has no unique result
                    if self.overlaps_collinear(other) {
                        None
                    } else {
                        self.common_endpoint(other)
                    }
                } else {
                    None
                }
            } else {
                let x = self.b;
                let y = other.a * x + other.b;
                let candidate = Point::new(x, y);
                if !inside_segments
                    || (in_between(self.start, candidate, self.end, true)
                        && in_between(other.start, candidate, other.end, true))
                {
                    Some(candidate)
                } else {
                    None
                }
            }
        } else if other.vertical {
            // let the vertical line do the substitution
            other.intersection_with(self, inside_segments)
        } else if self.a == other.a && self.b == other.b {
            if self.overlaps_collinear(other) {
                None
            } else {
                self.common_endpoint(other)
            }
        } else if self.a == other.a {
            // parallel, distinct intercepts
            None
        } else {
            let x = (other.b - self.b) / (self.a - other.a);
            let y = self.a * x + self.b;
            let candidate = Point::new(x, y);
            if !inside_segments
                || (in_between(self.start, candidate, self.end, true)
                    && in_between(other.start, candidate, other.end, true))
            {
                Some(candidate)
            } else {
                None
            }
        }
    }

    /// True when two segments on the same carrier line share more than a
    /// single point: an endpoint of one lies strictly inside the other's
    /// span, or one span contains the other entirely.
    fn overlaps_collinear(&self, other: &Line) -> bool {
        let strictly_inside = in_between(self.start, other.start, self.end, false)
            || in_between(self.start, other.end, self.end, false);
        let nested = (in_between(self.start, other.start, self.end, true)
            && in_between(self.start, other.end, self.end, true))
            || (in_between(other.start, self.start, other.end, true)
                && in_between(other.start, self.end, other.end, true));
        strictly_inside || nested
    }

    /// The single endpoint two touching collinear segments share, if any.
    fn common_endpoint(&self, other: &Line) -> Option<Point> {
        if self.start == other.start || self.start == other.end {
            Some(self.start)
        } else if self.end == other.start || self.end == other.end {
            Some(self.end)
        } else {
            None
        }
    }

    /// Intersections of this line's carrier with the rectangle's edges,
    /// reduced to the one nearest to `self.start`.
    pub fn closest_intersection_to_start_of_line(&self, rect: &Rect) -> Option<Point> {
        let points = rect.intersection_points(self, false);
        self.start.closest_point(&points)
    }
}

/// Bounding-box containment of `b` within the box spanned by `a` and `c`,
/// per axis, inclusive or strict.
fn in_between(a: Point, b: Point, c: Point, inclusive: bool) -> bool {
    let (min_x, max_x) = (a.x.min(c.x), a.x.max(c.x));
    let (min_y, max_y) = (a.y.min(c.y), a.y.max(c.y));
    if inclusive {
        b.x >= min_x && b.x <= max_x && b.y >= min_y && b.y <= max_y
    } else {
        b.x > min_x && b.x < max_x && b.y > min_y && b.y < max_y
    }
}

/// Axis-aligned rectangle, stored as its four corner points.
///
/// The diagonal used at construction may run in any direction; the corners
/// always form an axis-aligned box and the min/max accessors are independent
/// of that direction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    upper_left: Point,
    upper_right: Point,
    bottom_right: Point,
    bottom_left: Point,
    width: f64,
    height: f64,
}

impl Rect {
    pub fn from_diagonal(upper_left: Point, bottom_right: Point) -> Self {
        Self {
            upper_left,
            upper_right: Point::new(bottom_right.x, upper_left.y),
            bottom_right,
            bottom_left: Point::new(upper_left.x, bottom_right.y),
            width: (upper_left.x - bottom_right.x).abs(),
            height: (upper_left.y - bottom_right.y).abs(),
        }
    }

    pub fn new(upper_left: Point, width: f64, height: f64) -> Self {
        Self::from_diagonal(
            upper_left,
            Point::new(upper_left.x + width, upper_left.y + height),
        )
    }

    /// Moves the box so that `upper_left` becomes its new anchor; the size
    /// is kept.
    pub fn change_position(&mut self, upper_left: Point) {
        *self = Self::from_diagonal(
            upper_left,
            Point::new(upper_left.x + self.width, upper_left.y + self.height),
        );
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn upper_left(&self) -> Point {
        self.upper_left
    }

    pub fn start_x(&self) -> f64 {
        self.upper_left.x.min(self.bottom_right.x)
    }

    pub fn end_x(&self) -> f64 {
        self.upper_left.x.max(self.bottom_right.x)
    }

    pub fn start_y(&self) -> f64 {
        self.upper_left.y.min(self.bottom_right.y)
    }

    pub fn end_y(&self) -> f64 {
        self.upper_left.y.max(self.bottom_right.y)
    }

    /// The four corners in drawing order.
    pub fn corner_points(&self) -> [Point; 4] {
        [
            self.upper_left,
            self.upper_right,
            self.bottom_right,
            self.bottom_left,
        ]
    }

    /// The four boundary segments (top, right, bottom, left), freshly built
    /// from the current corners.
    pub fn lines(&self) -> [Line; 4] {
        [
            Line::new(self.upper_left, self.upper_right),
            Line::new(self.bottom_right, self.upper_right),
            Line::new(self.bottom_left, self.bottom_right),
            Line::new(self.bottom_left, self.upper_left),
        ]
    }

    /// Every intersection of `line` with the four boundary segments, 0 to 4
    /// points. A query through a corner yields the same point twice; no
    /// dedup happens here.
    pub fn intersection_points(&self, line: &Line, inside_segments: bool) -> Vec<Point> {
        self.lines()
            .iter()
            .filter_map(|edge| edge.intersection_with(line, inside_segments))
            .collect()
    }

    fn inside_x(&self, point: Point, margin: f64) -> bool {
        self.start_x() + margin < point.x && point.x < self.end_x() - margin
    }

    fn inside_y(&self, point: Point, margin: f64) -> bool {
        self.start_y() + margin < point.y && point.y < self.end_y() - margin
    }

    /// Strict containment per axis; `margin` shrinks the interior.
    pub fn inside(&self, point: Point, margin: f64) -> bool {
        self.inside_x(point, margin) && self.inside_y(point, margin)
    }

    /// Uniform random point inside the box, shifted towards the origin by
    /// `margin` on both axes. A zero-area box yields its corner.
    pub fn random_point(&self, margin: f64) -> Point {
        let mut rng = rand::thread_rng();
        Point::new(
            rng.gen::<f64>() * self.width + self.start_x() - margin,
            rng.gen::<f64>() * self.height + self.start_y() - margin,
        )
    }
}
