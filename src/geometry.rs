use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Add, Div, Mul, Sub};

/// A position in arena space.
///
/// Equality, hashing and ordering are all derived from `f64::total_cmp` so a
/// `Point` can be used as a set/map key. The order is lexicographic (x, then y),
/// which is what gives sub-segments their reproducible order along a wall.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    /// Euclidean distance
    pub fn dist(&self, other: Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn midpoint(&self, other: Point) -> Point {
        (*self + other) / 2.0
    }

    /// Length of the point treated as a vector from the origin
    pub fn norm(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Clamp into `[padding, size - padding]` on both axes
    pub fn normalize(&self, size: Point, padding: f64) -> Point {
        Point::new(
            self.x.max(padding).min(size.x - padding),
            self.y.max(padding).min(size.y - padding),
        )
    }

    // -0.0 and 0.0 must compare and hash the same
    fn key(&self) -> (f64, f64) {
        (self.x + 0.0, self.y + 0.0)
    }
}

impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Point {}

impl PartialOrd for Point {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Point {
    fn cmp(&self, other: &Self) -> Ordering {
        let (ax, ay) = self.key();
        let (bx, by) = other.key();
        ax.total_cmp(&bx).then_with(|| ay.total_cmp(&by))
    }
}

impl Hash for Point {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let (x, y) = self.key();
        x.to_bits().hash(state);
        y.to_bits().hash(state);
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, other: Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, other: Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;

    fn mul(self, scalar: f64) -> Point {
        Point::new(self.x * scalar, self.y * scalar)
    }
}

impl Div<f64> for Point {
    type Output = Point;

    fn div(self, scalar: f64) -> Point {
        Point::new(self.x / scalar, self.y / scalar)
    }
}

/// A line segment from `p1` to `p2`.
///
/// Used both for walls and for transient probes cast from an observer.
/// Equality is direction dependent: `(a, b)` and `(b, a)` are different keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Segment {
    pub p1: Point,
    pub p2: Point,
}

impl Segment {
    pub fn new(p1: Point, p2: Point) -> Self {
        Segment { p1, p2 }
    }

    /// Shorthand for building walls from raw coordinates
    pub fn from_coords(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Segment::new(Point::new(x1, y1), Point::new(x2, y2))
    }

    pub fn length(&self) -> f64 {
        self.p1.dist(self.p2)
    }

    pub fn midpoint(&self) -> Point {
        self.p1.midpoint(self.p2)
    }

    /// Direction vector `p2 - p1` (not normalized)
    pub fn direction(&self) -> Point {
        self.p2 - self.p1
    }

    pub fn reversed(&self) -> Segment {
        Segment::new(self.p2, self.p1)
    }

    /// Zero-length segments have no direction and never intersect anything
    pub fn is_degenerate(&self) -> bool {
        self.p1 == self.p2
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} -> {}]", self.p1, self.p2)
    }
}

/// How the second argument of [`intersect`] is bounded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntersectMode {
    /// Half-line starting at `probe.p1` and passing through `probe.p2`
    Ray,
    /// Bounded segment between `probe.p1` and `probe.p2`
    Segment,
}

/// Intersect a bounded `wall` with a `probe`.
///
/// Standard parametric form: `t` runs along the wall and must lie in `[0, 1]`,
/// `u` runs along the probe and must lie in `[0, 1]` for [`IntersectMode::Segment`]
/// or be `>= 0` for [`IntersectMode::Ray`]. The argument order matters: the
/// first segment is always bounded.
///
/// Parallel lines (including any zero-length input) give `None`. The test on
/// the denominator is exact, there is no epsilon.
pub fn intersect(wall: Segment, probe: Segment, mode: IntersectMode) -> Option<Point> {
    let Point { x: x1, y: y1 } = wall.p1;
    let Point { x: x2, y: y2 } = wall.p2;
    let Point { x: x3, y: y3 } = probe.p1;
    let Point { x: x4, y: y4 } = probe.p2;

    let denom = (x1 - x2) * (y3 - y4) - (y1 - y2) * (x3 - x4);
    if denom == 0.0 {
        return None;
    }

    let t = ((x1 - x3) * (y3 - y4) - (y1 - y3) * (x3 - x4)) / denom;
    let u = -((x1 - x2) * (y1 - y3) - (y1 - y2) * (x1 - x3)) / denom;

    if !(0.0..=1.0).contains(&t) {
        return None;
    }

    let on_probe = match mode {
        IntersectMode::Ray => u >= 0.0,
        IntersectMode::Segment => (0.0..=1.0).contains(&u),
    };
    if !on_probe {
        return None;
    }

    Some(Point::new(x1 + t * (x2 - x1), y1 + t * (y2 - y1)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_crossing_diagonals() {
        let a = Segment::from_coords(0.0, 0.0, 4.0, 4.0);
        let b = Segment::from_coords(0.0, 4.0, 4.0, 0.0);
        let p = intersect(a, b, IntersectMode::Segment).unwrap();
        assert_eq!(p, Point::new(2.0, 2.0));
    }

    #[test]
    fn test_axis_aligned_is_exact() {
        let wall = Segment::from_coords(0.0, 5.0, 10.0, 5.0);
        let probe = Segment::from_coords(3.0, 0.0, 3.0, 10.0);
        assert_eq!(intersect(wall, probe, IntersectMode::Segment), Some(Point::new(3.0, 5.0)));
    }

    #[test]
    fn test_parallel_lines_never_intersect() {
        let a = Segment::from_coords(0.0, 0.0, 10.0, 0.0);
        let b = Segment::from_coords(0.0, 1.0, 10.0, 1.0);
        assert_eq!(intersect(a, b, IntersectMode::Ray), None);

        // Collinear overlap is parallel too
        let c = Segment::from_coords(5.0, 0.0, 15.0, 0.0);
        assert_eq!(intersect(a, c, IntersectMode::Segment), None);
    }

    #[test]
    fn test_zero_length_inputs() {
        let wall = Segment::from_coords(1.0, 1.0, 1.0, 1.0);
        let probe = Segment::from_coords(0.0, 0.0, 2.0, 2.0);
        assert!(wall.is_degenerate());
        assert_eq!(intersect(wall, probe, IntersectMode::Segment), None);
        assert_eq!(intersect(probe, wall, IntersectMode::Ray), None);
    }

    #[test]
    fn test_ray_extends_past_probe_end() {
        let wall = Segment::from_coords(0.0, 10.0, 10.0, 10.0);
        // Probe stops at y=1 but points at the wall
        let probe = Segment::from_coords(5.0, 0.0, 5.0, 1.0);
        assert_eq!(intersect(wall, probe, IntersectMode::Segment), None);
        assert_eq!(intersect(wall, probe, IntersectMode::Ray), Some(Point::new(5.0, 10.0)));

        // But never behind its origin
        assert_eq!(intersect(wall, probe.reversed(), IntersectMode::Ray), None);
    }

    #[test]
    fn test_first_argument_is_always_bounded() {
        let short = Segment::from_coords(0.0, 0.0, 1.0, 0.0);
        let ray = Segment::from_coords(5.0, -1.0, 5.0, 1.0);
        // x=5 is outside the bounded first segment
        assert_eq!(intersect(short, ray, IntersectMode::Ray), None);
        // Swapped, the short segment acts as a ray along y=0 and reaches x=5
        assert_eq!(intersect(ray, short, IntersectMode::Ray), Some(Point::new(5.0, 0.0)));
    }

    #[test]
    fn test_touching_at_endpoint() {
        let a = Segment::from_coords(0.0, 0.0, 2.0, 0.0);
        let b = Segment::from_coords(2.0, 0.0, 2.0, 3.0);
        assert_eq!(intersect(a, b, IntersectMode::Segment), Some(Point::new(2.0, 0.0)));
    }

    #[test]
    fn test_point_order_is_lexicographic() {
        let set: BTreeSet<Point> = [
            Point::new(2.0, 1.0),
            Point::new(1.0, 3.0),
            Point::new(1.0, -2.0),
            Point::new(-0.5, 9.0),
        ]
        .into_iter()
        .collect();
        let sorted: Vec<Point> = set.into_iter().collect();
        assert_eq!(
            sorted,
            vec![
                Point::new(-0.5, 9.0),
                Point::new(1.0, -2.0),
                Point::new(1.0, 3.0),
                Point::new(2.0, 1.0),
            ]
        );
    }

    #[test]
    fn test_negative_zero_is_zero() {
        assert_eq!(Point::new(-0.0, 0.0), Point::new(0.0, -0.0));
        let set: BTreeSet<Point> = [Point::new(-0.0, 1.0), Point::new(0.0, 1.0)].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_point_arithmetic() {
        let a = Point::new(3.0, 4.0);
        let b = Point::new(1.0, 1.0);
        assert_eq!(a + b, Point::new(4.0, 5.0));
        assert_eq!(a - b, Point::new(2.0, 3.0));
        assert_eq!(a * 2.0, Point::new(6.0, 8.0));
        assert_eq!(a / 2.0, Point::new(1.5, 2.0));
        assert_eq!(a.dist(Point::new(0.0, 0.0)), 5.0);
        assert_eq!(a.midpoint(b), Point::new(2.0, 2.5));
    }

    #[test]
    fn test_normalize_clamps_with_padding() {
        let size = Point::new(640.0, 480.0);
        assert_eq!(Point::new(-10.0, 500.0).normalize(size, 24.0), Point::new(24.0, 456.0));
        assert_eq!(Point::new(100.0, 100.0).normalize(size, 24.0), Point::new(100.0, 100.0));
    }
}
