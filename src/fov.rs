use crate::decomposition::segments;
use crate::geometry::{intersect, IntersectMode, Point, Segment};
use std::f64::consts::TAU;

/// One slice of the visibility fan: the observer plus a visible wall piece
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub apex: Point,
    pub b: Point,
    pub c: Point,
}

impl Triangle {
    pub fn new(apex: Point, b: Point, c: Point) -> Self {
        Triangle { apex, b, c }
    }

    pub fn area(&self) -> f64 {
        let ab = self.b - self.apex;
        let ac = self.c - self.apex;
        (ab.x * ac.y - ab.y * ac.x).abs() / 2.0
    }

    /// Push the two wall-side corners apart along the wall by `epsilon`.
    ///
    /// Rendering only: adjacent slices then overlap a little and filled
    /// triangles don't show hairline seams from float jitter on the shared edge.
    pub fn widened(&self, epsilon: f64) -> Triangle {
        let base = self.c - self.b;
        let len = base.norm();
        if len == 0.0 {
            return *self;
        }
        let step = base / len * epsilon;
        Triangle::new(self.apex, self.b - step, self.c + step)
    }
}

/// Visibility polygon as a triangle fan around `observer`.
///
/// Every visible sub-segment becomes one triangle; sub-segments tile their
/// walls, so neighbouring triangles share edges and leave no gaps.
pub fn visible_region(observer: Point, walls: &[Segment]) -> Vec<Triangle> {
    segments(observer, walls, true)
        .into_iter()
        .map(|piece| Triangle::new(observer, piece.p1, piece.p2))
        .collect()
}

/// A viewing arc `[rot - fov/2, rot + fov/2]`, in radians
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldOfView {
    pub fov: f64,
    pub rot: f64,
}

impl FieldOfView {
    /// Full circle looking along +x
    pub fn full() -> Self {
        FieldOfView { fov: TAU, rot: 0.0 }
    }

    /// The faster the observer moves, the narrower it sees.
    ///
    /// `fov = max(0.1, 2π - speed / 100)` and `rot` is the heading angle in
    /// `[0, 2π)`. Without a heading the observer looks along +x.
    pub fn from_motion(speed: f64, heading: Option<Point>) -> Self {
        let fov = (TAU - speed / 100.0).max(0.1).min(TAU);
        let heading = heading.unwrap_or(Point::new(1.0, 0.0));
        let rot = (TAU + heading.y.atan2(heading.x)) % TAU;
        FieldOfView { fov, rot }
    }
}

impl Default for FieldOfView {
    fn default() -> Self {
        Self::full()
    }
}

/// Approximate visibility boundary by casting evenly spaced rays
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaySweep {
    pub view: FieldOfView,
    /// Angular step between rays (radians)
    pub step: f64,
    /// Hits at or beyond this distance are ignored
    pub max_distance: f64,
}

impl Default for RaySweep {
    fn default() -> Self {
        RaySweep {
            view: FieldOfView::full(),
            step: 0.01,
            max_distance: 2000.0,
        }
    }
}

impl RaySweep {
    pub fn new(view: FieldOfView, step: f64, max_distance: f64) -> Self {
        RaySweep { view, step, max_distance }
    }

    /// Ray angles in sweep order
    pub fn angles(&self) -> Vec<f64> {
        let fov = self.view.fov.clamp(0.0, TAU);
        if !(self.step > 0.0) || !fov.is_finite() {
            return Vec::new();
        }
        let start = self.view.rot - fov / 2.0;
        let count = (fov / self.step).floor() as usize + 1;
        (0..count).map(|i| start + i as f64 * self.step).collect()
    }

    /// Nearest wall hit per ray, in angular order. Rays that hit nothing are skipped.
    pub fn cast(&self, observer: Point, walls: &[Segment]) -> Vec<Point> {
        self.angles()
            .into_iter()
            .filter_map(|angle| {
                let direction = Point::new(angle.cos(), angle.sin());
                nearest_hit(observer, direction, walls, self.max_distance)
            })
            .collect()
    }

    /// Sweep hits joined into fan triangles around the observer
    pub fn triangles(&self, observer: Point, walls: &[Segment]) -> Vec<Triangle> {
        self.cast(observer, walls)
            .windows(2)
            .map(|pair| Triangle::new(observer, pair[0], pair[1]))
            .collect()
    }
}

/// Closest point where a ray from `observer` along `direction` meets a wall
pub fn nearest_hit(observer: Point, direction: Point, walls: &[Segment], max_distance: f64) -> Option<Point> {
    let probe = Segment::new(observer, observer + direction);
    let mut best = None;
    let mut best_dist = max_distance;

    for wall in walls {
        let Some(hit) = intersect(*wall, probe, IntersectMode::Ray) else {
            continue;
        };
        let dist = observer.dist(hit);
        if dist < best_dist {
            best_dist = dist;
            best = Some(hit);
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn square_room() -> Vec<Segment> {
        vec![
            Segment::from_coords(0.0, 0.0, 10.0, 0.0),
            Segment::from_coords(10.0, 0.0, 10.0, 10.0),
            Segment::from_coords(10.0, 10.0, 0.0, 10.0),
            Segment::from_coords(0.0, 10.0, 0.0, 0.0),
        ]
    }

    #[test]
    fn test_fan_covers_empty_room() {
        let walls = square_room();
        let fan = visible_region(Point::new(5.0, 5.0), &walls);
        let area: f64 = fan.iter().map(|t| t.area()).sum();
        assert!((area - 100.0).abs() < 1e-9, "area was {}", area);
    }

    #[test]
    fn test_widened_keeps_apex() {
        let t = Triangle::new(Point::new(0.0, 0.0), Point::new(1.0, 5.0), Point::new(3.0, 5.0));
        let w = t.widened(0.5);
        assert_eq!(w.apex, t.apex);
        assert_eq!(w.b, Point::new(0.5, 5.0));
        assert_eq!(w.c, Point::new(3.5, 5.0));

        let flat = Triangle::new(Point::new(0.0, 0.0), Point::new(1.0, 1.0), Point::new(1.0, 1.0));
        assert_eq!(flat.widened(1.0), flat);
    }

    #[test]
    fn test_full_sweep_ray_count() {
        let sweep = RaySweep::default();
        // floor(2π / 0.01) + 1
        assert_eq!(sweep.angles().len(), 629);
    }

    #[test]
    fn test_bad_step_gives_no_rays() {
        let sweep = RaySweep::new(FieldOfView::full(), 0.0, 100.0);
        assert!(sweep.angles().is_empty());
        let sweep = RaySweep::new(FieldOfView::full(), -1.0, 100.0);
        assert!(sweep.angles().is_empty());
    }

    #[test]
    fn test_sweep_hits_lie_on_walls() {
        let walls = square_room();
        let hits = RaySweep::default().cast(Point::new(3.0, 4.0), &walls);
        assert_eq!(hits.len(), 629);
        for hit in hits {
            let on_wall = hit.x.abs() < 1e-9
                || (hit.x - 10.0).abs() < 1e-9
                || hit.y.abs() < 1e-9
                || (hit.y - 10.0).abs() < 1e-9;
            assert!(on_wall, "{} is not on the room boundary", hit);
        }
    }

    #[test]
    fn test_max_distance_drops_far_hits() {
        let walls = vec![Segment::from_coords(100.0, -50.0, 100.0, 50.0)];
        let origin = Point::new(0.0, 0.0);
        assert_eq!(nearest_hit(origin, Point::new(1.0, 0.0), &walls, 50.0), None);
        assert_eq!(
            nearest_hit(origin, Point::new(1.0, 0.0), &walls, 2000.0),
            Some(Point::new(100.0, 0.0))
        );
    }

    #[test]
    fn test_nearest_wall_wins() {
        let walls = vec![
            Segment::from_coords(10.0, -5.0, 10.0, 5.0),
            Segment::from_coords(4.0, -5.0, 4.0, 5.0),
        ];
        let hit = nearest_hit(Point::new(0.0, 0.0), Point::new(1.0, 0.0), &walls, 2000.0);
        assert_eq!(hit, Some(Point::new(4.0, 0.0)));
    }

    #[test]
    fn test_motion_narrows_view() {
        let still = FieldOfView::from_motion(0.0, None);
        assert_eq!(still.fov, TAU);
        assert_eq!(still.rot, 0.0);

        let fast = FieldOfView::from_motion(1000.0, Some(Point::new(0.0, -1.0)));
        assert!((fast.fov - 0.1).abs() < 1e-12);
        assert!((fast.rot - 1.5 * PI).abs() < 1e-12);

        let medium = FieldOfView::from_motion(314.0, Some(Point::new(-1.0, 0.0)));
        assert!((medium.fov - (TAU - 3.14)).abs() < 1e-12);
        assert!((medium.rot - PI).abs() < 1e-12);
    }

    #[test]
    fn test_narrow_sweep_is_centred_on_heading() {
        let view = FieldOfView { fov: 0.2, rot: PI / 2.0 };
        let angles = RaySweep::new(view, 0.01, 2000.0).angles();
        assert!((angles[0] - (PI / 2.0 - 0.1)).abs() < 1e-12);
        assert!(*angles.last().unwrap() <= PI / 2.0 + 0.1 + 1e-12);
    }
}
