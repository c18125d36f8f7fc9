use crate::geometry::{intersect, IntersectMode, Point, Segment};
use std::collections::{BTreeSet, HashMap};

/// Interesting points per wall, keyed by the wall segment exactly as supplied.
///
/// Points are kept in a `BTreeSet` so iterating a wall's points walks them in
/// `Point` order, which is the order sub-segments are cut in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointCollection {
    points: HashMap<Segment, BTreeSet<Point>>,
}

impl PointCollection {
    /// Points collected for `wall`, if it was part of the input
    pub fn get(&self, wall: &Segment) -> Option<&BTreeSet<Point>> {
        self.points.get(wall)
    }

    pub fn contains_wall(&self, wall: &Segment) -> bool {
        self.points.contains_key(wall)
    }

    /// Number of distinct walls
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn walls(&self) -> impl Iterator<Item = &Segment> {
        self.points.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Segment, &BTreeSet<Point>)> {
        self.points.iter()
    }

    fn insert(&mut self, wall: Segment, point: Point) {
        self.points.entry(wall).or_default().insert(point);
    }
}

/// Collect, for every wall, the points at which it has to be split so that
/// each resulting piece is either fully visible from `observer` or fully hidden.
///
/// Three sources:
/// - the wall's own endpoints (always present)
/// - crossings with every other wall, added to both walls
/// - hits of rays cast from `observer` through the endpoints of every other wall
///
/// Walls equal to each other are skipped against each other, so duplicates
/// neither cross themselves nor cast rays onto themselves.
pub fn collect_points(observer: Point, walls: &[Segment]) -> PointCollection {
    let mut collection = PointCollection::default();

    for wall in walls {
        collection.insert(*wall, wall.p1);
        collection.insert(*wall, wall.p2);
    }

    // Mutual crossings of bounded segments
    for (i, a) in walls.iter().enumerate() {
        for b in &walls[i + 1..] {
            if a == b {
                continue;
            }
            if let Some(point) = intersect(*a, *b, IntersectMode::Segment) {
                collection.insert(*a, point);
                collection.insert(*b, point);
            }
        }
    }

    // Rays from the observer through every other wall's endpoints
    for wall in walls {
        for other in walls {
            if other == wall {
                continue;
            }
            for endpoint in [other.p1, other.p2] {
                let probe = Segment::new(observer, endpoint);
                if let Some(point) = intersect(*wall, probe, IntersectMode::Ray) {
                    collection.insert(*wall, point);
                }
            }
        }
    }

    log::trace!(
        "Collected points for {} walls from observer {}",
        collection.len(),
        observer
    );

    collection
}
