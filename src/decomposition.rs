use crate::collection::collect_points;
use crate::geometry::{intersect, IntersectMode, Point, Segment};
use std::collections::HashSet;

/// Pieces shorter than this are rounding slivers where walls meet. Their
/// midpoint sits on the joint itself, and sight lines to it slip past the
/// neighbouring wall, so they never count as visible.
pub const MIN_VISIBLE_LENGTH: f64 = 1e-9;

/// A piece of a wall after splitting at every interesting point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubSegment {
    /// The wall this piece was cut from
    pub wall: Segment,
    pub segment: Segment,
    /// Whether the midpoint of `segment` can be seen from the observer (slivers never are)
    pub visible: bool,
}

/// Split every wall into consecutive pieces between its sorted interesting points.
///
/// Output is grouped by wall in input order (duplicates emitted once) and,
/// within a wall, ordered by `Point` order.
fn split_walls(observer: Point, walls: &[Segment]) -> Vec<(Segment, Segment)> {
    let collection = collect_points(observer, walls);
    let mut seen = HashSet::new();
    let mut pieces = Vec::new();

    for wall in walls {
        if !seen.insert(*wall) {
            continue;
        }
        let Some(points) = collection.get(wall) else {
            continue;
        };
        let sorted: Vec<Point> = points.iter().copied().collect();
        for pair in sorted.windows(2) {
            pieces.push((*wall, Segment::new(pair[0], pair[1])));
        }
    }

    pieces
}

/// Split all walls and tag every piece with its visibility from `observer`
pub fn decompose(observer: Point, walls: &[Segment]) -> Vec<SubSegment> {
    split_walls(observer, walls)
        .into_iter()
        .map(|(wall, segment)| SubSegment {
            wall,
            segment,
            visible: piece_is_visible(observer, segment, wall, walls),
        })
        .collect()
}

/// Sub-segments of all walls, optionally only those visible from `observer`.
///
/// A zero-length wall has a single distinct point and contributes nothing.
pub fn segments(observer: Point, walls: &[Segment], visible_only: bool) -> Vec<Segment> {
    split_walls(observer, walls)
        .into_iter()
        .filter(|(wall, segment)| {
            !visible_only || piece_is_visible(observer, *segment, *wall, walls)
        })
        .map(|(_, segment)| segment)
        .collect()
}

/// Walls with at least one visible sub-segment, in input order without duplicates
pub fn visible_walls(observer: Point, walls: &[Segment]) -> Vec<Segment> {
    let mut found = HashSet::new();
    for piece in decompose(observer, walls) {
        if piece.visible {
            found.insert(piece.wall);
        }
    }

    let mut seen = HashSet::new();
    walls
        .iter()
        .filter(|wall| found.contains(*wall) && seen.insert(**wall))
        .copied()
        .collect()
}

fn piece_is_visible(observer: Point, piece: Segment, wall: Segment, walls: &[Segment]) -> bool {
    piece.length() >= MIN_VISIBLE_LENGTH && is_visible(observer, piece.midpoint(), wall, walls)
}

/// True if the segment from `observer` to `target` crosses no wall except `owner`.
///
/// `target` is expected to lie on `owner`, which is why `owner` (and any copy of it)
/// is ignored. Grazing another wall's endpoint counts as blocked.
pub fn is_visible(observer: Point, target: Point, owner: Segment, walls: &[Segment]) -> bool {
    let sight = Segment::new(observer, target);
    walls
        .iter()
        .filter(|wall| **wall != owner)
        .all(|wall| intersect(*wall, sight, IntersectMode::Segment).is_none())
}

/// Unobstructed line of sight between two arbitrary points
pub fn line_of_sight(a: Point, b: Point, walls: &[Segment]) -> bool {
    let sight = Segment::new(a, b);
    walls
        .iter()
        .all(|wall| intersect(*wall, sight, IntersectMode::Segment).is_none())
}
