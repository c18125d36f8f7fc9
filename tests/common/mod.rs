#![allow(dead_code)]

use museumghosts::maze::{edge, Maze};
use museumghosts::{Arena, Point, Segment};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;

pub const EPS: f64 = 1e-9;

pub fn near(a: Point, b: Point) -> bool {
    (a.x - b.x).abs() < EPS && (a.y - b.y).abs() < EPS
}

pub fn assert_near(actual: Point, expected: Point) {
    assert!(near(actual, expected), "expected {}, got {}", expected, actual);
}

pub fn assert_segments_near(actual: &[Segment], expected: &[Segment]) {
    assert_eq!(
        actual.len(),
        expected.len(),
        "segment count differs: {:?} vs {:?}",
        actual,
        expected
    );
    for (a, e) in actual.iter().zip(expected) {
        assert!(
            near(a.p1, e.p1) && near(a.p2, e.p2),
            "expected {}, got {}",
            e,
            a
        );
    }
}

/// Two short walls inside a 640x480 room, seen from below
pub fn gallery() -> (Point, Segment, Segment) {
    let topline = Segment::from_coords(5.0, 1.0, 12.0, 1.0);
    let botline = Segment::from_coords(1.0, 3.0, 8.0, 3.0);
    (Point::new(4.0, 9.0), topline, botline)
}

/// Two walls forming an X, observer to the right
pub fn crossing_pair() -> (Point, Segment, Segment) {
    (
        Point::new(3.0, 2.0),
        Segment::from_coords(1.0, 1.0, 2.0, 3.0),
        Segment::from_coords(1.0, 3.0, 2.0, 1.0),
    )
}

/// 300x100 room split in two by a full-height wall at x = 150
pub fn divided_room() -> Arena {
    let mut arena = Arena::bounded(300.0, 100.0);
    arena.push_wall(Segment::from_coords(150.0, 0.0, 150.0, 100.0));
    arena
}

/// 4x3 maze of 100-unit squares: each row is a corridor, joined alternately
/// at the right and left ends
pub fn serpentine() -> Arena {
    let mut edges = Vec::new();
    for y in 0..3 {
        for x in 0..3 {
            edges.push(edge((x, y), (x + 1, y)));
        }
    }
    edges.push(edge((3, 0), (3, 1)));
    edges.push(edge((0, 1), (0, 2)));
    let maze = Maze {
        cols: 4,
        rows: 3,
        edges,
    };
    Arena::from_maze(&maze, 100.0)
}

/// Small maze plus a few random walls, reproducible from the seed
pub fn seeded_arena(seed: u64) -> Arena {
    let mut rng = StdRng::seed_from_u64(seed);
    Arena::generate(400.0, 300.0, 4, 3, 3, &mut rng)
}

/// 200x200 maze of 50-unit squares crossed by six random walls
pub fn crowded_arena(seed: u64) -> Arena {
    let mut rng = StdRng::seed_from_u64(seed);
    Arena::generate(200.0, 200.0, 4, 4, 6, &mut rng)
}

/// Regular grid of observer positions, offset so they avoid integer coordinates
pub fn observer_grid(arena: &Arena, step: f64) -> Vec<Point> {
    let mut points = Vec::new();
    let mut x = 3.3;
    while x < arena.width {
        let mut y = 3.7;
        while y < arena.height {
            points.push(Point::new(x, y));
            y += step;
        }
        x += step;
    }
    points
}

pub fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("museumghosts_{}_{}", std::process::id(), name))
}
