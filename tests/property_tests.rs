mod common;

use common::{near, observer_grid, seeded_arena, serpentine};
use museumghosts::{collect_points, decompose, segments, visible_region, visible_walls, Arena};
use std::collections::HashSet;

fn arenas() -> Vec<Arena> {
    vec![seeded_arena(1), seeded_arena(2), seeded_arena(3), serpentine()]
}

#[test]
fn pieces_tile_each_wall() {
    for arena in arenas() {
        for observer in observer_grid(&arena, 97.0) {
            let pieces = decompose(observer, &arena.walls);
            let mut checked = HashSet::new();

            for wall in &arena.walls {
                if wall.is_degenerate() || !checked.insert(*wall) {
                    continue;
                }
                let own: Vec<_> = pieces.iter().filter(|p| p.wall == *wall).collect();
                assert!(!own.is_empty(), "{} produced no pieces", wall);

                let start = wall.p1.min(wall.p2);
                let end = wall.p1.max(wall.p2);
                assert!(near(own[0].segment.p1, start));
                assert!(near(own[own.len() - 1].segment.p2, end));
                for pair in own.windows(2) {
                    assert_eq!(pair[0].segment.p2, pair[1].segment.p1, "gap in {}", wall);
                }

                let total: f64 = own.iter().map(|p| p.segment.length()).sum();
                assert!(
                    (total - wall.length()).abs() <= 1e-9 * wall.length().max(1.0),
                    "{}: pieces sum to {} of {}",
                    wall,
                    total,
                    wall.length()
                );
            }
        }
    }
}

#[test]
fn endpoints_are_always_collected() {
    for arena in arenas() {
        for observer in observer_grid(&arena, 131.0) {
            let collection = collect_points(observer, &arena.walls);
            for wall in &arena.walls {
                let points = collection.get(wall).unwrap();
                assert!(points.contains(&wall.p1) && points.contains(&wall.p2));
            }
        }
    }
}

#[test]
fn visible_pieces_are_a_subsequence() {
    for arena in arenas() {
        for observer in observer_grid(&arena, 97.0) {
            let all = segments(observer, &arena.walls, false);
            let visible = segments(observer, &arena.walls, true);
            assert!(visible.len() <= all.len());

            let mut rest = all.iter();
            for piece in &visible {
                assert!(rest.any(|s| s == piece), "{} not among all pieces", piece);
            }
        }
    }
}

#[test]
fn repeated_runs_agree() {
    let arena = seeded_arena(4);
    for observer in observer_grid(&arena, 151.0) {
        assert_eq!(
            collect_points(observer, &arena.walls),
            collect_points(observer, &arena.walls)
        );
        assert_eq!(
            segments(observer, &arena.walls, true),
            segments(observer, &arena.walls, true)
        );
    }
}

#[test]
fn visible_walls_follow_input_order() {
    let arena = serpentine();
    for observer in observer_grid(&arena, 73.0) {
        let visible = visible_walls(observer, &arena.walls);
        let positions: Vec<usize> = visible
            .iter()
            .map(|w| arena.walls.iter().position(|a| a == w).unwrap())
            .collect();
        assert!(positions.windows(2).all(|p| p[0] < p[1]));
    }
}

#[test]
fn fan_stays_inside_the_room() {
    for arena in arenas() {
        let room = arena.width * arena.height;
        for observer in observer_grid(&arena, 97.0) {
            let fan = visible_region(observer, &arena.walls);
            assert!(!fan.is_empty());
            let area: f64 = fan.iter().map(|t| t.area()).sum();
            assert!(area > 0.0 && area <= room * (1.0 + 1e-9), "area {} at {}", area, observer);
        }
    }
}
