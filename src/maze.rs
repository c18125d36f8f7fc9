use crate::geometry::Segment;
use rand::Rng;
use std::collections::{BTreeSet, HashSet, VecDeque};

/// A square of the maze grid, `(x, y)`
pub type Square = (i32, i32);

/// Passage between two adjacent squares, smaller square first
pub type Edge = (Square, Square);

pub fn edge(a: Square, b: Square) -> Edge {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// A perfect maze: a spanning tree over a `cols x rows` grid of squares
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Maze {
    pub cols: i32,
    pub rows: i32,
    pub edges: Vec<Edge>,
}

impl Maze {
    /// Walls between every pair of neighbouring squares that are not joined by
    /// a passage. The outer boundary is not included.
    pub fn walls(&self, cell_size: f64) -> Vec<Segment> {
        let passages: HashSet<Edge> = self.edges.iter().copied().collect();
        let mut walls = Vec::new();

        for y in 0..self.rows {
            for x in 0..self.cols {
                let (left, top) = (x as f64 * cell_size, y as f64 * cell_size);
                let (right, bottom) = (left + cell_size, top + cell_size);

                if x + 1 < self.cols && !passages.contains(&edge((x, y), (x + 1, y))) {
                    walls.push(Segment::from_coords(right, top, right, bottom));
                }
                if y + 1 < self.rows && !passages.contains(&edge((x, y), (x, y + 1))) {
                    walls.push(Segment::from_coords(left, bottom, right, bottom));
                }
            }
        }

        walls
    }
}

fn neighbors4((x, y): Square) -> [Square; 4] {
    [(x + 1, y), (x - 1, y), (x, y + 1), (x, y - 1)]
}

/// Grow a random spanning tree.
///
/// Repeatedly pops the most recently added frontier square; if it still has
/// unvisited neighbours, one of them is joined to it and both go back on the
/// frontier. This gives long, winding corridors.
pub fn random_maze<R: Rng + ?Sized>(cols: i32, rows: i32, rng: &mut R) -> Maze {
    let mut unvisited: BTreeSet<Square> = (0..cols)
        .flat_map(|x| (0..rows).map(move |y| (x, y)))
        .collect();
    let mut edges = Vec::new();

    if unvisited.is_empty() {
        return Maze { cols, rows, edges };
    }

    let root_index = rng.gen_range(0..unvisited.len());
    let root = unvisited.iter().nth(root_index).copied().unwrap_or((0, 0));
    unvisited.remove(&root);

    let mut frontier = VecDeque::from([root]);
    while !unvisited.is_empty() {
        let Some(node) = frontier.pop_back() else {
            break;
        };
        let nbrs: Vec<Square> = neighbors4(node)
            .into_iter()
            .filter(|n| unvisited.contains(n))
            .collect();
        if nbrs.is_empty() {
            continue;
        }
        let nbr = nbrs[rng.gen_range(0..nbrs.len())];
        edges.push(edge(node, nbr));
        unvisited.remove(&nbr);
        frontier.push_back(node);
        frontier.push_back(nbr);
    }

    Maze { cols, rows, edges }
}
