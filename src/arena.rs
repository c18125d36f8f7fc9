use crate::geometry::{Point, Segment};
use crate::maze::{random_maze, Maze};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Static layout of a level: its size and the wall segments in it.
///
/// The visibility functions never take an `Arena`, only `(observer, &arena.walls)`,
/// so this is just the thing callers keep around and persist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    pub width: f64,
    pub height: f64,
    pub walls: Vec<Segment>,
}

impl Arena {
    /// Arena without any walls
    pub fn new(width: f64, height: f64) -> Self {
        Arena {
            width,
            height,
            walls: Vec::new(),
        }
    }

    /// Arena enclosed by its four boundary walls (NW→NE, NE→SE, SE→SW, SW→NW)
    pub fn bounded(width: f64, height: f64) -> Self {
        let nw = Point::new(0.0, 0.0);
        let ne = Point::new(width, 0.0);
        let sw = Point::new(0.0, height);
        let se = Point::new(width, height);

        Arena {
            width,
            height,
            walls: vec![
                Segment::new(nw, ne),
                Segment::new(ne, se),
                Segment::new(se, sw),
                Segment::new(sw, nw),
            ],
        }
    }

    /// Bounded arena whose interior walls come from a maze
    pub fn from_maze(maze: &Maze, cell_size: f64) -> Self {
        let mut arena = Self::bounded(maze.cols as f64 * cell_size, maze.rows as f64 * cell_size);
        arena.walls.extend(maze.walls(cell_size));
        arena
    }

    /// Bounded arena with a random maze fitted inside and `random_walls` extra
    /// walls scattered on top. A maze with no squares adds nothing.
    pub fn generate<R: Rng + ?Sized>(
        width: f64,
        height: f64,
        maze_cols: i32,
        maze_rows: i32,
        random_walls: usize,
        rng: &mut R,
    ) -> Self {
        let mut arena = Self::bounded(width, height);
        if maze_cols > 0 && maze_rows > 0 {
            let cell_size = (width / maze_cols as f64).min(height / maze_rows as f64);
            let maze = random_maze(maze_cols, maze_rows, rng);
            arena.walls.extend(maze.walls(cell_size));
        }
        arena.add_random_walls(random_walls, rng);
        arena
    }

    pub fn size(&self) -> Point {
        Point::new(self.width, self.height)
    }

    /// Same arena with a different wall list
    pub fn with_walls(&self, walls: Vec<Segment>) -> Self {
        Arena {
            width: self.width,
            height: self.height,
            walls,
        }
    }

    pub fn push_wall(&mut self, wall: Segment) {
        self.walls.push(wall);
    }

    /// Inclusive bounds check
    pub fn contains(&self, point: Point) -> bool {
        point.x >= 0.0 && point.x <= self.width && point.y >= 0.0 && point.y <= self.height
    }

    /// Random point with integer coordinates inside the arena
    pub fn random_point<R: Rng + ?Sized>(&self, rng: &mut R) -> Point {
        Point::new(
            rng.gen_range(0..=self.width as i64) as f64,
            rng.gen_range(0..=self.height as i64) as f64,
        )
    }

    /// Scatter `count` random walls between random points
    pub fn add_random_walls<R: Rng + ?Sized>(&mut self, count: usize, rng: &mut R) {
        for _ in 0..count {
            let wall = Segment::new(self.random_point(rng), self.random_point(rng));
            self.walls.push(wall);
        }
    }

    /// Save to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), String> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize arena: {}", e))?;

        fs::write(path, json).map_err(|e| format!("Failed to write arena file: {}", e))?;

        Ok(())
    }

    /// Load from file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let json = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read arena file: {}", e))?;

        serde_json::from_str(&json).map_err(|e| format!("Failed to parse arena file: {}", e))
    }
}
