use crate::arena::Arena;
use crate::decomposition::visible_walls;
use crate::geometry::{intersect, IntersectMode, Point, Segment};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::f64::consts::{PI, TAU};
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Instant;

pub const DEFAULT_CELLSIZE: f64 = 100.0;

/// Distance sample points are moved off a crossing point along the cell edge
pub const DEFAULT_NUDGE: f64 = 0.01;

/// A wall hit closer than this to a vertex is the vertex itself
const TOUCH: f64 = 1e-7;

#[derive(Debug, Clone, PartialEq)]
pub enum PartitionError {
    /// The queried point is not inside any cell of the partition
    OutsidePartition { point: Point },
    InvalidCellSize(f64),
    InvalidArenaSize { width: f64, height: f64 },
    /// The cell list does not fill a `cols x rows` grid, e.g. a damaged cache file
    MalformedGrid { cols: usize, rows: usize, cells: usize },
}

impl fmt::Display for PartitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartitionError::OutsidePartition { point } => {
                write!(f, "observer {} is outside the partition", point)
            }
            PartitionError::InvalidCellSize(size) => write!(f, "invalid cell size {}", size),
            PartitionError::InvalidArenaSize { width, height } => {
                write!(f, "invalid arena size {}x{}", width, height)
            }
            PartitionError::MalformedGrid { cols, rows, cells } => {
                write!(f, "{} cells do not fill a {}x{} grid", cells, cols, rows)
            }
        }
    }
}

impl std::error::Error for PartitionError {}

/// Axis-aligned cell rectangle, identified by its corners
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellKey {
    pub upper_left: Point,
    pub lower_right: Point,
}

impl CellKey {
    pub fn new(upper_left: Point, lower_right: Point) -> Self {
        CellKey {
            upper_left,
            lower_right,
        }
    }

    /// Inclusive on all sides
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.upper_left.x
            && point.x <= self.lower_right.x
            && point.y >= self.upper_left.y
            && point.y <= self.lower_right.y
    }

    pub fn corners(&self) -> [Point; 4] {
        let Point { x: x1, y: y1 } = self.upper_left;
        let Point { x: x2, y: y2 } = self.lower_right;
        [
            Point::new(x1, y1),
            Point::new(x2, y1),
            Point::new(x2, y2),
            Point::new(x1, y2),
        ]
    }

    /// Top, right, bottom, left
    pub fn edges(&self) -> [Segment; 4] {
        let [nw, ne, se, sw] = self.corners();
        [
            Segment::new(nw, ne),
            Segment::new(ne, se),
            Segment::new(sw, se),
            Segment::new(nw, sw),
        ]
    }

    /// True if any part of `wall` lies in the cell or on its border
    pub fn touches(&self, wall: &Segment) -> bool {
        self.contains(wall.p1)
            || self.contains(wall.p2)
            || self
                .edges()
                .iter()
                .any(|edge| intersect(*wall, *edge, IntersectMode::Segment).is_some())
    }
}

/// Walls that may be visible from somewhere inside one cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub key: CellKey,
    /// In the order of the wall list the partition was built from
    pub walls: Vec<Segment>,
}

/// Grid of cells over an arena, each holding a superset of the walls visible
/// from any point in it.
///
/// Built once per layout. Changing any wall means building a new partition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Partition {
    pub width: f64,
    pub height: f64,
    pub cellsize: f64,
    pub cols: usize,
    pub rows: usize,
    /// Row-major, `index = col + row * cols`
    pub cells: Vec<Cell>,
    /// The full wall list the partition was computed from
    pub source_walls: Vec<Segment>,
}

impl Partition {
    /// Cell index for a point, or `OutsidePartition`.
    ///
    /// The last column/row overflows past the arena edge by up to one cell; a
    /// point exactly on the far edge of the grid belongs to the last cell.
    pub fn cell_index(&self, point: Point) -> Result<usize, PartitionError> {
        if !self.is_well_formed() {
            return Err(PartitionError::MalformedGrid {
                cols: self.cols,
                rows: self.rows,
                cells: self.cells.len(),
            });
        }

        let max_x = self.cols as f64 * self.cellsize;
        let max_y = self.rows as f64 * self.cellsize;
        let inside = point.x >= 0.0 && point.x <= max_x && point.y >= 0.0 && point.y <= max_y;
        if !inside {
            return Err(PartitionError::OutsidePartition { point });
        }

        let col = ((point.x / self.cellsize).floor() as usize).min(self.cols - 1);
        let row = ((point.y / self.cellsize).floor() as usize).min(self.rows - 1);
        Ok(col + row * self.cols)
    }

    /// Candidate walls for an observer at `point`
    pub fn lookup(&self, point: Point) -> Result<&[Segment], PartitionError> {
        let index = self.cell_index(point)?;
        self.cells
            .get(index)
            .map(|cell| cell.walls.as_slice())
            .ok_or(PartitionError::MalformedGrid {
                cols: self.cols,
                rows: self.rows,
                cells: self.cells.len(),
            })
    }

    /// Walls of the cell with exactly this key
    pub fn get(&self, key: &CellKey) -> Option<&[Segment]> {
        self.cells
            .iter()
            .find(|cell| cell.key == *key)
            .map(|cell| cell.walls.as_slice())
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    /// True if `cells` holds exactly one cell per grid position
    pub fn is_well_formed(&self) -> bool {
        self.cols > 0 && self.rows > 0 && self.cells.len() == self.cols * self.rows
    }

    /// Whether this partition was built for `arena` with `cellsize` and its
    /// grid has the shape that size and cell size give
    pub fn matches(&self, arena: &Arena, cellsize: f64) -> bool {
        self.width == arena.width
            && self.height == arena.height
            && self.cellsize == cellsize
            && self.cols == (arena.width / cellsize).ceil() as usize
            && self.rows == (arena.height / cellsize).ceil() as usize
            && self.is_well_formed()
            && self.source_walls == arena.walls
    }

    /// Average number of candidate walls per cell
    pub fn average_walls(&self) -> f64 {
        if self.cells.is_empty() {
            return 0.0;
        }
        let total: usize = self.cells.iter().map(|c| c.walls.len()).sum();
        total as f64 / self.cells.len() as f64
    }

    /// Save to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), String> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize partition: {}", e))?;

        fs::write(path, json).map_err(|e| format!("Failed to write partition file: {}", e))?;

        Ok(())
    }

    /// Load from file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let json = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read partition file: {}", e))?;

        serde_json::from_str(&json).map_err(|e| format!("Failed to parse partition file: {}", e))
    }

    /// Reuse a saved partition if it still matches `arena`, otherwise build and save one
    pub fn load_or_build<P: AsRef<Path>>(
        path: P,
        arena: &Arena,
        cellsize: f64,
        nudge: f64,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let path = path.as_ref();
        if path.exists() {
            match Self::load_from_file(path) {
                Ok(partition) if partition.matches(arena, cellsize) => {
                    log::info!("Loaded partition from {:?}", path);
                    return Ok(partition);
                }
                Ok(_) => log::info!("Partition at {:?} is stale, rebuilding", path),
                Err(e) => log::warn!("{}", e),
            }
        }

        let partition = build_partition_with_nudge(arena.size(), &arena.walls, cellsize, nudge)?;
        partition.save_to_file(path)?;
        log::info!("Saved partition to {:?}", path);
        Ok(partition)
    }
}

/// Candidate walls for an observer, see [`Partition::lookup`]
pub fn lookup_cell(partition: &Partition, point: Point) -> Result<&[Segment], PartitionError> {
    partition.lookup(point)
}

/// Build the partition with the default nudge
pub fn build_partition(size: Point, walls: &[Segment], cellsize: f64) -> Result<Partition, PartitionError> {
    build_partition_with_nudge(size, walls, cellsize, DEFAULT_NUDGE)
}

/// Tile `[0, size]` with square cells of `cellsize` and find, per cell, every wall
/// that can be visible from somewhere in it.
///
/// Cells are independent and are processed in parallel.
pub fn build_partition_with_nudge(
    size: Point,
    walls: &[Segment],
    cellsize: f64,
    nudge: f64,
) -> Result<Partition, PartitionError> {
    if !(cellsize > 0.0) || !cellsize.is_finite() {
        return Err(PartitionError::InvalidCellSize(cellsize));
    }
    if !(size.x > 0.0 && size.y > 0.0) || !size.x.is_finite() || !size.y.is_finite() {
        return Err(PartitionError::InvalidArenaSize {
            width: size.x,
            height: size.y,
        });
    }

    let cols = (size.x / cellsize).ceil() as usize;
    let rows = (size.y / cellsize).ceil() as usize;
    let total = cols * rows;

    log::info!(
        "Building partition: {}x{} cells of {} for {} walls",
        cols,
        rows,
        cellsize,
        walls.len()
    );
    let start = Instant::now();

    let vertices = wall_vertices(walls);
    let extent = vertices
        .iter()
        .map(|v| v.x.abs().max(v.y.abs()))
        .fold(0.0, f64::max);
    let reach = 4.0 * (extent + (cols + rows) as f64 * cellsize);
    let shadows = shadow_edges(walls, &vertices, reach, nudge);
    log::debug!(
        "{} vertices, {} shadow edges",
        vertices.len(),
        shadows.len() - walls.len()
    );

    let processed = AtomicUsize::new(0);
    let last_report = Mutex::new(Instant::now());

    let cells: Vec<Cell> = (0..total)
        .into_par_iter()
        .map(|index| {
            let col = index % cols;
            let row = index / cols;
            let upper_left = Point::new(col as f64 * cellsize, row as f64 * cellsize);
            let key = CellKey::new(upper_left, upper_left + Point::new(cellsize, cellsize));
            let cell = Cell {
                key,
                walls: cell_walls(&key, &vertices, &shadows, walls, nudge),
            };

            let done = processed.fetch_add(1, Ordering::Relaxed) + 1;
            if let Ok(mut last) = last_report.try_lock() {
                if last.elapsed().as_millis() >= 500 {
                    report_progress(done, total, start);
                    *last = Instant::now();
                }
            }

            cell
        })
        .collect();

    let partition = Partition {
        width: size.x,
        height: size.y,
        cellsize,
        cols,
        rows,
        cells,
        source_walls: walls.to_vec(),
    };

    log::info!(
        "Partition built in {:.2}s ({:.1} walls per cell of {})",
        start.elapsed().as_secs_f32(),
        partition.average_walls(),
        walls.len()
    );

    Ok(partition)
}

fn report_progress(done: usize, total: usize, start: Instant) {
    let progress = done as f32 / total as f32 * 100.0;
    let elapsed = start.elapsed().as_secs_f32();
    let remaining = if progress > 0.0 {
        elapsed * (100.0 - progress) / progress
    } else {
        0.0
    };
    log::info!(
        "Partition build: {:.1}% | Time: {:.1}s | ETA: {:.1}s",
        progress,
        elapsed,
        remaining
    );
}

/// Wall endpoints and every point where two walls cross, sorted and deduplicated.
/// Lines of sight only ever bend around these.
pub fn wall_vertices(walls: &[Segment]) -> Vec<Point> {
    let mut vertices: BTreeSet<Point> = walls.iter().flat_map(|w| [w.p1, w.p2]).collect();
    for (i, a) in walls.iter().enumerate() {
        for b in &walls[i + 1..] {
            if a == b {
                continue;
            }
            if let Some(point) = intersect(*a, *b, IntersectMode::Segment) {
                vertices.insert(point);
            }
        }
    }
    vertices.into_iter().collect()
}

/// Nothing but walls ending or crossing at `a` or `b` touches the line between them
fn vertices_see_each_other(a: Point, b: Point, walls: &[Segment]) -> bool {
    let sight = Segment::new(a, b);
    walls
        .iter()
        .filter_map(|wall| intersect(*wall, sight, IntersectMode::Segment))
        .all(|hit| hit.dist(a) <= TOUCH || hit.dist(b) <= TOUCH)
}

/// Every line across which the set of visible walls can change.
///
/// These are the walls themselves, plus one shadow edge for each ordered pair
/// of vertices `a`, `b` that see each other: it starts at `a` and points away
/// from `b`, so an observer on it sees `b` just past `a`. The edge stops
/// `nudge` beyond the first wall it runs into, or after `reach`.
pub fn shadow_edges(walls: &[Segment], vertices: &[Point], reach: f64, nudge: f64) -> Vec<Segment> {
    let mut edges = walls.to_vec();

    let shadow = |from: Point, away: Point| {
        let unit = away / away.norm();
        let far = Segment::new(from, from + unit * reach);
        let stop = walls
            .iter()
            .filter_map(|wall| intersect(*wall, far, IntersectMode::Segment))
            .map(|hit| hit.dist(from))
            .filter(|d| *d > TOUCH)
            .fold(reach, f64::min);
        Segment::new(from, from + unit * (stop + nudge))
    };

    for (i, a) in vertices.iter().enumerate() {
        for b in &vertices[i + 1..] {
            if vertices_see_each_other(*a, *b, walls) {
                edges.push(shadow(*a, *a - *b));
                edges.push(shadow(*b, *b - *a));
            }
        }
    }

    edges
}

/// Observer positions that together see everything visible from inside the cell.
///
/// The shadow edges cut the plane into regions with one fixed set of visible
/// walls each. Every such region meeting the cell has a corner of the cell in
/// it, touches the cell border, or has a corner of its own inside the cell. So
/// the samples are: the cell corners, both sides of every point where a shadow
/// edge crosses the border, and one point in every wedge around each vertex
/// and each crossing of two shadow edges inside the cell. Every sample is
/// `nudge` away from what it was derived from, because an observer standing
/// on a wall sees nothing.
pub fn sample_points(
    key: &CellKey,
    vertices: &[Point],
    shadows: &[Segment],
    nudge: f64,
) -> BTreeSet<Point> {
    let [nw, ne, se, sw] = key.corners();
    let mut samples: BTreeSet<Point> = [
        nw + Point::new(nudge, nudge),
        ne + Point::new(-nudge, nudge),
        se + Point::new(-nudge, -nudge),
        sw + Point::new(nudge, -nudge),
    ]
    .into_iter()
    .collect();

    let local: Vec<Segment> = shadows.iter().filter(|s| key.touches(s)).copied().collect();

    let inward = [
        Point::new(0.0, nudge),
        Point::new(-nudge, 0.0),
        Point::new(0.0, -nudge),
        Point::new(nudge, 0.0),
    ];

    for (edge, inward) in key.edges().into_iter().zip(inward) {
        let direction = edge.direction();
        let step = direction / direction.norm() * nudge;

        for shadow in &local {
            if let Some(hit) = intersect(edge, *shadow, IntersectMode::Segment) {
                samples.insert(hit - step + inward);
                samples.insert(hit + step + inward);
            }
        }
    }

    for (i, a) in local.iter().enumerate() {
        for b in &local[i + 1..] {
            if let Some(hit) = intersect(*a, *b, IntersectMode::Segment) {
                if key.contains(hit) {
                    sample_wedges(&mut samples, key, hit, &[a.direction(), b.direction()], nudge);
                }
            }
        }
    }

    for vertex in vertices.iter().filter(|v| key.contains(**v)) {
        let directions: Vec<Point> = vertices
            .iter()
            .filter(|other| *other != vertex)
            .map(|other| *other - *vertex)
            .collect();
        sample_wedges(&mut samples, key, *vertex, &directions, nudge);
    }

    samples
}

/// One sample `nudge` from `center` in the middle of every wedge cut out by
/// the lines through `center` along `directions`
fn sample_wedges(
    samples: &mut BTreeSet<Point>,
    key: &CellKey,
    center: Point,
    directions: &[Point],
    nudge: f64,
) {
    let mut angles: Vec<f64> = directions
        .iter()
        .flat_map(|d| {
            let angle = d.y.atan2(d.x);
            [angle.rem_euclid(TAU), (angle + PI).rem_euclid(TAU)]
        })
        .collect();
    angles.sort_by(f64::total_cmp);
    angles.dedup();

    for (i, &from) in angles.iter().enumerate() {
        let to = angles.get(i + 1).copied().unwrap_or(angles[0] + TAU);
        if to - from < 1e-12 {
            continue;
        }
        let middle = (from + to) / 2.0;
        let sample = center + Point::new(middle.cos(), middle.sin()) * nudge;
        if key.contains(sample) {
            samples.insert(sample);
        }
    }
}

fn cell_walls(
    key: &CellKey,
    vertices: &[Point],
    shadows: &[Segment],
    walls: &[Segment],
    nudge: f64,
) -> Vec<Segment> {
    let distinct: HashSet<Segment> = walls.iter().copied().collect();
    let mut found: HashSet<Segment> = walls.iter().filter(|w| key.touches(w)).copied().collect();

    for sample in sample_points(key, vertices, shadows, nudge) {
        if found.len() == distinct.len() {
            break;
        }
        found.extend(visible_walls(sample, walls));
    }

    let mut seen = HashSet::new();
    walls
        .iter()
        .filter(|wall| found.contains(*wall) && seen.insert(**wall))
        .copied()
        .collect()
}
