pub mod arena;
pub mod collection;
pub mod config;
pub mod decomposition;
pub mod fov;
pub mod geometry;
pub mod history;
pub mod maze;
pub mod partition;

pub use arena::Arena;
pub use collection::{collect_points, PointCollection};
pub use config::Config;
pub use decomposition::{decompose, line_of_sight, segments, visible_walls, SubSegment};
pub use fov::{visible_region, FieldOfView, RaySweep, Triangle};
pub use geometry::{intersect, IntersectMode, Point, Segment};
pub use history::MotionHistory;
pub use maze::{random_maze, Maze};
pub use partition::{build_partition, lookup_cell, CellKey, Partition, PartitionError};
