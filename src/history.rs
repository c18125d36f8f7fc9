use crate::geometry::Point;
use std::collections::VecDeque;

/// Positions remembered for a fixed time window.
///
/// Time is always passed in by the caller (seconds, any monotonic origin), so
/// the history has no clock of its own and replays deterministically.
#[derive(Debug, Clone)]
pub struct MotionHistory {
    duration: f64,
    entries: VecDeque<(f64, Point)>,
}

impl MotionHistory {
    pub fn new(duration: f64) -> Self {
        MotionHistory {
            duration,
            entries: VecDeque::new(),
        }
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn push(&mut self, now: f64, point: Point) {
        self.forget(now);
        self.entries.push_back((now, point));
    }

    /// Drop entries that are `duration` or more seconds old
    pub fn forget(&mut self, now: f64) {
        while let Some(&(stamp, _)) = self.entries.front() {
            if now - (stamp + self.duration) < 0.0 {
                break;
            }
            self.entries.pop_front();
        }
    }

    /// Number of entries still inside the window at `now`
    pub fn count_at(&mut self, now: f64) -> usize {
        self.forget(now);
        self.entries.len()
    }

    pub fn points(&mut self, now: f64) -> Vec<Point> {
        self.forget(now);
        self.entries.iter().map(|&(_, p)| p).collect()
    }

    /// Path length through all remembered positions
    pub fn total_distance(&mut self, now: f64) -> f64 {
        let points = self.points(now);
        points.windows(2).map(|pair| pair[0].dist(pair[1])).sum()
    }

    /// Distance travelled over the window, per second of window
    pub fn average_speed(&mut self, now: f64) -> f64 {
        if self.duration <= 0.0 {
            return 0.0;
        }
        self.total_distance(now) / self.duration
    }

    /// Newest position minus oldest, if there are at least two
    pub fn heading(&mut self, now: f64) -> Option<Point> {
        self.forget(now);
        if self.entries.len() < 2 {
            return None;
        }
        let (_, first) = *self.entries.front()?;
        let (_, last) = *self.entries.back()?;
        Some(last - first)
    }
}
