//! Entry storage for chart data sets.
//!
//! Entries are appended in X order. As long as X stays monotonic, visible
//! range and nearest-entry lookups are binary searches; otherwise they fall
//! back to linear scans.

use thiserror::Error;

use crate::geom::Point;
use crate::view::{Range, Viewport};

/// Errors that can occur when appending entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AppendError {
    /// An entry was appended with an X smaller than its predecessor.
    ///
    /// The entry is still stored, but range lookups degrade to full scans.
    #[error("entry x values are not monotonic")]
    NonMonotonicX,
}

/// Append-only entry storage with incremental bounds tracking.
#[derive(Debug, Clone, Default)]
pub struct EntryStore {
    points: Vec<Point>,
    monotonic: bool,
    bounds: Option<Viewport>,
}

/// Inclusive index window of the entries a renderer should walk.
///
/// A window always holds at least one entry (`min <= max`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleRange {
    /// First visible entry index.
    pub min: usize,
    /// Last visible entry index (inclusive).
    pub max: usize,
}

impl VisibleRange {
    /// Number of index steps between the first and last entry.
    pub fn range(&self) -> usize {
        self.max - self.min
    }

    /// Iterate over entry indices in the window.
    pub fn indices(&self) -> std::ops::RangeInclusive<usize> {
        self.min..=self.max
    }
}

impl EntryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            points: Vec::new(),
            monotonic: true,
            bounds: None,
        }
    }

    /// Build a store from Y values, using their index as X.
    pub fn from_iter_y<I, T>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<f64>,
    {
        let mut store = Self::new();
        for (index, y) in iter.into_iter().enumerate() {
            let _ = store.push(Point::new(index as f64, y.into()));
        }
        store
    }

    /// Build a store from points.
    pub fn from_iter_points<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = Point>,
    {
        let mut store = Self::new();
        let _ = store.extend(iter);
        store
    }

    /// Append an entry and return its index.
    pub fn push(&mut self, point: Point) -> Result<usize, AppendError> {
        let index = self.points.len();
        self.extend([point]).map(|_| index)
    }

    /// Append multiple entries, returning how many were added.
    pub fn extend<I>(&mut self, points: I) -> Result<usize, AppendError>
    where
        I: IntoIterator<Item = Point>,
    {
        let points = points.into_iter();
        let (reserve, _) = points.size_hint();
        self.points.reserve(reserve);

        let start_len = self.points.len();
        let mut last_x = self.points.last().map(|point| point.x);
        let mut non_monotonic = false;
        for point in points {
            if let Some(last_x) = last_x
                && point.x < last_x
            {
                self.monotonic = false;
                non_monotonic = true;
            }
            self.points.push(point);
            self.update_bounds(point);
            last_x = Some(point.x);
        }

        if non_monotonic {
            Err(AppendError::NonMonotonicX)
        } else {
            Ok(self.points.len() - start_len)
        }
    }

    /// Access all entries.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Access a single entry by index.
    pub fn point(&self, index: usize) -> Option<Point> {
        self.points.get(index).copied()
    }

    /// Number of entries stored.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Bounds over all entries.
    pub fn bounds(&self) -> Option<Viewport> {
        self.bounds
    }

    /// Check whether X values are monotonic.
    pub fn is_monotonic(&self) -> bool {
        self.monotonic
    }

    /// Entry window covering `x_range`, shrunk by the animation `phase_x`.
    ///
    /// The window starts at the closest entry at or left of `x_range.min` and
    /// ends at the closest entry at or right of `x_range.max`, so a curve
    /// reaches the chart edges. Returns `None` when the store is empty.
    pub fn visible_range(&self, x_range: Range, phase_x: f64) -> Option<VisibleRange> {
        if self.points.is_empty() {
            return None;
        }
        let last = self.points.len() - 1;
        let (min, max) = if self.monotonic {
            let min = upper_bound(&self.points, x_range.min).saturating_sub(1);
            let max = lower_bound(&self.points, x_range.max).min(last);
            (min, max.max(min))
        } else {
            (0, last)
        };
        let range = ((max - min) as f64 * phase_x.clamp(0.0, 1.0)) as usize;
        Some(VisibleRange {
            min,
            max: min + range,
        })
    }

    /// Find the index of the entry with nearest X value.
    pub fn nearest_index_by_x(&self, x: f64) -> Option<usize> {
        if self.points.is_empty() || !x.is_finite() {
            return None;
        }
        if !self.monotonic {
            return self.nearest_index_linear(x);
        }
        let lower = lower_bound(&self.points, x);
        if lower == 0 {
            return Some(0);
        }
        if lower >= self.points.len() {
            return Some(self.points.len() - 1);
        }
        let left = lower - 1;
        let left_dist = (self.points[left].x - x).abs();
        let right_dist = (self.points[lower].x - x).abs();
        if left_dist <= right_dist {
            Some(left)
        } else {
            Some(lower)
        }
    }

    fn update_bounds(&mut self, point: Point) {
        match self.bounds.as_mut() {
            None => {
                self.bounds = Some(Viewport::new(
                    Range::new(point.x, point.x),
                    Range::new(point.y, point.y),
                ));
            }
            Some(bounds) => {
                bounds.x.expand_to_include(point.x);
                bounds.y.expand_to_include(point.y);
            }
        }
    }

    fn nearest_index_linear(&self, x: f64) -> Option<usize> {
        let mut best_index = None;
        let mut best_distance = f64::INFINITY;
        for (index, point) in self.points.iter().enumerate() {
            let distance = (point.x - x).abs();
            if distance < best_distance {
                best_distance = distance;
                best_index = Some(index);
            }
        }
        best_index
    }
}

fn lower_bound(points: &[Point], target: f64) -> usize {
    points.partition_point(|point| point.x < target)
}

fn upper_bound(points: &[Point], target: f64) -> usize {
    points.partition_point(|point| point.x <= target)
}
