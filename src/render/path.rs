//! Pixel-space curves through data set entries.

use crate::animation::Animator;
use crate::geom::{Point, ScreenPoint};
use crate::render::LineMode;
use crate::series::DataSet;
use crate::transform::Transform;

const CUBIC_STEPS: usize = 16;

/// A single path instruction in pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    /// Start the path at a point.
    MoveTo(ScreenPoint),
    /// Straight segment to a point.
    LineTo(ScreenPoint),
    /// Cubic Bézier segment.
    CubicTo {
        /// First control point.
        ctrl1: ScreenPoint,
        /// Second control point.
        ctrl2: ScreenPoint,
        /// End point.
        to: ScreenPoint,
    },
}

/// An open path through the visible entries of one data set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartPath {
    commands: Vec<PathCommand>,
}

impl ChartPath {
    /// Create an empty path.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the path.
    pub fn move_to(&mut self, to: ScreenPoint) {
        self.commands.push(PathCommand::MoveTo(to));
    }

    /// Append a straight segment.
    pub fn line_to(&mut self, to: ScreenPoint) {
        self.commands.push(PathCommand::LineTo(to));
    }

    /// Append a cubic segment.
    pub fn cubic_to(&mut self, ctrl1: ScreenPoint, ctrl2: ScreenPoint, to: ScreenPoint) {
        self.commands.push(PathCommand::CubicTo { ctrl1, ctrl2, to });
    }

    /// Access the commands.
    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    /// Check whether the path has no commands.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Approximate the path with a polyline.
    pub fn flatten(&self) -> Vec<ScreenPoint> {
        let mut out = Vec::with_capacity(self.commands.len() * CUBIC_STEPS);
        let mut current = ScreenPoint::default();
        for command in &self.commands {
            match *command {
                PathCommand::MoveTo(to) | PathCommand::LineTo(to) => {
                    out.push(to);
                    current = to;
                }
                PathCommand::CubicTo { ctrl1, ctrl2, to } => {
                    for step in 1..=CUBIC_STEPS {
                        let t = step as f32 / CUBIC_STEPS as f32;
                        out.push(cubic_point(current, ctrl1, ctrl2, to, t));
                    }
                    current = to;
                }
            }
        }
        out
    }

    /// Closed polygon between the curve and a horizontal baseline.
    pub fn fill_polygon(&self, baseline_y: f32) -> Vec<ScreenPoint> {
        let mut polygon = self.flatten();
        let (Some(first), Some(last)) = (polygon.first().copied(), polygon.last().copied()) else {
            return polygon;
        };
        polygon.push(ScreenPoint::new(last.x, baseline_y));
        polygon.push(ScreenPoint::new(first.x, baseline_y));
        polygon
    }
}

fn cubic_point(
    p0: ScreenPoint,
    p1: ScreenPoint,
    p2: ScreenPoint,
    p3: ScreenPoint,
    t: f32,
) -> ScreenPoint {
    let mt = 1.0 - t;
    let a = mt * mt * mt;
    let b = 3.0 * mt * mt * t;
    let c = 3.0 * mt * t * t;
    let d = t * t * t;
    ScreenPoint::new(
        a * p0.x + b * p1.x + c * p2.x + d * p3.x,
        a * p0.y + b * p1.y + c * p2.y + d * p3.y,
    )
}

/// Build the pixel path for the visible entries of `data_set`.
///
/// Y values are scaled by the animation Y phase before transforming; X values
/// are not. Returns `None` when fewer than two entries are visible.
pub fn build_chart_path(
    data_set: &DataSet,
    transform: &Transform,
    animator: &Animator,
) -> Option<ChartPath> {
    let entries = data_set.entries();
    let visible = entries.visible_range(transform.viewport().x, animator.phase_x())?;
    if visible.range() == 0 {
        tracing::trace!(
            label = data_set.label(),
            index = visible.min,
            "single visible entry, no path"
        );
        return None;
    }

    let phase_y = animator.phase_y();
    let to_pixel = |x: f64, y: f64| transform.value_to_pixel(Point::new(x, y * phase_y));

    let mut prev = entries.point(visible.min)?;
    let mut path = ChartPath::new();
    path.move_to(to_pixel(prev.x, prev.y));
    for index in visible.indices().skip(1) {
        let cur = entries.point(index)?;
        match data_set.style().mode {
            LineMode::Linear => path.line_to(to_pixel(cur.x, cur.y)),
            LineMode::Stepped => {
                path.line_to(to_pixel(cur.x, prev.y));
                path.line_to(to_pixel(cur.x, cur.y));
            }
            LineMode::Cubic => {
                let cpx = prev.x + (cur.x - prev.x) / 2.0;
                path.cubic_to(
                    to_pixel(cpx, prev.y),
                    to_pixel(cpx, cur.y),
                    to_pixel(cur.x, cur.y),
                );
            }
        }
        prev = cur;
    }
    Some(path)
}
