//! Data set configuration and storage.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::datasource::{AppendError, EntryStore};
use crate::geom::Point;
use crate::render::{CircleStyle, Color, LineCap, LineMode, LineStyle};
use crate::view::Viewport;

static DATA_SET_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a data set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DataSetId(u64);

impl DataSetId {
    fn next() -> Self {
        Self(DATA_SET_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

/// Per-data-set drawing attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSetStyle {
    /// Curve shape between entries.
    pub mode: LineMode,
    /// Stroke color used by plain renderers.
    pub color: Color,
    /// Stroke width in pixels.
    pub line_width: f32,
    /// Cap style at both ends of the curve.
    pub line_cap: LineCap,
    /// Fill the area between the curve and the fill baseline.
    pub fill_enabled: bool,
    /// Fill color used by plain renderers.
    pub fill_color: Color,
    /// Baseline value for the fill area; `None` uses the bottom of the viewport.
    pub fill_baseline: Option<f64>,
    /// Vertical highlight line drawn at selected entries.
    pub highlight: Option<LineStyle>,
    /// Circle markers drawn at visible entries.
    pub circles: Option<CircleStyle>,
}

impl Default for DataSetStyle {
    fn default() -> Self {
        Self {
            mode: LineMode::Cubic,
            color: Color::BLACK,
            line_width: 1.0,
            line_cap: LineCap::Butt,
            fill_enabled: false,
            fill_color: Color::new(0.0, 0.0, 0.0, 0.25),
            fill_baseline: None,
            highlight: Some(LineStyle::default()),
            circles: None,
        }
    }
}

/// A labelled series of entries with styling.
#[derive(Debug, Clone)]
pub struct DataSet {
    id: DataSetId,
    label: String,
    style: DataSetStyle,
    entries: EntryStore,
    visible: bool,
}

impl DataSet {
    /// Create an empty data set.
    pub fn new(label: impl Into<String>) -> Self {
        Self::with_entries(label, EntryStore::new())
    }

    /// Build a data set from Y values, using their index as X.
    pub fn from_iter_y<I, T>(label: impl Into<String>, iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<f64>,
    {
        Self::with_entries(label, EntryStore::from_iter_y(iter))
    }

    /// Build a data set from points.
    pub fn from_iter_points<I>(label: impl Into<String>, iter: I) -> Self
    where
        I: IntoIterator<Item = Point>,
    {
        Self::with_entries(label, EntryStore::from_iter_points(iter))
    }

    fn with_entries(label: impl Into<String>, entries: EntryStore) -> Self {
        Self {
            id: DataSetId::next(),
            label: label.into(),
            style: DataSetStyle::default(),
            entries,
            visible: true,
        }
    }

    /// Replace the style.
    pub fn with_style(mut self, style: DataSetStyle) -> Self {
        self.style = style;
        self
    }

    /// Access the identifier.
    pub fn id(&self) -> DataSetId {
        self.id
    }

    /// Access the label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Access the style.
    pub fn style(&self) -> &DataSetStyle {
        &self.style
    }

    /// Access the style mutably.
    pub fn style_mut(&mut self) -> &mut DataSetStyle {
        &mut self.style
    }

    /// Access the entries.
    pub fn entries(&self) -> &EntryStore {
        &self.entries
    }

    /// Append an entry.
    pub fn push(&mut self, point: Point) -> Result<usize, AppendError> {
        self.entries.push(point)
    }

    /// Bounds over all entries.
    pub fn bounds(&self) -> Option<Viewport> {
        self.entries.bounds()
    }

    /// Check if the data set is drawn.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Toggle visibility.
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
}
