//! gradient_liveplot draws line charts whose curves reveal a vertical color
//! gradient, with one- and two-finger touch highlighting.
//! Rasterization is CPU-side; the optional `gpui` feature paints the result
//! into a GPUI window.

#![forbid(unsafe_code)]

pub mod animation;
pub mod chart;
pub mod datasource;
pub mod error;
pub mod geom;
pub mod gesture;
pub mod highlight;
pub mod render;
pub mod series;
pub mod transform;
pub mod view;

#[cfg(feature = "gpui")]
pub mod gpui_backend;

pub use animation::Animator;
pub use chart::{ChartBuilder, ChartConfig, ChartDelegate, LineChart};
pub use datasource::{AppendError, EntryStore, VisibleRange};
pub use error::RenderError;
pub use geom::{Point, ScreenPoint, ScreenRect};
pub use gesture::{
    GestureConfig, GestureIntent, GesturePhase, GestureUpdate, HighlightGestureRecognizer,
    PromotionToken, RecognizerState, Resolution, Touch, TouchEvent, TouchId,
};
pub use highlight::{Highlight, highlight_at, pair_highlights};
pub use render::{
    BlendMode, ChartPath, CircleStyle, Color, DataRenderer, DrawContext, GradientColors,
    GradientLineRenderer, Layer, LineCap, LineMode, LineRenderer, LineStyle,
};
pub use series::{DataSet, DataSetId, DataSetStyle};
pub use transform::Transform;
pub use view::{Range, Viewport};
