//! Rendering primitives and the pluggable renderer contract.
//!
//! A chart owns one [`DataRenderer`] and drives it through three hooks per
//! frame, always in the same order: [`draw_data`](DataRenderer::draw_data),
//! [`draw_highlighted`](DataRenderer::draw_highlighted) (only when highlights
//! are active), then [`draw_extras`](DataRenderer::draw_extras).

mod gradient;
mod line;
mod markers;
mod path;
mod raster;

pub use gradient::{
    GradientColors, GradientLineRenderer, HIGHLIGHT_BAND_ALPHA, highlight_band,
    make_gradient_layer, make_mask_layer,
};
pub use line::LineRenderer;
pub use path::{ChartPath, PathCommand, build_chart_path};
pub use raster::{BlendMode, Layer, MAX_LAYER_PIXELS};

use image::Rgba;

use crate::animation::Animator;
use crate::geom::ScreenRect;
use crate::highlight::Highlight;
use crate::series::DataSet;
use crate::transform::Transform;

/// RGBA color with straight (non-premultiplied) alpha.
///
/// All components are expected to be in the 0.0..=1.0 range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    /// Red channel.
    pub r: f32,
    /// Green channel.
    pub g: f32,
    /// Blue channel.
    pub b: f32,
    /// Alpha channel.
    pub a: f32,
}

impl Color {
    /// Create a new color.
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque black.
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);
    /// Opaque white.
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);
    /// Opaque red.
    pub const RED: Self = Self::new(1.0, 0.0, 0.0, 1.0);
    /// Opaque green.
    pub const GREEN: Self = Self::new(0.0, 1.0, 0.0, 1.0);
    /// Fully transparent.
    pub const TRANSPARENT: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    /// Same color with a different alpha.
    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// Linear interpolation between two colors, `t` in 0.0..=1.0.
    pub fn lerp(self, other: Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        Self {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
            a: self.a + (other.a - self.a) * t,
        }
    }

    /// Quantize into an 8-bit pixel.
    pub fn to_rgba8(self) -> Rgba<u8> {
        Rgba([
            quantize(self.r),
            quantize(self.g),
            quantize(self.b),
            quantize(self.a),
        ])
    }

    /// Expand an 8-bit pixel.
    pub fn from_rgba8(pixel: Rgba<u8>) -> Self {
        let [r, g, b, a] = pixel.0;
        Self::new(
            r as f32 / 255.0,
            g as f32 / 255.0,
            b as f32 / 255.0,
            a as f32 / 255.0,
        )
    }
}

fn quantize(channel: f32) -> u8 {
    (channel * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Shape drawn at the open ends of a stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineCap {
    /// Stroke stops exactly at the end points.
    #[default]
    Butt,
    /// Half-disc past each end point.
    Round,
    /// Stroke extends half its width past each end point.
    Square,
}

/// Curve shape between consecutive entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineMode {
    /// Straight segments.
    Linear,
    /// Horizontal step to the next X, then vertical to its value.
    Stepped,
    /// Cubic segments with both control points at the horizontal midpoint.
    #[default]
    Cubic,
}

/// Line stroke styling.
///
/// The width is expressed in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineStyle {
    /// Stroke color.
    pub color: Color,
    /// Stroke width in pixels.
    pub width: f32,
}

impl Default for LineStyle {
    fn default() -> Self {
        Self {
            color: Color::new(0.2, 0.2, 0.2, 1.0),
            width: 1.0,
        }
    }
}

/// Circle markers drawn at every visible entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleStyle {
    /// Marker color.
    pub color: Color,
    /// Marker radius in pixels.
    pub radius: f32,
}

impl Default for CircleStyle {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            radius: 3.0,
        }
    }
}

/// Everything a renderer reads from its host for one frame.
#[derive(Debug, Clone, Copy)]
pub struct DrawContext<'a> {
    /// Data sets in draw order.
    pub data_sets: &'a [DataSet],
    /// Value-to-pixel transform for the frame.
    pub transform: &'a Transform,
    /// Animation phases for the frame.
    pub animator: Animator,
    /// Full chart bounds; offscreen layers match this size.
    pub bounds: ScreenRect,
}

impl DrawContext<'_> {
    /// Area data is plotted into.
    pub fn content(&self) -> ScreenRect {
        self.transform.screen()
    }
}

/// Rendering strategy plugged into a chart.
pub trait DataRenderer {
    /// Draw every visible data set.
    fn draw_data(&mut self, ctx: &DrawContext<'_>, canvas: &mut Layer);

    /// Draw indicators for the active highlights.
    fn draw_highlighted(
        &mut self,
        ctx: &DrawContext<'_>,
        canvas: &mut Layer,
        highlights: &[Highlight],
    );

    /// Draw decorations on top of the data.
    fn draw_extras(&mut self, ctx: &DrawContext<'_>, canvas: &mut Layer);
}
