//! Gradient line compositing.
//!
//! Each visible data set is drawn as two offscreen layers the size of the
//! chart bounds:
//!
//! 1. a gradient layer holding a vertical ramp from the start color (top row)
//!    to the end color (bottom row);
//! 2. a mask layer filled with the fill color, with the curve stroke (and the
//!    area under the curve when filling is enabled) cleared out.
//!
//! The gradient is drawn first and the mask over it, so the ramp only shows
//! through the cleared regions. The last mask of a frame is kept for the
//! highlight pass, which tints the range between two highlights through it.

use crate::error::RenderError;
use crate::geom::{Point, ScreenPoint, ScreenRect};
use crate::highlight::Highlight;
use crate::render::markers::{draw_circles, draw_highlight_lines};
use crate::render::path::{ChartPath, build_chart_path};
use crate::render::raster::{BlendMode, Layer};
use crate::render::{Color, DataRenderer, DrawContext};
use crate::series::{DataSet, DataSetStyle};

/// Opacity of the band drawn between two highlights.
pub const HIGHLIGHT_BAND_ALPHA: f32 = 0.05;

/// Colors used by [`GradientLineRenderer`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientColors {
    /// Gradient color at the top of the chart.
    pub start: Color,
    /// Gradient color at the bottom of the chart; also tints the highlight band.
    pub end: Color,
    /// Opaque color covering everything the gradient does not show through.
    pub fill: Color,
}

impl Default for GradientColors {
    fn default() -> Self {
        Self {
            start: Color::RED,
            end: Color::GREEN,
            fill: Color::WHITE,
        }
    }
}

/// Renderer drawing each data set as a gradient seen through its curve.
#[derive(Debug, Clone)]
pub struct GradientLineRenderer {
    colors: GradientColors,
    last_mask: Option<Layer>,
}

impl GradientLineRenderer {
    /// Create a renderer. Colors are fixed for the renderer's lifetime.
    pub fn new(colors: GradientColors) -> Self {
        Self {
            colors,
            last_mask: None,
        }
    }

    /// Access the configured colors.
    pub fn colors(&self) -> GradientColors {
        self.colors
    }

    /// Mask produced by the most recent `draw_data`, if any data set drew.
    pub fn last_mask(&self) -> Option<&Layer> {
        self.last_mask.as_ref()
    }

    fn draw_data_set(
        &self,
        ctx: &DrawContext<'_>,
        data_set: &DataSet,
        canvas: &mut Layer,
    ) -> Result<Option<Layer>, RenderError> {
        let Some(path) = build_chart_path(data_set, ctx.transform, &ctx.animator) else {
            return Ok(None);
        };
        let gradient = make_gradient_layer(self.colors.start, self.colors.end, ctx.bounds)?;
        let baseline = data_set
            .style()
            .fill_baseline
            .unwrap_or(ctx.transform.viewport().y.min);
        let baseline_y = ctx.transform.value_to_pixel(Point::new(0.0, baseline)).y;
        let mask = make_mask_layer(
            self.colors.fill,
            &path,
            data_set.style(),
            baseline_y,
            ctx.bounds,
        )?;

        let origin = layer_origin(ctx.bounds);
        canvas.draw_layer(&gradient, origin);
        canvas.draw_layer(&mask, origin);
        Ok(Some(mask))
    }
}

impl Default for GradientLineRenderer {
    fn default() -> Self {
        Self::new(GradientColors::default())
    }
}

impl DataRenderer for GradientLineRenderer {
    fn draw_data(&mut self, ctx: &DrawContext<'_>, canvas: &mut Layer) {
        self.last_mask = None;
        for data_set in ctx.data_sets.iter().filter(|data_set| data_set.is_visible()) {
            match self.draw_data_set(ctx, data_set, canvas) {
                Ok(Some(mask)) => self.last_mask = Some(mask),
                Ok(None) => {}
                Err(err) => {
                    tracing::debug!(label = data_set.label(), %err, "skipping data set");
                }
            }
        }
    }

    fn draw_highlighted(
        &mut self,
        ctx: &DrawContext<'_>,
        canvas: &mut Layer,
        highlights: &[Highlight],
    ) {
        let drawn = draw_highlight_lines(ctx, canvas, highlights);
        if drawn.len() < 2 {
            return;
        }
        let Some(mask) = self.last_mask.as_ref() else {
            tracing::trace!("no mask for this frame, skipping highlight band");
            return;
        };
        let Some(band) = highlight_band(&drawn, ctx.bounds) else {
            return;
        };
        let tint = self.colors.end.with_alpha(HIGHLIGHT_BAND_ALPHA);
        match make_band_layer(band, tint, mask, ctx.bounds) {
            Ok(layer) => canvas.draw_layer(&layer, layer_origin(ctx.bounds)),
            Err(err) => tracing::debug!(%err, "skipping highlight band"),
        }
    }

    fn draw_extras(&mut self, ctx: &DrawContext<'_>, canvas: &mut Layer) {
        draw_circles(ctx, canvas);
    }
}

/// Build the vertical gradient layer for `bounds`.
pub fn make_gradient_layer(
    start: Color,
    end: Color,
    bounds: ScreenRect,
) -> Result<Layer, RenderError> {
    let mut layer = Layer::for_rect(bounds)?;
    layer.fill_vertical_gradient(start, end);
    Ok(layer)
}

/// Build the mask layer for one data set.
///
/// `path` and `baseline_y` are in chart pixels; the layer's origin sits at
/// the top-left of `bounds`. The baseline is used only when the style enables
/// filling.
pub fn make_mask_layer(
    fill: Color,
    path: &ChartPath,
    style: &DataSetStyle,
    baseline_y: f32,
    bounds: ScreenRect,
) -> Result<Layer, RenderError> {
    let mut layer = Layer::for_rect(bounds)?;
    layer.fill(fill);

    if style.fill_enabled {
        let polygon = to_layer_space(path.fill_polygon(baseline_y), layer_origin(bounds));
        layer.fill_polygon(&polygon, Color::BLACK, BlendMode::Clear);
    }
    let curve = to_layer_space(path.flatten(), layer_origin(bounds));
    layer.stroke_polyline(
        &curve,
        style.line_width,
        style.line_cap,
        Color::BLACK,
        BlendMode::Clear,
    );
    Ok(layer)
}

/// Tint `band` (in chart pixels) on a bounds-sized layer, weighted by the
/// mask's alpha.
fn make_band_layer(
    band: ScreenRect,
    tint: Color,
    mask: &Layer,
    bounds: ScreenRect,
) -> Result<Layer, RenderError> {
    let mut layer = Layer::for_rect(bounds)?;
    let corners = to_layer_space(vec![band.min, band.max], layer_origin(bounds));
    layer.fill_rect_masked(ScreenRect::new(corners[0], corners[1]), tint, mask)?;
    Ok(layer)
}

/// Whole-pixel position of a bounds-sized layer on the canvas.
fn layer_origin(bounds: ScreenRect) -> (i64, i64) {
    (bounds.min.x.round() as i64, bounds.min.y.round() as i64)
}

fn to_layer_space(mut points: Vec<ScreenPoint>, origin: (i64, i64)) -> Vec<ScreenPoint> {
    for point in &mut points {
        point.x -= origin.0 as f32;
        point.y -= origin.1 as f32;
    }
    points
}

/// Band between the leftmost and rightmost highlight, spanning the bounds'
/// full height. `None` with fewer than two highlights or when they share an X.
pub fn highlight_band(highlights: &[Highlight], bounds: ScreenRect) -> Option<ScreenRect> {
    if highlights.len() < 2 {
        return None;
    }
    let left = highlights
        .iter()
        .map(|highlight| highlight.draw_x)
        .fold(f32::INFINITY, f32::min);
    let right = highlights
        .iter()
        .map(|highlight| highlight.draw_x)
        .fold(f32::NEG_INFINITY, f32::max);
    if !(right > left) {
        return None;
    }
    Some(ScreenRect::new(
        ScreenPoint::new(left, bounds.min.y),
        ScreenPoint::new(right, bounds.max.y),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::LineCap;

    fn highlight_at_x(draw_x: f32) -> Highlight {
        Highlight {
            data_set_index: 0,
            entry_index: 0,
            x: draw_x as f64,
            y: 0.0,
            draw_x,
            draw_y: 0.0,
        }
    }

    #[test]
    fn band_spans_highlights_over_full_height() {
        let bounds = ScreenRect::from_size(200.0, 100.0);
        let band = highlight_band(&[highlight_at_x(50.0), highlight_at_x(10.0)], bounds)
            .expect("band");
        assert_eq!(
            band,
            ScreenRect::new(ScreenPoint::new(10.0, 0.0), ScreenPoint::new(50.0, 100.0))
        );
    }

    #[test]
    fn band_needs_two_distinct_positions() {
        let bounds = ScreenRect::from_size(200.0, 100.0);
        assert!(highlight_band(&[highlight_at_x(10.0)], bounds).is_none());
        assert!(highlight_band(&[highlight_at_x(30.0), highlight_at_x(30.0)], bounds).is_none());
    }

    #[test]
    fn gradient_layer_matches_bounds() {
        let layer = make_gradient_layer(Color::RED, Color::GREEN, ScreenRect::from_size(30.0, 20.0))
            .unwrap();
        assert_eq!(layer.size(), (30, 20));
        assert_eq!(layer.pixel(15, 0), Some(Color::RED));
        assert_eq!(layer.pixel(15, 19), Some(Color::GREEN));
    }

    #[test]
    fn mask_fill_clears_area_under_curve() {
        let mut path = ChartPath::new();
        path.move_to(ScreenPoint::new(0.0, 10.0));
        path.line_to(ScreenPoint::new(40.0, 10.0));
        let style = DataSetStyle {
            fill_enabled: true,
            line_width: 2.0,
            line_cap: LineCap::Butt,
            ..DataSetStyle::default()
        };
        let mask = make_mask_layer(Color::WHITE, &path, &style, 30.0, ScreenRect::from_size(40.0, 40.0))
            .unwrap();
        assert_eq!(mask.rgba8(20, 5).unwrap().0[3], 255);
        assert_eq!(mask.rgba8(20, 10).unwrap().0[3], 0);
        assert_eq!(mask.rgba8(20, 20).unwrap().0[3], 0);
        assert_eq!(mask.rgba8(20, 35).unwrap().0[3], 255);
    }

    #[test]
    fn fractional_bounds_align_mask_with_layer_origin() {
        let bounds = ScreenRect::new(ScreenPoint::new(10.4, 0.0), ScreenPoint::new(50.4, 40.0));
        assert_eq!(layer_origin(bounds), (10, 0));

        let mut path = ChartPath::new();
        path.move_to(ScreenPoint::new(30.3, 0.0));
        path.line_to(ScreenPoint::new(30.3, 40.0));
        let mask = make_mask_layer(Color::WHITE, &path, &DataSetStyle::default(), 40.0, bounds)
            .unwrap();
        // Chart x 30.3 lands in layer column 20, drawn at canvas column 30.
        assert_eq!(mask.rgba8(20, 5).unwrap().0[3], 0);
        assert_eq!(mask.rgba8(19, 5).unwrap().0[3], 255);
        assert_eq!(mask.rgba8(21, 5).unwrap().0[3], 255);
    }

    #[test]
    fn empty_bounds_fail_layer_construction() {
        let path = ChartPath::new();
        let bounds = ScreenRect::from_size(0.0, 0.0);
        assert!(make_gradient_layer(Color::RED, Color::GREEN, bounds).is_err());
        assert!(make_mask_layer(Color::WHITE, &path, &DataSetStyle::default(), 0.0, bounds).is_err());
    }
}
