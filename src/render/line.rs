//! Plain stroked line renderer.

use crate::geom::Point;
use crate::highlight::Highlight;
use crate::render::markers::{draw_circles, draw_highlight_lines};
use crate::render::path::build_chart_path;
use crate::render::raster::{BlendMode, Layer};
use crate::render::{DataRenderer, DrawContext};

/// Renderer stroking each data set with its own color, optionally filling
/// the area under the curve.
#[derive(Debug, Clone, Default)]
pub struct LineRenderer;

impl LineRenderer {
    /// Create a renderer.
    pub fn new() -> Self {
        Self
    }
}

impl DataRenderer for LineRenderer {
    fn draw_data(&mut self, ctx: &DrawContext<'_>, canvas: &mut Layer) {
        for data_set in ctx.data_sets.iter().filter(|data_set| data_set.is_visible()) {
            let Some(path) = build_chart_path(data_set, ctx.transform, &ctx.animator) else {
                continue;
            };
            let style = data_set.style();
            if style.fill_enabled {
                let baseline = style
                    .fill_baseline
                    .unwrap_or(ctx.transform.viewport().y.min);
                let baseline_y = ctx.transform.value_to_pixel(Point::new(0.0, baseline)).y;
                canvas.fill_polygon(
                    &path.fill_polygon(baseline_y),
                    style.fill_color,
                    BlendMode::SourceOver,
                );
            }
            canvas.stroke_polyline(
                &path.flatten(),
                style.line_width,
                style.line_cap,
                style.color,
                BlendMode::SourceOver,
            );
        }
    }

    fn draw_highlighted(
        &mut self,
        ctx: &DrawContext<'_>,
        canvas: &mut Layer,
        highlights: &[Highlight],
    ) {
        draw_highlight_lines(ctx, canvas, highlights);
    }

    fn draw_extras(&mut self, ctx: &DrawContext<'_>, canvas: &mut Layer) {
        draw_circles(ctx, canvas);
    }
}
