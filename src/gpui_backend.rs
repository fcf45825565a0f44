//! GPUI integration.
//!
//! Paints a composited [`Layer`] into a GPUI window. Each row is split into
//! runs of identical pixels and every non-transparent run becomes one quad.

use gpui::{BorderStyle, Bounds, Corners, Edges, Pixels, Point, Window, point, px, quad};
use image::Rgba;

use crate::chart::LineChart;
use crate::render::{Color, Layer};

/// Horizontal span of identical pixels on one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PixelRun {
    pub y: u32,
    pub x_start: u32,
    pub x_end: u32,
    pub pixel: Rgba<u8>,
}

/// Render `chart` and paint it with the chart's pixel origin at `origin`.
pub fn paint_chart(chart: &mut LineChart, origin: Point<Pixels>, window: &mut Window) {
    if let Some(layer) = chart.render() {
        paint_layer(window, &layer, origin);
    }
}

/// Paint `layer` with its top-left pixel at `origin`.
pub fn paint_layer(window: &mut Window, layer: &Layer, origin: Point<Pixels>) {
    for run in row_runs(layer) {
        let color = to_rgba(Color::from_rgba8(run.pixel));
        let top_left = point(
            origin.x + px(run.x_start as f32),
            origin.y + px(run.y as f32),
        );
        let bottom_right = point(
            origin.x + px(run.x_end as f32),
            origin.y + px(run.y as f32 + 1.0),
        );
        window.paint_quad(quad(
            Bounds::from_corners(top_left, bottom_right),
            Corners::all(px(0.0)),
            color,
            Edges::all(px(0.0)),
            color,
            BorderStyle::default(),
        ));
    }
}

pub(crate) fn row_runs(layer: &Layer) -> Vec<PixelRun> {
    let image = layer.image();
    let mut runs = Vec::new();
    for (y, row) in image.rows().enumerate() {
        let mut current: Option<PixelRun> = None;
        for (x, pixel) in row.enumerate() {
            let x = x as u32;
            match current.as_mut() {
                Some(run) if run.pixel == *pixel => run.x_end = x + 1,
                _ => {
                    if let Some(run) = current.take() {
                        runs.push(run);
                    }
                    current = Some(PixelRun {
                        y: y as u32,
                        x_start: x,
                        x_end: x + 1,
                        pixel: *pixel,
                    });
                }
            }
        }
        runs.extend(current);
    }
    runs.retain(|run| run.pixel.0[3] > 0);
    runs
}

fn to_rgba(color: Color) -> gpui::Rgba {
    gpui::Rgba {
        r: color.r,
        g: color.g,
        b: color.b,
        a: color.a,
    }
}
