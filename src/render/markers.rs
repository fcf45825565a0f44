//! Highlight lines and entry circles shared by every renderer.

use crate::geom::{Point, ScreenPoint};
use crate::highlight::Highlight;
use crate::render::{BlendMode, DrawContext, Layer, LineCap};

/// Draw a vertical line at each highlight and return the highlights with
/// their draw position refreshed for this frame.
///
/// Highlights pointing at hidden data sets, missing entries, or positions
/// outside the content area are dropped.
pub(crate) fn draw_highlight_lines(
    ctx: &DrawContext<'_>,
    canvas: &mut Layer,
    highlights: &[Highlight],
) -> Vec<Highlight> {
    let content = ctx.content();
    let phase_y = ctx.animator.phase_y();
    let mut drawn = Vec::with_capacity(highlights.len());

    for highlight in highlights {
        let Some(data_set) = ctx
            .data_sets
            .get(highlight.data_set_index)
            .filter(|data_set| data_set.is_visible())
        else {
            continue;
        };
        let Some(entry) = data_set.entries().point(highlight.entry_index) else {
            continue;
        };
        let screen = ctx
            .transform
            .value_to_pixel(Point::new(entry.x, entry.y * phase_y));
        if screen.x < content.min.x || screen.x > content.max.x {
            continue;
        }
        if let Some(style) = data_set.style().highlight {
            let line = [
                ScreenPoint::new(screen.x, content.min.y),
                ScreenPoint::new(screen.x, content.max.y),
            ];
            canvas.stroke_polyline(
                &line,
                style.width,
                LineCap::Butt,
                style.color,
                BlendMode::SourceOver,
            );
        }
        drawn.push(Highlight {
            draw_x: screen.x,
            draw_y: screen.y,
            ..*highlight
        });
    }
    drawn
}

/// Draw circle markers at the visible entries of data sets that enable them.
pub(crate) fn draw_circles(ctx: &DrawContext<'_>, canvas: &mut Layer) {
    let phase_y = ctx.animator.phase_y();
    for data_set in ctx.data_sets.iter().filter(|data_set| data_set.is_visible()) {
        let Some(style) = data_set.style().circles else {
            continue;
        };
        let entries = data_set.entries();
        let Some(visible) =
            entries.visible_range(ctx.transform.viewport().x, ctx.animator.phase_x())
        else {
            continue;
        };
        for index in visible.indices() {
            let Some(entry) = entries.point(index) else {
                continue;
            };
            let center = ctx
                .transform
                .value_to_pixel(Point::new(entry.x, entry.y * phase_y));
            canvas.fill_circle(center, style.radius, style.color);
        }
    }
}
