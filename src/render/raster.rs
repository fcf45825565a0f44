//! Offscreen RGBA layers.
//!
//! Layers back both the chart canvas and the per-frame mask and gradient
//! buffers. Rasterization samples pixel centers without anti-aliasing, so
//! coverage is always all-or-nothing and composited results are exact.

use image::{Rgba, RgbaImage};

use crate::error::RenderError;
use crate::geom::{ScreenPoint, ScreenRect};
use crate::render::{Color, LineCap};

/// Largest layer the raster will allocate, in pixels.
pub const MAX_LAYER_PIXELS: u64 = 1 << 26;

const CLEAR_PIXEL: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// How drawn pixels combine with the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendMode {
    /// Standard alpha compositing.
    SourceOver,
    /// Replace the destination with the source.
    Copy,
    /// Erase the destination where the shape covers it.
    Clear,
}

/// A fixed-size RGBA raster buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    image: RgbaImage,
}

impl Layer {
    /// Allocate a transparent layer.
    pub fn new(width: u32, height: u32) -> Result<Self, RenderError> {
        if width == 0 || height == 0 {
            return Err(RenderError::EmptyLayer { width, height });
        }
        if u64::from(width) * u64::from(height) > MAX_LAYER_PIXELS {
            return Err(RenderError::LayerTooLarge { width, height });
        }
        Ok(Self {
            image: RgbaImage::new(width, height),
        })
    }

    /// Allocate a transparent layer covering `rect`, rounding its size up.
    pub fn for_rect(rect: ScreenRect) -> Result<Self, RenderError> {
        let width = rect.width().max(0.0).ceil();
        let height = rect.height().max(0.0).ceil();
        if width > u32::MAX as f32 || height > u32::MAX as f32 {
            return Err(RenderError::LayerTooLarge {
                width: u32::MAX,
                height: u32::MAX,
            });
        }
        Self::new(width as u32, height as u32)
    }

    /// Layer width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Layer height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Layer size as `(width, height)`.
    pub fn size(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Color at a pixel, if inside the layer.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        self.image.get_pixel_checked(x, y).map(|pixel| Color::from_rgba8(*pixel))
    }

    /// Raw 8-bit pixel, if inside the layer.
    pub fn rgba8(&self, x: u32, y: u32) -> Option<Rgba<u8>> {
        self.image.get_pixel_checked(x, y).copied()
    }

    /// Access the backing image.
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Consume the layer into its backing image.
    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Replace every pixel with `color`.
    pub fn fill(&mut self, color: Color) {
        let pixel = color.to_rgba8();
        for dst in self.image.pixels_mut() {
            *dst = pixel;
        }
    }

    /// Fill the pixels whose centers fall inside `rect`.
    pub fn fill_rect(&mut self, rect: ScreenRect, color: Color, mode: BlendMode) {
        let xs = pixel_span(rect.min.x, rect.max.x, self.width());
        let ys = pixel_span(rect.min.y, rect.max.y, self.height());
        for y in ys {
            for x in xs.clone() {
                self.blend(x, y, color, 1.0, mode);
            }
        }
    }

    /// Fill `rect` with `color`, weighting each pixel by the alpha of `mask`.
    pub fn fill_rect_masked(
        &mut self,
        rect: ScreenRect,
        color: Color,
        mask: &Layer,
    ) -> Result<(), RenderError> {
        if mask.size() != self.size() {
            return Err(RenderError::SizeMismatch {
                expected: self.size(),
                actual: mask.size(),
            });
        }
        let xs = pixel_span(rect.min.x, rect.max.x, self.width());
        let ys = pixel_span(rect.min.y, rect.max.y, self.height());
        for y in ys {
            for x in xs.clone() {
                let coverage = mask.image.get_pixel(x, y).0[3] as f32 / 255.0;
                if coverage > 0.0 {
                    self.blend(x, y, color, coverage, BlendMode::SourceOver);
                }
            }
        }
        Ok(())
    }

    /// Fill a closed polygon using the even-odd rule.
    pub fn fill_polygon(&mut self, polygon: &[ScreenPoint], color: Color, mode: BlendMode) {
        if polygon.len() < 3 {
            return;
        }
        let (min_y, max_y) = polygon
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), point| {
                (lo.min(point.y), hi.max(point.y))
            });
        let width = self.width();
        let mut crossings = Vec::new();
        for y in pixel_span(min_y, max_y, self.height()) {
            let center_y = y as f32 + 0.5;
            crossings.clear();
            for (index, start) in polygon.iter().enumerate() {
                let end = polygon[(index + 1) % polygon.len()];
                if (start.y <= center_y) != (end.y <= center_y) {
                    let t = (center_y - start.y) / (end.y - start.y);
                    crossings.push(start.x + t * (end.x - start.x));
                }
            }
            crossings.sort_by(f32::total_cmp);
            for pair in crossings.chunks_exact(2) {
                for x in pixel_span(pair[0], pair[1], width) {
                    self.blend(x, y, color, 1.0, mode);
                }
            }
        }
    }

    /// Stroke an open polyline.
    ///
    /// Interior joins are round. Each pixel is blended at most once, so a
    /// translucent stroke does not darken where segments overlap.
    pub fn stroke_polyline(
        &mut self,
        points: &[ScreenPoint],
        width: f32,
        cap: LineCap,
        color: Color,
        mode: BlendMode,
    ) {
        if points.len() < 2 || !(width > 0.0) {
            return;
        }
        let half = width * 0.5;
        let mut points = points.to_vec();
        if cap == LineCap::Square {
            extend_ends(&mut points, half);
        }
        let open_ends = cap != LineCap::Round;
        let (layer_w, layer_h) = self.size();
        let mut covered = vec![false; layer_w as usize * layer_h as usize];
        let last = points.len() - 2;

        for (index, segment) in points.windows(2).enumerate() {
            let (a, b) = (segment[0], segment[1]);
            let dx = b.x - a.x;
            let dy = b.y - a.y;
            let len_sq = dx * dx + dy * dy;
            let xs = pixel_span(a.x.min(b.x) - half - 0.5, a.x.max(b.x) + half + 0.5, layer_w);
            let ys = pixel_span(a.y.min(b.y) - half - 0.5, a.y.max(b.y) + half + 0.5, layer_h);
            for y in ys {
                let py = y as f32 + 0.5;
                for x in xs.clone() {
                    let px = x as f32 + 0.5;
                    let t = if len_sq > 0.0 {
                        ((px - a.x) * dx + (py - a.y) * dy) / len_sq
                    } else {
                        0.0
                    };
                    if open_ends && ((index == 0 && t < 0.0) || (index == last && t > 1.0)) {
                        continue;
                    }
                    let t = t.clamp(0.0, 1.0);
                    let ex = px - (a.x + t * dx);
                    let ey = py - (a.y + t * dy);
                    if ex * ex + ey * ey <= half * half {
                        covered[y as usize * layer_w as usize + x as usize] = true;
                    }
                }
            }
        }

        for (offset, hit) in covered.into_iter().enumerate() {
            if hit {
                let x = (offset % layer_w as usize) as u32;
                let y = (offset / layer_w as usize) as u32;
                self.blend(x, y, color, 1.0, mode);
            }
        }
    }

    /// Fill a disc.
    pub fn fill_circle(&mut self, center: ScreenPoint, radius: f32, color: Color) {
        if !(radius > 0.0) {
            return;
        }
        let xs = pixel_span(center.x - radius, center.x + radius, self.width());
        let ys = pixel_span(center.y - radius, center.y + radius, self.height());
        for y in ys {
            let dy = y as f32 + 0.5 - center.y;
            for x in xs.clone() {
                let dx = x as f32 + 0.5 - center.x;
                if dx * dx + dy * dy <= radius * radius {
                    self.blend(x, y, color, 1.0, BlendMode::SourceOver);
                }
            }
        }
    }

    /// Replace the layer with a top-to-bottom two-stop ramp.
    ///
    /// The first row is exactly `top` and the last row exactly `bottom`.
    pub fn fill_vertical_gradient(&mut self, top: Color, bottom: Color) {
        let height = self.height();
        for (y, row) in self.image.enumerate_rows_mut() {
            let t = if height > 1 {
                y as f32 / (height - 1) as f32
            } else {
                0.0
            };
            let pixel = top.lerp(bottom, t).to_rgba8();
            for (_, _, dst) in row {
                *dst = pixel;
            }
        }
    }

    /// Composite `source` onto this layer with its top-left corner at `origin`.
    pub fn draw_layer(&mut self, source: &Layer, origin: (i64, i64)) {
        let (width, height) = self.size();
        for (sx, sy, pixel) in source.image.enumerate_pixels() {
            let x = origin.0 + i64::from(sx);
            let y = origin.1 + i64::from(sy);
            if x < 0 || y < 0 || x >= i64::from(width) || y >= i64::from(height) {
                continue;
            }
            match pixel.0[3] {
                0 => {}
                255 => self.image.put_pixel(x as u32, y as u32, *pixel),
                _ => self.blend(
                    x as u32,
                    y as u32,
                    Color::from_rgba8(*pixel),
                    1.0,
                    BlendMode::SourceOver,
                ),
            }
        }
    }

    fn blend(&mut self, x: u32, y: u32, color: Color, coverage: f32, mode: BlendMode) {
        let dst = self.image.get_pixel_mut(x, y);
        match mode {
            BlendMode::Copy => *dst = color.to_rgba8(),
            BlendMode::Clear => {
                let remaining = Color::from_rgba8(*dst).a * (1.0 - coverage);
                *dst = if remaining <= 0.0 {
                    CLEAR_PIXEL
                } else {
                    Color::from_rgba8(*dst).with_alpha(remaining).to_rgba8()
                };
            }
            BlendMode::SourceOver => {
                let src_a = color.a * coverage;
                if src_a <= 0.0 {
                    return;
                }
                let under = Color::from_rgba8(*dst);
                let dst_a = under.a * (1.0 - src_a);
                let out_a = src_a + dst_a;
                let mix = |s: f32, d: f32| (s * src_a + d * dst_a) / out_a;
                *dst = Color::new(
                    mix(color.r, under.r),
                    mix(color.g, under.g),
                    mix(color.b, under.b),
                    out_a,
                )
                .to_rgba8();
            }
        }
    }
}

/// Pixel indices whose centers fall in `[min, max)`, clipped to `0..limit`.
fn pixel_span(min: f32, max: f32, limit: u32) -> std::ops::Range<u32> {
    let start = (min - 0.5).ceil().max(0.0);
    let end = (max - 0.5).ceil().min(limit as f32);
    if !(end > start) {
        return 0..0;
    }
    start as u32..end as u32
}

fn extend_ends(points: &mut [ScreenPoint], by: f32) {
    let len = points.len();
    let first = extend_point(points[0], points[1], by);
    let last = extend_point(points[len - 1], points[len - 2], by);
    points[0] = first;
    points[len - 1] = last;
}

/// Move `end` away from `toward` by `by` pixels along their direction.
fn extend_point(end: ScreenPoint, toward: ScreenPoint, by: f32) -> ScreenPoint {
    let dx = end.x - toward.x;
    let dy = end.y - toward.y;
    let len = dx.hypot(dy);
    if len <= f32::EPSILON {
        return end;
    }
    ScreenPoint::new(end.x + dx / len * by, end.y + dy / len * by)
}
