//! Value-to-pixel transforms.
//!
//! The chart maps data values into pixels with a single affine matrix, the
//! same shape a 2D graphics context uses. Y grows downward in pixel space, so
//! the matrix flips the value axis.

use crate::geom::{Point, ScreenPoint, ScreenRect};
use crate::view::Viewport;

const MIN_SPAN: f64 = 1e-12;

/// Affine matrix `[a b; c d; tx ty]` applied as
/// `x' = a*x + c*y + tx`, `y' = b*x + d*y + ty`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub tx: f64,
    pub ty: f64,
}

impl Affine {
    /// Identity matrix.
    pub const IDENTITY: Self = Self {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        tx: 0.0,
        ty: 0.0,
    };

    /// Apply the matrix to a point.
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.a * x + self.c * y + self.tx,
            self.b * x + self.d * y + self.ty,
        )
    }

    /// Inverse matrix, if the matrix is not singular.
    pub fn invert(&self) -> Option<Self> {
        let det = self.a * self.d - self.b * self.c;
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        let a = self.d / det;
        let b = -self.b / det;
        let c = -self.c / det;
        let d = self.a / det;
        Some(Self {
            a,
            b,
            c,
            d,
            tx: -(a * self.tx + c * self.ty),
            ty: -(b * self.tx + d * self.ty),
        })
    }
}

/// Transform from data coordinates into screen coordinates and back.
#[derive(Debug, Clone)]
pub struct Transform {
    viewport: Viewport,
    screen: ScreenRect,
    value_to_pixel: Affine,
    pixel_to_value: Affine,
}

impl Transform {
    /// Create a transform mapping `viewport` onto the `screen` rectangle.
    ///
    /// Returns `None` for an empty screen rectangle or non-finite ranges.
    pub fn new(viewport: Viewport, screen: ScreenRect) -> Option<Self> {
        if !screen.is_valid() || !viewport.x.is_finite() || !viewport.y.is_finite() {
            return None;
        }
        let x = viewport.x.with_min_span(MIN_SPAN);
        let y = viewport.y.with_min_span(MIN_SPAN);
        let sx = screen.width() as f64 / x.span();
        let sy = screen.height() as f64 / y.span();
        let value_to_pixel = Affine {
            a: sx,
            b: 0.0,
            c: 0.0,
            d: -sy,
            tx: screen.min.x as f64 - x.min * sx,
            ty: screen.max.y as f64 + y.min * sy,
        };
        let pixel_to_value = value_to_pixel.invert()?;
        Some(Self {
            viewport,
            screen,
            value_to_pixel,
            pixel_to_value,
        })
    }

    /// Access the viewport.
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Access the screen rectangle.
    pub fn screen(&self) -> ScreenRect {
        self.screen
    }

    /// The value-to-pixel matrix.
    pub fn matrix(&self) -> Affine {
        self.value_to_pixel
    }

    /// Map a data point into screen space.
    pub fn value_to_pixel(&self, point: Point) -> ScreenPoint {
        let (x, y) = self.value_to_pixel.apply(point.x, point.y);
        ScreenPoint::new(x as f32, y as f32)
    }

    /// Map a screen point back into data space.
    pub fn pixel_to_value(&self, point: ScreenPoint) -> Point {
        let (x, y) = self.pixel_to_value.apply(point.x as f64, point.y as f64);
        Point::new(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::Range;

    fn unit_transform() -> Transform {
        let viewport = Viewport::new(Range::new(0.0, 10.0), Range::new(0.0, 10.0));
        Transform::new(viewport, ScreenRect::from_size(100.0, 100.0)).expect("valid transform")
    }

    #[test]
    fn value_axis_is_flipped() {
        let transform = unit_transform();
        let bottom_left = transform.value_to_pixel(Point::new(0.0, 0.0));
        let top_right = transform.value_to_pixel(Point::new(10.0, 10.0));
        assert_eq!(bottom_left, ScreenPoint::new(0.0, 100.0));
        assert_eq!(top_right, ScreenPoint::new(100.0, 0.0));
    }

    #[test]
    fn pixel_roundtrip() {
        let transform = unit_transform();
        let point = Point::new(5.0, 7.5);
        let back = transform.pixel_to_value(transform.value_to_pixel(point));
        assert!((back.x - point.x).abs() < 1e-6);
        assert!((back.y - point.y).abs() < 1e-6);
    }

    #[test]
    fn rejects_empty_screen() {
        let viewport = Viewport::new(Range::new(0.0, 1.0), Range::new(0.0, 1.0));
        assert!(Transform::new(viewport, ScreenRect::from_size(0.0, 10.0)).is_none());
    }

    #[test]
    fn large_spans_still_invert() {
        let viewport = Viewport::new(Range::new(0.0, 1e8), Range::new(0.0, 1e12));
        let transform = Transform::new(viewport, ScreenRect::from_size(100.0, 100.0))
            .expect("large spans are a valid viewport");
        let point = Point::new(2.5e7, 7.5e11);
        let pixel = transform.value_to_pixel(point);
        assert_eq!(pixel, ScreenPoint::new(25.0, 25.0));
        let back = transform.pixel_to_value(pixel);
        assert!((back.x - point.x).abs() / point.x < 1e-6);
        assert!((back.y - point.y).abs() / point.y < 1e-6);
    }

    #[test]
    fn singular_matrix_has_no_inverse() {
        let singular = Affine {
            a: 1.0,
            b: 2.0,
            c: 2.0,
            d: 4.0,
            tx: 0.0,
            ty: 0.0,
        };
        assert!(singular.invert().is_none());
        assert_eq!(Affine::IDENTITY.invert(), Some(Affine::IDENTITY));
    }
}
