//! Selected entries and touch-to-entry resolution.

use crate::animation::Animator;
use crate::geom::{Point, ScreenPoint};
use crate::series::DataSet;
use crate::transform::Transform;

/// A selected entry and where it was last drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Highlight {
    /// Index of the data set in the chart.
    pub data_set_index: usize,
    /// Index of the entry in the data set.
    pub entry_index: usize,
    /// Entry X value.
    pub x: f64,
    /// Entry Y value.
    pub y: f64,
    /// Pixel X of the entry as drawn.
    pub draw_x: f32,
    /// Pixel Y of the entry as drawn.
    pub draw_y: f32,
}

/// Resolve a touch location to the nearest entry across visible data sets.
///
/// The entry closest on X wins; ties between data sets go to the one closest
/// on Y.
pub fn highlight_at(
    data_sets: &[DataSet],
    transform: &Transform,
    animator: &Animator,
    location: ScreenPoint,
) -> Option<Highlight> {
    let value = transform.pixel_to_value(location);
    let mut best: Option<(Highlight, f32, f32)> = None;

    for (data_set_index, data_set) in data_sets.iter().enumerate() {
        if !data_set.is_visible() {
            continue;
        }
        let entries = data_set.entries();
        let Some(entry_index) = entries.nearest_index_by_x(value.x) else {
            continue;
        };
        let Some(entry) = entries.point(entry_index) else {
            continue;
        };
        let screen = transform.value_to_pixel(Point::new(entry.x, entry.y * animator.phase_y()));
        let dx = (screen.x - location.x).abs();
        let dy = (screen.y - location.y).abs();
        let closer = best.is_none_or(|(_, best_dx, best_dy)| {
            dx < best_dx || (dx == best_dx && dy < best_dy)
        });
        if closer {
            let highlight = Highlight {
                data_set_index,
                entry_index,
                x: entry.x,
                y: entry.y,
                draw_x: screen.x,
                draw_y: screen.y,
            };
            best = Some((highlight, dx, dy));
        }
    }

    best.map(|(highlight, _, _)| highlight)
}

/// Combine the highlights resolved for two touches.
///
/// Two highlights on the same X collapse into one.
pub fn pair_highlights(first: Option<Highlight>, second: Option<Highlight>) -> Vec<Highlight> {
    match (first, second) {
        (Some(a), Some(b)) if a.x == b.x => vec![a],
        (Some(a), Some(b)) => vec![a, b],
        (Some(one), None) | (None, Some(one)) => vec![one],
        (None, None) => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::ScreenRect;
    use crate::view::{Range, Viewport};

    fn transform() -> Transform {
        let viewport = Viewport::new(Range::new(0.0, 10.0), Range::new(0.0, 10.0));
        Transform::new(viewport, ScreenRect::from_size(100.0, 100.0)).unwrap()
    }

    fn sets() -> Vec<DataSet> {
        vec![
            DataSet::from_iter_points(
                "low",
                [Point::new(0.0, 1.0), Point::new(5.0, 2.0), Point::new(10.0, 3.0)],
            ),
            DataSet::from_iter_points(
                "high",
                [Point::new(0.0, 9.0), Point::new(5.0, 8.0), Point::new(10.0, 7.0)],
            ),
        ]
    }

    #[test]
    fn resolves_nearest_entry_and_data_set() {
        let hit = highlight_at(
            &sets(),
            &transform(),
            &Animator::new(),
            ScreenPoint::new(48.0, 25.0),
        )
        .expect("highlight");
        assert_eq!(hit.data_set_index, 1);
        assert_eq!(hit.entry_index, 1);
        assert_eq!((hit.x, hit.y), (5.0, 8.0));
        assert_eq!((hit.draw_x, hit.draw_y), (50.0, 20.0));
    }

    #[test]
    fn hidden_data_sets_are_skipped() {
        let mut sets = sets();
        sets[1].set_visible(false);
        let hit = highlight_at(&sets, &transform(), &Animator::new(), ScreenPoint::new(48.0, 25.0))
            .expect("highlight");
        assert_eq!(hit.data_set_index, 0);
        sets[0].set_visible(false);
        assert!(
            highlight_at(&sets, &transform(), &Animator::new(), ScreenPoint::new(1.0, 1.0))
                .is_none()
        );
    }

    #[test]
    fn equal_x_pairs_collapse() {
        let a = Highlight {
            data_set_index: 0,
            entry_index: 1,
            x: 5.0,
            y: 2.0,
            draw_x: 50.0,
            draw_y: 80.0,
        };
        let b = Highlight {
            data_set_index: 1,
            y: 8.0,
            draw_y: 20.0,
            ..a
        };
        assert_eq!(pair_highlights(Some(a), Some(b)), vec![a]);
        let c = Highlight { x: 9.0, ..b };
        assert_eq!(pair_highlights(Some(a), Some(c)), vec![a, c]);
        assert_eq!(pair_highlights(None, Some(c)), vec![c]);
        assert!(pair_highlights(None, None).is_empty());
    }
}
