//! Host chart tying data, gestures and the renderer together.

use std::time::Instant;

use crate::animation::Animator;
use crate::geom::{ScreenPoint, ScreenRect};
use crate::gesture::{
    GestureConfig, GestureIntent, GestureUpdate, HighlightGestureRecognizer, PromotionToken,
    TouchEvent, TouchId,
};
use crate::highlight::{Highlight, highlight_at, pair_highlights};
use crate::render::{
    DataRenderer, DrawContext, GradientColors, GradientLineRenderer, Layer, LineRenderer,
};
use crate::series::DataSet;
use crate::transform::Transform;
use crate::view::{Range, Viewport};

/// Receives selection changes driven by touch gestures.
pub trait ChartDelegate {
    /// One or two entries are highlighted.
    fn value_selected(&mut self, _highlights: &[Highlight]) {}

    /// A touch resolved to no entry.
    fn nothing_selected(&mut self) {}

    /// The gesture ended, was cancelled or failed.
    fn interaction_ended(&mut self) {}
}

/// Chart-wide configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartConfig {
    /// Fraction of the data span added around auto-fitted viewports.
    pub padding_frac: f64,
    /// Minimum padding applied to each auto-fitted axis.
    pub min_padding: f64,
    /// Thresholds for the highlight gesture.
    pub gesture: GestureConfig,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            padding_frac: 0.05,
            min_padding: 1e-6,
            gesture: GestureConfig::default(),
        }
    }
}

/// Line chart with touch highlighting and a pluggable renderer.
pub struct LineChart {
    bounds: ScreenRect,
    config: ChartConfig,
    data_sets: Vec<DataSet>,
    viewport: Option<Viewport>,
    animator: Animator,
    renderer: Box<dyn DataRenderer>,
    highlights: Vec<Highlight>,
    recognizer: HighlightGestureRecognizer,
    delegate: Option<Box<dyn ChartDelegate>>,
}

impl std::fmt::Debug for LineChart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineChart")
            .field("bounds", &self.bounds)
            .field("data_sets", &self.data_sets.len())
            .field("viewport", &self.viewport)
            .field("highlights", &self.highlights)
            .field("gesture", &self.recognizer.phase())
            .finish()
    }
}

impl LineChart {
    /// Create a chart drawing with `renderer` into `bounds`.
    pub fn new(bounds: ScreenRect, renderer: Box<dyn DataRenderer>) -> Self {
        Self::with_config(bounds, renderer, ChartConfig::default())
    }

    fn with_config(
        bounds: ScreenRect,
        renderer: Box<dyn DataRenderer>,
        config: ChartConfig,
    ) -> Self {
        Self {
            bounds,
            recognizer: HighlightGestureRecognizer::new(config.gesture.clone()),
            config,
            data_sets: Vec::new(),
            viewport: None,
            animator: Animator::new(),
            renderer,
            highlights: Vec::new(),
            delegate: None,
        }
    }

    /// Gradient chart of the given pixel size.
    pub fn gradient(colors: GradientColors, width: f32, height: f32) -> Self {
        Self::new(
            ScreenRect::from_size(width, height),
            Box::new(GradientLineRenderer::new(colors)),
        )
    }

    /// Start building a chart with custom configuration.
    pub fn builder() -> ChartBuilder {
        ChartBuilder::default()
    }

    pub fn bounds(&self) -> ScreenRect {
        self.bounds
    }

    pub fn set_bounds(&mut self, bounds: ScreenRect) {
        self.bounds = bounds;
    }

    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    /// Access all data sets.
    pub fn data_sets(&self) -> &[DataSet] {
        &self.data_sets
    }

    /// Access all data sets mutably.
    pub fn data_sets_mut(&mut self) -> &mut [DataSet] {
        &mut self.data_sets
    }

    /// Add a data set on top of the existing ones.
    pub fn add_data_set(&mut self, data_set: DataSet) {
        self.data_sets.push(data_set);
    }

    pub fn animator(&self) -> Animator {
        self.animator
    }

    pub fn animator_mut(&mut self) -> &mut Animator {
        &mut self.animator
    }

    pub fn set_delegate(&mut self, delegate: Box<dyn ChartDelegate>) {
        self.delegate = Some(delegate);
    }

    /// Compute bounds across all data sets.
    pub fn data_bounds(&self) -> Option<Viewport> {
        let mut merged: Option<Viewport> = None;
        for bounds in self.data_sets.iter().filter_map(DataSet::bounds) {
            merged = Some(match merged {
                None => bounds,
                Some(existing) => Viewport::new(
                    union(existing.x, bounds.x),
                    union(existing.y, bounds.y),
                ),
            });
        }
        merged
    }

    /// Viewport in effect: the fixed one if set, otherwise the padded data
    /// bounds.
    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport.or_else(|| {
            self.data_bounds()
                .map(|bounds| bounds.padded(self.config.padding_frac, self.config.min_padding))
        })
    }

    /// Fix the viewport, or return to auto-fitting with `None`.
    pub fn set_viewport(&mut self, viewport: Option<Viewport>) {
        self.viewport = viewport;
    }

    /// Value-to-pixel transform for the current viewport and bounds.
    pub fn transform(&self) -> Option<Transform> {
        Transform::new(self.viewport()?, self.bounds)
    }

    /// Feed a touch event through the recognizer and apply the resulting
    /// updates to the highlights.
    pub fn handle_touch(&mut self, event: &TouchEvent, now: Instant) -> Vec<GestureUpdate> {
        let updates = self.recognizer.process(event, now);
        for update in &updates {
            self.apply_gesture(*update);
        }
        updates
    }

    /// Drive the promotion timer from the host's event loop.
    pub fn tick(&mut self, now: Instant) -> Option<GestureUpdate> {
        let update = self.recognizer.poll(now)?;
        self.apply_gesture(update);
        Some(update)
    }

    /// Fire a promotion scheduled on the host's own timer.
    pub fn fire_promotion(&mut self, token: PromotionToken) -> Option<GestureUpdate> {
        let update = self.recognizer.fire(token)?;
        self.apply_gesture(update);
        Some(update)
    }

    pub fn pending_promotion(&self) -> Option<PromotionToken> {
        self.recognizer.pending_promotion()
    }

    pub fn recognizer(&self) -> &HighlightGestureRecognizer {
        &self.recognizer
    }

    /// Replace the highlights without notifying the delegate.
    pub fn highlight_values(&mut self, highlights: Vec<Highlight>) {
        self.highlights = highlights;
    }

    pub fn highlights(&self) -> &[Highlight] {
        &self.highlights
    }

    /// Draw the chart onto `canvas`, whose origin is the chart's pixel origin.
    pub fn draw(&mut self, canvas: &mut Layer) {
        if self.data_sets.is_empty() {
            return;
        }
        let Some(transform) = self.transform() else {
            tracing::trace!("no usable viewport, skipping draw");
            return;
        };
        let ctx = DrawContext {
            data_sets: &self.data_sets,
            transform: &transform,
            animator: self.animator,
            bounds: self.bounds,
        };
        self.renderer.draw_data(&ctx, canvas);
        if !self.highlights.is_empty() {
            self.renderer
                .draw_highlighted(&ctx, canvas, &self.highlights);
        }
        self.renderer.draw_extras(&ctx, canvas);
    }

    /// Draw the chart onto a fresh canvas reaching from the pixel origin to
    /// the bottom-right of the bounds.
    pub fn render(&mut self) -> Option<Layer> {
        let extent = ScreenRect::new(ScreenPoint::new(0.0, 0.0), self.bounds.max);
        let mut canvas = match Layer::for_rect(extent) {
            Ok(canvas) => canvas,
            Err(err) => {
                tracing::debug!(%err, "cannot allocate chart canvas");
                return None;
            }
        };
        self.draw(&mut canvas);
        Some(canvas)
    }

    fn apply_gesture(&mut self, update: GestureUpdate) {
        if update.state.is_resolved() {
            self.highlights.clear();
            if let Some(delegate) = self.delegate.as_mut() {
                delegate.interaction_ended();
            }
            self.recognizer.reset();
            return;
        }
        match update.intent {
            GestureIntent::NoTouch => self.highlights.clear(),
            GestureIntent::OneTouch(id) => {
                let selection = self.resolve_touch(id).into_iter().collect();
                self.select(selection);
            }
            GestureIntent::TwoTouches(a, b) => {
                let selection = pair_highlights(self.resolve_touch(a), self.resolve_touch(b));
                self.select(selection);
            }
        }
    }

    fn resolve_touch(&self, id: TouchId) -> Option<Highlight> {
        let location = self.recognizer.location(id)?;
        let transform = self.transform()?;
        highlight_at(&self.data_sets, &transform, &self.animator, location)
    }

    fn select(&mut self, highlights: Vec<Highlight>) {
        self.highlights = highlights;
        let Some(delegate) = self.delegate.as_mut() else {
            return;
        };
        if self.highlights.is_empty() {
            delegate.nothing_selected();
        } else {
            delegate.value_selected(&self.highlights);
        }
    }
}

fn union(a: Range, b: Range) -> Range {
    Range::new(a.min.min(b.min), a.max.max(b.max))
}

/// Builder for configuring a chart before construction.
#[derive(Default)]
pub struct ChartBuilder {
    bounds: Option<ScreenRect>,
    config: ChartConfig,
    renderer: Option<Box<dyn DataRenderer>>,
    data_sets: Vec<DataSet>,
    viewport: Option<Viewport>,
    delegate: Option<Box<dyn ChartDelegate>>,
}

impl ChartBuilder {
    /// Set the pixel area the chart draws into.
    pub fn bounds(mut self, bounds: ScreenRect) -> Self {
        self.bounds = Some(bounds);
        self
    }

    pub fn config(mut self, config: ChartConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the rendering strategy. Defaults to a plain [`LineRenderer`].
    pub fn renderer(mut self, renderer: impl DataRenderer + 'static) -> Self {
        self.renderer = Some(Box::new(renderer));
        self
    }

    /// Add a data set to the chart.
    pub fn data_set(mut self, data_set: DataSet) -> Self {
        self.data_sets.push(data_set);
        self
    }

    /// Fix the viewport instead of fitting it to the data.
    pub fn viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = Some(viewport);
        self
    }

    pub fn delegate(mut self, delegate: impl ChartDelegate + 'static) -> Self {
        self.delegate = Some(Box::new(delegate));
        self
    }

    /// Build the chart. Bounds default to an empty rectangle, which draws
    /// nothing until set.
    pub fn build(self) -> LineChart {
        let bounds = self
            .bounds
            .unwrap_or_else(|| ScreenRect::from_size(0.0, 0.0));
        let renderer = self
            .renderer
            .unwrap_or_else(|| Box::new(LineRenderer::new()));
        let mut chart = LineChart::with_config(bounds, renderer, self.config);
        chart.data_sets = self.data_sets;
        chart.viewport = self.viewport;
        chart.delegate = self.delegate;
        chart
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    use super::*;
    use crate::geom::Point;
    use crate::gesture::{GesturePhase, RecognizerState, Touch};

    #[derive(Clone, Default)]
    struct Recorder(Rc<RefCell<Vec<String>>>);

    impl Recorder {
        fn take(&self) -> Vec<String> {
            std::mem::take(&mut *self.0.borrow_mut())
        }
    }

    impl ChartDelegate for Recorder {
        fn value_selected(&mut self, highlights: &[Highlight]) {
            let xs: Vec<String> = highlights.iter().map(|h| h.x.to_string()).collect();
            self.0.borrow_mut().push(format!("selected {}", xs.join(",")));
        }

        fn nothing_selected(&mut self) {
            self.0.borrow_mut().push("nothing".to_owned());
        }

        fn interaction_ended(&mut self) {
            self.0.borrow_mut().push("ended".to_owned());
        }
    }

    fn chart(recorder: &Recorder) -> LineChart {
        LineChart::builder()
            .bounds(ScreenRect::from_size(100.0, 100.0))
            .viewport(Viewport::new(Range::new(0.0, 10.0), Range::new(0.0, 10.0)))
            .data_set(DataSet::from_iter_points(
                "series",
                [Point::new(0.0, 1.0), Point::new(5.0, 2.0), Point::new(10.0, 3.0)],
            ))
            .delegate(recorder.clone())
            .build()
    }

    #[test]
    fn one_then_two_touches_drive_highlights() {
        let start = Instant::now();
        let recorder = Recorder::default();
        let mut chart = chart(&recorder);

        let updates = chart.handle_touch(&TouchEvent::Began(vec![Touch::new(1, 48.0, 50.0)]), start);
        assert!(updates.is_empty());
        assert!(chart.highlights().is_empty());

        let update = chart.tick(start + Duration::from_millis(100)).expect("promotion");
        assert_eq!(update.intent, GestureIntent::OneTouch(TouchId(1)));
        assert_eq!(chart.highlights().len(), 1);
        assert_eq!(chart.highlights()[0].x, 5.0);

        chart.handle_touch(
            &TouchEvent::Began(vec![Touch::new(2, 98.0, 50.0)]),
            start + Duration::from_millis(200),
        );
        let xs: Vec<f64> = chart.highlights().iter().map(|h| h.x).collect();
        assert_eq!(xs, vec![5.0, 10.0]);

        let updates = chart.handle_touch(
            &TouchEvent::Ended(vec![Touch::new(1, 48.0, 50.0), Touch::new(2, 98.0, 50.0)]),
            start + Duration::from_millis(300),
        );
        assert_eq!(updates[0].state, RecognizerState::Ended);
        assert!(chart.highlights().is_empty());
        assert_eq!(chart.recognizer().phase(), GesturePhase::Idle);
        assert_eq!(
            recorder.take(),
            vec!["selected 5", "selected 5,10", "ended"]
        );
    }

    #[test]
    fn failed_gesture_clears_and_notifies() {
        let start = Instant::now();
        let recorder = Recorder::default();
        let mut chart = chart(&recorder);
        chart.highlight_values(vec![Highlight {
            data_set_index: 0,
            entry_index: 0,
            x: 0.0,
            y: 1.0,
            draw_x: 0.0,
            draw_y: 90.0,
        }]);

        chart.handle_touch(&TouchEvent::Began(vec![Touch::new(1, 10.0, 10.0)]), start);
        let updates = chart.handle_touch(
            &TouchEvent::Moved(vec![Touch::new(1, 30.0, 10.0)]),
            start + Duration::from_millis(20),
        );
        assert_eq!(updates[0].state, RecognizerState::Failed);
        assert!(chart.highlights().is_empty());
        assert!(chart.pending_promotion().is_none());
        assert_eq!(recorder.take(), vec!["ended"]);
    }

    #[test]
    fn touch_on_hidden_data_reports_nothing_selected() {
        let start = Instant::now();
        let recorder = Recorder::default();
        let mut chart = chart(&recorder);
        chart.data_sets_mut()[0].set_visible(false);
        chart.handle_touch(&TouchEvent::Began(vec![Touch::new(1, 10.0, 10.0)]), start);
        let token = chart.pending_promotion().expect("scheduled");
        chart.fire_promotion(token).expect("promotion");
        assert!(chart.highlights().is_empty());
        assert_eq!(recorder.take(), vec!["nothing"]);
    }

    #[test]
    fn viewport_fits_data_with_padding() {
        let mut chart = LineChart::gradient(GradientColors::default(), 100.0, 50.0);
        assert!(chart.viewport().is_none());
        assert!(chart.render().is_some());

        chart.add_data_set(DataSet::from_iter_points(
            "a",
            [Point::new(0.0, 0.0), Point::new(10.0, 20.0)],
        ));
        let viewport = chart.viewport().expect("viewport");
        assert!((viewport.x.min + 0.5).abs() < 1e-9);
        assert!((viewport.x.max - 10.5).abs() < 1e-9);
        assert!((viewport.y.min + 1.0).abs() < 1e-9);
        assert!((viewport.y.max - 21.0).abs() < 1e-9);
    }

    #[test]
    fn render_without_bounds_yields_nothing() {
        let mut chart = LineChart::builder().build();
        assert!(chart.render().is_none());
    }
}
