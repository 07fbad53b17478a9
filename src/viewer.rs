//! The viewer state machine. Owns the spreads, the layout controller,
//! zoom, autoplay, and the attached flip engine; every control path
//! funnels through here so the states cannot corrupt one another.
//!
//! Index discipline: the only writer of `current_spread` is the
//! flip-engine completion event, except for the reset to 0 whenever
//! spreads are recomputed.

use std::time::{Duration, Instant};

use crate::{
    autoplay::{Autoplay, AutoplayState},
    flip::{FlipEngine, FlipEvent, FlipFrame},
    layout::{BookGeometry, LayoutController, Viewport},
    library::Document,
    spread::{self, LayoutMode, Spread},
    zoom::Zoom,
};

pub struct Viewer<E> {
    document: Document,
    layout: LayoutController,
    spreads: Vec<Spread>,
    current_spread: usize,
    zoom: Zoom,
    autoplay: Autoplay,
    engine: Option<E>,
}

impl<E: FlipEngine> Viewer<E> {
    pub fn new(document: Document, viewport: Viewport, autoplay_interval: Duration) -> Self {
        let layout = LayoutController::new(viewport);
        let mut viewer = Self {
            document,
            layout,
            spreads: Vec::new(),
            current_spread: 0,
            zoom: Zoom::default(),
            autoplay: Autoplay::new(autoplay_interval),
            engine: None,
        };
        viewer.rebuild_spreads();
        viewer.zoom.apply_auto(viewer.layout.geometry().scale);
        viewer
    }

    /// Attaches the flip engine. Navigation before this point is a
    /// silent no-op.
    pub fn attach_engine(&mut self, mut engine: E) {
        engine.load(self.spreads.len());
        engine.set_geometry(self.layout.geometry());
        self.engine = Some(engine);
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn title(&self) -> &str {
        self.document.title()
    }

    pub fn is_empty(&self) -> bool {
        self.spreads.is_empty()
    }

    pub fn spreads(&self) -> &[Spread] {
        &self.spreads
    }

    pub fn spread_count(&self) -> usize {
        self.spreads.len()
    }

    pub fn page_count(&self) -> usize {
        self.document.page_count()
    }

    pub const fn current_spread(&self) -> usize {
        self.current_spread
    }

    pub fn current(&self) -> Option<&Spread> {
        self.spreads.get(self.current_spread)
    }

    pub const fn mode(&self) -> LayoutMode {
        self.layout.mode()
    }

    pub const fn viewport(&self) -> Viewport {
        self.layout.viewport()
    }

    pub const fn geometry(&self) -> BookGeometry {
        self.layout.geometry()
    }

    pub fn title_band_height(&self) -> f32 {
        self.layout.title_band_height()
    }

    pub const fn zoom(&self) -> &Zoom {
        &self.zoom
    }

    pub const fn scale(&self) -> f32 {
        self.zoom.scale()
    }

    pub const fn autoplay(&self) -> &Autoplay {
        &self.autoplay
    }

    pub fn page_label(&self) -> String {
        spread::page_label(self.current_spread, self.mode(), self.page_count())
    }

    fn rebuild_spreads(&mut self) {
        // Wholesale recomputation; there is no stable position mapping
        // between Single and Double spread indices, so the position is
        // deliberately not preserved.
        self.spreads = spread::compute_spreads(self.document.pages(), self.layout.mode());
        self.current_spread = 0;
        if let Some(engine) = &mut self.engine {
            engine.load(self.spreads.len());
            engine.set_geometry(self.layout.geometry());
        }
    }

    /// Handles a viewport change: geometry and auto-scale are always
    /// recomputed; spreads only when the device class crossing changed
    /// the layout mode.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        let mode_changed = self.layout.set_viewport(viewport);
        self.zoom.apply_auto(self.layout.geometry().scale);
        if mode_changed {
            log::debug!("breakpoint crossing, layout mode now {:?}", self.mode());
            self.rebuild_spreads();
        } else if let Some(engine) = &mut self.engine {
            engine.set_geometry(self.layout.geometry());
        }
    }

    pub fn toggle_layout_mode(&mut self) -> LayoutMode {
        let mode = self.layout.toggle_mode();
        self.rebuild_spreads();
        mode
    }

    pub fn set_layout_mode(&mut self, mode: LayoutMode) {
        if self.layout.set_mode(mode) {
            self.rebuild_spreads();
        }
    }

    /// Swaps in a new page sequence; spreads recompute and the index
    /// resets to 0.
    pub fn replace_document(&mut self, document: Document) {
        self.document = document;
        self.rebuild_spreads();
    }

    pub fn prev(&mut self, now: Instant) {
        if let Some(engine) = &mut self.engine {
            engine.flip_prev(now);
        }
    }

    pub fn next(&mut self, now: Instant) {
        if let Some(engine) = &mut self.engine {
            engine.flip_next(now);
        }
    }

    pub fn jump_to(&mut self, spread: usize, now: Instant) {
        if let Some(engine) = &mut self.engine {
            engine.jump(spread, now);
        }
    }

    pub fn zoom_in(&mut self) -> bool {
        self.zoom.zoom_in()
    }

    pub fn zoom_out(&mut self) -> bool {
        self.zoom.zoom_out()
    }

    pub fn can_zoom_in(&self) -> bool {
        self.zoom.can_zoom_in()
    }

    pub fn can_zoom_out(&self) -> bool {
        self.zoom.can_zoom_out()
    }

    pub fn reset_zoom(&mut self) {
        self.zoom.reset();
        self.zoom.apply_auto(self.layout.geometry().scale);
    }

    pub fn toggle_autoplay(&mut self, now: Instant) -> AutoplayState {
        let state = self.autoplay.toggle(now);
        log::debug!("autoplay {state:?}");
        state
    }

    pub fn stop_autoplay(&mut self) {
        self.autoplay.stop();
    }

    pub fn set_autoplay_interval(&mut self, interval: Duration, now: Instant) {
        self.autoplay.set_interval(interval, now);
    }

    /// Drives the time-based state; call once per event-loop turn.
    /// Returns true when the presentation changed. An autoplay tick
    /// that cannot flip (no engine, boundary) is swallowed and the
    /// cadence continues.
    pub fn pump(&mut self, now: Instant) -> bool {
        let mut changed = false;

        if self.autoplay.tick(now) {
            self.next(now);
            changed = true;
        }

        if let Some(engine) = &mut self.engine
            && let Some(FlipEvent::Completed { spread }) = engine.advance(now)
        {
            self.current_spread = spread;
            changed = true;
        }

        changed
    }

    pub fn frame(&self, now: Instant) -> FlipFrame {
        self.engine
            .as_ref()
            .map_or(
                FlipFrame::Resting {
                    spread: self.current_spread,
                },
                |engine| engine.frame(now),
            )
    }

    /// How long the event loop may sleep before time-based state needs
    /// attention again.
    pub fn poll_deadline(&self, now: Instant) -> Option<Duration> {
        let autoplay = self.autoplay.time_until_tick(now);
        let flip = self
            .engine
            .as_ref()
            .and_then(FlipEngine::next_deadline)
            .map(|deadline| deadline.saturating_duration_since(now));
        match (autoplay, flip) {
            (Some(a), Some(f)) => Some(a.min(f)),
            (a, f) => a.or(f),
        }
    }
}
