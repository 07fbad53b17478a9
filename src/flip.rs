//! The page-flip engine seam. The viewer never animates or bounds-
//! checks a turn itself: it requests flips, and the engine — whichever
//! implementation is attached — owns the animation clock, the boundary
//! clamping, and its own spread index, reporting landings through
//! [`FlipEvent::Completed`].

use std::time::{Duration, Instant};

use crate::layout::BookGeometry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipEvent {
    /// A turn finished; `spread` is the engine's new 0-based index.
    Completed { spread: usize },
}

/// What the renderer should show right now.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlipFrame {
    Resting { spread: usize },
    Turning { from: usize, to: usize, progress: f32 },
}

pub trait FlipEngine {
    /// Installs a new spread count and rewinds to the first spread.
    fn load(&mut self, spread_count: usize);

    fn set_geometry(&mut self, geometry: BookGeometry);

    /// Requests a one-spread turn backward. Ignored mid-turn or at the
    /// first spread.
    fn flip_prev(&mut self, now: Instant);

    /// Requests a one-spread turn forward. Ignored mid-turn or at the
    /// last spread.
    fn flip_next(&mut self, now: Instant);

    /// Requests an animated jump to an arbitrary spread; the target is
    /// clamped to the loaded range.
    fn jump(&mut self, spread: usize, now: Instant);

    fn frame(&self, now: Instant) -> FlipFrame;

    /// Advances the engine clock, returning a completion event when a
    /// turn lands.
    fn advance(&mut self, now: Instant) -> Option<FlipEvent>;

    /// When the in-flight turn (if any) will land.
    fn next_deadline(&self) -> Option<Instant>;
}

#[derive(Debug, Clone, Copy)]
struct Turn {
    target: usize,
    started: Instant,
}

/// Default engine: a fixed-duration page turn.
#[derive(Debug)]
pub struct TurnAnimator {
    spread_count: usize,
    current: usize,
    duration: Duration,
    geometry: Option<BookGeometry>,
    turn: Option<Turn>,
}

impl TurnAnimator {
    pub const fn new(duration: Duration) -> Self {
        Self {
            spread_count: 0,
            current: 0,
            duration,
            geometry: None,
            turn: None,
        }
    }

    pub const fn geometry(&self) -> Option<BookGeometry> {
        self.geometry
    }

    fn start_turn(&mut self, target: usize, now: Instant) {
        self.turn = Some(Turn {
            target,
            started: now,
        });
    }
}

impl FlipEngine for TurnAnimator {
    fn load(&mut self, spread_count: usize) {
        self.spread_count = spread_count;
        self.current = 0;
        self.turn = None;
    }

    fn set_geometry(&mut self, geometry: BookGeometry) {
        self.geometry = Some(geometry);
    }

    fn flip_prev(&mut self, now: Instant) {
        if self.turn.is_some() || self.current == 0 {
            return;
        }
        self.start_turn(self.current - 1, now);
    }

    fn flip_next(&mut self, now: Instant) {
        if self.turn.is_some() || self.current + 1 >= self.spread_count {
            return;
        }
        self.start_turn(self.current + 1, now);
    }

    fn jump(&mut self, spread: usize, now: Instant) {
        if self.turn.is_some() || self.spread_count == 0 {
            return;
        }
        let target = spread.min(self.spread_count - 1);
        if target != self.current {
            self.start_turn(target, now);
        }
    }

    fn frame(&self, now: Instant) -> FlipFrame {
        match self.turn {
            Some(turn) => {
                let progress = if self.duration.is_zero() {
                    1.0
                } else {
                    (now.saturating_duration_since(turn.started).as_secs_f32()
                        / self.duration.as_secs_f32())
                    .clamp(0.0, 1.0)
                };
                FlipFrame::Turning {
                    from: self.current,
                    to: turn.target,
                    progress,
                }
            }
            None => FlipFrame::Resting {
                spread: self.current,
            },
        }
    }

    fn advance(&mut self, now: Instant) -> Option<FlipEvent> {
        let turn = self.turn?;
        if now.saturating_duration_since(turn.started) < self.duration {
            return None;
        }
        self.current = turn.target;
        self.turn = None;
        Some(FlipEvent::Completed {
            spread: self.current,
        })
    }

    fn next_deadline(&self) -> Option<Instant> {
        self.turn.map(|turn| turn.started + self.duration)
    }
}

#[cfg(test)]
mod tests {
    use {super::*, assert2::check as assert};

    const DURATION: Duration = Duration::from_millis(200);

    fn engine(spreads: usize) -> TurnAnimator {
        let mut engine = TurnAnimator::new(DURATION);
        engine.load(spreads);
        engine
    }

    #[test]
    fn test_flip_next_completes_with_new_index() {
        let now = Instant::now();
        let mut engine = engine(5);
        engine.flip_next(now);

        assert!(engine.advance(now) == None);
        let event = engine.advance(now + DURATION);
        assert!(event == Some(FlipEvent::Completed { spread: 1 }));
        assert!(engine.frame(now + DURATION) == FlipFrame::Resting { spread: 1 });
    }

    #[test]
    fn test_boundary_enforcement() {
        let now = Instant::now();
        let mut engine = engine(2);

        // Backward at the first spread is ignored.
        engine.flip_prev(now);
        assert!(engine.next_deadline().is_none());

        engine.flip_next(now);
        engine.advance(now + DURATION);

        // Forward at the last spread is ignored.
        engine.flip_next(now + DURATION);
        assert!(engine.next_deadline().is_none());
    }

    #[test]
    fn test_requests_ignored_mid_turn() {
        let now = Instant::now();
        let mut engine = engine(5);
        engine.flip_next(now);
        engine.flip_next(now + DURATION / 2);

        let event = engine.advance(now + DURATION);
        assert!(event == Some(FlipEvent::Completed { spread: 1 }));
        assert!(engine.advance(now + 2 * DURATION).is_none());
    }

    #[test]
    fn test_empty_book_ignores_everything() {
        let now = Instant::now();
        let mut engine = engine(0);
        engine.flip_next(now);
        engine.flip_prev(now);
        engine.jump(3, now);
        assert!(engine.advance(now + DURATION).is_none());
        assert!(engine.frame(now) == FlipFrame::Resting { spread: 0 });
    }

    #[test]
    fn test_jump_clamps_to_range() {
        let now = Instant::now();
        let mut engine = engine(4);
        engine.jump(99, now);
        let event = engine.advance(now + DURATION);
        assert!(event == Some(FlipEvent::Completed { spread: 3 }));
    }

    #[test]
    fn test_load_rewinds() {
        let now = Instant::now();
        let mut engine = engine(5);
        engine.flip_next(now);
        engine.advance(now + DURATION);
        engine.load(3);
        assert!(engine.frame(now + DURATION) == FlipFrame::Resting { spread: 0 });
    }

    #[test]
    fn test_turn_progress_is_clamped() {
        let now = Instant::now();
        let mut engine = engine(5);
        engine.flip_next(now);
        match engine.frame(now + 10 * DURATION) {
            FlipFrame::Turning { progress, .. } => {
                assert!(progress == 1.0);
            }
            FlipFrame::Resting { .. } => unreachable!(),
        }
    }
}
