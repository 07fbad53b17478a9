//! Manual zoom state, independent of the layout controller's
//! auto-scale but consulted by it so a resize never clobbers a
//! deliberate zoom level.

pub const ZOOM_STEP: f32 = 0.1;
pub const MIN_SCALE: f32 = 0.5;
pub const MAX_SCALE: f32 = 2.2;

#[derive(Debug, Clone, Copy)]
pub struct Zoom {
    scale: f32,
    manual: bool,
}

impl Default for Zoom {
    fn default() -> Self {
        Self {
            scale: 1.0,
            manual: false,
        }
    }
}

impl Zoom {
    pub const fn scale(&self) -> f32 {
        self.scale
    }

    /// True once the user has adjusted the scale away from 1.0.
    pub const fn is_manual(&self) -> bool {
        self.manual
    }

    pub fn can_zoom_in(&self) -> bool {
        self.scale < MAX_SCALE
    }

    pub fn can_zoom_out(&self) -> bool {
        self.scale > MIN_SCALE
    }

    /// One step in. Returns false (and leaves the scale untouched)
    /// when already at the ceiling; callers report that as a disabled
    /// control, not an error.
    pub fn zoom_in(&mut self) -> bool {
        if !self.can_zoom_in() {
            return false;
        }
        self.set_manual(self.scale + ZOOM_STEP);
        true
    }

    /// One step out; same contract as [`Zoom::zoom_in`] at the floor.
    pub fn zoom_out(&mut self) -> bool {
        if !self.can_zoom_out() {
            return false;
        }
        self.set_manual(self.scale - ZOOM_STEP);
        true
    }

    /// Applies the layout controller's auto-scale. Skipped while a
    /// manual zoom is in effect; never marks the zoom as manual.
    pub fn apply_auto(&mut self, auto_scale: f32) {
        if !self.manual {
            self.scale = clamp_scale(round2(auto_scale));
        }
    }

    pub fn reset(&mut self) {
        self.scale = 1.0;
        self.manual = false;
    }

    fn set_manual(&mut self, scale: f32) {
        self.scale = clamp_scale(round2(scale));
        self.manual = (self.scale - 1.0).abs() > f32::EPSILON;
    }
}

fn round2(value: f32) -> f32 {
    (value * 100.0).round() / 100.0
}

fn clamp_scale(value: f32) -> f32 {
    value.clamp(MIN_SCALE, MAX_SCALE)
}

#[cfg(test)]
mod tests {
    use {super::*, assert2::check as assert};

    #[test]
    fn test_steps_are_rounded_to_two_decimals() {
        let mut zoom = Zoom::default();
        zoom.zoom_in();
        assert!(zoom.scale() == 1.1);
        zoom.zoom_in();
        assert!(zoom.scale() == 1.2);
        zoom.zoom_out();
        zoom.zoom_out();
        assert!(zoom.scale() == 1.0);
    }

    #[test]
    fn test_scale_always_clamped() {
        let mut zoom = Zoom::default();
        for _ in 0..50 {
            zoom.zoom_in();
        }
        assert!(zoom.scale() == MAX_SCALE);
        for _ in 0..50 {
            zoom.zoom_out();
        }
        assert!(zoom.scale() == MIN_SCALE);
    }

    #[test]
    fn test_zoom_in_at_ceiling_is_noop() {
        let mut zoom = Zoom::default();
        while zoom.zoom_in() {}
        assert!(!zoom.can_zoom_in());
        let before = zoom.scale();
        assert!(!zoom.zoom_in());
        assert!(zoom.scale() == before);
    }

    #[test]
    fn test_zoom_out_at_floor_is_noop() {
        let mut zoom = Zoom::default();
        while zoom.zoom_out() {}
        assert!(!zoom.can_zoom_out());
        assert!(!zoom.zoom_out());
        assert!(zoom.scale() == MIN_SCALE);
    }

    #[test]
    fn test_manual_flag_tracks_departure_from_unity() {
        let mut zoom = Zoom::default();
        assert!(!zoom.is_manual());
        zoom.zoom_in();
        assert!(zoom.is_manual());
        zoom.zoom_out();
        assert!(!zoom.is_manual());
    }

    #[test]
    fn test_auto_scale_skipped_while_manual() {
        let mut zoom = Zoom::default();
        zoom.zoom_in();
        zoom.zoom_in();
        zoom.apply_auto(1.0);
        assert!(zoom.scale() == 1.2);
    }

    #[test]
    fn test_auto_scale_applies_when_not_manual() {
        let mut zoom = Zoom::default();
        zoom.apply_auto(0.87);
        assert!(zoom.scale() == 0.87);
        assert!(!zoom.is_manual());
    }

    #[test]
    fn test_reset_clears_manual() {
        let mut zoom = Zoom::default();
        zoom.zoom_in();
        zoom.reset();
        assert!(zoom.scale() == 1.0);
        assert!(!zoom.is_manual());
    }
}
