//! Responsive book geometry. The terminal window is the viewport:
//! cells map to device-independent pixels at 12x24 px per cell, and
//! the book's width, height, and display scale are recomputed from it
//! on every resize.

use crate::spread::LayoutMode;

pub const CELL_PIXEL_WIDTH: f32 = 12.0;
pub const CELL_PIXEL_HEIGHT: f32 = 24.0;

/// Below this viewport width the device class is Compact.
pub const COMPACT_BREAKPOINT: f32 = 700.0;

const WIDE_BOOK_MAX_WIDTH: f32 = 820.0;
const WIDE_HORIZONTAL_MARGIN: f32 = 120.0;
const WIDE_OVERFLOW_MARGIN: f32 = 80.0;
const WIDE_ASPECT: f32 = 0.68;

const COMPACT_WIDTH_FRACTION: f32 = 0.92;
const COMPACT_HEIGHT_FRACTION: f32 = 0.82;
const COMPACT_MAX_ASPECT: f32 = 1.4;

const TITLE_BAND_COMPACT: f32 = 34.0;
const TITLE_BAND_WIDE: f32 = 44.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn from_cells(cols: u16, rows: u16) -> Self {
        Self {
            width: f32::from(cols) * CELL_PIXEL_WIDTH,
            height: f32::from(rows) * CELL_PIXEL_HEIGHT,
        }
    }

    pub fn device_class(&self) -> DeviceClass {
        if self.width < COMPACT_BREAKPOINT {
            DeviceClass::Compact
        } else {
            DeviceClass::Wide
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceClass {
    Compact,
    Wide,
}

impl DeviceClass {
    /// The automatic layout choice for this class.
    pub const fn default_mode(self) -> LayoutMode {
        match self {
            Self::Compact => LayoutMode::Single,
            Self::Wide => LayoutMode::Double,
        }
    }
}

/// Derived render geometry. Never stored authoritatively; recomputed
/// from the viewport on every relevant change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BookGeometry {
    pub width: f32,
    pub height: f32,
    pub scale: f32,
}

pub fn book_geometry(viewport: Viewport) -> BookGeometry {
    match viewport.device_class() {
        DeviceClass::Compact => {
            let width = viewport.width * COMPACT_WIDTH_FRACTION;
            let height = (viewport.height * COMPACT_HEIGHT_FRACTION).min(COMPACT_MAX_ASPECT * width);
            BookGeometry {
                width,
                height,
                scale: 1.0,
            }
        }
        DeviceClass::Wide => {
            let width = WIDE_BOOK_MAX_WIDTH.min(viewport.width - WIDE_HORIZONTAL_MARGIN);
            let height = WIDE_ASPECT * width;
            // Never let the book overflow the viewport horizontally.
            let scale = ((viewport.width - WIDE_OVERFLOW_MARGIN) / width).min(1.0);
            BookGeometry {
                width,
                height,
                scale,
            }
        }
    }
}

/// Pixel height reserved for the title element above the book.
pub fn title_band_height(viewport: Viewport) -> f32 {
    match viewport.device_class() {
        DeviceClass::Compact => TITLE_BAND_COMPACT,
        DeviceClass::Wide => TITLE_BAND_WIDE,
    }
}

/// Owns the layout mode and its auto/manual precedence: a manual
/// toggle wins until the next breakpoint crossing, and every crossing
/// re-applies the automatic choice for the new device class.
#[derive(Debug)]
pub struct LayoutController {
    viewport: Viewport,
    device_class: DeviceClass,
    mode: LayoutMode,
    manual_override: bool,
    geometry: BookGeometry,
}

impl LayoutController {
    pub fn new(viewport: Viewport) -> Self {
        let device_class = viewport.device_class();
        Self {
            viewport,
            device_class,
            mode: device_class.default_mode(),
            manual_override: false,
            geometry: book_geometry(viewport),
        }
    }

    pub const fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub const fn device_class(&self) -> DeviceClass {
        self.device_class
    }

    pub const fn mode(&self) -> LayoutMode {
        self.mode
    }

    pub const fn is_manual(&self) -> bool {
        self.manual_override
    }

    pub const fn geometry(&self) -> BookGeometry {
        self.geometry
    }

    pub fn title_band_height(&self) -> f32 {
        title_band_height(self.viewport)
    }

    /// Applies a viewport change. Returns true when the layout mode
    /// changed and spreads must be recomputed.
    pub fn set_viewport(&mut self, viewport: Viewport) -> bool {
        self.viewport = viewport;
        self.geometry = book_geometry(viewport);

        let class = viewport.device_class();
        if class == self.device_class {
            return false;
        }

        self.device_class = class;
        self.manual_override = false;
        let auto = class.default_mode();
        if auto == self.mode {
            return false;
        }
        self.mode = auto;
        true
    }

    /// User-initiated layout toggle. Wins over the automatic choice
    /// until the next breakpoint crossing.
    pub fn toggle_mode(&mut self) -> LayoutMode {
        self.manual_override = true;
        self.mode = self.mode.toggled();
        self.mode
    }

    /// Sets an explicit mode (manual, same precedence as a toggle).
    /// Returns true when the mode changed.
    pub fn set_mode(&mut self, mode: LayoutMode) -> bool {
        self.manual_override = true;
        if mode == self.mode {
            return false;
        }
        self.mode = mode;
        true
    }
}

#[cfg(test)]
mod tests {
    use {super::*, assert2::check as assert};

    #[test]
    fn test_breakpoint_classes() {
        assert!(Viewport::new(500.0, 900.0).device_class() == DeviceClass::Compact);
        assert!(Viewport::new(699.9, 900.0).device_class() == DeviceClass::Compact);
        assert!(Viewport::new(700.0, 900.0).device_class() == DeviceClass::Wide);
    }

    #[test]
    fn test_compact_viewport_forces_single() {
        let ctl = LayoutController::new(Viewport::new(500.0, 800.0));
        assert!(ctl.mode() == LayoutMode::Single);
    }

    #[test]
    fn test_compact_sizing() {
        let g = book_geometry(Viewport::new(500.0, 800.0));
        assert!((g.width - 460.0).abs() < 0.01);
        // 82% of 800 = 656, capped by 1.4 * width = 644.
        assert!((g.height - 644.0).abs() < 0.01);
        assert!(g.scale == 1.0);
    }

    #[test]
    fn test_compact_short_viewport_uses_height_fraction() {
        let g = book_geometry(Viewport::new(500.0, 600.0));
        assert!((g.height - 492.0).abs() < 0.01);
    }

    #[test]
    fn test_wide_sizing_caps_book_width() {
        let g = book_geometry(Viewport::new(1920.0, 1080.0));
        assert!(g.width == 820.0);
        assert!((g.height - 0.68 * 820.0).abs() < 0.01);
        assert!(g.scale == 1.0);
    }

    #[test]
    fn test_wide_sizing_narrow_viewport() {
        let g = book_geometry(Viewport::new(800.0, 600.0));
        assert!((g.width - 680.0).abs() < 0.01);
        assert!(g.scale <= 1.0);
    }

    #[test]
    fn test_from_cells_pixel_mapping() {
        let vp = Viewport::from_cells(80, 24);
        assert!(vp.width == 960.0);
        assert!(vp.height == 576.0);
        assert!(vp.device_class() == DeviceClass::Wide);
    }

    #[test]
    fn test_crossing_reapplies_auto_mode() {
        let mut ctl = LayoutController::new(Viewport::new(1000.0, 800.0));
        assert!(ctl.mode() == LayoutMode::Double);

        let changed = ctl.set_viewport(Viewport::new(500.0, 800.0));
        assert!(changed);
        assert!(ctl.mode() == LayoutMode::Single);
        assert!(!ctl.is_manual());
    }

    #[test]
    fn test_manual_toggle_wins_within_class() {
        let mut ctl = LayoutController::new(Viewport::new(1000.0, 800.0));
        ctl.toggle_mode();
        assert!(ctl.mode() == LayoutMode::Single);

        // Resizing within the same class keeps the manual choice.
        let changed = ctl.set_viewport(Viewport::new(1400.0, 900.0));
        assert!(!changed);
        assert!(ctl.mode() == LayoutMode::Single);
        assert!(ctl.is_manual());
    }

    #[test]
    fn test_crossing_clears_manual_override() {
        let mut ctl = LayoutController::new(Viewport::new(1000.0, 800.0));
        ctl.toggle_mode();
        assert!(ctl.is_manual());

        ctl.set_viewport(Viewport::new(500.0, 800.0));
        assert!(!ctl.is_manual());
        assert!(ctl.mode() == LayoutMode::Single);

        // Crossing back re-applies the wide default.
        let changed = ctl.set_viewport(Viewport::new(1000.0, 800.0));
        assert!(changed);
        assert!(ctl.mode() == LayoutMode::Double);
    }

    #[test]
    fn test_title_band_tracks_device_class() {
        assert!(title_band_height(Viewport::new(500.0, 800.0)) < title_band_height(Viewport::new(1000.0, 800.0)));
    }
}
