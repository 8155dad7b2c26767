#![forbid(unsafe_code)]

//! Client-space geometry in CSS pixels.

/// Axis-aligned rectangle in client (viewport) coordinates, as returned by
/// `getBoundingClientRect()`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    #[must_use]
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Vertical midpoint.
    #[must_use]
    pub fn mid_y(&self) -> f64 {
        self.top + self.height / 2.0
    }
}

/// Visible window size (`innerWidth` x `innerHeight`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Scroll state of whatever is scrolling: the window or a container element.
///
/// `viewport_top` is the top edge of the scrolling box in client coordinates
/// (always 0 for the window). Section rectangles are compared against this
/// box, so both scroll sources share one code path.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollFrame {
    pub viewport_top: f64,
    pub viewport_height: f64,
    pub scroll_top: f64,
    pub scroll_height: f64,
}

/// Slack when deciding the frame is scrolled all the way down. Browsers
/// report fractional offsets on zoomed pages.
pub const BOTTOM_TOLERANCE_PX: f64 = 2.0;

impl ScrollFrame {
    /// Reference point for nearest-centre selection, in client coordinates.
    #[must_use]
    pub fn center_y(&self) -> f64 {
        self.viewport_top + self.viewport_height / 2.0
    }

    #[must_use]
    pub fn is_at_bottom(&self) -> bool {
        self.scroll_top + self.viewport_height >= self.scroll_height - BOTTOM_TOLERANCE_PX
    }

    /// Top of `rect` measured from the top of the scrolling box.
    #[must_use]
    pub fn relative_top(&self, rect: &Rect) -> f64 {
        rect.top - self.viewport_top
    }
}
