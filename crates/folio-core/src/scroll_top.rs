#![forbid(unsafe_code)]

//! Scroll-to-top control visibility.

/// Scroll offset past which the control appears.
pub const DEFAULT_THRESHOLD_PX: f64 = 300.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Hidden,
    Visible,
}

impl Visibility {
    /// Inline `opacity` value for the control.
    #[must_use]
    pub const fn opacity(self) -> &'static str {
        match self {
            Self::Hidden => "0",
            Self::Visible => "1",
        }
    }
}

/// Threshold comparison for the scroll-to-top control. Stateless: the host
/// re-evaluates on every window scroll event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollToTop {
    threshold: f64,
}

impl Default for ScrollToTop {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD_PX)
    }
}

impl ScrollToTop {
    #[must_use]
    pub const fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    #[must_use]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Hidden up to and including the threshold, visible strictly past it.
    #[must_use]
    pub fn visibility(&self, scroll_y: f64) -> Visibility {
        if scroll_y > self.threshold {
            Visibility::Visible
        } else {
            Visibility::Hidden
        }
    }
}
