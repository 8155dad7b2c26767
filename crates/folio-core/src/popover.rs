#![forbid(unsafe_code)]

//! Tech-logo popover: content, placement, and the single-instance controller.
//!
//! The controller only knows whether a popover is mounted; building and
//! tearing down the actual overlay is delegated to a [`PopoverSurface`].
//! Opening always closes first, so at most one popover exists at a time.

use serde::Deserialize;
use tracing::debug;

use crate::geometry::{Rect, Viewport};

// ---------------------------------------------------------------------------
// Content
// ---------------------------------------------------------------------------

/// Text shown in a popover.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PopoverContent {
    /// Bold heading; the logo's accessible label.
    pub title: String,
    /// Body text.
    pub description: String,
}

impl PopoverContent {
    /// Build content from a logo's `alt` and `data-desc` attributes.
    ///
    /// The description falls back to the label, then to an empty string.
    /// Empty attributes count as absent.
    #[must_use]
    pub fn from_logo(alt: Option<&str>, data_desc: Option<&str>) -> Self {
        let alt = alt.filter(|s| !s.is_empty()).unwrap_or_default();
        let description = data_desc.filter(|s| !s.is_empty()).unwrap_or(alt);
        Self {
            title: alt.to_owned(),
            description: description.to_owned(),
        }
    }
}

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

/// Keys that open a popover from a focused logo.
#[must_use]
pub fn is_activation_key(key: &str) -> bool {
    matches!(key, "Enter" | " ")
}

#[must_use]
pub fn is_dismiss_key(key: &str) -> bool {
    key == "Escape"
}

/// Why a popover was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DismissReason {
    Escape,
    OverlayClick,
    CloseButton,
    /// Replaced by a newly opened popover.
    Replaced,
}

// ---------------------------------------------------------------------------
// Placement
// ---------------------------------------------------------------------------

/// Mobile presentation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum MobileLayout {
    /// Full-width sheet pinned to the bottom of the viewport (sized by CSS).
    #[default]
    BottomSheet,
    /// Panel centred in the viewport.
    #[serde(rename_all = "camelCase")]
    Centered { width_fraction: f64, max_width: f64 },
}

/// Popover sizing and placement knobs.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlacementConfig {
    /// Horizontal gap between the logo and the panel.
    pub gap: f64,
    /// Assumed desktop panel width (matches the stylesheet).
    pub width: f64,
    /// Minimum distance between the panel and the viewport edges.
    pub margin: f64,
    /// Viewports at most this wide use the mobile layout.
    pub mobile_breakpoint: u32,
    pub mobile_layout: MobileLayout,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            gap: 12.0,
            width: 320.0,
            margin: 12.0,
            mobile_breakpoint: 800,
            mobile_layout: MobileLayout::default(),
        }
    }
}

impl PlacementConfig {
    /// Media query that selects the mobile layout.
    #[must_use]
    pub fn mobile_media_query(&self) -> String {
        format!("(max-width: {}px)", self.mobile_breakpoint)
    }
}

/// Where the panel goes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Placement {
    /// Fixed-position panel next to the logo (desktop).
    Anchored { left: f64, top: f64 },
    /// Bottom sheet; the stylesheet does the rest.
    BottomSheet,
    /// Centred panel of the given width.
    Centered { left: f64, width: f64 },
}

/// Desktop placement: right of the anchor, flipped left when it would
/// overflow, vertically clamped into the viewport.
#[must_use]
pub fn place_desktop(
    anchor: &Rect,
    panel_height: f64,
    viewport: Viewport,
    config: &PlacementConfig,
) -> Placement {
    let mut left = anchor.right() + config.gap;
    if left + config.width > viewport.width {
        left = anchor.left - config.gap - config.width;
    }
    let mut top = anchor.top;
    if top + panel_height > viewport.height {
        top = viewport.height - panel_height - config.margin;
    }
    if top < config.margin {
        top = config.margin;
    }
    Placement::Anchored { left, top }
}

/// Mobile placement per the configured layout.
#[must_use]
pub fn place_mobile(viewport: Viewport, layout: MobileLayout) -> Placement {
    match layout {
        MobileLayout::BottomSheet => Placement::BottomSheet,
        MobileLayout::Centered {
            width_fraction,
            max_width,
        } => {
            let width = (viewport.width * width_fraction).min(max_width);
            Placement::Centered {
                left: (viewport.width - width) / 2.0,
                width,
            }
        }
    }
}

/// Pick the placement for a panel of `panel_height` anchored at `anchor`.
#[must_use]
pub fn place(
    anchor: &Rect,
    panel_height: f64,
    viewport: Viewport,
    is_mobile: bool,
    config: &PlacementConfig,
) -> Placement {
    if is_mobile {
        place_mobile(viewport, config.mobile_layout)
    } else {
        place_desktop(anchor, panel_height, viewport, config)
    }
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// Whatever actually builds and removes the overlay.
pub trait PopoverSurface {
    /// The element the popover describes.
    type Anchor;
    type Error;

    /// Build, attach, position and focus the popover for `anchor`.
    fn mount(&mut self, anchor: &Self::Anchor, content: &PopoverContent) -> Result<(), Self::Error>;

    /// Remove the overlay and panel and stop listening for dismiss keys.
    /// Must tolerate nothing being mounted.
    fn unmount(&mut self);
}

/// Tracks the (single) open popover.
#[derive(Debug, Clone, Default)]
pub struct PopoverController {
    open: Option<PopoverContent>,
    opened_total: u64,
}

impl PopoverController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    /// Content of the open popover, if any.
    #[must_use]
    pub fn current(&self) -> Option<&PopoverContent> {
        self.open.as_ref()
    }

    /// Number of popovers opened since page load.
    #[must_use]
    pub fn opened_total(&self) -> u64 {
        self.opened_total
    }

    /// Replace any open popover with one for `anchor`.
    pub fn open<S: PopoverSurface>(
        &mut self,
        anchor: &S::Anchor,
        content: PopoverContent,
        surface: &mut S,
    ) -> Result<(), S::Error> {
        self.dismiss(DismissReason::Replaced, surface);
        if let Err(err) = surface.mount(anchor, &content) {
            // A half-built overlay must not linger.
            surface.unmount();
            return Err(err);
        }
        debug!(title = %content.title, "popover opened");
        self.open = Some(content);
        self.opened_total += 1;
        Ok(())
    }

    /// Close the popover. Safe to call when nothing is open.
    pub fn close<S: PopoverSurface>(&mut self, surface: &mut S) {
        self.open = None;
        surface.unmount();
    }

    /// Close for a user-facing reason.
    pub fn dismiss<S: PopoverSurface>(&mut self, reason: DismissReason, surface: &mut S) {
        if let Some(content) = self.open.as_ref() {
            debug!(title = %content.title, ?reason, "popover dismissed");
        }
        self.close(surface);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct CountingSurface {
        mounted: usize,
        mounts: usize,
        unmounts: usize,
        fail: bool,
    }

    impl PopoverSurface for CountingSurface {
        type Anchor = &'static str;
        type Error = &'static str;

        fn mount(
            &mut self,
            _anchor: &&'static str,
            _content: &PopoverContent,
        ) -> Result<(), &'static str> {
            self.mounts += 1;
            self.mounted += 1;
            if self.fail { Err("boom") } else { Ok(()) }
        }

        fn unmount(&mut self) {
            self.unmounts += 1;
            self.mounted = 0;
        }
    }

    #[test]
    fn description_falls_back_to_label() {
        let c = PopoverContent::from_logo(Some("Rust"), Some("Compiled, statically typed"));
        assert_eq!(c.title, "Rust");
        assert_eq!(c.description, "Compiled, statically typed");

        let c = PopoverContent::from_logo(Some("Go"), None);
        assert_eq!(c.description, "Go");

        let c = PopoverContent::from_logo(Some("Go"), Some(""));
        assert_eq!(c.description, "Go");

        let c = PopoverContent::from_logo(None, None);
        assert_eq!(c, PopoverContent::default());
    }

    #[test]
    fn keys() {
        assert!(is_activation_key("Enter"));
        assert!(is_activation_key(" "));
        assert!(!is_activation_key("Escape"));
        assert!(is_dismiss_key("Escape"));
        assert!(!is_dismiss_key("Esc"));
    }

    #[test]
    fn second_open_replaces_first() {
        let mut surface = CountingSurface::default();
        let mut ctl = PopoverController::new();
        ctl.open(&"rust", PopoverContent::from_logo(Some("Rust"), None), &mut surface)
            .unwrap();
        ctl.open(&"go", PopoverContent::from_logo(Some("Go"), None), &mut surface)
            .unwrap();
        assert_eq!(surface.mounted, 1);
        assert_eq!(ctl.current().map(|c| c.title.as_str()), Some("Go"));
        assert_eq!(ctl.opened_total(), 2);
    }

    #[test]
    fn close_twice_is_harmless() {
        let mut surface = CountingSurface::default();
        let mut ctl = PopoverController::new();
        ctl.open(&"rust", PopoverContent::default(), &mut surface).unwrap();
        ctl.close(&mut surface);
        ctl.close(&mut surface);
        assert_eq!(surface.mounted, 0);
        assert!(!ctl.is_open());
    }

    #[test]
    fn failed_mount_leaves_nothing_open() {
        let mut surface = CountingSurface {
            fail: true,
            ..Default::default()
        };
        let mut ctl = PopoverController::new();
        assert!(ctl.open(&"rust", PopoverContent::default(), &mut surface).is_err());
        assert_eq!(surface.mounted, 0);
        assert!(!ctl.is_open());
    }

    #[test]
    fn desktop_places_right_of_logo() {
        let cfg = PlacementConfig::default();
        let anchor = Rect::new(100.0, 200.0, 48.0, 48.0);
        let p = place_desktop(&anchor, 150.0, Viewport::new(1280.0, 800.0), &cfg);
        assert_eq!(p, Placement::Anchored { left: 160.0, top: 200.0 });
    }

    #[test]
    fn desktop_flips_left_near_right_edge() {
        let cfg = PlacementConfig::default();
        let anchor = Rect::new(1100.0, 200.0, 48.0, 48.0);
        let p = place_desktop(&anchor, 150.0, Viewport::new(1280.0, 800.0), &cfg);
        assert_eq!(p, Placement::Anchored { left: 768.0, top: 200.0 });
    }

    #[test]
    fn desktop_clamps_vertically() {
        let cfg = PlacementConfig::default();
        let low = Rect::new(100.0, 700.0, 48.0, 48.0);
        let p = place_desktop(&low, 200.0, Viewport::new(1280.0, 800.0), &cfg);
        assert_eq!(p, Placement::Anchored { left: 160.0, top: 588.0 });

        let high = Rect::new(100.0, -40.0, 48.0, 48.0);
        let p = place_desktop(&high, 200.0, Viewport::new(1280.0, 800.0), &cfg);
        assert_eq!(p, Placement::Anchored { left: 160.0, top: 12.0 });

        // Taller than the viewport: the top margin wins.
        let p = place_desktop(&high, 900.0, Viewport::new(1280.0, 800.0), &cfg);
        assert_eq!(p, Placement::Anchored { left: 160.0, top: 12.0 });
    }

    #[test]
    fn mobile_layouts() {
        let vp = Viewport::new(400.0, 700.0);
        assert_eq!(place_mobile(vp, MobileLayout::BottomSheet), Placement::BottomSheet);
        let centered = MobileLayout::Centered {
            width_fraction: 0.9,
            max_width: 420.0,
        };
        assert_eq!(
            place_mobile(vp, centered),
            Placement::Centered { left: 20.0, width: 360.0 }
        );
        let wide = Viewport::new(780.0, 700.0);
        assert_eq!(
            place_mobile(wide, centered),
            Placement::Centered { left: 180.0, width: 420.0 }
        );
    }

    #[test]
    fn media_query_uses_breakpoint() {
        assert_eq!(PlacementConfig::default().mobile_media_query(), "(max-width: 800px)");
    }

    #[test]
    fn mobile_layout_deserializes() {
        let l: MobileLayout =
            serde_json::from_str(r#"{"kind":"centered","widthFraction":0.8,"maxWidth":400}"#)
                .unwrap();
        assert_eq!(
            l,
            MobileLayout::Centered {
                width_fraction: 0.8,
                max_width: 400.0
            }
        );
    }
}
