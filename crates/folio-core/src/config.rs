#![forbid(unsafe_code)]

//! Page configuration.
//!
//! The host may pass a JSON object to `mountPortfolio`; every field is
//! optional and falls back to the defaults the stock page markup expects.
//!
//! ```json
//! {
//!   "scrollSource": "window",
//!   "strategy": { "kind": "offsetThreshold", "offset": 120 },
//!   "popover": { "mobileLayout": { "kind": "centered", "widthFraction": 0.9, "maxWidth": 420 } },
//!   "logLevel": "debug"
//! }
//! ```

use serde::Deserialize;

use crate::error::ConfigError;
use crate::popover::{MobileLayout, PlacementConfig};
use crate::scroll_spy::SpyStrategy;
use crate::scroll_top::{DEFAULT_THRESHOLD_PX, ScrollToTop};
use crate::tracker::{ScrollSource, ScrollTiming};

/// Header offset used for container scrolling when none is configured.
pub const DEFAULT_CONTAINER_HEADER_OFFSET: f64 = 100.0;

/// DOM hooks the page markup provides.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Selectors {
    /// Scrollable container holding the sections.
    pub container: String,
    /// Sections, queried inside the container.
    pub sections: String,
    /// Navigation anchors.
    pub nav_links: String,
    /// Element *id* of the scroll-to-top control.
    pub scroll_to_top: String,
    /// Logos that open a popover.
    pub tech_logos: String,
    /// Class toggled on the active navigation link.
    pub active_class: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            container: ".portfolio".into(),
            sections: ".panel".into(),
            nav_links: ".side-menu a".into(),
            scroll_to_top: "scroll-to-top".into(),
            tech_logos: ".tech-logo".into(),
            active_class: "active".into(),
        }
    }
}

/// Everything tunable about the page behavior.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PortfolioConfig {
    pub selectors: Selectors,
    pub scroll_source: ScrollSource,
    pub strategy: SpyStrategy,
    /// Space kept above a section after a link-initiated scroll. Defaults to
    /// [`DEFAULT_CONTAINER_HEADER_OFFSET`] for container scrolling and 0 for
    /// window scrolling.
    pub header_offset: Option<f64>,
    /// Leave the menu unhighlighted on mobile agents until the first scroll.
    pub skip_initial_on_mobile: bool,
    pub timing: ScrollTiming,
    pub popover: PlacementConfig,
    pub scroll_to_top_threshold: f64,
    /// `tracing` filter directive, e.g. `"info"` or `"folio_core=debug"`.
    pub log_level: String,
}

impl Default for PortfolioConfig {
    fn default() -> Self {
        Self {
            selectors: Selectors::default(),
            scroll_source: ScrollSource::default(),
            strategy: SpyStrategy::default(),
            header_offset: None,
            skip_initial_on_mobile: false,
            timing: ScrollTiming::default(),
            popover: PlacementConfig::default(),
            scroll_to_top_threshold: DEFAULT_THRESHOLD_PX,
            log_level: "info".into(),
        }
    }
}

impl PortfolioConfig {
    /// Parse and validate a JSON configuration. Blank input means defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Json(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the page cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let selectors = [
            ("selectors.container", &self.selectors.container),
            ("selectors.sections", &self.selectors.sections),
            ("selectors.navLinks", &self.selectors.nav_links),
            ("selectors.scrollToTop", &self.selectors.scroll_to_top),
            ("selectors.techLogos", &self.selectors.tech_logos),
            ("selectors.activeClass", &self.selectors.active_class),
        ];
        for (field, value) in selectors {
            if value.trim().is_empty() {
                return Err(invalid(field, "must not be empty"));
            }
        }
        if let SpyStrategy::OffsetThreshold { offset } = self.strategy
            && !offset.is_finite()
        {
            return Err(invalid("strategy.offset", "must be finite"));
        }
        if let Some(offset) = self.header_offset
            && !offset.is_finite()
        {
            return Err(invalid("headerOffset", "must be finite"));
        }
        if !(self.timing.ms_per_px.is_finite() && self.timing.ms_per_px >= 0.0) {
            return Err(invalid("timing.msPerPx", "must be a non-negative number"));
        }
        if self.timing.min_ms > self.timing.max_ms {
            return Err(invalid("timing.minMs", "must not exceed timing.maxMs"));
        }
        if !(self.popover.width.is_finite() && self.popover.width > 0.0) {
            return Err(invalid("popover.width", "must be positive"));
        }
        if !(self.popover.gap.is_finite() && self.popover.gap >= 0.0) {
            return Err(invalid("popover.gap", "must be non-negative"));
        }
        if !(self.popover.margin.is_finite() && self.popover.margin >= 0.0) {
            return Err(invalid("popover.margin", "must be non-negative"));
        }
        if let MobileLayout::Centered {
            width_fraction,
            max_width,
        } = self.popover.mobile_layout
        {
            if !(width_fraction > 0.0 && width_fraction <= 1.0) {
                return Err(invalid(
                    "popover.mobileLayout.widthFraction",
                    "must be in (0, 1]",
                ));
            }
            if !(max_width.is_finite() && max_width > 0.0) {
                return Err(invalid("popover.mobileLayout.maxWidth", "must be positive"));
            }
        }
        if !(self.scroll_to_top_threshold.is_finite() && self.scroll_to_top_threshold >= 0.0) {
            return Err(invalid("scrollToTopThreshold", "must be non-negative"));
        }
        Ok(())
    }

    /// Header offset after applying the per-source default.
    #[must_use]
    pub fn effective_header_offset(&self) -> f64 {
        self.header_offset.unwrap_or(match self.scroll_source {
            ScrollSource::Container => DEFAULT_CONTAINER_HEADER_OFFSET,
            ScrollSource::Window => 0.0,
        })
    }

    #[must_use]
    pub fn scroll_to_top(&self) -> ScrollToTop {
        ScrollToTop::new(self.scroll_to_top_threshold)
    }
}

fn invalid(field: &'static str, reason: &'static str) -> ConfigError {
    ConfigError::Invalid { field, reason }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn blank_input_is_default() {
        assert_eq!(PortfolioConfig::from_json("  ").unwrap(), PortfolioConfig::default());
        assert_eq!(PortfolioConfig::from_json("{}").unwrap(), PortfolioConfig::default());
    }

    #[test]
    fn defaults_match_stock_markup() {
        let config = PortfolioConfig::default();
        assert_eq!(config.selectors.container, ".portfolio");
        assert_eq!(config.selectors.nav_links, ".side-menu a");
        assert_eq!(config.scroll_source, ScrollSource::Container);
        assert_eq!(config.effective_header_offset(), 100.0);
        assert_eq!(config.scroll_to_top().threshold(), 300.0);
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let config = PortfolioConfig::from_json(
            r#"{
                "scrollSource": "window",
                "strategy": { "kind": "offsetThreshold", "offset": 120 },
                "timing": { "maxMs": 1200 },
                "popover": { "mobileLayout": { "kind": "centered", "widthFraction": 0.9, "maxWidth": 420 } },
                "selectors": { "activeClass": "is-current" }
            }"#,
        )
        .unwrap();
        assert_eq!(config.scroll_source, ScrollSource::Window);
        assert_eq!(config.strategy, SpyStrategy::OffsetThreshold { offset: 120.0 });
        assert_eq!(config.timing.max_ms, 1200);
        assert_eq!(config.timing.min_ms, 320);
        assert_eq!(config.selectors.active_class, "is-current");
        assert_eq!(config.selectors.sections, ".panel");
        assert_eq!(config.effective_header_offset(), 0.0);
        assert_eq!(
            config.popover.mobile_layout,
            MobileLayout::Centered {
                width_fraction: 0.9,
                max_width: 420.0
            }
        );
    }

    #[test]
    fn malformed_json_is_rejected() {
        let err = PortfolioConfig::from_json("{ nope").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn crossed_timing_bounds_are_rejected() {
        let err =
            PortfolioConfig::from_json(r#"{"timing":{"minMs":1000,"maxMs":10}}"#).unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                field: "timing.minMs",
                reason: "must not exceed timing.maxMs"
            }
        );
    }

    #[test]
    fn empty_selector_is_rejected() {
        let err = PortfolioConfig::from_json(r#"{"selectors":{"container":""}}"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "selectors.container",
                ..
            }
        ));
    }

    #[test]
    fn bad_centered_fraction_is_rejected() {
        let err = PortfolioConfig::from_json(
            r#"{"popover":{"mobileLayout":{"kind":"centered","widthFraction":1.5,"maxWidth":420}}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }
}
