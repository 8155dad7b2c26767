#![forbid(unsafe_code)]

//! Core: host-agnostic behavior for the portfolio page.
//!
//! # Role
//! `folio-core` decides *what* the page should do; `folio-web` measures the
//! DOM, feeds the core, and applies its decisions. Nothing here depends on
//! JS types, so every rule is testable natively.
//!
//! # Primary responsibilities
//! - **Scroll-spy**: [`tracker::ActiveSectionTracker`] keeps exactly one
//!   navigation link active, collapsing scroll bursts into one recomputation
//!   per animation frame and ignoring the page's own smooth scrolls.
//! - **Section selection**: [`scroll_spy`] holds the two selection
//!   strategies as pure functions.
//! - **Popovers**: [`popover::PopoverController`] guarantees a single open
//!   popover; [`popover::place`] computes desktop/mobile placement.
//! - **Scroll-to-top**: [`scroll_top::ScrollToTop`] threshold visibility.
//! - **Configuration**: [`config::PortfolioConfig`], JSON-deserialisable.

pub mod config;
pub mod device;
pub mod error;
pub mod geometry;
pub mod nav;
pub mod popover;
pub mod scroll_spy;
pub mod scroll_top;
pub mod tracker;

pub use config::PortfolioConfig;
pub use error::{ConfigError, MountError};
pub use geometry::{Rect, ScrollFrame, Viewport};
pub use nav::{LinkSurface, NavLink};
pub use popover::{DismissReason, Placement, PopoverContent, PopoverController, PopoverSurface};
pub use scroll_spy::SpyStrategy;
pub use scroll_top::{ScrollToTop, Visibility};
pub use tracker::{ActiveSectionTracker, ProgrammaticScroll, ScrollDisposition, ScrollSource};
