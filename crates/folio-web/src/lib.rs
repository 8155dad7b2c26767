#![forbid(unsafe_code)]

//! WASM frontend for the portfolio page.
//!
//! # Role
//! `folio-web` is the DOM side of the split: it measures the document with
//! `web-sys`, feeds the measurements to `folio-core`, and applies the
//! decisions (link classes, smooth scrolls, popover markup, opacity).
//!
//! # Exports
//! - `mountPortfolio(optionsJson?)` returns a `PortfolioPage` handle.
//! - `PortfolioPage` exposes the current active section, popover state and
//!   `destroy()`.
//!
//! Everything DOM-facing is compiled only for `wasm32`; native builds see the
//! console logging bridge so it can be unit tested.

pub mod logging;

#[cfg(target_arch = "wasm32")]
mod dom;
#[cfg(target_arch = "wasm32")]
mod page;
#[cfg(target_arch = "wasm32")]
mod popover;
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::{PortfolioPage, mount_portfolio};
