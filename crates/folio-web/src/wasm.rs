#![forbid(unsafe_code)]

//! `wasm-bindgen` exports.
//!
//! The host calls `mountPortfolio(optionsJson?)` once the DOM is ready and
//! keeps the returned [`PortfolioPage`]; calling `destroy()` (or letting the
//! object be freed) removes every listener the page installed.

use std::sync::Once;

use folio_core::{MountError, PortfolioConfig};
use js_sys::Reflect;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::Element;

use crate::logging::{self, ConsoleLevel};
use crate::page::{Page, SharedPage};

fn console_error(msg: &str) {
    let global = js_sys::global();
    let Ok(console) = Reflect::get(&global, &"console".into()) else {
        return;
    };
    let Ok(error) = Reflect::get(&console, &"error".into()) else {
        return;
    };
    let Ok(error_fn) = error.dyn_into::<js_sys::Function>() else {
        return;
    };
    let _ = error_fn.call1(&console, &JsValue::from_str(msg));
}

fn install_panic_hook() {
    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        std::panic::set_hook(Box::new(|info| {
            let msg = if let Some(loc) = info.location() {
                format!(
                    "panic at {}:{}:{}: {info}",
                    loc.file(),
                    loc.line(),
                    loc.column()
                )
            } else {
                format!("panic: {info}")
            };
            console_error(&msg);
        }));
    });
}

fn console_sink(level: ConsoleLevel, line: &str) {
    let line = JsValue::from_str(line);
    match level {
        ConsoleLevel::Log => web_sys::console::log_1(&line),
        ConsoleLevel::Warn => web_sys::console::warn_1(&line),
        ConsoleLevel::Error => web_sys::console::error_1(&line),
    }
}

fn to_js(err: MountError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

#[wasm_bindgen(start)]
pub fn wasm_start() {
    install_panic_hook();
}

/// Mount scroll-spy, scroll-to-top and logo popovers on the current document.
///
/// `options` is an optional JSON object; omitted fields keep their defaults.
#[wasm_bindgen(js_name = mountPortfolio)]
pub fn mount_portfolio(options: Option<String>) -> Result<PortfolioPage, JsValue> {
    install_panic_hook();
    let config = PortfolioConfig::from_json(options.as_deref().unwrap_or(""))
        .map_err(|err| to_js(MountError::from(err)))?;
    logging::init(&config.log_level, console_sink);
    let page = Page::mount(config).map_err(|err| {
        tracing::error!(%err, "portfolio mount failed");
        to_js(err)
    })?;
    Ok(PortfolioPage { page: Some(page) })
}

/// Handle to a mounted page.
#[wasm_bindgen]
pub struct PortfolioPage {
    page: Option<SharedPage>,
}

impl PortfolioPage {
    fn read<T>(&self, default: T, f: impl FnOnce(&Page) -> T) -> T {
        match self.page.as_ref().and_then(|page| page.try_borrow().ok()) {
            Some(page) => f(&page),
            None => default,
        }
    }

    fn write<T>(&self, default: T, f: impl FnOnce(&mut Page) -> T) -> T {
        match self.page.as_ref().and_then(|page| page.try_borrow_mut().ok()) {
            Some(mut page) => f(&mut page),
            None => default,
        }
    }
}

#[wasm_bindgen]
impl PortfolioPage {
    /// Id of the section whose link is active, if any.
    #[wasm_bindgen(js_name = activeSection)]
    pub fn active_section(&self) -> Option<String> {
        self.read(None, |page| page.tracker().active_id().map(str::to_owned))
    }

    /// Whether a link-triggered smooth scroll is still suppressing tracking.
    #[wasm_bindgen(js_name = isProgrammaticScroll)]
    pub fn is_programmatic_scroll(&self) -> bool {
        self.read(false, |page| page.tracker().is_suppressed())
    }

    #[wasm_bindgen(js_name = isPopoverOpen)]
    pub fn is_popover_open(&self) -> bool {
        self.read(false, Page::is_popover_open)
    }

    /// Mark `id` active without scrolling. Returns whether anything changed.
    #[wasm_bindgen(js_name = activateSection)]
    pub fn activate_section(&self, id: &str) -> bool {
        self.write(false, |page| page.activate_section(id))
    }

    /// Open the popover for `logo` as if it had been clicked.
    #[wasm_bindgen(js_name = openPopover)]
    pub fn open_popover(&self, logo: &Element) {
        self.write((), |page| page.open_popover(logo));
    }

    /// Close the popover, if any. Safe to call when nothing is open.
    #[wasm_bindgen(js_name = closePopover)]
    pub fn close_popover(&self) {
        self.write((), Page::close_popover);
    }

    /// Remove every listener and any open popover. Idempotent.
    pub fn destroy(&mut self) {
        if let Some(page) = self.page.take() {
            match page.try_borrow_mut() {
                Ok(mut state) => state.teardown(),
                Err(_) => tracing::warn!("destroy while page busy; listeners dropped with it"),
            }
        }
    }
}

impl Drop for PortfolioPage {
    fn drop(&mut self) {
        self.destroy();
    }
}
