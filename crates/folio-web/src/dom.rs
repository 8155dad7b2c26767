#![forbid(unsafe_code)]

//! Small `web-sys` helpers: measurement, element creation, inline styles.

use folio_core::{Rect, Viewport};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlElement, NodeList, Window};

/// Render a thrown JS value for logs and error messages.
pub(crate) fn js_error_text(err: &JsValue) -> String {
    err.as_string().unwrap_or_else(|| format!("{err:?}"))
}

pub(crate) fn rect_of(element: &Element) -> Rect {
    let r = element.get_bounding_client_rect();
    Rect::new(r.left(), r.top(), r.width(), r.height())
}

pub(crate) fn viewport_of(window: &Window) -> Viewport {
    let dim = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
    Viewport::new(dim(window.inner_width()), dim(window.inner_height()))
}

pub(crate) fn elements(list: &NodeList) -> Vec<Element> {
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

pub(crate) fn create_html(document: &Document, tag: &str) -> Result<HtmlElement, JsValue> {
    document
        .create_element(tag)?
        .dyn_into::<HtmlElement>()
        .map_err(JsValue::from)
}

/// Set an inline style property; failures are logged and otherwise ignored.
pub(crate) fn set_style(element: &HtmlElement, property: &str, value: &str) {
    if let Err(err) = element.style().set_property(property, value) {
        tracing::warn!(property, error = %js_error_text(&err), "style update failed");
    }
}

/// Add a class; failures are logged and otherwise ignored.
pub(crate) fn add_class(element: &Element, class: &str) {
    if let Err(err) = element.class_list().add_1(class) {
        tracing::warn!(class, error = %js_error_text(&err), "class update failed");
    }
}

pub(crate) fn px(value: f64) -> String {
    format!("{value}px")
}
