#![forbid(unsafe_code)]

//! DOM-backed [`PopoverSurface`]: builds the `.tech-overlay` / `.tech-popover`
//! pair, positions it, and wires the dismiss gestures.

use std::rc::Rc;

use folio_core::popover::{DismissReason, Placement, PlacementConfig, is_dismiss_key, place};
use folio_core::{PopoverContent, PopoverSurface};
use gloo::events::EventListener;
use tracing::debug;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, Event, EventTarget, HtmlElement, KeyboardEvent, Window};

use crate::dom::{add_class, create_html, px, rect_of, set_style, viewport_of};

pub(crate) const OVERLAY_CLASS: &str = "tech-overlay";
pub(crate) const PANEL_CLASS: &str = "tech-popover";
const LOGO_SIZE: &str = "60px";

/// Called when the user asks to dismiss the open popover.
pub(crate) type DismissHandler = Rc<dyn Fn(DismissReason)>;

struct Mounted {
    overlay: HtmlElement,
    listeners: Vec<EventListener>,
}

pub(crate) struct DomPopoverSurface {
    window: Window,
    document: Document,
    config: PlacementConfig,
    on_dismiss: DismissHandler,
    mounted: Option<Mounted>,
}

impl DomPopoverSurface {
    pub(crate) fn new(
        window: Window,
        document: Document,
        config: PlacementConfig,
        on_dismiss: DismissHandler,
    ) -> Self {
        Self {
            window,
            document,
            config,
            on_dismiss,
            mounted: None,
        }
    }

    fn is_mobile(&self) -> bool {
        self.window
            .match_media(&self.config.mobile_media_query())
            .ok()
            .flatten()
            .is_some_and(|query| query.matches())
    }

    fn build_panel(
        &self,
        anchor: &Element,
        content: &PopoverContent,
    ) -> Result<(HtmlElement, HtmlElement), JsValue> {
        let panel = create_html(&self.document, "div")?;
        panel.set_class_name(PANEL_CLASS);
        panel.set_attribute("role", "dialog")?;
        panel.set_attribute("aria-modal", "true")?;

        let close = create_html(&self.document, "button")?;
        close.set_class_name("close");
        close.set_attribute("type", "button")?;
        close.set_attribute("aria-label", "Close")?;
        close.set_text_content(Some("\u{00d7}"));
        set_style(&close, "cursor", "pointer");
        panel.append_child(&close)?;

        let header = create_html(&self.document, "div")?;
        set_style(&header, "display", "flex");
        set_style(&header, "align-items", "center");
        set_style(&header, "gap", "10px");

        let logo = anchor
            .clone_node_with_deep(true)?
            .dyn_into::<Element>()
            .map_err(JsValue::from)?;
        logo.remove_attribute("data-desc")?;
        logo.remove_attribute("tabindex")?;
        logo.remove_attribute("id")?;
        if let Some(logo) = logo.dyn_ref::<HtmlElement>() {
            set_style(logo, "width", LOGO_SIZE);
            set_style(logo, "height", LOGO_SIZE);
            set_style(logo, "margin", "0 0 20px 0");
        }
        header.append_child(&logo)?;

        let title = create_html(&self.document, "div")?;
        let strong = create_html(&self.document, "strong")?;
        set_style(&strong, "display", "block");
        set_style(&strong, "margin-bottom", "6px");
        strong.set_text_content(Some(&content.title));
        title.append_child(&strong)?;
        header.append_child(&title)?;
        panel.append_child(&header)?;

        let body = create_html(&self.document, "div")?;
        body.set_class_name("content");
        set_style(&body, "margin-top", "8px");
        body.set_text_content(Some(&content.description));
        panel.append_child(&body)?;

        Ok((panel, close))
    }

    fn position(&self, anchor: &Element, overlay: &HtmlElement, panel: &HtmlElement) {
        let is_mobile = self.is_mobile();
        let panel_height = panel.get_bounding_client_rect().height();
        let placement = place(
            &rect_of(anchor),
            panel_height,
            viewport_of(&self.window),
            is_mobile,
            &self.config,
        );
        match placement {
            Placement::Anchored { left, top } => {
                set_style(overlay, "align-items", "flex-start");
                set_style(panel, "position", "fixed");
                set_style(panel, "left", &px(left));
                set_style(panel, "top", &px(top));
            }
            Placement::BottomSheet => {
                add_class(panel, "mobile");
                set_style(overlay, "align-items", "flex-end");
            }
            Placement::Centered { left, width } => {
                add_class(panel, "mobile-centered");
                set_style(overlay, "align-items", "center");
                set_style(panel, "position", "fixed");
                set_style(panel, "left", &px(left));
                set_style(panel, "width", &px(width));
                set_style(panel, "top", "50%");
                set_style(panel, "transform", "translateY(-50%)");
            }
        }
        debug!(?placement, is_mobile, "popover positioned");
    }

    fn dismiss_listener(
        &self,
        target: &EventTarget,
        kind: &'static str,
        reason: DismissReason,
        filter: impl Fn(&Event) -> bool + 'static,
    ) -> EventListener {
        let on_dismiss = Rc::clone(&self.on_dismiss);
        EventListener::new(target, kind, move |event| {
            if filter(event) {
                on_dismiss(reason);
            }
        })
    }
}

impl PopoverSurface for DomPopoverSurface {
    type Anchor = Element;
    type Error = JsValue;

    fn mount(&mut self, anchor: &Element, content: &PopoverContent) -> Result<(), JsValue> {
        let body = self
            .document
            .body()
            .ok_or_else(|| JsValue::from_str("document has no body"))?;

        let overlay = create_html(&self.document, "div")?;
        overlay.set_class_name(OVERLAY_CLASS);
        // Record the overlay before anything else can fail so unmount finds it.
        self.mounted = Some(Mounted {
            overlay: overlay.clone(),
            listeners: Vec::new(),
        });

        let (panel, close) = self.build_panel(anchor, content)?;
        overlay.append_child(&panel)?;
        body.append_child(&overlay)?;

        let overlay_value = JsValue::from(overlay.clone());
        let listeners = vec![
            self.dismiss_listener(&overlay, "click", DismissReason::OverlayClick, move |event| {
                // Clicks inside the panel bubble up here too.
                event
                    .target()
                    .is_some_and(|target| JsValue::from(target) == overlay_value)
            }),
            self.dismiss_listener(&close, "click", DismissReason::CloseButton, |_| true),
            self.dismiss_listener(&self.document, "keydown", DismissReason::Escape, |event| {
                event
                    .dyn_ref::<KeyboardEvent>()
                    .is_some_and(|key| is_dismiss_key(&key.key()))
            }),
        ];
        if let Some(mounted) = self.mounted.as_mut() {
            mounted.listeners = listeners;
        }

        self.position(anchor, &overlay, &panel);
        close.focus()?;
        Ok(())
    }

    fn unmount(&mut self) {
        // Dropping the listeners unregisters them.
        if let Some(mounted) = self.mounted.take() {
            mounted.overlay.remove();
        }
    }
}
