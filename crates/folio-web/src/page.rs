#![forbid(unsafe_code)]

//! Page wiring: one [`Page`] per document owns the scroll-spy tracker, the
//! popover controller, and every DOM listener.
//!
//! ```text
//! scroll (passive) → Page::on_scroll → tracker.handle_scroll → requestAnimationFrame
//! animation frame  → Page::on_frame  → measure sections → tracker.on_animation_frame
//! link click       → Page::on_link_click → tracker.activate_by_link_click
//!                                        → Timeout(suppress_for) → scrollTo(smooth)
//! window scroll    → Page::on_window_scroll → scroll-to-top opacity
//! logo click/key   → Page::open_popover → PopoverController::open
//! ```
//!
//! Listeners capture a `Weak` handle. Dropping the page drops its
//! `EventListener`s, pending `AnimationFrame` and suppression `Timeout`,
//! which unregisters all of them.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use folio_core::device::is_mobile_user_agent;
use folio_core::popover::{DismissReason, PopoverController, is_activation_key};
use folio_core::{
    ActiveSectionTracker, LinkSurface, MountError, NavLink, PopoverContent, PortfolioConfig,
    ScrollDisposition, ScrollFrame, ScrollSource, ScrollToTop,
};
use gloo::events::{EventListener, EventListenerOptions};
use gloo::render::{AnimationFrame, request_animation_frame};
use gloo::timers::callback::Timeout;
use tracing::{debug, info, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use web_sys::{
    Document, Element, Event, EventTarget, HtmlElement, KeyboardEvent, Node, ScrollBehavior,
    ScrollToOptions, Window,
};

use crate::dom::{elements, js_error_text, rect_of, set_style, viewport_of};
use crate::popover::DomPopoverSurface;

pub(crate) type SharedPage = Rc<RefCell<Page>>;

/// Run `f` against the page if it is still alive and not already borrowed.
pub(crate) fn with_page(page: &Weak<RefCell<Page>>, f: impl FnOnce(&mut Page)) {
    let Some(page) = page.upgrade() else {
        return;
    };
    let Ok(mut page) = page.try_borrow_mut() else {
        warn!("page busy; event dropped");
        return;
    };
    f(&mut page);
}

fn dom_error(err: JsValue) -> MountError {
    MountError::Dom(js_error_text(&err))
}

/// Toggles the active class on navigation anchors.
struct ClassToggle<'a> {
    links: &'a [Element],
    class: &'a str,
}

impl LinkSurface for ClassToggle<'_> {
    fn set_link_active(&mut self, index: usize, active: bool) {
        let Some(link) = self.links.get(index) else {
            return;
        };
        if let Err(err) = link.class_list().toggle_with_force(self.class, active) {
            warn!(index, error = %js_error_text(&err), "link class toggle failed");
        }
    }
}

/// Elements found in the document at mount time.
struct Markup {
    container: Option<Element>,
    sections: Vec<Element>,
    section_ids: Vec<String>,
    links: Vec<Element>,
    nav_links: Vec<NavLink>,
    logos: Vec<Element>,
    scroll_to_top: Option<HtmlElement>,
}

impl Markup {
    fn query(document: &Document, config: &PortfolioConfig) -> Result<Self, MountError> {
        let selectors = &config.selectors;
        let container = document
            .query_selector(&selectors.container)
            .map_err(dom_error)?;
        if container.is_none() && config.scroll_source == ScrollSource::Container {
            return Err(MountError::MissingElement(selectors.container.clone()));
        }

        let section_list = match &container {
            Some(container) => container.query_selector_all(&selectors.sections),
            None => document.query_selector_all(&selectors.sections),
        }
        .map_err(dom_error)?;
        let mut sections = Vec::new();
        let mut section_ids = Vec::new();
        for section in elements(&section_list) {
            let id = section.id();
            if id.is_empty() {
                warn!(selector = %selectors.sections, "section without id ignored");
                continue;
            }
            section_ids.push(id);
            sections.push(section);
        }

        let link_list = document
            .query_selector_all(&selectors.nav_links)
            .map_err(dom_error)?;
        let mut links = Vec::new();
        let mut nav_links = Vec::new();
        for link in elements(&link_list) {
            if let Some(nav) = link.get_attribute("href").as_deref().and_then(NavLink::from_href) {
                nav_links.push(nav);
                links.push(link);
            }
        }

        let logo_list = document
            .query_selector_all(&selectors.tech_logos)
            .map_err(dom_error)?;
        let logos = elements(&logo_list);

        let scroll_to_top = document
            .get_element_by_id(&selectors.scroll_to_top)
            .and_then(|el| el.dyn_into::<HtmlElement>().ok());

        Ok(Self {
            container,
            sections,
            section_ids,
            links,
            nav_links,
            logos,
            scroll_to_top,
        })
    }
}

pub(crate) struct Page {
    window: Window,
    document: Document,
    config: PortfolioConfig,
    this: Weak<RefCell<Page>>,

    container: Option<Element>,
    sections: Vec<Element>,
    links: Vec<Element>,
    logos: Vec<Element>,
    scroll_to_top_button: Option<HtmlElement>,
    scroll_to_top: ScrollToTop,

    tracker: ActiveSectionTracker,
    popovers: PopoverController,
    popover_surface: DomPopoverSurface,

    pending_frame: Option<AnimationFrame>,
    suppression_timer: Option<Timeout>,
    listeners: Vec<EventListener>,
}

impl Page {
    /// Query the document, build the page, attach listeners, and run the
    /// initial activation.
    pub(crate) fn mount(config: PortfolioConfig) -> Result<SharedPage, MountError> {
        let window = web_sys::window().ok_or(MountError::NoWindow)?;
        let document = window.document().ok_or(MountError::NoDocument)?;
        if document.body().is_none() {
            return Err(MountError::NoBody);
        }
        let markup = Markup::query(&document, &config)?;
        let is_mobile_agent = window
            .navigator()
            .user_agent()
            .map(|ua| is_mobile_user_agent(&ua))
            .unwrap_or(false);

        let tracker = ActiveSectionTracker::new(markup.nav_links, markup.section_ids)
            .with_strategy(config.strategy)
            .with_timing(config.timing)
            .with_header_offset(config.effective_header_offset())
            .with_skip_initial_on_mobile(config.skip_initial_on_mobile);

        let page = Rc::new_cyclic(|this: &Weak<RefCell<Page>>| {
            let dismiss_target = this.clone();
            let popover_surface = DomPopoverSurface::new(
                window.clone(),
                document.clone(),
                config.popover,
                Rc::new(move |reason: DismissReason| {
                    with_page(&dismiss_target, |page| page.dismiss_popover(reason));
                }),
            );
            RefCell::new(Page {
                window: window.clone(),
                document: document.clone(),
                scroll_to_top: config.scroll_to_top(),
                config,
                this: this.clone(),
                container: markup.container,
                sections: markup.sections,
                links: markup.links,
                logos: markup.logos,
                scroll_to_top_button: markup.scroll_to_top,
                tracker,
                popovers: PopoverController::new(),
                popover_surface,
                pending_frame: None,
                suppression_timer: None,
                listeners: Vec::new(),
            })
        });

        let listeners = Self::attach_listeners(&page);
        let mut state = page.borrow_mut();
        state.listeners = listeners;
        state.start(is_mobile_agent);
        drop(state);
        Ok(page)
    }

    fn attach_listeners(page: &SharedPage) -> Vec<EventListener> {
        let state = page.borrow();
        let weak = Rc::downgrade(page);
        let mut listeners = Vec::new();
        let cancelable = EventListenerOptions::enable_prevent_default;

        let scroll_source: &EventTarget = match (state.config.scroll_source, &state.container) {
            (ScrollSource::Container, Some(container)) => container,
            _ => &state.window,
        };
        let target = weak.clone();
        listeners.push(EventListener::new(scroll_source, "scroll", move |_| {
            with_page(&target, Page::on_scroll);
        }));

        for (index, link) in state.links.iter().enumerate() {
            let target = weak.clone();
            listeners.push(EventListener::new_with_options(
                link,
                "click",
                cancelable(),
                move |event| with_page(&target, |page| page.on_link_click(index, event)),
            ));
        }

        if let Some(button) = &state.scroll_to_top_button {
            let target = weak.clone();
            listeners.push(EventListener::new(&state.window, "scroll", move |_| {
                with_page(&target, Page::on_window_scroll);
            }));
            let target = weak.clone();
            listeners.push(EventListener::new_with_options(
                button,
                "click",
                cancelable(),
                move |event| {
                    event.prevent_default();
                    with_page(&target, Page::scroll_window_to_top);
                },
            ));
        }

        for (index, logo) in state.logos.iter().enumerate() {
            let target = weak.clone();
            listeners.push(EventListener::new(logo, "click", move |_| {
                with_page(&target, |page| page.open_logo(index));
            }));
            let target = weak.clone();
            listeners.push(EventListener::new_with_options(
                logo,
                "keydown",
                cancelable(),
                move |event| {
                    let activates = event
                        .dyn_ref::<KeyboardEvent>()
                        .is_some_and(|key| is_activation_key(&key.key()));
                    if activates {
                        event.prevent_default();
                        with_page(&target, |page| page.open_logo(index));
                    }
                },
            ));
        }

        listeners
    }

    fn start(&mut self, is_mobile_agent: bool) {
        let Page { tracker, links, config, .. } = self;
        let mut surface = ClassToggle {
            links,
            class: &config.selectors.active_class,
        };
        tracker.initial_activation(is_mobile_agent, &mut surface);
        self.on_window_scroll();
        info!(
            sections = self.sections.len(),
            links = self.links.len(),
            logos = self.logos.len(),
            source = ?self.config.scroll_source,
            strategy = ?self.config.strategy,
            "portfolio page mounted"
        );
    }

    // -- Scroll-spy ---------------------------------------------------------

    fn scroll_frame(&self) -> ScrollFrame {
        match (self.config.scroll_source, &self.container) {
            (ScrollSource::Container, Some(container)) => ScrollFrame {
                viewport_top: container.get_bounding_client_rect().top(),
                viewport_height: f64::from(container.client_height()),
                scroll_top: f64::from(container.scroll_top()),
                scroll_height: f64::from(container.scroll_height()),
            },
            _ => ScrollFrame {
                viewport_top: 0.0,
                viewport_height: viewport_of(&self.window).height,
                scroll_top: self.window.scroll_y().unwrap_or(0.0),
                scroll_height: self
                    .document
                    .document_element()
                    .map(|root| f64::from(root.scroll_height()))
                    .unwrap_or(0.0),
            },
        }
    }

    fn on_scroll(&mut self) {
        if self.tracker.handle_scroll() != ScrollDisposition::ScheduleFrame {
            return;
        }
        let this = self.this.clone();
        self.pending_frame = Some(request_animation_frame(move |_| {
            with_page(&this, Page::on_frame);
        }));
    }

    fn on_frame(&mut self) {
        self.pending_frame = None;
        let rects: Vec<_> = self.sections.iter().map(rect_of).collect();
        let frame = self.scroll_frame();
        let Page { tracker, links, config, .. } = self;
        let mut surface = ClassToggle {
            links,
            class: &config.selectors.active_class,
        };
        tracker.on_animation_frame(&rects, &frame, &mut surface);
    }

    fn find_section(&self, id: &str) -> Option<Element> {
        let section = self.document.get_element_by_id(id)?;
        let node: &Node = &section;
        match &self.container {
            Some(container) if !container.contains(Some(node)) => None,
            _ => Some(section),
        }
    }

    fn on_link_click(&mut self, index: usize, event: &Event) {
        event.prevent_default();
        let Some(id) = self
            .tracker
            .links()
            .get(index)
            .map(|link| link.target().to_owned())
        else {
            return;
        };
        let Some(section) = self.find_section(&id) else {
            debug!(section = %id, "link target missing");
            return;
        };

        let frame = self.scroll_frame();
        let target = rect_of(&section);
        let Page { tracker, links, config, .. } = self;
        let mut surface = ClassToggle {
            links,
            class: &config.selectors.active_class,
        };
        let plan = tracker.activate_by_link_click(&id, &frame, &target, &mut surface);
        // A frame requested by earlier scrolling would measure stale geometry.
        self.pending_frame = None;

        // Replacing the timer cancels the previous one.
        let this = self.this.clone();
        let generation = plan.generation;
        let delay_ms = u32::try_from(plan.suppress_for.as_millis()).unwrap_or(u32::MAX);
        self.suppression_timer = Some(Timeout::new(delay_ms, move || {
            with_page(&this, |page| {
                page.tracker.end_programmatic_scroll(generation);
            });
        }));

        self.smooth_scroll(plan.scroll_to);
    }

    fn smooth_scroll(&self, top: f64) {
        let options = ScrollToOptions::new();
        options.set_top(top);
        options.set_behavior(ScrollBehavior::Smooth);
        match (self.config.scroll_source, &self.container) {
            (ScrollSource::Container, Some(container)) => {
                container.scroll_to_with_scroll_to_options(&options);
            }
            _ => self.window.scroll_to_with_scroll_to_options(&options),
        }
    }

    // -- Scroll-to-top ------------------------------------------------------

    fn on_window_scroll(&mut self) {
        let Some(button) = &self.scroll_to_top_button else {
            return;
        };
        let scroll_y = self.window.scroll_y().unwrap_or(0.0);
        set_style(button, "opacity", self.scroll_to_top.visibility(scroll_y).opacity());
    }

    fn scroll_window_to_top(&mut self) {
        let options = ScrollToOptions::new();
        options.set_top(0.0);
        options.set_behavior(ScrollBehavior::Smooth);
        self.window.scroll_to_with_scroll_to_options(&options);
    }

    // -- Popovers -----------------------------------------------------------

    fn open_logo(&mut self, index: usize) {
        let Some(logo) = self.logos.get(index).cloned() else {
            return;
        };
        self.open_popover(&logo);
    }

    pub(crate) fn open_popover(&mut self, logo: &Element) {
        let content = PopoverContent::from_logo(
            logo.get_attribute("alt").as_deref(),
            logo.get_attribute("data-desc").as_deref(),
        );
        let Page {
            popovers,
            popover_surface,
            ..
        } = self;
        if let Err(err) = popovers.open(logo, content, popover_surface) {
            warn!(error = %js_error_text(&err), "popover mount failed");
        }
    }

    pub(crate) fn dismiss_popover(&mut self, reason: DismissReason) {
        let Page {
            popovers,
            popover_surface,
            ..
        } = self;
        popovers.dismiss(reason, popover_surface);
    }

    pub(crate) fn close_popover(&mut self) {
        let Page {
            popovers,
            popover_surface,
            ..
        } = self;
        popovers.close(popover_surface);
    }

    // -- Accessors ----------------------------------------------------------

    pub(crate) fn tracker(&self) -> &ActiveSectionTracker {
        &self.tracker
    }

    pub(crate) fn is_popover_open(&self) -> bool {
        self.popovers.is_open()
    }

    pub(crate) fn activate_section(&mut self, id: &str) -> bool {
        let Page { tracker, links, config, .. } = self;
        let mut surface = ClassToggle {
            links,
            class: &config.selectors.active_class,
        };
        tracker.activate_section(id, &mut surface)
    }

    /// Detach every listener, cancel pending callbacks, close any popover.
    pub(crate) fn teardown(&mut self) {
        self.listeners.clear();
        self.suppression_timer = None;
        self.pending_frame = None;
        self.close_popover();
        debug!("portfolio page torn down");
    }
}
