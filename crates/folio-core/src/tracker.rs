#![forbid(unsafe_code)]

//! Active-section tracking (scroll-spy state machine).
//!
//! [`ActiveSectionTracker`] owns every piece of mutable scroll-spy state the
//! page needs: the active section id, the animation-frame gate that collapses
//! scroll bursts, and the suppression window that keeps a link-initiated
//! smooth scroll from being re-interpreted as user scrolling.
//!
//! The host drives it:
//!
//! ```text
//! scroll event      → handle_scroll()            → ScheduleFrame? → requestAnimationFrame
//! animation frame   → on_animation_frame(rects)  → link classes toggled
//! link click        → activate_by_link_click()   → ProgrammaticScroll
//!                                                  → clearTimeout + setTimeout(suppress_for)
//!                                                  → scrollTo(smooth)
//! timer fires       → end_programmatic_scroll(generation)
//! ```
//!
//! Time never enters the core; the host owns the timer and hands back the
//! generation it was given, so a stale timer cannot reopen tracking early.

use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, trace};

use crate::geometry::{Rect, ScrollFrame};
use crate::nav::{LinkSurface, NavLink};
use crate::scroll_spy::{SectionProbe, SpyStrategy};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// What scrolls: a container element or the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScrollSource {
    /// The `.portfolio` element scrolls; geometry is read relative to it.
    #[default]
    Container,
    /// The document scrolls.
    Window,
}

/// How long link-initiated scrolls suppress tracking.
///
/// Smooth scroll has no completion event, so the duration is estimated from
/// distance: `clamp(round(distance * ms_per_px), min_ms, max_ms) + settle_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScrollTiming {
    /// Milliseconds of animation per pixel travelled.
    pub ms_per_px: f64,
    /// Lower bound on the estimated animation time.
    pub min_ms: u32,
    /// Upper bound on the estimated animation time.
    pub max_ms: u32,
    /// Extra time for the last scroll events to drain.
    pub settle_ms: u32,
}

impl Default for ScrollTiming {
    fn default() -> Self {
        Self {
            ms_per_px: 0.5,
            min_ms: 320,
            max_ms: 900,
            settle_ms: 80,
        }
    }
}

impl ScrollTiming {
    /// Suppression window for a smooth scroll of `distance` px.
    #[must_use]
    pub fn estimate(&self, distance: f64) -> Duration {
        let raw = (distance.abs() * self.ms_per_px).round();
        let raw = if raw.is_finite() { raw } else { f64::from(self.max_ms) };
        // max-then-min keeps the upper bound authoritative if the bounds cross.
        let animation = raw.max(f64::from(self.min_ms)).min(f64::from(self.max_ms));
        Duration::from_millis(animation as u64 + u64::from(self.settle_ms))
    }
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// What the host should do after a scroll event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDisposition {
    /// Request one animation frame and call [`ActiveSectionTracker::on_animation_frame`].
    ScheduleFrame,
    /// A frame is already pending; this event is folded into it.
    AlreadyScheduled,
    /// A link-initiated scroll is animating; ignore the event.
    Suppressed,
}

/// Instructions for a link-initiated smooth scroll.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgrammaticScroll {
    /// Section that was marked active.
    pub target_id: String,
    /// Scroll offset to pass to `scrollTo({ top, behavior: "smooth" })`.
    pub scroll_to: f64,
    /// How long until the host should call
    /// [`ActiveSectionTracker::end_programmatic_scroll`].
    pub suppress_for: Duration,
    /// Token to hand back when the suppression timer fires.
    pub generation: u64,
}

// ---------------------------------------------------------------------------
// Tracker
// ---------------------------------------------------------------------------

/// Scroll-spy state for one page.
#[derive(Debug, Clone)]
pub struct ActiveSectionTracker {
    links: Vec<NavLink>,
    sections: Vec<String>,
    strategy: SpyStrategy,
    timing: ScrollTiming,
    header_offset: f64,
    skip_initial_on_mobile: bool,

    active_id: Option<String>,
    /// An animation frame has been requested and not yet run.
    ticking: bool,
    /// Generation of the in-flight programmatic scroll, if any.
    suppression: Option<u64>,
    generation: u64,
}

impl ActiveSectionTracker {
    /// Tracker over `links` (document order) and `sections` (document order).
    #[must_use]
    pub fn new(links: Vec<NavLink>, sections: Vec<String>) -> Self {
        Self {
            links,
            sections,
            strategy: SpyStrategy::default(),
            timing: ScrollTiming::default(),
            header_offset: 0.0,
            skip_initial_on_mobile: false,
            active_id: None,
            ticking: false,
            suppression: None,
            generation: 0,
        }
    }

    #[must_use]
    pub fn with_strategy(mut self, strategy: SpyStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    #[must_use]
    pub fn with_timing(mut self, timing: ScrollTiming) -> Self {
        self.timing = timing;
        self
    }

    /// Pixels left between the top of the scrolling box and a section after
    /// a link-initiated scroll (room for a sticky header).
    #[must_use]
    pub fn with_header_offset(mut self, header_offset: f64) -> Self {
        self.header_offset = header_offset;
        self
    }

    #[must_use]
    pub fn with_skip_initial_on_mobile(mut self, skip: bool) -> Self {
        self.skip_initial_on_mobile = skip;
        self
    }

    #[must_use]
    pub fn active_id(&self) -> Option<&str> {
        self.active_id.as_deref()
    }

    #[must_use]
    pub fn links(&self) -> &[NavLink] {
        &self.links
    }

    #[must_use]
    pub fn sections(&self) -> &[String] {
        &self.sections
    }

    #[must_use]
    pub fn is_suppressed(&self) -> bool {
        self.suppression.is_some()
    }

    #[must_use]
    pub fn is_ticking(&self) -> bool {
        self.ticking
    }

    /// Mark `id` active and reflect it on every link.
    ///
    /// No-op (returns `false`) when `id` is already active.
    pub fn activate_section(&mut self, id: &str, surface: &mut impl LinkSurface) -> bool {
        if self.active_id.as_deref() == Some(id) {
            return false;
        }
        self.active_id = Some(id.to_owned());
        for (index, link) in self.links.iter().enumerate() {
            surface.set_link_active(index, link.points_at(id));
        }
        debug!(section = id, "section activated");
        true
    }

    /// Highlight the first section on page load.
    ///
    /// Skipped when there are no sections, or on mobile agents when the
    /// page is configured to wait for the first scroll there.
    pub fn initial_activation(
        &mut self,
        is_mobile_agent: bool,
        surface: &mut impl LinkSurface,
    ) -> bool {
        if is_mobile_agent && self.skip_initial_on_mobile {
            debug!("initial activation skipped on mobile agent");
            return false;
        }
        let Some(first) = self.sections.first().cloned() else {
            return false;
        };
        self.activate_section(&first, surface)
    }

    /// Gate a scroll event.
    pub fn handle_scroll(&mut self) -> ScrollDisposition {
        if self.ticking {
            return ScrollDisposition::AlreadyScheduled;
        }
        if self.suppression.is_some() {
            return ScrollDisposition::Suppressed;
        }
        self.ticking = true;
        ScrollDisposition::ScheduleFrame
    }

    /// Recompute the active section from freshly measured geometry.
    ///
    /// `rects` are the section rectangles in the same order as
    /// [`sections`](Self::sections). Returns whether the active section
    /// changed. A frame requested before a link click and run during its
    /// smooth scroll changes nothing.
    pub fn on_animation_frame(
        &mut self,
        rects: &[Rect],
        frame: &ScrollFrame,
        surface: &mut impl LinkSurface,
    ) -> bool {
        self.ticking = false;
        if self.suppression.is_some() {
            trace!("frame dropped during programmatic scroll");
            return false;
        }
        let probes: Vec<SectionProbe<'_>> = self
            .sections
            .iter()
            .zip(rects)
            .map(|(id, rect)| SectionProbe {
                id: id.as_str(),
                rect: *rect,
            })
            .collect();
        let Some(index) = self.strategy.select(&probes, frame) else {
            return false;
        };
        let id = probes[index].id.to_owned();
        trace!(section = %id, scroll_top = frame.scroll_top, "frame recomputed");
        self.activate_section(&id, surface)
    }

    /// Handle a click on the link pointing at `id`.
    ///
    /// Marks the section active right away, opens a suppression window sized
    /// to the travel distance, and returns where to scroll. `target` is the
    /// section's current client rectangle.
    pub fn activate_by_link_click(
        &mut self,
        id: &str,
        frame: &ScrollFrame,
        target: &Rect,
        surface: &mut impl LinkSurface,
    ) -> ProgrammaticScroll {
        self.activate_section(id, surface);
        // Any frame still pending is stale; the host cancels it.
        self.ticking = false;

        let scroll_to = frame.scroll_top + (frame.relative_top(target) - self.header_offset);
        let suppress_for = self.timing.estimate(scroll_to - frame.scroll_top);

        self.generation = self.generation.wrapping_add(1);
        self.suppression = Some(self.generation);
        debug!(
            section = id,
            scroll_to,
            suppress_ms = suppress_for.as_millis() as u64,
            generation = self.generation,
            "programmatic scroll started"
        );

        ProgrammaticScroll {
            target_id: id.to_owned(),
            scroll_to,
            suppress_for,
            generation: self.generation,
        }
    }

    /// Close the suppression window opened by the click that produced
    /// `generation`. Stale generations are ignored.
    pub fn end_programmatic_scroll(&mut self, generation: u64) -> bool {
        if self.suppression != Some(generation) {
            return false;
        }
        self.suppression = None;
        debug!(generation, "programmatic scroll ended");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker(ids: &[&str]) -> (ActiveSectionTracker, Vec<bool>) {
        let links = ids
            .iter()
            .filter_map(|id| NavLink::from_href(&format!("#{id}")))
            .collect();
        let sections = ids.iter().map(|id| (*id).to_owned()).collect();
        (ActiveSectionTracker::new(links, sections), vec![false; ids.len()])
    }

    fn frame(scroll_top: f64) -> ScrollFrame {
        ScrollFrame {
            viewport_top: 0.0,
            viewport_height: 600.0,
            scroll_top,
            scroll_height: 3000.0,
        }
    }

    fn rects(count: usize, height: f64, scroll: f64) -> Vec<Rect> {
        (0..count)
            .map(|i| Rect::new(0.0, i as f64 * height - scroll, 800.0, height))
            .collect()
    }

    #[test]
    fn activate_is_idempotent() {
        let (mut t, mut surface) = tracker(&["a", "b"]);
        assert!(t.activate_section("b", &mut surface));
        assert!(!t.activate_section("b", &mut surface));
        assert_eq!(surface, vec![false, true]);
        assert_eq!(t.active_id(), Some("b"));
    }

    #[test]
    fn initial_activation_picks_first_section() {
        let (mut t, mut surface) = tracker(&["a", "b", "c"]);
        assert!(t.initial_activation(false, &mut surface));
        assert_eq!(surface, vec![true, false, false]);
    }

    #[test]
    fn initial_activation_without_sections_is_noop() {
        let (mut t, mut surface) = tracker(&[]);
        assert!(!t.initial_activation(false, &mut surface));
        assert_eq!(t.active_id(), None);
    }

    #[test]
    fn initial_activation_skippable_on_mobile() {
        let (t, mut surface) = tracker(&["a"]);
        let mut t = t.with_skip_initial_on_mobile(true);
        assert!(!t.initial_activation(true, &mut surface));
        assert!(t.initial_activation(false, &mut surface));
    }

    #[test]
    fn scroll_events_collapse_into_one_frame() {
        let (mut t, _) = tracker(&["a"]);
        assert_eq!(t.handle_scroll(), ScrollDisposition::ScheduleFrame);
        assert_eq!(t.handle_scroll(), ScrollDisposition::AlreadyScheduled);
        assert_eq!(t.handle_scroll(), ScrollDisposition::AlreadyScheduled);
        assert!(t.is_ticking());
    }

    #[test]
    fn frame_clears_gate_and_activates_nearest() {
        let (mut t, mut surface) = tracker(&["a", "b", "c"]);
        t.initial_activation(false, &mut surface);
        assert_eq!(t.handle_scroll(), ScrollDisposition::ScheduleFrame);
        assert!(t.on_animation_frame(&rects(3, 1000.0, 1000.0), &frame(1000.0), &mut surface));
        assert!(!t.is_ticking());
        assert_eq!(t.active_id(), Some("b"));
        assert_eq!(surface, vec![false, true, false]);
    }

    #[test]
    fn frame_without_sections_changes_nothing() {
        let (mut t, mut surface) = tracker(&[]);
        let _ = t.handle_scroll();
        assert!(!t.on_animation_frame(&[], &frame(0.0), &mut surface));
        assert!(!t.is_ticking());
    }

    #[test]
    fn link_click_is_optimistic_and_suppresses() {
        let (mut t, mut surface) = tracker(&["a", "b", "c"]);
        t.initial_activation(false, &mut surface);
        let target = Rect::new(0.0, 2000.0, 800.0, 1000.0);
        let plan = t.activate_by_link_click("c", &frame(0.0), &target, &mut surface);
        assert_eq!(t.active_id(), Some("c"));
        assert_eq!(surface, vec![false, false, true]);
        assert_eq!(plan.scroll_to, 2000.0);
        assert!(t.is_suppressed());
        assert_eq!(t.handle_scroll(), ScrollDisposition::Suppressed);
    }

    #[test]
    fn pending_frame_does_not_undo_click() {
        let (mut t, mut surface) = tracker(&["a", "b", "c"]);
        t.initial_activation(false, &mut surface);
        assert_eq!(t.handle_scroll(), ScrollDisposition::ScheduleFrame);

        let target = Rect::new(0.0, 2000.0, 800.0, 1000.0);
        let plan = t.activate_by_link_click("c", &frame(0.0), &target, &mut surface);
        assert!(!t.is_ticking());

        // The frame requested before the click runs with the old geometry.
        assert!(!t.on_animation_frame(&rects(3, 1000.0, 0.0), &frame(0.0), &mut surface));
        assert_eq!(t.active_id(), Some("c"));
        assert_eq!(surface, vec![false, false, true]);
        assert!(!t.is_ticking());

        assert!(t.end_programmatic_scroll(plan.generation));
        assert_eq!(t.handle_scroll(), ScrollDisposition::ScheduleFrame);
        assert!(t.on_animation_frame(&rects(3, 1000.0, 0.0), &frame(0.0), &mut surface));
        assert_eq!(t.active_id(), Some("a"));
    }

    #[test]
    fn header_offset_shifts_scroll_target() {
        let (t, mut surface) = tracker(&["a", "b"]);
        let mut t = t.with_header_offset(100.0);
        let container = ScrollFrame {
            viewport_top: 50.0,
            viewport_height: 500.0,
            scroll_top: 300.0,
            scroll_height: 4000.0,
        };
        let target = Rect::new(0.0, 850.0, 800.0, 400.0);
        let plan = t.activate_by_link_click("b", &container, &target, &mut surface);
        // 300 + (850 - 50 - 100)
        assert_eq!(plan.scroll_to, 1000.0);
        // 700px at 0.5ms/px = 350ms, plus 80ms settle.
        assert_eq!(plan.suppress_for, Duration::from_millis(430));
    }

    #[test]
    fn stale_timer_does_not_end_newer_suppression() {
        let (mut t, mut surface) = tracker(&["a", "b"]);
        let target = Rect::new(0.0, 500.0, 800.0, 500.0);
        let first = t.activate_by_link_click("b", &frame(0.0), &target, &mut surface);
        let second = t.activate_by_link_click("a", &frame(0.0), &target, &mut surface);
        assert!(!t.end_programmatic_scroll(first.generation));
        assert!(t.is_suppressed());
        assert!(t.end_programmatic_scroll(second.generation));
        assert!(!t.is_suppressed());
        assert_eq!(t.handle_scroll(), ScrollDisposition::ScheduleFrame);
    }

    #[test]
    fn timing_is_clamped() {
        let timing = ScrollTiming::default();
        assert_eq!(timing.estimate(0.0), Duration::from_millis(400));
        assert_eq!(timing.estimate(-10_000.0), Duration::from_millis(980));
        assert_eq!(timing.estimate(1000.0), Duration::from_millis(580));
        assert_eq!(timing.estimate(f64::NAN), Duration::from_millis(980));
    }

    #[test]
    fn timing_rounds_half_up() {
        let timing = ScrollTiming::default();
        // 1201 * 0.5 = 600.5 → 601
        assert_eq!(timing.estimate(1201.0), Duration::from_millis(681));
    }
}
