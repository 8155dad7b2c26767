#![forbid(unsafe_code)]

//! Scroll-spy section selection.
//!
//! Pure functions from (section geometry, scroll frame) to the index of the
//! section that should be highlighted. Nothing here touches the DOM, so the
//! selection rules are unit-testable without a browser.
//!
//! Two strategies exist and they disagree near section boundaries:
//!
//! - [`SpyStrategy::NearestCenter`] picks the section whose midpoint is
//!   closest to the centre of the scrolling box.
//! - [`SpyStrategy::OffsetThreshold`] picks the last section whose top has
//!   passed a fixed line below the top of the box, and forces the last
//!   section once the box is scrolled to the bottom.
//!
//! The page picks one through configuration.

use serde::Deserialize;

use crate::geometry::{Rect, ScrollFrame};

/// A section id paired with its measured rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectionProbe<'a> {
    pub id: &'a str,
    pub rect: Rect,
}

/// Which rule decides the active section.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SpyStrategy {
    /// Midpoint nearest the centre of the scrolling box wins.
    #[default]
    NearestCenter,
    /// Last section whose top is at most `offset` px below the box top wins.
    OffsetThreshold { offset: f64 },
}

impl SpyStrategy {
    /// Index into `sections` of the section to highlight, or `None` when
    /// there are no sections (or no finite candidate).
    #[must_use]
    pub fn select(&self, sections: &[SectionProbe<'_>], frame: &ScrollFrame) -> Option<usize> {
        match *self {
            Self::NearestCenter => nearest_to_center(sections, frame.center_y()),
            Self::OffsetThreshold { offset } => last_reached(sections, frame, offset),
        }
    }
}

/// Section whose vertical midpoint is closest to `center_y`.
///
/// Ties keep the earliest section: the comparison is strict.
#[must_use]
pub fn nearest_to_center(sections: &[SectionProbe<'_>], center_y: f64) -> Option<usize> {
    let mut nearest = None;
    let mut min_dist = f64::INFINITY;
    for (idx, section) in sections.iter().enumerate() {
        let dist = (section.rect.mid_y() - center_y).abs();
        if dist < min_dist {
            min_dist = dist;
            nearest = Some(idx);
        }
    }
    nearest
}

/// Last section (document order) whose top sits at or above the threshold
/// line `offset` px below the top of the scrolling box.
///
/// Defaults to the first section when none has reached the line; returns
/// the last section unconditionally when the frame is at the bottom, since
/// short trailing sections can never reach the line otherwise.
#[must_use]
pub fn last_reached(
    sections: &[SectionProbe<'_>],
    frame: &ScrollFrame,
    offset: f64,
) -> Option<usize> {
    if sections.is_empty() {
        return None;
    }
    if frame.is_at_bottom() {
        return Some(sections.len() - 1);
    }
    let reached = sections
        .iter()
        .rposition(|section| frame.relative_top(&section.rect) <= offset);
    Some(reached.unwrap_or(0))
}
