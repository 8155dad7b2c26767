#![forbid(unsafe_code)]

//! Side-menu links and the surface that displays their state.

/// A navigation entry pointing at a section by fragment (`href="#about"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLink {
    target: String,
}

impl NavLink {
    /// Parse an anchor `href` attribute.
    ///
    /// Only same-page fragments (`#id`, non-empty) are tracked; anything else
    /// is a regular link the page leaves alone.
    #[must_use]
    pub fn from_href(href: &str) -> Option<Self> {
        let target = href.trim().strip_prefix('#')?;
        if target.is_empty() {
            return None;
        }
        Some(Self {
            target: target.to_owned(),
        })
    }

    /// Id of the section this link scrolls to.
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    #[must_use]
    pub fn points_at(&self, section_id: &str) -> bool {
        self.target == section_id
    }
}

/// Whatever renders link highlight state.
///
/// The web frontend toggles a CSS class on the anchor at `index`; tests use
/// a plain vector.
pub trait LinkSurface {
    fn set_link_active(&mut self, index: usize, active: bool);
}

impl LinkSurface for Vec<bool> {
    fn set_link_active(&mut self, index: usize, active: bool) {
        if let Some(slot) = self.get_mut(index) {
            *slot = active;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fragment_links() {
        let link = NavLink::from_href("#projects").unwrap();
        assert_eq!(link.target(), "projects");
        assert!(link.points_at("projects"));
        assert!(!link.points_at("about"));
    }

    #[test]
    fn rejects_non_fragment_links() {
        assert_eq!(NavLink::from_href("#"), None);
        assert_eq!(NavLink::from_href(""), None);
        assert_eq!(NavLink::from_href("https://example.com/#top"), None);
        assert_eq!(NavLink::from_href("cv.pdf"), None);
    }

    #[test]
    fn vec_surface_ignores_out_of_range() {
        let mut surface = vec![false; 2];
        surface.set_link_active(1, true);
        surface.set_link_active(5, true);
        assert_eq!(surface, vec![false, true]);
    }
}
