#![forbid(unsafe_code)]

//! Device heuristics.
//!
//! Two distinct signals exist on purpose: the scroll-spy uses the user agent
//! to decide whether to highlight a section on load, while the popover
//! layout follows the viewport width through a media query (see
//! [`PlacementConfig::mobile_media_query`](crate::popover::PlacementConfig::mobile_media_query)).

use std::sync::OnceLock;

use regex::Regex;

const MOBILE_AGENT_PATTERN: &str =
    r"(?i)android|webos|iphone|ipad|ipod|blackberry|iemobile|opera mini";

fn mobile_agent_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(MOBILE_AGENT_PATTERN).ok()).as_ref()
}

/// Whether `user_agent` looks like a phone or tablet browser.
#[must_use]
pub fn is_mobile_user_agent(user_agent: &str) -> bool {
    mobile_agent_regex().is_some_and(|re| re.is_match(user_agent))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_common_mobile_agents() {
        for ua in [
            "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15",
            "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36 Mobile Safari/537.36",
            "Mozilla/5.0 (iPad; CPU OS 16_6 like Mac OS X)",
            "Opera/9.80 (J2ME/MIDP; Opera Mini/9.80 (S60; SymbOS; Opera Mobi/23.348; U; en) Presto/2.5.25",
        ] {
            assert!(is_mobile_user_agent(ua), "{ua}");
        }
    }

    #[test]
    fn desktop_agents_are_not_mobile() {
        for ua in [
            "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0",
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 Chrome/126.0 Safari/537.36",
            "",
        ] {
            assert!(!is_mobile_user_agent(ua), "{ua}");
        }
    }
}
