#![forbid(unsafe_code)]

//! Error types shared by the core and the web frontend.
//!
//! Event handlers never surface errors to the page: only configuration
//! parsing and the one-time mount can fail.

/// Errors from parsing or validating a [`PortfolioConfig`](crate::config::PortfolioConfig).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Malformed JSON.
    Json(String),
    /// A field holds a value the page cannot work with.
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Json(msg) => write!(f, "config JSON parse error: {msg}"),
            Self::Invalid { field, reason } => {
                write!(f, "invalid config field `{field}`: {reason}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Errors from wiring the page behavior onto a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MountError {
    /// No global `window` (not running in a browser main thread).
    NoWindow,
    /// `window.document` is unavailable.
    NoDocument,
    /// `document.body` is unavailable.
    NoBody,
    /// A required element was not found.
    MissingElement(String),
    /// A DOM call threw.
    Dom(String),
    /// The host supplied a bad configuration.
    Config(ConfigError),
}

impl core::fmt::Display for MountError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NoWindow => f.write_str("no global window"),
            Self::NoDocument => f.write_str("window has no document"),
            Self::NoBody => f.write_str("document has no body"),
            Self::MissingElement(selector) => write!(f, "missing element: {selector}"),
            Self::Dom(msg) => write!(f, "DOM error: {msg}"),
            Self::Config(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for MountError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ConfigError> for MountError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn error_display() {
        let e1 = ConfigError::Json("bad".into());
        assert!(format!("{e1}").contains("JSON parse error"));

        let e2 = ConfigError::Invalid {
            field: "timing.minMs",
            reason: "must not exceed timing.maxMs",
        };
        assert!(format!("{e2}").contains("timing.minMs"));

        let e3 = MountError::MissingElement(".portfolio".into());
        assert!(format!("{e3}").contains(".portfolio"));
    }

    #[test]
    fn mount_error_wraps_config_source() {
        let err = MountError::from(ConfigError::Json("eof".into()));
        assert!(err.source().is_some());
        assert!(MountError::NoBody.source().is_none());
    }
}
