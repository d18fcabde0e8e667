//! # Version strings: numeric triples and opaque tokens.
//!
//! A version held by the agent is either a well-formed `MAJOR.MINOR.PATCH` triple or an opaque
//! token (a sentinel such as `detecting...`, or any tag the controller hands us). Only triples take
//! part in arithmetic.
//!
//! ## Grammar
//! ```text
//! triple := digits "." digits "." digits
//! digits := [0-9]+            (must fit in u64)
//! ```
//! Anything else, including `1.2`, `v1.2.3`, `1.2.3-rc1` and ` 1.2.3`, is opaque.
//!
//! ## Example
//! ```rust
//! use subco_agent::state::{increment, Version};
//!
//! assert_eq!(increment("2.3.9").unwrap(), "2.3.10");
//! assert!(increment("detecting...").is_err());
//! assert!(matches!(Version::parse("1.0.0"), Version::Triple { .. }));
//! ```

use std::fmt;

use crate::error::UpdateError;

/// Sentinel used while the running image is being detected.
pub const DETECTING: &str = "detecting...";
/// Sentinel used when the service container is not running.
pub const NOT_RUNNING: &str = "not-running";
/// Sentinel used when detection itself failed.
pub const DETECTION_FAILED: &str = "detection-failed";
/// Sentinel used when detection succeeded but produced nothing usable.
pub const UNKNOWN: &str = "unknown";

/// Parsed view of a version string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Version {
    /// Well-formed `MAJOR.MINOR.PATCH`.
    Triple {
        /// Major component.
        major: u64,
        /// Minor component.
        minor: u64,
        /// Patch component.
        patch: u64,
    },
    /// Any string that is not a well-formed triple.
    Opaque(String),
}

impl Version {
    /// Classifies `raw`. Never fails: non-triples become [`Version::Opaque`].
    pub fn parse(raw: &str) -> Self {
        let mut parts = raw.split('.');
        let triple = match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(a), Some(b), Some(c), None) => {
                component(a).zip(component(b)).zip(component(c))
            }
            _ => None,
        };

        match triple {
            Some(((major, minor), patch)) => Version::Triple {
                major,
                minor,
                patch,
            },
            None => Version::Opaque(raw.to_string()),
        }
    }

    /// True for sentinels and free-form tags.
    pub fn is_opaque(&self) -> bool {
        matches!(self, Version::Opaque(_))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Version::Triple {
                major,
                minor,
                patch,
            } => write!(f, "{major}.{minor}.{patch}"),
            Version::Opaque(raw) => f.write_str(raw),
        }
    }
}

/// Parses one numeric component: ASCII digits only, no sign, must fit in `u64`.
fn component(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Returns `MAJOR.MINOR.(PATCH+1)` for a well-formed triple.
///
/// Opaque tokens are refused with [`UpdateError::IncrementRefused`]; so is a patch component that
/// would overflow. The caller keeps its current value in that case.
///
/// Leading zeros in `MAJOR`/`MINOR` are preserved verbatim; only the patch is rewritten.
pub fn increment(current: &str) -> Result<String, UpdateError> {
    let refused = || UpdateError::IncrementRefused {
        version: current.to_string(),
    };

    match Version::parse(current) {
        Version::Triple { patch, .. } => {
            let next = patch.checked_add(1).ok_or_else(refused)?;
            let (head, _) = current.rsplit_once('.').ok_or_else(refused)?;
            Ok(format!("{head}.{next}"))
        }
        Version::Opaque(_) => Err(refused()),
    }
}
