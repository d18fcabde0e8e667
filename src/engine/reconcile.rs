//! # Version reconciliation policy.
//!
//! [`Reconciler::apply`] turns one raw update notification into a state change and tells the
//! caller which version to announce. It performs no I/O; the agent loop publishes the result.
//!
//! ## Flow
//! ```text
//! payload ──► parse ──► Err(Malformed/WrongShape) ──► no change, no announcement
//!               │
//!               ├─► redelivery within window ──► no change, announce current
//!               │
//!               ├─► imageVersions? ──► replace list wholesale, pick own-family image
//!               │
//!               ├─► subcoVersion non-empty? ──► current = subcoVersion          (Override)
//!               │                        else ──► current = increment(current)  (Increment)
//!               │                                   └─ opaque current ─► keep   (Kept + IncrementRefused)
//!               ▼
//!        announce current
//! ```
//!
//! ## Rules
//! - Override always wins over increment.
//! - Image list is never merged across notifications.
//! - A rejected notification leaves the state byte-for-byte unchanged.
//! - Every accepted notification is announced, even when nothing changed.

use std::time::Duration;

use tokio::time::Instant;

use super::dedup::DuplicateFilter;
use super::notification::UpdateNotification;
use crate::error::UpdateError;
use crate::state::{VersionState, increment};

/// How the announced version was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionSource {
    /// Set verbatim from the notification.
    Override,
    /// Patch component incremented.
    Increment,
    /// Current version is opaque; kept as is.
    Kept,
    /// Notification was a redelivery of the previous one; nothing applied.
    Redelivery,
}

impl VersionSource {
    /// Short label for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            VersionSource::Override => "override",
            VersionSource::Increment => "increment",
            VersionSource::Kept => "kept",
            VersionSource::Redelivery => "redelivery",
        }
    }
}

/// Result of an accepted notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// Version to announce.
    pub announce: String,
    /// How it was obtained.
    pub source: VersionSource,
    /// Length of the new image list, when one was applied.
    pub images_replaced: Option<usize>,
    /// New current image, when it changed.
    pub image_changed: Option<String>,
    /// Recoverable problem met along the way.
    pub warning: Option<UpdateError>,
}

/// Applies update notifications to a [`VersionState`].
#[derive(Debug)]
pub struct Reconciler {
    family: String,
    dedup: DuplicateFilter,
}

impl Reconciler {
    /// Creates a reconciler.
    ///
    /// - `family`: substring identifying this service's own images.
    /// - `dedup_window`: redelivery window (`0` disables).
    pub fn new(family: impl Into<String>, dedup_window: Duration) -> Self {
        Self {
            family: family.into(),
            dedup: DuplicateFilter::new(dedup_window),
        }
    }

    /// Applies one raw notification.
    ///
    /// Returns `Err` only when the notification is rejected as a whole; `state` is then untouched.
    pub fn apply(
        &mut self,
        state: &mut VersionState,
        payload: &[u8],
        now: Instant,
    ) -> Result<Outcome, UpdateError> {
        let notification = UpdateNotification::parse(payload)?;

        if self.dedup.is_redelivery(payload, now) {
            return Ok(Outcome {
                announce: state.current.clone(),
                source: VersionSource::Redelivery,
                images_replaced: None,
                image_changed: None,
                warning: None,
            });
        }

        let mut images_replaced = None;
        let mut image_changed = None;
        if let Some(images) = notification.image_versions.clone() {
            images_replaced = Some(images.len());
            if state.replace_images(images, &self.family) {
                image_changed = Some(state.current_image_version.clone());
            }
        }

        let (source, warning) = match notification.override_version() {
            Some(v) => {
                state.current = v.to_string();
                (VersionSource::Override, None)
            }
            None => match increment(&state.current) {
                Ok(next) => {
                    state.current = next;
                    (VersionSource::Increment, None)
                }
                Err(e) => (VersionSource::Kept, Some(e)),
            },
        };

        self.dedup.record(payload, now);

        Ok(Outcome {
            announce: state.current.clone(),
            source,
            images_replaced,
            image_changed,
            warning,
        })
    }
}
