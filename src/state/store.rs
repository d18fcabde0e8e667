//! # Version state and its read-only view.
//!
//! [`VersionState`] is the single mutable record the agent owns. It lives behind a
//! `tokio::sync::RwLock` inside [`StateStore`]; the agent loop is its only writer and everything
//! else (HTTP handlers, tests) gets a [`StateReader`].
//!
//! ## Rules
//! - Exactly one writer: the agent loop holds the write guard for a whole
//!   reconcile-and-announce sequence.
//! - Readers never observe a half-applied notification.
//! - Nothing is persisted; the controller re-announces after a restart.

use std::sync::Arc;

use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::version::DETECTING;

/// Mutable version record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionState {
    /// Current software version (triple or opaque token).
    pub current: String,
    /// Tag of the image the service runs from.
    pub current_image_version: String,
    /// Image tags most recently announced by the controller.
    pub known_image_versions: Vec<String>,
}

impl VersionState {
    /// Creates the provisional start-up record.
    ///
    /// Without a configured image tag the image starts as the `detecting...` sentinel.
    pub fn new(initial_version: impl Into<String>, image_version: Option<String>) -> Self {
        Self {
            current: initial_version.into(),
            current_image_version: image_version.unwrap_or_else(|| DETECTING.to_string()),
            known_image_versions: Vec::new(),
        }
    }

    /// Replaces the known image list wholesale (never merges).
    ///
    /// If an entry belongs to `family`, the first such entry becomes the current image.
    /// Returns `true` when the current image changed.
    pub fn replace_images(&mut self, images: Vec<String>, family: &str) -> bool {
        let own = images
            .iter()
            .find(|tag| !family.is_empty() && tag.contains(family))
            .cloned();
        self.known_image_versions = images;

        match own {
            Some(tag) if tag != self.current_image_version => {
                self.current_image_version = tag;
                true
            }
            _ => false,
        }
    }
}

/// Owner of the shared [`VersionState`].
#[derive(Debug, Clone)]
pub struct StateStore {
    inner: Arc<RwLock<VersionState>>,
}

impl StateStore {
    /// Wraps the initial record.
    pub fn new(state: VersionState) -> Self {
        Self {
            inner: Arc::new(RwLock::new(state)),
        }
    }

    /// Exclusive access for the agent loop.
    pub(crate) async fn write(&self) -> RwLockWriteGuard<'_, VersionState> {
        self.inner.write().await
    }

    /// Read-only handle for collaborators.
    pub fn reader(&self) -> StateReader {
        StateReader {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Read-only handle to the agent's [`VersionState`].
#[derive(Debug, Clone)]
pub struct StateReader {
    inner: Arc<RwLock<VersionState>>,
}

impl StateReader {
    /// Borrows the state for reading.
    pub async fn read(&self) -> RwLockReadGuard<'_, VersionState> {
        self.inner.read().await
    }

    /// Copies the state out.
    pub async fn get(&self) -> VersionState {
        self.inner.read().await.clone()
    }

    /// Current version string.
    pub async fn version(&self) -> String {
        self.inner.read().await.current.clone()
    }
}
