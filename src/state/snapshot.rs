//! # Device status snapshot.
//!
//! [`DeviceStatusSnapshot`] is the immutable record published on the status topic and served by
//! `GET /device-status`. It is a point-in-time copy of [`VersionState`] plus static
//! [`DeviceIdentity`] fields.
//!
//! ## Wire format
//! ```text
//! {
//!   "ip": "10.0.0.7",
//!   "mac": "aa:bb:cc:dd:ee:ff",
//!   "version": "1.0.1",
//!   "containerImageVersion": "fleet-subco:v2",
//!   "availableImageVersions": ["fleet-subco:v2"],
//!   "timestamp": "2026-10-19T12:00:00.000Z",
//!   "uptimeSeconds": 42
//! }
//! ```

use std::time::Instant;

use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use super::store::VersionState;

/// Static identity tags from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceIdentity {
    /// Device IP tag.
    pub ip: String,
    /// Device MAC tag.
    pub mac: String,
}

impl Default for DeviceIdentity {
    fn default() -> Self {
        Self {
            ip: "unknown".to_string(),
            mac: "unknown".to_string(),
        }
    }
}

/// Immutable status record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceStatusSnapshot {
    /// Device IP from the identity.
    pub ip: String,
    /// Device MAC from the identity.
    pub mac: String,
    /// Current version.
    pub version: String,
    /// Current image tag or a sentinel.
    pub container_image_version: String,
    /// Known image tags, in controller order.
    pub available_image_versions: Vec<String>,
    /// Capture time, RFC 3339 UTC.
    pub timestamp: String,
    /// Whole seconds since start.
    pub uptime_seconds: u64,
}

impl DeviceStatusSnapshot {
    /// Captures `state` and `identity` now.
    pub fn capture(state: &VersionState, identity: &DeviceIdentity, started_at: Instant) -> Self {
        Self {
            ip: identity.ip.clone(),
            mac: identity.mac.clone(),
            version: state.current.clone(),
            container_image_version: state.current_image_version.clone(),
            available_image_versions: state.known_image_versions.clone(),
            timestamp: now_rfc3339(),
            uptime_seconds: started_at.elapsed().as_secs(),
        }
    }

    /// Encodes the snapshot as JSON.
    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

/// RFC 3339 UTC timestamp with millisecond precision.
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
