//! Device state: version record, version grammar and status snapshots.
//!
//! ## Contents
//! - [`VersionState`], [`StateStore`], [`StateReader`] the owned record and its read-only view
//! - [`Version`], [`increment`] version grammar and the patch-increment rule
//! - [`DeviceStatusSnapshot`], [`DeviceIdentity`] the published status record

mod snapshot;
mod store;
mod version;

pub use snapshot::{DeviceIdentity, DeviceStatusSnapshot, now_rfc3339};
pub use store::{StateReader, StateStore, VersionState};
pub use version::{DETECTING, DETECTION_FAILED, NOT_RUNNING, UNKNOWN, Version, increment};
