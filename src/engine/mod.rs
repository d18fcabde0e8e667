//! Version reconciliation engine.
//!
//! Pure policy: decoding update notifications and applying them to the version state. The agent
//! loop owns the I/O around it (announcing the result, logging warnings).
//!
//! ## Contents
//! - [`UpdateNotification`] payload decoding (`Malformed` vs `WrongShape`)
//! - [`Reconciler`] override/increment policy, image list replacement, redelivery filter
//! - [`Outcome`], [`VersionSource`] what the caller announces and logs

mod dedup;
mod notification;
mod reconcile;

pub use dedup::DuplicateFilter;
pub use notification::{UpdateNotification, VersionOverrides};
pub use reconcile::{Outcome, Reconciler, VersionSource};
