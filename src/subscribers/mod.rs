//! # Event subscribers.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out and the built-in
//! [`LogWriter`].
//!
//! ## Architecture
//! ```text
//! Agent / MQTT driver / Shutdown ── publish(Event) ──► Bus
//!                                                       │
//!                                          event listener (agent)
//!                                                       │
//!                                            SubscriberSet::emit()
//!                                     ┌─────────────────┼──────────────┐
//!                                     ▼                 ▼              ▼
//!                                 LogWriter          Custom          ...
//! ```

mod log;
mod set;
mod subscribe;

pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
