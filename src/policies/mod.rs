//! Session policies.
//!
//! ## Contents
//! - [`ReconnectPolicy`] how long the session driver waits between reconnect attempts
//!
//! ## Quick wiring
//! ```text
//! AgentConfig { reconnect: ReconnectPolicy, .. }
//!      └─► transport::mqtt driver sleeps reconnect.delay() after every failed poll
//! ```

mod reconnect;

pub use reconnect::ReconnectPolicy;
