//! # Publish/subscribe session seam.
//!
//! The agent talks to the broker only through [`Transport`] (requests) and a stream of
//! [`TransportEvent`]s (lifecycle and inbound messages). The production implementation is
//! [`MqttTransport`]; tests drive the agent with an in-memory mock.
//!
//! ```text
//!            requests (sync, fire-and-forget)
//!   Agent ───────────────────────────────────────► Transport ──► broker
//!     ▲                                                │
//!     └──────────── mpsc<TransportEvent> ◄─────────────┘
//!         Connected | Disconnected | Error | Message | Closed
//! ```
//!
//! ## Rules
//! - `Connected` is sent once per successful (re)connection.
//! - `Message`s keep arrival order within one connection; nothing is promised across reconnects.
//! - `Closed` is sent once, after [`Transport::end`], and is the last event on the stream.
//! - `publish`/`subscribe` only enqueue; a returned error means the request was never queued.

mod mqtt;
mod topics;

#[cfg(test)]
pub(crate) mod mock;

pub use mqtt::{BrokerAddr, MqttTransport, parse_broker_url};
pub use topics::{Inbound, Topics};

use crate::error::TransportError;

/// Lifecycle and inbound-message events produced by a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// Session (re)connected; subscriptions must be re-issued.
    Connected,
    /// Established session was lost; reconnect follows.
    Disconnected,
    /// Transport-level failure; reconnect follows.
    Error(String),
    /// Inbound message.
    Message {
        /// Topic the message was published on.
        topic: String,
        /// Raw payload.
        payload: Vec<u8>,
    },
    /// Session ended after [`Transport::end`]. Last event.
    Closed,
}

/// Request side of a publish/subscribe session.
pub trait Transport: Send + Sync + 'static {
    /// True while the broker session is established.
    fn is_connected(&self) -> bool;

    /// Address the session connects to (for status output).
    fn broker_url(&self) -> &str;

    /// Queues a subscription request (QoS 1).
    fn subscribe(&self, topic: &str) -> Result<(), TransportError>;

    /// Queues a publish (QoS 1, not retained).
    fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), TransportError>;

    /// Requests the session to end.
    ///
    /// With `drain`, requests queued before this call are flushed first. Completion is reported
    /// as [`TransportEvent::Closed`].
    fn end(&self, drain: bool);
}
