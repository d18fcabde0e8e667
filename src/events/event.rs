//! # Runtime events emitted by the agent.
//!
//! The [`EventKind`] enum classifies event types across four categories:
//! - **Session events**: broker connectivity and subscriptions
//! - **Reconciliation events**: queries, applied/rejected notifications, announcements
//! - **Heartbeat events**: published or skipped status snapshots
//! - **Shutdown events**: signal, drain completion, timeout
//!
//! The [`Event`] struct carries metadata such as the topic, the version involved, a reason and a
//! count.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use subco_agent::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::VersionAnnounced)
//!     .with_topic("/Version")
//!     .with_version("1.0.1");
//!
//! assert_eq!(ev.kind, EventKind::VersionAnnounced);
//! assert_eq!(ev.version.as_deref(), Some("1.0.1"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `reason`: subscriber name and panic info
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `reason`: subscriber name and reason ("full", "closed")
    SubscriberOverflow,

    // === Session events ===
    /// Session (re)connected to the broker.
    ///
    /// Sets:
    /// - `reason`: broker url
    Connected,

    /// Session lost its connection.
    Disconnected,

    /// Transport-level failure (refused, unresolved, timeout); reconnect follows.
    ///
    /// Sets:
    /// - `reason`: error message
    TransportError,

    /// Subscription request issued.
    ///
    /// Sets:
    /// - `topic`: subscribed topic
    Subscribed,

    /// Subscription request could not be issued.
    ///
    /// Sets:
    /// - `topic`: topic
    /// - `reason`: error message
    SubscribeFailed,

    // === Reconciliation events ===
    /// Version query received.
    VersionQueried,

    /// Update notification applied.
    ///
    /// Sets:
    /// - `version`: resulting version
    /// - `reason`: source label ("override", "increment", "kept", "redelivery")
    UpdateApplied,

    /// Update notification rejected as a whole (malformed or wrong shape).
    ///
    /// Sets:
    /// - `reason`: decoder message
    UpdateRejected,

    /// Recoverable problem while applying an update (e.g. increment refused).
    ///
    /// Sets:
    /// - `version`: version that was kept
    /// - `reason`: error label/message
    UpdateWarning,

    /// Known image list replaced.
    ///
    /// Sets:
    /// - `count`: new list length
    ImagesReplaced,

    /// Current image identifier changed.
    ///
    /// Sets:
    /// - `version`: new image tag
    ImageChanged,

    /// Version announced on the version topic.
    ///
    /// Sets:
    /// - `topic`: announcement topic
    /// - `version`: announced value
    VersionAnnounced,

    /// Message on a topic the agent does not handle.
    ///
    /// Sets:
    /// - `topic`: topic
    UnhandledMessage,

    /// Publish could not be handed to the session. Not retried.
    ///
    /// Sets:
    /// - `topic`: topic
    /// - `reason`: error message
    PublishFailed,

    // === Heartbeat events ===
    /// Status snapshot published.
    ///
    /// Sets:
    /// - `topic`: status topic
    /// - `version`: version in the snapshot
    HeartbeatPublished,

    /// Tick skipped because the session was disconnected.
    HeartbeatSkipped,

    /// Snapshot could not be encoded.
    ///
    /// Sets:
    /// - `reason`: encoder message
    HeartbeatFailed,

    // === Discovery events ===
    /// Image discovery finished.
    ///
    /// Sets:
    /// - `version`: detected tag or sentinel
    /// - `reason`: failure detail, if any
    ImageDetected,

    // === Shutdown events ===
    /// Shutdown requested (OS signal observed or explicit trigger).
    ShutdownRequested,

    /// Session and listener closed within the safety timeout.
    AllStoppedWithin,

    /// Safety timeout elapsed before everything closed.
    ///
    /// Sets:
    /// - `reason`: components still open
    GraceExceeded,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Topic involved, if any.
    pub topic: Option<Arc<str>>,
    /// Version or image tag involved, if any.
    pub version: Option<Arc<str>>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
    /// Item count (e.g. image list length).
    pub count: Option<usize>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            topic: None,
            version: None,
            reason: None,
            count: None,
        }
    }

    /// Attaches a topic.
    #[inline]
    pub fn with_topic(mut self, topic: impl Into<Arc<str>>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    /// Attaches a version or image tag.
    #[inline]
    pub fn with_version(mut self, version: impl Into<Arc<str>>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a count.
    #[inline]
    pub fn with_count(mut self, n: usize) -> Self {
        self.count = Some(n);
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_reason(format!("subscriber={subscriber} info={info}"))
    }

    /// Creates a publish failure event.
    #[inline]
    pub fn publish_failed(topic: &str, err: &crate::error::TransportError) -> Self {
        Event::new(EventKind::PublishFailed)
            .with_topic(topic)
            .with_reason(err.as_message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seq_is_monotonic() {
        let a = Event::new(EventKind::Connected);
        let b = Event::new(EventKind::Disconnected);
        assert!(b.seq > a.seq);
    }
}
