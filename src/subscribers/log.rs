//! # LogWriter: events as structured log lines
//!
//! [`LogWriter`] turns every [`Event`] into a `tracing` record. The installed
//! `tracing_subscriber` decides format and filtering.
//!
//! ## Example output
//! ```text
//! INFO subco_agent::subscribers::log: connected broker="mqtt://localhost:1883"
//! INFO subco_agent::subscribers::log: update applied version="1.0.1" source="increment"
//! INFO subco_agent::subscribers::log: version announced topic="/Version" version="1.0.1"
//! WARN subco_agent::subscribers::log: update rejected reason="malformed: expected value at line 1 column 1"
//! WARN subco_agent::subscribers::log: grace exceeded open="session"
//! ```

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let topic = e.topic.as_deref().unwrap_or("-");
        let version = e.version.as_deref().unwrap_or("-");
        let reason = e.reason.as_deref().unwrap_or("-");

        match e.kind {
            EventKind::SubscriberPanicked => error!(reason, "subscriber panicked"),
            EventKind::SubscriberOverflow => warn!(reason, "subscriber overflow"),

            EventKind::Connected => info!(broker = reason, "connected"),
            EventKind::Disconnected => warn!("disconnected"),
            EventKind::TransportError => warn!(reason, "transport error, reconnecting"),
            EventKind::Subscribed => info!(topic, "subscribed"),
            EventKind::SubscribeFailed => warn!(topic, reason, "subscribe failed"),

            EventKind::VersionQueried => info!("version queried"),
            EventKind::UpdateApplied => info!(version, source = reason, "update applied"),
            EventKind::UpdateRejected => warn!(reason, "update rejected"),
            EventKind::UpdateWarning => warn!(version, reason, "update warning"),
            EventKind::ImagesReplaced => info!(count = e.count.unwrap_or(0), "images replaced"),
            EventKind::ImageChanged => info!(image = version, "image changed"),
            EventKind::VersionAnnounced => info!(topic, version, "version announced"),
            EventKind::UnhandledMessage => debug!(topic, "unhandled message"),
            EventKind::PublishFailed => warn!(topic, reason, "publish failed"),

            EventKind::HeartbeatPublished => debug!(topic, version, "heartbeat published"),
            EventKind::HeartbeatSkipped => debug!("heartbeat skipped, not connected"),
            EventKind::HeartbeatFailed => warn!(reason, "heartbeat failed"),

            EventKind::ImageDetected => match e.reason.as_deref() {
                Some(detail) => warn!(image = version, detail, "image detection finished"),
                None => info!(image = version, "image detected"),
            },

            EventKind::ShutdownRequested => info!("shutdown requested"),
            EventKind::AllStoppedWithin => info!("all stopped within grace"),
            EventKind::GraceExceeded => warn!(open = reason, "grace exceeded"),
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
