//! # Core subscriber trait
//!
//! `Subscribe` is the extension point for plugging custom event handlers into the agent. Each
//! subscriber is driven by a dedicated worker loop fed by a bounded queue owned by the
//! [`SubscriberSet`](crate::subscribers::SubscriberSet).
//!
//! ## Contract
//! - Implementations may be slow (I/O, batching) – they do **not** block the agent loop nor other
//!   subscribers.
//! - Each subscriber declares its preferred queue capacity via [`Subscribe::queue_capacity`]. If a
//!   queue overflows, events for that subscriber are **dropped**.
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use subco_agent::{Event, EventKind, Subscribe};
//!
//! struct AnnouncementCounter;
//!
//! #[async_trait]
//! impl Subscribe for AnnouncementCounter {
//!     async fn on_event(&self, ev: &Event) {
//!         if ev.kind == EventKind::VersionAnnounced {
//!             // count it...
//!         }
//!     }
//!     fn name(&self) -> &'static str { "announcement-counter" }
//! }
//! ```

use async_trait::async_trait;

use crate::events::Event;

/// Contract for event subscribers.
///
/// Called from a subscriber-dedicated worker task. Implementations should avoid blocking the async
/// runtime.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handle a single event for this subscriber.
    async fn on_event(&self, event: &Event);

    /// Human-readable name (for logs).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Preferred capacity of this subscriber's queue.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
