//! # subco-agent
//!
//! **subco-agent** is a small edge agent that keeps a device's software version in sync with an
//! upstream controller over MQTT and exposes the current state over HTTP.
//!
//! The core is a version-reconciliation and heartbeat engine: it receives update notifications,
//! decides how the locally held version advances (explicit override or patch increment), keeps
//! the list of known image tags, and periodically publishes a device status snapshot, all while
//! the broker connection may be absent, flapping or reconnecting.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!      broker                                               HTTP clients
//!        ▲ │                                                     │
//!        │ ▼                                                     ▼
//! ┌───────────────────┐  mpsc<TransportEvent>   ┌─────────────────────────────┐
//! │   MqttTransport   │───────────────────────► │  Agent (single select! loop)│
//! │  (driver task,    │ ◄─────────────────────  │  - Reconciler               │
//! │   reconnect)      │  publish / subscribe    │  - Heartbeat                │
//! └───────────────────┘                         │  - shutdown coordination    │
//!                                               └──────┬───────────────┬──────┘
//!   ImageDiscovery ── mpsc<Command> ───────────────────┘               │
//!                                                                      ▼
//!                                    StateStore (RwLock<VersionState>) ──► StateReader ──► http
//!                                                                      │
//!                                                                      ▼
//! ┌───────────────────────────────────────────────────────────────────────────────────────┐
//! │                             Bus (broadcast channel)                                   │
//! └──────────────────────────────────────────┬────────────────────────────────────────────┘
//!                                            ▼
//!                                      fan-out task
//!                                            ▼
//!                                      SubscriberSet
//!                                 ┌──────────┼──────────┐
//!                                 ▼          ▼          ▼
//!                             LogWriter    custom      ...
//! ```
//!
//! ### Update notification lifecycle
//! ```text
//! <prefix>newUpdate ──► Agent ──► write lock
//!                                   ├─► Reconciler::apply(payload)
//!                                   │      ├─ Err(Malformed | WrongShape) ─► UpdateRejected, no publish
//!                                   │      └─ Ok(outcome)
//!                                   │            ├─ ImagesReplaced / ImageChanged
//!                                   │            ├─ UpdateWarning (increment refused)
//!                                   │            └─ UpdateApplied
//!                                   ├─► publish <prefix>Version = outcome.announce
//!                                   └─► unlock
//! ```
//!
//! ## Features
//! | Area              | Description                                                   | Key types / traits                          |
//! |-------------------|---------------------------------------------------------------|---------------------------------------------|
//! | **Runtime**       | Agent loop, builder, shutdown coordination.                   | [`Agent`], [`AgentBuilder`], [`ShutdownHandle`] |
//! | **Reconciliation**| Version policy, redelivery filter, notification decoding.     | [`Reconciler`], [`UpdateNotification`]      |
//! | **State**         | Version record, read-only handle, status snapshot.            | [`VersionState`], [`StateReader`], [`DeviceStatusSnapshot`] |
//! | **Transport**     | Session seam and its MQTT implementation.                     | [`Transport`], [`MqttTransport`]            |
//! | **Subscriber API**| Hook into runtime events (logging, metrics).                  | [`Subscribe`], [`LogWriter`]                |
//! | **Errors**        | Typed errors with stable labels.                              | [`TransportError`], [`UpdateError`], [`AgentError`] |
//! | **Configuration** | Settings with defaults, CLI/env parsing.                      | [`AgentConfig`], [`ConfigArgs`]             |
//!
//! ## Optional features
//! - `http` (default): read-only status surface ([`http::router`]).
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//! use subco_agent::{AgentBuilder, AgentConfig, DockerDiscovery, LogWriter, MqttTransport, Subscribe};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = AgentConfig { http_port: None, ..AgentConfig::default() };
//!     let (transport, events) = MqttTransport::start(&cfg)?;
//!
//!     let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
//!     let agent = AgentBuilder::new(cfg.clone())
//!         .with_subscribers(subs)
//!         .with_discovery(DockerDiscovery::new(cfg.container_name.clone()))
//!         .build(transport, events);
//!
//!     agent.run().await?;
//!     Ok(())
//! }
//! ```
mod config;
mod core;
mod discovery;
mod error;
mod policies;
mod subscribers;

pub mod engine;
pub mod events;
pub mod state;
pub mod transport;

#[cfg(feature = "http")]
pub mod http;

// ---- Public re-exports ----

pub use config::{AgentConfig, ConfigArgs};
pub use crate::core::{
    Agent, AgentBuilder, ShutdownHandle, ShutdownPhase, wait_for_shutdown_signal,
};
pub use discovery::{DockerDiscovery, ImageDiscovery, ImageProbe};
pub use engine::{Outcome, Reconciler, UpdateNotification, VersionSource};
pub use error::{AgentError, TransportError, UpdateError};
pub use events::{Bus, Event, EventKind};
pub use policies::ReconnectPolicy;
pub use state::{DeviceIdentity, DeviceStatusSnapshot, StateReader, VersionState};
pub use subscribers::{LogWriter, Subscribe, SubscriberSet};
pub use transport::{MqttTransport, Topics, Transport, TransportEvent, parse_broker_url};
