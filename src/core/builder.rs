use std::sync::Arc;

use tokio::sync::mpsc;

#[cfg(feature = "http")]
use tokio::net::TcpListener;

use super::agent::Agent;
use super::shutdown::ShutdownHandle;
use crate::{
    config::AgentConfig,
    discovery::ImageDiscovery,
    engine::Reconciler,
    events::Bus,
    state::{StateStore, VersionState},
    subscribers::{Subscribe, SubscriberSet},
    transport::{Transport, TransportEvent},
};

const COMMAND_CAPACITY: usize = 8;

/// Builder for constructing an [`Agent`] with optional collaborators.
pub struct AgentBuilder {
    cfg: AgentConfig,
    subscribers: Vec<Arc<dyn Subscribe>>,
    discovery: Option<Arc<dyn ImageDiscovery>>,
    #[cfg(feature = "http")]
    listener: Option<TcpListener>,
    os_signals: bool,
}

impl AgentBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: AgentConfig) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
            discovery: None,
            #[cfg(feature = "http")]
            listener: None,
            os_signals: true,
        }
    }

    /// Sets event subscribers.
    ///
    /// Subscribers receive runtime events through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Sets the image discovery used when no image tag is configured.
    pub fn with_discovery(mut self, discovery: impl ImageDiscovery) -> Self {
        self.discovery = Some(Arc::new(discovery));
        self
    }

    /// Serves the HTTP status surface on an already bound listener.
    ///
    /// Requires the `http` feature flag.
    #[cfg(feature = "http")]
    pub fn with_listener(mut self, listener: TcpListener) -> Self {
        self.listener = Some(listener);
        self
    }

    /// Whether [`Agent::run`] reacts to OS termination signals (default `true`).
    pub fn with_os_signals(mut self, enabled: bool) -> Self {
        self.os_signals = enabled;
        self
    }

    /// Builds the agent around a started transport and its event stream.
    pub fn build(
        self,
        transport: Arc<dyn Transport>,
        events: mpsc::Receiver<TransportEvent>,
    ) -> Agent {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let subs = SubscriberSet::new(self.subscribers, bus.clone());
        let store = StateStore::new(VersionState::new(
            self.cfg.initial_version.clone(),
            self.cfg.image_version.clone(),
        ));
        let reader = store.reader();
        let reconciler = Reconciler::new(self.cfg.image_family.clone(), self.cfg.dedup_window);
        let topics = self.cfg.topics();
        let (commands_tx, commands_rx) = mpsc::channel(COMMAND_CAPACITY);

        Agent {
            cfg: self.cfg,
            bus,
            subs: Some(subs),
            store,
            reader,
            reconciler,
            topics,
            transport,
            events,
            commands_tx,
            commands_rx,
            discovery: self.discovery,
            #[cfg(feature = "http")]
            listener: self.listener,
            shutdown: ShutdownHandle::new(),
            os_signals: self.os_signals,
            started_at: std::time::Instant::now(),
        }
    }
}
