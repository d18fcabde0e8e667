//! # Agent: the single coordinating task.
//!
//! The [`Agent`] owns the version state, the reconciler, the heartbeat timer and the request side
//! of the session. Everything that mutates state runs inside [`Agent::run`], one branch at a time.
//!
//! ## High-level architecture
//! ```text
//! Inputs:
//!   mpsc<TransportEvent> ─┐
//!   mpsc<Command>        ─┤  (image discovery results)
//!   Heartbeat::tick()    ─┼──► Agent::run (select!) ──► Transport::publish / subscribe
//!   OS signal / trigger  ─┘                │
//!                                          ├──► StateStore (write lock, single writer)
//!                                          └──► Bus ──► fan-out task ──► SubscriberSet::emit
//!
//! Message routing:
//!   <prefix>getVersion ──► announce(current)
//!   <prefix>newUpdate  ──► write lock ─► Reconciler::apply ─► announce(result) ─► unlock
//!   anything else      ──► UnhandledMessage
//!
//! Shutdown path:
//!   signal or ShutdownHandle::trigger()
//!       └─► phase = Draining, Bus.publish(ShutdownRequested)
//!       └─► transport.end(drain = true); listener stop token cancelled
//!       └─► wait (timeout = grace) for Closed + listener task:
//!              ├─ both closed    → Bus.publish(AllStoppedWithin)
//!              └─ grace elapsed  → Bus.publish(GraceExceeded { open components })
//!       └─► phase = Terminated, fan-out flushed
//! ```
//!
//! ## Rules
//! - Every `Connected` re-issues both subscriptions; only the first one fires an immediate
//!   heartbeat.
//! - The write lock is held across reconcile-and-announce, so HTTP readers never see a half
//!   applied notification.
//! - Publish failures are reported as events and never retried.
//! - Inbound messages are ignored once draining starts.

use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::warn;

#[cfg(feature = "http")]
use tokio::net::TcpListener;

use super::heartbeat::Heartbeat;
use super::shutdown::{Drain, ShutdownHandle, ShutdownPhase, wait_for_shutdown_signal};
use crate::config::AgentConfig;
use crate::discovery::{ImageDiscovery, ImageProbe};
use crate::engine::Reconciler;
use crate::error::AgentError;
use crate::events::{Bus, Event, EventKind};
use crate::state::{DETECTING, DeviceStatusSnapshot, StateReader, StateStore};
use crate::subscribers::SubscriberSet;
use crate::transport::{Inbound, Topics, Transport, TransportEvent};

/// Internal requests delivered into the agent loop.
#[derive(Debug)]
pub(crate) enum Command {
    /// Image discovery finished.
    ImageDetected(ImageProbe),
}

/// Listener stop token and the serving task.
type ListenerTask = (CancellationToken, JoinHandle<()>);

/// The edge agent. Build it with [`AgentBuilder`](crate::AgentBuilder).
pub struct Agent {
    pub(crate) cfg: AgentConfig,
    pub(crate) bus: Bus,
    pub(crate) subs: Option<SubscriberSet>,
    pub(crate) store: StateStore,
    pub(crate) reader: StateReader,
    pub(crate) reconciler: Reconciler,
    pub(crate) topics: Topics,
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) events: mpsc::Receiver<TransportEvent>,
    pub(crate) commands_tx: mpsc::Sender<Command>,
    pub(crate) commands_rx: mpsc::Receiver<Command>,
    pub(crate) discovery: Option<Arc<dyn ImageDiscovery>>,
    #[cfg(feature = "http")]
    pub(crate) listener: Option<TcpListener>,
    pub(crate) shutdown: ShutdownHandle,
    pub(crate) os_signals: bool,
    pub(crate) started_at: std::time::Instant,
}

impl Agent {
    /// Trigger and phase observer for this agent.
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Read-only view of the version state.
    pub fn state(&self) -> StateReader {
        self.reader.clone()
    }

    /// Event bus; subscribe before [`run`](Self::run) to observe every event.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Runs until shutdown completes.
    ///
    /// Returns `Ok(())` also when the grace period was exceeded; `Err` only if OS signal handlers
    /// could not be installed.
    pub async fn run(mut self) -> Result<(), AgentError> {
        let fanout = self.spawn_fanout();
        self.spawn_discovery();
        let listener = self.spawn_listener();

        let mut drain = Drain::new(listener.is_some());
        let outcome = self.run_until_shutdown(&mut drain).await;

        self.shutdown.advance(ShutdownPhase::Draining);
        self.bus.publish(Event::new(EventKind::ShutdownRequested));
        self.transport.end(true);

        let grace = if listener.is_some() {
            self.cfg.grace_with_listener
        } else {
            self.cfg.grace_without_listener
        };
        let handle = listener.map(|(stop, handle)| {
            stop.cancel();
            handle
        });

        let closed = tokio::time::timeout(grace, self.wait_closed(&mut drain, handle)).await;
        match closed {
            Ok(()) => self.bus.publish(Event::new(EventKind::AllStoppedWithin)),
            Err(_) => self.bus.publish(
                Event::new(EventKind::GraceExceeded).with_reason(drain.open_components()),
            ),
        }
        self.shutdown.advance(ShutdownPhase::Terminated);

        if let Some((stop, task)) = fanout {
            stop.cancel();
            let _ = task.await;
        }
        outcome
    }

    async fn run_until_shutdown(&mut self, drain: &mut Drain) -> Result<(), AgentError> {
        let mut heartbeat = Heartbeat::new(self.cfg.heartbeat_period());
        let shutdown = self.shutdown.clone();
        let os_signals = self.os_signals;
        let signals = async move {
            if os_signals {
                wait_for_shutdown_signal().await
            } else {
                std::future::pending().await
            }
        };
        tokio::pin!(signals);

        loop {
            tokio::select! {
                res = &mut signals => {
                    shutdown.trigger();
                    return res.map_err(AgentError::Signal);
                }
                _ = shutdown.triggered() => return Ok(()),
                ev = self.events.recv(), if drain.session_open => match ev {
                    Some(TransportEvent::Closed) | None => {
                        drain.session_open = false;
                        self.bus.publish(
                            Event::new(EventKind::Disconnected).with_reason("session closed"),
                        );
                    }
                    Some(ev) => self.on_transport_event(ev, &mut heartbeat).await,
                },
                Some(cmd) = self.commands_rx.recv() => self.on_command(cmd).await,
                _ = heartbeat.tick() => self.publish_heartbeat().await,
            }
        }
    }

    /// Waits for the session's `Closed` and the listener task; other events are dropped.
    async fn wait_closed(&mut self, drain: &mut Drain, mut listener: Option<JoinHandle<()>>) {
        while !drain.is_done() {
            tokio::select! {
                ev = self.events.recv(), if drain.session_open => {
                    if matches!(ev, Some(TransportEvent::Closed) | None) {
                        drain.session_open = false;
                    }
                }
                _ = async {
                    match listener.as_mut() {
                        Some(h) => { let _ = h.await; }
                        None => std::future::pending::<()>().await,
                    }
                }, if drain.listener_open => {
                    drain.listener_open = false;
                }
            }
        }
    }

    async fn on_transport_event(&mut self, ev: TransportEvent, heartbeat: &mut Heartbeat) {
        match ev {
            TransportEvent::Connected => {
                self.bus.publish(
                    Event::new(EventKind::Connected).with_reason(self.transport.broker_url()),
                );
                self.subscribe_inbound();
                if heartbeat.on_connected() {
                    self.publish_heartbeat().await;
                }
            }
            TransportEvent::Disconnected => {
                self.bus.publish(Event::new(EventKind::Disconnected));
            }
            TransportEvent::Error(msg) => {
                self.bus
                    .publish(Event::new(EventKind::TransportError).with_reason(msg));
            }
            TransportEvent::Message { topic, payload } => {
                self.on_message(&topic, &payload).await;
            }
            TransportEvent::Closed => {}
        }
    }

    fn subscribe_inbound(&self) {
        for topic in self.topics.inbound() {
            let ev = match self.transport.subscribe(topic) {
                Ok(()) => Event::new(EventKind::Subscribed).with_topic(topic),
                Err(e) => Event::new(EventKind::SubscribeFailed)
                    .with_topic(topic)
                    .with_reason(e.as_message()),
            };
            self.bus.publish(ev);
        }
    }

    async fn on_message(&mut self, topic: &str, payload: &[u8]) {
        match self.topics.route(topic) {
            Some(Inbound::VersionQuery) => {
                self.bus.publish(Event::new(EventKind::VersionQueried));
                let state = self.reader.read().await;
                self.announce(&state.current);
            }
            Some(Inbound::UpdateNotification) => self.on_update(payload).await,
            None => {
                self.bus
                    .publish(Event::new(EventKind::UnhandledMessage).with_topic(topic));
            }
        }
    }

    async fn on_update(&mut self, payload: &[u8]) {
        let mut state = self.store.write().await;

        let outcome = match self.reconciler.apply(&mut state, payload, Instant::now()) {
            Ok(outcome) => outcome,
            Err(e) => {
                self.bus.publish(
                    Event::new(EventKind::UpdateRejected)
                        .with_reason(format!("{}: {}", e.as_label(), e.as_message())),
                );
                return;
            }
        };

        if let Some(n) = outcome.images_replaced {
            self.bus
                .publish(Event::new(EventKind::ImagesReplaced).with_count(n));
        }
        if let Some(image) = &outcome.image_changed {
            self.bus
                .publish(Event::new(EventKind::ImageChanged).with_version(image.as_str()));
        }
        if let Some(w) = &outcome.warning {
            self.bus.publish(
                Event::new(EventKind::UpdateWarning)
                    .with_version(outcome.announce.as_str())
                    .with_reason(w.as_label()),
            );
        }
        self.bus.publish(
            Event::new(EventKind::UpdateApplied)
                .with_version(outcome.announce.as_str())
                .with_reason(outcome.source.as_str()),
        );

        self.announce(&outcome.announce);
        drop(state);
    }

    fn announce(&self, version: &str) {
        let topic = self.topics.version.as_str();
        match self.transport.publish(topic, version.as_bytes().to_vec()) {
            Ok(()) => self.bus.publish(
                Event::new(EventKind::VersionAnnounced)
                    .with_topic(topic)
                    .with_version(version),
            ),
            Err(e) => self.bus.publish(Event::publish_failed(topic, &e)),
        }
    }

    async fn publish_heartbeat(&self) {
        if !self.transport.is_connected() {
            self.bus.publish(Event::new(EventKind::HeartbeatSkipped));
            return;
        }

        let snapshot = {
            let state = self.reader.read().await;
            DeviceStatusSnapshot::capture(&state, &self.cfg.identity, self.started_at)
        };
        let payload = match snapshot.to_json() {
            Ok(p) => p,
            Err(e) => {
                self.bus.publish(
                    Event::new(EventKind::HeartbeatFailed)
                        .with_reason(AgentError::Serialize(e).to_string()),
                );
                return;
            }
        };

        let topic = self.topics.device_status.as_str();
        match self.transport.publish(topic, payload) {
            Ok(()) => self.bus.publish(
                Event::new(EventKind::HeartbeatPublished)
                    .with_topic(topic)
                    .with_version(snapshot.version),
            ),
            Err(e) => self.bus.publish(Event::publish_failed(topic, &e)),
        }
    }

    async fn on_command(&mut self, cmd: Command) {
        match cmd {
            Command::ImageDetected(probe) => {
                let mut state = self.store.write().await;
                let mut ev = Event::new(EventKind::ImageDetected).with_version(probe.tag());
                if state.current_image_version == DETECTING {
                    state.current_image_version = probe.tag().to_string();
                    if let Some(detail) = probe.detail() {
                        ev = ev.with_reason(detail);
                    }
                } else {
                    ev = ev.with_reason(format!(
                        "ignored, image already {}",
                        state.current_image_version
                    ));
                }
                self.bus.publish(ev);
            }
        }
    }

    /// Forwards bus events to the subscriber set until stopped, then flushes it.
    fn spawn_fanout(&mut self) -> Option<ListenerTask> {
        let set = self.subs.take().filter(|set| !set.is_empty())?;
        let mut rx = self.bus.subscribe();
        let stop = CancellationToken::new();
        let token = stop.clone();

        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    recv = rx.recv() => match recv {
                        Ok(ev) => set.emit(&ev),
                        Err(RecvError::Lagged(skipped)) => {
                            warn!(skipped, "event fan-out lagged");
                        }
                        Err(RecvError::Closed) => break,
                    },
                    _ = token.cancelled() => {
                        while let Ok(ev) = rx.try_recv() {
                            set.emit(&ev);
                        }
                        break;
                    }
                }
            }
            set.shutdown().await;
        });
        Some((stop, task))
    }

    fn spawn_discovery(&mut self) {
        if self.cfg.image_version.is_some() {
            return;
        }
        let Some(discovery) = self.discovery.take() else {
            return;
        };
        let tx = self.commands_tx.clone();
        tokio::spawn(async move {
            let probe = discovery.probe().await;
            let _ = tx.send(Command::ImageDetected(probe)).await;
        });
    }

    #[cfg(feature = "http")]
    fn spawn_listener(&mut self) -> Option<ListenerTask> {
        let listener = self.listener.take()?;
        let stop = CancellationToken::new();
        let view = crate::http::StatusView {
            state: self.reader.clone(),
            transport: Arc::clone(&self.transport),
            identity: self.cfg.identity.clone(),
            started_at: self.started_at,
        };
        let task = crate::http::serve(listener, view, stop.clone());
        Some((stop, task))
    }

    #[cfg(not(feature = "http"))]
    fn spawn_listener(&mut self) -> Option<ListenerTask> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::AgentBuilder;
    use crate::transport::mock::MockTransport;
    use async_trait::async_trait;
    use std::time::Duration;

    const TEST_PERIOD: Duration = Duration::from_secs(30);
    const GET_VERSION: &str = "/getVersion";
    const NEW_UPDATE: &str = "/newUpdate";
    const VERSION: &str = "/Version";
    const DEVICE_STATUS: &str = "/DeviceStatus";

    struct Running {
        mock: Arc<MockTransport>,
        handle: ShutdownHandle,
        state: StateReader,
        events: tokio::sync::broadcast::Receiver<Event>,
        join: JoinHandle<Result<(), AgentError>>,
    }

    impl Running {
        async fn stop(self) -> Vec<EventKind> {
            self.handle.trigger();
            self.join.await.unwrap().unwrap();
            let mut rx = self.events;
            let mut kinds = Vec::new();
            while let Ok(ev) = rx.try_recv() {
                kinds.push(ev.kind);
            }
            kinds
        }
    }

    fn cfg() -> AgentConfig {
        AgentConfig {
            http_port: None,
            image_version: Some("fleet-subco:v1".to_string()),
            heartbeat: TEST_PERIOD,
            ..AgentConfig::default()
        }
    }

    fn start_with(
        builder: AgentBuilder,
        mock: Arc<MockTransport>,
        rx: mpsc::Receiver<TransportEvent>,
    ) -> Running {
        let agent = builder.with_os_signals(false).build(mock.clone(), rx);
        let handle = agent.shutdown_handle();
        let state = agent.state();
        let events = agent.bus().subscribe();
        let join = tokio::spawn(agent.run());
        Running {
            mock,
            handle,
            state,
            events,
            join,
        }
    }

    fn start(cfg: AgentConfig) -> Running {
        let (mock, rx) = MockTransport::new();
        start_with(AgentBuilder::new(cfg), mock, rx)
    }

    /// Lets the agent process everything queued (paused clock only advances when idle).
    async fn settle() {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_version_query_publishes_exactly_once() {
        let a = start(cfg());
        a.mock.connect().await;
        a.mock.deliver(GET_VERSION, b"").await;
        settle().await;

        assert_eq!(a.mock.published_on(VERSION), vec![b"1.0.0".to_vec()]);
        assert_eq!(a.mock.subscriptions(), vec![GET_VERSION, NEW_UPDATE]);
        assert_eq!(a.state.version().await, "1.0.0");
        a.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_update_scenario() {
        let a = start(cfg());
        a.mock.connect().await;
        a.mock
            .deliver(
                NEW_UPDATE,
                br#"{"imageVersions":["fleet-subco:v2"],"versions":{}}"#,
            )
            .await;
        settle().await;

        let st = a.state.get().await;
        assert_eq!(st.current, "1.0.1");
        assert_eq!(st.current_image_version, "fleet-subco:v2");
        assert_eq!(st.known_image_versions, vec!["fleet-subco:v2"]);
        assert_eq!(a.mock.published_on(VERSION), vec![b"1.0.1".to_vec()]);

        let kinds = a.stop().await;
        assert!(kinds.contains(&EventKind::ImageChanged));
        assert!(kinds.contains(&EventKind::UpdateApplied));
    }

    #[tokio::test(start_paused = true)]
    async fn test_malformed_payload_changes_nothing() {
        let a = start(cfg());
        a.mock.connect().await;
        let before = a.state.get().await;
        a.mock.deliver(NEW_UPDATE, b"{not json").await;
        a.mock.deliver(NEW_UPDATE, b"[1,2]").await;
        settle().await;

        assert_eq!(a.state.get().await, before);
        assert!(a.mock.published_on(VERSION).is_empty());
        let kinds = a.stop().await;
        assert_eq!(
            kinds
                .iter()
                .filter(|k| **k == EventKind::UpdateRejected)
                .count(),
            2
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_redelivery_increments_once_announces_twice() {
        let a = start(cfg());
        a.mock.connect().await;
        a.mock.deliver(NEW_UPDATE, b"{}").await;
        a.mock.deliver(NEW_UPDATE, b"{}").await;
        settle().await;

        assert_eq!(a.state.version().await, "1.0.1");
        assert_eq!(
            a.mock.published_on(VERSION),
            vec![b"1.0.1".to_vec(), b"1.0.1".to_vec()]
        );
        a.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_sentinel_is_kept_and_announced() {
        let a = start(AgentConfig {
            initial_version: DETECTING.to_string(),
            ..cfg()
        });
        a.mock.connect().await;
        a.mock.deliver(NEW_UPDATE, b"{}").await;
        settle().await;

        assert_eq!(a.state.version().await, DETECTING);
        assert_eq!(
            a.mock.published_on(VERSION),
            vec![DETECTING.as_bytes().to_vec()]
        );
        let kinds = a.stop().await;
        assert!(kinds.contains(&EventKind::UpdateWarning));
    }

    #[tokio::test(start_paused = true)]
    async fn test_heartbeat_immediate_on_first_connect_then_periodic() {
        let a = start(cfg());
        a.mock.connect().await;
        settle().await;
        assert_eq!(a.mock.published_on(DEVICE_STATUS).len(), 1);

        tokio::time::sleep(TEST_PERIOD * 2 + Duration::from_secs(1)).await;
        let published = a.mock.published_on(DEVICE_STATUS);
        assert_eq!(published.len(), 3);

        let snapshot: serde_json::Value = serde_json::from_slice(&published[0]).unwrap();
        assert_eq!(snapshot["version"], "1.0.0");
        assert_eq!(snapshot["containerImageVersion"], "fleet-subco:v1");
        a.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_heartbeat_skipped_while_disconnected() {
        let a = start(cfg());
        a.mock.connect().await;
        settle().await;
        a.mock.disconnect().await;
        tokio::time::sleep(TEST_PERIOD * 3 + Duration::from_secs(5)).await;

        assert_eq!(a.mock.published_on(DEVICE_STATUS).len(), 1);
        let kinds = a.stop().await;
        assert_eq!(
            kinds
                .iter()
                .filter(|k| **k == EventKind::HeartbeatSkipped)
                .count(),
            3
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_resubscribe_on_every_connect() {
        let a = start(cfg());
        a.mock.connect().await;
        a.mock.disconnect().await;
        a.mock.connect().await;
        settle().await;

        assert_eq!(
            a.mock.subscriptions(),
            vec![GET_VERSION, NEW_UPDATE, GET_VERSION, NEW_UPDATE]
        );
        assert_eq!(a.mock.published_on(DEVICE_STATUS).len(), 1);
        a.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_unhandled_topic_is_reported() {
        let a = start(cfg());
        a.mock.connect().await;
        a.mock.deliver("/somethingElse", b"x").await;
        settle().await;

        assert!(a.mock.published_on(VERSION).is_empty());
        let kinds = a.stop().await;
        assert!(kinds.contains(&EventKind::UnhandledMessage));
    }

    #[tokio::test(start_paused = true)]
    async fn test_clean_shutdown_drains_session() {
        let a = start(cfg());
        a.mock.connect().await;
        settle().await;

        let started = Instant::now();
        let mock = a.mock.clone();
        let handle = a.handle.clone();
        let kinds = a.stop().await;

        assert_eq!(started.elapsed(), Duration::ZERO);
        assert_eq!(mock.ends(), vec![true]);
        assert_eq!(handle.phase(), ShutdownPhase::Terminated);
        assert!(kinds.contains(&EventKind::ShutdownRequested));
        assert!(kinds.contains(&EventKind::AllStoppedWithin));
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_session_bounded_by_grace() {
        let (mock, rx) = MockTransport::hanging();
        let a = start_with(AgentBuilder::new(cfg()), mock, rx);
        a.mock.connect().await;
        settle().await;

        let started = Instant::now();
        let kinds = a.stop().await;

        assert_eq!(started.elapsed(), Duration::from_secs(2));
        assert!(kinds.contains(&EventKind::GraceExceeded));
        assert!(!kinds.contains(&EventKind::AllStoppedWithin));
    }

    #[cfg(feature = "http")]
    #[tokio::test(start_paused = true)]
    async fn test_hanging_session_with_listener_bounded_by_eight_seconds() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let (mock, rx) = MockTransport::hanging();
        let a = start_with(
            AgentBuilder::new(cfg()).with_listener(listener),
            mock,
            rx,
        );
        a.mock.connect().await;
        settle().await;

        let started = Instant::now();
        a.stop().await;
        assert_eq!(started.elapsed(), Duration::from_secs(8));
    }

    #[tokio::test(start_paused = true)]
    async fn test_messages_ignored_while_draining() {
        let (mock, rx) = MockTransport::hanging();
        let a = start_with(AgentBuilder::new(cfg()), mock, rx);
        a.mock.connect().await;
        settle().await;

        a.handle.trigger();
        settle().await;
        assert_eq!(a.handle.phase(), ShutdownPhase::Draining);
        a.mock.deliver(GET_VERSION, b"").await;
        a.mock.deliver(NEW_UPDATE, b"{}").await;

        let mock = a.mock.clone();
        let state = a.state.clone();
        a.stop().await;
        assert!(mock.published_on(VERSION).is_empty());
        assert_eq!(state.version().await, "1.0.0");
        assert_eq!(mock.ends(), vec![true]);
    }

    struct FixedDiscovery {
        delay: Duration,
        probe: ImageProbe,
    }

    #[async_trait]
    impl ImageDiscovery for FixedDiscovery {
        async fn probe(&self) -> ImageProbe {
            tokio::time::sleep(self.delay).await;
            self.probe.clone()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_discovery_sets_image_while_detecting() {
        let cfg = AgentConfig {
            image_version: None,
            ..cfg()
        };
        let (mock, rx) = MockTransport::new();
        let builder = AgentBuilder::new(cfg).with_discovery(FixedDiscovery {
            delay: Duration::ZERO,
            probe: ImageProbe::NotRunning,
        });
        let a = start_with(builder, mock, rx);
        assert_eq!(a.state.get().await.current_image_version, DETECTING);
        settle().await;

        assert_eq!(a.state.get().await.current_image_version, "not-running");
        a.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_discovery_never_overrides_controller_image() {
        let cfg = AgentConfig {
            image_version: None,
            ..cfg()
        };
        let (mock, rx) = MockTransport::new();
        let builder = AgentBuilder::new(cfg).with_discovery(FixedDiscovery {
            delay: Duration::from_secs(5),
            probe: ImageProbe::Running("fleet-subco:v9".to_string()),
        });
        let a = start_with(builder, mock, rx);
        a.mock.connect().await;
        a.mock
            .deliver(NEW_UPDATE, br#"{"imageVersions":["fleet-subco:v2"]}"#)
            .await;
        tokio::time::sleep(Duration::from_secs(6)).await;

        assert_eq!(a.state.get().await.current_image_version, "fleet-subco:v2");
        a.stop().await;
    }
}
