//! In-memory [`Transport`] for tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use super::{Transport, TransportEvent};
use crate::error::TransportError;

/// Records requests; events are injected by the test.
pub(crate) struct MockTransport {
    connected: AtomicBool,
    close_on_end: bool,
    events: mpsc::Sender<TransportEvent>,
    published: Mutex<Vec<(String, Vec<u8>)>>,
    subscribed: Mutex<Vec<String>>,
    ends: Mutex<Vec<bool>>,
}

impl MockTransport {
    /// Transport that reports `Closed` as soon as `end` is called.
    pub(crate) fn new() -> (Arc<Self>, mpsc::Receiver<TransportEvent>) {
        Self::build(true)
    }

    /// Transport whose `end` never completes.
    pub(crate) fn hanging() -> (Arc<Self>, mpsc::Receiver<TransportEvent>) {
        Self::build(false)
    }

    fn build(close_on_end: bool) -> (Arc<Self>, mpsc::Receiver<TransportEvent>) {
        let (tx, rx) = mpsc::channel(64);
        let mock = Arc::new(Self {
            connected: AtomicBool::new(false),
            close_on_end,
            events: tx,
            published: Mutex::new(Vec::new()),
            subscribed: Mutex::new(Vec::new()),
            ends: Mutex::new(Vec::new()),
        });
        (mock, rx)
    }

    /// Simulates a (re)connection: flips the flag and emits `Connected`.
    pub(crate) async fn connect(&self) {
        self.connected.store(true, Ordering::SeqCst);
        self.inject(TransportEvent::Connected).await;
    }

    /// Simulates a lost session.
    pub(crate) async fn disconnect(&self) {
        self.connected.store(false, Ordering::SeqCst);
        self.inject(TransportEvent::Disconnected).await;
    }

    /// Delivers an inbound message.
    pub(crate) async fn deliver(&self, topic: &str, payload: &[u8]) {
        self.inject(TransportEvent::Message {
            topic: topic.to_string(),
            payload: payload.to_vec(),
        })
        .await;
    }

    pub(crate) async fn inject(&self, ev: TransportEvent) {
        let _ = self.events.send(ev).await;
    }

    /// Payloads published on `topic`, in order.
    pub(crate) fn published_on(&self, topic: &str) -> Vec<Vec<u8>> {
        self.published
            .lock()
            .unwrap()
            .iter()
            .filter(|(t, _)| t == topic)
            .map(|(_, p)| p.clone())
            .collect()
    }

    /// Subscription requests, in order.
    pub(crate) fn subscriptions(&self) -> Vec<String> {
        self.subscribed.lock().unwrap().clone()
    }

    /// `drain` flags passed to `end`, in order.
    pub(crate) fn ends(&self) -> Vec<bool> {
        self.ends.lock().unwrap().clone()
    }
}

impl Transport for MockTransport {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn broker_url(&self) -> &str {
        "mqtt://mock:1883"
    }

    fn subscribe(&self, topic: &str) -> Result<(), TransportError> {
        self.subscribed.lock().unwrap().push(topic.to_string());
        Ok(())
    }

    fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), TransportError> {
        self.published
            .lock()
            .unwrap()
            .push((topic.to_string(), payload));
        Ok(())
    }

    fn end(&self, drain: bool) {
        self.ends.lock().unwrap().push(drain);
        self.connected.store(false, Ordering::SeqCst);
        if self.close_on_end {
            let _ = self.events.try_send(TransportEvent::Closed);
        }
    }
}
