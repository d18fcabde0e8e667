//! # Redelivery filter for update notifications.
//!
//! Update payloads carry no sequence numbers and the broker delivers at-least-once, so the same
//! notification can arrive twice, most often right after a reconnect. Overrides are idempotent by
//! content, increments are not. [`DuplicateFilter`] remembers the last applied payload and treats
//! a byte-identical copy arriving within `window` as a redelivery.
//!
//! ## Rules
//! - Only *applied* payloads are remembered (rejected ones never are).
//! - `window = 0` disables the filter.
//! - A copy arriving after the window is a new notification.

use std::time::Duration;

use tokio::time::Instant;

/// Remembers the last applied payload.
#[derive(Debug)]
pub struct DuplicateFilter {
    window: Duration,
    last: Option<(Vec<u8>, Instant)>,
}

impl DuplicateFilter {
    /// Creates a filter with the given redelivery window.
    pub fn new(window: Duration) -> Self {
        Self { window, last: None }
    }

    /// True if `payload` repeats the last applied payload within the window.
    pub fn is_redelivery(&self, payload: &[u8], now: Instant) -> bool {
        if self.window.is_zero() {
            return false;
        }
        match &self.last {
            Some((prev, at)) => prev == payload && now.saturating_duration_since(*at) < self.window,
            None => false,
        }
    }

    /// Records `payload` as applied at `now`.
    pub fn record(&mut self, payload: &[u8], now: Instant) {
        if self.window.is_zero() {
            return;
        }
        self.last = Some((payload.to_vec(), now));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_payload_within_window() {
        let now = Instant::now();
        let mut f = DuplicateFilter::new(Duration::from_secs(2));
        assert!(!f.is_redelivery(b"{}", now));
        f.record(b"{}", now);
        assert!(f.is_redelivery(b"{}", now + Duration::from_millis(500)));
        assert!(!f.is_redelivery(b"{ }", now + Duration::from_millis(500)));
    }

    #[test]
    fn test_window_expires() {
        let now = Instant::now();
        let mut f = DuplicateFilter::new(Duration::from_secs(2));
        f.record(b"{}", now);
        assert!(!f.is_redelivery(b"{}", now + Duration::from_secs(2)));
    }

    #[test]
    fn test_zero_window_disables() {
        let now = Instant::now();
        let mut f = DuplicateFilter::new(Duration::ZERO);
        f.record(b"{}", now);
        assert!(!f.is_redelivery(b"{}", now));
    }
}
