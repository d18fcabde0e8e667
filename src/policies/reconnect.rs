//! # Reconnect policy for the broker session.
//!
//! [`ReconnectPolicy`] decides how long the session driver waits after a transport failure
//! before polling the connection again. The delay is fixed: every failed attempt waits the same
//! amount, so a restarted broker is picked up within one period.
//!
//! The delay never drops below [`ReconnectPolicy::MIN_DELAY`]; a zero delay would turn a
//! refusing broker into a busy loop.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use subco_agent::ReconnectPolicy;
//!
//! assert_eq!(ReconnectPolicy::default().delay(), Duration::from_secs(1));
//! assert_eq!(ReconnectPolicy::fixed(Duration::from_secs(5)).delay(), Duration::from_secs(5));
//! assert_eq!(ReconnectPolicy::fixed(Duration::ZERO).delay(), ReconnectPolicy::MIN_DELAY);
//! ```

use std::time::Duration;

/// Delay between reconnect attempts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReconnectPolicy {
    delay: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::fixed(Duration::from_secs(1))
    }
}

impl ReconnectPolicy {
    /// Lower bound for the delay.
    pub const MIN_DELAY: Duration = Duration::from_secs(1);

    /// Constant delay, clamped to at least [`Self::MIN_DELAY`].
    pub fn fixed(delay: Duration) -> Self {
        Self {
            delay: delay.max(Self::MIN_DELAY),
        }
    }

    /// Wait before the next attempt.
    #[inline]
    pub fn delay(&self) -> Duration {
        self.delay
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_one_second() {
        assert_eq!(ReconnectPolicy::default().delay(), Duration::from_secs(1));
    }

    #[test]
    fn test_zero_and_sub_second_delays_are_clamped() {
        assert_eq!(
            ReconnectPolicy::fixed(Duration::ZERO).delay(),
            ReconnectPolicy::MIN_DELAY
        );
        assert_eq!(
            ReconnectPolicy::fixed(Duration::from_millis(10)).delay(),
            ReconnectPolicy::MIN_DELAY
        );
        assert_eq!(
            ReconnectPolicy::fixed(Duration::from_secs(7)).delay(),
            Duration::from_secs(7)
        );
    }
}
