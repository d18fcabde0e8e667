//! Error types used by the agent runtime, the transport and the reconciliation engine.
//!
//! This module defines three enums:
//!
//! - [`TransportError`] — failures of the publish/subscribe session.
//! - [`UpdateError`] — rejected or partially rejected update notifications.
//! - [`AgentError`] — failures of the agent runtime outside the core (bind, signals, encoding).
//!
//! None of them is fatal inside the core: the agent loop logs them (through the event bus) and
//! keeps running. They provide `as_label` / `as_message` helpers for logs.

use thiserror::Error;

/// # Errors produced by the publish/subscribe session.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The configured broker address could not be parsed.
    #[error("invalid broker url {url:?}: {reason}")]
    InvalidBrokerUrl {
        /// The offending address.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The underlying client rejected the request (request queue closed, bad topic, ...).
    #[error("client error: {error}")]
    Client {
        /// The underlying error message.
        error: String,
    },

    /// The session was ended and accepts no further requests.
    #[error("session closed")]
    Closed,
}

impl TransportError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use subco_agent::TransportError;
    ///
    /// assert_eq!(TransportError::Closed.as_label(), "transport_closed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            TransportError::InvalidBrokerUrl { .. } => "transport_invalid_broker_url",
            TransportError::Client { .. } => "transport_client",
            TransportError::Closed => "transport_closed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            TransportError::InvalidBrokerUrl { url, reason } => {
                format!("broker url {url:?} rejected: {reason}")
            }
            TransportError::Client { error } => format!("client: {error}"),
            TransportError::Closed => "closed".to_string(),
        }
    }
}

/// # Errors produced while reconciling an update notification.
///
/// `Malformed` and `WrongShape` reject the notification as a whole (no state change, no
/// announcement). `IncrementRefused` is recoverable: the rest of the notification is applied and
/// the unchanged version is still announced.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UpdateError {
    /// Payload is not valid JSON.
    #[error("malformed payload: {error}")]
    Malformed {
        /// Parser message.
        error: String,
    },

    /// Payload is JSON, but not of the expected shape.
    #[error("unexpected payload shape: {error}")]
    WrongShape {
        /// Decoder message.
        error: String,
    },

    /// Current version is an opaque token and cannot be incremented.
    #[error("cannot increment non-numeric version {version:?}")]
    IncrementRefused {
        /// The version that was kept.
        version: String,
    },
}

impl UpdateError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use subco_agent::UpdateError;
    ///
    /// let err = UpdateError::IncrementRefused { version: "detecting...".into() };
    /// assert_eq!(err.as_label(), "update_increment_refused");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            UpdateError::Malformed { .. } => "update_malformed",
            UpdateError::WrongShape { .. } => "update_wrong_shape",
            UpdateError::IncrementRefused { .. } => "update_increment_refused",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            UpdateError::Malformed { error } => format!("malformed: {error}"),
            UpdateError::WrongShape { error } => format!("wrong shape: {error}"),
            UpdateError::IncrementRefused { version } => format!("kept {version:?}"),
        }
    }

    /// Indicates whether the notification was rejected as a whole.
    ///
    /// Returns `true` for [`UpdateError::Malformed`] and [`UpdateError::WrongShape`].
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            UpdateError::Malformed { .. } | UpdateError::WrongShape { .. }
        )
    }
}

/// # Errors produced by the agent runtime.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum AgentError {
    /// HTTP listener could not bind.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// Address that was requested.
        addr: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Signal handlers could not be installed.
    #[error("failed to install signal handlers: {0}")]
    Signal(#[source] std::io::Error),

    /// A status record could not be encoded.
    #[error("failed to encode status: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl AgentError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            AgentError::Bind { .. } => "agent_bind",
            AgentError::Signal(_) => "agent_signal",
            AgentError::Serialize(_) => "agent_serialize",
        }
    }
}
