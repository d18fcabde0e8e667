//! # Agent configuration.
//!
//! [`AgentConfig`] holds every setting the agent reads once at start. It is a plain struct with a
//! [`Default`] and helper accessors; the binary fills it from [`ConfigArgs`] (command line with
//! environment fallbacks).
//!
//! ## Sentinel values
//! - `http_port = None` → no HTTP listener, short shutdown grace
//! - `image_version = None` → image discovery runs at start
//! - `heartbeat = 0s` → clamped to 1s
//! - `reconnect = 0s` → clamped to 1s
//! - `dedup_window = 0s` → duplicate suppression disabled
//! - `bus_capacity = 0` → clamped to 1

use std::time::Duration;

use clap::Parser;

use crate::policies::ReconnectPolicy;
use crate::state::DeviceIdentity;
use crate::transport::Topics;

/// Runtime configuration of the agent.
#[derive(Clone, Debug)]
pub struct AgentConfig {
    /// Broker address (`mqtt://host[:port]` or `tcp://host[:port]`).
    pub broker_url: String,
    /// MQTT client identifier.
    pub client_id: String,
    /// MQTT keep-alive interval.
    pub keep_alive: Duration,
    /// Delay between reconnect attempts (at least one second).
    pub reconnect: ReconnectPolicy,

    /// HTTP status port; `None` disables the listener.
    pub http_port: Option<u16>,

    /// Static device identity included in every status snapshot.
    pub identity: DeviceIdentity,

    /// Initial version value.
    pub initial_version: String,
    /// Configured image tag; `None` runs discovery.
    pub image_version: Option<String>,
    /// Substring identifying this service's images in update notifications.
    pub image_family: String,
    /// Container inspected by image discovery.
    pub container_name: String,

    /// Prefix prepended to every topic name.
    pub topic_prefix: String,
    /// Heartbeat period.
    pub heartbeat: Duration,
    /// Window in which an identical update payload counts as a redelivery.
    pub dedup_window: Duration,

    /// Shutdown safety timeout while an HTTP listener runs.
    pub grace_with_listener: Duration,
    /// Shutdown safety timeout without a listener.
    pub grace_without_listener: Duration,

    /// Capacity of the event bus ring buffer.
    pub bus_capacity: usize,
}

impl AgentConfig {
    /// Heartbeat period clamped to at least one second.
    #[inline]
    pub fn heartbeat_period(&self) -> Duration {
        self.heartbeat.max(Duration::from_secs(1))
    }

    /// Bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Topic names with the configured prefix.
    pub fn topics(&self) -> Topics {
        Topics::with_prefix(&self.topic_prefix)
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            broker_url: "mqtt://localhost:1883".to_string(),
            client_id: default_client_id(),
            keep_alive: Duration::from_secs(60),
            reconnect: ReconnectPolicy::default(),
            http_port: Some(3000),
            identity: DeviceIdentity::default(),
            initial_version: "1.0.0".to_string(),
            image_version: None,
            image_family: "subco".to_string(),
            container_name: "subco".to_string(),
            topic_prefix: "/".to_string(),
            heartbeat: Duration::from_secs(30),
            dedup_window: Duration::from_secs(2),
            grace_with_listener: Duration::from_secs(8),
            grace_without_listener: Duration::from_secs(2),
            bus_capacity: 1024,
        }
    }
}

fn default_client_id() -> String {
    format!("subco-{}", std::process::id())
}

/// Command line arguments with environment fallbacks.
#[derive(Parser, Debug)]
#[command(name = "subco-agent")]
#[command(about = "Edge agent that keeps a device version in sync over MQTT")]
#[command(version)]
pub struct ConfigArgs {
    /// Broker address
    #[arg(long, env = "MQTT_BROKER_URL", default_value = "mqtt://localhost:1883")]
    pub broker_url: String,

    /// MQTT client id [default: subco-<pid>]
    #[arg(long, env = "MQTT_CLIENT_ID")]
    pub client_id: Option<String>,

    /// HTTP status port
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// Run without the HTTP status listener
    #[arg(long, env = "NO_HTTP")]
    pub no_http: bool,

    /// Device IP reported in status snapshots
    #[arg(long, env = "DEVICE_IP", default_value = "unknown")]
    pub device_ip: String,

    /// Device MAC reported in status snapshots
    #[arg(long, env = "DEVICE_MAC", default_value = "unknown")]
    pub device_mac: String,

    /// Image tag of the running container; detected when absent
    #[arg(long, env = "IMAGE_VERSION")]
    pub image_version: Option<String>,

    /// Initial version
    #[arg(long, env = "SUBCO_VERSION", default_value = "1.0.0")]
    pub initial_version: String,

    /// Substring identifying this service's images
    #[arg(long, env = "IMAGE_FAMILY", default_value = "subco")]
    pub image_family: String,

    /// Container inspected by image discovery
    #[arg(long, env = "CONTAINER_NAME", default_value = "subco")]
    pub container_name: String,

    /// Prefix for every topic name
    #[arg(long, env = "TOPIC_PREFIX", default_value = "/")]
    pub topic_prefix: String,

    /// Heartbeat period in seconds
    #[arg(long, env = "HEARTBEAT_SECS", default_value_t = 30)]
    pub heartbeat_secs: u64,

    /// Delay between reconnect attempts in seconds
    #[arg(long, env = "MQTT_RECONNECT_SECS", default_value_t = 1)]
    pub reconnect_secs: u64,

    /// Redelivery window for identical update payloads in milliseconds (0 disables)
    #[arg(long, env = "DEDUP_WINDOW_MS", default_value_t = 2000)]
    pub dedup_window_ms: u64,
}

impl From<ConfigArgs> for AgentConfig {
    fn from(args: ConfigArgs) -> Self {
        let defaults = AgentConfig::default();
        Self {
            broker_url: args.broker_url,
            client_id: args
                .client_id
                .filter(|id| !id.is_empty())
                .unwrap_or(defaults.client_id),
            reconnect: ReconnectPolicy::fixed(Duration::from_secs(args.reconnect_secs)),
            http_port: (!args.no_http).then_some(args.port),
            identity: DeviceIdentity {
                ip: args.device_ip,
                mac: args.device_mac,
            },
            initial_version: args.initial_version,
            image_version: args.image_version.filter(|tag| !tag.is_empty()),
            image_family: args.image_family,
            container_name: args.container_name,
            topic_prefix: args.topic_prefix,
            heartbeat: Duration::from_secs(args.heartbeat_secs),
            dedup_window: Duration::from_millis(args.dedup_window_ms),
            ..defaults
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> AgentConfig {
        let argv = std::iter::once("subco-agent").chain(args.iter().copied());
        ConfigArgs::try_parse_from(argv).unwrap().into()
    }

    #[test]
    fn test_flags_override_defaults() {
        let cfg = parse(&[
            "--broker-url",
            "mqtt://broker.lan:1884",
            "--no-http",
            "--image-version",
            "fleet-subco:v3",
            "--heartbeat-secs",
            "0",
            "--dedup-window-ms",
            "0",
        ]);
        assert_eq!(cfg.broker_url, "mqtt://broker.lan:1884");
        assert_eq!(cfg.http_port, None);
        assert_eq!(cfg.image_version.as_deref(), Some("fleet-subco:v3"));
        assert_eq!(cfg.heartbeat_period(), Duration::from_secs(1));
        assert_eq!(cfg.dedup_window, Duration::ZERO);
    }

    #[test]
    fn test_zero_reconnect_delay_is_clamped() {
        let cfg = parse(&["--reconnect-secs", "0"]);
        assert_eq!(cfg.reconnect.delay(), Duration::from_secs(1));

        let cfg = parse(&["--reconnect-secs", "4"]);
        assert_eq!(cfg.reconnect.delay(), Duration::from_secs(4));
    }

    #[test]
    fn test_empty_image_version_means_discovery() {
        let cfg = parse(&["--image-version", ""]);
        assert_eq!(cfg.image_version, None);
    }

    #[test]
    fn test_defaults() {
        let cfg = AgentConfig::default();
        assert_eq!(cfg.http_port, Some(3000));
        assert_eq!(cfg.grace_with_listener, Duration::from_secs(8));
        assert_eq!(cfg.grace_without_listener, Duration::from_secs(2));
        assert_eq!(cfg.topics().new_update, "/newUpdate");
        assert!(cfg.client_id.starts_with("subco-"));
        assert_eq!(cfg.heartbeat_period(), Duration::from_secs(30));
    }
}
