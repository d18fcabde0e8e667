//! # Image discovery.
//!
//! When no image tag is configured, the agent asks an [`ImageDiscovery`] which image the service
//! container runs. [`DockerDiscovery`] shells out to
//! `docker inspect --format {{.Config.Image}} <container>`.
//!
//! The probe runs in its own task; its [`ImageProbe`] is delivered to the agent loop, which
//! applies it only while the current image is still `detecting...`.
//!
//! | Probe | Stored image |
//! |---|---|
//! | `Running("fleet-subco:v2")` | `fleet-subco:v2` |
//! | `Running("")` | `unknown` |
//! | `NotRunning` | `not-running` |
//! | `Failed(_)` | `detection-failed` |

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use crate::state::{DETECTION_FAILED, NOT_RUNNING, UNKNOWN};

/// Outcome of one discovery attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageProbe {
    /// Container found; carries the reported image (may be empty).
    Running(String),
    /// Container absent or stopped.
    NotRunning,
    /// The probe itself failed.
    Failed(String),
}

impl ImageProbe {
    /// Value stored as the current image.
    pub fn tag(&self) -> &str {
        match self {
            ImageProbe::Running(tag) if tag.is_empty() => UNKNOWN,
            ImageProbe::Running(tag) => tag.as_str(),
            ImageProbe::NotRunning => NOT_RUNNING,
            ImageProbe::Failed(_) => DETECTION_FAILED,
        }
    }

    /// Failure detail, if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ImageProbe::Failed(reason) => Some(reason.as_str()),
            _ => None,
        }
    }
}

/// Source of the running image tag.
#[async_trait]
pub trait ImageDiscovery: Send + Sync + 'static {
    /// Runs one probe.
    async fn probe(&self) -> ImageProbe;
}

/// Discovery through the docker CLI.
#[derive(Debug, Clone)]
pub struct DockerDiscovery {
    program: String,
    container: String,
    timeout: Duration,
}

impl DockerDiscovery {
    /// Inspects `container` with `docker`, bounded by 10 seconds.
    pub fn new(container: impl Into<String>) -> Self {
        Self {
            program: "docker".to_string(),
            container: container.into(),
            timeout: Duration::from_secs(10),
        }
    }

    /// Uses another executable instead of `docker`.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }
}

#[async_trait]
impl ImageDiscovery for DockerDiscovery {
    async fn probe(&self) -> ImageProbe {
        let run = Command::new(&self.program)
            .args(["inspect", "--format", "{{.Config.Image}}", self.container.as_str()])
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output();

        let output = match tokio::time::timeout(self.timeout, run).await {
            Err(_) => return ImageProbe::Failed(format!("timed out after {:?}", self.timeout)),
            Ok(Err(e)) => return ImageProbe::Failed(format!("{}: {e}", self.program)),
            Ok(Ok(output)) => output,
        };

        if !output.status.success() {
            return ImageProbe::NotRunning;
        }
        match String::from_utf8(output.stdout) {
            Ok(s) => ImageProbe::Running(s.trim().to_string()),
            Err(_) => ImageProbe::Failed("non-utf8 output".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_tags() {
        assert_eq!(ImageProbe::Running("fleet-subco:v2".into()).tag(), "fleet-subco:v2");
        assert_eq!(ImageProbe::Running(String::new()).tag(), "unknown");
        assert_eq!(ImageProbe::NotRunning.tag(), "not-running");
        let failed = ImageProbe::Failed("boom".into());
        assert_eq!(failed.tag(), "detection-failed");
        assert_eq!(failed.detail(), Some("boom"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_missing_program_fails() {
        let probe = DockerDiscovery::new("subco")
            .with_program("/nonexistent/docker")
            .probe()
            .await;
        assert!(matches!(probe, ImageProbe::Failed(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_zero_exit_is_not_running() {
        let probe = DockerDiscovery::new("subco").with_program("false").probe().await;
        assert_eq!(probe, ImageProbe::NotRunning);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_stdout_is_trimmed() {
        let probe = DockerDiscovery::new("subco").with_program("echo").probe().await;
        assert_eq!(
            probe,
            ImageProbe::Running("inspect --format {{.Config.Image}} subco".to_string())
        );
    }
}
