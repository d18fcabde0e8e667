use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use subco_agent::{
    AgentBuilder, AgentConfig, AgentError, ConfigArgs, DockerDiscovery, LogWriter, MqttTransport,
    Subscribe,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("subco_agent=info")),
        )
        .init();

    let cfg = AgentConfig::from(ConfigArgs::parse());
    info!(
        broker = %cfg.broker_url,
        client_id = %cfg.client_id,
        http_port = ?cfg.http_port,
        version = %cfg.initial_version,
        "starting subco-agent v{}",
        env!("CARGO_PKG_VERSION")
    );

    let (transport, events) =
        MqttTransport::start(&cfg).context("failed to start MQTT session")?;

    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let mut builder = AgentBuilder::new(cfg.clone())
        .with_subscribers(subs)
        .with_discovery(DockerDiscovery::new(cfg.container_name.clone()));

    if let Some(port) = cfg.http_port {
        let addr = format!("0.0.0.0:{port}");
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|source| AgentError::Bind {
                addr: addr.clone(),
                source,
            })?;
        info!(%addr, "status surface listening");
        builder = builder.with_listener(listener);
    }

    builder.build(transport, events).run().await?;
    info!("stopped");
    Ok(())
}
