use std::sync::Arc;
use tracing::{error, info};
use userproxy::config::Config;
use userproxy::server::{build_router, Lifecycle, Resources, SimulatedResource};
use userproxy::upstream::HttpUserSource;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::default();

    let users = HttpUserSource::new(config.upstream_url.clone(), config.upstream_timeout);
    info!(url = %users.url(), timeout = ?config.upstream_timeout, "Upstream user source configured");

    // Placeholder until real resources (pools, files) need releasing
    let resources = Resources::new().with(SimulatedResource::new("app", config.cleanup_delay));

    let lifecycle = match Lifecycle::bind(
        &config.bind_addr(),
        build_router(Arc::new(users)),
        resources,
        config.shutdown_timeout,
    )
    .await
    {
        Ok(l) => l,
        Err(e) => {
            error!(error = %e, "Failed to start listener");
            return Err(e.into());
        }
    };

    let outcome = lifecycle.run().await?;

    info!(outcome = ?outcome, "userproxy shut down");
    Ok(())
}
