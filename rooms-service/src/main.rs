use anyhow::Result;
use rooms_service::{config::AppConfig, server::Server};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load()?;

    // RUST_LOG wins over the configured level
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("rooms_service={},tower_http=debug", config.logging.level).into()
    });

    let registry = tracing_subscriber::registry().with(env_filter);
    if config.logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true).with_line_number(true))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(true).with_line_number(true))
            .init();
    }

    tracing::info!("Starting rooms service with config: {:?}", config);

    Server::new(config).run().await?;

    Ok(())
}
