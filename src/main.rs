use customer_registration::{app, config::AppConfig};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Default to INFO level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,customer_registration=debug")),
        )
        .init();

    // First argument picks the service: `customer` or `notification`
    let config = AppConfig::from_env(std::env::args().nth(1))?;

    let store = if config.database_url.is_some() { "postgres" } else { "memory" };
    tracing::info!(service = ?config.service, store = store, "Starting service");

    app::run(config).await
}
