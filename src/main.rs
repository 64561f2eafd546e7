//! Bookshelf - terminal client
//!
//! Browse, search, import and edit books against the REST backend.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use bookshelf_client::{
    api::HttpCatalogApi, config::AppConfig, console, services::Services, Session,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load()?;

    // Initialize tracing. Logs go to a file when configured so they do not
    // interleave with the console.
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("bookshelf_client={}", config.logging.level).into());

    let (writer, _guard) = match &config.logging.file {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "bookshelf.log");
            tracing_appender::non_blocking(appender)
        }
        None => tracing_appender::non_blocking(std::io::stderr()),
    };

    let fmt_layer = if config.logging.format == "json" {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(writer)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_ansi(config.logging.file.is_none())
            .boxed()
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();

    tracing::info!("Starting Bookshelf client v{}", env!("CARGO_PKG_VERSION"));

    let api = HttpCatalogApi::new(&config.api)?;
    tracing::info!("Using API at {}", api.base_url());

    let config = Arc::new(config);
    let services = Services::new(Arc::new(api), &config);
    let mut session = Session::new(config, services);

    if session.start().await.is_err() {
        tracing::warn!("Starting with empty lists; use /refresh to retry");
    }

    console::run(&mut session).await?;

    tracing::info!("Bookshelf client stopped");
    Ok(())
}
