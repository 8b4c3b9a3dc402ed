mod app;

use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};

use tokio::sync::mpsc;
use tracing_subscriber::{prelude::*, EnvFilter};

use marquee_core::{
    catalog::CatalogLoader,
    config::{self, AppConfig},
    identity,
    store::PreferenceStore,
};

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;

    config::ensure_default_config()?;
    let config = AppConfig::load()?;

    let identity = identity::resolve(&config).await.context(
        "unable to resolve user identity; set user_email in the config or sign in via auth_url",
    )?;

    let store = PreferenceStore::new(&config.server_url);
    let loader = CatalogLoader::new(config.clone());

    let (catalog_tx, catalog_rx) = mpsc::channel(1);
    {
        let loader = loader.clone();
        tokio::spawn(async move {
            let catalog = loader.fetch().await;
            let _ = catalog_tx.send(catalog).await;
        });
    }

    let mut app = app::MarqueeApp::new(identity, store);
    app.attach_catalog(catalog_rx);
    app.run().await
}

fn init_logging() -> Result<()> {
    let log_dir = std::env::current_dir()?.join("logs");
    fs::create_dir_all(&log_dir)?;
    let log_path = log_dir.join("marquee.log");

    let env_filter = EnvFilter::from_default_env();

    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .compact()
        .with_writer(move || {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(&log_path)
                .expect("failed to open log file")
        });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();

    Ok(())
}
