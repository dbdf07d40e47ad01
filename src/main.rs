//! The `filearray` binary: serves the JSON files of the configured data
//! directory over HTTP, one store per file.
//!
//! Usage: `filearray [config-file]`. Without a file, `filearray.toml` in the
//! working directory is read if present; `FILEARRAY_*` variables override both.

use std::path::PathBuf;
use std::sync::Arc;

use filearray::interface::StoreRegistry;
use filearray::server;
use filearray::settings::Settings;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_file = std::env::args().nth(1).map(PathBuf::from);
    let settings = Settings::load(config_file.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.log)),
        )
        .init();

    let registry = Arc::new(StoreRegistry::new(&settings));
    let app = server::router(registry, settings.token.clone());
    let listener = tokio::net::TcpListener::bind(&settings.listen).await?;
    info!(address = %settings.listen, data_dir = %settings.data_dir.display(), "Server was launched");
    axum::serve(listener, app).await?;
    Ok(())
}
