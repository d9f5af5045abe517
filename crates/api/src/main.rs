use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use govm_api::app::{self, services::AppServices};
use govm_api::cli::{self, Cli};
use govm_core::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    govm_observability::init(cli.log_format);

    tracing::info!(config = %cli.config.display(), "reading settings");
    let settings = match Settings::load(&cli.config) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "cannot start without a usable settings file");
            std::process::exit(1);
        }
    };
    tracing::info!(
        vm_path = %settings.vm_path,
        govc = %settings.govc_bin.display(),
        "settings loaded"
    );

    let services = Arc::new(AppServices::from_settings(&settings));
    let app = app::build_app(services);

    let addr = cli::listen_addr(&cli.listen);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("http server failed")?;
    Ok(())
}
