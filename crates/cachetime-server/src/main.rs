//! Cache time server binary.

use std::process::ExitCode;

use anyhow::Context;
use cachetime_server::metrics::init_metrics;
use cachetime_server::{BuildInfo, Config, ExternalServiceList, Service, shutdown_signal};
use tokio::sync::mpsc;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = ?e, "Application error");
            ExitCode::FAILURE
        },
    }
}

async fn run() -> anyhow::Result<()> {
    let build_info = BuildInfo::from_build_env();
    tracing::info!(
        version = %build_info.version,
        git_commit = %build_info.git_commit,
        build_time = %build_info.build_time,
        "Starting cache time server"
    );

    let config = Config::load().context("unable to retrieve service configuration")?;
    let metrics_handle = init_metrics().context("failed to install metrics recorder")?;
    let initialiser = ExternalServiceList::new().with_metrics(metrics_handle);

    let mut service = Service::new(config);
    service
        .initialize(&initialiser, build_info)
        .await
        .context("failed to initialise service")?;

    let (errors_tx, mut errors_rx) = mpsc::channel(1);
    service.run(errors_tx).context("failed to run service")?;

    let listen_error = tokio::select! {
        err = errors_rx.recv() => err,
        _ = shutdown_signal() => None,
    };

    if let Some(err) = &listen_error {
        tracing::error!(error = %err, "Service error received");
    }

    service.close().await.context("failed to shutdown service")?;

    match listen_error {
        Some(err) => Err(err).context("service stopped after a listener failure"),
        None => Ok(()),
    }
}
