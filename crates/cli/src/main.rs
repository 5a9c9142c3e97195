//! Code deployer entry point.
//!
//! This binary is the composition root for the entire system. Responsibilities:
//!
//! 1. **Parse configuration**: flags via `clap`, then the config file and
//!    `DEPLOYER_*` environment variables via [`config::CliConfig::load`].
//! 2. **Wire observability**: configure `tracing-subscriber` and, optionally,
//!    an OpenTelemetry OTLP exporter. All `tracing` spans and structured events
//!    emitted by every crate in the workspace flow through this layer.
//! 3. **Construct infrastructure**: create the [`github::GitHubClient`] and
//!    inject it into a [`deployer::DeploymentService`].
//! 4. **Serve**: run the [`listener`] router until Ctrl-C or SIGTERM.

mod app;
mod config;
mod telemetry;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use crate::config::{CliConfig, LogFormat};

#[derive(Parser)]
#[command(name = "code-deployer")]
#[command(version)]
#[command(about = "Deploys submitted code to a new GitHub repository served by GitHub Pages")]
struct Cli {
    /// Path to a TOML config file (defaults to ./deployer.toml if present).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on, e.g. 0.0.0.0:8000.
    #[arg(long)]
    bind: Option<String>,

    /// Log output format.
    #[arg(long, value_enum)]
    log_format: Option<LogFormat>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = CliConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(bind) = cli.bind {
        config.server.bind = bind;
    }
    if let Some(format) = cli.log_format {
        config.telemetry.log_format = format;
    }

    let _telemetry = telemetry::init(&config.telemetry)?;
    tracing::debug!(?config, "configuration loaded");

    let addr = config.server_addr()?;
    let state = app::build_state(&config)?;

    listener::serve(addr, state, shutdown_signal()).await?;
    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::warn!("shutdown requested, draining in-flight requests");
}
