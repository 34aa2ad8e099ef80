use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use photoegg_core::{process_paths, ImportError, ImportOutcome, Pipeline};
use photoegg_service::{router, AppState, ServiceConfig};
use serde_json::json;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "photoegg", version, about = "Photo previews and hothash identity")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP service.
    Serve(ServiceConfig),

    /// Import files and print one PhotoEgg JSON record per line.
    Process {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Also produce a cold preview fitted to this box.
        #[arg(long)]
        coldpreview_size: Option<u32>,

        /// Pretty-print each record.
        #[arg(long)]
        pretty: bool,
    },
}

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Command::Serve(config) => {
            serve(config)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Process {
            files,
            coldpreview_size,
            pretty,
        } => process(&files, coldpreview_size, pretty),
    }
}

fn serve(config: ServiceConfig) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start tokio runtime")?;

    runtime.block_on(async {
        let addr = config
            .socket_addr()
            .with_context(|| format!("Invalid listen address {}:{}", config.host, config.port))?;
        let state = AppState::new(Pipeline::default(), &config);
        let jobs = config.concurrent_jobs();
        let app = router(state);

        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {addr}"))?;
        info!(
            max_upload_bytes = config.max_upload_bytes,
            max_concurrent_jobs = jobs,
            "Listening on http://{}",
            addr
        );

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("HTTP server failed")
    })
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

fn process(files: &[PathBuf], cold: Option<u32>, pretty: bool) -> anyhow::Result<ExitCode> {
    let pipeline = Pipeline::default();
    let outcomes = process_paths(&pipeline, files, cold, None);
    let failed = outcomes.iter().filter(|o| !o.is_success()).count();

    for outcome in &outcomes {
        let line = render(outcome, pretty)?;
        println!("{line}");
    }

    info!(
        total = outcomes.len(),
        failed,
        "processed {} file(s)",
        outcomes.len()
    );
    Ok(if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn render(outcome: &ImportOutcome, pretty: bool) -> anyhow::Result<String> {
    let value = match &outcome.result {
        Ok(egg) => serde_json::to_value(egg)?,
        Err(err) => {
            let kind = match err {
                ImportError::Io { .. } => "IoError",
                ImportError::Pipeline(err) => err.kind(),
            };
            json!({
                "path": outcome.path.display().to_string(),
                "error": kind,
                "detail": err.to_string(),
            })
        }
    };
    Ok(if pretty {
        serde_json::to_string_pretty(&value)?
    } else {
        serde_json::to_string(&value)?
    })
}
