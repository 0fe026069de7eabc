//! The `run`, `check` and `init` subcommands.
//!
//! `run` starts the scheduler loop and, unless disabled, the HTTP status
//! surface, then waits for Ctrl-C:
//! 1. Shutdown flag flips, so an in-flight probe phase is abandoned
//! 2. The HTTP server drains open requests
//! 3. The scheduler task is awaited so no commit is cut short

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, bail};
use tokio::sync::watch;
use tracing::info;

use camwatch_core::{CameraConfig, MonitorConfig, parse_duration};

use crate::assemble::build_scheduler;

pub struct RunOptions {
    pub config: PathBuf,
    pub interval: Option<String>,
    pub listen: Option<String>,
    pub no_http: bool,
}

fn load(path: &Path) -> anyhow::Result<MonitorConfig> {
    MonitorConfig::from_file(path).with_context(|| format!("loading {}", path.display()))
}

pub async fn run(opts: RunOptions) -> anyhow::Result<()> {
    let config = load(&opts.config)?;

    let interval = match &opts.interval {
        Some(raw) => parse_duration(raw)
            .with_context(|| format!("invalid --interval {raw:?}, expected e.g. \"30s\""))?,
        None => config.check_interval()?,
    };

    let scheduler = build_scheduler(&config, interval)?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let scheduler_task = {
        let scheduler = scheduler.clone();
        let shutdown = shutdown_rx.clone();
        tokio::spawn(async move {
            scheduler.run_forever(interval, shutdown).await;
        })
    };

    let serve_http = config.http.enabled && !opts.no_http;
    if serve_http {
        let listen = opts.listen.as_deref().unwrap_or(&config.http.listen);
        let addr: SocketAddr = listen
            .parse()
            .with_context(|| format!("invalid listen address {listen:?}"))?;

        let router = camwatch_api::build_router(scheduler.clone());
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("binding {addr}"))?;
        info!(%addr, "status surface listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                wait_for_ctrl_c().await;
                let _ = shutdown_tx.send(true);
            })
            .await?;
    } else {
        wait_for_ctrl_c().await;
        let _ = shutdown_tx.send(true);
    }

    scheduler_task.await?;
    info!("camwatchd stopped");
    Ok(())
}

async fn wait_for_ctrl_c() {
    tokio::signal::ctrl_c()
        .await
        .unwrap_or_else(|e| tracing::error!(error = %e, "failed to listen for ctrl-c"));
    info!("shutdown signal received");
}

/// Run one cycle and print a table. Fails the process if any camera is offline.
pub async fn check(path: &Path) -> anyhow::Result<ExitCode> {
    let config = load(path)?;
    let scheduler = build_scheduler(&config, config.check_interval()?)?;

    let results = scheduler.run_once().await;
    print!("{}", format_results(&config.cameras, &results));

    let offline = results.values().filter(|online| !**online).count();
    if offline > 0 {
        eprintln!("{offline} of {} camera(s) offline", results.len());
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

/// Render check results in configured camera order.
fn format_results(cameras: &[CameraConfig], results: &BTreeMap<String, bool>) -> String {
    let width = cameras
        .iter()
        .map(|c| c.name.len())
        .max()
        .unwrap_or(0)
        .max("CAMERA".len());

    let mut out = String::new();
    let _ = writeln!(out, "{:<width$}  {:<8}  ENDPOINT", "CAMERA", "STATUS");
    for camera in cameras {
        let status = match results.get(&camera.name) {
            Some(true) => "online",
            Some(false) => "offline",
            None => "unknown",
        };
        let _ = writeln!(out, "{:<width$}  {:<8}  {}", camera.name, status, camera.endpoint);
    }
    out
}

/// Write a starter config to `path`.
pub fn init(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }

    let toml = MonitorConfig::scaffold().to_toml_string()?;
    std::fs::write(path, toml).with_context(|| format!("writing {}", path.display()))?;
    println!("wrote {}", path.display());
    Ok(())
}
