//! camwatchd — the camwatch daemon.
//!
//! Single binary that assembles the monitor:
//! - Camera probes over the HTTP snapshot frame source
//! - Status tracker
//! - Alert dispatcher (log or webhook channel)
//! - Check scheduler
//! - HTTP status surface
//!
//! # Usage
//!
//! ```text
//! camwatchd init --path camwatch.toml
//! camwatchd check --config camwatch.toml
//! camwatchd run --config camwatch.toml --interval 30s
//! ```

mod assemble;
mod run_mode;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "camwatchd", about = "Camera liveness monitor", version)]
struct Cli {
    /// Log output format.
    #[arg(long, value_enum, default_value = "text", global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Check cameras periodically and alert on every status change.
    Run {
        /// Path to camwatch.toml.
        #[arg(short, long, default_value = "camwatch.toml")]
        config: PathBuf,

        /// Override `check_interval` (e.g. "30s", "2m").
        #[arg(long)]
        interval: Option<String>,

        /// Override `http.listen`.
        #[arg(long)]
        listen: Option<String>,

        /// Do not serve the HTTP status surface.
        #[arg(long)]
        no_http: bool,
    },
    /// Run a single check cycle, print the results and exit.
    ///
    /// Exits with status 1 if any camera is offline.
    Check {
        /// Path to camwatch.toml.
        #[arg(short, long, default_value = "camwatch.toml")]
        config: PathBuf,
    },
    /// Write a starter camwatch.toml.
    Init {
        #[arg(short, long, default_value = "camwatch.toml")]
        path: PathBuf,

        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

fn init_tracing(format: LogFormat) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new("info,camwatch=debug"))?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.log_format)?;

    match cli.command {
        Command::Run {
            config,
            interval,
            listen,
            no_http,
        } => {
            run_mode::run(run_mode::RunOptions {
                config,
                interval,
                listen,
                no_http,
            })
            .await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Check { config } => run_mode::check(&config).await,
        Command::Init { path, force } => {
            run_mode::init(&path, force)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
