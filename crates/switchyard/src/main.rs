// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Switchyard - decision routing with a guarded model lifecycle.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use switchyard::lifecycle::{self, IngestSources};
use switchyard::{resolve, serve};
use switchyard_config::model::SwitchyardConfig;
use switchyard_core::{ModelKind, RoutingRequest, SwitchyardError, TierId, ValidationThresholds};

/// Switchyard - decision routing with a guarded model lifecycle.
#[derive(Parser, Debug)]
#[command(name = "switchyard", version, about, long_about = None)]
struct Cli {
    /// Configuration file. Defaults to the XDG search path.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve one query and print the result as JSON.
    Resolve {
        query: String,
        #[arg(long)]
        context: Option<String>,
        /// Only consult this tier.
        #[arg(long)]
        tier: Option<TierId>,
    },
    /// Answer JSON Lines requests from stdin on stdout.
    Serve {
        #[arg(long, default_value_t = 16)]
        concurrency: usize,
        /// Expose Prometheus metrics on this address.
        #[arg(long)]
        metrics_addr: Option<SocketAddr>,
    },
    /// Merge raw records into a training dataset.
    Ingest {
        #[arg(long)]
        history: Option<PathBuf>,
        #[arg(long)]
        templates: Option<PathBuf>,
        #[arg(long)]
        corrections: Option<PathBuf>,
        #[arg(long)]
        out: PathBuf,
    },
    /// Train a staging artifact.
    Train {
        #[arg(long)]
        dataset: PathBuf,
        /// pattern or classifier. Defaults to `learning.default_kind`.
        #[arg(long)]
        kind: Option<ModelKind>,
        /// Split off a held-out set and write it here.
        #[arg(long)]
        held_out: Option<PathBuf>,
    },
    /// Replay a held-out set through an artifact.
    Validate {
        version: String,
        #[arg(long)]
        held_out: PathBuf,
        #[arg(long)]
        min_accuracy: f64,
        #[arg(long)]
        max_p99_ms: f64,
        /// Promote to VALIDATED when the report passes.
        #[arg(long)]
        promote: bool,
    },
    /// Install a VALIDATED artifact as production.
    Promote { version: String },
    /// Reinstall the previous production artifact.
    Rollback,
    /// Show every artifact area.
    Status {
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => switchyard_config::load_and_validate_path(path),
        None => switchyard_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            switchyard_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.logging.level);

    if let Err(e) = run(cli.command, config).await {
        eprintln!("error [{}]: {e}", e.kind());
        std::process::exit(1);
    }
}

async fn run(command: Commands, config: SwitchyardConfig) -> Result<(), SwitchyardError> {
    match command {
        Commands::Resolve {
            query,
            context,
            tier,
        } => {
            let mut request = RoutingRequest::new(query);
            request.context = context;
            request.pinned_tier = tier;
            resolve::run_resolve(&config, request).await?;
        }
        Commands::Serve {
            concurrency,
            metrics_addr,
        } => serve::run_serve(config, concurrency, metrics_addr).await?,
        Commands::Ingest {
            history,
            templates,
            corrections,
            out,
        } => {
            let sources = IngestSources {
                history,
                templates,
                corrections,
            };
            lifecycle::run_ingest(&sources, &out)?;
        }
        Commands::Train {
            dataset,
            kind,
            held_out,
        } => {
            lifecycle::run_train(&config, &dataset, kind, held_out.as_deref()).await?;
        }
        Commands::Validate {
            version,
            held_out,
            min_accuracy,
            max_p99_ms,
            promote,
        } => {
            let thresholds = ValidationThresholds::new(min_accuracy, max_p99_ms)?;
            let report =
                lifecycle::run_validate(&config, &version, &held_out, thresholds, promote).await?;
            if !report.passed() {
                return Err(SwitchyardError::ValidationFailed {
                    version,
                    accuracy: report.accuracy(),
                    p99_latency_ms: report.p99_latency_ms(),
                });
            }
        }
        Commands::Promote { version } => {
            lifecycle::run_promote(&config, &version).await?;
        }
        Commands::Rollback => {
            lifecycle::run_rollback(&config).await?;
        }
        Commands::Status { json } => {
            lifecycle::run_status(&config, json).await?;
        }
    }
    Ok(())
}

/// Logs go to stderr so `serve` output on stdout stays pure JSON Lines.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("switchyard={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
