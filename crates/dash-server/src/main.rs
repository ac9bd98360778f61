//! dash-server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), points a dataset
//! cache at the configured export files and serves the JSON API over HTTP.
//!
//! # One-shot modes
//!
//! ```
//! cargo run -p dash-server -- --check
//! cargo run -p dash-server -- --report grubhub
//! ```

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::{Parser, ValueEnum};
use dash_core::{doordash, grubhub};
use dash_server::DashboardConfig;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Delivery-platform dashboard server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Print one unfiltered report as JSON and exit.
  #[arg(long, value_enum)]
  report: Option<Platform>,

  /// Print the load status of every dataset and exit.
  #[arg(long)]
  check: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Platform {
  Doordash,
  Grubhub,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Logs go to stderr so that one-shot JSON output stays clean.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();

  let config = DashboardConfig::load(&cli.config)
    .with_context(|| format!("failed to load config from {:?}", cli.config))?;
  let cache = Arc::new(config.cache().context("invalid [sources] table")?);

  if cli.check {
    let statuses = dash_api::datasets::statuses(cache.as_ref());
    println!("{}", serde_json::to_string_pretty(&statuses)?);
    return Ok(());
  }

  if let Some(platform) = cli.report {
    let json = match platform {
      Platform::Doordash => {
        let report = doordash::report(cache.as_ref(), &Default::default())
          .context("failed to build DoorDash report")?;
        serde_json::to_string_pretty(&report)?
      }
      Platform::Grubhub => {
        let report = grubhub::report(cache.as_ref(), &Default::default())
          .context("failed to build GrubHub report")?;
        serde_json::to_string_pretty(&report)?
      }
    };
    println!("{json}");
    return Ok(());
  }

  let app = dash_server::app(cache);
  let address = config.address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
