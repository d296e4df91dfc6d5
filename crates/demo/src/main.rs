//! Picklist demo binary.
//!
//! Runs one scripted scenario against a seeded in-memory blogger directory
//! and prints the callbacks and render state after every step.

mod cli;
mod config;
mod scenario;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::config::DemoConfig;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
	let cli = Cli::parse();
	init_tracing(cli.verbose);

	let mut config = DemoConfig::load(cli.config.as_deref())?;
	cli.apply_overrides(&mut config);
	config.select.validate()?;
	info!(
		per_page = config.select.per_page,
		rows = config.store.rows,
		latency_ms = config.store.latency_ms,
		"picklist.config"
	);

	scenario::run(&cli.scenario, &config).await
}

/// Logs go to stderr so scenario output stays readable. `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: bool) {
	let default = if verbose { "debug" } else { "info" };
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
	tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}
