use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::DemoConfig;

#[derive(Parser, Debug)]
#[command(name = "picklist")]
#[command(about = "Walk through combo-select scenarios against an in-memory blogger directory")]
#[command(version)]
/// Command-line arguments.
pub struct Cli {
	/// TOML file with [select] and [store] sections
	#[arg(short, long, value_name = "PATH")]
	pub config: Option<PathBuf>,

	/// Verbose logging
	#[arg(short, long)]
	pub verbose: bool,

	/// Page size requested from the directory
	#[arg(long)]
	pub per_page: Option<u32>,

	/// Artificial backend latency in milliseconds
	#[arg(long)]
	pub latency_ms: Option<u64>,

	/// Scenario to run.
	#[command(subcommand)]
	pub scenario: Scenario,
}

/// Available scenarios.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Scenario {
	/// Local list: select all, search, remove a chip
	Local,
	/// Remote list: scroll for more, select everything, exclude one
	Remote,
	/// Edit form: label preselected ids that are not on the first page
	Edit {
		/// Preselected blogger ids
		#[arg(long, value_delimiter = ',', default_values = ["3", "25"])]
		ids: Vec<String>,
	},
	/// Single select: reselect to clear, pick another to close
	Single,
	/// Delete the selected bloggers, then clear the selection
	Delete {
		/// Blogger ids to select and delete
		#[arg(required = true)]
		ids: Vec<String>,
	},
}

impl Cli {
	/// Applies flag overrides on top of the file configuration.
	pub fn apply_overrides(&self, config: &mut DemoConfig) {
		if let Some(per_page) = self.per_page {
			config.select.per_page = per_page;
		}
		if let Some(latency_ms) = self.latency_ms {
			config.store.latency_ms = latency_ms;
		}
	}
}
