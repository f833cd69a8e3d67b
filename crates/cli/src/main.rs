//! Casemap command line tool.
//!
//! Runs the map core headless: classifies and round-trips GeoJSON feature
//! collections, prints the interaction state machine and validates configuration.

mod cli;
mod commands;

use anyhow::{Context, Result};
use casemap_map::MapConfig;
use casemap_primitives::CaseId;
use clap::Parser;
use tracing::info;

use crate::cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
	let cli = Cli::parse();
	setup_tracing(cli.verbose);

	let config = match &cli.config {
		Some(path) => MapConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
		None => MapConfig::default(),
	};

	match cli.command {
		Command::Inspect { file } => {
			let collection = commands::read_collection(&file)?;
			print!("{}", commands::inspect(&collection));
		}
		Command::Roundtrip { file, out } => {
			let collection = commands::read_collection(&file)?;
			let case = cli.case.map(CaseId::new);
			let (exported, report) = commands::roundtrip(collection, config, case).await;
			info!(queued = report.queued, failed = report.failed.len(), "cli.roundtrip.done");
			let json = serde_json::to_string_pretty(&exported)?;
			match out {
				Some(path) => std::fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?,
				None => println!("{json}"),
			}
		}
		Command::Dot => print!("{}", commands::dot()),
		Command::Config { file } => print!("{}", commands::effective_config(&file)?),
	}

	Ok(())
}

fn setup_tracing(verbose: bool) {
	use tracing_subscriber::EnvFilter;

	let filter = EnvFilter::try_from_env("CASEMAP_LOG")
		.or_else(|_| EnvFilter::try_from_default_env())
		.unwrap_or_else(|_| {
			if verbose {
				EnvFilter::new("casemap=debug,casemap_map=debug,info")
			} else {
				EnvFilter::new("warn")
			}
		});

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_target(true)
		.init();
}
