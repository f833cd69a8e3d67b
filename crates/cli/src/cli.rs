use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Case map command line arguments.
#[derive(Parser, Debug)]
#[command(name = "casemap")]
#[command(about = "Inspect, round-trip and validate case map data")]
pub struct Cli {
	/// Map configuration file (TOML)
	#[arg(short, long, value_name = "PATH", global = true)]
	pub config: Option<PathBuf>,

	/// Verbose logging
	#[arg(short, long, global = true)]
	pub verbose: bool,

	/// Case to stamp on imported elements
	#[arg(long, value_name = "ID", global = true)]
	pub case: Option<String>,

	#[command(subcommand)]
	pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
	/// Classify a feature collection and report geometry errors
	Inspect {
		/// GeoJSON feature collection
		file: PathBuf,
	},
	/// Import a feature collection into a headless map and export it again
	Roundtrip {
		/// GeoJSON feature collection
		file: PathBuf,
		/// Output path; stdout when omitted
		#[arg(short, long, value_name = "PATH")]
		out: Option<PathBuf>,
	},
	/// Print the interaction state machine as Graphviz DOT
	Dot,
	/// Validate a configuration file and print the effective settings
	Config {
		/// Configuration file (TOML)
		file: PathBuf,
	},
}
