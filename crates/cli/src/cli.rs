use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "synline")]
#[command(about = "Grammar-driven syntax highlighting")]
#[command(version)]
/// Command-line arguments.
pub struct Cli {
	/// Configuration file (defaults to $XDG_CONFIG_HOME/synline/config.toml)
	#[arg(long, global = true, value_name = "PATH")]
	pub config: Option<PathBuf>,

	/// Extra grammar directory, searched before all others (repeatable)
	#[arg(long, global = true, value_name = "DIR")]
	pub runtime: Vec<PathBuf>,

	#[command(subcommand)]
	pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
	/// Print the grammar that would highlight a file
	Detect {
		path: PathBuf,
	},
	/// Print the highlighting spans of a file
	Highlight {
		path: PathBuf,

		/// Grammar name to use instead of detecting one
		#[arg(long)]
		syntax: Option<String>,

		#[arg(long, value_enum, default_value_t = OutputFormat::Plain)]
		format: OutputFormat,
	},
	/// Write index.json for a directory of grammar definitions
	Index {
		dir: PathBuf,

		/// Print the index instead of writing it
		#[arg(long)]
		stdout: bool,
	},
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
	Plain,
	Json,
}
