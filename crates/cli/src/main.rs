#![cfg_attr(test, allow(unused_crate_dependencies))]
//! `synline`: detect grammars, print highlighting, generate grammar indexes.

mod cli;
mod config;
mod highlight;

use std::fs;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::Context;
use clap::Parser;
use cli::{Cli, Command, OutputFormat};
use config::Config;
use synline_registry::index::INDEX_FILE;
use synline_registry::{GrammarIndex, Registry};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
	let cli = Cli::parse();
	let config = Config::load(cli.config.as_deref())?;
	setup_tracing(&config.log_level);

	match cli.command {
		Command::Detect { path } => {
			let registry = Registry::new(&config.registry_config(&cli.runtime))?;
			let first_line = read_first_line(&path);
			let grammar = highlight::select(&registry, &path, first_line.as_deref(), None)?;
			println!("{}", grammar.name());
		}
		Command::Highlight { path, syntax, format } => {
			let registry = Registry::new(&config.registry_config(&cli.runtime))?;
			let text = fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
			let grammar = highlight::select(&registry, &path, text.lines().next(), syntax.as_deref())?;
			let report = highlight::highlight(grammar, &text, config.budget());
			match format {
				OutputFormat::Plain => print!("{}", highlight::render_plain(&report)),
				OutputFormat::Json => println!("{}", highlight::render_json(&report)?),
			}
		}
		Command::Index { dir, stdout } => {
			let index = GrammarIndex::from_dir(&dir)?;
			let json = index.to_json()?;
			if stdout {
				println!("{json}");
			} else {
				let path = dir.join(INDEX_FILE);
				fs::write(&path, json + "\n").with_context(|| format!("writing {}", path.display()))?;
				tracing::info!(path = %path.display(), grammars = index.grammars.len(), "index written");
			}
		}
	}
	Ok(())
}

/// `SYNLINE_LOG` overrides the configured level. Logs go to stderr so they
/// never mix with highlighting output.
fn setup_tracing(default_level: &str) {
	let filter = EnvFilter::try_from_env("SYNLINE_LOG").unwrap_or_else(|_| EnvFilter::new(default_level));
	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_target(false)
		.init();
}

/// Detection works on files that do not exist yet; the first line is only a
/// hint.
fn read_first_line(path: &Path) -> Option<String> {
	let file = fs::File::open(path).ok()?;
	let mut line = String::new();
	BufReader::new(file).read_line(&mut line).ok()?;
	Some(line.trim_end_matches(['\r', '\n']).to_string())
}
