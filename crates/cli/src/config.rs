//! The optional `config.toml`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;
use synline_document::ReconcileBudget;
use synline_registry::{RegistryConfig, config_dir, default_search_paths};

pub const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
	/// `tracing` filter used when `SYNLINE_LOG` is unset.
	pub log_level: String,
	/// Grammar directories searched before the default locations.
	pub runtime_dirs: Vec<PathBuf>,
	/// Fall back to the embedded grammars.
	pub bundled: bool,
	pub reconcile: ReconcileConfig,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			log_level: "warn".to_string(),
			runtime_dirs: Vec::new(),
			bundled: true,
			reconcile: ReconcileConfig::default(),
		}
	}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReconcileConfig {
	pub max_lines: Option<usize>,
	pub max_time_ms: Option<u64>,
}

impl Config {
	/// Reads `explicit`, or the default location if it exists.
	///
	/// An explicit path must exist; a missing default file means defaults.
	pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
		let path = match explicit {
			Some(path) => path.to_path_buf(),
			None => match config_dir().map(|dir| dir.join("synline").join(CONFIG_FILE)) {
				Some(path) if path.is_file() => path,
				_ => return Ok(Self::default()),
			},
		};
		let text = fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
		Self::parse(&text).with_context(|| format!("parsing {}", path.display()))
	}

	pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
		toml::from_str(text)
	}

	/// Search order: `--runtime` dirs, configured dirs, default locations.
	pub fn registry_config(&self, extra: &[PathBuf]) -> RegistryConfig {
		let search_paths = extra
			.iter()
			.chain(&self.runtime_dirs)
			.cloned()
			.chain(default_search_paths())
			.collect();
		RegistryConfig {
			search_paths,
			bundled: self.bundled,
		}
	}

	pub fn budget(&self) -> ReconcileBudget {
		let defaults = ReconcileBudget::default();
		ReconcileBudget {
			max_lines: self.reconcile.max_lines.or(defaults.max_lines),
			max_time: self.reconcile.max_time_ms.map(Duration::from_millis).or(defaults.max_time),
		}
	}
}
