//! Grammar metadata from the definition header.

use serde::{Deserialize, Serialize};

/// Top-level metadata of a grammar definition.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GrammarMeta {
	/// Language name, unique within a registry.
	pub name: String,
	#[serde(default)]
	pub section: String,
	/// File-name glob patterns (`*.sql`, `Makefile`).
	#[serde(default)]
	pub extensions: Vec<String>,
	#[serde(default)]
	pub mime_types: Vec<String>,
	#[serde(default)]
	pub version: String,
	#[serde(default)]
	pub kate_version: String,
	/// Tie-break when several grammars claim the same file name.
	#[serde(default)]
	pub priority: i32,
	#[serde(default)]
	pub author: String,
	#[serde(default)]
	pub license: String,
	/// Hidden grammars exist only to be included by others.
	#[serde(default)]
	pub hidden: bool,
	#[serde(default)]
	pub indenter: Option<String>,
}
