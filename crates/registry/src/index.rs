//! The grammar index: which definition file answers which query.
//!
//! Stored as `index.json` next to the definitions. Entry order is
//! significant: it is the declaration order used to break ties between
//! grammars of equal priority.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use synline_grammar::GrammarMeta;
use synline_grammar::xml::parse_meta;

use crate::error::RegistryError;

/// File name of the index inside a definition directory.
pub const INDEX_FILE: &str = "index.json";

/// One definition file and the queries it answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
	/// Definition file, relative to its source.
	pub file: String,
	/// Language name as declared by the definition.
	pub name: String,
	#[serde(default)]
	pub mime_types: Vec<String>,
	/// File-name globs (`*.sql`, `Makefile`).
	#[serde(default)]
	pub patterns: Vec<String>,
	/// Regex tried against the first line of a document (shebangs, modelines).
	#[serde(default)]
	pub first_line: Option<String>,
	#[serde(default)]
	pub priority: i32,
	/// Hidden grammars exist only to be included by others.
	#[serde(default)]
	pub hidden: bool,
}

impl IndexEntry {
	/// Builds an entry from a definition header.
	pub fn from_meta(file: impl Into<String>, meta: &GrammarMeta) -> Self {
		Self {
			file: file.into(),
			name: meta.name.clone(),
			mime_types: meta.mime_types.clone(),
			patterns: meta.extensions.clone(),
			first_line: None,
			priority: meta.priority,
			hidden: meta.hidden,
		}
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrammarIndex {
	pub grammars: Vec<IndexEntry>,
}

impl GrammarIndex {
	/// Parses an index document. `origin` names it in error messages.
	pub fn from_json(text: &str, origin: &str) -> Result<Self, RegistryError> {
		serde_json::from_str(text).map_err(|source| RegistryError::Index {
			origin: origin.to_string(),
			source,
		})
	}

	pub fn to_json(&self) -> Result<String, serde_json::Error> {
		serde_json::to_string_pretty(self)
	}

	/// Reads `dir/index.json` if present, otherwise scans the directory.
	pub fn load_dir(dir: &Path) -> Result<Self, RegistryError> {
		let path = dir.join(INDEX_FILE);
		match fs::read_to_string(&path) {
			Ok(text) => Self::from_json(&text, &path.display().to_string()),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::from_dir(dir),
			Err(source) => Err(RegistryError::Io { path, source }),
		}
	}

	/// Builds an index by reading the header of every `*.xml` file in `dir`.
	///
	/// Files are visited in file-name order so the result is stable.
	/// Definitions whose header cannot be read are skipped with a warning;
	/// they will fail properly if something later asks for them by file.
	pub fn from_dir(dir: &Path) -> Result<Self, RegistryError> {
		let io_err = |source| RegistryError::Io {
			path: dir.to_path_buf(),
			source,
		};

		let mut files = Vec::new();
		for entry in fs::read_dir(dir).map_err(io_err)? {
			let path = entry.map_err(io_err)?.path();
			if path.extension().is_some_and(|ext| ext == "xml") && path.is_file() {
				files.push(path);
			}
		}
		files.sort();

		let mut grammars = Vec::with_capacity(files.len());
		for path in files {
			let text = fs::read_to_string(&path).map_err(|source| RegistryError::Io {
				path: path.clone(),
				source,
			})?;
			let Some(file) = path.file_name().and_then(|f| f.to_str()) else {
				continue;
			};
			match parse_meta(&text) {
				Ok(meta) => grammars.push(IndexEntry::from_meta(file, &meta)),
				Err(error) => tracing::warn!(file, %error, "skipping unreadable grammar definition"),
			}
		}

		tracing::debug!(dir = %dir.display(), grammars = grammars.len(), "scanned grammar directory");
		Ok(Self { grammars })
	}
}
