use std::path::PathBuf;

use synline_grammar::LoadError;
use thiserror::Error;

/// Errors from grammar lookup and index handling.
#[derive(Error, Debug)]
pub enum RegistryError {
	/// No grammar answers the query. Hosts fall back to no highlighting.
	#[error("no grammar found for {query}")]
	NotFound { query: String },

	#[error(transparent)]
	Load(#[from] LoadError),

	#[error("failed to read {}: {source}", path.display())]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("malformed grammar index {origin}: {source}")]
	Index {
		origin: String,
		#[source]
		source: serde_json::Error,
	},

	#[error("invalid pattern {pattern:?} for grammar `{grammar}`: {message}")]
	Pattern { grammar: String, pattern: String, message: String },
}

impl RegistryError {
	/// True when the lookup simply had no answer.
	pub fn is_not_found(&self) -> bool {
		matches!(self, Self::NotFound { .. })
	}

	pub(crate) fn not_found(query: impl Into<String>) -> Self {
		Self::NotFound { query: query.into() }
	}
}
