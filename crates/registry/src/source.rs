use std::borrow::Cow;
use std::fs;
use std::path::PathBuf;

use rustc_hash::FxHashMap;

use crate::bundled;
use crate::error::RegistryError;

/// Where definition files named by an index are read from.
#[derive(Debug, Clone)]
pub enum DefinitionSource {
	/// A directory on disk; index file names are relative to it.
	Dir(PathBuf),
	/// Definitions held in memory, keyed by file name.
	Memory(FxHashMap<String, String>),
	/// The definitions embedded in this crate.
	Bundled,
}

impl DefinitionSource {
	pub fn memory<I, K, V>(files: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		Self::Memory(files.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
	}

	pub(crate) fn read(&self, file: &str) -> Result<Cow<'_, str>, RegistryError> {
		match self {
			Self::Dir(dir) => {
				let path = dir.join(file);
				fs::read_to_string(&path)
					.map(Cow::Owned)
					.map_err(|source| RegistryError::Io { path, source })
			}
			Self::Memory(files) => files
				.get(file)
				.map(|text| Cow::Borrowed(text.as_str()))
				.ok_or_else(|| missing(file)),
			Self::Bundled => bundled::definition(file).map(Cow::Borrowed).ok_or_else(|| missing(file)),
		}
	}

	/// Short description for logs and error messages.
	pub(crate) fn describe(&self) -> String {
		match self {
			Self::Dir(dir) => dir.display().to_string(),
			Self::Memory(_) => "<memory>".to_string(),
			Self::Bundled => "<bundled>".to_string(),
		}
	}
}

fn missing(file: &str) -> RegistryError {
	RegistryError::Io {
		path: PathBuf::from(file),
		source: std::io::Error::new(std::io::ErrorKind::NotFound, "definition not present in source"),
	}
}
