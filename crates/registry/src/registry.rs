//! Lookup and identity caching of loaded grammars.

use std::cmp::Reverse;
use std::path::Path;
use std::sync::Arc;

use globset::{Glob, GlobBuilder, GlobSet, GlobSetBuilder};
use parking_lot::RwLock;
use regex::Regex;
use rustc_hash::FxHashMap;
use synline_grammar::{Grammar, IncludeResolver};

use crate::bundled;
use crate::config::RegistryConfig;
use crate::error::RegistryError;
use crate::index::{GrammarIndex, IndexEntry};
use crate::source::DefinitionSource;

/// Everything a caller knows about a document, for [`Registry::detect`].
///
/// Fields are tried in declaration order; the first one that names a
/// grammar wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct DetectQuery<'a> {
	/// An explicit definition file (`sql.xml`).
	pub definition_file: Option<&'a str>,
	pub mime_type: Option<&'a str>,
	/// An explicit language name.
	pub name: Option<&'a str>,
	/// Path of the document; only the file-name component is matched.
	pub file_name: Option<&'a Path>,
	pub first_line: Option<&'a str>,
}

impl DetectQuery<'_> {
	fn describe(&self) -> String {
		let mut parts = Vec::new();
		if let Some(file) = self.definition_file {
			parts.push(format!("definition `{file}`"));
		}
		if let Some(mime) = self.mime_type {
			parts.push(format!("MIME type `{mime}`"));
		}
		if let Some(name) = self.name {
			parts.push(format!("name `{name}`"));
		}
		if let Some(path) = self.file_name {
			parts.push(format!("file name `{}`", path.display()));
		}
		if let Some(line) = self.first_line {
			parts.push(format!("first line `{line}`"));
		}
		if parts.is_empty() { "an empty query".to_string() } else { parts.join(", ") }
	}
}

struct Entry {
	source: usize,
	meta: IndexEntry,
	first_line: Option<Regex>,
}

/// Resolves grammars by name, MIME type, file name or first line.
///
/// Grammars load on first use and are cached per definition: every lookup
/// that resolves to the same definition returns the same `Arc`. Failed loads
/// are not cached; the next lookup tries again.
pub struct Registry {
	sources: Vec<DefinitionSource>,
	entries: Vec<Entry>,
	globs: GlobSet,
	/// Entry index of each glob in `globs`.
	glob_entries: Vec<usize>,
	cache: RwLock<FxHashMap<usize, Arc<Grammar>>>,
}

impl std::fmt::Debug for Registry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Registry")
			.field("sources", &self.sources.iter().map(DefinitionSource::describe).collect::<Vec<_>>())
			.field("languages", &self.entries.iter().map(|e| e.meta.name.as_str()).collect::<Vec<_>>())
			.field("loaded", &self.cache.read().len())
			.finish()
	}
}

impl Registry {
	/// Builds a registry from configured directories and, if enabled, the
	/// bundled definitions.
	///
	/// Missing directories are skipped. A directory whose index cannot be
	/// read, or declares a glob or first-line pattern that does not compile,
	/// is skipped with a warning so one broken user directory does not
	/// disable highlighting.
	pub fn new(config: &RegistryConfig) -> Result<Self, RegistryError> {
		let mut layers = Vec::new();
		for dir in &config.search_paths {
			if !dir.is_dir() {
				tracing::trace!(dir = %dir.display(), "grammar directory absent");
				continue;
			}
			let index = GrammarIndex::load_dir(dir).and_then(|index| {
				index.grammars.iter().try_for_each(|meta| compile_patterns(meta).map(drop))?;
				Ok(index)
			});
			match index {
				Ok(index) => layers.push((DefinitionSource::Dir(dir.clone()), index)),
				Err(error) => tracing::warn!(dir = %dir.display(), %error, "ignoring grammar directory"),
			}
		}
		if config.bundled {
			layers.push((DefinitionSource::Bundled, GrammarIndex::from_json(bundled::INDEX, "<bundled>")?));
		}
		Self::from_sources(layers)
	}

	/// The embedded definitions only.
	pub fn bundled() -> Result<Self, RegistryError> {
		Self::new(&RegistryConfig::bundled_only())
	}

	/// Builds a registry from explicit (source, index) layers, highest
	/// precedence first. A language already provided by an earlier layer is
	/// shadowed in later ones. Unlike [`new`](Self::new), an entry whose
	/// patterns do not compile is an error.
	pub fn from_sources(layers: Vec<(DefinitionSource, GrammarIndex)>) -> Result<Self, RegistryError> {
		let mut sources = Vec::with_capacity(layers.len());
		let mut entries: Vec<Entry> = Vec::new();
		let mut globs = GlobSetBuilder::new();
		let mut glob_entries = Vec::new();

		for (source, index) in layers {
			let source_idx = sources.len();
			for meta in index.grammars {
				if entries.iter().any(|e| e.meta.name.eq_ignore_ascii_case(&meta.name)) {
					tracing::debug!(grammar = %meta.name, source = %source.describe(), "grammar shadowed by earlier source");
					continue;
				}

				let (first_line, entry_globs) = compile_patterns(&meta)?;
				for glob in entry_globs {
					globs.add(glob);
					glob_entries.push(entries.len());
				}

				entries.push(Entry {
					source: source_idx,
					meta,
					first_line,
				});
			}
			sources.push(source);
		}

		let globs = globs.build().map_err(|e| RegistryError::Pattern {
			grammar: "<index>".to_string(),
			pattern: e.glob().unwrap_or_default().to_string(),
			message: e.to_string(),
		})?;

		tracing::debug!(sources = sources.len(), grammars = entries.len(), "grammar registry ready");
		Ok(Self {
			sources,
			entries,
			globs,
			glob_entries,
			cache: RwLock::new(FxHashMap::default()),
		})
	}

	/// Looks a grammar up by language name (ASCII case-insensitive).
	/// Hidden grammars are found too.
	pub fn by_name(&self, name: &str) -> Result<Arc<Grammar>, RegistryError> {
		let idx = self.find_name(name).ok_or_else(|| RegistryError::not_found(format!("name `{name}`")))?;
		self.load(idx)
	}

	pub fn by_mime_type(&self, mime_type: &str) -> Result<Arc<Grammar>, RegistryError> {
		let idx = self
			.find_mime_type(mime_type)
			.ok_or_else(|| RegistryError::not_found(format!("MIME type `{mime_type}`")))?;
		self.load(idx)
	}

	/// Matches the file-name component of `path` against every grammar's
	/// globs. When several grammars match, the highest priority wins, then
	/// the earliest declared.
	pub fn by_source_file_name(&self, path: impl AsRef<Path>) -> Result<Arc<Grammar>, RegistryError> {
		let path = path.as_ref();
		let idx = self
			.find_file_name(path)
			.ok_or_else(|| RegistryError::not_found(format!("file name `{}`", path.display())))?;
		self.load(idx)
	}

	/// Content sniffing: tries every grammar's first-line regex, with the
	/// same tie-break as [`by_source_file_name`](Self::by_source_file_name).
	pub fn by_first_line(&self, line: &str) -> Result<Arc<Grammar>, RegistryError> {
		let idx = self
			.find_first_line(line)
			.ok_or_else(|| RegistryError::not_found(format!("first line `{line}`")))?;
		self.load(idx)
	}

	/// Looks a grammar up by its definition file name (`sql.xml`).
	pub fn by_definition_file(&self, file: &str) -> Result<Arc<Grammar>, RegistryError> {
		let idx = self
			.find_definition_file(file)
			.ok_or_else(|| RegistryError::not_found(format!("definition `{file}`")))?;
		self.load(idx)
	}

	/// Tries definition file, MIME type, name, file name and first line in
	/// that order. The first criterion that names a grammar decides; a load
	/// failure of that grammar is returned rather than falling through.
	pub fn detect(&self, query: &DetectQuery<'_>) -> Result<Arc<Grammar>, RegistryError> {
		let idx = query
			.definition_file
			.and_then(|f| self.find_definition_file(f))
			.or_else(|| query.mime_type.and_then(|m| self.find_mime_type(m)))
			.or_else(|| query.name.and_then(|n| self.find_name(n)))
			.or_else(|| query.file_name.and_then(|p| self.find_file_name(p)))
			.or_else(|| query.first_line.and_then(|l| self.find_first_line(l)))
			.ok_or_else(|| RegistryError::not_found(query.describe()))?;
		self.load(idx)
	}

	/// Names of the grammars a user may pick, in declaration order.
	pub fn languages(&self) -> Vec<&str> {
		self.entries
			.iter()
			.filter(|e| !e.meta.hidden)
			.map(|e| e.meta.name.as_str())
			.collect()
	}

	/// Index entries of every known grammar, hidden ones included.
	pub fn entries(&self) -> impl Iterator<Item = &IndexEntry> {
		self.entries.iter().map(|e| &e.meta)
	}

	/// Number of grammars currently cached.
	pub fn loaded_count(&self) -> usize {
		self.cache.read().len()
	}

	fn find_name(&self, name: &str) -> Option<usize> {
		self.entries.iter().position(|e| e.meta.name.eq_ignore_ascii_case(name))
	}

	fn find_definition_file(&self, file: &str) -> Option<usize> {
		self.entries.iter().position(|e| e.meta.file == file)
	}

	fn find_mime_type(&self, mime_type: &str) -> Option<usize> {
		self.best(
			self.detectable()
				.filter(|&i| self.entries[i].meta.mime_types.iter().any(|m| m.eq_ignore_ascii_case(mime_type))),
		)
	}

	fn find_file_name(&self, path: &Path) -> Option<usize> {
		let name = path.file_name()?;
		let matched = self.globs.matches(name);
		self.best(
			matched
				.into_iter()
				.map(|glob| self.glob_entries[glob])
				.filter(|&i| !self.entries[i].meta.hidden),
		)
	}

	fn find_first_line(&self, line: &str) -> Option<usize> {
		self.best(
			self.detectable()
				.filter(|&i| self.entries[i].first_line.as_ref().is_some_and(|re| re.is_match(line))),
		)
	}

	fn detectable(&self) -> impl Iterator<Item = usize> + '_ {
		(0..self.entries.len()).filter(|&i| !self.entries[i].meta.hidden)
	}

	/// Highest priority, then earliest declaration.
	fn best(&self, candidates: impl Iterator<Item = usize>) -> Option<usize> {
		candidates.max_by_key(|&i| (self.entries[i].meta.priority, Reverse(i)))
	}

	fn load(&self, idx: usize) -> Result<Arc<Grammar>, RegistryError> {
		let entry = &self.entries[idx];
		if let Some(grammar) = self.cache.read().get(&idx) {
			tracing::trace!(grammar = %entry.meta.name, "grammar cache hit");
			return Ok(grammar.clone());
		}

		tracing::debug!(grammar = %entry.meta.name, file = %entry.meta.file, "grammar cache miss");
		let text = self.sources[entry.source].read(&entry.meta.file)?;
		let grammar = synline_grammar::load(&text, &Includes { registry: self })?;
		if grammar.name() != entry.meta.name {
			tracing::warn!(indexed = %entry.meta.name, declared = %grammar.name(), "index name differs from definition");
		}

		// Another thread may have loaded it meanwhile; keep the first so
		// identity stays stable.
		let mut cache = self.cache.write();
		Ok(cache.entry(idx).or_insert_with(|| Arc::new(grammar)).clone())
	}
}

/// Resolves `##Language` references through the registry's index.
struct Includes<'r> {
	registry: &'r Registry,
}

impl IncludeResolver for Includes<'_> {
	fn resolve(&self, language: &str) -> Result<String, String> {
		let idx = self
			.registry
			.find_name(language)
			.ok_or_else(|| "no such language in the grammar index".to_string())?;
		let entry = &self.registry.entries[idx];
		tracing::debug!(include = %language, file = %entry.meta.file, "resolving included grammar");
		self.registry.sources[entry.source]
			.read(&entry.meta.file)
			.map(|text| text.into_owned())
			.map_err(|e| e.to_string())
	}
}

/// Compiles an entry's first-line regex and file-name globs.
fn compile_patterns(meta: &IndexEntry) -> Result<(Option<Regex>, Vec<Glob>), RegistryError> {
	let invalid = |pattern: &str, message: String| RegistryError::Pattern {
		grammar: meta.name.clone(),
		pattern: pattern.to_string(),
		message,
	};
	let first_line = meta
		.first_line
		.as_deref()
		.map(|pattern| Regex::new(pattern).map_err(|e| invalid(pattern, e.to_string())))
		.transpose()?;
	let globs = meta
		.patterns
		.iter()
		.map(|pattern| {
			GlobBuilder::new(pattern)
				.literal_separator(true)
				.build()
				.map_err(|e| invalid(pattern, e.to_string()))
		})
		.collect::<Result<_, _>>()?;
	Ok((first_line, globs))
}

#[cfg(test)]
mod tests;
