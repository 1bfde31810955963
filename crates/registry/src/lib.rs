#![cfg_attr(test, allow(unused_crate_dependencies))]
// Lookups run inside editor hosts - diagnostics go through tracing, not stderr
#![deny(clippy::print_stderr)]

//! Grammar discovery and caching.
//!
//! A [`Registry`] answers "which grammar highlights this?" from a
//! [`GrammarIndex`] (name, MIME types, file-name globs, first-line regex per
//! definition file) and loads the answer on first use. Loaded grammars are
//! cached per definition, so repeated lookups hand out the same
//! `Arc<Grammar>` and callers may compare grammars with [`Arc::ptr_eq`].
//!
//! [`Arc::ptr_eq`]: std::sync::Arc::ptr_eq

mod bundled;
mod config;
mod error;
pub mod index;
mod registry;
mod source;

pub use config::{RegistryConfig, config_dir, default_search_paths};
pub use error::RegistryError;
pub use index::{GrammarIndex, IndexEntry};
pub use registry::{DetectQuery, Registry};
pub use source::DefinitionSource;
