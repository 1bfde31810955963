#![cfg_attr(test, allow(unused_crate_dependencies))]
// Grammar loading runs inside editor hosts - diagnostics go through tracing, not stderr
#![deny(clippy::print_stderr)]

//! Declarative highlighting grammars.
//!
//! A [`Grammar`] is the immutable, compiled form of one language's
//! highlighting definition: named contexts holding ordered rule lists,
//! keyword lists, and attributes tagged with a semantic [`FormatClass`].
//!
//! # Architecture
//!
//! * [`xml`]: parses Kate-style XML definitions into an unresolved form
//! * [`link`]: resolves references, splices included grammars and validates
//! * [`context`], [`rule`], [`attribute`], [`keywords`]: the compiled model
//! * [`dynamic`]: `%1`..`%9` placeholder handling for dynamic rules
//!
//! Grammars are built once per language and shared read-only (usually behind
//! an `Arc`) by every document highlighting that language.

pub mod attribute;
pub mod context;
pub mod dynamic;
mod error;
mod grammar;
pub mod keywords;
pub mod link;
pub mod meta;
pub mod rule;
pub mod xml;

pub use attribute::{Attribute, AttributeId, FormatClass};
pub use context::{Context, ContextId, ContextSwitch};
pub use error::LoadError;
pub use grammar::{CommentTokens, Grammar};
pub use keywords::{Deliminators, KeywordList, KeywordListId};
pub use link::{IncludeResolver, NoIncludes, load, load_standalone};
pub use meta::GrammarMeta;
pub use rule::{CharSet, Pattern, Rule, RuleKind};
