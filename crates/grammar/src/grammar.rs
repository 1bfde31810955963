use std::sync::Arc;

use fancy_regex::Regex;
use rustc_hash::FxHashMap;

use crate::attribute::{Attribute, AttributeId};
use crate::context::{Context, ContextId};
use crate::dynamic::RegexCache;
use crate::keywords::{Deliminators, KeywordList, KeywordListId};
use crate::meta::GrammarMeta;

/// Comment delimiters declared in the definition's `<general>` section.
///
/// Not used for highlighting; exposed for hosts that toggle comments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentTokens {
	pub single_line: Option<String>,
	pub multi_line: Option<(String, String)>,
}

/// Immutable compiled highlighting grammar for one language.
///
/// Built by [`load`](crate::load). Contexts, attributes and keyword lists of
/// included grammars are spliced in under `Name##Language` qualified names.
#[derive(Debug)]
pub struct Grammar {
	pub(crate) meta: GrammarMeta,
	pub(crate) contexts: Vec<Context>,
	pub(crate) context_index: FxHashMap<Box<str>, ContextId>,
	pub(crate) default_context: ContextId,
	pub(crate) attributes: Vec<Attribute>,
	pub(crate) attribute_index: FxHashMap<Box<str>, AttributeId>,
	pub(crate) keyword_lists: Vec<KeywordList>,
	pub(crate) deliminators: Vec<Deliminators>,
	pub(crate) comments: CommentTokens,
	pub(crate) regex_cache: RegexCache,
}

impl Grammar {
	pub fn meta(&self) -> &GrammarMeta {
		&self.meta
	}

	/// Language name.
	pub fn name(&self) -> &str {
		&self.meta.name
	}

	/// The context every document starts in.
	#[inline]
	pub fn default_context(&self) -> ContextId {
		self.default_context
	}

	#[inline]
	pub fn context(&self, id: ContextId) -> &Context {
		&self.contexts[id.idx()]
	}

	pub fn context_by_name(&self, name: &str) -> Option<ContextId> {
		self.context_index.get(name).copied()
	}

	pub fn contexts(&self) -> impl Iterator<Item = (ContextId, &Context)> {
		self.contexts.iter().enumerate().map(|(idx, ctx)| (ContextId(idx as u32), ctx))
	}

	#[inline]
	pub fn attribute(&self, id: AttributeId) -> &Attribute {
		&self.attributes[id.idx()]
	}

	pub fn attribute_by_name(&self, name: &str) -> Option<AttributeId> {
		self.attribute_index.get(name).copied()
	}

	pub fn attributes(&self) -> impl Iterator<Item = (AttributeId, &Attribute)> {
		self.attributes.iter().enumerate().map(|(idx, attr)| (AttributeId(idx as u32), attr))
	}

	#[inline]
	pub fn keyword_list(&self, id: KeywordListId) -> &KeywordList {
		&self.keyword_lists[id.idx()]
	}

	/// Deliminators in effect for rules of `context`.
	#[inline]
	pub fn deliminators(&self, context: ContextId) -> &Deliminators {
		&self.deliminators[self.context(context).deliminators as usize]
	}

	pub fn comments(&self) -> &CommentTokens {
		&self.comments
	}

	/// Compiles (or fetches) the regex for a substituted dynamic pattern.
	///
	/// Returns `None` when the substituted pattern is not a valid regex; the
	/// caller treats that as "no match".
	pub fn dynamic_regex(&self, source: &str, insensitive: bool) -> Option<Arc<Regex>> {
		self.regex_cache.get(source, insensitive)
	}
}
