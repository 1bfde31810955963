//! Rules: the matchable units inside a context.

use std::sync::Arc;

use fancy_regex::Regex;

use crate::attribute::AttributeId;
use crate::context::{ContextId, ContextSwitch};
use crate::keywords::KeywordListId;

/// One matchable pattern plus the attribute and context action it triggers.
#[derive(Debug)]
pub struct Rule {
	pub kind: RuleKind,
	/// Attribute applied to the matched text.
	pub attribute: AttributeId,
	/// Stack action executed on match.
	pub switch: ContextSwitch,
	/// Match without consuming or emitting a span.
	pub look_ahead: bool,
	/// Only match at the first non-whitespace character of the line.
	pub first_non_space: bool,
	/// Only match at this character column.
	pub column: Option<usize>,
	/// `%1`..`%9` in the rule's strings are bound from the current frame.
	pub dynamic: bool,
	/// Tried once at the end of this rule's match; the first hit extends it.
	pub children: Vec<Rule>,
}

/// The fixed set of rule kinds understood by the engine.
#[derive(Debug)]
pub enum RuleKind {
	/// A single character.
	DetectChar { ch: char, insensitive: bool },
	/// The first character of capture `capture` of the current frame.
	DynamicChar { capture: usize },
	/// Two consecutive characters.
	Detect2Chars { chars: [char; 2], insensitive: bool },
	/// Any single character of a set.
	AnyChar { set: CharSet },
	/// A literal string.
	StringDetect { text: Box<str>, insensitive: bool },
	/// A literal string bounded by deliminators on both sides.
	WordDetect { text: Box<str>, insensitive: bool },
	/// An identifier run that is a member of a keyword list.
	Keyword { list: KeywordListId },
	/// A regular expression anchored at the current column.
	RegExpr(Pattern),
	/// Decimal integer.
	Int,
	/// Floating-point literal with optional exponent.
	Float,
	/// C-style octal literal (`0` followed by octal digits).
	HlCOct,
	/// C-style hexadecimal literal (`0x...`).
	HlCHex,
	/// C-style escape sequence inside a string.
	HlCStringChar,
	/// C-style character literal.
	HlCChar,
	/// A start delimiter followed, somewhere later, by an end delimiter.
	///
	/// When the end is missing from the line the match runs to the end of the
	/// line and `continuation` is pushed so the range persists.
	RangeDetect {
		begin: Box<str>,
		end: Box<str>,
		continuation: ContextId,
		insensitive: bool,
	},
	/// A continuation character at the very end of the line.
	LineContinue { ch: char },
	/// A run of whitespace.
	DetectSpaces,
	/// An ASCII identifier (`[A-Za-z_][A-Za-z0-9_]*`).
	DetectIdentifier,
}

impl RuleKind {
	/// Element name as written in definition files.
	pub fn element_name(&self) -> &'static str {
		match self {
			Self::DetectChar { .. } | Self::DynamicChar { .. } => "DetectChar",
			Self::Detect2Chars { .. } => "Detect2Chars",
			Self::AnyChar { .. } => "AnyChar",
			Self::StringDetect { .. } => "StringDetect",
			Self::WordDetect { .. } => "WordDetect",
			Self::Keyword { .. } => "keyword",
			Self::RegExpr(_) => "RegExpr",
			Self::Int => "Int",
			Self::Float => "Float",
			Self::HlCOct => "HlCOct",
			Self::HlCHex => "HlCHex",
			Self::HlCStringChar => "HlCStringChar",
			Self::HlCChar => "HlCChar",
			Self::RangeDetect { .. } => "RangeDetect",
			Self::LineContinue { .. } => "LineContinue",
			Self::DetectSpaces => "DetectSpaces",
			Self::DetectIdentifier => "DetectIdentifier",
		}
	}
}

/// Regular expression payload of a `RegExpr` rule.
#[derive(Debug)]
pub enum Pattern {
	/// Compiled once at load time.
	Static { source: Box<str>, regex: Arc<Regex> },
	/// Contains `%N` placeholders; compiled per binding through the grammar's
	/// dynamic regex cache.
	Dynamic { source: Box<str>, insensitive: bool },
}

impl Pattern {
	pub fn source(&self) -> &str {
		match self {
			Self::Static { source, .. } | Self::Dynamic { source, .. } => source,
		}
	}
}

/// A sorted set of characters for `AnyChar`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharSet(Box<[char]>);

impl CharSet {
	pub fn new(chars: impl IntoIterator<Item = char>) -> Self {
		let mut chars: Vec<char> = chars.into_iter().collect();
		chars.sort_unstable();
		chars.dedup();
		Self(chars.into_boxed_slice())
	}

	#[inline]
	pub fn contains(&self, ch: char) -> bool {
		self.0.binary_search(&ch).is_ok()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}
