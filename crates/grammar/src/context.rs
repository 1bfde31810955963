//! Contexts and context-stack actions.

use smallvec::SmallVec;

use crate::attribute::AttributeId;
use crate::rule::Rule;

/// Index of a context within its [`Grammar`](crate::Grammar).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextId(pub(crate) u32);

impl ContextId {
	#[inline]
	pub fn idx(self) -> usize {
		self.0 as usize
	}
}

/// What a match (or a line end, or a fallthrough) does to the context stack.
///
/// Pops are applied first, then pushes in order. Pops never empty the stack:
/// the bottom frame absorbs any excess.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ContextSwitch {
	pub pop: u16,
	pub push: SmallVec<[ContextId; 1]>,
}

impl ContextSwitch {
	/// Leaves the stack unchanged.
	pub fn stay() -> Self {
		Self::default()
	}

	pub fn pop(count: u16) -> Self {
		Self {
			pop: count,
			push: SmallVec::new(),
		}
	}

	pub fn push(context: ContextId) -> Self {
		let mut push = SmallVec::new();
		push.push(context);
		Self { pop: 0, push }
	}

	#[inline]
	pub fn is_stay(&self) -> bool {
		self.pop == 0 && self.push.is_empty()
	}

	/// Returns a switch that first pops `extra` more levels, then performs
	/// this switch.
	pub fn after_pops(&self, extra: u16) -> Self {
		Self {
			pop: self.pop.saturating_add(extra),
			push: self.push.clone(),
		}
	}
}

/// A named parsing mode with an ordered rule list.
#[derive(Debug)]
pub struct Context {
	/// Qualified name (`Name` or `Name##Language` for spliced contexts).
	pub name: Box<str>,
	/// Attribute applied to characters no rule matches.
	pub attribute: AttributeId,
	/// Rules in declaration order. First match wins.
	pub rules: Vec<Rule>,
	/// Applied when a line ends.
	pub line_end: ContextSwitch,
	/// Applied instead of `line_end` for empty lines, when set.
	pub line_empty: Option<ContextSwitch>,
	/// When set, an unmatched position switches context without consuming.
	pub fallthrough: Option<ContextSwitch>,
	/// Index into the grammar's deliminator table.
	pub(crate) deliminators: u32,
	/// Highest `%N` placeholder used by this context's dynamic rules.
	pub(crate) max_placeholder: usize,
}

impl Context {
	/// True if any rule needs captures bound when this context is pushed.
	#[inline]
	pub fn is_dynamic(&self) -> bool {
		self.max_placeholder > 0
	}

	/// Highest `%N` placeholder referenced by this context's dynamic rules.
	#[inline]
	pub fn max_placeholder(&self) -> usize {
		self.max_placeholder
	}

	/// True if the context survives a line end untouched.
	#[inline]
	pub fn persists_across_lines(&self) -> bool {
		self.line_end.is_stay()
	}
}
