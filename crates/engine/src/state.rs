//! The context stack handed from one line to the next.

use std::sync::Arc;

use smallvec::SmallVec;
use synline_grammar::{ContextId, ContextSwitch, Grammar};

/// Texts bound by the regex match that pushed a dynamic context.
///
/// Index 0 is the whole match, `%N` reads index N.
pub type Captures = Arc<[Box<str>]>;

/// One context-stack entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Frame {
	context: ContextId,
	captures: Option<Captures>,
}

impl Frame {
	pub fn new(context: ContextId) -> Self {
		Self { context, captures: None }
	}

	pub(crate) fn with_captures(context: ContextId, captures: Captures) -> Self {
		Self {
			context,
			captures: Some(captures),
		}
	}

	#[inline]
	pub fn context(&self) -> ContextId {
		self.context
	}

	/// Bound captures, empty for frames of non-dynamic contexts.
	#[inline]
	pub fn captures(&self) -> &[Box<str>] {
		self.captures.as_deref().unwrap_or(&[])
	}

	#[inline]
	pub fn has_captures(&self) -> bool {
		self.captures.is_some()
	}

	pub(crate) fn shared_captures(&self) -> Option<&Captures> {
		self.captures.as_ref()
	}
}

/// Snapshot of the context stack at a line boundary.
///
/// Equality is structural (depth, context identities and bound captures) and
/// is what incremental reparsing uses to detect reconvergence. Cloning copies
/// a short inline vector and bumps reference counts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LineState {
	frames: SmallVec<[Frame; 4]>,
}

impl LineState {
	/// State of the first line: only the grammar's default context.
	pub fn initial(grammar: &Grammar) -> Self {
		let mut frames = SmallVec::new();
		frames.push(Frame::new(grammar.default_context()));
		Self { frames }
	}

	/// Number of frames. Always at least 1.
	#[inline]
	pub fn depth(&self) -> usize {
		self.frames.len()
	}

	/// Frames from bottom to top.
	pub fn frames(&self) -> &[Frame] {
		&self.frames
	}

	/// The frame whose context is active.
	#[inline]
	pub fn top(&self) -> &Frame {
		&self.frames[self.frames.len() - 1]
	}

	/// Applies a context switch.
	///
	/// Pops are clamped so the bottom frame survives. Pushes past `max_depth`
	/// are dropped. `bind` is stored on pushed frames whose context uses
	/// placeholders and discarded otherwise.
	pub(crate) fn apply(&mut self, grammar: &Grammar, switch: &ContextSwitch, bind: Option<&Captures>, max_depth: usize) {
		let requested = switch.pop as usize;
		let keep = self.frames.len().saturating_sub(requested).max(1);
		if self.frames.len() - keep < requested {
			tracing::trace!(requested, depth = self.frames.len(), "pop clamped at the bottom frame");
		}
		self.frames.truncate(keep);

		for &context in &switch.push {
			if self.frames.len() >= max_depth {
				tracing::trace!(max_depth, context = %grammar.context(context).name, "context stack full, push dropped");
				break;
			}
			let frame = match bind {
				Some(captures) if grammar.context(context).is_dynamic() => Frame::with_captures(context, captures.clone()),
				_ => Frame::new(context),
			};
			self.frames.push(frame);
		}
	}
}
