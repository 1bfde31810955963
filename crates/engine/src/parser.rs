//! The block parser: one line in, spans and the next line's state out.

use std::borrow::Cow;

use synline_grammar::{AttributeId, ContextSwitch, Grammar};

use crate::matcher::{Line, Matcher};
use crate::span::{ParsedLine, Span, TextKind};
use crate::state::{Captures, Frame, LineState};

/// Bounds that keep parsing total for pathological grammars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseLimits {
	/// Pushes beyond this stack depth are dropped.
	pub max_depth: usize,
	/// Consecutive non-consuming actions allowed at one column before the
	/// parser forces a one-character advance.
	pub max_zero_width_steps: usize,
}

impl Default for ParseLimits {
	fn default() -> Self {
		Self {
			max_depth: 256,
			max_zero_width_steps: 64,
		}
	}
}

/// Parses `text` starting from `previous` with default [`ParseLimits`].
pub fn parse_block(grammar: &Grammar, text: &str, previous: &LineState) -> ParsedLine {
	parse_block_with(grammar, text, previous, &ParseLimits::default())
}

/// Parses one line (without its terminator).
///
/// `previous` must be [`LineState::initial`] or a state produced by an
/// earlier parse with the same grammar.
pub fn parse_block_with(grammar: &Grammar, text: &str, previous: &LineState, limits: &ParseLimits) -> ParsedLine {
	let line = Line::new(text);
	let mut parser = BlockParser {
		grammar,
		limits,
		state: previous.clone(),
		spans: Vec::new(),
		zero_width_steps: 0,
	};
	let mut matcher = Matcher::new(grammar);
	let mut continued = false;

	let mut pos = 0;
	while pos < line.len() {
		let frame = parser.state.top().clone();
		let context = grammar.context(frame.context());
		let delims = grammar.deliminators(frame.context());

		let Some((rule, hit)) = matcher.first_match(context, delims, &line, pos, &frame) else {
			match &context.fallthrough {
				Some(switch) => {
					if !parser.zero_width(switch, None) {
						parser.unmatched(pos, &frame);
						pos += 1;
					}
				}
				None => {
					parser.unmatched(pos, &frame);
					pos += 1;
				}
			}
			continue;
		};

		let switch = match hit.continuation {
			Some(continuation) => Cow::Owned(ContextSwitch::push(continuation)),
			None => Cow::Borrowed(&rule.switch),
		};

		// A consuming match of length zero (a dynamic string bound to "", a
		// zero-width regex assertion) behaves like a look-ahead.
		if rule.look_ahead || hit.end == pos {
			if !parser.zero_width(&switch, hit.bind.as_ref()) {
				parser.unmatched(pos, &frame);
				pos += 1;
			}
			continue;
		}

		parser.zero_width_steps = 0;
		parser.state.apply(grammar, &switch, hit.bind.as_ref(), limits.max_depth);
		let owner = if switch.push.is_empty() { &frame } else { parser.state.top() };
		let kind = text_kind(grammar, rule.attribute, owner);
		parser.emit(pos, hit.end - pos, rule.attribute, kind);
		continued = hit.line_continue;
		pos = hit.end;
	}

	if !continued {
		parser.line_end(line.is_empty());
	}

	ParsedLine {
		spans: parser.spans,
		state: parser.state,
	}
}

struct BlockParser<'a> {
	grammar: &'a Grammar,
	limits: &'a ParseLimits,
	state: LineState,
	spans: Vec<Span>,
	zero_width_steps: usize,
}

impl BlockParser<'_> {
	fn emit(&mut self, start: usize, len: usize, attribute: AttributeId, kind: TextKind) {
		self.spans.push(Span {
			start,
			len,
			attribute,
			kind,
		});
	}

	/// One character in the current context's own attribute.
	fn unmatched(&mut self, pos: usize, frame: &Frame) {
		self.zero_width_steps = 0;
		let attribute = self.grammar.context(frame.context()).attribute;
		let kind = text_kind(self.grammar, attribute, frame);
		self.emit(pos, 1, attribute, kind);
	}

	/// Applies a switch without consuming. Returns false when the parser must
	/// advance a character instead: the stack did not change, or too many
	/// non-consuming steps happened at this column.
	fn zero_width(&mut self, switch: &ContextSwitch, bind: Option<&Captures>) -> bool {
		if self.zero_width_steps >= self.limits.max_zero_width_steps {
			tracing::trace!(steps = self.zero_width_steps, "zero-width step limit reached, forcing advance");
			return false;
		}
		let before = self.state.clone();
		self.state.apply(self.grammar, switch, bind, self.limits.max_depth);
		if self.state == before {
			tracing::trace!(context = %self.grammar.context(before.top().context()).name, "zero-width match left the stack unchanged");
			return false;
		}
		self.zero_width_steps += 1;
		true
	}

	fn line_end(&mut self, empty: bool) {
		if empty {
			let context = self.grammar.context(self.state.top().context());
			if let Some(switch) = &context.line_empty {
				self.state.apply(self.grammar, switch, None, self.limits.max_depth);
				return;
			}
		}

		for _ in 0..self.limits.max_depth {
			let context = self.grammar.context(self.state.top().context());
			if context.line_end.is_stay() {
				break;
			}
			let before = self.state.clone();
			self.state.apply(self.grammar, &context.line_end, None, self.limits.max_depth);
			if self.state == before {
				break;
			}
		}
	}
}

/// Classifies a span from its attribute and the frame it belongs to.
fn text_kind(grammar: &Grammar, attribute: AttributeId, frame: &Frame) -> TextKind {
	if frame.has_captures() {
		return TextKind::HereDoc;
	}
	let class = grammar.attribute(attribute).format;
	if class.is_comment() {
		let context = grammar.context(frame.context());
		if context.persists_across_lines() && grammar.attribute(context.attribute).format.is_comment() {
			TextKind::BlockComment
		} else {
			TextKind::Comment
		}
	} else if class.is_string() {
		TextKind::String
	} else {
		TextKind::Code
	}
}
