//! Parse output and the classification predicates consumers query.

use synline_grammar::AttributeId;

use crate::state::LineState;

/// Coarse classification of a span, for indenters, completers and bracket
/// matchers that only need to know whether a position is code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextKind {
	#[default]
	Code,
	String,
	/// A comment that ends with its line.
	Comment,
	/// A comment whose context survives line ends (`/* ... */`).
	BlockComment,
	/// Text inside a context bound from captures (`<<EOF ... EOF`).
	HereDoc,
}

impl TextKind {
	#[inline]
	pub fn is_code(self) -> bool {
		self == Self::Code
	}

	/// Comments of any kind, here-documents included.
	#[inline]
	pub fn is_comment(self) -> bool {
		matches!(self, Self::Comment | Self::BlockComment | Self::HereDoc)
	}

	#[inline]
	pub fn is_block_comment(self) -> bool {
		self == Self::BlockComment
	}

	#[inline]
	pub fn is_here_doc(self) -> bool {
		self == Self::HereDoc
	}

	#[inline]
	pub fn is_string(self) -> bool {
		self == Self::String
	}
}

/// A classified run of characters. Columns count Unicode scalar values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span {
	pub start: usize,
	pub len: usize,
	pub attribute: AttributeId,
	pub kind: TextKind,
}

impl Span {
	#[inline]
	pub fn end(&self) -> usize {
		self.start + self.len
	}

	#[inline]
	pub fn contains(&self, column: usize) -> bool {
		self.start <= column && column < self.end()
	}
}

/// Spans of one line and the state the next line starts in.
///
/// Spans are contiguous, non-overlapping and cover the whole line. Unmatched
/// characters are reported one span each; use [`runs`](Self::runs) for
/// painting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine {
	pub spans: Vec<Span>,
	pub state: LineState,
}

impl ParsedLine {
	/// Line length in characters.
	pub fn len(&self) -> usize {
		self.spans.last().map_or(0, Span::end)
	}

	pub fn is_empty(&self) -> bool {
		self.spans.is_empty()
	}

	pub fn span_at(&self, column: usize) -> Option<&Span> {
		let idx = self.spans.partition_point(|s| s.end() <= column);
		self.spans.get(idx).filter(|s| s.contains(column))
	}

	/// Kind at `column`; past the end of the line this is the kind of the
	/// last span, so a cursor at end of line inside a comment is still in it.
	pub fn kind_at(&self, column: usize) -> TextKind {
		match self.span_at(column) {
			Some(span) => span.kind,
			None => self.spans.last().map(|s| s.kind).unwrap_or_default(),
		}
	}

	/// Adjacent spans with equal attribute and kind merged.
	pub fn runs(&self) -> Vec<Span> {
		let mut out: Vec<Span> = Vec::with_capacity(self.spans.len());
		for span in &self.spans {
			match out.last_mut() {
				Some(last) if last.attribute == span.attribute && last.kind == span.kind && last.end() == span.start => {
					last.len += span.len;
				}
				_ => out.push(*span),
			}
		}
		out
	}

	pub fn is_code(&self, column: usize) -> bool {
		self.kind_at(column).is_code()
	}

	pub fn is_comment(&self, column: usize) -> bool {
		self.kind_at(column).is_comment()
	}

	pub fn is_block_comment(&self, column: usize) -> bool {
		self.kind_at(column).is_block_comment()
	}

	pub fn is_here_doc(&self, column: usize) -> bool {
		self.kind_at(column).is_here_doc()
	}

	pub fn is_string(&self, column: usize) -> bool {
		self.kind_at(column).is_string()
	}
}

// Without a grammar, or before a line is parsed, everything is code.

pub fn is_code(line: Option<&ParsedLine>, column: usize) -> bool {
	line.is_none_or(|l| l.is_code(column))
}

pub fn is_comment(line: Option<&ParsedLine>, column: usize) -> bool {
	line.is_some_and(|l| l.is_comment(column))
}

pub fn is_block_comment(line: Option<&ParsedLine>, column: usize) -> bool {
	line.is_some_and(|l| l.is_block_comment(column))
}

pub fn is_here_doc(line: Option<&ParsedLine>, column: usize) -> bool {
	line.is_some_and(|l| l.is_here_doc(column))
}

pub fn is_string(line: Option<&ParsedLine>, column: usize) -> bool {
	line.is_some_and(|l| l.is_string(column))
}
