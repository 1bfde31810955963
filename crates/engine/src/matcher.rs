//! Rule matching at one column.

use std::borrow::Cow;
use std::sync::Arc;

use fancy_regex::Regex;
use rustc_hash::FxHashMap;
use synline_grammar::dynamic::substitute;
use synline_grammar::{Context, ContextId, Deliminators, Grammar, Pattern, Rule, RuleKind};

use crate::state::{Captures, Frame};

mod numbers;

/// A line prepared for matching: chars plus the byte offset of each.
pub(crate) struct Line<'t> {
	text: &'t str,
	chars: Vec<char>,
	/// `offsets[i]` is the byte offset of char `i`; one extra entry for the end.
	offsets: Vec<usize>,
	first_non_space: usize,
}

impl<'t> Line<'t> {
	pub(crate) fn new(text: &'t str) -> Self {
		let mut chars = Vec::with_capacity(text.len());
		let mut offsets = Vec::with_capacity(text.len() + 1);
		for (offset, ch) in text.char_indices() {
			chars.push(ch);
			offsets.push(offset);
		}
		offsets.push(text.len());
		let first_non_space = chars.iter().position(|c| !c.is_whitespace()).unwrap_or(chars.len());
		Self {
			text,
			chars,
			offsets,
			first_non_space,
		}
	}

	#[inline]
	pub(crate) fn len(&self) -> usize {
		self.chars.len()
	}

	pub(crate) fn is_empty(&self) -> bool {
		self.chars.is_empty()
	}

	fn column_of(&self, byte: usize) -> usize {
		self.offsets.partition_point(|&o| o < byte)
	}

	fn is_word_start(&self, pos: usize, delims: &Deliminators) -> bool {
		pos == 0 || delims.contains(self.chars[pos - 1])
	}

	fn is_word_end(&self, pos: usize, delims: &Deliminators) -> bool {
		self.chars.get(pos).is_none_or(|&c| delims.contains(c))
	}

	/// End column if `pattern` occurs at `pos`.
	fn literal_at(&self, pos: usize, pattern: &str, insensitive: bool) -> Option<usize> {
		let mut end = pos;
		for expected in pattern.chars() {
			let actual = *self.chars.get(end)?;
			if !chars_eq(actual, expected, insensitive) {
				return None;
			}
			end += 1;
		}
		(end > pos).then_some(end)
	}

	/// Column just past the first occurrence of `pattern` at or after `from`.
	fn find_literal(&self, from: usize, pattern: &str, insensitive: bool) -> Option<usize> {
		let needle: Vec<char> = pattern.chars().collect();
		if needle.is_empty() || from > self.len() {
			return None;
		}
		self.chars[from..]
			.windows(needle.len())
			.position(|w| w.iter().zip(&needle).all(|(&a, &b)| chars_eq(a, b, insensitive)))
			.map(|i| from + i + needle.len())
	}
}

fn chars_eq(a: char, b: char, insensitive: bool) -> bool {
	a == b || (insensitive && a.to_lowercase().eq(b.to_lowercase()))
}

/// Outcome of a successful rule match.
#[derive(Debug)]
pub(crate) struct Hit {
	/// Column just past the match, children included.
	pub end: usize,
	/// Captures to bind on pushed dynamic contexts.
	pub bind: Option<Captures>,
	/// Set when a range ran off the end of the line.
	pub continuation: Option<ContextId>,
	/// A `LineContinue` matched the final character.
	pub line_continue: bool,
}

impl Hit {
	fn at(end: usize) -> Self {
		Self {
			end,
			bind: None,
			continuation: None,
			line_continue: false,
		}
	}
}

/// Most recent forward search of one regex on the current line.
struct Searched {
	/// Held so the memo key (the regex address) cannot be reused.
	_regex: Arc<Regex>,
	from: usize,
	found: Option<usize>,
}

/// Matches rules against one line.
///
/// Regex rules search forward over the whole line (so look-behind and `^`
/// see the real line start). The memo records where each regex next matches,
/// letting later columns before that point fail without searching again.
pub(crate) struct Matcher<'g> {
	grammar: &'g Grammar,
	searches: FxHashMap<usize, Searched>,
}

impl<'g> Matcher<'g> {
	pub(crate) fn new(grammar: &'g Grammar) -> Self {
		Self {
			grammar,
			searches: FxHashMap::default(),
		}
	}

	/// First rule of `context` that matches at `pos`, in declaration order.
	pub(crate) fn first_match<'c>(
		&mut self,
		context: &'c Context,
		delims: &Deliminators,
		line: &Line<'_>,
		pos: usize,
		frame: &Frame,
	) -> Option<(&'c Rule, Hit)> {
		context
			.rules
			.iter()
			.find_map(|rule| self.match_rule(rule, delims, line, pos, frame).map(|hit| (rule, hit)))
	}

	fn match_rule(&mut self, rule: &Rule, delims: &Deliminators, line: &Line<'_>, pos: usize, frame: &Frame) -> Option<Hit> {
		if rule.first_non_space && pos != line.first_non_space {
			return None;
		}
		if rule.column.is_some_and(|col| col != pos) {
			return None;
		}

		let chars = line.chars.as_slice();
		let current = *chars.get(pos)?;
		let mut hit = match &rule.kind {
			RuleKind::DetectChar { ch, insensitive } => chars_eq(current, *ch, *insensitive).then(|| Hit::at(pos + 1))?,
			RuleKind::DynamicChar { capture } => {
				let bound = frame.captures().get(*capture)?.chars().next()?;
				(current == bound).then(|| Hit::at(pos + 1))?
			}
			RuleKind::Detect2Chars { chars: [a, b], insensitive } => {
				let next = *chars.get(pos + 1)?;
				(chars_eq(current, *a, *insensitive) && chars_eq(next, *b, *insensitive)).then(|| Hit::at(pos + 2))?
			}
			RuleKind::AnyChar { set } => set.contains(current).then(|| Hit::at(pos + 1))?,
			RuleKind::StringDetect { text, insensitive } => {
				let text = bound_text(rule, text, frame);
				Hit::at(line.literal_at(pos, &text, *insensitive)?)
			}
			RuleKind::WordDetect { text, insensitive } => {
				if !line.is_word_start(pos, delims) {
					return None;
				}
				let text = bound_text(rule, text, frame);
				let end = line.literal_at(pos, &text, *insensitive)?;
				line.is_word_end(end, delims).then(|| Hit::at(end))?
			}
			RuleKind::Keyword { list } => {
				if !line.is_word_start(pos, delims) {
					return None;
				}
				let end = chars[pos..].iter().position(|&c| delims.contains(c)).map_or(line.len(), |i| pos + i);
				if end == pos {
					return None;
				}
				let word = &line.text[line.offsets[pos]..line.offsets[end]];
				self.grammar.keyword_list(*list).contains(word).then(|| Hit::at(end))?
			}
			RuleKind::RegExpr(pattern) => self.regex(rule, pattern, line, pos, frame)?,
			RuleKind::Int => word_start(line, pos, delims).and_then(|_| numbers::int(chars, pos)).map(Hit::at)?,
			RuleKind::Float => word_start(line, pos, delims).and_then(|_| numbers::float(chars, pos)).map(Hit::at)?,
			RuleKind::HlCOct => word_start(line, pos, delims).and_then(|_| numbers::c_octal(chars, pos)).map(Hit::at)?,
			RuleKind::HlCHex => word_start(line, pos, delims).and_then(|_| numbers::c_hex(chars, pos)).map(Hit::at)?,
			RuleKind::HlCStringChar => Hit::at(numbers::c_string_char(chars, pos)?),
			RuleKind::HlCChar => Hit::at(numbers::c_char(chars, pos)?),
			RuleKind::RangeDetect {
				begin,
				end,
				continuation,
				insensitive,
			} => {
				let begin = bound_text(rule, begin, frame);
				let end_text = bound_text(rule, end, frame);
				let open = line.literal_at(pos, &begin, *insensitive)?;
				match line.find_literal(open, &end_text, *insensitive) {
					Some(close) => Hit::at(close),
					None => Hit {
						end: line.len(),
						bind: frame.shared_captures().cloned(),
						continuation: Some(*continuation),
						line_continue: false,
					},
				}
			}
			RuleKind::LineContinue { ch } => {
				if current != *ch || pos + 1 != line.len() {
					return None;
				}
				Hit {
					line_continue: true,
					..Hit::at(pos + 1)
				}
			}
			RuleKind::DetectSpaces => {
				let run = chars[pos..].iter().take_while(|c| c.is_whitespace()).count();
				(run > 0).then(|| Hit::at(pos + run))?
			}
			RuleKind::DetectIdentifier => {
				if !(current.is_ascii_alphabetic() || current == '_') {
					return None;
				}
				let run = chars[pos..]
					.iter()
					.take_while(|c| c.is_ascii_alphanumeric() || **c == '_')
					.count();
				Hit::at(pos + run)
			}
		};

		if hit.continuation.is_none() {
			for child in &rule.children {
				if hit.end >= line.len() {
					break;
				}
				if let Some(extended) = self.match_rule(child, delims, line, hit.end, frame) {
					hit.end = extended.end;
					break;
				}
			}
		}
		Some(hit)
	}

	fn regex(&mut self, rule: &Rule, pattern: &Pattern, line: &Line<'_>, pos: usize, frame: &Frame) -> Option<Hit> {
		let regex = match pattern {
			Pattern::Static { regex, .. } => regex.clone(),
			Pattern::Dynamic { source, insensitive } => {
				let bound = substitute(source, frame.captures(), true);
				self.grammar.dynamic_regex(&bound, *insensitive)?
			}
		};

		let byte = line.offsets[pos];
		let key = Arc::as_ptr(&regex) as usize;
		if let Some(prev) = self.searches.get(&key)
			&& prev.from <= byte
		{
			match prev.found {
				None => return None,
				Some(start) if start > byte => return None,
				_ => {}
			}
		}

		let captures = match regex.captures_from_pos(line.text, byte) {
			Ok(captures) => captures,
			Err(error) => {
				tracing::trace!(pattern = pattern.source(), %error, "regex search failed, treated as no match");
				None
			}
		};
		let whole = captures.as_ref().and_then(|c| c.get(0));
		self.searches.insert(
			key,
			Searched {
				_regex: regex.clone(),
				from: byte,
				found: whole.map(|m| m.start()),
			},
		);

		let whole = whole?;
		if whole.start() != byte {
			return None;
		}

		let bind = self.pushes_dynamic(rule).then(|| {
			captures
				.iter()
				.flat_map(|c| c.iter())
				.map(|m| m.map_or("", |m| m.as_str()).into())
				.collect::<Captures>()
		});
		Some(Hit {
			bind,
			..Hit::at(line.column_of(whole.end()))
		})
	}

	fn pushes_dynamic(&self, rule: &Rule) -> bool {
		rule.switch.push.iter().any(|&c| self.grammar.context(c).is_dynamic())
	}
}

fn word_start(line: &Line<'_>, pos: usize, delims: &Deliminators) -> Option<()> {
	line.is_word_start(pos, delims).then_some(())
}

fn bound_text<'a>(rule: &Rule, text: &'a str, frame: &Frame) -> Cow<'a, str> {
	if rule.dynamic { substitute(text, frame.captures(), false) } else { Cow::Borrowed(text) }
}

#[cfg(test)]
mod tests;
