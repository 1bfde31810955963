use std::sync::Arc;
use std::time::Instant;

use synline_engine::{LineState, ParseLimits, ParsedLine, parse_block_with};
use synline_grammar::Grammar;

use crate::budget::{ReconcileBudget, ReconcileReport, ReconcileStatus};

#[derive(Debug, Clone)]
struct LineSlot {
	text: String,
	/// Last parse of this line. Kept while dirty so the new end state can be
	/// compared against the old one.
	parsed: Option<ParsedLine>,
	/// The line must be parsed again: its text changed, or the state it
	/// starts in may have.
	dirty: bool,
}

impl LineSlot {
	fn new(text: String) -> Self {
		Self {
			text,
			parsed: None,
			dirty: true,
		}
	}
}

/// A document's lines together with their cached highlighting.
///
/// Lines are stored without terminators. A document always has at least one
/// line, as in an editor buffer.
#[derive(Debug, Clone)]
pub struct Document {
	grammar: Option<Arc<Grammar>>,
	limits: ParseLimits,
	lines: Vec<LineSlot>,
	dirty_count: usize,
	/// First dirty line. Every line before it holds its final parse.
	resume: Option<usize>,
}

impl Document {
	/// An empty document (one empty line).
	pub fn new(grammar: Option<Arc<Grammar>>) -> Self {
		let mut doc = Self {
			grammar,
			limits: ParseLimits::default(),
			lines: Vec::new(),
			dirty_count: 0,
			resume: None,
		};
		doc.set_text("");
		doc
	}

	pub fn with_text(grammar: Option<Arc<Grammar>>, text: &str) -> Self {
		let mut doc = Self::new(grammar);
		doc.set_text(text);
		doc
	}

	/// Replaces the whole content. Lines split on `\n`; a trailing `\r` is
	/// dropped from each.
	pub fn set_text(&mut self, text: &str) {
		self.lines = split_lines(text).map(LineSlot::new).collect();
		self.dirty_count = self.lines.len();
		self.resume = Some(0);
	}

	/// Switches grammar; every line is parsed again.
	pub fn set_grammar(&mut self, grammar: Arc<Grammar>) {
		self.grammar = Some(grammar);
		self.invalidate_all();
	}

	/// Turns highlighting off. Predicates report their defaults.
	pub fn clear_grammar(&mut self) {
		self.grammar = None;
		self.invalidate_all();
	}

	pub fn grammar(&self) -> Option<&Arc<Grammar>> {
		self.grammar.as_ref()
	}

	pub fn set_limits(&mut self, limits: ParseLimits) {
		self.limits = limits;
		self.invalidate_all();
	}

	pub fn line_count(&self) -> usize {
		self.lines.len()
	}

	pub fn line(&self, line: usize) -> Option<&str> {
		self.lines.get(line).map(|slot| slot.text.as_str())
	}

	pub fn lines(&self) -> impl Iterator<Item = &str> {
		self.lines.iter().map(|slot| slot.text.as_str())
	}

	/// The parse of `line`, if it is final.
	///
	/// `None` for lines at or after the resume point of an unfinished
	/// reconciliation, and for every line when no grammar is set.
	pub fn parsed(&self, line: usize) -> Option<&ParsedLine> {
		if self.resume.is_some_and(|resume| line >= resume) {
			return None;
		}
		self.lines.get(line)?.parsed.as_ref()
	}

	/// True while edits remain that [`reconcile`](Self::reconcile) has not
	/// worked off.
	pub fn is_in_progress(&self) -> bool {
		self.grammar.is_some() && self.resume.is_some()
	}

	/// Replaces `removed` lines starting at `start` with `inserted`.
	///
	/// `start` is clamped to the line count and `removed` to the lines
	/// available. Removing every line leaves one empty line.
	pub fn replace_lines<I, S>(&mut self, start: usize, removed: usize, inserted: I)
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let start = start.min(self.lines.len());
		let end = start.saturating_add(removed).min(self.lines.len());
		let slots: Vec<LineSlot> = inserted.into_iter().map(|s| LineSlot::new(s.into())).collect();
		let added = slots.len();

		let dropped_dirty = self.lines[start..end].iter().filter(|slot| slot.dirty).count();
		self.lines.splice(start..end, slots);
		self.dirty_count = self.dirty_count - dropped_dirty + added;

		if self.lines.is_empty() {
			self.lines.push(LineSlot::new(String::new()));
			self.dirty_count += 1;
		}

		// The line after the edit now starts from a different predecessor.
		if added == 0
			&& let Some(next) = self.lines.get_mut(start)
		{
			mark_dirty(next, &mut self.dirty_count);
		}
		self.touch(start.min(self.lines.len() - 1));
	}

	/// Replaces the text of one line. Out-of-range lines are ignored.
	pub fn set_line(&mut self, line: usize, text: impl Into<String>) {
		let Some(slot) = self.lines.get_mut(line) else {
			return;
		};
		slot.text = text.into();
		mark_dirty(slot, &mut self.dirty_count);
		self.touch(line);
	}

	/// Inserts lines before `at` (clamped to the line count).
	pub fn insert_lines<I, S>(&mut self, at: usize, lines: I)
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.replace_lines(at, 0, lines);
	}

	pub fn remove_lines(&mut self, start: usize, count: usize) {
		self.replace_lines(start, count, std::iter::empty::<String>());
	}

	/// Re-parses dirty lines in order until the budget runs out or the
	/// document has reconverged.
	pub fn reconcile(&mut self, budget: ReconcileBudget) -> ReconcileReport {
		let (Some(grammar), Some(start)) = (self.grammar.clone(), self.resume) else {
			return ReconcileReport::idle();
		};

		let started = Instant::now();
		let mut parsed = 0;
		let mut line = start;
		let mut state = self.incoming_state(&grammar, line);

		while line < self.lines.len() {
			if budget.exhausted(parsed, started) {
				self.resume = Some(line);
				tracing::trace!(resumed_at = start, parsed, next = line, "reconcile slice exhausted");
				return ReconcileReport {
					status: ReconcileStatus::InProgress,
					lines_parsed: parsed,
					resumed_at: Some(start),
				};
			}

			let result = parse_block_with(&grammar, &self.lines[line].text, &state, &self.limits);
			parsed += 1;

			let slot = &mut self.lines[line];
			let converged = slot.parsed.as_ref().is_some_and(|old| old.state == result.state);
			if slot.dirty {
				slot.dirty = false;
				self.dirty_count -= 1;
			}
			state = result.state.clone();
			slot.parsed = Some(result);
			line += 1;

			if converged {
				// Everything up to the next dirty line already starts from the
				// state it was parsed with.
				match self.next_dirty(line) {
					Some(next) => {
						line = next;
						state = self.incoming_state(&grammar, line);
					}
					None => break,
				}
			} else if let Some(next) = self.lines.get_mut(line) {
				mark_dirty(next, &mut self.dirty_count);
			}
		}

		self.resume = None;
		tracing::trace!(resumed_at = start, parsed, "reconciled");
		ReconcileReport {
			status: ReconcileStatus::Done,
			lines_parsed: parsed,
			resumed_at: Some(start),
		}
	}

	/// Reconciles without a budget.
	pub fn reconcile_all(&mut self) -> ReconcileReport {
		self.reconcile(ReconcileBudget::unbounded())
	}

	pub fn is_code(&self, line: usize, column: usize) -> bool {
		synline_engine::is_code(self.parsed(line), column)
	}

	pub fn is_comment(&self, line: usize, column: usize) -> bool {
		synline_engine::is_comment(self.parsed(line), column)
	}

	pub fn is_block_comment(&self, line: usize, column: usize) -> bool {
		synline_engine::is_block_comment(self.parsed(line), column)
	}

	pub fn is_here_doc(&self, line: usize, column: usize) -> bool {
		synline_engine::is_here_doc(self.parsed(line), column)
	}

	pub fn is_string(&self, line: usize, column: usize) -> bool {
		synline_engine::is_string(self.parsed(line), column)
	}

	fn invalidate_all(&mut self) {
		for slot in &mut self.lines {
			slot.parsed = None;
			slot.dirty = true;
		}
		self.dirty_count = self.lines.len();
		self.resume = Some(0);
	}

	fn touch(&mut self, line: usize) {
		self.resume = Some(self.resume.map_or(line, |resume| resume.min(line)));
	}

	fn next_dirty(&self, from: usize) -> Option<usize> {
		if self.dirty_count == 0 {
			return None;
		}
		self.lines[from.min(self.lines.len())..]
			.iter()
			.position(|slot| slot.dirty)
			.map(|offset| from + offset)
	}

	/// State `line` starts in. Lines before the resume point are final, so the
	/// predecessor's parse is always present here.
	fn incoming_state(&self, grammar: &Grammar, line: usize) -> LineState {
		line.checked_sub(1)
			.and_then(|prev| self.lines[prev].parsed.as_ref())
			.map_or_else(|| LineState::initial(grammar), |prev| prev.state.clone())
	}
}

fn mark_dirty(slot: &mut LineSlot, dirty_count: &mut usize) {
	if !slot.dirty {
		slot.dirty = true;
		*dirty_count += 1;
	}
}

fn split_lines(text: &str) -> impl Iterator<Item = String> + '_ {
	text.split('\n').map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
}

#[cfg(test)]
mod tests;
