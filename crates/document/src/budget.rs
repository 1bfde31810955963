use std::time::{Duration, Instant};

/// How much work one [`Document::reconcile`](crate::Document::reconcile)
/// call may do. At least one line is always parsed when work is pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileBudget {
	pub max_lines: Option<usize>,
	pub max_time: Option<Duration>,
}

impl Default for ReconcileBudget {
	/// An interactive slice: 256 lines or 8 ms, whichever comes first.
	fn default() -> Self {
		Self {
			max_lines: Some(256),
			max_time: Some(Duration::from_millis(8)),
		}
	}
}

impl ReconcileBudget {
	pub fn unbounded() -> Self {
		Self {
			max_lines: None,
			max_time: None,
		}
	}

	pub fn lines(max_lines: usize) -> Self {
		Self {
			max_lines: Some(max_lines),
			max_time: None,
		}
	}

	pub fn time(max_time: Duration) -> Self {
		Self {
			max_lines: None,
			max_time: Some(max_time),
		}
	}

	pub(crate) fn exhausted(&self, lines_parsed: usize, started: Instant) -> bool {
		if lines_parsed == 0 {
			return false;
		}
		self.max_lines.is_some_and(|max| lines_parsed >= max) || self.max_time.is_some_and(|max| started.elapsed() >= max)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileStatus {
	/// Every line holds its final parse.
	Done,
	/// The budget ran out; call again to continue.
	InProgress,
}

/// Outcome of one reconciliation slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileReport {
	pub status: ReconcileStatus,
	pub lines_parsed: usize,
	/// First line parsed by this slice, if any work was pending.
	pub resumed_at: Option<usize>,
}

impl ReconcileReport {
	pub(crate) fn idle() -> Self {
		Self {
			status: ReconcileStatus::Done,
			lines_parsed: 0,
			resumed_at: None,
		}
	}

	pub fn is_done(&self) -> bool {
		self.status == ReconcileStatus::Done
	}
}
