//! `synline highlight`: per-line spans as text or JSON.

use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use synline_document::{Document, ReconcileBudget};
use synline_engine::TextKind;
use synline_grammar::{FormatClass, Grammar};
use synline_registry::{DetectQuery, Registry, RegistryError};

#[derive(Debug, Serialize)]
pub struct Report {
	pub language: String,
	pub lines: Vec<LineReport>,
}

#[derive(Debug, Serialize)]
pub struct LineReport {
	pub line: usize,
	pub spans: Vec<SpanReport>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct SpanReport {
	pub start: usize,
	pub len: usize,
	pub attribute: String,
	pub format: FormatClass,
	pub kind: &'static str,
}

/// Picks the grammar for `path`: the named one if given, otherwise detection
/// by file name and then by first line.
pub fn select(
	registry: &Registry,
	path: &Path,
	first_line: Option<&str>,
	syntax: Option<&str>,
) -> Result<Arc<Grammar>, RegistryError> {
	if let Some(name) = syntax {
		return registry.by_name(name);
	}
	registry.detect(&DetectQuery {
		file_name: Some(path),
		first_line,
		..DetectQuery::default()
	})
}

/// Highlights `text` in budgeted slices, as an editor host would.
pub fn highlight(grammar: Arc<Grammar>, text: &str, budget: ReconcileBudget) -> Report {
	let language = grammar.name().to_string();
	let mut doc = Document::with_text(Some(grammar), text);

	let mut slices = 1;
	while !doc.reconcile(budget).is_done() {
		slices += 1;
	}
	tracing::debug!(%language, lines = doc.line_count(), slices, "highlighted");

	let Some(grammar) = doc.grammar() else {
		return Report {
			language,
			lines: Vec::new(),
		};
	};
	let lines = (0..doc.line_count())
		.map(|line| LineReport {
			line,
			spans: doc
				.parsed(line)
				.map(|parsed| {
					parsed
						.runs()
						.into_iter()
						.map(|span| {
							let attribute = grammar.attribute(span.attribute);
							SpanReport {
								start: span.start,
								len: span.len,
								attribute: attribute.name.to_string(),
								format: attribute.format,
								kind: kind_name(span.kind),
							}
						})
						.collect()
				})
				.unwrap_or_default(),
		})
		.collect();
	Report { language, lines }
}

/// One line per span: `line:start..end attribute format kind`, 1-based lines.
pub fn render_plain(report: &Report) -> String {
	let mut out = String::new();
	for line in &report.lines {
		for span in &line.spans {
			let _ = writeln!(
				out,
				"{}:{}..{} {} {} {}",
				line.line + 1,
				span.start,
				span.start + span.len,
				span.attribute,
				format_name(span.format),
				span.kind,
			);
		}
	}
	out
}

pub fn render_json(report: &Report) -> serde_json::Result<String> {
	serde_json::to_string_pretty(report)
}

fn kind_name(kind: TextKind) -> &'static str {
	match kind {
		TextKind::Code => "code",
		TextKind::String => "string",
		TextKind::Comment => "comment",
		TextKind::BlockComment => "block-comment",
		TextKind::HereDoc => "here-doc",
	}
}

fn format_name(format: FormatClass) -> String {
	serde_json::to_value(format)
		.ok()
		.and_then(|value| value.as_str().map(str::to_string))
		.unwrap_or_else(|| format!("{format:?}"))
}
