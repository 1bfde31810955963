use std::sync::Arc;

use pretty_assertions::assert_eq;
use rstest::rstest;
use synline_engine::TextKind;

use super::*;

const MINI: &str = r##"<language name="Mini">
<highlighting>
<contexts>
  <context name="Normal" attribute="Text">
    <Detect2Chars attribute="Comment" context="Block" char="/" char1="*"/>
    <DetectChar attribute="String" context="Str" char="&quot;"/>
  </context>
  <context name="Block" attribute="Comment">
    <Detect2Chars attribute="Comment" context="#pop" char="*" char1="/"/>
  </context>
  <context name="Str" attribute="String" lineEndContext="#pop">
    <DetectChar attribute="String" context="#pop" char="&quot;"/>
  </context>
</contexts>
<itemDatas>
  <itemData name="Text" defStyleNum="dsNormal"/>
  <itemData name="Comment" defStyleNum="dsComment"/>
  <itemData name="String" defStyleNum="dsString"/>
</itemDatas>
</highlighting>
</language>"##;

fn mini() -> Arc<Grammar> {
	Arc::new(synline_grammar::load_standalone(MINI).unwrap())
}

fn doc(lines: &[&str]) -> Document {
	let mut doc = Document::with_text(Some(mini()), &lines.join("\n"));
	doc.reconcile_all();
	doc
}

fn plain(count: usize) -> Vec<String> {
	(0..count).map(|i| format!("line {i}")).collect()
}

/// Kind of the first character of every line.
fn kinds(doc: &Document) -> Vec<TextKind> {
	(0..doc.line_count())
		.map(|i| doc.parsed(i).map_or(TextKind::Code, |p| p.kind_at(0)))
		.collect()
}

#[rstest]
#[case("", &[""])]
#[case("a\nb", &["a", "b"])]
#[case("a\r\nb\r\n", &["a", "b", ""])]
fn set_text_splits_lines(#[case] text: &str, #[case] lines: &[&str]) {
	let doc = Document::with_text(None, text);
	assert_eq!(doc.lines().collect::<Vec<_>>(), lines);
}

#[test]
fn without_grammar_predicates_use_defaults() {
	let mut doc = Document::with_text(None, "/* not parsed");
	assert_eq!(doc.reconcile_all(), ReconcileReport::idle());
	assert!(!doc.is_in_progress());
	assert!(doc.parsed(0).is_none());
	assert!(doc.is_code(0, 0));
	assert!(!doc.is_comment(0, 0));
}

#[test]
fn full_parse_covers_every_line() {
	let doc = doc(&["a", "/* b", "c */ d", "\"e"]);
	assert!(!doc.is_in_progress());
	assert_eq!(
		kinds(&doc),
		vec![TextKind::Code, TextKind::BlockComment, TextKind::BlockComment, TextKind::String]
	);
	assert!(doc.is_block_comment(2, 1));
	assert!(doc.is_code(2, 5));
	assert!(doc.is_string(3, 0));
}

#[test]
fn edit_that_keeps_state_parses_one_line() {
	let lines = plain(100);
	let mut doc = Document::with_text(Some(mini()), &lines.join("\n"));
	assert_eq!(doc.reconcile_all().lines_parsed, 100);

	doc.set_line(10, "changed");
	let report = doc.reconcile_all();
	assert_eq!(report.lines_parsed, 1);
	assert_eq!(report.resumed_at, Some(10));
	assert_eq!(report.status, ReconcileStatus::Done);
}

#[test]
fn opening_a_comment_propagates_until_closed() {
	let mut doc = doc(&["a", "b", "c", "d */ x", "e"]);
	assert_eq!(kinds(&doc), vec![TextKind::Code; 5]);

	doc.set_line(1, "/* b");
	// Lines 1..=3 change state; line 3 closes the comment again and ends in
	// the state it ended in before.
	assert_eq!(doc.reconcile_all().lines_parsed, 3);
	assert_eq!(
		kinds(&doc),
		vec![
			TextKind::Code,
			TextKind::BlockComment,
			TextKind::BlockComment,
			TextKind::BlockComment,
			TextKind::Code,
		]
	);
}

#[test]
fn closing_a_comment_reconverges() {
	let mut doc = doc(&["/* a", "b", "c", "d"]);
	doc.set_line(0, "/* a */");
	assert_eq!(doc.reconcile_all().lines_parsed, 4);
	assert_eq!(kinds(&doc), vec![TextKind::BlockComment, TextKind::Code, TextKind::Code, TextKind::Code]);
}

#[test]
fn budget_slices_are_resumable() {
	let lines = plain(10);
	let mut doc = Document::with_text(Some(mini()), &lines.join("\n"));

	let first = doc.reconcile(ReconcileBudget::lines(3));
	assert_eq!(first.status, ReconcileStatus::InProgress);
	assert_eq!(first.lines_parsed, 3);
	assert!(doc.is_in_progress());
	assert!(doc.parsed(2).is_some());
	assert!(doc.parsed(3).is_none());

	let mut slices = 1;
	loop {
		slices += 1;
		if doc.reconcile(ReconcileBudget::lines(3)).is_done() {
			break;
		}
	}
	assert_eq!(slices, 4);
	assert!(!doc.is_in_progress());
	assert!((0..10).all(|i| doc.parsed(i).is_some()));
}

#[test]
fn edit_before_an_interrupted_slice_still_finishes_the_tail() {
	let lines = plain(8);
	let mut doc = doc(&lines.iter().map(String::as_str).collect::<Vec<_>>());

	doc.set_line(0, "/* open");
	assert_eq!(doc.reconcile(ReconcileBudget::lines(3)).status, ReconcileStatus::InProgress);

	// Keeps line 1 inside the comment, so it reconverges at once; the rest of
	// the interrupted propagation must still happen.
	doc.set_line(1, "still comment");
	doc.reconcile_all();
	assert_eq!(kinds(&doc), vec![TextKind::BlockComment; 8]);
}

#[test]
fn removing_the_closer_reopens_the_tail() {
	let mut doc = doc(&["/* a", "b */", "c", "d"]);
	doc.remove_lines(1, 1);
	doc.reconcile_all();
	assert_eq!(doc.line_count(), 3);
	assert_eq!(kinds(&doc), vec![TextKind::BlockComment; 3]);
}

#[test]
fn inserted_lines_are_parsed_in_place() {
	let mut doc = doc(&["a", "b", "c"]);
	doc.insert_lines(1, ["/* x", "y */"]);
	let report = doc.reconcile_all();
	assert_eq!(report.lines_parsed, 3);
	assert_eq!(doc.lines().collect::<Vec<_>>(), vec!["a", "/* x", "y */", "b", "c"]);
	assert!(doc.is_block_comment(2, 0));
	assert!(doc.is_code(3, 0));
}

#[test]
fn removing_everything_leaves_one_empty_line() {
	let mut doc = doc(&["a", "b"]);
	doc.remove_lines(0, 10);
	doc.reconcile_all();
	assert_eq!(doc.line_count(), 1);
	assert_eq!(doc.line(0), Some(""));
	assert!(doc.parsed(0).is_some_and(ParsedLine::is_empty));
}

#[test]
fn replace_lines_clamps_its_range() {
	let mut doc = doc(&["a", "b"]);
	doc.replace_lines(5, 3, ["c"]);
	doc.reconcile_all();
	assert_eq!(doc.lines().collect::<Vec<_>>(), vec!["a", "b", "c"]);
}

#[test]
fn switching_grammar_reparses_everything() {
	let mut doc = doc(&["/* a", "b"]);
	doc.clear_grammar();
	assert!(doc.parsed(0).is_none());
	assert!(doc.is_code(1, 0));

	doc.set_grammar(mini());
	assert!(doc.is_in_progress());
	assert_eq!(doc.reconcile_all().lines_parsed, 2);
	assert!(doc.is_block_comment(1, 0));
}

#[test]
fn out_of_range_set_line_is_ignored() {
	let mut doc = doc(&["a"]);
	doc.set_line(3, "x");
	assert!(!doc.is_in_progress());
	assert_eq!(doc.line_count(), 1);
}
