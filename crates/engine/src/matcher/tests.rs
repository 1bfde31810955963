use std::sync::Arc;

use rstest::rstest;
use synline_grammar::{ContextId, Grammar, load_standalone};

use super::*;
use crate::state::{Captures, Frame};

fn grammar(rules: &str) -> Grammar {
	let text = format!(
		r#"<language name="M"><highlighting>
		<list name="kw"><item>if</item><item>else</item></list>
		<contexts>
		<context name="Main" attribute="Text">{rules}</context>
		<context name="Other" attribute="Text"/>
		</contexts>
		<itemDatas><itemData name="Text" defStyleNum="dsNormal"/></itemDatas>
		</highlighting></language>"#
	);
	load_standalone(&text).expect("test grammar loads")
}

/// End column of the first match at `pos` in the default context.
fn match_end(g: &Grammar, text: &str, pos: usize) -> Option<usize> {
	match_with(g, text, pos, &Frame::new(g.default_context()))
}

fn match_with(g: &Grammar, text: &str, pos: usize, frame: &Frame) -> Option<usize> {
	let ctx = frame.context();
	let mut matcher = Matcher::new(g);
	matcher
		.first_match(g.context(ctx), g.deliminators(ctx), &Line::new(text), pos, frame)
		.map(|(_, hit)| hit.end)
}

#[rstest]
#[case("if", 0, Some(2))]
#[case("if(x)", 0, Some(2))]
#[case("ifx", 0, None)]
#[case("xif", 1, None)]
#[case("a.if", 2, Some(4))]
#[case("IF", 0, None)]
fn keyword_needs_word_boundaries(#[case] text: &str, #[case] pos: usize, #[case] end: Option<usize>) {
	let g = grammar(r#"<keyword String="kw"/>"#);
	assert_eq!(match_end(&g, text, pos), end);
}

#[rstest]
#[case("Select", Some(6))]
#[case("SELECT x", Some(6))]
#[case("selection", None)]
fn word_detect_insensitive(#[case] text: &str, #[case] end: Option<usize>) {
	let g = grammar(r#"<WordDetect String="select" insensitive="true"/>"#);
	assert_eq!(match_end(&g, text, 0), end);
}

#[test]
fn string_detect_is_literal() {
	let g = grammar(r#"<StringDetect String="a.b"/>"#);
	assert_eq!(match_end(&g, "a.b!", 0), Some(3));
	assert_eq!(match_end(&g, "axb", 0), None);
}

#[test]
fn columns_count_characters() {
	let g = grammar(r#"<StringDetect String="é!"/>"#);
	assert_eq!(match_end(&g, "ßé!", 1), Some(3));
}

#[test]
fn regex_is_anchored_at_the_column() {
	let g = grammar(r#"<RegExpr String="b+"/>"#);
	assert_eq!(match_end(&g, "aabbb", 0), None);
	assert_eq!(match_end(&g, "aabbb", 2), Some(5));
}

#[test]
fn regex_memo_agrees_with_fresh_searches() {
	let g = grammar(r#"<RegExpr String="b+"/>"#);
	let ctx = g.default_context();
	let line = Line::new("abbab");
	let frame = Frame::new(ctx);
	let mut matcher = Matcher::new(&g);
	let ends: Vec<Option<usize>> = (0..5)
		.map(|pos| {
			matcher
				.first_match(g.context(ctx), g.deliminators(ctx), &line, pos, &frame)
				.map(|(_, hit)| hit.end)
		})
		.collect();
	assert_eq!(ends, vec![None, Some(3), Some(3), None, Some(5)]);
}

#[test]
fn regex_sees_text_before_the_column() {
	let g = grammar(r#"<RegExpr String="(?&lt;=a)b"/>"#);
	assert_eq!(match_end(&g, "ab", 1), Some(2));
	assert_eq!(match_end(&g, "cb", 1), None);

	let anchored = grammar(r#"<RegExpr String="^x"/>"#);
	assert_eq!(match_end(&anchored, "xx", 1), None);
	assert_eq!(match_end(&anchored, "xx", 0), Some(1));
}

#[rstest]
#[case("10", Some(2))]
#[case("10u", Some(3))]
#[case("10UL", Some(3))]
#[case("x10", None)]
fn child_rules_extend_the_match(#[case] text: &str, #[case] end: Option<usize>) {
	let g = grammar(r#"<Int><AnyChar String="uU"/></Int>"#);
	let pos = usize::from(text.starts_with('x'));
	assert_eq!(match_end(&g, text, pos), end);
}

#[test]
fn range_detect_on_one_line() {
	let g = grammar(r#"<RangeDetect char="[" char1="]"/>"#);
	let ctx = g.default_context();
	let mut matcher = Matcher::new(&g);
	let frame = Frame::new(ctx);

	let (_, hit) = matcher
		.first_match(g.context(ctx), g.deliminators(ctx), &Line::new("[ab] c"), 0, &frame)
		.expect("matches");
	assert_eq!(hit.end, 4);
	assert_eq!(hit.continuation, None);

	let (_, hit) = matcher
		.first_match(g.context(ctx), g.deliminators(ctx), &Line::new("[ab c"), 0, &frame)
		.expect("matches");
	assert_eq!(hit.end, 5);
	assert!(hit.continuation.is_some());
}

#[rstest]
#[case("BEGIN x END y", Some(11))]
#[case("begin x end y", Some(11))]
#[case("Begin x", Some(7))]
#[case("x begin", None)]
fn insensitive_range_detect_folds_both_delimiters(#[case] text: &str, #[case] end: Option<usize>) {
	let g = grammar(r#"<RangeDetect String="begin" end="end" insensitive="true"/>"#);
	assert_eq!(match_end(&g, text, 0), end);
}

#[test]
fn line_continue_only_at_end() {
	let g = grammar(r#"<LineContinue/>"#);
	assert_eq!(match_end(&g, r"a\", 1), Some(2));
	assert_eq!(match_end(&g, r"\a", 0), None);
}

#[rstest]
#[case(r#"<DetectSpaces/>"#, " \t x", Some(3))]
#[case(r#"<DetectIdentifier/>"#, "_foo9 bar", Some(5))]
#[case(r#"<DetectIdentifier/>"#, "9foo", None)]
#[case(r#"<AnyChar String="+-"/>"#, "-1", Some(1))]
#[case(r#"<Detect2Chars char="/" char1="*"/>"#, "/*", Some(2))]
#[case(r#"<HlCHex/>"#, "0x1F;", Some(4))]
#[case(r#"<Float/>"#, "1.5e3", Some(5))]
fn primitive_rules(#[case] rules: &str, #[case] text: &str, #[case] end: Option<usize>) {
	assert_eq!(match_end(&grammar(rules), text, 0), end);
}

#[test]
fn position_constraints() {
	let g = grammar(r##"<DetectChar char="#" firstNonSpace="true"/><DetectChar char="@" column="2"/>"##);
	assert_eq!(match_end(&g, "  # x", 2), Some(3));
	assert_eq!(match_end(&g, "x # y", 2), None);
	assert_eq!(match_end(&g, "ab@", 2), Some(3));
	assert_eq!(match_end(&g, "a@", 1), None);
}

fn captures(values: &[&str]) -> Captures {
	values.iter().map(|v| Box::<str>::from(*v)).collect::<Arc<[Box<str>]>>()
}

/// A grammar whose `Dyn` context holds `rules` and is pushed by a regex
/// binding three groups.
fn dynamic_grammar(rules: &str) -> (Grammar, ContextId) {
	let g = grammar(&format!(r#"<RegExpr String="(a)(b)(c)" context="Dyn"/></context><context name="Dyn" attribute="Text">{rules}"#));
	let dyn_ctx = g.context_by_name("Dyn").expect("Dyn context");
	(g, dyn_ctx)
}

#[test]
fn dynamic_rules_read_frame_captures() {
	let (g, ctx) = dynamic_grammar(r#"<StringDetect String="%1" dynamic="true"/><DetectChar char="2" dynamic="true"/>"#);
	assert!(g.context(ctx).is_dynamic());
	let eof = Frame::with_captures(ctx, captures(&["<<EOF", "EOF", "!"]));
	let end = Frame::with_captures(ctx, captures(&["<<END", "END", "?"]));

	assert_eq!(match_with(&g, "EOF", 0, &eof), Some(3));
	assert_eq!(match_with(&g, "EOF", 0, &end), None);
	assert_eq!(match_with(&g, "END", 0, &end), Some(3));
	assert_eq!(match_with(&g, "!", 0, &eof), Some(1));
	assert_eq!(match_with(&g, "!", 0, &end), None);
}

#[test]
fn dynamic_regex_escapes_captures() {
	let (g, ctx) = dynamic_grammar(r#"<RegExpr String="%1" dynamic="true"/>"#);
	let frame = Frame::with_captures(ctx, captures(&["", "a.b"]));
	assert_eq!(match_with(&g, "a.b", 0, &frame), Some(3));
	assert_eq!(match_with(&g, "axb", 0, &frame), None);
}

#[test]
fn regex_push_binds_captures_for_dynamic_targets() {
	let (g, _) = dynamic_grammar(r#"<StringDetect String="%3" dynamic="true"/>"#);
	let main = g.default_context();
	let mut matcher = Matcher::new(&g);
	let (_, hit) = matcher
		.first_match(g.context(main), g.deliminators(main), &Line::new("abc"), 0, &Frame::new(main))
		.expect("matches");
	let bind = hit.bind.expect("captures bound");
	assert_eq!(bind.iter().map(|c| &**c).collect::<Vec<_>>(), vec!["abc", "a", "b", "c"]);
}
