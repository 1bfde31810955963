#![allow(unused_crate_dependencies)]

//! Totality properties of the block parser.

use proptest::prelude::*;
use synline_engine::{LineState, ParseLimits, ParsedLine, parse_block, parse_block_with};
use synline_grammar::{Grammar, load_standalone};

const BASH: &str = include_str!("../../../runtime/syntax/bash.xml");
const C: &str = include_str!("../../../runtime/syntax/c.xml");

/// A grammar built to provoke every guard: ping-pong look-aheads,
/// self-pushes, pops past the bottom, fallthrough chains and ranges.
const HOSTILE: &str = r##"<language name="Hostile"><highlighting>
<contexts>
  <context name="A" attribute="N" fallthrough="true" fallthroughContext="B">
    <DetectChar char="(" context="A"/>
    <DetectChar char=")" context="#pop#pop#pop#pop"/>
    <DetectChar char="x" lookAhead="true" context="B"/>
    <RangeDetect attribute="C" char="/*" char1="*/"/>
  </context>
  <context name="B" attribute="C" fallthrough="true" fallthroughContext="#pop" lineEndContext="A">
    <DetectChar char="x" lookAhead="true" context="#pop"/>
    <RegExpr String="(?=y)" lookAhead="true" context="A"/>
    <DetectChar char="y" context="#pop!B"/>
  </context>
</contexts>
<itemDatas><itemData name="N" defStyleNum="dsNormal"/><itemData name="C" defStyleNum="dsComment"/></itemDatas>
</highlighting></language>"##;

fn grammars() -> Vec<Grammar> {
	[BASH, C, HOSTILE]
		.into_iter()
		.map(|text| load_standalone(text).expect("grammar loads"))
		.collect()
}

/// Lines assembled from fragments that open and close contexts.
fn arb_line() -> impl Strategy<Value = String> {
	let fragment = prop_oneof![
		"[ -~]{0,6}",
		Just("/*".to_string()),
		Just("*/".to_string()),
		Just("\"".to_string()),
		Just("'".to_string()),
		Just("<<EOF".to_string()),
		Just("EOF".to_string()),
		Just("#".to_string()),
		Just("\\".to_string()),
		Just("(((".to_string()),
		Just(")".to_string()),
		Just("xy".to_string()),
		Just("ä€\t".to_string()),
	];
	prop::collection::vec(fragment, 0..8).prop_map(|parts| parts.concat())
}

fn arb_lines() -> impl Strategy<Value = Vec<String>> {
	prop::collection::vec(arb_line(), 1..8)
}

fn assert_covers(line: &ParsedLine, text: &str) -> Result<(), TestCaseError> {
	let mut column = 0;
	for span in &line.spans {
		prop_assert_eq!(span.start, column, "spans must be contiguous");
		prop_assert!(span.len > 0, "spans must not be empty");
		column = span.end();
	}
	prop_assert_eq!(column, text.chars().count(), "spans must cover the line");
	Ok(())
}

proptest! {
	#[test]
	fn prop_spans_cover_every_line(lines in arb_lines()) {
		for grammar in grammars() {
			let mut state = LineState::initial(&grammar);
			for text in &lines {
				let parsed = parse_block(&grammar, text, &state);
				assert_covers(&parsed, text)?;
				state = parsed.state;
			}
		}
	}

	#[test]
	fn prop_parse_is_deterministic(lines in arb_lines()) {
		for grammar in grammars() {
			let mut state = LineState::initial(&grammar);
			for text in &lines {
				let first = parse_block(&grammar, text, &state);
				let second = parse_block(&grammar, text, &state);
				prop_assert_eq!(&first, &second);
				state = first.state;
			}
		}
	}

	#[test]
	fn prop_stack_never_empties(lines in arb_lines(), max_depth in 1usize..6) {
		let limits = ParseLimits { max_depth, ..ParseLimits::default() };
		for grammar in grammars() {
			let mut state = LineState::initial(&grammar);
			for text in &lines {
				let parsed = parse_block_with(&grammar, text, &state, &limits);
				prop_assert!(parsed.state.depth() >= 1);
				prop_assert!(parsed.state.depth() <= max_depth.max(1));
				state = parsed.state;
			}
		}
	}
}
