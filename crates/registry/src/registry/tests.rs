use std::sync::Arc;

use pretty_assertions::assert_eq;
use rstest::rstest;

use super::*;

fn definition(name: &str, body: &str) -> String {
	format!(
		r##"<language name="{name}">
<highlighting>
<contexts><context name="Normal" attribute="Text">{body}</context></contexts>
<itemDatas><itemData name="Text" defStyleNum="dsNormal"/></itemDatas>
</highlighting></language>"##
	)
}

fn entry(file: &str, name: &str, patterns: &[&str], priority: i32) -> IndexEntry {
	IndexEntry {
		file: file.to_string(),
		name: name.to_string(),
		mime_types: vec![format!("text/x-{}", name.to_lowercase())],
		patterns: patterns.iter().map(|p| p.to_string()).collect(),
		first_line: None,
		priority,
		hidden: false,
	}
}

fn registry(entries: Vec<IndexEntry>) -> Registry {
	let files: Vec<_> = entries.iter().map(|e| (e.file.clone(), definition(&e.name, ""))).collect();
	Registry::from_sources(vec![(DefinitionSource::memory(files), GrammarIndex { grammars: entries })]).unwrap()
}

#[test]
fn source_file_name_finds_sql() {
	let reg = registry(vec![entry("sql.xml", "SQL", &["*.sql"], 0)]);
	assert_eq!(reg.by_source_file_name("report.sql").unwrap().name(), "SQL");

	let err = reg.by_source_file_name("report.xyz").unwrap_err();
	assert!(err.is_not_found());
	assert_eq!(err.to_string(), "no grammar found for file name `report.xyz`");
}

#[test]
fn only_the_file_name_component_is_matched() {
	let reg = registry(vec![entry("make.xml", "Makefile", &["Makefile", "*.mk"], 0)]);
	assert_eq!(reg.by_source_file_name("/src/project/Makefile").unwrap().name(), "Makefile");
	assert!(reg.by_source_file_name("Makefile/readme").unwrap_err().is_not_found());
}

#[rstest]
#[case(&[0, 0], "First")]
#[case(&[0, 5], "Second")]
#[case(&[7, 5], "First")]
fn pattern_ties_break_on_priority_then_declaration(#[case] priorities: &[i32], #[case] winner: &str) {
	let reg = registry(vec![
		entry("first.xml", "First", &["*.h"], priorities[0]),
		entry("second.xml", "Second", &["*.h"], priorities[1]),
	]);
	assert_eq!(reg.by_source_file_name("stdio.h").unwrap().name(), winner);
}

#[test]
fn repeated_lookups_share_one_grammar() {
	let reg = registry(vec![entry("sql.xml", "SQL", &["*.sql"], 0)]);
	let a = reg.by_name("SQL").unwrap();
	let b = reg.by_source_file_name("x.sql").unwrap();
	let c = reg.by_mime_type("TEXT/X-SQL").unwrap();
	assert!(Arc::ptr_eq(&a, &b));
	assert!(Arc::ptr_eq(&a, &c));
	assert_eq!(reg.loaded_count(), 1);
}

#[test]
fn name_lookup_ignores_ascii_case() {
	let reg = registry(vec![entry("sql.xml", "SQL", &[], 0)]);
	assert_eq!(reg.by_name("sql").unwrap().name(), "SQL");
	assert!(reg.by_name("Pascal").unwrap_err().is_not_found());
}

#[test]
fn first_line_sniffing() {
	let mut sh = entry("sh.xml", "Shell", &["*.sh"], 0);
	sh.first_line = Some(r"^#!.*\bsh\b".to_string());
	let reg = registry(vec![sh, entry("sql.xml", "SQL", &["*.sql"], 0)]);
	assert_eq!(reg.by_first_line("#!/bin/sh -e").unwrap().name(), "Shell");
	assert!(reg.by_first_line("SELECT 1;").unwrap_err().is_not_found());
}

#[test]
fn hidden_grammars_are_only_found_by_name() {
	let mut hidden = entry("base.xml", "Base", &["*.base"], 0);
	hidden.hidden = true;
	let reg = registry(vec![hidden, entry("sql.xml", "SQL", &["*.sql"], 0)]);
	assert!(reg.by_source_file_name("a.base").unwrap_err().is_not_found());
	assert!(reg.by_mime_type("text/x-base").unwrap_err().is_not_found());
	assert_eq!(reg.by_name("Base").unwrap().name(), "Base");
	assert_eq!(reg.languages(), vec!["SQL"]);
}

#[test]
fn detect_tries_criteria_in_order() {
	let reg = registry(vec![
		entry("sql.xml", "SQL", &["*.sql"], 0),
		entry("json.xml", "JSON", &["*.json"], 0),
	]);

	let by_file = DetectQuery {
		name: Some("JSON"),
		file_name: Some(Path::new("a.sql")),
		..DetectQuery::default()
	};
	assert_eq!(reg.detect(&by_file).unwrap().name(), "JSON");

	let fallback = DetectQuery {
		mime_type: Some("text/unknown"),
		file_name: Some(Path::new("a.sql")),
		..DetectQuery::default()
	};
	assert_eq!(reg.detect(&fallback).unwrap().name(), "SQL");

	let definition = DetectQuery {
		definition_file: Some("json.xml"),
		name: Some("SQL"),
		..DetectQuery::default()
	};
	assert_eq!(reg.detect(&definition).unwrap().name(), "JSON");

	let err = reg.detect(&DetectQuery::default()).unwrap_err();
	assert_eq!(err.to_string(), "no grammar found for an empty query");
}

#[test]
fn failed_loads_are_not_cached() {
	let index = GrammarIndex {
		grammars: vec![entry("bad.xml", "Bad", &["*.bad"], 0)],
	};
	let reg = Registry::from_sources(vec![(DefinitionSource::memory([("bad.xml", "<language name=\"Bad\">")]), index)])
		.unwrap();

	for _ in 0..2 {
		let err = reg.by_name("Bad").unwrap_err();
		assert!(matches!(err, RegistryError::Load(_)), "{err}");
	}
	assert_eq!(reg.loaded_count(), 0);
}

#[test]
fn missing_definition_file_is_an_io_error() {
	let index = GrammarIndex {
		grammars: vec![entry("gone.xml", "Gone", &[], 0)],
	};
	let reg = Registry::from_sources(vec![(DefinitionSource::memory(Vec::<(String, String)>::new()), index)]).unwrap();
	assert!(matches!(reg.by_name("Gone").unwrap_err(), RegistryError::Io { .. }));
}

#[test]
fn includes_resolve_through_the_index() {
	let host = definition("Host", r###"<IncludeRules context="##Guest"/>"###);
	let guest = definition("Guest", r#"<DetectChar char="g" attribute="Text"/>"#);
	let index = GrammarIndex {
		grammars: vec![entry("host.xml", "Host", &["*.host"], 0), entry("guest.xml", "Guest", &[], 0)],
	};
	let reg = Registry::from_sources(vec![(
		DefinitionSource::memory([("host.xml", host), ("guest.xml", guest)]),
		index,
	)])
	.unwrap();

	let grammar = reg.by_source_file_name("a.host").unwrap();
	assert!(grammar.context_by_name("Normal##Guest").is_some());
	// The included grammar is spliced, not loaded on its own.
	assert_eq!(reg.loaded_count(), 1);
}

#[test]
fn unknown_include_is_a_load_error() {
	let host = definition("Host", r###"<IncludeRules context="##Nowhere"/>"###);
	let index = GrammarIndex {
		grammars: vec![entry("host.xml", "Host", &[], 0)],
	};
	let reg = Registry::from_sources(vec![(DefinitionSource::memory([("host.xml", host)]), index)]).unwrap();
	let err = reg.by_name("Host").unwrap_err();
	assert!(err.to_string().contains("Nowhere"), "{err}");
}

#[test]
fn earlier_sources_shadow_later_ones() {
	let user = GrammarIndex {
		grammars: vec![entry("mine.xml", "SQL", &["*.sql"], 0)],
	};
	let reg = Registry::from_sources(vec![
		(DefinitionSource::memory([("mine.xml", definition("SQL", ""))]), user),
		(DefinitionSource::Bundled, GrammarIndex::from_json(bundled::INDEX, "bundled").unwrap()),
	])
	.unwrap();

	assert_eq!(reg.entries().filter(|e| e.name == "SQL").count(), 1);
	let sql = reg.by_name("SQL").unwrap();
	assert!(sql.context_by_name("Block Comment").is_none(), "bundled SQL should be shadowed");
	assert!(reg.by_name("Bash").is_ok());
}

#[rstest]
#[case("*.[", None)]
#[case("*.sql", Some("(unclosed"))]
fn bad_patterns_are_rejected(#[case] glob: &str, #[case] first_line: Option<&str>) {
	let mut e = entry("x.xml", "X", &[glob], 0);
	e.first_line = first_line.map(str::to_string);
	let result = Registry::from_sources(vec![(DefinitionSource::Bundled, GrammarIndex { grammars: vec![e] })]);
	assert!(matches!(result, Err(RegistryError::Pattern { .. })));
}

#[test]
fn bundled_registry_resolves_every_language() {
	let reg = Registry::bundled().unwrap();
	assert_eq!(reg.languages(), vec!["C", "C++", "Bash", "JSON", "SQL"]);
	for name in reg.languages() {
		let grammar = reg.by_name(name).unwrap();
		assert_eq!(grammar.name(), name);
	}
}

#[test]
fn bundled_header_goes_to_cpp_by_priority() {
	let reg = Registry::bundled().unwrap();
	assert_eq!(reg.by_source_file_name("vector.h").unwrap().name(), "C++");
	assert_eq!(reg.by_source_file_name("main.c").unwrap().name(), "C");
	assert_eq!(reg.by_first_line("#!/usr/bin/env bash").unwrap().name(), "Bash");
}
