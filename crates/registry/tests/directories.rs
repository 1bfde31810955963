#![allow(unused_crate_dependencies)]

//! Registries backed by definition directories on disk.

use std::fs;
use std::sync::Arc;

use synline_registry::{DetectQuery, GrammarIndex, Registry, RegistryConfig};
use tempfile::TempDir;

const SQL: &str = r#"<language name="SQL" extensions="*.sql" mimetype="text/x-sql" casesensitive="0">
<highlighting>
<list name="keywords"><item>select</item><item>from</item></list>
<contexts><context name="Normal" attribute="Text"><keyword attribute="Keyword" String="keywords"/></context></contexts>
<itemDatas><itemData name="Text" defStyleNum="dsNormal"/><itemData name="Keyword" defStyleNum="dsKeyword"/></itemDatas>
</highlighting></language>"#;

fn syntax_dir(files: &[(&str, &str)]) -> TempDir {
	let dir = tempfile::tempdir().unwrap();
	for (name, text) in files {
		fs::write(dir.path().join(name), text).unwrap();
	}
	dir
}

fn directory_only(dir: &TempDir) -> Registry {
	let config = RegistryConfig {
		search_paths: vec![dir.path().to_path_buf()],
		bundled: false,
	};
	Registry::new(&config).unwrap()
}

#[test]
fn scanned_directory_answers_file_name_queries() {
	let dir = syntax_dir(&[("sql.xml", SQL)]);
	let registry = directory_only(&dir);

	let sql = registry.by_source_file_name("report.sql").unwrap();
	assert_eq!(sql.name(), "SQL");
	assert!(registry.by_source_file_name("report.xyz").unwrap_err().is_not_found());

	let again = registry
		.detect(&DetectQuery {
			mime_type: Some("text/x-sql"),
			..DetectQuery::default()
		})
		.unwrap();
	assert!(Arc::ptr_eq(&sql, &again));
}

#[test]
fn generated_index_is_used_verbatim() {
	let dir = syntax_dir(&[("sql.xml", SQL)]);
	let mut index = GrammarIndex::from_dir(dir.path()).unwrap();
	index.grammars[0].patterns.push("*.query".to_string());
	fs::write(dir.path().join("index.json"), index.to_json().unwrap()).unwrap();

	let registry = directory_only(&dir);
	assert_eq!(registry.by_source_file_name("daily.query").unwrap().name(), "SQL");
}

#[test]
fn user_directory_shadows_bundled_definitions() {
	let dir = syntax_dir(&[("sql.xml", SQL)]);
	let registry = Registry::new(&RegistryConfig {
		search_paths: vec![dir.path().to_path_buf()],
		bundled: true,
	})
	.unwrap();

	let sql = registry.by_name("SQL").unwrap();
	assert_eq!(sql.contexts().count(), 1);
	assert_eq!(registry.by_source_file_name("main.c").unwrap().name(), "C");
}

#[test]
fn broken_or_missing_directories_are_skipped() {
	let broken = syntax_dir(&[("index.json", "{ not json")]);
	let registry = Registry::new(&RegistryConfig {
		search_paths: vec![broken.path().to_path_buf(), broken.path().join("missing")],
		bundled: true,
	})
	.unwrap();
	assert_eq!(registry.by_name("Bash").unwrap().name(), "Bash");
}

#[test]
fn definitions_edited_after_a_failed_load_are_picked_up() {
	let dir = syntax_dir(&[("sql.xml", SQL)]);
	let registry = directory_only(&dir);
	fs::write(dir.path().join("sql.xml"), "<language name=\"SQL\"><highlighting/></language>").unwrap();
	assert!(!registry.by_name("SQL").unwrap_err().is_not_found());

	fs::write(dir.path().join("sql.xml"), SQL).unwrap();
	assert_eq!(registry.by_name("SQL").unwrap().name(), "SQL");
}

#[test]
fn directory_with_a_bad_pattern_does_not_disable_bundled_grammars() {
	for (glob, first_line) in [("*.x", Some("(")), ("*.[", None)] {
		let mut index = GrammarIndex::from_dir(syntax_dir(&[("sql.xml", SQL)]).path()).unwrap();
		index.grammars[0].name = "X".to_string();
		index.grammars[0].patterns = vec![glob.to_string()];
		index.grammars[0].first_line = first_line.map(str::to_string);
		let dir = syntax_dir(&[("sql.xml", SQL), ("index.json", &index.to_json().unwrap())]);

		let registry = Registry::new(&RegistryConfig {
			search_paths: vec![dir.path().to_path_buf()],
			bundled: true,
		})
		.unwrap();
		assert!(registry.by_name("X").unwrap_err().is_not_found());
		assert_eq!(registry.by_source_file_name("main.c").unwrap().name(), "C");
		assert_eq!(registry.by_first_line("#!/bin/bash").unwrap().name(), "Bash");
	}
}
