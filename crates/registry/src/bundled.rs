//! Definitions compiled into the binary from `runtime/syntax/`.

pub(crate) const INDEX: &str = include_str!("../../../runtime/syntax/index.json");

const DEFINITIONS: &[(&str, &str)] = &[
	("bash.xml", include_str!("../../../runtime/syntax/bash.xml")),
	("c.xml", include_str!("../../../runtime/syntax/c.xml")),
	("cpp.xml", include_str!("../../../runtime/syntax/cpp.xml")),
	("json.xml", include_str!("../../../runtime/syntax/json.xml")),
	("sql.xml", include_str!("../../../runtime/syntax/sql.xml")),
];

pub(crate) fn definition(file: &str) -> Option<&'static str> {
	DEFINITIONS.iter().find(|(name, _)| *name == file).map(|(_, text)| *text)
}

#[cfg(test)]
mod tests {
	use crate::index::GrammarIndex;

	#[test]
	fn every_indexed_file_is_embedded() {
		let index = GrammarIndex::from_json(super::INDEX, "bundled").unwrap();
		for entry in &index.grammars {
			assert!(super::definition(&entry.file).is_some(), "{} is not embedded", entry.file);
		}
	}
}
