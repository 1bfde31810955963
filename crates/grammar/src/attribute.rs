//! Attributes and their semantic format classes.
//!
//! An attribute is what a span is tagged with. Grammars never carry colors;
//! each attribute maps to a [`FormatClass`] that hosts translate into
//! presentation.

use serde::{Deserialize, Serialize};

/// Index of an attribute within its [`Grammar`](crate::Grammar).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AttributeId(pub(crate) u32);

impl AttributeId {
	#[inline]
	pub fn idx(self) -> usize {
		self.0 as usize
	}
}

/// Semantic class of an attribute, following the default-style names used by
/// Kate-compatible definitions (`dsNormal`, `dsKeyword`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FormatClass {
	#[default]
	Normal,
	Keyword,
	Function,
	Variable,
	ControlFlow,
	Operator,
	BuiltIn,
	Extension,
	Preprocessor,
	Attribute,
	Char,
	SpecialChar,
	String,
	VerbatimString,
	SpecialString,
	Import,
	DataType,
	DecVal,
	BaseN,
	Float,
	Constant,
	Comment,
	Documentation,
	Annotation,
	CommentVar,
	RegionMarker,
	Information,
	Warning,
	Alert,
	Others,
	Error,
}

impl FormatClass {
	/// Parses a `defStyleNum` value. Returns `None` for unknown names.
	pub fn from_style_name(name: &str) -> Option<Self> {
		let class = match name.strip_prefix("ds").unwrap_or(name) {
			"Normal" => Self::Normal,
			"Keyword" => Self::Keyword,
			"Function" => Self::Function,
			"Variable" => Self::Variable,
			"ControlFlow" => Self::ControlFlow,
			"Operator" => Self::Operator,
			"BuiltIn" => Self::BuiltIn,
			"Extension" => Self::Extension,
			"Preprocessor" => Self::Preprocessor,
			"Attribute" => Self::Attribute,
			"Char" => Self::Char,
			"SpecialChar" => Self::SpecialChar,
			"String" => Self::String,
			"VerbatimString" => Self::VerbatimString,
			"SpecialString" => Self::SpecialString,
			"Import" => Self::Import,
			"DataType" => Self::DataType,
			"DecVal" => Self::DecVal,
			"BaseN" => Self::BaseN,
			"Float" => Self::Float,
			"Constant" => Self::Constant,
			"Comment" => Self::Comment,
			"Documentation" => Self::Documentation,
			"Annotation" => Self::Annotation,
			"CommentVar" => Self::CommentVar,
			"RegionMarker" => Self::RegionMarker,
			"Information" => Self::Information,
			"Warning" => Self::Warning,
			"Alert" => Self::Alert,
			"Others" => Self::Others,
			"Error" => Self::Error,
			_ => return None,
		};
		Some(class)
	}

	/// Comment-like classes, including documentation markup inside comments.
	pub fn is_comment(self) -> bool {
		matches!(
			self,
			Self::Comment | Self::Documentation | Self::Annotation | Self::CommentVar | Self::Alert | Self::RegionMarker
		)
	}

	/// String and character literal classes.
	pub fn is_string(self) -> bool {
		matches!(
			self,
			Self::String | Self::VerbatimString | Self::SpecialString | Self::Char | Self::SpecialChar
		)
	}
}

/// A named attribute with its format class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
	/// Qualified name. Attributes spliced from an included grammar are named
	/// `Name##Language`.
	pub name: Box<str>,
	pub format: FormatClass,
}

#[cfg(test)]
mod tests {
	use rstest::rstest;

	use super::*;

	#[rstest]
	#[case("dsNormal", FormatClass::Normal)]
	#[case("dsKeyword", FormatClass::Keyword)]
	#[case("dsDecVal", FormatClass::DecVal)]
	#[case("Comment", FormatClass::Comment)]
	#[case("dsVerbatimString", FormatClass::VerbatimString)]
	fn style_names(#[case] name: &str, #[case] expected: FormatClass) {
		assert_eq!(FormatClass::from_style_name(name), Some(expected));
	}

	#[test]
	fn unknown_style_name() {
		assert_eq!(FormatClass::from_style_name("dsRainbow"), None);
	}

	#[test]
	fn classification() {
		assert!(FormatClass::Comment.is_comment());
		assert!(FormatClass::Alert.is_comment());
		assert!(!FormatClass::String.is_comment());
		assert!(FormatClass::Char.is_string());
		assert!(!FormatClass::Keyword.is_string());
	}
}
