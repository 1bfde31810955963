use thiserror::Error;

/// Errors raised while loading a grammar definition.
///
/// Every variant names the grammar being loaded so hosts can report which
/// definition is broken. A failed load never yields a partial [`Grammar`].
///
/// [`Grammar`]: crate::Grammar
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
	#[error("{grammar}: malformed definition: {message}")]
	Xml { grammar: String, message: String },

	#[error("{grammar}: missing required element or attribute `{element}`")]
	MissingElement { grammar: String, element: String },

	#[error("{grammar}: invalid value {value:?} for `{attribute}`")]
	InvalidAttribute { grammar: String, attribute: String, value: String },

	#[error("{grammar}: unknown rule element `{element}` in context `{context}`")]
	UnknownRule { grammar: String, context: String, element: String },

	#[error("{grammar}: context `{context}` references unknown context `{target}`")]
	UnresolvedContext { grammar: String, context: String, target: String },

	#[error("{grammar}: context `{context}` references unknown attribute `{attribute}`")]
	UnresolvedAttribute { grammar: String, context: String, attribute: String },

	#[error("{grammar}: context `{context}` references unknown keyword list `{list}`")]
	UnresolvedKeywordList { grammar: String, context: String, list: String },

	#[error("{grammar}: no default context defined")]
	NoDefaultContext { grammar: String },

	#[error("{grammar}: include cycle {}", path.join(" -> "))]
	IncludeCycle { grammar: String, path: Vec<String> },

	#[error("{grammar}: included grammar `{include}` not found: {reason}")]
	IncludeNotFound { grammar: String, include: String, reason: String },

	#[error("{grammar}: IncludeRules cycle through contexts {}", path.join(" -> "))]
	RuleIncludeCycle { grammar: String, path: Vec<String> },

	#[error("{grammar}: invalid regular expression {pattern:?} in context `{context}`: {message}")]
	InvalidRegex { grammar: String, context: String, pattern: String, message: String },

	#[error("{grammar}: rule {rule:?} in context `{context}` can match an empty string without lookAhead")]
	ZeroWidthRule { grammar: String, context: String, rule: String },

	#[error("{grammar}: context `{context}` uses %{placeholder} but {pusher} binds only {available} capture(s)")]
	DynamicCapture { grammar: String, context: String, placeholder: usize, pusher: String, available: usize },
}

impl LoadError {
	/// Name of the grammar whose definition failed to load.
	pub fn grammar(&self) -> &str {
		match self {
			Self::Xml { grammar, .. }
			| Self::MissingElement { grammar, .. }
			| Self::InvalidAttribute { grammar, .. }
			| Self::UnknownRule { grammar, .. }
			| Self::UnresolvedContext { grammar, .. }
			| Self::UnresolvedAttribute { grammar, .. }
			| Self::UnresolvedKeywordList { grammar, .. }
			| Self::NoDefaultContext { grammar }
			| Self::IncludeCycle { grammar, .. }
			| Self::IncludeNotFound { grammar, .. }
			| Self::RuleIncludeCycle { grammar, .. }
			| Self::InvalidRegex { grammar, .. }
			| Self::ZeroWidthRule { grammar, .. }
			| Self::DynamicCapture { grammar, .. } => grammar,
		}
	}
}
