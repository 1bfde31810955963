//! Keyword lists and word deliminators.

use rustc_hash::FxHashSet;

/// Index of a keyword list within its [`Grammar`](crate::Grammar).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeywordListId(pub(crate) u32);

impl KeywordListId {
	#[inline]
	pub fn idx(self) -> usize {
		self.0 as usize
	}
}

/// A named set of keywords.
///
/// Case-insensitive lists store their words lowercased and fold the probe the
/// same way, so membership stays a single hash lookup.
#[derive(Debug, Clone)]
pub struct KeywordList {
	pub name: Box<str>,
	words: FxHashSet<Box<str>>,
	case_sensitive: bool,
}

impl KeywordList {
	pub fn new<I, S>(name: impl Into<Box<str>>, words: I, case_sensitive: bool) -> Self
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let words = words
			.into_iter()
			.map(|w| {
				let w = w.as_ref();
				if case_sensitive { w.into() } else { w.to_lowercase().into_boxed_str() }
			})
			.collect();
		Self {
			name: name.into(),
			words,
			case_sensitive,
		}
	}

	pub fn contains(&self, word: &str) -> bool {
		if self.case_sensitive {
			self.words.contains(word)
		} else {
			self.words.contains(word.to_lowercase().as_str())
		}
	}

	pub fn case_sensitive(&self) -> bool {
		self.case_sensitive
	}

	pub fn len(&self) -> usize {
		self.words.len()
	}

	pub fn is_empty(&self) -> bool {
		self.words.is_empty()
	}
}

const DEFAULT_DELIMINATORS: &str = " \t.():!+,-<=>%&*/;?[]^{|}~\\";

/// Characters that end a word for `keyword`, `WordDetect` and numeric rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deliminators {
	ascii: [bool; 128],
	extra: FxHashSet<char>,
}

impl Default for Deliminators {
	fn default() -> Self {
		Self::new("", "")
	}
}

impl Deliminators {
	/// Builds the default set, minus `weak` and plus `additional`.
	pub fn new(weak: &str, additional: &str) -> Self {
		let mut ascii = [false; 128];
		let mut extra = FxHashSet::default();
		for ch in DEFAULT_DELIMINATORS.chars().chain(additional.chars()) {
			if ch.is_ascii() {
				ascii[ch as usize] = true;
			} else {
				extra.insert(ch);
			}
		}
		for ch in weak.chars() {
			if ch.is_ascii() {
				ascii[ch as usize] = false;
			} else {
				extra.remove(&ch);
			}
		}
		Self { ascii, extra }
	}

	#[inline]
	pub fn contains(&self, ch: char) -> bool {
		if ch.is_ascii() {
			self.ascii[ch as usize]
		} else {
			ch.is_whitespace() || self.extra.contains(&ch)
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn case_insensitive_list_folds_both_sides() {
		let list = KeywordList::new("kw", ["SELECT", "From"], false);
		assert!(list.contains("select"));
		assert!(list.contains("FROM"));
		assert!(!list.contains("where"));
	}

	#[test]
	fn case_sensitive_list_is_exact() {
		let list = KeywordList::new("kw", ["if"], true);
		assert!(list.contains("if"));
		assert!(!list.contains("IF"));
	}

	#[test]
	fn deliminator_overrides() {
		let delims = Deliminators::new(".", "$");
		assert!(!delims.contains('.'));
		assert!(delims.contains('$'));
		assert!(delims.contains(' '));
		assert!(!delims.contains('a'));
		assert!(delims.contains('\u{3000}'));
	}
}
