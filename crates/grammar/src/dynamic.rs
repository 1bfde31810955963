//! Placeholder handling for dynamic rules.
//!
//! A dynamic rule's strings may contain `%1`..`%9`. They are bound from the
//! captures stored on the stack frame of the context the rule lives in, which
//! were taken from the regex match that pushed that context. Substitution is
//! resolved lazily at match time; contexts are never copied per push.

use std::borrow::Cow;
use std::sync::Arc;

use fancy_regex::Regex;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

/// Dynamic regexes compiled per distinct binding are kept up to this count.
const REGEX_CACHE_CAPACITY: usize = 512;

/// Returns the highest `%N` placeholder in `template`, or 0 if none.
pub fn max_placeholder(template: &str) -> usize {
	placeholders(template).max().unwrap_or(0)
}

fn placeholders(template: &str) -> impl Iterator<Item = usize> + '_ {
	let bytes = template.as_bytes();
	bytes.windows(2).filter_map(|w| match w {
		[b'%', d @ b'1'..=b'9'] => Some((d - b'0') as usize),
		_ => None,
	})
}

/// Replaces every `%N` with `captures[N]` (index 0 is the whole match).
///
/// Missing or non-participating groups substitute as empty. With `escape`
/// set the inserted text is escaped for use inside a regular expression.
pub fn substitute<'a, S: AsRef<str>>(template: &'a str, captures: &[S], escape: bool) -> Cow<'a, str> {
	if max_placeholder(template) == 0 {
		return Cow::Borrowed(template);
	}

	let mut out = String::with_capacity(template.len() + 16);
	let mut chars = template.chars().peekable();
	while let Some(ch) = chars.next() {
		if ch == '%'
			&& let Some(&d) = chars.peek()
			&& let Some(n) = d.to_digit(10).filter(|n| *n > 0)
		{
			chars.next();
			let value = captures.get(n as usize).map(AsRef::as_ref).unwrap_or("");
			if escape {
				escape_regex_into(value, &mut out);
			} else {
				out.push_str(value);
			}
		} else {
			out.push(ch);
		}
	}
	Cow::Owned(out)
}

fn escape_regex_into(text: &str, out: &mut String) {
	for ch in text.chars() {
		if matches!(
			ch,
			'\\' | '.' | '+' | '*' | '?' | '(' | ')' | '|' | '[' | ']' | '{' | '}' | '^' | '$' | '#' | '&' | '-' | '~'
		) {
			out.push('\\');
		}
		out.push(ch);
	}
}

/// Compiles a definition regex, honoring the rule's case-insensitivity.
pub fn compile_regex(source: &str, insensitive: bool) -> Result<Regex, fancy_regex::Error> {
	if insensitive {
		Regex::new(&format!("(?i){source}"))
	} else {
		Regex::new(source)
	}
}

/// Compiled dynamic regexes keyed by their substituted source.
///
/// Invalid substitutions are cached as `None` so a broken binding is not
/// recompiled on every column.
#[derive(Default)]
pub(crate) struct RegexCache {
	compiled: Mutex<FxHashMap<(Box<str>, bool), Option<Arc<Regex>>>>,
}

impl RegexCache {
	pub(crate) fn get(&self, source: &str, insensitive: bool) -> Option<Arc<Regex>> {
		let mut compiled = self.compiled.lock();
		if let Some(hit) = compiled.get(&(Box::from(source), insensitive)) {
			return hit.clone();
		}

		let regex = match compile_regex(source, insensitive) {
			Ok(regex) => Some(Arc::new(regex)),
			Err(error) => {
				tracing::trace!(pattern = source, %error, "dynamic regex failed to compile");
				None
			}
		};

		if compiled.len() >= REGEX_CACHE_CAPACITY {
			compiled.clear();
		}
		compiled.insert((source.into(), insensitive), regex.clone());
		regex
	}
}

impl std::fmt::Debug for RegexCache {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RegexCache").field("entries", &self.compiled.lock().len()).finish()
	}
}
