//! Fixed-shape literal scanners for the numeric and C-literal rules.
//!
//! Each scanner looks at `chars[pos..]` and returns the end column of the
//! literal, or `None`.

fn digits(chars: &[char], mut pos: usize, radix: u32) -> usize {
	while chars.get(pos).is_some_and(|c| c.is_digit(radix)) {
		pos += 1;
	}
	pos
}

/// `[0-9]+`
pub(super) fn int(chars: &[char], pos: usize) -> Option<usize> {
	let end = digits(chars, pos, 10);
	(end > pos).then_some(end)
}

/// `[0-9]*\.[0-9]*` with at least one digit, or digits with an exponent,
/// each optionally followed by `[eE][+-]?[0-9]+`.
pub(super) fn float(chars: &[char], pos: usize) -> Option<usize> {
	let int_end = digits(chars, pos, 10);
	let mut end = int_end;
	let mut had_point = false;
	if chars.get(end) == Some(&'.') {
		had_point = true;
		end = digits(chars, end + 1, 10);
	}
	let digit_count = end - pos - usize::from(had_point);
	if digit_count == 0 {
		return None;
	}

	let exponent = exponent(chars, end);
	match (had_point, exponent) {
		(_, Some(exp_end)) => Some(exp_end),
		(true, None) => Some(end),
		(false, None) => None,
	}
}

fn exponent(chars: &[char], pos: usize) -> Option<usize> {
	if !matches!(chars.get(pos), Some('e' | 'E')) {
		return None;
	}
	let mut start = pos + 1;
	if matches!(chars.get(start), Some('+' | '-')) {
		start += 1;
	}
	let end = digits(chars, start, 10);
	(end > start).then_some(end)
}

fn int_suffix(chars: &[char], mut pos: usize) -> usize {
	while matches!(chars.get(pos), Some('l' | 'L' | 'u' | 'U')) {
		pos += 1;
	}
	pos
}

/// `0[0-7]+` with an optional `[lLuU]` suffix.
pub(super) fn c_octal(chars: &[char], pos: usize) -> Option<usize> {
	if chars.get(pos) != Some(&'0') {
		return None;
	}
	let end = digits(chars, pos + 1, 8);
	(end > pos + 1).then(|| int_suffix(chars, end))
}

/// `0[xX][0-9a-fA-F]+` with an optional `[lLuU]` suffix.
pub(super) fn c_hex(chars: &[char], pos: usize) -> Option<usize> {
	if chars.get(pos) != Some(&'0') || !matches!(chars.get(pos + 1), Some('x' | 'X')) {
		return None;
	}
	let end = digits(chars, pos + 2, 16);
	(end > pos + 2).then(|| int_suffix(chars, end))
}

/// A C escape sequence: `\n`-style, `\xHH..` or up to three octal digits.
pub(super) fn c_string_char(chars: &[char], pos: usize) -> Option<usize> {
	if chars.get(pos) != Some(&'\\') {
		return None;
	}
	match chars.get(pos + 1)? {
		'a' | 'b' | 'e' | 'f' | 'n' | 'r' | 't' | 'v' | '"' | '\'' | '?' | '\\' => Some(pos + 2),
		'x' => {
			let end = digits(chars, pos + 2, 16);
			(end > pos + 2).then_some(end)
		}
		c if c.is_digit(8) => {
			let mut end = pos + 1;
			while end < pos + 4 && chars.get(end).is_some_and(|c| c.is_digit(8)) {
				end += 1;
			}
			Some(end)
		}
		_ => None,
	}
}

/// A C character literal: `'x'` or `'\n'`.
pub(super) fn c_char(chars: &[char], pos: usize) -> Option<usize> {
	if chars.get(pos) != Some(&'\'') {
		return None;
	}
	let body = match chars.get(pos + 1)? {
		'\\' => c_string_char(chars, pos + 1)?,
		'\'' => return None,
		_ => pos + 2,
	};
	(chars.get(body) == Some(&'\'')).then_some(body + 1)
}
