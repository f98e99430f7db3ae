/// Token separators of the command line
pub const SEPARATORS: [char; 3] = [' ', ',', '\t'];

#[derive(Clone, Copy, PartialEq, Eq, Debug, Fail)]
pub enum ParseError {
	#[fail(display = "invalid digit {:?} at position {}", digit, position)]
	InvalidDigit { position: usize, digit: char },
}

pub fn tokenize<'a>(line: &'a str) -> impl Iterator<Item = &'a str> + 'a {
	line.split(&SEPARATORS[..]).filter(|token| !token.is_empty())
}

fn radix_and_prefix(token: &[u8]) -> (u32, usize) {
	match token {
		[b'0', b'x', ..] | [b'0', b'X', ..] => (16, 2),
		[b'0', b'b', ..] | [b'0', b'B', ..] => (2, 2),
		[b'0', ..] => (8, 1),
		_ => (10, 0),
	}
}

/// Parse `0x1f` (hex), `0b101` (binary), `017` (octal) or `42` (decimal).
///
/// Overflow is not detected: the value wraps modulo 2^16, e.g. `"99999"`
/// yields 34463. An empty token (or a bare prefix like `"0x"`) is 0.
pub fn parse_u16(token: &str) -> Result<u16, ParseError> {
	let (radix, prefix) = radix_and_prefix(token.as_bytes());

	let mut value = 0u16;
	for (position, c) in token.char_indices().skip(prefix) {
		let digit = match c.to_digit(radix) {
			Some(d) => d as u16,
			None => return Err(ParseError::InvalidDigit { position, digit: c }),
		};
		value = value.wrapping_mul(radix as u16).wrapping_add(digit);
	}
	Ok(value)
}

/// Hex byte without prefix (`"a5"`, `"FF"`, `"7"`)
pub fn parse_hex_byte(token: &str) -> Option<u8> {
	if token.is_empty() {
		return None;
	}
	let mut value = 0u32;
	for c in token.chars() {
		value = value * 16 + c.to_digit(16)?;
		if value > 0xff {
			return None;
		}
	}
	Some(value as u8)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn radix_prefixes() {
		assert_eq!(parse_u16("0x1A"), Ok(26));
		assert_eq!(parse_u16("0X1a"), Ok(26));
		assert_eq!(parse_u16("012"), Ok(10));
		assert_eq!(parse_u16("0b101"), Ok(5));
		assert_eq!(parse_u16("0B101"), Ok(5));
		assert_eq!(parse_u16("42"), Ok(42));
		assert_eq!(parse_u16("0"), Ok(0));
	}

	#[test]
	fn empty_token_is_zero() {
		assert_eq!(parse_u16(""), Ok(0));
		assert_eq!(parse_u16("0x"), Ok(0));
	}

	#[test]
	fn invalid_digits() {
		assert_eq!(parse_u16("0xZZ"), Err(ParseError::InvalidDigit { position: 2, digit: 'Z' }));
		assert!(parse_u16("08").is_err());
		assert!(parse_u16("0b102").is_err());
		assert!(parse_u16("12a").is_err());
		assert!(parse_u16("-1").is_err());
	}

	// compatibility quirk: no overflow detection
	#[test]
	fn overflow_wraps() {
		assert_eq!(parse_u16("99999"), Ok(34463));
		assert_eq!(parse_u16("0x10000"), Ok(0));
		assert_eq!(parse_u16("65536"), Ok(0));
	}

	#[test]
	fn hex_bytes() {
		assert_eq!(parse_hex_byte("AA"), Some(0xaa));
		assert_eq!(parse_hex_byte("0f"), Some(0x0f));
		assert_eq!(parse_hex_byte("7"), Some(0x07));
		assert_eq!(parse_hex_byte("100"), None);
		assert_eq!(parse_hex_byte("0x1"), None);
		assert_eq!(parse_hex_byte("G0"), None);
		assert_eq!(parse_hex_byte(""), None);
	}

	#[test]
	fn separators() {
		let tokens: Vec<&str> = tokenize(" r,0x10\t\t 5 ").collect();
		assert_eq!(tokens, vec!["r", "0x10", "5"]);
		assert_eq!(tokenize(" ,\t").count(), 0);
	}
}
