use std::cmp::min;

use crate::parse::{
	parse_hex_byte,
	tokenize,
};
use crate::programmer::{
	MAX_ROM_SIZE,
	Rom,
};

use super::{
	CommandError,
	Session,
	parse_address,
};

/// `w [address]`: switch to writing mode
pub fn begin_write(session: &mut Session, args: &[&str]) -> crate::AResult<()> {
	if args.len() > 1 {
		return Err(CommandError::InvalidArgument.into());
	}
	let address = match args.first() {
		Some(token) => parse_address(token)?,
		None => session.current_address(),
	};
	session.begin_writing(address);
	Ok(())
}

/// A line in writing mode: hex bytes to store at the current address.
///
/// An invalid token rejects the whole line; an empty line leaves writing
/// mode. At most `line_capacity / 2` bytes are taken from a line, and never
/// more than fit before the end of the ROM. Filling the last byte of the ROM
/// leaves writing mode as well.
pub fn continue_write<R>(
	rom: &mut R,
	session: &mut Session,
	line_capacity: usize,
	line: &str,
) -> crate::AResult<()>
where
	R: Rom + ?Sized,
{
	let mut tokens = tokenize(line).peekable();
	if tokens.peek().is_none() {
		session.end_writing();
		return Ok(());
	}

	let address = session.current_address();
	let limit = min(line_capacity / 2, MAX_ROM_SIZE - address as usize);
	let mut staged = Vec::with_capacity(limit);
	for token in tokens {
		let byte = parse_hex_byte(token).ok_or(CommandError::InvalidHexSequence)?;
		if staged.len() < limit {
			staged.push(byte);
		}
	}

	rom.write(address, &staged);
	if address as usize + staged.len() == MAX_ROM_SIZE {
		debug!("end of ROM reached, leaving writing mode");
		session.end_writing();
	}
	session.advance(staged.len());
	Ok(())
}
