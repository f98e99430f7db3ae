use std::cmp::min;
use std::io;

use crate::programmer::{
	MAX_ROM_SIZE,
	Rom,
};

use super::{
	CommandError,
	Session,
	parse_number,
};

/// `e [length]`: fill `[0, length)` with 0xff, whole ROM by default
pub fn erase<R>(
	rom: &mut R,
	session: &mut Session,
	args: &[&str],
	out: &mut dyn io::Write,
) -> crate::AResult<()>
where
	R: Rom + ?Sized,
{
	if args.len() > 1 {
		return Err(CommandError::InvalidArgument.into());
	}
	let len = match args.first() {
		Some(token) => min(parse_number(token)? as usize, MAX_ROM_SIZE),
		None => MAX_ROM_SIZE,
	};

	rom.erase(len);
	session.set_address(0);
	writeln!(out, "Erased {:04X} ({}) bytes.", len, len)?;
	Ok(())
}
