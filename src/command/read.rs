use std::cmp::min;
use std::io;

use crate::programmer::{
	MAX_ROM_SIZE,
	Rom,
};

use super::{
	CommandError,
	Session,
	parse_address,
	parse_number,
};

pub const ROW_SIZE: usize = 16;
// without a count, read up to the next block boundary
const DEFAULT_BLOCK: usize = 256;

/// `r [address] [count]`
pub fn read<R>(
	rom: &mut R,
	session: &mut Session,
	args: &[&str],
	out: &mut dyn io::Write,
) -> crate::AResult<()>
where
	R: Rom + ?Sized,
{
	if args.len() > 2 {
		return Err(CommandError::InvalidArgument.into());
	}
	let address = match args.get(0) {
		Some(token) => parse_address(token)?,
		None => session.current_address(),
	};
	let count = match args.get(1) {
		Some(token) => parse_number(token)? as usize,
		None => DEFAULT_BLOCK - (address as usize % DEFAULT_BLOCK),
	};
	let count = min(count, MAX_ROM_SIZE - address as usize);

	let mut data = vec![0u8; count];
	rom.read(address, &mut data);
	write_hex_dump(out, address, &data)?;

	session.set_address(address);
	session.advance(count);
	Ok(())
}

/// Rows start at `ROW_SIZE` aligned addresses; columns before `address` in
/// the first row are shown as `..`.
pub fn write_hex_dump(out: &mut dyn io::Write, address: u16, data: &[u8]) -> io::Result<()> {
	for (offset, byte) in data.iter().enumerate() {
		let addr = address as usize + offset;
		let column = addr % ROW_SIZE;
		if 0 == offset || 0 == column {
			write!(out, "{:04X}: ", addr - column)?;
			if 0 == offset {
				for _ in 0..column {
					write!(out, ".. ")?;
				}
			}
		}
		write!(out, "{:02X} ", byte)?;
		if ROW_SIZE - 1 == column || data.len() - 1 == offset {
			writeln!(out)?;
		}
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	fn dump(address: u16, data: &[u8]) -> String {
		let mut out = Vec::new();
		write_hex_dump(&mut out, address, data).unwrap();
		String::from_utf8(out).unwrap()
	}

	#[test]
	fn aligned_rows() {
		let data: Vec<u8> = (0..18).collect();
		assert_eq!(dump(0x20, &data),
			"0020: 00 01 02 03 04 05 06 07 08 09 0A 0B 0C 0D 0E 0F \n\
			 0030: 10 11 \n");
	}

	#[test]
	fn unaligned_start() {
		assert_eq!(dump(0x13, &[0xaa, 0xbb, 0xcc]), "0010: .. .. .. AA BB CC \n");
		assert_eq!(dump(0x0e, &[1, 2, 3, 4]),
			"0000: .. .. .. .. .. .. .. .. .. .. .. .. .. .. 01 02 \n\
			 0010: 03 04 \n");
	}

	#[test]
	fn nothing_to_dump() {
		assert_eq!(dump(0x10, &[]), "");
	}
}
