use std::io;

use crate::cli::LineHandler;
use crate::parse::{
	parse_u16,
	tokenize,
};
use crate::programmer::{
	MAX_ROM_SIZE,
	Rom,
};

mod erase;
mod error;
mod read;
mod session;
mod write;

pub use self::error::CommandError;
pub use self::read::{
	ROW_SIZE,
	write_hex_dump,
};
pub use self::session::{
	Mode,
	Session,
};

pub const VERSION: &str = concat!(env!("CARGO_PKG_NAME"), " ", env!("CARGO_PKG_VERSION"));

pub const HELP: &str = "\
h - help
r [start_address] [count] - read ROM
w [start_address] - write ROM
e [length] - erase ROM
l - enable SDP (lock)
u - disable SDP (unlock)
b - switch to binary mode
v - print version
";

const OK: &str = "OK";

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Verb {
	Help,
	Read,
	Write,
	Erase,
	Lock,
	Unlock,
	Binary,
	Version,
}

impl Verb {
	/// case-insensitive, single letter
	pub fn parse(token: &str) -> Option<Verb> {
		match token.to_ascii_lowercase().as_str() {
			"h" => Some(Verb::Help),
			"r" => Some(Verb::Read),
			"w" => Some(Verb::Write),
			"e" => Some(Verb::Erase),
			"l" => Some(Verb::Lock),
			"u" => Some(Verb::Unlock),
			"b" => Some(Verb::Binary),
			"v" => Some(Verb::Version),
			_ => None,
		}
	}
}

fn parse_number(token: &str) -> Result<u16, CommandError> {
	parse_u16(token).map_err(|_| CommandError::InvalidArgument)
}

fn parse_address(token: &str) -> Result<u16, CommandError> {
	let address = parse_number(token)?;
	if address as usize >= MAX_ROM_SIZE {
		return Err(CommandError::InvalidAddress);
	}
	Ok(address)
}

fn no_args(args: &[&str]) -> Result<(), CommandError> {
	if !args.is_empty() {
		return Err(CommandError::InvalidArgument);
	}
	Ok(())
}

/// Routes command lines to the handlers, threading the `Session` through.
pub struct Dispatcher<R: Rom> {
	rom: R,
	session: Session,
	line_capacity: usize,
}

impl<R: Rom> Dispatcher<R> {
	/// `line_capacity` must match the line editor's buffer
	pub fn new(rom: R, line_capacity: usize) -> Self {
		Dispatcher {
			rom,
			session: Session::new(),
			line_capacity,
		}
	}

	pub fn session(&self) -> &Session {
		&self.session
	}

	pub fn rom(&mut self) -> &mut R {
		&mut self.rom
	}

	pub fn into_rom(self) -> R {
		self.rom
	}

	/// Command errors are printed; only output failures are returned.
	pub fn execute(&mut self, line: &str, out: &mut dyn io::Write) -> crate::AResult<()> {
		let result = match self.session.mode() {
			Mode::Writing => {
				write::continue_write(&mut self.rom, &mut self.session, self.line_capacity, line)
			},
			Mode::Normal => self.execute_command(line, out),
		};
		match result {
			Ok(()) => Ok(()),
			Err(e) => match e.downcast::<CommandError>() {
				Ok(e) => {
					debug!("command {:?} failed: {:?}", line, e);
					writeln!(out, "{}", e)?;
					Ok(())
				},
				Err(e) => Err(e),
			},
		}
	}

	fn execute_command(&mut self, line: &str, out: &mut dyn io::Write) -> crate::AResult<()> {
		let mut tokens = tokenize(line);
		let verb = match tokens.next() {
			None => return Ok(()),
			Some(verb) => verb,
		};
		let args: Vec<&str> = tokens.collect();
		let verb = Verb::parse(verb).ok_or(CommandError::UnknownCommand)?;
		debug!("{:?} {:?}", verb, args);

		match verb {
			Verb::Help => {
				no_args(&args)?;
				out.write_all(HELP.as_bytes())?;
			},
			Verb::Read => read::read(&mut self.rom, &mut self.session, &args, out)?,
			Verb::Write => write::begin_write(&mut self.session, &args)?,
			Verb::Erase => erase::erase(&mut self.rom, &mut self.session, &args, out)?,
			Verb::Lock => {
				no_args(&args)?;
				self.rom.enable_protection();
				writeln!(out, "{}", OK)?;
			},
			Verb::Unlock => {
				no_args(&args)?;
				self.rom.disable_protection();
				writeln!(out, "{}", OK)?;
			},
			Verb::Binary => return Err(CommandError::NotImplemented.into()),
			Verb::Version => {
				no_args(&args)?;
				writeln!(out, "{}", VERSION)?;
			},
		}
		Ok(())
	}
}

impl<R: Rom> LineHandler for Dispatcher<R> {
	fn handle_line(&mut self, line: &str, out: &mut dyn io::Write) -> crate::AResult<()> {
		self.execute(line, out)
	}

	fn prompt(&self) -> String {
		match self.session.mode() {
			Mode::Normal => "> ".into(),
			Mode::Writing => format!("w {:04X} ", self.session.current_address()),
		}
	}

	// an empty line ends writing mode
	fn takes_empty_line(&self) -> bool {
		self.session.mode() == Mode::Writing
	}
}
