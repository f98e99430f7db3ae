#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;

macro_rules! with_context {
	(( $fmt:tt $($t:tt)* ), $e:expr) => {{
		use failure::Error;

		match (|| { $e })() {
			Ok(v) => Ok(v),
			Err(e) => {
				let e: Error = e;
				let msg = format!(concat!($fmt, ": {}") $($t)*, e);
				Err(Error::from(e.context(msg)))
			}
		}
	}};

	($msg:expr, $e:expr) => {
		with_context!(("{}", $msg), $e)
	};
}

pub type AResult<T> = Result<T, failure::Error>;

pub mod cli;
pub mod client;
pub mod command;
pub mod hal;
pub mod parse;
pub mod programmer;
pub mod sim;
pub mod tty;

pub type Firmware<H> = cli::Shell<command::Dispatcher<programmer::Programmer<H>>>;

/// Firmware stack: line editor and command dispatcher driving an EEPROM
/// programmer on `hardware`.
pub fn firmware<H>(hardware: H, line_capacity: usize) -> Firmware<H>
where
	H: hal::Hardware,
{
	let programmer = programmer::Programmer::new(hardware);
	cli::Shell::new(command::Dispatcher::new(programmer, line_capacity), line_capacity)
}
