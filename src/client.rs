//! Host side of the line protocol: send a command line, collect everything up
//! to the next prompt.
//!
//! The firmware echoes what it receives; responses are returned without the
//! echo and without the prompt.

use std::io::{
	self,
	Read,
	Write,
};
use std::path::Path;
use std::process::{
	Child,
	ChildStdin,
	ChildStdout,
	Command,
	Stdio,
};

use crate::programmer::MAX_ROM_SIZE;

pub const PROMPT: &str = "> ";
/// bytes per line in writing mode (3 characters each)
pub const WRITE_CHUNK: usize = 64;

pub trait Transport: Read + Write {}

impl<T: Read + Write + ?Sized> Transport for T {}

pub fn write_prompt(address: u16) -> String {
	format!("w {:04X} ", address)
}

fn strip_response<'a>(received: &'a str, command: &str, prompt: &str) -> &'a str {
	let text = received.strip_suffix(prompt).unwrap_or(received);
	let text = text.strip_prefix(command).unwrap_or(text);
	let text = text.strip_prefix('\n').unwrap_or(text);
	text.strip_suffix('\n').unwrap_or(text)
}

pub struct Client<T: Transport> {
	transport: T,
}

impl<T: Transport> Client<T> {
	pub fn new(transport: T) -> Self {
		Client { transport }
	}

	pub fn into_inner(self) -> T {
		self.transport
	}

	/// Read until the received text ends with `suffix`; returns all of it
	/// (carriage returns removed).
	pub fn expect(&mut self, suffix: &str) -> crate::AResult<String> {
		let mut received = Vec::new();
		let mut buf = [0u8; 1024];
		while !received.ends_with(suffix.as_bytes()) {
			let len = match self.transport.read(&mut buf) {
				Ok(len) => len,
				Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
				Err(e) => return Err(e.into()),
			};
			ensure!(len > 0, "connection closed while waiting for {:?}", suffix);
			received.extend(buf[..len].iter().filter(|&&b| b != b'\r'));
		}
		Ok(String::from_utf8_lossy(&received).into_owned())
	}

	pub fn wait_prompt(&mut self) -> crate::AResult<String> {
		self.expect(PROMPT)
	}

	/// run a command that ends with `prompt`
	pub fn exec_until(&mut self, command: &str, prompt: &str) -> crate::AResult<String> {
		trace!("> {:?}", command);
		self.transport.write_all(command.as_bytes())?;
		self.transport.write_all(b"\n")?;
		self.transport.flush()?;
		let received = self.expect(prompt)?;
		Ok(strip_response(&received, command, prompt).to_owned())
	}

	pub fn exec(&mut self, command: &str) -> crate::AResult<String> {
		self.exec_until(command, PROMPT)
	}

	pub fn firmware_version(&mut self) -> crate::AResult<String> {
		self.exec("v")
	}

	pub fn read_rom(&mut self, address: u16, len: usize) -> crate::AResult<Vec<u8>> {
		ensure!(
			address as usize + len <= MAX_ROM_SIZE,
			"read beyond end of ROM: {:04x} + {:x}",
			address,
			len
		);
		if 0 == len {
			return Ok(Vec::new());
		}
		let dump = self.exec(&format!("r {:#x} {:#x}", address, len))?;
		let (start, data) = parse_hex_dump(&dump)?;
		ensure!(
			start == address && data.len() == len,
			"unexpected read response: {} bytes at {:04x} (expected {} bytes at {:04x})",
			data.len(),
			start,
			len,
			address
		);
		Ok(data)
	}

	/// Write `image` through writing mode, `WRITE_CHUNK` bytes per line.
	///
	/// The firmware leaves writing mode by itself once the last ROM byte is
	/// written; otherwise an empty line ends it.
	pub fn write_rom(&mut self, address: u16, image: &[u8]) -> crate::AResult<()> {
		ensure!(
			address as usize + image.len() <= MAX_ROM_SIZE,
			"image doesn't fit: {:04x} + {:x}",
			address,
			image.len()
		);

		let response = self.exec_until(&format!("w {:#x}", address), &write_prompt(address))?;
		ensure!(response.is_empty(), "write command failed: {}", response);

		let mut current = address as usize;
		for chunk in image.chunks(WRITE_CHUNK) {
			let line = chunk.iter().map(|b| format!("{:02X}", b)).collect::<Vec<_>>().join(" ");
			let next = current + chunk.len();
			let prompt = if next == MAX_ROM_SIZE {
				PROMPT.to_owned()
			} else {
				write_prompt(next as u16)
			};
			let response = self.exec_until(&line, &prompt)?;
			ensure!(response.is_empty(), "write at {:04x} failed: {}", current, response);
			current = next;
		}

		if current < MAX_ROM_SIZE {
			let response = self.exec("")?;
			ensure!(response.is_empty(), "leaving writing mode failed: {}", response);
		}
		Ok(())
	}
}

/// Parse the output of the read command: returns the address of the first
/// byte and all bytes (rows must be contiguous).
pub fn parse_hex_dump(text: &str) -> crate::AResult<(u16, Vec<u8>)> {
	let mut start: Option<usize> = None;
	let mut data = Vec::new();

	for line in text.lines().filter(|line| !line.trim().is_empty()) {
		let sep = match line.find(": ") {
			Some(sep) => sep,
			None => bail!("invalid hex dump line: {:?}", line),
		};
		let row = with_context!(("invalid row address in {:?}", line),
			Ok(usize::from_str_radix(&line[..sep], 16)?)
		)?;

		for (column, cell) in line[sep + 2..].split_whitespace().enumerate() {
			if ".." == cell {
				continue;
			}
			let byte = with_context!(("invalid byte {:?} in {:?}", cell, line),
				Ok(u8::from_str_radix(cell, 16)?)
			)?;
			let address = row + column;
			match start {
				None => start = Some(address),
				Some(start) => {
					let expected = start + data.len();
					ensure!(expected == address, "hex dump not contiguous at {:04x}", address)
				},
			}
			data.push(byte);
		}
	}

	Ok((start.unwrap_or(0) as u16, data))
}

/// The emulator as child process, talking through its stdin / stdout.
pub struct ChildTransport {
	child: Child,
	stdin: Option<ChildStdin>,
	stdout: ChildStdout,
}

impl ChildTransport {
	pub fn spawn(program: &Path, args: &[&str]) -> crate::AResult<Self> {
		with_context!(("couldn't start emulator {}", program.display()), {
			let mut child = Command::new(program)
				.args(args)
				.stdin(Stdio::piped())
				.stdout(Stdio::piped())
				.spawn()?;
			let stdin = child.stdin.take().ok_or_else(|| format_err!("no stdin pipe"))?;
			let stdout = child.stdout.take().ok_or_else(|| format_err!("no stdout pipe"))?;
			Ok(ChildTransport {
				child,
				stdin: Some(stdin),
				stdout,
			})
		})
	}
}

impl Read for ChildTransport {
	fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
		self.stdout.read(buf)
	}
}

impl Write for ChildTransport {
	fn write(&mut self, data: &[u8]) -> io::Result<usize> {
		match self.stdin {
			Some(ref mut stdin) => stdin.write(data),
			None => Err(io::Error::new(io::ErrorKind::BrokenPipe, "emulator input closed")),
		}
	}

	fn flush(&mut self) -> io::Result<()> {
		match self.stdin {
			Some(ref mut stdin) => stdin.flush(),
			None => Ok(()),
		}
	}
}

impl Drop for ChildTransport {
	fn drop(&mut self) {
		// end of input makes the emulator exit (and save its image)
		self.stdin.take();
		if let Err(e) = self.child.wait() {
			warn!("Failed waiting for emulator: {}", e);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::VecDeque;

	/// replays canned device output, records what was sent
	struct Scripted {
		replies: VecDeque<Vec<u8>>,
		sent: Vec<u8>,
	}

	impl Scripted {
		fn new(replies: &[&str]) -> Self {
			Scripted {
				replies: replies.iter().map(|r| r.as_bytes().to_vec()).collect(),
				sent: Vec::new(),
			}
		}
	}

	impl Read for Scripted {
		fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
			match self.replies.pop_front() {
				None => Ok(0),
				Some(reply) => {
					assert!(reply.len() <= buf.len());
					buf[..reply.len()].copy_from_slice(&reply);
					Ok(reply.len())
				},
			}
		}
	}

	impl Write for Scripted {
		fn write(&mut self, data: &[u8]) -> io::Result<usize> {
			self.sent.extend_from_slice(data);
			Ok(data.len())
		}

		fn flush(&mut self) -> io::Result<()> {
			Ok(())
		}
	}

	#[test]
	fn exec_strips_echo_and_prompt() {
		let mut client = Client::new(Scripted::new(&["\r\n> ", "v\r\nprog28c 0.1", ".0\r\n> "]));
		client.wait_prompt().unwrap();
		assert_eq!(client.exec("v").unwrap(), "prog28c 0.1.0");
		assert_eq!(client.into_inner().sent, b"v\n");
	}

	#[test]
	fn exec_empty_command() {
		let mut client = Client::new(Scripted::new(&["\n> "]));
		assert_eq!(client.exec("").unwrap(), "");
	}

	#[test]
	fn closed_connection() {
		let mut client = Client::new(Scripted::new(&["partial"]));
		assert!(client.wait_prompt().is_err());
	}

	#[test]
	fn hex_dump_parsing() {
		let (start, data) = parse_hex_dump("0010: .. .. .. AA BB \n").unwrap();
		assert_eq!(start, 0x13);
		assert_eq!(data, vec![0xaa, 0xbb]);
		// gap between 0x15 and 0x20
		assert!(parse_hex_dump("0010: .. .. .. AA BB \n0020: CC \n").is_err());

		let dump = "0010: .. .. .. .. .. .. .. .. .. .. .. .. .. .. 01 02 \n\
			0020: 03 \n";
		let (start, data) = parse_hex_dump(dump).unwrap();
		assert_eq!(start, 0x1e);
		assert_eq!(data, vec![1, 2, 3]);

		assert!(parse_hex_dump("0010: ZZ \n").is_err());
		assert!(parse_hex_dump("garbage\n").is_err());
		assert_eq!(parse_hex_dump("").unwrap(), (0, Vec::new()));
	}

	#[test]
	fn write_rom_lines() {
		let mut client = Client::new(Scripted::new(&[
			"w 0x10\nw 0010 ",
			"01 02 03\nw 0013 ",
			"\n> ",
		]));
		client.write_rom(0x10, &[1, 2, 3]).unwrap();
		assert_eq!(client.into_inner().sent, b"w 0x10\n01 02 03\n\n");
	}

	#[test]
	fn write_rom_up_to_the_end() {
		let mut client = Client::new(Scripted::new(&["w 0x7ffe\nw 7FFE ", "AA BB\n> "]));
		client.write_rom(0x7ffe, &[0xaa, 0xbb]).unwrap();
		// no empty line: the firmware is back at the command prompt already
		assert_eq!(client.into_inner().sent, b"w 0x7ffe\nAA BB\n");
	}
}
