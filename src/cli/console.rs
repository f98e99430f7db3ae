use std::collections::VecDeque;
use std::io::{
	self,
	Read,
	Write,
};

/// Byte channel to the terminal: input one byte at a time, output through
/// `io::Write`.
pub trait Console: io::Write {
	/// Next input byte, `None` if nothing arrived (yet).
	///
	/// The end of input is reported as `io::ErrorKind::UnexpectedEof`.
	fn getch(&mut self) -> io::Result<Option<u8>>;
}

pub fn is_end_of_input(e: &failure::Error) -> bool {
	match e.downcast_ref::<io::Error>() {
		Some(e) => e.kind() == io::ErrorKind::UnexpectedEof,
		None => false,
	}
}

fn end_of_input() -> io::Error {
	io::Error::new(io::ErrorKind::UnexpectedEof, "end of console input")
}

/// stdin / stdout; output is flushed immediately so echo shows up
pub struct StdioConsole {
	stdin: io::Stdin,
	stdout: io::Stdout,
}

impl StdioConsole {
	pub fn new() -> Self {
		StdioConsole {
			stdin: io::stdin(),
			stdout: io::stdout(),
		}
	}
}

impl Default for StdioConsole {
	fn default() -> Self {
		Self::new()
	}
}

impl Console for StdioConsole {
	fn getch(&mut self) -> io::Result<Option<u8>> {
		let mut buf = [0u8];
		match self.stdin.lock().read(&mut buf) {
			Ok(0) => Err(end_of_input()),
			Ok(_) => Ok(Some(buf[0])),
			Err(ref e) if e.kind() == io::ErrorKind::Interrupted => Ok(None),
			Err(e) => Err(e),
		}
	}
}

impl io::Write for StdioConsole {
	fn write(&mut self, data: &[u8]) -> io::Result<usize> {
		let mut out = self.stdout.lock();
		out.write_all(data)?;
		out.flush()?;
		Ok(data.len())
	}

	fn flush(&mut self) -> io::Result<()> {
		self.stdout.flush()
	}
}

/// Scripted input and captured output
#[derive(Clone, Default, Debug)]
pub struct MemoryConsole {
	input: VecDeque<u8>,
	output: Vec<u8>,
}

impl MemoryConsole {
	pub fn new(input: &[u8]) -> Self {
		MemoryConsole {
			input: input.iter().cloned().collect(),
			output: Vec::new(),
		}
	}

	pub fn pending_input(&self) -> usize {
		self.input.len()
	}

	pub fn output(&self) -> &[u8] {
		&self.output
	}

	/// output since the last call, lossy UTF-8
	pub fn take_output(&mut self) -> String {
		let output = String::from_utf8_lossy(&self.output).into_owned();
		self.output.clear();
		output
	}
}

impl Console for MemoryConsole {
	fn getch(&mut self) -> io::Result<Option<u8>> {
		match self.input.pop_front() {
			Some(ch) => Ok(Some(ch)),
			None => Err(end_of_input()),
		}
	}
}

impl io::Write for MemoryConsole {
	fn write(&mut self, data: &[u8]) -> io::Result<usize> {
		self.output.extend_from_slice(data);
		Ok(data.len())
	}

	fn flush(&mut self) -> io::Result<()> {
		Ok(())
	}
}
