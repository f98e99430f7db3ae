use std::io::{
	self,
	Write,
};

use super::Console;

pub const DEFAULT_LINE_CAPACITY: usize = 512;

const BACKSPACE: u8 = 0x08;
const TAB: u8 = 0x09;
const ESC: u8 = 0x1b;
const DELETE: u8 = 0x7f;

/// Receiver of complete lines
pub trait LineHandler {
	fn handle_line(&mut self, line: &str, out: &mut dyn io::Write) -> crate::AResult<()>;

	/// printed after each handled line
	fn prompt(&self) -> String;

	/// whether an empty line is passed to `handle_line` instead of only
	/// printing a fresh prompt
	fn takes_empty_line(&self) -> bool {
		false
	}
}

/// Echoing line editor: printable characters, backspace, tab as space.
///
/// `ESC [` starts a CSI sequence (cursor keys etc.) that gets dropped. The
/// editor blocks on the console until the final byte of the sequence arrives,
/// so a truncated sequence stalls input processing.
#[derive(Clone, Debug)]
pub struct LineEditor {
	buffer: Vec<u8>,
	capacity: usize,
	last_is_escape: bool,
}

impl LineEditor {
	/// `capacity` includes the slot C firmware needs for the terminator, so
	/// lines hold at most `capacity - 1` characters
	pub fn new(capacity: usize) -> Self {
		assert!(capacity >= 2);
		LineEditor {
			buffer: Vec::with_capacity(capacity),
			capacity,
			last_is_escape: false,
		}
	}

	pub fn capacity(&self) -> usize {
		self.capacity
	}

	/// characters typed so far
	pub fn line(&self) -> &[u8] {
		&self.buffer
	}

	pub fn start<C, H>(&mut self, console: &mut C, handler: &H) -> io::Result<()>
	where
		C: Console,
		H: LineHandler + ?Sized,
	{
		self.buffer.clear();
		self.last_is_escape = false;
		write!(console, "\n{}", handler.prompt())
	}

	/// Consume (at most) one byte from the console.
	pub fn process<C, H>(&mut self, console: &mut C, handler: &mut H) -> crate::AResult<()>
	where
		C: Console,
		H: LineHandler + ?Sized,
	{
		let ch = match console.getch()? {
			None => return Ok(()),
			Some(ch) => ch,
		};

		if self.last_is_escape {
			self.last_is_escape = false;
			if b'[' == ch {
				skip_csi(console)?;
			}
			return Ok(());
		}

		match ch {
			b'\r' => (),
			b'\n' => {
				if !self.buffer.is_empty() || handler.takes_empty_line() {
					console.write_all(b"\n")?;
					self.dispatch(console, handler)?;
				} else {
					write!(console, "\n{}", handler.prompt())?;
				}
			},
			ESC => self.last_is_escape = true,
			BACKSPACE | DELETE => {
				if self.buffer.pop().is_some() {
					console.write_all(b"\x08 \x08")?;
				}
			},
			TAB => self.append(console, b' ')?,
			_ => self.append(console, ch)?,
		}
		Ok(())
	}

	fn append<C: Console>(&mut self, console: &mut C, ch: u8) -> io::Result<()> {
		if (0x20..=0x7e).contains(&ch) && self.buffer.len() < self.capacity - 1 {
			self.buffer.push(ch);
			console.write_all(&[ch])?;
		}
		Ok(())
	}

	fn dispatch<C, H>(&mut self, console: &mut C, handler: &mut H) -> crate::AResult<()>
	where
		C: Console,
		H: LineHandler + ?Sized,
	{
		// only printable ASCII in the buffer
		let line: String = self.buffer.drain(..).map(char::from).collect();
		handler.handle_line(&line, console)?;
		console.write_all(handler.prompt().as_bytes())?;
		Ok(())
	}
}

// CSI: parameter and intermediate bytes until a final byte in 0x40..=0x7e
fn skip_csi<C: Console>(console: &mut C) -> io::Result<()> {
	loop {
		if let Some(ch) = console.getch()? {
			if (0x40..=0x7e).contains(&ch) {
				return Ok(());
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::cli::MemoryConsole;

	#[derive(Default)]
	struct Recorder {
		lines: Vec<String>,
		empty_lines: bool,
	}

	impl LineHandler for Recorder {
		fn handle_line(&mut self, line: &str, out: &mut dyn io::Write) -> crate::AResult<()> {
			self.lines.push(line.into());
			write!(out, "[{}]", line)?;
			Ok(())
		}

		fn prompt(&self) -> String {
			"> ".into()
		}

		fn takes_empty_line(&self) -> bool {
			self.empty_lines
		}
	}

	fn feed(editor: &mut LineEditor, handler: &mut Recorder, input: &[u8]) -> String {
		let mut console = MemoryConsole::new(input);
		while console.pending_input() > 0 {
			editor.process(&mut console, handler).unwrap();
		}
		console.take_output()
	}

	#[test]
	fn echo_and_dispatch() {
		let mut editor = LineEditor::new(16);
		let mut handler = Recorder::default();
		let out = feed(&mut editor, &mut handler, b"r 10\r\n");
		assert_eq!(handler.lines, vec!["r 10"]);
		assert_eq!(out, "r 10\n[r 10]> ");
		assert!(editor.line().is_empty());
	}

	#[test]
	fn empty_line_reprompts() {
		let mut editor = LineEditor::new(16);
		let mut handler = Recorder::default();
		assert_eq!(feed(&mut editor, &mut handler, b"\n"), "\n> ");
		assert!(handler.lines.is_empty());

		handler.empty_lines = true;
		assert_eq!(feed(&mut editor, &mut handler, b"\n"), "\n[]> ");
		assert_eq!(handler.lines, vec![""]);
	}

	#[test]
	fn backspace_and_tab() {
		let mut editor = LineEditor::new(16);
		let mut handler = Recorder::default();
		let out = feed(&mut editor, &mut handler, b"rx\x08\x7f\x7fw\t1\n");
		assert_eq!(handler.lines, vec!["w 1"]);
		assert_eq!(out, "rx\x08 \x08\x08 \x08w 1\n[w 1]> ");
	}

	#[test]
	fn overflow_is_dropped() {
		let mut editor = LineEditor::new(4);
		let mut handler = Recorder::default();
		let out = feed(&mut editor, &mut handler, b"abcdef\n");
		assert_eq!(handler.lines, vec!["abc"]);
		assert_eq!(out, "abc\n[abc]> ");
	}

	#[test]
	fn control_bytes_ignored() {
		let mut editor = LineEditor::new(16);
		let mut handler = Recorder::default();
		let out = feed(&mut editor, &mut handler, b"a\x01\x00\xffb\n");
		assert_eq!(handler.lines, vec!["ab"]);
		assert_eq!(out, "ab\n[ab]> ");
	}

	#[test]
	fn csi_sequences_swallowed() {
		let mut editor = LineEditor::new(16);
		let mut handler = Recorder::default();
		// cursor up, then a sequence with parameters
		let out = feed(&mut editor, &mut handler, b"v\x1b[A\x1b[1;5Dx\n");
		assert_eq!(handler.lines, vec!["vx"]);
		assert_eq!(out, "vx\n[vx]> ");
	}

	#[test]
	fn lone_escape_drops_next_byte() {
		let mut editor = LineEditor::new(16);
		let mut handler = Recorder::default();
		feed(&mut editor, &mut handler, b"a\x1bbc\n");
		assert_eq!(handler.lines, vec!["ac"]);
	}

	#[test]
	fn truncated_csi_blocks_until_end_of_input() {
		let mut editor = LineEditor::new(16);
		let mut handler = Recorder::default();
		let mut console = MemoryConsole::new(b"\x1b[12;");
		editor.process(&mut console, &mut handler).unwrap();
		let err = editor.process(&mut console, &mut handler).unwrap_err();
		assert!(crate::cli::is_end_of_input(&err));
	}
}
