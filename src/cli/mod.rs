mod console;
mod line_editor;

pub use self::console::{
	Console,
	MemoryConsole,
	StdioConsole,
	is_end_of_input,
};

pub use self::line_editor::{
	DEFAULT_LINE_CAPACITY,
	LineEditor,
	LineHandler,
};

/// Main loop: bytes from the console through the line editor to a handler.
pub struct Shell<H: LineHandler> {
	editor: LineEditor,
	handler: H,
}

impl<H: LineHandler> Shell<H> {
	pub fn new(handler: H, line_capacity: usize) -> Self {
		Shell {
			editor: LineEditor::new(line_capacity),
			handler,
		}
	}

	pub fn handler(&self) -> &H {
		&self.handler
	}

	pub fn into_handler(self) -> H {
		self.handler
	}

	/// print the initial prompt
	pub fn start<C: Console>(&mut self, console: &mut C) -> crate::AResult<()> {
		self.editor.start(console, &self.handler)?;
		Ok(())
	}

	pub fn poll<C: Console>(&mut self, console: &mut C) -> crate::AResult<()> {
		self.editor.process(console, &mut self.handler)
	}

	/// Run until the console input ends.
	pub fn run<C: Console>(&mut self, console: &mut C) -> crate::AResult<()> {
		self.start(console)?;
		loop {
			match self.poll(console) {
				Ok(()) => (),
				Err(ref e) if is_end_of_input(e) => {
					debug!("end of console input");
					return Ok(());
				},
				Err(e) => return Err(e),
			}
		}
	}
}
