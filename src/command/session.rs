use crate::programmer::MAX_ROM_SIZE;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Mode {
	Normal,
	/// lines are hex bytes to write at the current address
	Writing,
}

/// State carried from one command line to the next.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Session {
	current_address: u16,
	mode: Mode,
}

impl Default for Session {
	fn default() -> Self {
		Session {
			current_address: 0,
			mode: Mode::Normal,
		}
	}
}

impl Session {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn current_address(&self) -> u16 {
		self.current_address
	}

	pub fn mode(&self) -> Mode {
		self.mode
	}

	pub fn set_address(&mut self, address: u16) {
		assert!((address as usize) < MAX_ROM_SIZE);
		self.current_address = address;
	}

	/// move the cursor past `count` bytes; the end of the ROM wraps to 0
	pub fn advance(&mut self, count: usize) {
		assert!(count <= MAX_ROM_SIZE);
		self.current_address = ((self.current_address as usize + count) % MAX_ROM_SIZE) as u16;
	}

	pub fn begin_writing(&mut self, address: u16) {
		self.set_address(address);
		self.mode = Mode::Writing;
	}

	pub fn end_writing(&mut self) {
		self.mode = Mode::Normal;
	}
}
