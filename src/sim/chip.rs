use std::mem;

use crate::programmer::{
	MAX_ROM_SIZE,
	SDP_DISABLE_SEQUENCE,
	SDP_ENABLE_SEQUENCE,
	SdpStep,
};

const ADDRESS_MASK: u16 = (MAX_ROM_SIZE as u16) - 1;

fn is_sdp_prefix(steps: &[SdpStep]) -> bool {
	SDP_ENABLE_SEQUENCE.starts_with(steps) || SDP_DISABLE_SEQUENCE.starts_with(steps)
}

/// Behavioural model of an AT28C256 as seen from the write cycles.
///
/// Writes forming a prefix of an SDP command sequence are held until the
/// sequence completes or breaks; a broken prefix is stored as plain data
/// (unless protected). While protected, plain writes are dropped.
#[derive(Clone, Debug)]
pub struct At28c256 {
	memory: Vec<u8>,
	protected: bool,
	pending: Vec<SdpStep>,
	log: Vec<SdpStep>,
	ignored: usize,
}

impl Default for At28c256 {
	fn default() -> Self {
		At28c256 {
			memory: vec![0xff; MAX_ROM_SIZE],
			protected: false,
			pending: Vec::new(),
			log: Vec::new(),
			ignored: 0,
		}
	}
}

impl At28c256 {
	pub fn new() -> Self {
		Self::default()
	}

	/// image shorter than the chip is padded with 0xff
	pub fn from_image(image: &[u8]) -> crate::AResult<Self> {
		ensure!(
			image.len() <= MAX_ROM_SIZE,
			"image too large: {} bytes (chip has {})",
			image.len(),
			MAX_ROM_SIZE
		);
		let mut chip = Self::default();
		chip.memory[..image.len()].copy_from_slice(image);
		Ok(chip)
	}

	pub fn contents(&self) -> &[u8] {
		&self.memory
	}

	pub fn is_protected(&self) -> bool {
		self.protected
	}

	pub fn set_protected(&mut self, protected: bool) {
		self.protected = protected;
	}

	/// all write cycles seen so far
	pub fn write_log(&self) -> &[SdpStep] {
		&self.log
	}

	/// data writes dropped because of active protection
	pub fn ignored_writes(&self) -> usize {
		self.ignored
	}

	pub fn read(&self, address: u16) -> u8 {
		self.memory[(address & ADDRESS_MASK) as usize]
	}

	pub fn write(&mut self, address: u16, data: u8) {
		let address = address & ADDRESS_MASK;
		self.log.push((address, data));
		self.pending.push((address, data));

		if self.pending[..] == SDP_ENABLE_SEQUENCE[..] {
			info!("SDP enabled");
			self.protected = true;
			self.pending.clear();
		} else if self.pending[..] == SDP_DISABLE_SEQUENCE[..] {
			info!("SDP disabled");
			self.protected = false;
			self.pending.clear();
		} else if !is_sdp_prefix(&self.pending) {
			// the latest write might start a new sequence
			let last = self.pending.pop();
			self.finish_write_cycle();
			self.pending.extend(last);
			if !is_sdp_prefix(&self.pending) {
				self.finish_write_cycle();
			}
		}
	}

	/// end of the page load window: held writes become plain data writes
	pub fn finish_write_cycle(&mut self) {
		for (address, data) in mem::replace(&mut self.pending, Vec::new()) {
			if self.protected {
				trace!("write {:02x} @{:04x} ignored: protected", data, address);
				self.ignored += 1;
			} else {
				self.memory[address as usize] = data;
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn write_all(chip: &mut At28c256, steps: &[SdpStep]) {
		for &(address, data) in steps {
			chip.write(address, data);
		}
	}

	#[test]
	fn plain_writes_are_stored() {
		let mut chip = At28c256::new();
		chip.write(0x0000, 0x12);
		chip.write(0x8001, 0x34); // A15 not connected
		assert_eq!(chip.read(0), 0x12);
		assert_eq!(chip.read(1), 0x34);
	}

	#[test]
	fn enable_sequence_locks() {
		let mut chip = At28c256::new();
		write_all(&mut chip, &SDP_ENABLE_SEQUENCE);
		assert!(chip.is_protected());
		// command bytes are not data
		assert_eq!(chip.read(0x5555), 0xff);
		assert_eq!(chip.read(0x2aaa), 0xff);

		chip.write(0x10, 0x00);
		assert_eq!(chip.read(0x10), 0xff);
		assert_eq!(chip.ignored_writes(), 1);
	}

	#[test]
	fn disable_sequence_unlocks() {
		let mut chip = At28c256::new();
		chip.set_protected(true);
		write_all(&mut chip, &SDP_DISABLE_SEQUENCE);
		assert!(!chip.is_protected());
		chip.write(0x10, 0x00);
		assert_eq!(chip.read(0x10), 0x00);
	}

	#[test]
	fn reordered_sequence_does_nothing() {
		let mut chip = At28c256::new();
		chip.set_protected(true);
		write_all(&mut chip, &[
			(0x2aaa, 0x55),
			(0x5555, 0xaa),
			(0x5555, 0x80),
			(0x5555, 0xaa),
			(0x2aaa, 0x55),
			(0x5555, 0x20),
		]);
		chip.finish_write_cycle();
		// the tail (aa, 55, 20) is no command either
		assert!(chip.is_protected());
	}

	#[test]
	fn broken_prefix_is_data_when_unprotected() {
		let mut chip = At28c256::new();
		chip.write(0x5555, 0xaa);
		chip.write(0x1234, 0x77);
		assert_eq!(chip.read(0x5555), 0xaa);
		assert_eq!(chip.read(0x1234), 0x77);
	}

	#[test]
	fn pending_prefix_flushed_at_end_of_cycle() {
		let mut chip = At28c256::new();
		chip.write(0x5555, 0xaa);
		assert_eq!(chip.read(0x5555), 0xff);
		chip.finish_write_cycle();
		assert_eq!(chip.read(0x5555), 0xaa);
	}

	#[test]
	fn image_padding() {
		let chip = At28c256::from_image(&[1, 2, 3]).unwrap();
		assert_eq!(&chip.contents()[..4], &[1, 2, 3, 0xff]);
		assert!(At28c256::from_image(&vec![0u8; MAX_ROM_SIZE + 1]).is_err());
	}
}
