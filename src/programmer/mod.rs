/* Parallel EEPROM programmer: AT28C256 (and pin compatible 28C64/28C256 parts) */

/* Chip documentation: https://ww1.microchip.com/downloads/en/DeviceDoc/doc0006.pdf */

use crate::hal::{
	BitOrder,
	Hardware,
	Level,
	PinMap,
	PinMode,
};

mod consts;

pub use self::consts::{
	MAX_ROM_SIZE,
	PAGE_SIZE,
	PAGE_WRITE_MILLIS,
	SDP_DISABLE_SEQUENCE,
	SDP_ENABLE_SEQUENCE,
	SdpStep,
	WRITE_PULSE_MICROS,
};

use self::consts::*;

/// ROM operations the command layer needs.
///
/// Every call brackets itself (read indicator, write mode); the caller only
/// guarantees `address + len <= MAX_ROM_SIZE`.
pub trait Rom {
	fn read(&mut self, address: u16, target: &mut [u8]);
	fn write(&mut self, address: u16, data: &[u8]);
	/// fill `[0, len)` with 0xff
	fn erase(&mut self, len: usize);
	fn enable_protection(&mut self);
	fn disable_protection(&mut self);
}

pub struct Programmer<H: Hardware> {
	hardware: H,
	pins: PinMap,
}

impl<H: Hardware> Programmer<H> {
	pub fn new(hardware: H) -> Self {
		Self::with_pins(hardware, PinMap::default())
	}

	pub fn with_pins(hardware: H, pins: PinMap) -> Self {
		let mut programmer = Programmer {
			hardware,
			pins,
		};
		programmer.init();
		programmer
	}

	pub fn pins(&self) -> &PinMap {
		&self.pins
	}

	pub fn hardware(&mut self) -> &mut H {
		&mut self.hardware
	}

	pub fn into_hardware(self) -> H {
		self.hardware
	}

	// set level before switching to output so no pin glitches
	fn init_output(&mut self, pin: u8, level: Level) {
		self.hardware.write_pin(pin, level);
		self.hardware.set_pin_mode(pin, PinMode::Output);
	}

	fn init(&mut self) {
		let pins = self.pins;
		self.init_output(pins.program_led, Level::Low);
		self.init_output(pins.read_led, Level::Low);
		self.init_output(pins.write_enable, Level::High); // /WE inactive
		self.init_output(pins.chip_enable, Level::Low); // /CE active
		self.init_output(pins.output_enable, Level::Low); // /OE active
		self.init_output(pins.shift_latch, Level::Low);
		self.init_output(pins.shift_data, Level::Low);
		self.init_output(pins.shift_clock, Level::Low);
		self.set_data_mode(PinMode::Input);
	}

	fn set_address(&mut self, address: u16) {
		let pins = self.pins;
		trace!("address {:04x}", address);
		for &byte in &[(address >> 8) as u8, address as u8] {
			self.hardware.shift_out(pins.shift_data, pins.shift_clock, BitOrder::MsbFirst, byte);
		}

		self.hardware.write_pin(pins.shift_latch, Level::Low);
		self.hardware.write_pin(pins.shift_latch, Level::High);
		self.hardware.write_pin(pins.shift_latch, Level::Low);
	}

	fn set_data_mode(&mut self, mode: PinMode) {
		for pin in self.pins.data_pins() {
			self.hardware.set_pin_mode(pin, mode);
		}
	}

	fn wait_page_write(&mut self) {
		self.hardware.sleep_millis(PAGE_WRITE_MILLIS);
	}

	// data pins need to be in output mode
	fn write_byte_raw(&mut self, address: u16, data: u8) {
		self.set_address(address);

		for bit in 0..8 {
			let pin = self.pins.data_pin(bit);
			self.hardware.write_pin(pin, Level::from(0 != data & (1 << bit)));
		}

		let we = self.pins.write_enable;
		self.hardware.write_pin(we, Level::Low);
		self.hardware.sleep_micros(WRITE_PULSE_MICROS);
		self.hardware.write_pin(we, Level::High);
		self.hardware.sleep_micros(WRITE_PULSE_MICROS);
	}

	fn read_byte_raw(&mut self, address: u16) -> u8 {
		self.set_address(address);

		let mut data = 0u8;
		for pin in self.pins.data_pins().rev() {
			data <<= 1;
			if self.hardware.read_pin(pin).is_high() {
				data |= 1;
			}
		}
		data
	}

	pub fn reader<'a>(&'a mut self) -> RomReader<'a, H> {
		let led = self.pins.read_led;
		self.hardware.write_pin(led, Level::High);
		RomReader { programmer: self }
	}

	pub fn writer<'a>(&'a mut self) -> RomWriter<'a, H> {
		let pins = self.pins;
		self.hardware.write_pin(pins.program_led, Level::High);
		self.set_data_mode(PinMode::Output);
		self.hardware.write_pin(pins.output_enable, Level::High);
		RomWriter { programmer: self }
	}
}

pub struct RomReader<'a, H: Hardware + 'a> {
	programmer: &'a mut Programmer<H>,
}

impl<'a, H: Hardware> RomReader<'a, H> {
	pub fn read(&mut self, address: u16, target: &mut [u8]) {
		assert!(address as usize + target.len() <= MAX_ROM_SIZE);
		for (offset, t) in target.iter_mut().enumerate() {
			*t = self.programmer.read_byte_raw(address + offset as u16);
		}
	}
}

impl<'a, H: Hardware> Drop for RomReader<'a, H> {
	fn drop(&mut self) {
		let led = self.programmer.pins.read_led;
		self.programmer.hardware.write_pin(led, Level::Low);
	}
}

/// Write mode: data bus driven, /OE high.
///
/// Dropping the writer waits for the last page write to finish and returns
/// the bus to input mode.
pub struct RomWriter<'a, H: Hardware + 'a> {
	programmer: &'a mut Programmer<H>,
}

impl<'a, H: Hardware> RomWriter<'a, H> {
	// pacing: wait before each byte starting a page, and after a run ending on
	// a page boundary
	fn write_paced<F>(&mut self, address: u16, len: usize, mut data: F)
	where
		F: FnMut(usize) -> u8,
	{
		assert!(address as usize + len <= MAX_ROM_SIZE);
		for offset in 0..len {
			let addr = address + offset as u16;
			if is_page_start(addr) {
				self.programmer.wait_page_write();
			}
			self.programmer.write_byte_raw(addr, data(offset));
		}
		if ends_on_page_boundary(len) {
			self.programmer.wait_page_write();
		}
	}

	pub fn write(&mut self, address: u16, data: &[u8]) {
		debug!("writing {} bytes at {:04x}", data.len(), address);
		self.write_paced(address, data.len(), |offset| data[offset]);
	}

	pub fn erase(&mut self, len: usize) {
		debug!("erasing {} bytes", len);
		self.write_paced(0, len, |_| 0xff);
	}

	fn write_sequence(&mut self, sequence: &[SdpStep]) {
		for &(address, data) in sequence {
			self.programmer.write_byte_raw(address, data);
		}
	}

	pub fn enable_sdp(&mut self) {
		debug!("enabling software data protection");
		self.write_sequence(&SDP_ENABLE_SEQUENCE);
	}

	pub fn disable_sdp(&mut self) {
		debug!("disabling software data protection");
		self.write_sequence(&SDP_DISABLE_SEQUENCE);
	}
}

impl<'a, H: Hardware> Drop for RomWriter<'a, H> {
	fn drop(&mut self) {
		let pins = self.programmer.pins;
		self.programmer.wait_page_write();
		self.programmer.hardware.write_pin(pins.output_enable, Level::Low);
		self.programmer.set_data_mode(PinMode::Input);
		self.programmer.hardware.write_pin(pins.program_led, Level::Low);
	}
}

impl<H: Hardware> Rom for Programmer<H> {
	fn read(&mut self, address: u16, target: &mut [u8]) {
		self.reader().read(address, target)
	}

	fn write(&mut self, address: u16, data: &[u8]) {
		self.writer().write(address, data)
	}

	fn erase(&mut self, len: usize) {
		self.writer().erase(len)
	}

	fn enable_protection(&mut self) {
		self.writer().enable_sdp()
	}

	fn disable_protection(&mut self) {
		self.writer().disable_sdp()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::sim::SimulatedBoard;

	fn programmer() -> Programmer<SimulatedBoard> {
		Programmer::new(SimulatedBoard::new(PinMap::default()))
	}

	#[test]
	fn write_then_read_back() {
		let mut p = programmer();
		p.write(0x0100, &[0xaa, 0xbb, 0xcc]);
		let mut buf = [0u8; 3];
		p.read(0x0100, &mut buf);
		assert_eq!(buf, [0xaa, 0xbb, 0xcc]);
		assert_eq!(p.hardware().chip().read(0x0103), 0xff);
	}

	#[test]
	fn bus_returns_to_input_after_write() {
		let mut p = programmer();
		p.write(0x10, &[1]);
		let pins = *p.pins();
		let board = p.hardware();
		for pin in pins.data_pins() {
			assert_eq!(board.pin_mode(pin), PinMode::Input);
		}
		assert_eq!(board.pin_level(pins.output_enable), Level::Low);
		assert_eq!(board.pin_level(pins.program_led), Level::Low);
	}

	#[test]
	fn pacing_counts() {
		let mut p = programmer();
		// page start at 0x40 and 0x80, plus end-of-write wait
		p.write(0x3f, &[0u8; 0x42]);
		assert_eq!(p.hardware().page_waits(), 3);

		let mut p = programmer();
		// page starts at 0x00 and 0x40, length multiple of 64, end-of-write wait
		p.write(0x00, &[0u8; 0x80]);
		assert_eq!(p.hardware().page_waits(), 4);

		let mut p = programmer();
		p.write(0x01, &[0u8; 3]);
		assert_eq!(p.hardware().page_waits(), 1);
	}

	#[test]
	fn write_pulses_are_timed() {
		let mut p = programmer();
		p.write(0x200, &[0x12, 0x34]);
		let board = p.hardware();
		assert_eq!(board.write_pulses(), 2);
		// low and high phase of every pulse
		assert_eq!(board.elapsed_micros() % 1000, 4 * WRITE_PULSE_MICROS as u64);
	}

	#[test]
	fn erase_fills_with_ff() {
		let mut p = programmer();
		p.write(0x00, &[0x00; 0x100]);
		p.erase(0x80);
		assert_eq!(p.hardware().chip().read(0x7f), 0xff);
		assert_eq!(p.hardware().chip().read(0x80), 0x00);
	}

	#[test]
	fn sdp_sequences_are_written_in_order() {
		let mut p = programmer();
		p.enable_protection();
		assert!(p.hardware().chip().is_protected());
		assert_eq!(p.hardware().chip().write_log(), &SDP_ENABLE_SEQUENCE[..]);

		p.write(0x10, &[0x42]);
		assert_eq!(p.hardware().chip().read(0x10), 0xff);

		p.disable_protection();
		assert!(!p.hardware().chip().is_protected());
		p.write(0x10, &[0x42]);
		assert_eq!(p.hardware().chip().read(0x10), 0x42);
	}

	#[test]
	fn locked_chip_gets_identical_pulses() {
		let mut unlocked = programmer();
		unlocked.erase(0x100);
		unlocked.write(0x20, &[1, 2, 3]);

		let mut locked = programmer();
		locked.enable_protection();
		let before = locked.hardware().write_pulses();
		locked.erase(0x100);
		locked.write(0x20, &[1, 2, 3]);

		assert_eq!(locked.hardware().write_pulses() - before, unlocked.hardware().write_pulses());
	}
}
