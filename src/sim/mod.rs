//! Simulated programmer board: shift registers, latch and an AT28C256 behind
//! the GPIO pins of `PinMap`.
//!
//! Edges are only seen on pins in output mode, so the initial level setup of
//! the firmware (level first, then direction) doesn't trigger anything.
//!
//! Time is simulated; with `set_real_time(true)` the board also sleeps.

use std::time::Duration;

use crate::hal::{
	Hardware,
	Level,
	Pin,
	PinMap,
	PinMode,
	reliable_sleep,
};

mod chip;

pub use self::chip::At28c256;

const PIN_COUNT: usize = 32;

pub struct SimulatedBoard {
	pins: PinMap,
	modes: [PinMode; PIN_COUNT],
	levels: [Level; PIN_COUNT],
	shift_register: u16,
	address: u16,
	chip: At28c256,
	write_pulses: usize,
	page_waits: usize,
	elapsed_micros: u64,
	real_time: bool,
}

impl SimulatedBoard {
	pub fn new(pins: PinMap) -> Self {
		Self::with_chip(pins, At28c256::new())
	}

	pub fn with_chip(pins: PinMap, chip: At28c256) -> Self {
		SimulatedBoard {
			pins,
			modes: [PinMode::Input; PIN_COUNT],
			levels: [Level::Low; PIN_COUNT],
			shift_register: 0,
			address: 0,
			chip,
			write_pulses: 0,
			page_waits: 0,
			elapsed_micros: 0,
			real_time: false,
		}
	}

	pub fn set_real_time(&mut self, real_time: bool) {
		self.real_time = real_time;
	}

	pub fn chip(&self) -> &At28c256 {
		&self.chip
	}

	pub fn chip_mut(&mut self) -> &mut At28c256 {
		&mut self.chip
	}

	pub fn pin_mode(&self, pin: Pin) -> PinMode {
		self.modes[pin as usize]
	}

	pub fn pin_level(&self, pin: Pin) -> Level {
		self.levels[pin as usize]
	}

	/// address presented to the chip by the latch
	pub fn latched_address(&self) -> u16 {
		self.address
	}

	/// rising /WE edges
	pub fn write_pulses(&self) -> usize {
		self.write_pulses
	}

	/// number of millisecond waits (page write waits)
	pub fn page_waits(&self) -> usize {
		self.page_waits
	}

	pub fn elapsed_micros(&self) -> u64 {
		self.elapsed_micros
	}

	fn is_low(&self, pin: Pin) -> bool {
		!self.levels[pin as usize].is_high()
	}

	fn chip_drives_bus(&self) -> bool {
		self.is_low(self.pins.chip_enable)
			&& self.is_low(self.pins.output_enable)
			&& !self.is_low(self.pins.write_enable)
	}

	// undriven data lines float high
	fn bus_value(&self) -> u8 {
		let mut value = 0u8;
		for (bit, pin) in self.pins.data_pins().enumerate() {
			let driven_low = self.modes[pin as usize] == PinMode::Output && self.is_low(pin);
			if !driven_low {
				value |= 1 << bit;
			}
		}
		value
	}

	fn rising_edge(&mut self, pin: Pin) {
		if pin == self.pins.shift_clock {
			let bit = !self.is_low(self.pins.shift_data) as u16;
			self.shift_register = (self.shift_register << 1) | bit;
		} else if pin == self.pins.shift_latch {
			self.address = self.shift_register;
		} else if pin == self.pins.write_enable {
			self.write_pulses += 1;
			if self.is_low(self.pins.chip_enable) && !self.is_low(self.pins.output_enable) {
				let data = self.bus_value();
				self.chip.write(self.address, data);
			} else {
				debug!("write pulse with /OE low or /CE high ignored");
			}
		}
	}
}

impl Hardware for SimulatedBoard {
	fn set_pin_mode(&mut self, pin: Pin, mode: PinMode) {
		self.modes[pin as usize] = mode;
	}

	fn write_pin(&mut self, pin: Pin, level: Level) {
		let previous = self.levels[pin as usize];
		self.levels[pin as usize] = level;
		let is_output = self.modes[pin as usize] == PinMode::Output;
		if is_output && previous == Level::Low && level == Level::High {
			self.rising_edge(pin);
		}
	}

	fn read_pin(&mut self, pin: Pin) -> Level {
		match self.pins.data_bit(pin) {
			Some(bit) if self.modes[pin as usize] == PinMode::Input => {
				if self.chip_drives_bus() {
					Level::from(0 != self.chip.read(self.address) & (1 << bit))
				} else {
					Level::High
				}
			},
			_ => self.levels[pin as usize],
		}
	}

	fn sleep_millis(&mut self, ms: u32) {
		self.page_waits += 1;
		self.elapsed_micros += u64::from(ms) * 1000;
		self.chip.finish_write_cycle();
		if self.real_time {
			reliable_sleep(Duration::from_millis(ms.into()));
		}
	}

	fn sleep_micros(&mut self, us: u32) {
		self.elapsed_micros += u64::from(us);
		if self.real_time {
			reliable_sleep(Duration::from_micros(us.into()));
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::hal::BitOrder;

	#[test]
	fn shift_and_latch() {
		let pins = PinMap::default();
		let mut board = SimulatedBoard::new(pins);
		board.set_pin_mode(pins.shift_clock, PinMode::Output);
		board.set_pin_mode(pins.shift_data, PinMode::Output);
		board.set_pin_mode(pins.shift_latch, PinMode::Output);

		board.shift_out(pins.shift_data, pins.shift_clock, BitOrder::MsbFirst, 0x12);
		board.shift_out(pins.shift_data, pins.shift_clock, BitOrder::MsbFirst, 0x34);
		assert_eq!(board.latched_address(), 0);
		board.write_pin(pins.shift_latch, Level::High);
		board.write_pin(pins.shift_latch, Level::Low);
		assert_eq!(board.latched_address(), 0x1234);
	}

	#[test]
	fn floating_bus_reads_high() {
		let pins = PinMap::default();
		let mut board = SimulatedBoard::new(pins);
		board.chip_mut().write(0, 0x00);
		// /OE high: nothing drives the bus
		board.write_pin(pins.output_enable, Level::High);
		assert_eq!(board.read_pin(pins.data_pin(0)), Level::High);
	}

	#[test]
	fn edges_ignored_on_input_pins() {
		let pins = PinMap::default();
		let mut board = SimulatedBoard::new(pins);
		board.write_pin(pins.write_enable, Level::High);
		assert_eq!(board.write_pulses(), 0);
	}
}
