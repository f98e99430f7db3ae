use super::Pin;

const ARDUINO_A0: Pin = 14;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct PinMap {
	pub shift_data: Pin,
	pub shift_latch: Pin,
	pub shift_clock: Pin,
	pub chip_enable: Pin,
	pub output_enable: Pin,
	pub write_enable: Pin,
	/// D0; D1..D7 follow on the next pins
	pub data_first: Pin,
	pub program_led: Pin,
	pub read_led: Pin,
}

impl PinMap {
	pub fn data_pin(&self, bit: u8) -> Pin {
		assert!(bit < 8);
		self.data_first + bit
	}

	pub fn data_pins(&self) -> impl DoubleEndedIterator<Item = Pin> {
		let first = self.data_first;
		(0..8).map(move |bit| first + bit)
	}

	/// bit index on the data bus, if `pin` belongs to it
	pub fn data_bit(&self, pin: Pin) -> Option<u8> {
		if pin >= self.data_first && pin < self.data_first + 8 {
			Some(pin - self.data_first)
		} else {
			None
		}
	}
}

impl Default for PinMap {
	fn default() -> Self {
		PinMap {
			shift_data: ARDUINO_A0,
			shift_latch: ARDUINO_A0 + 1,
			shift_clock: ARDUINO_A0 + 2,
			chip_enable: ARDUINO_A0 + 3,
			output_enable: ARDUINO_A0 + 4,
			write_enable: ARDUINO_A0 + 5,
			data_first: 2,
			program_led: 12,
			read_led: 13,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn data_bus_is_contiguous() {
		let pins = PinMap::default();
		let bus: Vec<Pin> = pins.data_pins().collect();
		assert_eq!(bus, vec![2, 3, 4, 5, 6, 7, 8, 9]);
		assert_eq!(pins.data_bit(9), Some(7));
		assert_eq!(pins.data_bit(10), None);
		assert_eq!(pins.data_bit(1), None);
	}
}
