use std::thread;
use std::time::{
	Duration,
	Instant,
};

pub type Pin = u8;

pub fn reliable_sleep(mut duration: Duration) {
	loop {
		let now = Instant::now();
		thread::sleep(duration);
		let elapsed = now.elapsed();
		if elapsed >= duration {
			return;
		}
		duration -= elapsed;
	}
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Level {
	Low,
	High,
}

impl Level {
	pub fn is_high(self) -> bool {
		self == Level::High
	}
}

impl From<bool> for Level {
	fn from(v: bool) -> Self {
		match v {
			false => Level::Low,
			true => Level::High,
		}
	}
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum PinMode {
	Input,
	Output,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum BitOrder {
	MsbFirst,
	LsbFirst,
}

/// Pin level I/O and blocking delays of the microcontroller.
///
/// `shift_out` and the sleeps have default implementations: a bit-banged
/// shift (data valid before the rising clock edge) and real-time sleeping.
/// Boards with hardware shifting or a simulated clock override them.
pub trait Hardware {
	fn set_pin_mode(&mut self, pin: Pin, mode: PinMode);
	fn write_pin(&mut self, pin: Pin, level: Level);
	fn read_pin(&mut self, pin: Pin) -> Level;

	fn shift_out(&mut self, data_pin: Pin, clock_pin: Pin, order: BitOrder, value: u8) {
		for i in 0..8 {
			let bit = match order {
				BitOrder::MsbFirst => value & (0x80 >> i),
				BitOrder::LsbFirst => value & (0x01 << i),
			};
			self.write_pin(data_pin, Level::from(0 != bit));
			self.write_pin(clock_pin, Level::High);
			self.write_pin(clock_pin, Level::Low);
		}
	}

	fn sleep_millis(&mut self, ms: u32) {
		reliable_sleep(Duration::from_millis(ms.into()));
	}

	fn sleep_micros(&mut self, us: u32) {
		reliable_sleep(Duration::from_micros(us.into()));
	}
}

impl<'a, H: ?Sized + Hardware> Hardware for &'a mut H {
	fn set_pin_mode(&mut self, pin: Pin, mode: PinMode) {
		H::set_pin_mode(*self, pin, mode)
	}
	fn write_pin(&mut self, pin: Pin, level: Level) {
		H::write_pin(*self, pin, level)
	}
	fn read_pin(&mut self, pin: Pin) -> Level {
		H::read_pin(*self, pin)
	}
	fn shift_out(&mut self, data_pin: Pin, clock_pin: Pin, order: BitOrder, value: u8) {
		H::shift_out(*self, data_pin, clock_pin, order, value)
	}
	fn sleep_millis(&mut self, ms: u32) {
		H::sleep_millis(*self, ms)
	}
	fn sleep_micros(&mut self, us: u32) {
		H::sleep_micros(*self, us)
	}
}
