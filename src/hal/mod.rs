//! GPIO layer of the programmer board.
//!
//! Wiring (Arduino Uno numbering):
//! - two 74HC595 shift registers in series drive A0..A14 of the EEPROM; the
//!   high address byte is shifted first, the latch pulse commits it.
//! - D0..D7 of the EEPROM sit on a contiguous block of pins; input mode is
//!   the idle state.
//! - /CE is tied low by firmware, /OE and /WE are driven directly.
//! - two indicator LEDs: "programming" and "reading".

mod hardware;
mod pins;

pub use self::hardware::{
	BitOrder,
	Hardware,
	Level,
	Pin,
	PinMode,
	reliable_sleep,
};

pub use self::pins::PinMap;
