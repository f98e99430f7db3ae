// AT28C256: 32K x 8 parallel EEPROM, 64-byte pages
pub const MAX_ROM_SIZE: usize = 0x8000;
pub const PAGE_SIZE: usize = 64;
const PAGE_MASK: u16 = (PAGE_SIZE as u16) - 1;

// tWC: write cycle time is 10 ms max
pub const PAGE_WRITE_MILLIS: u32 = 10;
// tWP / tWPH: 100 ns / 50 ns min
pub const WRITE_PULSE_MICROS: u32 = 1;

pub type SdpStep = (u16, u8);

pub const SDP_ENABLE_SEQUENCE: [SdpStep; 3] = [
	(0x5555, 0xaa),
	(0x2aaa, 0x55),
	(0x5555, 0xa0),
];

pub const SDP_DISABLE_SEQUENCE: [SdpStep; 6] = [
	(0x5555, 0xaa),
	(0x2aaa, 0x55),
	(0x5555, 0x80),
	(0x5555, 0xaa),
	(0x2aaa, 0x55),
	(0x5555, 0x20),
];

pub fn is_page_start(address: u16) -> bool {
	0 == address & PAGE_MASK
}

/// whether a run of `len` bytes needs the trailing page-write wait
pub fn ends_on_page_boundary(len: usize) -> bool {
	0 == len & (PAGE_SIZE - 1)
}
