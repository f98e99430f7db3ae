use std::fs;
use std::io;
use std::mem;
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::{
	AsRawFd,
	RawFd,
};
use std::path::Path;

use libc::{
	B38400,
	CLOCAL,
	CREAD,
	ECHO,
	ICANON,
	O_NOCTTY,
	TCSANOW,
	VMIN,
	VTIME,
	cfmakeraw,
	cfsetispeed,
	cfsetospeed,
	isatty,
	speed_t,
	tcgetattr,
	tcsetattr,
	termios,
};

pub const STDIN_FD: RawFd = 0;
pub const SERIAL_SPEED: speed_t = B38400;

pub fn is_terminal(fd: RawFd) -> bool {
	1 == unsafe { isatty(fd) }
}

fn get_attributes(fd: RawFd) -> io::Result<termios> {
	let mut attributes: termios = unsafe { mem::zeroed() };
	if 0 != unsafe { tcgetattr(fd, &mut attributes) } {
		return Err(io::Error::last_os_error());
	}
	Ok(attributes)
}

fn set_attributes(fd: RawFd, attributes: &termios) -> io::Result<()> {
	if 0 != unsafe { tcsetattr(fd, TCSANOW, attributes) } {
		return Err(io::Error::last_os_error());
	}
	Ok(())
}

/// Changed terminal settings; the original ones are restored on drop.
pub struct TerminalMode {
	fd: RawFd,
	original: termios,
}

impl TerminalMode {
	/// byte-wise input without local echo (the firmware echoes)
	pub fn raw_input(fd: RawFd) -> io::Result<Self> {
		let original = get_attributes(fd)?;
		let mut attributes = original;
		attributes.c_lflag &= !(ICANON | ECHO);
		attributes.c_cc[VMIN] = 1;
		attributes.c_cc[VTIME] = 0;
		set_attributes(fd, &attributes)?;
		Ok(TerminalMode {
			fd,
			original,
		})
	}
}

impl Drop for TerminalMode {
	fn drop(&mut self) {
		if let Err(e) = set_attributes(self.fd, &self.original) {
			warn!("Couldn't restore terminal settings: {}", e);
		}
	}
}

/// raw 8N1 at `speed`, reads block until at least one byte arrived
pub fn configure_serial(fd: RawFd, speed: speed_t) -> io::Result<()> {
	let mut attributes = get_attributes(fd)?;
	unsafe {
		cfmakeraw(&mut attributes);
		if 0 != cfsetispeed(&mut attributes, speed) || 0 != cfsetospeed(&mut attributes, speed) {
			return Err(io::Error::last_os_error());
		}
	}
	attributes.c_cflag |= CLOCAL | CREAD;
	attributes.c_cc[VMIN] = 1;
	attributes.c_cc[VTIME] = 0;
	set_attributes(fd, &attributes)
}

pub fn open_serial(path: &Path) -> crate::AResult<fs::File> {
	with_context!(("couldn't open serial port {}", path.display()), {
		let port = fs::OpenOptions::new()
			.read(true)
			.write(true)
			.custom_flags(O_NOCTTY)
			.open(path)?;
		configure_serial(port.as_raw_fd(), SERIAL_SPEED)?;
		Ok(port)
	})
}
