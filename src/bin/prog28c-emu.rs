#[macro_use]
extern crate clap;
#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;

extern crate prog28c;
use prog28c::*;

use std::fs;
use std::io;
use std::path::Path;
use std::process::exit;

use prog28c::cli::StdioConsole;
use prog28c::hal::PinMap;
use prog28c::sim::{
	At28c256,
	SimulatedBoard,
};

fn get_param<T>(matches: &clap::ArgMatches, name: &str) -> AResult<T>
where
	T: std::str::FromStr,
	failure::Error: From<<T as std::str::FromStr>::Err>,
{
	let param = match matches.value_of(name) {
		Some(p) => p,
		None => bail!("missing parameter {}", name),
	};
	param.parse::<T>().map_err(|e| {
		let e = failure::Error::from(e);
		let msg = format!("invalid paramater {}: {}", name, e);
		e.context(msg).into()
	})
}

fn load_chip(image: Option<&Path>) -> AResult<At28c256> {
	let path = match image {
		None => return Ok(At28c256::new()),
		Some(path) => path,
	};
	match fs::read(path) {
		Ok(data) => {
			info!("Loaded {} bytes from {}", data.len(), path.display());
			At28c256::from_image(&data).map_err(|e| {
				let msg = format!("invalid image {}", path.display());
				e.context(msg).into()
			})
		},
		Err(ref e) if e.kind() == io::ErrorKind::NotFound => {
			info!("{} doesn't exist yet, starting with an erased chip", path.display());
			Ok(At28c256::new())
		},
		Err(e) => bail!("couldn't read image {}: {}", path.display(), e),
	}
}

fn main_app() -> AResult<()> {
	let matches = clap_app!(@app (app_from_crate!())
		(@arg image: -i --image +takes_value "ROM image to load at start and save on exit")
		(@arg locked: -l --locked "chip starts with software data protection enabled")
		(@arg fast: -f --fast "don't wait for simulated write cycles")
		(@arg line_capacity: --("line-capacity") +takes_value
			"serial line buffer size (256 or 512)")
	).get_matches();

	let image = matches.value_of_os("image").map(Path::new);
	let line_capacity: usize = if matches.is_present("line_capacity") {
		get_param(&matches, "line_capacity")?
	} else {
		cli::DEFAULT_LINE_CAPACITY
	};
	ensure!(
		line_capacity == 256 || line_capacity == 512,
		"line capacity must be 256 or 512, not {}",
		line_capacity
	);

	let mut chip = load_chip(image)?;
	if matches.is_present("locked") {
		chip.set_protected(true);
	}
	let mut board = SimulatedBoard::with_chip(PinMap::default(), chip);
	board.set_real_time(!matches.is_present("fast"));

	let mut shell = firmware(board, line_capacity);
	{
		let _raw = if tty::is_terminal(tty::STDIN_FD) {
			Some(tty::TerminalMode::raw_input(tty::STDIN_FD)?)
		} else {
			None
		};
		shell.run(&mut StdioConsole::new())?;
	}

	let board = shell.into_handler().into_rom().into_hardware();
	debug!(
		"{} write pulses, {} page waits, {}us simulated",
		board.write_pulses(),
		board.page_waits(),
		board.elapsed_micros()
	);
	if let Some(path) = image {
		if let Err(e) = fs::write(path, board.chip().contents()) {
			bail!("couldn't save image {}: {}", path.display(), e);
		}
		info!("Saved image to {}", path.display());
	}

	Ok(())
}

fn main() {
	env_logger::from_env(env_logger::Env::default().default_filter_or("info")).init();

	if let Err(e) = main_app() {
		error!("Error: {}", e);
		exit(1);
	}
}
