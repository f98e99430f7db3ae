#[macro_use]
extern crate clap;
#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;

extern crate prog28c;
use prog28c::*;

use std::fs;
use std::io::{
	self,
	Write,
};
use std::path::Path;
use std::process::exit;

use prog28c::client::{
	ChildTransport,
	Client,
	Transport,
};
use prog28c::programmer::MAX_ROM_SIZE;

fn connect(matches: &clap::ArgMatches) -> AResult<Client<Box<dyn Transport>>> {
	let port = matches.value_of_os("port").map(Path::new);
	let emulator = matches.value_of_os("emulator").map(Path::new);
	let transport: Box<dyn Transport> = match (port, emulator) {
		(Some(_), Some(_)) => bail!("use either --port or --emulator"),
		(Some(port), None) => Box::new(tty::open_serial(port)?),
		(None, Some(emulator)) => Box::new(ChildTransport::spawn(emulator, &["--fast"])?),
		(None, None) => bail!("need --port or --emulator"),
	};
	let mut client = Client::new(transport);

	// the firmware prints a prompt on startup (opening the port resets the board)
	debug!("waiting for prompt");
	client.wait_prompt()?;
	Ok(client)
}

fn print_response(command: &str, response: &str) {
	println!("> {}", command);
	if !response.is_empty() {
		println!("{}", response);
	}
}

fn version(client: &mut Client<Box<dyn Transport>>) -> AResult<()> {
	println!("{} {}", crate_name!(), crate_version!());
	println!("firmware: {}", client.firmware_version()?);
	Ok(())
}

fn demo(client: &mut Client<Box<dyn Transport>>) -> AResult<()> {
	for command in &["v", "h", ""] {
		let response = client.exec(command)?;
		print_response(command, &response);
	}
	Ok(())
}

fn exec(client: &mut Client<Box<dyn Transport>>, sub_m: &clap::ArgMatches) -> AResult<()> {
	for command in sub_m.values_of("COMMAND").into_iter().flatten() {
		let response = client.exec(command)?;
		print_response(command, &response);
	}
	Ok(())
}

fn dump(client: &mut Client<Box<dyn Transport>>, sub_m: &clap::ArgMatches) -> AResult<()> {
	let image = client.read_rom(0, MAX_ROM_SIZE)?;
	match sub_m.value_of_os("output") {
		Some(path) => {
			fs::write(path, &image)?;
			info!("Wrote {} bytes to {}", image.len(), Path::new(path).display());
		},
		None => {
			let stdout = io::stdout();
			let mut stdout = stdout.lock();
			stdout.write_all(&image)?;
			stdout.flush()?;
		},
	}
	Ok(())
}

fn program(client: &mut Client<Box<dyn Transport>>, sub_m: &clap::ArgMatches) -> AResult<()> {
	let path = match sub_m.value_of_os("IMAGE") {
		Some(path) => Path::new(path),
		None => bail!("missing parameter IMAGE"),
	};
	let image = match fs::read(path) {
		Ok(image) => image,
		Err(e) => bail!("couldn't read image {}: {}", path.display(), e),
	};
	ensure!(
		image.len() <= MAX_ROM_SIZE,
		"image {} too large: {} bytes",
		path.display(),
		image.len()
	);

	info!("Writing {} bytes", image.len());
	client.write_rom(0, &image)?;

	if sub_m.is_present("verify") {
		let written = client.read_rom(0, image.len())?;
		if let Some(pos) = written.iter().zip(&image).position(|(a, b)| a != b) {
			bail!(
				"verify failed at {:04x}: read {:02x}, expected {:02x}",
				pos,
				written[pos],
				image[pos]
			);
		}
		info!("Image verified successfully");
	}
	Ok(())
}

fn main_app() -> AResult<()> {
	let matches = clap_app!(@app (app_from_crate!())
		(@setting SubcommandRequiredElseHelp)
		(global_setting: clap::AppSettings::VersionlessSubcommands)
		(@arg port: -p --port +takes_value "serial port of the programmer (38400 baud)")
		(@arg emulator: -e --emulator +takes_value
			"run this emulator binary instead of using a serial port")
		(@subcommand version =>
			(about: "show client and firmware version")
		)
		(@subcommand demo =>
			(about: "run a few harmless commands")
		)
		(@subcommand exec =>
			(about: "run firmware commands and print their responses")
			(@arg COMMAND: +required +multiple "command line to send")
		)
		(@subcommand dump =>
			(about: "read the complete ROM")
			(@arg output: -o --output +takes_value "file to write (default: stdout)")
		)
		(@subcommand program =>
			(about: "write an image to the ROM, starting at address 0")
			(@arg verify: -v --verify "read back and compare after writing")
			(@arg IMAGE: +required "binary image to write")
		)
	).get_matches();

	let mut client = connect(&matches)?;

	match matches.subcommand() {
		("version", _) => {
			version(&mut client)
		},
		("demo", _) => {
			demo(&mut client)
		},
		("exec", Some(sub_m)) => {
			exec(&mut client, sub_m)
		},
		("dump", Some(sub_m)) => {
			dump(&mut client, sub_m)
		},
		("program", Some(sub_m)) => {
			program(&mut client, sub_m)
		},
		("", _) => bail!("no subcommand"),
		(cmd, _) => bail!("not implemented subcommand {:?}", cmd),
	}
}

fn main() {
	env_logger::from_env(env_logger::Env::default().default_filter_or("info")).init();

	if let Err(e) = main_app() {
		error!("Error: {}", e);
		exit(1);
	}
}
