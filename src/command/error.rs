/// Errors reported back on the console; the command loop continues after
/// each of them.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Fail)]
pub enum CommandError {
	/// wrong number of arguments or unparsable number
	#[fail(display = "Invalid argument.")]
	InvalidArgument,
	/// address outside the ROM
	#[fail(display = "Invalid address.")]
	InvalidAddress,
	#[fail(display = "Unknown command. Type 'h' for help.")]
	UnknownCommand,
	/// write mode line with a token that isn't a hex byte
	#[fail(display = "Invalid hex sequence.")]
	InvalidHexSequence,
	#[fail(display = "Not implemented")]
	NotImplemented,
}
