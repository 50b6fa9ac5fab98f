//! Error types for framefeed operations

use std::error::Error;
use std::fmt;
use std::io;

/// Main error type for the feeder process
#[derive(Debug)]
pub enum FeedError {
	/// Tokenizer error (nested)
	Tokenize(TokenizeError),

	/// Protocol error (nested)
	Protocol(ProtocolError),

	/// Option error (nested)
	Option(OptionError),

	/// Viewer spawn error (nested)
	Spawn(SpawnError),

	/// I/O error
	Io(io::Error),

	/// Generic error message
	Other { message: String },
}

impl fmt::Display for FeedError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			FeedError::Tokenize(e) => write!(f, "Tokenizer error: {}", e),
			FeedError::Protocol(e) => write!(f, "Protocol error: {}", e),
			FeedError::Option(e) => write!(f, "Option error: {}", e),
			FeedError::Spawn(e) => write!(f, "Spawn error: {}", e),
			FeedError::Io(e) => write!(f, "I/O error: {}", e),
			FeedError::Other { message } => write!(f, "{}", message),
		}
	}
}

impl Error for FeedError {}

impl From<io::Error> for FeedError {
	fn from(e: io::Error) -> Self {
		FeedError::Io(e)
	}
}

impl From<String> for FeedError {
	fn from(e: String) -> Self {
		FeedError::Other { message: e }
	}
}

impl From<TokenizeError> for FeedError {
	fn from(e: TokenizeError) -> Self {
		FeedError::Tokenize(e)
	}
}

impl From<ProtocolError> for FeedError {
	fn from(e: ProtocolError) -> Self {
		FeedError::Protocol(e)
	}
}

impl From<OptionError> for FeedError {
	fn from(e: OptionError) -> Self {
		FeedError::Option(e)
	}
}

impl From<SpawnError> for FeedError {
	fn from(e: SpawnError) -> Self {
		FeedError::Spawn(e)
	}
}

/// Tokenizer-specific errors
#[derive(Debug)]
pub enum TokenizeError {
	/// Closing delimiter with no matching opener, or the wrong opener on top
	DelimiterMismatch { found: char, buffer: String },

	/// I/O error while reading the input stream
	Io(io::Error),
}

impl fmt::Display for TokenizeError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			TokenizeError::DelimiterMismatch { found, buffer } => {
				write!(f, "Unmatched closing delimiter {} in '{}'", found, buffer)
			}
			TokenizeError::Io(e) => write!(f, "Failed to read input stream: {}", e),
		}
	}
}

impl Error for TokenizeError {}

impl From<io::Error> for TokenizeError {
	fn from(e: io::Error) -> Self {
		TokenizeError::Io(e)
	}
}

/// Signal/response protocol errors
#[derive(Debug)]
pub enum ProtocolError {
	/// A signal byte outside the reserved set
	UnrecognizedSignal { byte: u8 },

	/// More-of-frame requested with no outstanding partial delivery
	MoreWithoutPartial,

	/// Header line that does not parse as `<code> <line-count>`
	MalformedHeader { line: String },

	/// A response code the current exchange did not allow
	UnexpectedResponse { expected: &'static str, got: char },

	/// The peer closed its side of the pipe mid-exchange
	Disconnected,

	/// I/O error on the signal or response stream
	Io(io::Error),
}

impl fmt::Display for ProtocolError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ProtocolError::UnrecognizedSignal { byte } => {
				write!(f, "Unrecognised signal: 0x{:02x}", byte)
			}
			ProtocolError::MoreWithoutPartial => {
				write!(f, "More of a frame requested, but no partial delivery is outstanding")
			}
			ProtocolError::MalformedHeader { line } => {
				write!(f, "Malformed response header: '{}'", line)
			}
			ProtocolError::UnexpectedResponse { expected, got } => {
				write!(f, "Expected {} response, got '{}'", expected, got)
			}
			ProtocolError::Disconnected => write!(f, "Peer disconnected"),
			ProtocolError::Io(e) => write!(f, "Protocol I/O error: {}", e),
		}
	}
}

impl Error for ProtocolError {}

impl From<io::Error> for ProtocolError {
	fn from(e: io::Error) -> Self {
		ProtocolError::Io(e)
	}
}

/// Typed option parsing and encoding errors
#[derive(Debug)]
pub enum OptionError {
	/// Option name not in the declared set
	UnknownOption { name: String },

	/// Value that does not parse as the option's declared kind
	InvalidValue { name: String, value: String, expected: &'static str },

	/// A name arrived with no value following it
	MissingValue { name: String },

	/// String value containing both quote characters cannot be encoded
	UnquotableValue { name: String },

	/// Options blob with an unterminated quoted value
	UnterminatedQuote { input: String },
}

impl fmt::Display for OptionError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			OptionError::UnknownOption { name } => write!(f, "Unknown option: {}", name),
			OptionError::InvalidValue { name, value, expected } => {
				write!(f, "Option {} expects {}, got '{}'", name, expected, value)
			}
			OptionError::MissingValue { name } => {
				write!(f, "Option {} has no value", name)
			}
			OptionError::UnquotableValue { name } => {
				write!(f, "Value of {} can't contain both double and single quotes", name)
			}
			OptionError::UnterminatedQuote { input } => {
				write!(f, "Unterminated quote in options data: '{}'", input)
			}
		}
	}
}

impl Error for OptionError {}

/// Viewer subprocess errors
#[derive(Debug)]
pub enum SpawnError {
	/// Subprocess spawn failed
	SpawnFailed { cmd: String, source: io::Error },

	/// Stdio unavailable on the spawned child
	StdioUnavailable { what: String },

	/// The feeder executable path could not be determined
	ExecutableUnknown { source: io::Error },
}

impl fmt::Display for SpawnError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			SpawnError::SpawnFailed { cmd, source } => {
				write!(f, "Failed to spawn '{}': {}", cmd, source)
			}
			SpawnError::StdioUnavailable { what } => {
				write!(f, "Stdio unavailable: {}", what)
			}
			SpawnError::ExecutableUnknown { source } => {
				write!(f, "Cannot locate own executable: {}", source)
			}
		}
	}
}

impl Error for SpawnError {}

// vim: ts=4
