//! Wire encoding of the signal/response exchange
//!
//! The viewer writes a single signal byte and then reads one response: a
//! header line `<code> <line-count>` followed by exactly that many payload
//! lines. An empty payload is encoded as a line count of zero. Signal bytes
//! and response codes live in separate byte streams, so the two namespaces
//! may overlap harmlessly.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::ProtocolError;
use crate::frames::FrameResponse;

/// A request signal from the viewer, one byte each
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
	/// Give us the global options
	SendOptions,

	/// Give us the next frame, complete or incomplete
	NextFrame,

	/// Give us more of the frame that you previously gave us
	MoreOfSameFrame,

	/// Allow yourself to drop frames
	EnterDropMode,

	/// You must keep all the frames!
	EnterNodropMode,
}

impl Signal {
	pub fn from_byte(byte: u8) -> Option<Signal> {
		match byte {
			b'a' => Some(Signal::SendOptions),
			b'n' => Some(Signal::NextFrame),
			b'm' => Some(Signal::MoreOfSameFrame),
			b'd' => Some(Signal::EnterDropMode),
			b'e' => Some(Signal::EnterNodropMode),
			_ => None,
		}
	}

	pub fn to_byte(self) -> u8 {
		match self {
			Signal::SendOptions => b'a',
			Signal::NextFrame => b'n',
			Signal::MoreOfSameFrame => b'm',
			Signal::EnterDropMode => b'd',
			Signal::EnterNodropMode => b'e',
		}
	}
}

/// A response status label, one byte each
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseCode {
	/// I did the thing that you told me to do, don't expect any data
	Acknowledge,

	/// You asked for options, here they are
	Options,

	/// You asked for options, but you should try again in a bit
	OptionsNotReady,

	CompleteFrame,

	/// You asked for a new frame, but there is none
	NoNextFrame,

	BeginPartialFrame,

	/// I am returning more of a partial frame, but still not done
	ContinuePartialFrame,

	/// I am returning the remainder of a partial frame
	EndPartialFrame,
}

impl ResponseCode {
	pub fn from_byte(byte: u8) -> Option<ResponseCode> {
		match byte {
			b'-' => Some(ResponseCode::Acknowledge),
			b'a' => Some(ResponseCode::Options),
			b'b' => Some(ResponseCode::OptionsNotReady),
			b'f' => Some(ResponseCode::CompleteFrame),
			b'o' => Some(ResponseCode::NoNextFrame),
			b'p' => Some(ResponseCode::BeginPartialFrame),
			b'c' => Some(ResponseCode::ContinuePartialFrame),
			b'e' => Some(ResponseCode::EndPartialFrame),
			_ => None,
		}
	}

	pub fn to_byte(self) -> u8 {
		match self {
			ResponseCode::Acknowledge => b'-',
			ResponseCode::Options => b'a',
			ResponseCode::OptionsNotReady => b'b',
			ResponseCode::CompleteFrame => b'f',
			ResponseCode::NoNextFrame => b'o',
			ResponseCode::BeginPartialFrame => b'p',
			ResponseCode::ContinuePartialFrame => b'c',
			ResponseCode::EndPartialFrame => b'e',
		}
	}
}

impl From<FrameResponse> for ResponseCode {
	fn from(response: FrameResponse) -> Self {
		match response {
			FrameResponse::Complete => ResponseCode::CompleteFrame,
			FrameResponse::NoNextFrame => ResponseCode::NoNextFrame,
			FrameResponse::BeginPartial => ResponseCode::BeginPartialFrame,
			FrameResponse::ContinuePartial => ResponseCode::ContinuePartialFrame,
			FrameResponse::EndPartial => ResponseCode::EndPartialFrame,
		}
	}
}

/// Write a response code and its payload, then flush so the viewer's
/// blocking read completes now rather than at the next buffer spill.
pub async fn write_response<W: AsyncWrite + Unpin>(
	writer: &mut W,
	code: ResponseCode,
	data: &str,
) -> Result<(), ProtocolError> {
	let lines: Vec<&str> = if data.is_empty() { Vec::new() } else { data.split('\n').collect() };

	let header = format!("{} {}\n", code.to_byte() as char, lines.len());
	writer.write_all(header.as_bytes()).await?;
	for line in &lines {
		writer.write_all(line.as_bytes()).await?;
		writer.write_all(b"\n").await?;
	}
	writer.flush().await?;
	Ok(())
}

/// Read one response: header line, then the announced number of payload
/// lines, re-joined with newlines.
pub async fn read_response<R: AsyncBufRead + Unpin>(
	reader: &mut R,
) -> Result<(ResponseCode, String), ProtocolError> {
	let mut line = String::new();
	if reader.read_line(&mut line).await? == 0 {
		return Err(ProtocolError::Disconnected);
	}

	let malformed = || ProtocolError::MalformedHeader { line: line.trim_end().to_string() };
	let mut fields = line.split_whitespace();
	let code = fields
		.next()
		.filter(|s| s.len() == 1)
		.and_then(|s| ResponseCode::from_byte(s.as_bytes()[0]))
		.ok_or_else(malformed)?;
	let num_lines =
		fields.next().and_then(|s| s.parse::<usize>().ok()).ok_or_else(malformed)?;
	if fields.next().is_some() {
		return Err(malformed());
	}

	let mut data = String::new();
	for i in 0..num_lines {
		if i > 0 {
			data.push('\n');
		}
		let mut payload_line = String::new();
		if reader.read_line(&mut payload_line).await? == 0 {
			return Err(ProtocolError::Disconnected);
		}
		// Strip the single trailing newline; the payload may itself end in
		// an empty final line
		if payload_line.ends_with('\n') {
			payload_line.pop();
		}
		data.push_str(&payload_line);
	}

	Ok((code, data))
}

#[cfg(test)]
mod tests {
	use super::*;

	async fn roundtrip(code: ResponseCode, data: &str) -> (ResponseCode, String) {
		let mut encoded: Vec<u8> = Vec::new();
		write_response(&mut encoded, code, data).await.unwrap();
		let mut reader = &encoded[..];
		read_response(&mut reader).await.unwrap()
	}

	#[tokio::test]
	async fn test_single_line_payload() {
		let (code, data) = roundtrip(ResponseCode::CompleteFrame, "a b c").await;
		assert_eq!(code, ResponseCode::CompleteFrame);
		assert_eq!(data, "a b c");
	}

	#[tokio::test]
	async fn test_multi_line_payload() {
		let (code, data) = roundtrip(ResponseCode::Options, "one\ntwo\nthree").await;
		assert_eq!(code, ResponseCode::Options);
		assert_eq!(data, "one\ntwo\nthree");
	}

	#[tokio::test]
	async fn test_empty_payload_is_zero_lines() {
		let mut encoded: Vec<u8> = Vec::new();
		write_response(&mut encoded, ResponseCode::Acknowledge, "").await.unwrap();
		assert_eq!(encoded, b"- 0\n");

		let mut reader = &encoded[..];
		let (code, data) = read_response(&mut reader).await.unwrap();
		assert_eq!(code, ResponseCode::Acknowledge);
		assert_eq!(data, "");
	}

	#[tokio::test]
	async fn test_unknown_code_is_malformed() {
		let mut reader = &b"z 0\n"[..];
		assert!(matches!(
			read_response(&mut reader).await,
			Err(ProtocolError::MalformedHeader { .. })
		));
	}

	#[tokio::test]
	async fn test_missing_line_count_is_malformed() {
		let mut reader = &b"f\n"[..];
		assert!(matches!(
			read_response(&mut reader).await,
			Err(ProtocolError::MalformedHeader { .. })
		));
	}

	#[tokio::test]
	async fn test_eof_mid_payload_is_disconnect() {
		let mut reader = &b"f 2\nonly one line\n"[..];
		assert!(matches!(read_response(&mut reader).await, Err(ProtocolError::Disconnected)));
	}

	#[tokio::test]
	async fn test_eof_at_header_is_disconnect() {
		let mut reader = &b""[..];
		assert!(matches!(read_response(&mut reader).await, Err(ProtocolError::Disconnected)));
	}

	#[test]
	fn test_signal_bytes_roundtrip() {
		for signal in [
			Signal::SendOptions,
			Signal::NextFrame,
			Signal::MoreOfSameFrame,
			Signal::EnterDropMode,
			Signal::EnterNodropMode,
		] {
			assert_eq!(Signal::from_byte(signal.to_byte()), Some(signal));
		}
		assert_eq!(Signal::from_byte(b'x'), None);
	}
}

// vim: ts=4
