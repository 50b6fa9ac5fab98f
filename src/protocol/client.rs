//! Viewer-side protocol helpers
//!
//! The viewer owns the other end of the pipe pair: it writes single signal
//! bytes to its stdout and reads framed responses from its stdin. These
//! helpers keep the exchange strictly synchronous — one signal out, one
//! response back.

use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncWrite, AsyncWriteExt};

use crate::error::ProtocolError;
use crate::logging::*;
use crate::protocol::wire::{self, ResponseCode, Signal};

/// How long to wait between options polls while the feeder is still
/// collecting the options block
const OPTIONS_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Send one signal byte and read the response that answers it.
pub async fn exchange<W, R>(
	signal_tx: &mut W,
	response_rx: &mut R,
	signal: Signal,
) -> Result<(ResponseCode, String), ProtocolError>
where
	W: AsyncWrite + Unpin,
	R: AsyncBufRead + Unpin,
{
	signal_tx.write_all(&[signal.to_byte()]).await?;
	signal_tx.flush().await?;
	wire::read_response(response_rx).await
}

/// Fetch the options blob, polling with a short backoff until the feeder has
/// absorbed the whole options block.
pub async fn fetch_options<W, R>(
	signal_tx: &mut W,
	response_rx: &mut R,
) -> Result<String, ProtocolError>
where
	W: AsyncWrite + Unpin,
	R: AsyncBufRead + Unpin,
{
	loop {
		match exchange(signal_tx, response_rx, Signal::SendOptions).await? {
			(ResponseCode::Options, blob) => return Ok(blob),
			(ResponseCode::OptionsNotReady, _) => {
				debug!("Options not ready yet, retrying");
				tokio::time::sleep(OPTIONS_POLL_INTERVAL).await;
			}
			(other, _) => {
				return Err(ProtocolError::UnexpectedResponse {
					expected: "options",
					got: other.to_byte() as char,
				});
			}
		}
	}
}

/// Tell the feeder whether it may drop stale frames; expects an acknowledge.
pub async fn set_drop_mode<W, R>(
	signal_tx: &mut W,
	response_rx: &mut R,
	allow_drop: bool,
) -> Result<(), ProtocolError>
where
	W: AsyncWrite + Unpin,
	R: AsyncBufRead + Unpin,
{
	let signal = if allow_drop { Signal::EnterDropMode } else { Signal::EnterNodropMode };
	match exchange(signal_tx, response_rx, signal).await? {
		(ResponseCode::Acknowledge, _) => Ok(()),
		(other, _) => Err(ProtocolError::UnexpectedResponse {
			expected: "acknowledge",
			got: other.to_byte() as char,
		}),
	}
}

// vim: ts=4
