//! Viewer entry point
//!
//! The viewer is spawned by the feeder and talks to it over its own
//! stdin/stdout. It first polls for the options blob, applies it, then tells
//! the feeder which retention policy its display mode needs, and finally
//! pulls frames — reassembling partial deliveries into whole frames — and
//! hands each one to a sink. The built-in sink logs the frame text; a
//! graphical renderer would plug in at the same seam.

use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncWrite, BufReader};

use crate::error::{FeedError, ProtocolError};
use crate::logging::*;
use crate::options::{DisplayMode, OptionSet};
use crate::protocol::client;
use crate::protocol::wire::{ResponseCode, Signal};

/// Pull frames forever, invoking the sink once per complete logical frame.
///
/// Between polls the loop sleeps for the configured refresh time; while a
/// partial frame is open it keeps asking for more with a short nap whenever
/// a slice comes back empty, so a stalled producer does not spin us.
pub async fn run_frame_loop<W, R, F>(
	signal_tx: &mut W,
	response_rx: &mut R,
	options: &OptionSet,
	mut sink: F,
) -> Result<(), FeedError>
where
	W: AsyncWrite + Unpin,
	R: AsyncBufRead + Unpin,
	F: FnMut(&str),
{
	let refresh = Duration::from_millis(options.window_update_time_ms());

	loop {
		match client::exchange(signal_tx, response_rx, Signal::NextFrame).await {
			Ok((ResponseCode::CompleteFrame, data)) => sink(&data),
			Ok((ResponseCode::NoNextFrame, _)) => tokio::time::sleep(refresh).await,
			Ok((ResponseCode::BeginPartialFrame, first_slice)) => {
				let frame = collect_partial(signal_tx, response_rx, first_slice).await?;
				sink(&frame);
			}
			Ok((other, _)) => {
				return Err(ProtocolError::UnexpectedResponse {
					expected: "a frame",
					got: other.to_byte() as char,
				}
				.into());
			}
			Err(ProtocolError::Disconnected) => {
				info!("Feeder closed the pipe, viewer exiting");
				return Ok(());
			}
			Err(e) => return Err(e.into()),
		}
	}
}

/// Keep requesting more of the current frame until the end-partial response,
/// concatenating the slices into one logical frame.
async fn collect_partial<W, R>(
	signal_tx: &mut W,
	response_rx: &mut R,
	first_slice: String,
) -> Result<String, FeedError>
where
	W: AsyncWrite + Unpin,
	R: AsyncBufRead + Unpin,
{
	let mut frame = first_slice;
	loop {
		match client::exchange(signal_tx, response_rx, Signal::MoreOfSameFrame).await? {
			(ResponseCode::ContinuePartialFrame, slice) => {
				if slice.is_empty() {
					// Nothing new yet; give the producer a moment
					tokio::time::sleep(Duration::from_millis(10)).await;
				} else {
					if !frame.is_empty() {
						frame.push(' ');
					}
					frame.push_str(&slice);
				}
			}
			(ResponseCode::EndPartialFrame, slice) => {
				if !slice.is_empty() {
					if !frame.is_empty() {
						frame.push(' ');
					}
					frame.push_str(&slice);
				}
				return Ok(frame);
			}
			(other, _) => {
				return Err(ProtocolError::UnexpectedResponse {
					expected: "a partial frame slice",
					got: other.to_byte() as char,
				}
				.into());
			}
		}
	}
}

/// Viewer main: options handshake, drop-mode selection, then the frame loop.
pub async fn viewer_main() -> Result<(), FeedError> {
	let mut signal_tx = tokio::io::stdout();
	let mut response_rx = BufReader::new(tokio::io::stdin());

	let blob = client::fetch_options(&mut signal_tx, &mut response_rx).await?;
	let mut options = OptionSet::default();
	options.apply_blob(&blob)?;
	if options.verbose() {
		info!("Options applied: {}", blob);
	}

	// Live and inspect_drop tolerate missed frames; inspect_nodrop must see
	// every frame
	let allow_drop =
		matches!(options.mode(), DisplayMode::Live | DisplayMode::InspectDrop);
	client::set_drop_mode(&mut signal_tx, &mut response_rx, allow_drop).await?;

	info!("Viewer ready: '{}', mode {}", options.window_title(), options.mode().name());
	run_frame_loop(&mut signal_tx, &mut response_rx, &options, |frame| {
		info!("Frame: {}", frame);
	})
	.await
}

// vim: ts=4
