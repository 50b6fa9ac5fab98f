//! Feeder-side protocol engine
//!
//! Strict one-request-one-response loop driven by the viewer: read a single
//! signal byte, consult the stores, write the framed response and flush
//! before awaiting the next signal. The ingestion pipeline runs in its own
//! task and only meets this loop at the shared store handle.

use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};
use tokio::sync::Mutex;

use crate::error::{FeedError, ProtocolError};
use crate::frames::FrameRequest;
use crate::logging::*;
use crate::protocol::wire::{self, ResponseCode, Signal};
use crate::selector::StoreSelector;

/// Run the exchange loop until the viewer closes its signal stream.
///
/// EOF on the signal stream and a broken response pipe are both normal
/// termination. An unrecognised signal byte or a more-of-frame request with
/// no outstanding partial delivery is fatal.
pub async fn run_engine<R, W>(
	stores: Arc<Mutex<StoreSelector>>,
	mut signal_rx: R,
	mut response_tx: W,
) -> Result<(), FeedError>
where
	R: AsyncRead + Unpin,
	W: AsyncWrite + Unpin,
{
	let mut byte = [0u8; 1];
	loop {
		let n = signal_rx.read(&mut byte).await.map_err(ProtocolError::Io)?;
		if n == 0 {
			debug!("Viewer closed its signal stream, ending exchange loop");
			return Ok(());
		}

		let signal = Signal::from_byte(byte[0])
			.ok_or(ProtocolError::UnrecognizedSignal { byte: byte[0] })?;

		let (code, data) = {
			let mut stores = stores.lock().await;
			match signal {
				Signal::NextFrame => {
					let (response, data) = stores.frames.request(FrameRequest::NextFrame)?;
					(ResponseCode::from(response), data)
				}
				Signal::MoreOfSameFrame => {
					let (response, data) = stores.frames.request(FrameRequest::MoreOfSameFrame)?;
					(ResponseCode::from(response), data)
				}
				Signal::SendOptions => {
					let (ready, blob) = stores.options.snapshot();
					if ready {
						(ResponseCode::Options, blob)
					} else {
						(ResponseCode::OptionsNotReady, String::new())
					}
				}
				Signal::EnterDropMode => {
					stores.frames.set_store_all(false);
					(ResponseCode::Acknowledge, String::new())
				}
				Signal::EnterNodropMode => {
					stores.frames.set_store_all(true);
					(ResponseCode::Acknowledge, String::new())
				}
			}
		};

		if let Err(e) = wire::write_response(&mut response_tx, code, &data).await {
			// The viewer going away mid-write is a normal way to stop
			if let ProtocolError::Io(ref io_err) = e {
				if io_err.kind() == std::io::ErrorKind::BrokenPipe {
					debug!("Viewer pipe closed during response write");
					return Ok(());
				}
			}
			return Err(e.into());
		}
	}
}

// vim: ts=4
