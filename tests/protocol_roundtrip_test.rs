/// Protocol exchange tests
///
/// Drive the feeder-side engine with scripted signal bytes and in-memory
/// pipes, and check the exact response transcript: options handover,
/// complete/partial frame delivery, retention-mode switches, and the fatal
/// paths for protocol violations.
use std::sync::Arc;

use tokio::io::BufReader;
use tokio::sync::Mutex;

use framefeed::error::{FeedError, ProtocolError};
use framefeed::feed::run_ingest;
use framefeed::protocol::client;
use framefeed::protocol::engine::run_engine;
use framefeed::protocol::wire::{read_response, ResponseCode, Signal};
use framefeed::selector::StoreSelector;

type Shared = Arc<Mutex<StoreSelector>>;

fn shared_stores() -> Shared {
	Arc::new(Mutex::new(StoreSelector::new()))
}

async fn ingest(stores: &Shared, input: &str) {
	run_ingest(Arc::clone(stores), input.as_bytes()).await.unwrap();
}

/// Run the engine over a scripted signal byte string and return the decoded
/// response transcript.
async fn transcript(stores: &Shared, signals: &[u8]) -> Vec<(ResponseCode, String)> {
	let mut responses: Vec<u8> = Vec::new();
	run_engine(Arc::clone(stores), signals, &mut responses).await.unwrap();

	let mut decoded = Vec::new();
	let mut reader = &responses[..];
	loop {
		match read_response(&mut reader).await {
			Ok(entry) => decoded.push(entry),
			Err(ProtocolError::Disconnected) => break,
			Err(e) => panic!("bad transcript: {}", e),
		}
	}
	decoded
}

// ===================================================================
// OPTIONS HANDOVER
// ===================================================================

#[tokio::test]
async fn test_options_not_ready_before_end_sentinel() {
	let stores = shared_stores();
	// Options block opened but never terminated, and ingest still running:
	// route the tokens by hand so mark_not_coming is not triggered
	{
		let mut guard = stores.lock().await;
		for token in ["options", "window_width", "600"] {
			guard.route(token);
		}
	}
	let t = transcript(&stores, b"a").await;
	assert_eq!(t, vec![(ResponseCode::OptionsNotReady, String::new())]);
}

#[tokio::test]
async fn test_options_served_once_ready() {
	let stores = shared_stores();
	ingest(&stores, "options window_width 600 endoptions x approve ").await;
	let t = transcript(&stores, b"a").await;
	assert_eq!(t, vec![(ResponseCode::Options, "window_width 600".to_string())]);
}

#[tokio::test]
async fn test_no_options_block_is_ready_and_empty() {
	let stores = shared_stores();
	ingest(&stores, "x approve ").await;
	let t = transcript(&stores, b"a").await;
	assert_eq!(t, vec![(ResponseCode::Options, String::new())]);
}

// ===================================================================
// FRAME DELIVERY
// ===================================================================

#[tokio::test]
async fn test_complete_frames_in_order_then_none() {
	let stores = shared_stores();
	ingest(&stores, "a b approve c d approve ").await;
	let t = transcript(&stores, b"nnn").await;
	assert_eq!(
		t,
		vec![
			(ResponseCode::CompleteFrame, "a b".to_string()),
			(ResponseCode::CompleteFrame, "c d".to_string()),
			(ResponseCode::NoNextFrame, String::new()),
		]
	);
}

#[tokio::test]
async fn test_partial_delivery_across_ingest_progress() {
	let stores = shared_stores();

	// The frame is still open: the first request begins a partial delivery
	{
		let mut guard = stores.lock().await;
		for token in ["a", "b"] {
			guard.route(token);
		}
	}
	let t = transcript(&stores, b"n").await;
	assert_eq!(t, vec![(ResponseCode::BeginPartialFrame, "a b".to_string())]);

	// More tokens arrive, then the frame closes
	{
		let mut guard = stores.lock().await;
		for token in ["c", "approve"] {
			guard.route(token);
		}
	}
	let t = transcript(&stores, b"m").await;
	assert_eq!(t, vec![(ResponseCode::EndPartialFrame, "c".to_string())]);
}

#[tokio::test]
async fn test_drop_and_nodrop_switch_acknowledged() {
	let stores = shared_stores();
	ingest(&stores, "f1 approve ").await;

	let t = transcript(&stores, b"d").await;
	assert_eq!(t, vec![(ResponseCode::Acknowledge, String::new())]);

	// Each frame completing in drop mode displaces everything undelivered,
	// including f1 from before the switch
	ingest(&stores, "f2 approve f3 approve ").await;
	assert_eq!(stores.lock().await.frames.completed_count(), 1);

	let t = transcript(&stores, b"enn").await;
	assert_eq!(
		t,
		vec![
			(ResponseCode::Acknowledge, String::new()),
			(ResponseCode::CompleteFrame, "f3".to_string()),
			(ResponseCode::NoNextFrame, String::new()),
		]
	);
}

// ===================================================================
// FATAL PATHS
// ===================================================================

#[tokio::test]
async fn test_unrecognized_signal_is_fatal() {
	let stores = shared_stores();
	let mut responses: Vec<u8> = Vec::new();
	let err = run_engine(stores, &b"z"[..], &mut responses).await.unwrap_err();
	assert!(matches!(
		err,
		FeedError::Protocol(ProtocolError::UnrecognizedSignal { byte: b'z' })
	));
}

#[tokio::test]
async fn test_more_of_frame_without_partial_is_fatal() {
	let stores = shared_stores();
	let mut responses: Vec<u8> = Vec::new();
	let err = run_engine(stores, &b"m"[..], &mut responses).await.unwrap_err();
	assert!(matches!(err, FeedError::Protocol(ProtocolError::MoreWithoutPartial)));
}

// ===================================================================
// FULL DUPLEX EXCHANGE (client helpers against a live engine)
// ===================================================================

#[tokio::test]
async fn test_client_polls_options_until_ready() {
	let stores = shared_stores();

	let (client_sig, server_sig) = tokio::io::duplex(64);
	let (server_resp, client_resp) = tokio::io::duplex(4096);

	let engine_stores = Arc::clone(&stores);
	let engine = tokio::spawn(run_engine(engine_stores, server_sig, server_resp));

	// Options become ready only after a short delay, forcing one retry
	let ingest_stores = Arc::clone(&stores);
	tokio::spawn(async move {
		tokio::time::sleep(std::time::Duration::from_millis(30)).await;
		run_ingest(ingest_stores, &b"options verbose true endoptions go approve "[..])
			.await
			.unwrap();
	});

	let mut signal_tx = client_sig;
	let mut response_rx = BufReader::new(client_resp);

	let blob = client::fetch_options(&mut signal_tx, &mut response_rx).await.unwrap();
	assert_eq!(blob, "verbose true");

	client::set_drop_mode(&mut signal_tx, &mut response_rx, true).await.unwrap();

	let (code, data) =
		client::exchange(&mut signal_tx, &mut response_rx, Signal::NextFrame).await.unwrap();
	assert_eq!(code, ResponseCode::CompleteFrame);
	assert_eq!(data, "go");

	// Closing the signal pipe ends the engine loop cleanly
	drop(signal_tx);
	engine.await.unwrap().unwrap();
}

// vim: ts=4
