//! Feeder entry point and task orchestration
//!
//! The feeder runs two cooperating tasks against the shared stores: the
//! ingest pipeline (tokenizer → selector) pulling from its own stdin, and
//! the protocol engine answering the viewer's signals on the child's pipe
//! pair. Ingestion finishing does not stop the process — the viewer stays
//! alive and keeps being served whatever was buffered. The engine loop
//! ending (viewer quit) tears everything down.

use std::sync::Arc;

use tokio::io::{AsyncBufRead, BufReader};
use tokio::sync::Mutex;

use crate::connection;
use crate::error::FeedError;
use crate::logging::*;
use crate::protocol::engine::run_engine;
use crate::selector::StoreSelector;
use crate::tokenizer::Tokenizer;

/// Run the ingest pipeline to the end of the input stream.
pub async fn run_ingest<R: AsyncBufRead + Unpin>(
	stores: Arc<Mutex<StoreSelector>>,
	source: R,
) -> Result<(), FeedError> {
	let mut tokenizer = Tokenizer::new(source);
	while let Some(token) = tokenizer.next_token().await? {
		stores.lock().await.route(&token);
	}

	// End of input. If the stream never terminated its options block, serve
	// what was collected instead of making the viewer poll forever.
	let mut stores = stores.lock().await;
	stores.options.mark_not_coming();
	debug!("Input stream exhausted, {} complete frames buffered", stores.frames.completed_count());
	Ok(())
}

/// Feeder main: seed the CLI option overrides, spawn the viewer, then run
/// ingestion and the protocol engine concurrently.
///
/// A tokenizer failure is fatal for the whole process. The engine loop
/// returning (viewer closed its pipe, or a protocol violation) ends the run;
/// either way the ingest task is dropped and the viewer is killed
/// best-effort on the way out.
pub async fn feed_main(option_seed: String) -> Result<(), FeedError> {
	let stores = Arc::new(Mutex::new(StoreSelector::new()));
	stores.lock().await.options.seed(&option_seed);

	let mut viewer = connection::spawn_viewer()?;

	let ingest_stores = Arc::clone(&stores);
	let mut ingest = tokio::spawn(async move {
		let stdin = BufReader::new(tokio::io::stdin());
		run_ingest(ingest_stores, stdin).await
	});
	let mut ingest_running = true;

	let result = {
		let (send, recv) = viewer.io();
		let engine = run_engine(Arc::clone(&stores), recv, send);
		tokio::pin!(engine);

		loop {
			tokio::select! {
				res = &mut ingest, if ingest_running => {
					ingest_running = false;
					match res {
						Ok(Ok(())) => {} // keep serving buffered frames
						Ok(Err(e)) => break Err(e),
						Err(join_err) => {
							break Err(FeedError::Other {
								message: format!("Ingest task failed: {}", join_err),
							});
						}
					}
				}
				res = &mut engine => break res,
			}
		}
	};

	if ingest_running {
		ingest.abort();
	}
	viewer.terminate().await;

	if let Err(ref e) = result {
		error!("Feeder terminating: {}", e);
	}
	result
}

// vim: ts=4
