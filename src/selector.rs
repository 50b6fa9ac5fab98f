//! Token routing between the options store and the frame store
//!
//! The `StoreSelector` owns both stores and is the single handle through
//! which the ingest task and the protocol engine reach them — explicit owned
//! state rather than process-wide singletons. Each token from the tokenizer
//! goes to exactly one store: the options store while the stream's leading
//! options block lasts, the frame store forever after.

use crate::frames::FrameStore;
use crate::options::{OptionsStore, TOKEN_END_OPTIONS, TOKEN_START_OPTIONS};

/// Routes tokens and owns the two stores they land in
#[derive(Debug)]
pub struct StoreSelector {
	pub options: OptionsStore,
	pub frames: FrameStore,

	just_started: bool,
	in_options: bool,
}

impl Default for StoreSelector {
	fn default() -> Self {
		StoreSelector::new()
	}
}

impl StoreSelector {
	pub fn new() -> Self {
		StoreSelector {
			options: OptionsStore::new(),
			frames: FrameStore::new(),
			just_started: true,
			in_options: false,
		}
	}

	/// Hand a token to the appropriate store. Zero-length tokens are
	/// discarded outright; they arise from consecutive separators and from
	/// end-of-input flushes, and are never real tokens.
	pub fn route(&mut self, token: &str) {
		if token.is_empty() {
			return;
		}

		// The very first real token decides whether an options block exists.
		// If it does not open one, the options store is ready immediately.
		if self.just_started {
			self.just_started = false;
			if token == TOKEN_START_OPTIONS {
				self.in_options = true;
			} else {
				self.options.mark_not_coming();
			}
		}

		if self.in_options {
			self.options.observe(token);
			if token == TOKEN_END_OPTIONS {
				self.in_options = false;
			}
		} else {
			self.frames.append(token);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::frames::{FrameRequest, FrameResponse, TOKEN_END_OF_FRAME};

	fn route_all(selector: &mut StoreSelector, tokens: &[&str]) {
		for token in tokens {
			selector.route(token);
		}
	}

	#[test]
	fn test_options_block_then_frames() {
		let mut selector = StoreSelector::new();
		route_all(
			&mut selector,
			&["options", "window_width", "600", "endoptions", "a", TOKEN_END_OF_FRAME],
		);
		assert_eq!(selector.options.snapshot(), (true, "window_width 600".to_string()));
		assert_eq!(selector.frames.completed_count(), 1);
	}

	#[test]
	fn test_no_options_block() {
		let mut selector = StoreSelector::new();
		route_all(&mut selector, &["a", "b", TOKEN_END_OF_FRAME]);
		assert_eq!(selector.options.snapshot(), (true, String::new()));
		let (response, data) = selector.frames.request(FrameRequest::NextFrame).unwrap();
		assert_eq!(response, FrameResponse::Complete);
		assert_eq!(data, "a b");
	}

	#[test]
	fn test_empty_tokens_discarded() {
		let mut selector = StoreSelector::new();
		// An empty first token must not count as the options decision
		route_all(&mut selector, &["", "options", "verbose", "true", "endoptions"]);
		assert_eq!(selector.options.snapshot(), (true, "verbose true".to_string()));
	}

	#[test]
	fn test_options_token_later_in_stream_is_data() {
		let mut selector = StoreSelector::new();
		route_all(&mut selector, &["a", "options", TOKEN_END_OF_FRAME]);
		let (_, data) = selector.frames.request(FrameRequest::NextFrame).unwrap();
		assert_eq!(data, "a options");
	}

	#[test]
	fn test_routing_is_permanent_after_endoptions() {
		let mut selector = StoreSelector::new();
		route_all(
			&mut selector,
			&["options", "endoptions", "endoptions", "x", TOKEN_END_OF_FRAME],
		);
		// The second endoptions is plain frame data
		let (_, data) = selector.frames.request(FrameRequest::NextFrame).unwrap();
		assert_eq!(data, "endoptions x");
	}
}

// vim: ts=4
