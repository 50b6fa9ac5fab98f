//! Frame accumulation and delivery
//!
//! The `FrameStore` collects tokens into the frame currently in progress,
//! moves each frame into a FIFO of completed frames when the end-of-frame
//! sentinel arrives, and answers consumer requests for whole frames or
//! incremental slices of the one still being written. Retention policy is
//! switchable at runtime: either every completed frame is kept until
//! delivered, or only the most recent one survives and older undelivered
//! frames are dropped under load.

use std::collections::VecDeque;

use crate::error::ProtocolError;

/// The token that closes the frame in progress
pub const TOKEN_END_OF_FRAME: &str = "approve";

/// What the consumer is asking for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameRequest {
	/// The next frame, complete if available, otherwise the start of the one
	/// in progress
	NextFrame,

	/// More of the frame whose delivery already began
	MoreOfSameFrame,
}

/// Classification of the data handed back for a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameResponse {
	/// A whole frame
	Complete,

	/// Nothing buffered at all
	NoNextFrame,

	/// First slice of a frame still being written
	BeginPartial,

	/// A further slice; the frame is still open
	ContinuePartial,

	/// The final slice; the frame closed while being delivered
	EndPartial,
}

/// Store for completed frames and the frame in progress.
///
/// Frames are stored as strings of tokens separated by a single space; the
/// end-of-frame sentinel itself is not stored. `store_all_frames` can be
/// changed at runtime and alters the behaviour of subsequent frame
/// completions only — frames already in the FIFO stay there.
#[derive(Debug)]
pub struct FrameStore {
	/// Retention policy: keep every completed frame, or only the latest
	store_all_frames: bool,

	complete_frames: VecDeque<String>,
	frame_in_progress: String,

	/// Part of a frame has been delivered, but not all of it
	part_way_through_delivery: bool,

	/// The partially delivered frame is still receiving tokens; once it
	/// closes, its tail moves to `remainder` and this flips off
	still_receiving: bool,

	/// Tail of a frame that closed while part way through delivery
	remainder: String,
}

impl Default for FrameStore {
	fn default() -> Self {
		FrameStore {
			// Keep everything until the viewer tells us it can tolerate drops
			store_all_frames: true,
			complete_frames: VecDeque::new(),
			frame_in_progress: String::new(),
			part_way_through_delivery: false,
			still_receiving: false,
			remainder: String::new(),
		}
	}
}

impl FrameStore {
	pub fn new() -> Self {
		FrameStore::default()
	}

	/// Append a token to the frame in progress; the end-of-frame sentinel
	/// closes the frame instead of being stored.
	pub fn append(&mut self, token: &str) {
		if token == TOKEN_END_OF_FRAME {
			self.end_frame();
			return;
		}
		if !self.frame_in_progress.is_empty() {
			self.frame_in_progress.push(' ');
		}
		self.frame_in_progress.push_str(token);
	}

	/// Tokens arriving after this point belong to a new frame.
	fn end_frame(&mut self) {
		// A frame that closed mid-delivery becomes the saved remainder; the
		// completed-frame FIFO is not touched and the drop policy never
		// applies to it
		if self.still_receiving {
			self.remainder = std::mem::take(&mut self.frame_in_progress);
			self.still_receiving = false;
			return;
		}

		if !self.store_all_frames {
			self.complete_frames.clear();
		}
		self.complete_frames.push_back(std::mem::take(&mut self.frame_in_progress));
	}

	/// Answer a consumer request with a response classification and the data
	/// to send.
	///
	/// `MoreOfSameFrame` with no outstanding partial delivery is a protocol
	/// violation. `NextFrame` while a partial delivery is outstanding is
	/// treated as `MoreOfSameFrame`: the slices of a frame stay contiguous
	/// and a fresh frame can only start after the end-partial response.
	pub fn request(
		&mut self,
		request: FrameRequest,
	) -> Result<(FrameResponse, String), ProtocolError> {
		if !self.part_way_through_delivery {
			if request == FrameRequest::MoreOfSameFrame {
				return Err(ProtocolError::MoreWithoutPartial);
			}
			return Ok(self.next_frame());
		}

		// Partial delivery outstanding: hand out the next slice
		if self.still_receiving {
			let data = std::mem::take(&mut self.frame_in_progress);
			Ok((FrameResponse::ContinuePartial, data))
		} else {
			self.part_way_through_delivery = false;
			let data = std::mem::take(&mut self.remainder);
			Ok((FrameResponse::EndPartial, data))
		}
	}

	fn next_frame(&mut self) -> (FrameResponse, String) {
		if let Some(frame) = self.complete_frames.pop_front() {
			return (FrameResponse::Complete, frame);
		}

		// No complete frame; send what we have of the next one, if anything
		if self.frame_in_progress.is_empty() {
			return (FrameResponse::NoNextFrame, String::new());
		}
		self.part_way_through_delivery = true;
		self.still_receiving = true;
		(FrameResponse::BeginPartial, std::mem::take(&mut self.frame_in_progress))
	}

	/// Switch the retention policy; applies to subsequent frame completions.
	pub fn set_store_all(&mut self, store_all: bool) {
		self.store_all_frames = store_all;
	}

	/// Number of completed, undelivered frames
	pub fn completed_count(&self) -> usize {
		self.complete_frames.len()
	}
}


// vim: ts=4
