//! # FrameFeed - Streaming Frame Server for Drawing Commands
//!
//! FrameFeed ingests an unbounded stream of drawing commands on stdin,
//! groups it into frames delimited by the `approve` sentinel, and serves
//! those frames on demand to a spawned viewer process over a pipe pair —
//! dropping stale frames under load instead of blocking the producer.
//!
//! ## Pipeline
//!
//! ```text
//! stdin bytes -> Tokenizer -> StoreSelector -> { OptionsStore | FrameStore }
//!                                                       ^
//!                             Protocol Engine <---------+
//!                             (viewer signals in, framed responses out)
//! ```
//!
//! The ingest pipeline and the protocol engine run as two tokio tasks
//! sharing the stores behind a single mutex-guarded handle.

pub mod connection;
pub mod error;
pub mod feed;
pub mod frames;
pub mod logging;
pub mod options;
pub mod protocol;
pub mod selector;
pub mod tokenizer;
pub mod viewer;

// Re-export commonly used types and functions
pub use error::{FeedError, OptionError, ProtocolError, SpawnError, TokenizeError};
pub use frames::{FrameRequest, FrameResponse, FrameStore, TOKEN_END_OF_FRAME};
pub use options::{DisplayMode, OptionSet, OptionsStore};
pub use protocol::{ResponseCode, Signal};
pub use selector::StoreSelector;
pub use tokenizer::Tokenizer;

// vim: ts=4
