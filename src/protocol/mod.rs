//! Signal/response protocol between feeder and viewer
//!
//! One half-duplex request/response channel multiplexes frame delivery and
//! the one-time options handover: the viewer writes single signal bytes, the
//! feeder answers each with a response code and a line-counted payload.

pub mod client;
pub mod engine;
pub mod wire;

pub use engine::run_engine;
pub use wire::{ResponseCode, Signal};

// vim: ts=4
