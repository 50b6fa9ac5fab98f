//! Viewer subprocess management
//!
//! The feeder re-executes its own binary with the reserved `--viewer` flag
//! and keeps the child's stdin/stdout as the response/signal pipe pair. The
//! child gets no other arguments; everything it needs arrives over the pipe.

use std::process::Stdio;
use tokio::io::BufReader;

use crate::error::SpawnError;
use crate::logging::*;

/// The reserved argument with which the viewer process is started.
/// Do not pass manually; the feeder adds it when re-executing itself.
pub const VIEWER_ARGUMENT: &str = "--viewer";

/// Handle to the spawned viewer process
pub struct Viewer {
	/// Stdin of the child, carrying our responses
	send: tokio::process::ChildStdin,

	/// Stdout of the child, carrying its signal bytes
	recv: BufReader<tokio::process::ChildStdout>,

	child: tokio::process::Child,
}

impl std::fmt::Debug for Viewer {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Viewer").field("pid", &self.child.id()).finish()
	}
}

/// Spawn the viewer child with piped stdio.
pub fn spawn_viewer() -> Result<Viewer, SpawnError> {
	let exe = std::env::current_exe().map_err(|e| SpawnError::ExecutableUnknown { source: e })?;

	let mut child = tokio::process::Command::new(&exe)
		.arg(VIEWER_ARGUMENT)
		.stdin(Stdio::piped())
		.stdout(Stdio::piped())
		.spawn()
		.map_err(|e| SpawnError::SpawnFailed {
			cmd: format!("{} {}", exe.display(), VIEWER_ARGUMENT),
			source: e,
		})?;

	let send = child
		.stdin
		.take()
		.ok_or(SpawnError::StdioUnavailable { what: "stdin".to_string() })?;

	let stdout = child
		.stdout
		.take()
		.ok_or(SpawnError::StdioUnavailable { what: "stdout".to_string() })?;

	debug!("Spawned viewer process, pid {:?}", child.id());
	Ok(Viewer { send, recv: BufReader::new(stdout), child })
}

impl Viewer {
	/// Borrow the response writer and signal reader together.
	pub fn io(
		&mut self,
	) -> (&mut tokio::process::ChildStdin, &mut BufReader<tokio::process::ChildStdout>) {
		(&mut self.send, &mut self.recv)
	}

	/// Kill the viewer, best effort. It may have quit on its own accord, in
	/// which case there is nothing to do.
	pub async fn terminate(mut self) {
		if let Err(e) = self.child.kill().await {
			debug!("Viewer already gone: {}", e);
		}
	}
}

// vim: ts=4
