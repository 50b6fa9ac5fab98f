//! Streaming tokenizer for the drawing-command language
//!
//! Splits a character stream into whitespace-separated tokens while keeping
//! bracketed groups, quoted strings and comments intact. The tokenizer is a
//! pull-based abstraction: each `next_token()` call consumes exactly enough
//! input to produce one token, so the caller decides when I/O happens and the
//! scheduler only needs to know that more bytes are ready.

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::error::TokenizeError;

/// Token separators outside any delimiter nesting
const SEPARATORS: [char; 3] = [' ', '\n', '\t'];

/// Everything from here to the end of the line is discarded
const COMMENT_START: char = '#';
const COMMENT_END: char = '\n';

/// Return the closing delimiter matching an opening one, if `c` opens a pair.
/// The quote characters pair with themselves and cannot nest.
fn closing_for(c: char) -> Option<char> {
	match c {
		'(' => Some(')'),
		'[' => Some(']'),
		'{' => Some('}'),
		'"' => Some('"'),
		'\'' => Some('\''),
		_ => None,
	}
}

fn is_closing(c: char) -> bool {
	matches!(c, ')' | ']' | '}' | '"' | '\'')
}

fn is_quote(c: char) -> bool {
	c == '"' || c == '\''
}

/// Pull-based tokenizer over an async byte source.
///
/// The input is ASCII by contract, so bytes are handled as characters
/// directly. Once the source is exhausted, `next_token()` keeps returning
/// `Ok(None)`.
pub struct Tokenizer<R> {
	source: R,

	/// Input exhausted; the final (possibly empty) token has been emitted
	done: bool,

	/// A comment begun while assembling the previous token is still being
	/// discarded; persists across calls because the token that preceded the
	/// comment was already handed out
	in_comment: bool,
}

impl<R: AsyncBufRead + Unpin> Tokenizer<R> {
	pub fn new(source: R) -> Self {
		Tokenizer { source, done: false, in_comment: false }
	}

	/// Read the next input character, or `None` at end of input.
	async fn next_char(&mut self) -> Result<Option<char>, TokenizeError> {
		let buf = self.source.fill_buf().await?;
		if buf.is_empty() {
			return Ok(None);
		}
		let c = buf[0] as char;
		self.source.consume(1);
		Ok(Some(c))
	}

	/// Consume input until one token is complete.
	///
	/// Returns `Ok(Some(token))` for each token (zero-length tokens included;
	/// the downstream selector discards those) and `Ok(None)` once the input
	/// is exhausted. End of input flushes whatever is buffered as a final
	/// token, even if a quote or bracket is still open — truncated streams
	/// are accepted silently.
	pub async fn next_token(&mut self) -> Result<Option<String>, TokenizeError> {
		if self.done {
			return Ok(None);
		}

		let mut buf = String::new();
		// Opening delimiters are pushed here and popped by their closers
		let mut delimiter_stack: Vec<char> = Vec::new();

		loop {
			let character = match self.next_char().await? {
				Some(c) => c,
				None => {
					self.done = true;
					// The buffer can be empty here; the selector drops it
					return Ok(Some(buf));
				}
			};

			// Discard comment characters up to and including the newline
			if self.in_comment {
				if character == COMMENT_END {
					self.in_comment = false;
				}
				continue;
			}

			// Inside a quoted string everything is absorbed literally until
			// the matching quote, which pops the stack and is also absorbed
			if let Some(&top) = delimiter_stack.last() {
				if is_quote(top) {
					if character == top {
						delimiter_stack.pop();
					}
					buf.push(character);
					continue;
				}
			}

			if character == COMMENT_START {
				// Flush whatever we have; the comment is drained on the next
				// call so the token is available to the stores right away
				self.in_comment = true;
				return Ok(Some(buf));
			}

			if closing_for(character).is_some() {
				delimiter_stack.push(character);
				buf.push(character);
				continue;
			}

			if is_closing(character) {
				match delimiter_stack.last().copied().and_then(closing_for) {
					Some(expected) if expected == character => {
						delimiter_stack.pop();
						buf.push(character);
						continue;
					}
					_ => {
						return Err(TokenizeError::DelimiterMismatch {
							found: character,
							buffer: buf,
						});
					}
				}
			}

			if SEPARATORS.contains(&character) && delimiter_stack.is_empty() {
				return Ok(Some(buf));
			}

			buf.push(character);
		}
	}
}


// vim: ts=4
