//! Typed options and the one-shot options block store
//!
//! Options reach the viewer through a single blob of whitespace-separated
//! `name value` pairs. The blob is assembled on the feeder side from two
//! sources: command-line overrides (seeded before ingestion starts) and the
//! stream's own leading `options ... endoptions` block. The viewer re-splits
//! the blob shell-style and applies each pair through a typed descriptor, so
//! unknown names and unparsable values surface as typed errors instead of
//! being swallowed.

use std::collections::BTreeMap;

use crate::error::OptionError;

/// Token opening the options block; must be the very first token of the stream
pub const TOKEN_START_OPTIONS: &str = "options";

/// Token closing the options block
pub const TOKEN_END_OPTIONS: &str = "endoptions";

/// Display mode requested by the viewer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
	/// Live updating; stale frames are dropped
	Live,

	/// Pause after each incoming frame, dropping frames in the background
	InspectDrop,

	/// Pause after each incoming frame, never miss a frame
	InspectNodrop,
}

impl DisplayMode {
	pub fn parse(s: &str) -> Option<DisplayMode> {
		match s {
			"live" => Some(DisplayMode::Live),
			"inspect_drop" => Some(DisplayMode::InspectDrop),
			"inspect_nodrop" => Some(DisplayMode::InspectNodrop),
			_ => None,
		}
	}

	pub fn name(self) -> &'static str {
		match self {
			DisplayMode::Live => "live",
			DisplayMode::InspectDrop => "inspect_drop",
			DisplayMode::InspectNodrop => "inspect_nodrop",
		}
	}
}

/// The closed set of value kinds an option can declare
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
	Int,
	Float,
	Str,
	Bool,
	Mode,
}

impl OptionKind {
	/// Human-readable kind name used in error messages
	pub fn expected(self) -> &'static str {
		match self {
			OptionKind::Int => "an integer",
			OptionKind::Float => "a number",
			OptionKind::Str => "a string",
			OptionKind::Bool => "true or false",
			OptionKind::Mode => "live, inspect_drop or inspect_nodrop",
		}
	}
}

/// A parsed option value
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
	Int(i64),
	Float(f64),
	Str(String),
	Bool(bool),
	Mode(DisplayMode),
}

/// Declaration of a single option: name, kind, textual default and help.
///
/// The textual default feeds both the CLI default value and the
/// differs-from-default check when seeding overrides.
pub struct OptionDescriptor {
	pub name: &'static str,
	pub kind: OptionKind,
	pub default: &'static str,
	pub help: &'static str,
}

/// All declared options. Anything outside this set is rejected.
pub const DESCRIPTORS: &[OptionDescriptor] = &[
	OptionDescriptor {
		name: "window_title",
		kind: OptionKind::Str,
		default: "FrameFeed",
		help: "Title of the display window",
	},
	OptionDescriptor {
		name: "window_width",
		kind: OptionKind::Int,
		default: "400",
		help: "Width of the display window",
	},
	OptionDescriptor {
		name: "window_height",
		kind: OptionKind::Int,
		default: "400",
		help: "Height of the display window",
	},
	OptionDescriptor {
		name: "window_update_time_ms",
		kind: OptionKind::Int,
		default: "50",
		help: "Plot refresh time (ms)",
	},
	OptionDescriptor {
		name: "mode",
		kind: OptionKind::Mode,
		default: "live",
		help: "Display mode: live, inspect_drop, inspect_nodrop",
	},
	OptionDescriptor {
		name: "verbose",
		kind: OptionKind::Bool,
		default: "false",
		help: "Should we log in verbose mode?",
	},
	OptionDescriptor {
		name: "point_extent",
		kind: OptionKind::Float,
		default: "0.001",
		help: "The \"size\" of a point when considering viewing range",
	},
];

/// Look up a descriptor by option name
pub fn descriptor(name: &str) -> Option<&'static OptionDescriptor> {
	DESCRIPTORS.iter().find(|d| d.name == name)
}

/// Parse a textual value against the descriptor's kind
pub fn parse_value(desc: &OptionDescriptor, value: &str) -> Result<OptionValue, OptionError> {
	let invalid = || OptionError::InvalidValue {
		name: desc.name.to_string(),
		value: value.to_string(),
		expected: desc.kind.expected(),
	};
	match desc.kind {
		OptionKind::Int => value.parse::<i64>().map(OptionValue::Int).map_err(|_| invalid()),
		OptionKind::Float => value.parse::<f64>().map(OptionValue::Float).map_err(|_| invalid()),
		OptionKind::Str => Ok(OptionValue::Str(value.to_string())),
		OptionKind::Bool => match value {
			"true" => Ok(OptionValue::Bool(true)),
			"false" => Ok(OptionValue::Bool(false)),
			_ => Err(invalid()),
		},
		OptionKind::Mode => DisplayMode::parse(value).map(OptionValue::Mode).ok_or_else(invalid),
	}
}

/// Encode a value for the options blob.
///
/// Strings are wrapped in quotes so values with spaces survive the re-split:
/// a value containing a single quote goes in double quotes, anything else in
/// single quotes. A string containing both quote characters cannot be
/// represented and is rejected before any data is sent.
pub fn encode_value(name: &str, value: &OptionValue) -> Result<String, OptionError> {
	match value {
		OptionValue::Int(i) => Ok(i.to_string()),
		OptionValue::Float(x) => Ok(x.to_string()),
		OptionValue::Bool(b) => Ok(b.to_string()),
		OptionValue::Mode(m) => Ok(m.name().to_string()),
		OptionValue::Str(s) => {
			let has_single = s.contains('\'');
			let has_double = s.contains('"');
			if has_single && has_double {
				Err(OptionError::UnquotableValue { name: name.to_string() })
			} else if has_single {
				Ok(format!("\"{}\"", s))
			} else {
				Ok(format!("'{}'", s))
			}
		}
	}
}

/// Split an options blob into tokens, shell-style: whitespace separates
/// tokens, quoted substrings keep their spaces and lose their quotes.
pub fn split_blob(input: &str) -> Result<Vec<String>, OptionError> {
	let mut tokens = Vec::new();
	let mut current = String::new();
	let mut quote: Option<char> = None;
	let mut quoted = false;

	for c in input.chars() {
		match quote {
			Some(q) if c == q => quote = None,
			Some(_) => current.push(c),
			None if c == '\'' || c == '"' => {
				quote = Some(c);
				quoted = true;
			}
			None if c.is_whitespace() => {
				if !current.is_empty() || quoted {
					tokens.push(std::mem::take(&mut current));
				}
				quoted = false;
			}
			None => current.push(c),
		}
	}

	if quote.is_some() {
		return Err(OptionError::UnterminatedQuote { input: input.to_string() });
	}
	if !current.is_empty() || quoted {
		tokens.push(current);
	}
	Ok(tokens)
}

/// The set of effective option values, starting from the declared defaults
#[derive(Debug, Clone)]
pub struct OptionSet {
	values: BTreeMap<&'static str, OptionValue>,
}

impl Default for OptionSet {
	fn default() -> Self {
		let mut values = BTreeMap::new();
		values.insert("window_title", OptionValue::Str("FrameFeed".to_string()));
		values.insert("window_width", OptionValue::Int(400));
		values.insert("window_height", OptionValue::Int(400));
		values.insert("window_update_time_ms", OptionValue::Int(50));
		values.insert("mode", OptionValue::Mode(DisplayMode::Live));
		values.insert("verbose", OptionValue::Bool(false));
		values.insert("point_extent", OptionValue::Float(0.001));
		OptionSet { values }
	}
}

impl OptionSet {
	/// Apply a blob of `name value` pairs. If the same option appears more
	/// than once the last occurrence wins.
	pub fn apply_blob(&mut self, blob: &str) -> Result<(), OptionError> {
		let tokens = split_blob(blob)?;
		let mut it = tokens.into_iter();
		while let Some(name) = it.next() {
			let desc = descriptor(&name)
				.ok_or_else(|| OptionError::UnknownOption { name: name.clone() })?;
			let value = it.next().ok_or(OptionError::MissingValue { name })?;
			self.values.insert(desc.name, parse_value(desc, &value)?);
		}
		Ok(())
	}

	pub fn get(&self, name: &str) -> Option<&OptionValue> {
		self.values.get(name)
	}

	pub fn window_title(&self) -> &str {
		match self.values.get("window_title") {
			Some(OptionValue::Str(s)) => s,
			_ => "FrameFeed",
		}
	}

	pub fn window_update_time_ms(&self) -> u64 {
		match self.values.get("window_update_time_ms") {
			Some(OptionValue::Int(ms)) if *ms >= 0 => *ms as u64,
			_ => 50,
		}
	}

	pub fn mode(&self) -> DisplayMode {
		match self.values.get("mode") {
			Some(OptionValue::Mode(m)) => *m,
			_ => DisplayMode::Live,
		}
	}

	pub fn verbose(&self) -> bool {
		matches!(self.values.get("verbose"), Some(OptionValue::Bool(true)))
	}
}

/// Accumulates the options blob on the feeder side.
///
/// The store is "ready" once the options block's end sentinel has been
/// observed, or immediately if the stream opened with no options block.
/// Until then option requests get a not-ready response and the viewer polls.
#[derive(Debug, Default)]
pub struct OptionsStore {
	data: String,
	ready: bool,
	seen_any: bool,
}

impl OptionsStore {
	pub fn new() -> Self {
		OptionsStore::default()
	}

	/// Pre-encoded command-line overrides, added before any stream token.
	/// Stream values land after these in the blob, so on re-parse the stream
	/// wins for options set in both places.
	pub fn seed(&mut self, fragment: &str) {
		if fragment.is_empty() {
			return;
		}
		if !self.data.is_empty() {
			self.data.push(' ');
		}
		self.data.push_str(fragment);
	}

	/// Absorb one token from the options block. The sentinels themselves are
	/// not stored; the end sentinel marks the store ready. A first token that
	/// is not the start sentinel means no options block is coming at all.
	pub fn observe(&mut self, token: &str) {
		if !self.seen_any {
			self.seen_any = true;
			if token != TOKEN_START_OPTIONS {
				self.ready = true;
			}
		}
		if token == TOKEN_END_OPTIONS {
			self.ready = true;
			return;
		}
		if token == TOKEN_START_OPTIONS || self.ready {
			return;
		}
		if !self.data.is_empty() {
			self.data.push(' ');
		}
		self.data.push_str(token);
	}

	/// No options tokens are coming (no block announced, or the stream ended
	/// before the end sentinel); whatever has been collected is final.
	pub fn mark_not_coming(&mut self) {
		self.seen_any = true;
		self.ready = true;
	}

	/// Current readiness and the collected blob. Not ready means the viewer
	/// should retry; the blob is withheld until then.
	pub fn snapshot(&self) -> (bool, String) {
		if self.ready {
			(true, self.data.clone())
		} else {
			(false, String::new())
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_parse_int() {
		let desc = descriptor("window_width").unwrap();
		assert_eq!(parse_value(desc, "600").unwrap(), OptionValue::Int(600));
		assert!(parse_value(desc, "wide").is_err());
	}

	#[test]
	fn test_parse_mode() {
		let desc = descriptor("mode").unwrap();
		assert_eq!(
			parse_value(desc, "inspect_nodrop").unwrap(),
			OptionValue::Mode(DisplayMode::InspectNodrop)
		);
		assert!(parse_value(desc, "interactive").is_err());
	}

	#[test]
	fn test_parse_bool_strict() {
		let desc = descriptor("verbose").unwrap();
		assert_eq!(parse_value(desc, "true").unwrap(), OptionValue::Bool(true));
		assert!(parse_value(desc, "True").is_err());
		assert!(parse_value(desc, "1").is_err());
	}

	#[test]
	fn test_unknown_option_rejected() {
		let mut set = OptionSet::default();
		let err = set.apply_blob("frobnicate 7").unwrap_err();
		assert!(matches!(err, OptionError::UnknownOption { .. }));
	}

	#[test]
	fn test_missing_value_rejected() {
		let mut set = OptionSet::default();
		let err = set.apply_blob("window_width").unwrap_err();
		assert!(matches!(err, OptionError::MissingValue { .. }));
	}

	#[test]
	fn test_last_occurrence_wins() {
		let mut set = OptionSet::default();
		set.apply_blob("window_width 500 window_width 700").unwrap();
		assert_eq!(set.get("window_width"), Some(&OptionValue::Int(700)));
	}

	#[test]
	fn test_encode_plain_string_single_quoted() {
		let v = OptionValue::Str("My Canvas".to_string());
		assert_eq!(encode_value("window_title", &v).unwrap(), "'My Canvas'");
	}

	#[test]
	fn test_encode_string_with_single_quote() {
		let v = OptionValue::Str("it's here".to_string());
		assert_eq!(encode_value("window_title", &v).unwrap(), "\"it's here\"");
	}

	#[test]
	fn test_encode_string_with_both_quotes_fails() {
		let v = OptionValue::Str("he said \"it's\"".to_string());
		assert!(matches!(
			encode_value("window_title", &v),
			Err(OptionError::UnquotableValue { .. })
		));
	}

	#[test]
	fn test_split_blob_keeps_quoted_spaces() {
		let tokens = split_blob("window_title 'My Canvas' window_width 600").unwrap();
		assert_eq!(tokens, vec!["window_title", "My Canvas", "window_width", "600"]);
	}

	#[test]
	fn test_split_blob_unterminated_quote() {
		assert!(matches!(
			split_blob("window_title 'oops"),
			Err(OptionError::UnterminatedQuote { .. })
		));
	}

	#[test]
	fn test_quote_roundtrip() {
		// Encoding a value with a single quote and re-splitting recovers it
		let original = "it's a title";
		let encoded = encode_value("window_title", &OptionValue::Str(original.to_string())).unwrap();
		let blob = format!("window_title {}", encoded);
		let mut set = OptionSet::default();
		set.apply_blob(&blob).unwrap();
		assert_eq!(set.window_title(), original);
	}

	#[test]
	fn test_store_collects_until_end_sentinel() {
		let mut store = OptionsStore::new();
		store.observe(TOKEN_START_OPTIONS);
		store.observe("window_width");
		store.observe("600");
		assert_eq!(store.snapshot(), (false, String::new()));
		store.observe(TOKEN_END_OPTIONS);
		assert_eq!(store.snapshot(), (true, "window_width 600".to_string()));
	}

	#[test]
	fn test_store_first_data_token_means_no_options() {
		// Marked ready before processing, so the data token is not absorbed
		let mut store = OptionsStore::new();
		store.observe("circle[1 2]");
		assert_eq!(store.snapshot(), (true, String::new()));
	}

	#[test]
	fn test_store_mark_not_coming() {
		let mut store = OptionsStore::new();
		assert_eq!(store.snapshot(), (false, String::new()));
		store.mark_not_coming();
		assert_eq!(store.snapshot(), (true, String::new()));
	}

	#[test]
	fn test_seed_precedes_stream_values() {
		let mut store = OptionsStore::new();
		store.seed("window_width 800");
		store.observe(TOKEN_START_OPTIONS);
		store.observe("window_width");
		store.observe("600");
		store.observe(TOKEN_END_OPTIONS);
		let (_, blob) = store.snapshot();
		assert_eq!(blob, "window_width 800 window_width 600");

		// Last occurrence wins on re-parse, so the stream override applies
		let mut set = OptionSet::default();
		set.apply_blob(&blob).unwrap();
		assert_eq!(set.get("window_width"), Some(&OptionValue::Int(600)));
	}
}

// vim: ts=4
