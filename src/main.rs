use clap::{Arg, ArgAction, Command};
use std::error::Error;

use framefeed::connection::VIEWER_ARGUMENT;
use framefeed::options::{self, DESCRIPTORS};
use framefeed::{feed, logging, viewer};

/// Build the CLI: one flag per declared option, using a more standard hyphen
/// rather than underscore, plus the reserved viewer flag.
fn build_cli() -> Command {
	let mut command = Command::new("framefeed")
		.version("0.2.0")
		.author("Szilard Hajba <szilard@symbion.hu>")
		.about("Streams drawing-command frames from stdin to a viewer process")
		.arg(
			Arg::new("viewer")
				.long(VIEWER_ARGUMENT.trim_start_matches('-'))
				.action(ArgAction::SetTrue)
				.hide(true)
				.help("Reserved: start the viewer process. Do not pass manually."),
		);

	for descriptor in DESCRIPTORS {
		command = command.arg(
			Arg::new(descriptor.name)
				.long(descriptor.name.replace('_', "-"))
				.value_name("VALUE")
				.default_value(descriptor.default)
				.help(descriptor.help),
		);
	}

	command
}

/// Encode the options given on the command line that differ from their
/// defaults into a blob fragment for the options store. Values are validated
/// against their declared kind here, before anything is sent anywhere.
fn encode_overrides(matches: &clap::ArgMatches) -> Result<String, Box<dyn Error>> {
	let mut fragments = Vec::new();

	for descriptor in DESCRIPTORS {
		let supplied = matches.value_source(descriptor.name)
			== Some(clap::parser::ValueSource::CommandLine);
		if !supplied {
			continue;
		}
		let raw = matches
			.get_one::<String>(descriptor.name)
			.ok_or_else(|| format!("missing value for --{}", descriptor.name))?;
		if raw == descriptor.default {
			continue;
		}
		let value = options::parse_value(descriptor, raw)?;
		let encoded = options::encode_value(descriptor.name, &value)?;
		fragments.push(format!("{} {}", descriptor.name, encoded));
	}

	Ok(fragments.join(" "))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
	logging::init_tracing();

	let matches = build_cli().get_matches();

	if matches.get_flag("viewer") {
		// The feeder gives the viewer everything it needs via the pipe, so
		// no other arguments matter here
		viewer::viewer_main().await?;
		return Ok(());
	}

	let option_seed = encode_overrides(&matches)?;
	feed::feed_main(option_seed).await?;
	Ok(())
}

// vim: ts=4
