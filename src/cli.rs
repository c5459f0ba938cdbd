//! Command-line interface

use arc_shared::protocol;
use clap::error::ErrorKind;
use clap::{ArgAction, Parser};
use std::ffi::OsString;

const USAGE: &str = "\
ARC - Arduino Relay Control

Usage: arc S#

Where (S)tate is (H)igh or (L)ow, and # is pin # 2 to 19
Example \"arc L2\" will set pin 2 Low, and \"arc H2\" will set pin 2 high.
Note: pins 0 and 1 are reserved for communication.";

/// Set a relay controller pin high or low over serial
#[derive(Parser, Debug)]
#[command(name = "arc", version, about, after_help = USAGE)]
pub struct Cli {
    /// Pin command: H or L followed by the pin number, e.g. H5 or L12
    #[arg(allow_hyphen_values = true)]
    pub command: String,

    /// Substring identifying the controller in the serial port description
    #[arg(long, default_value = protocol::DEFAULT_DESCRIPTOR)]
    pub descriptor: String,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

/// What the process should do after looking at its arguments
#[derive(Debug)]
pub enum Invocation {
    /// Arguments are usable
    Run(Cli),
    /// Help or version was requested and printed
    Informational,
    /// Missing or extra arguments; usage was printed
    WrongArgs(String),
}

const INFORMATIONAL_FLAGS: [&str; 4] = ["-h", "--help", "-V", "--version"];

/// Parse process arguments, printing help or usage as needed
///
/// A lone argument other than a help or version flag is always the command,
/// even when it starts with `-`; the command validator rejects it later.
pub fn parse<I, T>(args: I) -> Invocation
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let args: Vec<OsString> = args.into_iter().map(Into::into).collect();

    if let [_, single] = args.as_slice() {
        let command = single.to_string_lossy();
        if !INFORMATIONAL_FLAGS.contains(&&*command) {
            return Invocation::Run(Cli {
                command: command.into_owned(),
                descriptor: protocol::DEFAULT_DESCRIPTOR.to_string(),
                verbose: 0,
            });
        }
    }

    match Cli::try_parse_from(args) {
        Ok(cli) => Invocation::Run(cli),
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = e.print();
            Invocation::Informational
        }
        Err(e) => {
            println!("{}", USAGE);
            println!();
            Invocation::WrongArgs(e.to_string())
        }
    }
}
