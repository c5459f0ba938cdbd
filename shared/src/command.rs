//! Pin command syntax
//!
//! A command is a level character followed by a pin number:
//! ```text
//! <L|H><pin>      e.g. "H5", "L12"
//! ```

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::protocol::{PIN_MAX, PIN_MIN};

/// Output level requested for a pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    High,
    Low,
}

impl Level {
    fn from_char(c: char) -> Option<Self> {
        match c {
            'H' => Some(Level::High),
            'L' => Some(Level::Low),
            _ => None,
        }
    }

    /// Wire character for this level
    pub fn as_char(self) -> char {
        match self {
            Level::High => 'H',
            Level::Low => 'L',
        }
    }
}

/// Reasons a command string is rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidCommand {
    #[error("Command must be 2 or 3 characters, got {0}")]
    Length(usize),

    #[error("Invalid level {0:?}, expected 'L' or 'H'")]
    Level(char),

    #[error("Pin {0:?} is not a number")]
    Pin(String),

    #[error("Pin {0} out of range ({PIN_MIN}-{PIN_MAX})")]
    PinOutOfRange(u32),
}

/// A validated pin command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    level: Level,
    pin: u8,
    /// The exact text that was validated; this is what goes on the wire
    text: String,
}

impl Command {
    /// Validate a raw command string
    ///
    /// Rules are checked in order and the first failure is returned:
    /// length, level character, numeric pin, pin range.
    pub fn parse(raw: &str) -> Result<Self, InvalidCommand> {
        let len = raw.chars().count();
        if len != 2 && len != 3 {
            return Err(InvalidCommand::Length(len));
        }

        let mut chars = raw.chars();
        // Length check guarantees a first character
        let first = chars.next().unwrap_or_default();
        let level = Level::from_char(first).ok_or(InvalidCommand::Level(first))?;

        let digits = chars.as_str();
        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(InvalidCommand::Pin(digits.to_string()));
        }
        let pin: u32 = digits
            .parse()
            .map_err(|_| InvalidCommand::Pin(digits.to_string()))?;

        if pin < PIN_MIN as u32 || pin > PIN_MAX as u32 {
            return Err(InvalidCommand::PinOutOfRange(pin));
        }

        Ok(Self {
            level,
            pin: pin as u8,
            text: raw.to_string(),
        })
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn pin(&self) -> u8 {
        self.pin
    }

    /// Text written to the controller and expected back as the echo
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl FromStr for Command {
    type Err = InvalidCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Command::parse(s)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
