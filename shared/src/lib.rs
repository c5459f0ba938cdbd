//! ARC Shared Protocol Types
//!
//! This crate provides the protocol types, line codec and transaction state
//! machine used to talk to the relay controller over a serial line. Nothing
//! in here performs I/O.

pub mod codec;
pub mod command;
pub mod outcome;
pub mod state_machine;

// Re-export commonly used types at crate root
pub use codec::{encode_line, encode_line_with, CodecError, LineDecoder};
pub use command::{Command, InvalidCommand, Level};
pub use outcome::{classify_reply, CommFailure, ReturnCode, TransactionResult};
pub use state_machine::{TransactionEvent, TransactionState, TransactionStateMachine};

/// Fixed protocol parameters of the relay controller firmware
pub mod protocol {
    /// Substring expected in the controller's serial port description
    pub const DEFAULT_DESCRIPTOR: &str = "Arduino";

    /// Reply sent by the controller when it could not apply a command
    pub const FAULT_SENTINEL: &str = "FLT";

    /// Serial baud rate
    pub const BAUD_RATE: u32 = 9600;

    /// Serial data bits
    pub const DATA_BITS: u8 = 8;

    /// Reply read timeout in milliseconds
    pub const READ_TIMEOUT_MS: u64 = 1000;

    /// Line terminator for both request and response
    pub const LINE_TERMINATOR: u8 = b'\n';

    /// Longest reply line accepted before the exchange is abandoned
    pub const MAX_REPLY_LEN: usize = 256;

    /// Lowest addressable pin (0 and 1 carry the serial link)
    pub const PIN_MIN: u8 = 2;

    /// Highest addressable pin on the controller board
    pub const PIN_MAX: u8 = 19;
}
