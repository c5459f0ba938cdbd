//! Transaction outcomes and process return codes

use std::fmt;

use crate::command::Command;

/// Why an exchange with the controller did not produce a usable reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommFailure {
    /// The serial channel could not be opened
    OpenFailed(String),
    /// Writing the request line failed
    WriteFailed(String),
    /// No complete reply line arrived before the read timeout
    Timeout,
    /// Reading from the channel failed
    ReadFailed(String),
    /// The channel reached end-of-stream before a full line arrived
    ChannelClosed,
    /// The reply exceeded the length limit without a terminator
    LineTooLong(usize),
    /// A line arrived that is neither the echo nor the fault sentinel
    UnexpectedReply(String),
}

impl fmt::Display for CommFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommFailure::OpenFailed(e) => write!(f, "failed to open channel: {}", e),
            CommFailure::WriteFailed(e) => write!(f, "write failed: {}", e),
            CommFailure::Timeout => write!(f, "timed out waiting for reply"),
            CommFailure::ReadFailed(e) => write!(f, "read failed: {}", e),
            CommFailure::ChannelClosed => write!(f, "channel closed before a reply line"),
            CommFailure::LineTooLong(n) => write!(f, "reply too long ({} bytes)", n),
            CommFailure::UnexpectedReply(r) => write!(f, "unexpected reply {:?}", r),
        }
    }
}

/// Result of one request/response exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionResult {
    /// The controller echoed the command back
    Success,
    /// The controller replied with the fault sentinel
    FaultReported,
    /// The exchange failed or the reply was not understood
    CommunicationFailure(CommFailure),
}

impl TransactionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, TransactionResult::Success)
    }
}

/// Classify a trimmed reply line against the command that was sent
pub fn classify_reply(reply: &str, sent: &Command, fault_sentinel: &str) -> TransactionResult {
    if reply == fault_sentinel {
        TransactionResult::FaultReported
    } else if reply == sent.as_str() {
        TransactionResult::Success
    } else {
        TransactionResult::CommunicationFailure(CommFailure::UnexpectedReply(reply.to_string()))
    }
}

/// Outcome of a whole run, reported as the process exit code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnCode {
    Ok,
    WrongArgs,
    InvalidCommand,
    NotFound,
    CommunicationFail,
}

impl ReturnCode {
    /// Process exit code for this outcome
    pub fn exit_code(self) -> u8 {
        match self {
            ReturnCode::Ok => 0,
            ReturnCode::WrongArgs => 1,
            ReturnCode::InvalidCommand => 2,
            ReturnCode::NotFound => 3,
            ReturnCode::CommunicationFail => 4,
        }
    }

    /// Name printed at the end of every run
    pub fn name(self) -> &'static str {
        match self {
            ReturnCode::Ok => "OK",
            ReturnCode::WrongArgs => "ARC_WRONG_ARGS",
            ReturnCode::InvalidCommand => "ARC_INVALID_COMMAND",
            ReturnCode::NotFound => "ARC_NOT_FOUND",
            ReturnCode::CommunicationFail => "ARC_COMMUNICATION_FAIL",
        }
    }
}

impl fmt::Display for ReturnCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Fault replies and every communication failure share one exit code
impl From<&TransactionResult> for ReturnCode {
    fn from(result: &TransactionResult) -> Self {
        match result {
            TransactionResult::Success => ReturnCode::Ok,
            TransactionResult::FaultReported | TransactionResult::CommunicationFailure(_) => {
                ReturnCode::CommunicationFail
            }
        }
    }
}
