//! Newline-delimited codec for the serial line
//!
//! Requests and replies are framed as:
//! ```text
//! [ N bytes: ASCII text ][ '\n' ]
//! ```
//!
//! Replies may carry a trailing `\r` or other whitespace before the
//! terminator; it is trimmed before the line is handed out.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use thiserror::Error;

use crate::protocol::{LINE_TERMINATOR, MAX_REPLY_LEN};

/// Errors that can occur while decoding a reply line
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("Reply line too long: {0} bytes without terminator (max: {1})")]
    LineTooLong(usize, usize),
}

/// Encode a request line: the text followed by the line terminator
pub fn encode_line(text: &str) -> Bytes {
    encode_line_with(text, LINE_TERMINATOR)
}

/// Encode a line with an explicit terminator
pub fn encode_line_with(text: &str, terminator: u8) -> Bytes {
    let mut buf = BytesMut::with_capacity(text.len() + 1);
    buf.put_slice(text.as_bytes());
    buf.put_u8(terminator);
    buf.freeze()
}

/// Accumulates bytes read from the channel until a full line is available
#[derive(Debug)]
pub struct LineDecoder {
    buffer: BytesMut,
    terminator: u8,
    max_len: usize,
}

impl Default for LineDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl LineDecoder {
    /// Create a decoder using the protocol terminator and length limit
    pub fn new() -> Self {
        Self::with_limits(LINE_TERMINATOR, MAX_REPLY_LEN)
    }

    /// Create a decoder with an explicit terminator and length limit
    pub fn with_limits(terminator: u8, max_len: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(64),
            terminator,
            max_len,
        }
    }

    /// Add data to the decoder buffer
    pub fn extend(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Try to take the next complete line from the buffer
    ///
    /// Returns:
    /// - `Ok(Some(line))` with trailing whitespace trimmed
    /// - `Ok(None)` if more data is needed
    /// - `Err(...)` if the limit was exceeded without a terminator
    pub fn decode_next(&mut self) -> Result<Option<String>, CodecError> {
        match self.buffer.iter().position(|&b| b == self.terminator) {
            Some(pos) => {
                let line = self.buffer.split_to(pos);
                self.buffer.advance(1);
                let text = String::from_utf8_lossy(&line);
                Ok(Some(text.trim_end().to_string()))
            }
            None if self.buffer.len() > self.max_len => {
                Err(CodecError::LineTooLong(self.buffer.len(), self.max_len))
            }
            None => Ok(None),
        }
    }

    /// Get the current buffer length (for debugging)
    pub fn buffer_len(&self) -> usize {
        self.buffer.len()
    }

    /// Bytes received so far that do not yet form a line
    pub fn pending(&self) -> String {
        String::from_utf8_lossy(&self.buffer).into_owned()
    }
}
