//! Transaction executor - sends one command to the controller and classifies the reply

use crate::transport::{ChannelConnector, ChannelSettings, DeviceHandle, TransportStream};
use arc_shared::state_machine::TransitionResult;
use arc_shared::{
    classify_reply, encode_line_with, protocol, CodecError, Command, CommFailure, LineDecoder,
    TransactionEvent, TransactionResult, TransactionStateMachine,
};
use bytes::BytesMut;
use std::io;
use std::time::Instant;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Configuration for the transaction executor
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Serial line settings
    pub channel: ChannelSettings,
    /// Reply the controller sends when it rejects a command
    pub fault_sentinel: String,
    /// Longest reply accepted before giving up
    pub max_reply_len: usize,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            channel: ChannelSettings::default(),
            fault_sentinel: protocol::FAULT_SENTINEL.into(),
            max_reply_len: protocol::MAX_REPLY_LEN,
        }
    }
}

/// Executes a single request/response exchange over a connector
pub struct TransactionExecutor<'a, C: ChannelConnector> {
    config: ExecutorConfig,
    connector: &'a C,
}

impl<'a, C: ChannelConnector> TransactionExecutor<'a, C> {
    /// Create a new transaction executor
    pub fn new(config: ExecutorConfig, connector: &'a C) -> Self {
        Self { config, connector }
    }

    /// Open the channel, send `command`, read and classify the reply
    ///
    /// The channel is released before returning on every path. I/O errors
    /// never escape; they come back as `CommunicationFailure`.
    pub async fn execute(&self, handle: &DeviceHandle, command: &Command) -> TransactionResult {
        let start = Instant::now();
        let mut fsm = TransactionStateMachine::new();

        info!(
            "Executing command {} on {} via {}",
            command,
            handle,
            self.connector.name()
        );

        let mut stream = match self.connector.open(handle, &self.config.channel).await {
            Ok(stream) => {
                advance(&mut fsm, TransactionEvent::ChannelOpened);
                Some(stream)
            }
            Err(e) => {
                let failure =
                    TransactionResult::CommunicationFailure(CommFailure::OpenFailed(format!("{:#}", e)));
                advance(&mut fsm, TransactionEvent::Resolved(failure));
                None
            }
        };

        if let Some(ref mut stream) = stream {
            let result = self.exchange(stream, command, &mut fsm).await;
            advance(&mut fsm, TransactionEvent::Resolved(result));

            if let Err(e) = TransportStream::shutdown(stream).await {
                debug!("[TXN] Channel shutdown error: {}", e);
            }
        }
        drop(stream);
        advance(&mut fsm, TransactionEvent::ChannelClosed);

        let result = fsm.outcome().cloned().unwrap_or_else(|| {
            TransactionResult::CommunicationFailure(CommFailure::ReadFailed(
                "exchange ended without an outcome".into(),
            ))
        });

        match &result {
            TransactionResult::Success => {
                info!("  Command acknowledged in {:?}", start.elapsed())
            }
            TransactionResult::FaultReported => {
                warn!("  Controller reported a fault for {}", command)
            }
            TransactionResult::CommunicationFailure(failure) => {
                warn!("  Communication failure: {}", failure)
            }
        }

        result
    }

    /// Write the request and wait for one reply line
    async fn exchange<S: TransportStream>(
        &self,
        stream: &mut S,
        command: &Command,
        fsm: &mut TransactionStateMachine,
    ) -> TransactionResult {
        let request = encode_line_with(command.as_str(), self.config.channel.line_terminator);
        if let Err(e) = write_request(stream, &request).await {
            return TransactionResult::CommunicationFailure(CommFailure::WriteFailed(e.to_string()));
        }
        advance(fsm, TransactionEvent::CommandSent);
        debug!("[TXN] Sent {:?}", command.as_str());

        advance(fsm, TransactionEvent::ReadStarted);
        let reply = match timeout(self.config.channel.read_timeout, self.read_line(stream)).await {
            Ok(Ok(reply)) => reply,
            Ok(Err(failure)) => return TransactionResult::CommunicationFailure(failure),
            Err(_) => return TransactionResult::CommunicationFailure(CommFailure::Timeout),
        };
        debug!("[TXN] Received {:?}", reply);

        classify_reply(&reply, command, &self.config.fault_sentinel)
    }

    /// Read until a full reply line is buffered
    async fn read_line<S: TransportStream>(&self, stream: &mut S) -> Result<String, CommFailure> {
        let mut decoder =
            LineDecoder::with_limits(self.config.channel.line_terminator, self.config.max_reply_len);
        let mut chunk = BytesMut::with_capacity(64);

        loop {
            match decoder.decode_next() {
                Ok(Some(line)) => return Ok(line),
                Ok(None) => {}
                Err(CodecError::LineTooLong(len, _)) => return Err(CommFailure::LineTooLong(len)),
            }

            chunk.clear();
            match stream.read_buf(&mut chunk).await {
                Ok(0) => {
                    if decoder.buffer_len() > 0 {
                        debug!("[TXN] Partial reply before close: {:?}", decoder.pending());
                    }
                    return Err(CommFailure::ChannelClosed);
                }
                Ok(_) => decoder.extend(&chunk),
                Err(e) if e.kind() == io::ErrorKind::TimedOut => return Err(CommFailure::Timeout),
                Err(e) => return Err(CommFailure::ReadFailed(e.to_string())),
            }
        }
    }
}

async fn write_request<S: TransportStream>(stream: &mut S, request: &[u8]) -> io::Result<()> {
    stream.write_all(request).await?;
    stream.flush().await
}

/// Apply an event, logging transitions the machine rejects
fn advance(fsm: &mut TransactionStateMachine, event: TransactionEvent) {
    match fsm.process_event(event) {
        TransitionResult::Success(state) => debug!("[TXN] -> {:?}", state),
        TransitionResult::Invalid { from, event } => {
            warn!("[TXN] Ignored {:?} in state {:?}", event, from)
        }
    }
}
