//! Transport trait abstraction over the host serial subsystem

use anyhow::Result;
use arc_shared::protocol;
use async_trait::async_trait;
use std::fmt;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_serial::{DataBits, FlowControl, Parity, StopBits};

/// Identifier of a serial device, e.g. "/dev/ttyACM0" or "COM3"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceHandle(String);

impl DeviceHandle {
    /// Wrap a port name; empty names are not a device
    pub fn new(port_name: impl Into<String>) -> Option<Self> {
        let name = port_name.into();
        if name.is_empty() {
            None
        } else {
            Some(Self(name))
        }
    }

    pub fn port_name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A serial device as reported by the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialDeviceInfo {
    /// Port name used to open the device
    pub port_name: String,
    /// Human-readable description
    pub description: String,
}

/// Line settings for opening a channel
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelSettings {
    pub baud_rate: u32,
    pub data_bits: DataBits,
    pub parity: Parity,
    pub stop_bits: StopBits,
    pub flow_control: FlowControl,
    /// Upper bound on waiting for a reply line
    pub read_timeout: Duration,
    pub line_terminator: u8,
}

impl Default for ChannelSettings {
    fn default() -> Self {
        Self {
            baud_rate: protocol::BAUD_RATE,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
            flow_control: FlowControl::None,
            read_timeout: Duration::from_millis(protocol::READ_TIMEOUT_MS),
            line_terminator: protocol::LINE_TERMINATOR,
        }
    }
}

/// A channel stream that can read and write bytes
#[async_trait]
pub trait TransportStream: AsyncRead + AsyncWrite + Send + Unpin + 'static {
    /// Release the channel
    async fn shutdown(&mut self) -> Result<()>;
}

/// Factory for opening channels to a device
#[async_trait]
pub trait ChannelConnector: Send + Sync {
    /// The stream type this connector produces
    type Stream: TransportStream;

    /// Open the channel for `handle` with the given settings
    async fn open(&self, handle: &DeviceHandle, settings: &ChannelSettings) -> Result<Self::Stream>;

    /// Human-readable name for this transport
    fn name(&self) -> &'static str;
}

/// Lists the serial devices visible to the host
#[async_trait]
pub trait DeviceEnumerator: Send + Sync {
    async fn list_devices(&self) -> Result<Vec<SerialDeviceInfo>>;
}
