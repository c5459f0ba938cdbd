//! Serial port transport backed by tokio-serial

use crate::transport::traits::{
    ChannelConnector, ChannelSettings, DeviceEnumerator, DeviceHandle, SerialDeviceInfo,
    TransportStream,
};
use anyhow::{Context as _, Result};
use async_trait::async_trait;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio_serial::{SerialPortBuilderExt, SerialPortInfo, SerialPortType, SerialStream};
use tracing::debug;

/// Serial stream wrapper implementing TransportStream
pub struct SerialTransportStream {
    inner: SerialStream,
}

impl SerialTransportStream {
    pub fn new(stream: SerialStream) -> Self {
        Self { inner: stream }
    }
}

impl AsyncRead for SerialTransportStream {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_read(cx, buf)
    }
}

impl AsyncWrite for SerialTransportStream {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.inner).poll_write(cx, buf)
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_flush(cx)
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_shutdown(cx)
    }
}

#[async_trait]
impl TransportStream for SerialTransportStream {
    async fn shutdown(&mut self) -> Result<()> {
        tokio::io::AsyncWriteExt::shutdown(&mut self.inner).await?;
        Ok(())
    }
}

/// Opens serial ports on the host
#[derive(Debug, Default, Clone, Copy)]
pub struct SerialConnector;

#[async_trait]
impl ChannelConnector for SerialConnector {
    type Stream = SerialTransportStream;

    async fn open(&self, handle: &DeviceHandle, settings: &ChannelSettings) -> Result<Self::Stream> {
        let stream = tokio_serial::new(handle.port_name(), settings.baud_rate)
            .data_bits(settings.data_bits)
            .parity(settings.parity)
            .stop_bits(settings.stop_bits)
            .flow_control(settings.flow_control)
            .timeout(settings.read_timeout)
            .open_native_async()
            .with_context(|| format!("Failed to open serial port {}", handle))?;

        debug!("[SERIAL] Opened {} at {} baud", handle, settings.baud_rate);
        Ok(SerialTransportStream::new(stream))
    }

    fn name(&self) -> &'static str {
        "Serial"
    }
}

/// Enumerates serial ports through the OS
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemEnumerator;

#[async_trait]
impl DeviceEnumerator for SystemEnumerator {
    async fn list_devices(&self) -> Result<Vec<SerialDeviceInfo>> {
        let ports = tokio_serial::available_ports().context("Serial port enumeration failed")?;
        Ok(ports.iter().map(describe_port).collect())
    }
}

/// Build the description matched against the device descriptor
///
/// USB ports report "<manufacturer> <product>"; other port types only
/// carry a type label.
pub fn describe_port(port: &SerialPortInfo) -> SerialDeviceInfo {
    let description = match &port.port_type {
        SerialPortType::UsbPort(usb) => {
            let parts: Vec<&str> = [usb.manufacturer.as_deref(), usb.product.as_deref()]
                .into_iter()
                .flatten()
                .collect();
            if parts.is_empty() {
                "USB".to_string()
            } else {
                parts.join(" ")
            }
        }
        SerialPortType::PciPort => "PCI".to_string(),
        SerialPortType::BluetoothPort => "Bluetooth".to_string(),
        SerialPortType::Unknown => "Unknown".to_string(),
    };

    SerialDeviceInfo {
        port_name: port.port_name.clone(),
        description,
    }
}
