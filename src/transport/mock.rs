//! Simulated relay controller for tests
//!
//! The connector hands out one half of an in-memory duplex pipe and runs the
//! device side on a spawned task.

use crate::transport::traits::{
    ChannelConnector, ChannelSettings, DeviceEnumerator, DeviceHandle, SerialDeviceInfo,
    TransportStream,
};
use anyhow::{anyhow, Result};
use arc_shared::{encode_line, LineDecoder};
use async_trait::async_trait;
use std::io;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, DuplexStream, ReadBuf};

/// How the simulated controller answers a request line
#[derive(Debug, Clone)]
pub enum DeviceBehavior {
    /// Reply with the request
    Echo,
    /// Reply with a fixed line
    Reply(String),
    /// Never reply; keep the line open
    Silent,
    /// Hang up after reading the request
    Hangup,
}

/// I/O error injected on the host end of the channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamFault {
    /// Every write fails, e.g. the cable was pulled
    Write,
    /// Writes go through but every read fails
    Read,
}

/// Shared observations of the simulated channel
#[derive(Debug, Default)]
pub struct ChannelLog {
    pub opened: AtomicUsize,
    pub closed: AtomicBool,
    pub received: Mutex<Vec<String>>,
}

impl ChannelLog {
    pub fn open_count(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn received(&self) -> Vec<String> {
        self.received.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

/// Host end of the simulated channel
pub struct MockTransportStream {
    inner: DuplexStream,
    fault: Option<StreamFault>,
    log: Arc<ChannelLog>,
}

fn unplugged() -> io::Error {
    io::Error::new(io::ErrorKind::BrokenPipe, "device unplugged")
}

impl Drop for MockTransportStream {
    fn drop(&mut self) {
        self.log.closed.store(true, Ordering::SeqCst);
    }
}

impl AsyncRead for MockTransportStream {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        if self.fault == Some(StreamFault::Read) {
            return Poll::Ready(Err(unplugged()));
        }
        Pin::new(&mut self.inner).poll_read(cx, buf)
    }
}

impl AsyncWrite for MockTransportStream {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        if self.fault == Some(StreamFault::Write) {
            return Poll::Ready(Err(unplugged()));
        }
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
impl TransportStream for MockTransportStream {
    async fn shutdown(&mut self) -> Result<()> {
        self.inner.shutdown().await?;
        self.log.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Connector that opens channels to a simulated controller
pub struct MockConnector {
    behavior: DeviceBehavior,
    fail_open: bool,
    fault: Option<StreamFault>,
    pub log: Arc<ChannelLog>,
}

impl MockConnector {
    pub fn new(behavior: DeviceBehavior) -> Self {
        Self {
            behavior,
            fail_open: false,
            fault: None,
            log: Arc::new(ChannelLog::default()),
        }
    }

    /// Connector whose open always fails, e.g. port busy
    pub fn failing() -> Self {
        Self {
            fail_open: true,
            ..Self::new(DeviceBehavior::Echo)
        }
    }

    /// Connector whose channels open but fail on write or read
    pub fn with_fault(fault: StreamFault) -> Self {
        Self {
            fault: Some(fault),
            ..Self::new(DeviceBehavior::Echo)
        }
    }
}

#[async_trait]
impl ChannelConnector for MockConnector {
    type Stream = MockTransportStream;

    async fn open(&self, handle: &DeviceHandle, _settings: &ChannelSettings) -> Result<Self::Stream> {
        if self.fail_open {
            return Err(anyhow!("Access denied opening {}", handle));
        }

        self.log.opened.fetch_add(1, Ordering::SeqCst);
        let (host, device) = tokio::io::duplex(256);
        tokio::spawn(run_device(device, self.behavior.clone(), self.log.clone()));

        Ok(MockTransportStream {
            inner: host,
            fault: self.fault,
            log: self.log.clone(),
        })
    }

    fn name(&self) -> &'static str {
        "Mock"
    }
}

/// Device side: read one request line and answer it
async fn run_device(mut stream: DuplexStream, behavior: DeviceBehavior, log: Arc<ChannelLog>) {
    let mut decoder = LineDecoder::new();
    let mut buf = [0u8; 64];

    let request = loop {
        match stream.read(&mut buf).await {
            Ok(0) | Err(_) => return,
            Ok(n) => decoder.extend(&buf[..n]),
        }
        if let Ok(Some(line)) = decoder.decode_next() {
            break line;
        }
    };

    if let Ok(mut received) = log.received.lock() {
        received.push(request.clone());
    }

    let reply = match behavior {
        DeviceBehavior::Echo => request,
        DeviceBehavior::Reply(line) => line,
        DeviceBehavior::Hangup => return,
        DeviceBehavior::Silent => {
            // Hold the line until the host side goes away
            while let Ok(n) = stream.read(&mut buf).await {
                if n == 0 {
                    break;
                }
            }
            return;
        }
    };

    let _ = stream.write_all(&encode_line(&reply)).await;
    // Keep the pipe open until the host hangs up so the reply is not lost
    while let Ok(n) = stream.read(&mut buf).await {
        if n == 0 {
            break;
        }
    }
}

/// Enumerator returning a fixed device list
pub struct MockEnumerator {
    devices: Vec<SerialDeviceInfo>,
    fail: bool,
    pub calls: AtomicUsize,
}

impl MockEnumerator {
    pub fn new(devices: &[(&str, &str)]) -> Self {
        Self {
            devices: devices
                .iter()
                .map(|(port_name, description)| SerialDeviceInfo {
                    port_name: port_name.to_string(),
                    description: description.to_string(),
                })
                .collect(),
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    /// Enumerator whose subsystem query fails
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(&[])
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DeviceEnumerator for MockEnumerator {
    async fn list_devices(&self) -> Result<Vec<SerialDeviceInfo>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(anyhow!("serial subsystem unavailable"));
        }
        Ok(self.devices.clone())
    }
}
