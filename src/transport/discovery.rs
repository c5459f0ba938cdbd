//! Serial device discovery for finding the relay controller

use crate::transport::traits::{DeviceEnumerator, DeviceHandle, SerialDeviceInfo};
use arc_shared::protocol;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Configuration for serial device discovery
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Case-sensitive substring matched against device descriptions
    pub descriptor: String,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            descriptor: protocol::DEFAULT_DESCRIPTOR.into(),
        }
    }
}

/// Why no device handle was produced
#[derive(Error, Debug)]
pub enum LocateError {
    #[error("No serial device matching {descriptor:?} among {scanned} device(s)")]
    NoMatch { descriptor: String, scanned: usize },

    #[error("Serial device enumeration failed: {0}")]
    Enumeration(String),
}

/// Serial device discovery service
pub struct DeviceDiscovery {
    config: DiscoveryConfig,
}

impl DeviceDiscovery {
    /// Create a new discovery service
    pub fn new(config: DiscoveryConfig) -> Self {
        Self { config }
    }

    /// Check if a device is the controller (by description substring)
    fn is_controller(&self, device: &SerialDeviceInfo) -> bool {
        device.description.contains(&self.config.descriptor)
    }

    /// Find the first enumerated device matching the descriptor
    pub async fn locate<E: DeviceEnumerator + ?Sized>(
        &self,
        enumerator: &E,
    ) -> Result<DeviceHandle, LocateError> {
        let devices = enumerator
            .list_devices()
            .await
            .map_err(|e| LocateError::Enumeration(format!("{:#}", e)))?;

        for device in &devices {
            debug!(
                "[DISCOVERY] {} - {:?}",
                device.port_name, device.description
            );
            if !self.is_controller(device) {
                continue;
            }
            // Enumerators may report a matching entry without a port name
            match DeviceHandle::new(device.port_name.clone()) {
                Some(handle) => {
                    info!("[DISCOVERY] Found controller on {}", handle);
                    return Ok(handle);
                }
                None => warn!(
                    "[DISCOVERY] Skipping {:?}: no port name",
                    device.description
                ),
            }
        }

        Err(LocateError::NoMatch {
            descriptor: self.config.descriptor.clone(),
            scanned: devices.len(),
        })
    }

    /// Find the controller, collapsing every failure into "not found"
    pub async fn find<E: DeviceEnumerator + ?Sized>(&self, enumerator: &E) -> Option<DeviceHandle> {
        match self.locate(enumerator).await {
            Ok(handle) => Some(handle),
            Err(e) => {
                warn!("[DISCOVERY] {}", e);
                None
            }
        }
    }
}
