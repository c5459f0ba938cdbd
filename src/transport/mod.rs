pub mod discovery;
#[cfg(test)]
pub mod mock;
pub mod serial;
pub mod traits;

pub use discovery::{DeviceDiscovery, DiscoveryConfig};
pub use serial::{SerialConnector, SystemEnumerator};
pub use traits::{ChannelConnector, ChannelSettings, DeviceEnumerator, DeviceHandle, TransportStream};
