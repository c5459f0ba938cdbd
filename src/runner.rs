//! One run of the utility: validate, locate, execute, report

use crate::command::{ExecutorConfig, TransactionExecutor};
use crate::transport::{ChannelConnector, DeviceDiscovery, DeviceEnumerator, DiscoveryConfig};
use arc_shared::{Command, ReturnCode};
use tracing::{info, warn};

/// Configuration for a run
#[derive(Debug, Clone, Default)]
pub struct ArcConfig {
    pub discovery: DiscoveryConfig,
    pub executor: ExecutorConfig,
}

/// Run a single command and map the outcome to a return code
///
/// Each step short-circuits on failure; an invalid command never touches
/// the enumerator or the connector.
pub async fn run<E, C>(config: &ArcConfig, raw: &str, enumerator: &E, connector: &C) -> ReturnCode
where
    E: DeviceEnumerator + ?Sized,
    C: ChannelConnector,
{
    let command = match Command::parse(raw) {
        Ok(command) => command,
        Err(e) => {
            warn!("Invalid command {:?}: {}", raw, e);
            return ReturnCode::InvalidCommand;
        }
    };

    let discovery = DeviceDiscovery::new(config.discovery.clone());
    let handle = match discovery.find(enumerator).await {
        Some(handle) => handle,
        None => return ReturnCode::NotFound,
    };

    let executor = TransactionExecutor::new(config.executor.clone(), connector);
    let result = executor.execute(&handle, &command).await;

    let code = ReturnCode::from(&result);
    info!("Run finished: {}", code);
    code
}
