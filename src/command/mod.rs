//! Command execution against the relay controller
//!
//! This module handles:
//! - Opening the serial channel to the located controller
//! - Sending the validated pin command
//! - Reading and classifying the reply
//! - Releasing the channel on every path

mod executor;

pub use executor::{ExecutorConfig, TransactionExecutor};
