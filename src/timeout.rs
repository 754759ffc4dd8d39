//! Timeout wrapper for whole-file parses.
//!
//! Parsing has no internal checkpoints, so cancellation wraps the complete
//! synchronous call: it runs on tokio's blocking pool and the caller stops
//! waiting once the deadline passes.

use crate::config::ParserConfig;
use crate::core::binary::Binary;
use crate::error::{ElfReadError, Result};
use crate::loader::load_elf_with_config;
use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, error};

/// Default timeout duration in seconds
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 60;

/// Timeout configuration for a parse
#[derive(Debug, Clone)]
pub struct TimeoutConfig {
    /// Maximum duration for the operation
    pub duration: Duration,
    /// Whether to log timeout errors
    pub log_warnings: bool,
    /// Operation name for logging
    pub operation_name: String,
}

impl TimeoutConfig {
    /// Create a new timeout configuration
    pub fn new(seconds: u64, operation: impl Into<String>) -> Self {
        Self::from_duration(Duration::from_secs(seconds), operation)
    }

    pub fn from_duration(duration: Duration, operation: impl Into<String>) -> Self {
        Self {
            duration,
            log_warnings: true,
            operation_name: operation.into(),
        }
    }

    /// Create a default timeout configuration
    pub fn default_timeout(operation: impl Into<String>) -> Self {
        Self::new(DEFAULT_TIMEOUT_SECONDS, operation)
    }
}

/// Execute an async operation with a timeout
pub async fn with_timeout<T, F>(config: TimeoutConfig, future: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    debug!(
        "Starting operation '{}' with timeout of {:?}",
        config.operation_name, config.duration
    );

    match timeout(config.duration, future).await {
        Ok(result) => {
            debug!("Operation '{}' completed", config.operation_name);
            result
        }
        Err(_) => {
            if config.log_warnings {
                error!(
                    "Operation '{}' timed out after {:?}",
                    config.operation_name, config.duration
                );
            }

            Err(ElfReadError::Timeout {
                seconds: config.duration.as_secs(),
            })
        }
    }
}

/// Parse `data` on the blocking pool, giving up after `config.duration`.
///
/// A parse that overruns keeps running to completion in the background; its
/// result is discarded.
pub async fn load_elf_with_timeout(
    data: Vec<u8>,
    label: String,
    parser: ParserConfig,
    config: TimeoutConfig,
) -> Result<Binary> {
    let task = tokio::task::spawn_blocking(move || load_elf_with_config(&data, label, &parser));
    with_timeout(config, async move {
        match task.await {
            Ok(parsed) => Ok(parsed?),
            Err(e) => Err(ElfReadError::Internal(format!("parse task failed: {}", e))),
        }
    })
    .await
}
