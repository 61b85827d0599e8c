//! # Dispatch Configuration

use super::errors::DispatchError;
use serde::{Deserialize, Serialize};

/// Dispatch service configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Capacity of the ledger event queue feeding the service.
    pub event_buffer: usize,
    /// Maximum number of events dispatched at the same time.
    pub max_concurrent_events: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            event_buffer: 1024,
            max_concurrent_events: 256,
        }
    }
}

impl DispatchConfig {
    /// Create config for testing.
    pub fn for_testing() -> Self {
        Self {
            event_buffer: 16,
            max_concurrent_events: 4,
        }
    }

    /// Reject zero capacities.
    pub fn validate(&self) -> Result<(), DispatchError> {
        if self.event_buffer == 0 {
            return Err(DispatchError::ConfigError(
                "event_buffer must be positive".to_string(),
            ));
        }
        if self.max_concurrent_events == 0 {
            return Err(DispatchError::ConfigError(
                "max_concurrent_events must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
