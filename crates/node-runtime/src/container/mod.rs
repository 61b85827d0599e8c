//! # Node Container
//!
//! Holds the shared services of a committee node: the committee registry
//! and the dispatcher routing ledger events into it.

pub mod config;

pub use config::{load_config, load_config_from, ConfigError, NodeConfig};

use cn_02_dispatcher::{Dispatcher, InMemoryCommitteeRegistry};
use std::sync::Arc;
use tracing::info;

/// Service container, built once at startup and shared by every task.
pub struct NodeContainer {
    /// Configuration the container was built from.
    pub config: NodeConfig,
    /// Committees running on this node.
    pub registry: Arc<InMemoryCommitteeRegistry>,
    /// Router from ledger events to committee inboxes.
    pub dispatcher: Arc<Dispatcher<InMemoryCommitteeRegistry>>,
}

impl NodeContainer {
    /// Validate `config` and build the services.
    pub fn new(config: NodeConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let registry = Arc::new(InMemoryCommitteeRegistry::new());
        let dispatcher = Arc::new(Dispatcher::new(Arc::clone(&registry)));
        info!(
            committees = config.committees.addresses.len(),
            feed_hosts = config.feed.hosts.len(),
            "Node container initialized"
        );
        Ok(Self {
            config,
            registry,
            dispatcher,
        })
    }
}
