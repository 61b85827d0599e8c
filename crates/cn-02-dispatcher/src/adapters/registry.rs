//! Committee Registry Adapter
//!
//! Implements `CommitteeRegistry` over an in-memory map.

use crate::ports::outbound::{CommitteeInbox, CommitteeRegistry};
use parking_lot::RwLock;
use shared_types::Address;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// Read-mostly map from committee address to inbox.
///
/// Lookups take a shared lock, so concurrent dispatches never wait on each
/// other; `register`/`unregister` take the write lock briefly.
#[derive(Default)]
pub struct InMemoryCommitteeRegistry {
    committees: RwLock<HashMap<Address, Arc<dyn CommitteeInbox>>>,
}

impl InMemoryCommitteeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a committee, replacing any previous one at the same address.
    ///
    /// Returns the replaced inbox.
    pub fn register(&self, inbox: Arc<dyn CommitteeInbox>) -> Option<Arc<dyn CommitteeInbox>> {
        let address = inbox.address();
        info!(addr = %address, "Committee registered");
        self.committees.write().insert(address, inbox)
    }

    /// Remove the committee at `address`.
    pub fn unregister(&self, address: &Address) -> Option<Arc<dyn CommitteeInbox>> {
        let removed = self.committees.write().remove(address);
        if removed.is_some() {
            info!(addr = %address, "Committee unregistered");
        }
        removed
    }

    /// Number of registered committees.
    pub fn len(&self) -> usize {
        self.committees.read().len()
    }

    /// Check if no committee is registered.
    pub fn is_empty(&self) -> bool {
        self.committees.read().is_empty()
    }

    /// Addresses of all registered committees.
    pub fn addresses(&self) -> Vec<Address> {
        let mut addresses: Vec<Address> = self.committees.read().keys().copied().collect();
        addresses.sort();
        addresses
    }
}

impl CommitteeRegistry for InMemoryCommitteeRegistry {
    fn committee_by_address(&self, address: &Address) -> Option<Arc<dyn CommitteeInbox>> {
        self.committees.read().get(address).cloned()
    }
}
