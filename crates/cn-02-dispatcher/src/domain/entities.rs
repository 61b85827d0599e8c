//! # Domain Entities
//!
//! Messages delivered to committees and events consumed from the ledger feed.

use shared_types::{Address, AddressBalances, RequestId, Transaction};
use std::sync::Arc;

/// A message enqueued on a committee inbox.
///
/// Transactions are shared, never copied: one observed transaction may fan
/// out into a state message and several request messages.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommitteeMessage {
    /// Refreshed balance snapshot of the committee address.
    Balances {
        /// Outputs held by the address, per transaction.
        balances: AddressBalances,
    },
    /// The transaction anchoring the committee's next state.
    StateTransaction {
        /// The anchoring transaction.
        transaction: Arc<Transaction>,
    },
    /// One request block addressed to the committee.
    Request {
        /// The transaction carrying the request.
        transaction: Arc<Transaction>,
        /// Block index of the request inside the transaction.
        index: u16,
    },
}

impl CommitteeMessage {
    /// Short name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Balances { .. } => "balances",
            Self::StateTransaction { .. } => "state",
            Self::Request { .. } => "request",
        }
    }

    /// Id of the carried request, for `Request` messages.
    pub fn request_id(&self) -> Option<RequestId> {
        match self {
            Self::Request { transaction, index } => Some(transaction.request_id(*index)),
            _ => None,
        }
    }
}

/// An event from the ledger feed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LedgerEvent {
    /// A confirmed transaction carrying a state block.
    StateTransaction(Arc<Transaction>),
    /// Outputs of `address` changed because of `transaction`.
    AddressUpdate {
        /// The address whose outputs changed.
        address: Address,
        /// Full balance snapshot of the address.
        balances: AddressBalances,
        /// The transaction that caused the change.
        transaction: Arc<Transaction>,
    },
    /// Bare balance refresh for `address`.
    Balances {
        /// The address the balances belong to.
        address: Address,
        /// Full balance snapshot of the address.
        balances: AddressBalances,
    },
}

impl LedgerEvent {
    /// Short name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::StateTransaction(_) => "state_transaction",
            Self::AddressUpdate { .. } => "address_update",
            Self::Balances { .. } => "balances",
        }
    }
}
