//! # Inbound Ports
//!
//! API trait defining what the dispatcher can do.

use crate::domain::{DispatchOutcome, LedgerEvent};
use shared_types::{Address, AddressBalances, Transaction};
use std::sync::Arc;

/// Dispatch API - inbound port.
///
/// Every operation completes synchronously: it either enqueues messages on
/// one committee inbox or drops the event.
pub trait DispatchApi: Send + Sync {
    /// Route a transaction carrying a state block to the committee it anchors.
    fn dispatch_state(&self, transaction: Arc<Transaction>) -> DispatchOutcome;

    /// Route the state and request blocks of `transaction` addressed to
    /// `address`, preceded by the balance snapshot.
    fn dispatch_address_update(
        &self,
        address: Address,
        balances: AddressBalances,
        transaction: Arc<Transaction>,
    ) -> DispatchOutcome;

    /// Forward a bare balance refresh to the committee of `address`.
    fn dispatch_balances(&self, address: Address, balances: AddressBalances) -> DispatchOutcome;

    /// Route any ledger event.
    fn dispatch(&self, event: LedgerEvent) -> DispatchOutcome {
        match event {
            LedgerEvent::StateTransaction(transaction) => self.dispatch_state(transaction),
            LedgerEvent::AddressUpdate {
                address,
                balances,
                transaction,
            } => self.dispatch_address_update(address, balances, transaction),
            LedgerEvent::Balances { address, balances } => {
                self.dispatch_balances(address, balances)
            }
        }
    }
}
