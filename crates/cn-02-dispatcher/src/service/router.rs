//! # Dispatch Router
//!
//! Classifies ledger events, resolves the responsible committee and enqueues
//! typed messages on its inbox.
//!
//! ## Ordering
//!
//! For one address update the committee receives
//! `Balances, [StateTransaction], Request*` in that order, requests by
//! ascending block index. The balance snapshot goes first so the committee
//! can resolve the request tokens before it acts on the requests.

use crate::domain::{
    invariant_causal_order, CommitteeMessage, DispatchOutcome, DispatchStats,
    DispatchStatsSnapshot, NotApplicable, RejectReason,
};
use crate::ports::inbound::DispatchApi;
use crate::ports::outbound::{CommitteeInbox, CommitteeRegistry};
use shared_types::{Address, AddressBalances, Transaction};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Stateless router over a shared committee registry.
///
/// Cloning is cheap and clones share the registry and the counters, so one
/// dispatcher can serve any number of concurrent tasks.
pub struct Dispatcher<R: ?Sized> {
    registry: Arc<R>,
    stats: Arc<DispatchStats>,
}

impl<R: ?Sized> Clone for Dispatcher<R> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            stats: Arc::clone(&self.stats),
        }
    }
}

impl<R: CommitteeRegistry + ?Sized> Dispatcher<R> {
    /// Create a dispatcher over `registry`.
    pub fn new(registry: Arc<R>) -> Self {
        Self {
            registry,
            stats: Arc::new(DispatchStats::new()),
        }
    }

    /// The registry this dispatcher routes with.
    pub fn registry(&self) -> &Arc<R> {
        &self.registry
    }

    /// Counters of all dispatches so far.
    pub fn stats(&self) -> DispatchStatsSnapshot {
        self.stats.snapshot()
    }

    fn committee(&self, address: &Address) -> Result<Arc<dyn CommitteeInbox>, NotApplicable> {
        self.registry.committee_by_address(address).ok_or_else(|| {
            debug!(addr = %address, "Committee not found");
            NotApplicable::UnknownCommittee(*address)
        })
    }

    fn finish(&self, outcome: DispatchOutcome) -> DispatchOutcome {
        self.stats.record(&outcome);
        outcome
    }

    fn route_state(&self, transaction: Arc<Transaction>) -> DispatchOutcome {
        let Some(state) = transaction.state() else {
            return NotApplicable::NoStateBlock.into();
        };
        let Some(address) = transaction.state_anchor_address() else {
            debug!(
                txid = %transaction.id(),
                color = %state.color,
                "No output holds the state token"
            );
            return NotApplicable::NoStateAnchor.into();
        };
        let committee = match self.committee(&address) {
            Ok(committee) => committee,
            Err(reason) => return reason.into(),
        };

        debug!(txid = %transaction.id(), addr = %address, "Dispatching state transaction");
        if let Err(e) = transaction.validate_blocks(&address) {
            warn!(txid = %transaction.id(), error = %e, "Invalid transaction ignored");
            return RejectReason::InvalidBlocks(e).into();
        }

        committee.enqueue(CommitteeMessage::StateTransaction { transaction });
        DispatchOutcome::Delivered(1)
    }

    fn route_address_update(
        &self,
        address: Address,
        balances: AddressBalances,
        transaction: Arc<Transaction>,
    ) -> DispatchOutcome {
        debug!(addr = %address, txid = %transaction.id(), "Dispatching address update");

        let committee = match self.committee(&address) {
            Ok(committee) => committee,
            Err(reason) => return reason.into(),
        };
        if !balances.contains_key(&transaction.id()) {
            error!(
                txid = %transaction.id(),
                addr = %address,
                "Transaction is not among provided outputs, ignored"
            );
            return RejectReason::MissingBalances(transaction.id()).into();
        }
        if let Err(e) = transaction.validate_blocks(&address) {
            warn!(txid = %transaction.id(), error = %e, "Invalid transaction ignored");
            return RejectReason::InvalidBlocks(e).into();
        }

        let anchors_state = transaction.state_anchor_address() == Some(address);
        let requests: Vec<u16> = transaction
            .requests()
            .iter()
            .enumerate()
            .filter(|(_, request)| request.target == address)
            .map(|(index, _)| index as u16)
            .collect();

        if !anchors_state && requests.is_empty() {
            debug!(txid = %transaction.id(), addr = %address, "Nothing addressed to committee");
            return NotApplicable::NothingToDeliver.into();
        }

        let mut messages = Vec::with_capacity(requests.len() + 2);
        messages.push(CommitteeMessage::Balances { balances });
        if anchors_state {
            messages.push(CommitteeMessage::StateTransaction {
                transaction: Arc::clone(&transaction),
            });
        }
        for index in requests {
            debug!(
                addr = %address,
                req = %transaction.request_id(index),
                "Request dispatched"
            );
            messages.push(CommitteeMessage::Request {
                transaction: Arc::clone(&transaction),
                index,
            });
        }
        debug_assert!(invariant_causal_order(&messages));

        let delivered = messages.len();
        for message in messages {
            committee.enqueue(message);
        }
        DispatchOutcome::Delivered(delivered)
    }

    fn route_balances(&self, address: Address, balances: AddressBalances) -> DispatchOutcome {
        match self.committee(&address) {
            Ok(committee) => {
                committee.enqueue(CommitteeMessage::Balances { balances });
                DispatchOutcome::Delivered(1)
            }
            Err(reason) => reason.into(),
        }
    }
}

impl<R: CommitteeRegistry + ?Sized> DispatchApi for Dispatcher<R> {
    fn dispatch_state(&self, transaction: Arc<Transaction>) -> DispatchOutcome {
        self.finish(self.route_state(transaction))
    }

    fn dispatch_address_update(
        &self,
        address: Address,
        balances: AddressBalances,
        transaction: Arc<Transaction>,
    ) -> DispatchOutcome {
        self.finish(self.route_address_update(address, balances, transaction))
    }

    fn dispatch_balances(&self, address: Address, balances: AddressBalances) -> DispatchOutcome {
        self.finish(self.route_balances(address, balances))
    }
}
