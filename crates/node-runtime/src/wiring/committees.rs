//! Committee wiring.
//!
//! Every configured committee gets a [`ChannelInbox`] in the registry and a
//! consumer task draining it. The consumer stands in for the committee's
//! state machine: it logs each message and counts them.

use cn_02_dispatcher::{ChannelInbox, CommitteeMessage, InMemoryCommitteeRegistry};
use shared_types::Address;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Register an inbox for each address and spawn its consumer.
///
/// Each handle resolves to the number of messages the committee consumed.
pub fn start_committees(
    registry: &InMemoryCommitteeRegistry,
    addresses: &[Address],
    shutdown: watch::Receiver<bool>,
) -> Vec<JoinHandle<u64>> {
    addresses
        .iter()
        .map(|address| {
            let (inbox, receiver) = ChannelInbox::new(*address);
            if registry.register(Arc::new(inbox)).is_some() {
                info!(addr = %address, "Committee registered twice, previous inbox replaced");
            }
            tokio::spawn(consume(*address, receiver, shutdown.clone()))
        })
        .collect()
}

async fn consume(
    address: Address,
    mut inbox: mpsc::UnboundedReceiver<CommitteeMessage>,
    mut shutdown: watch::Receiver<bool>,
) -> u64 {
    let mut consumed = 0u64;
    loop {
        tokio::select! {
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
            message = inbox.recv() => {
                let Some(message) = message else { break };
                consumed += 1;
                match &message {
                    CommitteeMessage::Balances { balances } => {
                        debug!(addr = %address, txs = balances.len(), "Balances received");
                    }
                    CommitteeMessage::StateTransaction { transaction } => {
                        debug!(addr = %address, txid = %transaction.id(), "State transaction received");
                    }
                    CommitteeMessage::Request { transaction, index } => {
                        debug!(addr = %address, txid = %transaction.id(), index, "Request received");
                    }
                }
            }
        }
    }
    info!(addr = %address, consumed, "Committee consumer stopped");
    consumed
}
