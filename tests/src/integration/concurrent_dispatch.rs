//! # Concurrent Dispatch
//!
//! Several producers feed the dispatch service at once while committees
//! drain their channel inboxes. Messages of different transactions may
//! interleave; messages of one transaction must keep their order.

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;

    use cn_02_dispatcher::{
        ChannelInbox, CommitteeMessage, DispatchConfig, DispatchService, Dispatcher,
        InMemoryCommitteeRegistry, LedgerEvent,
    };
    use rand::{rngs::StdRng, Rng, SeedableRng};
    use shared_types::{
        Address, AddressBalances, Balance, Color, RequestBlock, StateBlock, Transaction,
        TransactionBuilder, TransactionId,
    };
    use tokio::sync::{mpsc, watch};

    const COMMITTEES: u8 = 4;
    const PRODUCERS: usize = 8;
    const EVENTS_PER_PRODUCER: usize = 25;

    fn committee(n: u8) -> Address {
        Address::new([0xC0 + n; 32])
    }

    /// Transaction moving the state of `target` and sending it one request.
    fn update_tx(target: Address, nonce: u64) -> Arc<Transaction> {
        let color = Color::new([0x10 + target.0[0]; 32]);
        let mut payload = nonce.to_be_bytes().to_vec();
        payload.push(target.0[0]);
        let tx = TransactionBuilder::new()
            .with_state(StateBlock::new(color, nonce as u32, [0; 32], nonce as i64))
            .with_request(RequestBlock::new(target, 0, payload))
            .with_output(target, Balance::new(color, 1))
            .with_output(target, Balance::new(Color::NEW, 1))
            .build()
            .unwrap();
        Arc::new(tx)
    }

    fn update_event(target: Address, nonce: u64) -> LedgerEvent {
        let transaction = update_tx(target, nonce);
        let mut balances = AddressBalances::new();
        balances.insert(transaction.id(), transaction.output_of(&target).to_vec());
        LedgerEvent::AddressUpdate {
            address: target,
            balances,
            transaction,
        }
    }

    /// Transaction id a committee message belongs to.
    fn owner(message: &CommitteeMessage) -> TransactionId {
        match message {
            CommitteeMessage::Balances { balances } => {
                *balances.keys().next().expect("balances carry one transaction")
            }
            CommitteeMessage::StateTransaction { transaction }
            | CommitteeMessage::Request { transaction, .. } => transaction.id(),
        }
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<CommitteeMessage>) -> Vec<CommitteeMessage> {
        let mut out = Vec::new();
        while let Ok(message) = rx.try_recv() {
            out.push(message);
        }
        out
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_producers_keep_per_transaction_order() {
        let registry = Arc::new(InMemoryCommitteeRegistry::new());
        let mut receivers = Vec::new();
        for n in 0..COMMITTEES {
            let (inbox, rx) = ChannelInbox::new(committee(n));
            registry.register(Arc::new(inbox));
            receivers.push(rx);
        }

        let dispatcher = Arc::new(Dispatcher::new(Arc::clone(&registry)));
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);
        let (service, handle) = DispatchService::new(
            Arc::clone(&dispatcher),
            &DispatchConfig::for_testing(),
            shutdown_rx,
        )
        .unwrap();
        let service = tokio::spawn(service.run());

        let mut producers = Vec::new();
        for p in 0..PRODUCERS {
            let handle = handle.clone();
            producers.push(tokio::spawn(async move {
                let mut rng = StdRng::seed_from_u64(p as u64);
                for i in 0..EVENTS_PER_PRODUCER {
                    let target = committee(rng.gen_range(0..COMMITTEES));
                    let nonce = (p * EVENTS_PER_PRODUCER + i) as u64;
                    handle.submit(update_event(target, nonce)).await.unwrap();
                }
            }));
        }
        for producer in producers {
            producer.await.unwrap();
        }
        drop(handle);

        let total = tokio::time::timeout(Duration::from_secs(10), service)
            .await
            .expect("dispatch service did not stop")
            .unwrap();
        assert_eq!(total, (PRODUCERS * EVENTS_PER_PRODUCER) as u64);

        let mut per_tx: HashMap<TransactionId, Vec<&'static str>> = HashMap::new();
        let mut delivered = 0;
        for rx in &mut receivers {
            for message in drain(rx) {
                delivered += 1;
                per_tx.entry(owner(&message)).or_default().push(message.kind());
            }
        }

        assert_eq!(per_tx.len(), PRODUCERS * EVENTS_PER_PRODUCER);
        for kinds in per_tx.values() {
            assert_eq!(kinds, &["balances", "state", "request"]);
        }

        let stats = dispatcher.stats();
        assert_eq!(stats.messages_delivered, delivered);
        assert_eq!(stats.rejected, 0);
    }

    #[tokio::test]
    async fn test_unknown_committee_events_are_dropped() {
        let registry = Arc::new(InMemoryCommitteeRegistry::new());
        let (inbox, mut rx) = ChannelInbox::new(committee(0));
        registry.register(Arc::new(inbox));

        let dispatcher = Arc::new(Dispatcher::new(Arc::clone(&registry)));
        let (_shutdown_tx, shutdown_rx) = watch::channel(false);
        let (service, handle) = DispatchService::new(
            Arc::clone(&dispatcher),
            &DispatchConfig::for_testing(),
            shutdown_rx,
        )
        .unwrap();
        let service = tokio::spawn(service.run());

        handle.submit(update_event(committee(0), 1)).await.unwrap();
        handle.submit(update_event(committee(9), 2)).await.unwrap();
        drop(handle);
        assert_eq!(service.await.unwrap(), 2);

        assert_eq!(drain(&mut rx).len(), 3);
        let stats = dispatcher.stats();
        assert_eq!(stats.events, 2);
        assert_eq!(stats.not_applicable, 1);
    }
}
