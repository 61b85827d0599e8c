//! # Anchored State Flow
//!
//! A committee keeps its contract state in a partition of the authenticated
//! store, anchors the store digest in a state block, and the dispatcher
//! delivers the anchoring transaction back to it.
//!
//! ## Flow Tested:
//!
//! 1. Contract writes land in the committee's partition
//! 2. The store digest goes into a `StateBlock`
//! 3. The dispatcher routes balances, the state transaction and the request
//! 4. A proof from the persisted store verifies against the anchored digest

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use cn_01_state_trie::{
        verify_proof, InMemoryTrieDb, KvReader, KvWriter, Partition, PatriciaTrie, StateProof,
    };
    use cn_02_dispatcher::{
        invariant_causal_order, CommitteeMessage, DispatchApi, DispatchOutcome, Dispatcher,
        InMemoryCommitteeRegistry, RecordingInbox,
    };
    use shared_types::{
        Address, AddressBalances, Balance, Color, RequestBlock, StateBlock, Transaction,
        TransactionBuilder,
    };

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    const COMMITTEE: Address = Address([0xC0; 32]);
    const STATE_COLOR: Color = Color([0x5C; 32]);

    /// Store with two contracts' state, the committee's among them.
    fn committee_store() -> PatriciaTrie {
        let mut store = PatriciaTrie::new();
        {
            let mut part = Partition::for_address(&mut store, &COMMITTEE);
            part.set(b"counter", b"7");
            part.set(b"owner", b"alice");
            part.set(b"", b"meta");
        }
        {
            let other = Address::new([0x0B; 32]);
            Partition::for_address(&mut store, &other).set(b"counter", b"99");
        }
        store
    }

    /// Transaction anchoring `state_hash` at the committee with one request.
    fn anchoring_tx(state_hash: [u8; 32]) -> Arc<Transaction> {
        let tx = TransactionBuilder::new()
            .with_state(StateBlock::new(STATE_COLOR, 8, state_hash, 1_700_000_000))
            .with_request(RequestBlock::new(COMMITTEE, 1, b"increment".to_vec()))
            .with_output(COMMITTEE, Balance::new(STATE_COLOR, 1))
            .with_output(COMMITTEE, Balance::new(Color::NEW, 1))
            .build()
            .unwrap();
        Arc::new(tx)
    }

    fn balances_of(tx: &Transaction) -> AddressBalances {
        let mut balances = AddressBalances::new();
        balances.insert(tx.id(), tx.output_of(&COMMITTEE).to_vec());
        balances
    }

    fn setup() -> (Dispatcher<InMemoryCommitteeRegistry>, Arc<RecordingInbox>) {
        let registry = Arc::new(InMemoryCommitteeRegistry::new());
        let inbox = Arc::new(RecordingInbox::new(COMMITTEE));
        registry.register(inbox.clone());
        (Dispatcher::new(registry), inbox)
    }

    // =============================================================================
    // INTEGRATION TESTS
    // =============================================================================

    #[test]
    fn test_anchored_digest_reaches_committee() {
        let store = committee_store();
        let tx = anchoring_tx(store.root_hash());
        let (dispatcher, inbox) = setup();

        let outcome = dispatcher.dispatch_address_update(COMMITTEE, balances_of(&tx), tx.clone());
        assert_eq!(outcome, DispatchOutcome::Delivered(3));

        let messages = inbox.messages();
        assert!(invariant_causal_order(&messages));
        let CommitteeMessage::StateTransaction { transaction } = &messages[1] else {
            panic!("expected state transaction, got {}", messages[1].kind());
        };
        let anchored = transaction.state().unwrap().state_hash;
        assert_eq!(anchored, store.root_hash());

        assert_eq!(
            messages[2].request_id(),
            Some(tx.request_id(0)),
            "request follows the state transaction"
        );
    }

    #[test]
    fn test_state_dispatch_resolves_anchor_holder() {
        let store = committee_store();
        let tx = anchoring_tx(store.root_hash());
        let (dispatcher, inbox) = setup();

        assert_eq!(dispatcher.dispatch_state(tx), DispatchOutcome::Delivered(1));
        assert_eq!(inbox.len(), 1);
        assert_eq!(dispatcher.stats().messages_delivered, 1);
    }

    #[test]
    fn test_persisted_store_proves_against_anchor() {
        let store = committee_store();
        let tx = anchoring_tx(store.root_hash());
        let anchored = tx.state().unwrap().state_hash;

        let db = InMemoryTrieDb::new();
        let written = store.commit(&db).unwrap();
        assert!(written > 0);

        let restored = PatriciaTrie::load(&db, &anchored).unwrap();
        assert_eq!(restored, store);

        let mut key = COMMITTEE.as_bytes().to_vec();
        key.extend_from_slice(b"counter");
        let proof = restored.prove(&key);

        // Proofs travel between nodes in their wire encoding.
        let wire = bincode::serialize(&proof).unwrap();
        let received: StateProof = bincode::deserialize(&wire).unwrap();
        received.verify(&anchored).unwrap();
        assert_eq!(
            verify_proof(&anchored, &key, &received.nodes).unwrap(),
            Some(b"7".to_vec())
        );
    }

    #[test]
    fn test_stale_anchor_rejects_fresh_proof() {
        let mut store = committee_store();
        let stale = anchoring_tx(store.root_hash());
        let anchored = stale.state().unwrap().state_hash;

        Partition::for_address(&mut store, &COMMITTEE).set(b"counter", b"8");
        let mut key = COMMITTEE.as_bytes().to_vec();
        key.extend_from_slice(b"counter");

        assert!(store.prove(&key).verify(&anchored).is_err());
        assert_eq!(store.get(&key), Some(&b"8"[..]));
    }

    #[test]
    fn test_partition_reads_back_committee_view() {
        let mut store = committee_store();
        let part = Partition::for_address(&mut store, &COMMITTEE);

        let keys: Vec<Vec<u8>> = part.iter_prefix(b"").map(|(k, _)| k).collect();
        assert_eq!(
            keys,
            vec![b"".to_vec(), b"counter".to_vec(), b"owner".to_vec()]
        );
        assert_eq!(part.get(b"counter"), Some(&b"7"[..]));
    }
}
