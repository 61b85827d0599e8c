//! # Committee Node Benchmarks
//!
//! | Area | Operation |
//! |------|-----------|
//! | State store | digest after a batch of writes, trie vs flat |
//! | State store | proof generation and verification |
//! | Dispatcher | address update fan-out |

use std::sync::Arc;
use std::time::Duration;

use cn_01_state_trie::{verify_proof, FlatStore, KvWriter, PatriciaTrie};
use cn_02_dispatcher::{DispatchApi, Dispatcher, InMemoryCommitteeRegistry, RecordingInbox};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::{rngs::StdRng, Rng, SeedableRng};
use shared_types::{
    Address, AddressBalances, Balance, Color, RequestBlock, StateBlock, TransactionBuilder,
};

fn random_pairs(count: usize) -> Vec<(Vec<u8>, Vec<u8>)> {
    let mut rng = StdRng::seed_from_u64(42);
    (0..count)
        .map(|_| {
            let mut key = vec![0u8; 32];
            let mut value = vec![0u8; 64];
            rng.fill(key.as_mut_slice());
            rng.fill(value.as_mut_slice());
            (key, value)
        })
        .collect()
}

// ============================================================================
// State store: digest maintenance
// ============================================================================

fn bench_state_digest(c: &mut Criterion) {
    let mut group = c.benchmark_group("state-store-digest");
    group.measurement_time(Duration::from_secs(10));

    for count in [1_000, 10_000] {
        let pairs = random_pairs(count);
        let mut trie = PatriciaTrie::new();
        let mut flat = FlatStore::new();
        for (k, v) in &pairs {
            trie.insert(k, v.clone());
            flat.set(k, v);
        }
        let updates = random_pairs(100);

        group.throughput(Throughput::Elements(updates.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("trie_100_writes_then_root", count),
            &updates,
            |b, updates| {
                b.iter(|| {
                    let mut trie = trie.clone();
                    for (k, v) in updates {
                        trie.insert(k, v.clone());
                    }
                    black_box(trie.root_hash())
                })
            },
        );
        group.bench_with_input(
            BenchmarkId::new("flat_100_writes_then_root", count),
            &updates,
            |b, updates| {
                b.iter(|| {
                    let mut flat = flat.clone();
                    for (k, v) in updates {
                        flat.set(k, v);
                    }
                    black_box(flat.root_hash())
                })
            },
        );
    }

    group.finish();
}

// ============================================================================
// State store: proofs
// ============================================================================

fn bench_state_proofs(c: &mut Criterion) {
    let mut group = c.benchmark_group("state-store-proofs");

    let pairs = random_pairs(10_000);
    let mut trie = PatriciaTrie::new();
    for (k, v) in &pairs {
        trie.insert(k, v.clone());
    }
    let root = trie.root_hash();
    let (key, _) = &pairs[pairs.len() / 2];
    let proof = trie.prove(key);

    group.bench_function("prove_10k", |b| b.iter(|| black_box(trie.prove(key))));
    group.bench_function("verify_10k", |b| {
        b.iter(|| black_box(verify_proof(&root, key, &proof.nodes)))
    });

    group.finish();
}

// ============================================================================
// Dispatcher: address update fan-out
// ============================================================================

fn bench_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatcher");

    let committee = Address::new([0xC0; 32]);
    let registry = Arc::new(InMemoryCommitteeRegistry::new());
    let inbox = Arc::new(RecordingInbox::new(committee));
    registry.register(inbox.clone());
    let dispatcher = Dispatcher::new(registry);

    for requests in [1u16, 16, 128] {
        let color = Color::new([0x5C; 32]);
        let mut builder = TransactionBuilder::new()
            .with_state(StateBlock::new(color, 1, [0; 32], 0))
            .with_output(committee, Balance::new(color, 1))
            .with_output(committee, Balance::new(Color::NEW, i64::from(requests)));
        for i in 0..requests {
            builder = builder.with_request(RequestBlock::new(committee, i, vec![0; 32]));
        }
        let Ok(tx) = builder.build() else {
            continue;
        };
        let tx = Arc::new(tx);
        let mut balances = AddressBalances::new();
        balances.insert(tx.id(), tx.output_of(&committee).to_vec());

        group.throughput(Throughput::Elements(u64::from(requests) + 2));
        group.bench_with_input(
            BenchmarkId::new("address_update", requests),
            &(balances, tx),
            |b, (balances, tx)| {
                b.iter(|| {
                    let outcome =
                        dispatcher.dispatch_address_update(committee, balances.clone(), tx.clone());
                    inbox.drain();
                    black_box(outcome)
                })
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_state_digest, bench_state_proofs, bench_dispatch);
criterion_main!(benches);
