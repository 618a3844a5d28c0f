use std::sync::Arc;
use std::time::Duration;

use criterion::{Criterion, criterion_group, criterion_main};
use tokio::runtime::Runtime;

use tranca_store::{LeaseStore, MemoryLeaseStore, OwnerToken};

fn bench_memory_store(c: &mut Criterion) {
    let rt = Runtime::new().expect("tokio runtime");
    let store = Arc::new(MemoryLeaseStore::new());

    c.bench_function("acquire_release_cycle", |b| {
        b.iter(|| {
            rt.block_on(async {
                let token = OwnerToken::mint();
                store
                    .acquire("bench:cycle", &token, Duration::from_secs(30))
                    .await
                    .unwrap();
                store.release("bench:cycle", &token).await.unwrap()
            })
        })
    });

    c.bench_function("contended_acquire", |b| {
        rt.block_on(async {
            let holder = OwnerToken::mint();
            store
                .acquire("bench:held", &holder, Duration::from_secs(3600))
                .await
                .unwrap();
        });
        b.iter(|| {
            rt.block_on(async {
                let token = OwnerToken::mint();
                store
                    .acquire("bench:held", &token, Duration::from_secs(30))
                    .await
                    .unwrap()
            })
        })
    });

    c.bench_function("remaining_ttl_read", |b| {
        rt.block_on(async {
            let holder = OwnerToken::mint();
            store
                .acquire("bench:read", &holder, Duration::from_secs(3600))
                .await
                .unwrap();
        });
        b.iter(|| rt.block_on(async { store.remaining_ttl("bench:read").await.unwrap() }))
    });
}

criterion_group!(benches, bench_memory_store);
criterion_main!(benches);
