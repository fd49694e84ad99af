//! Benchmarks for quorum round-trip overhead

use std::time::Duration;

use criterion::{Criterion, criterion_group, criterion_main};
use quorum_lock::{Redlock, ScriptArg, ScriptClient};

/// Loopback participant: every script covers every key instantly, so the
/// measurements isolate the manager's own bookkeeping.
#[derive(Clone)]
struct LoopbackClient;

impl ScriptClient for LoopbackClient {
    type Error = std::io::Error;

    async fn evaluate(
        &self,
        _script: &str,
        keys: &[String],
        _args: &[ScriptArg],
    ) -> Result<i64, Self::Error> {
        Ok(keys.len() as i64)
    }

    async fn quit(&self) -> Result<(), Self::Error> {
        Ok(())
    }
}

fn bench_quorum_round_trips(c: &mut Criterion) {
    let manager = Redlock::new(vec![LoopbackClient, LoopbackClient, LoopbackClient]).unwrap();

    let mut group = c.benchmark_group("quorum_lock");
    group.bench_function("acquire_release", |b| {
        b.to_async(tokio::runtime::Runtime::new().unwrap())
            .iter(|| async {
                let lock = manager
                    .acquire("bench-resource", Duration::from_secs(1))
                    .await
                    .unwrap();
                lock.unlock().await.unwrap();
            });
    });

    group.bench_function("acquire_extend_release", |b| {
        b.to_async(tokio::runtime::Runtime::new().unwrap())
            .iter(|| async {
                let mut lock = manager
                    .acquire("bench-resource", Duration::from_secs(1))
                    .await
                    .unwrap();
                lock.extend(Duration::from_secs(1)).await.unwrap();
                lock.unlock().await.unwrap();
            });
    });

    group.finish();
}

criterion_group!(benches, bench_quorum_round_trips);
criterion_main!(benches);
