//! Resilience benchmarks
//!
//! Covers the hot paths of a bridge call: backoff computation, breaker
//! admission on a closed circuit, rejection on an open one, and a retry
//! sequence whose waits are recorded rather than slept.
//!
//! Run with: `cargo bench --bench resilience_bench -p glyphbridge-common
//! --features test-utils`

use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glyphbridge_common::resilience::{
    backoff_delay, CircuitBreaker, CircuitBreakerConfig, OperationRegistry, RetryConfig,
    RetryExecutor, RetryOptions,
};
use glyphbridge_common::testing::{MockClock, RecordingSleeper};
use tokio::runtime::Builder as RuntimeBuilder;

fn build_runtime() -> tokio::runtime::Runtime {
    RuntimeBuilder::new_current_thread()
        .enable_all()
        .build()
        .expect("tokio runtime should build for benchmarks")
}

#[derive(Debug, Clone)]
struct BenchError(&'static str);

impl Display for BenchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for BenchError {}

// ============================================================================
// Backoff
// ============================================================================

fn bench_backoff(c: &mut Criterion) {
    let mut group = c.benchmark_group("backoff_delay");
    let base = Duration::from_millis(500);
    let max = Duration::from_millis(5_000);

    for attempt in [1_u32, 5, 20, 1_000] {
        group.bench_with_input(BenchmarkId::from_parameter(attempt), &attempt, |b, &attempt| {
            b.iter(|| backoff_delay(black_box(attempt), base, 1.5, max));
        });
    }

    group.finish();
}

// ============================================================================
// Circuit breaker
// ============================================================================

fn bench_circuit_breaker(c: &mut Criterion) {
    let mut group = c.benchmark_group("circuit_breaker");
    let runtime = build_runtime();
    let config = CircuitBreakerConfig::default();

    group.bench_function("closed_success", |b| {
        let breaker = CircuitBreaker::new(OperationRegistry::shared());
        b.to_async(&runtime).iter(|| async {
            let result = breaker
                .execute_with_circuit_breaker("evaluate_script", &config, || async {
                    Ok::<_, BenchError>(())
                })
                .await;
            if let Err(err) = result {
                panic!("closed circuit rejected a call: {err}");
            }
        });
    });

    group.bench_function("open_rejection", |b| {
        let registry = Arc::new(OperationRegistry::with_clock(MockClock::new()));
        let breaker = CircuitBreaker::new(Arc::clone(&registry));
        runtime.block_on(async {
            for _ in 0..config.failure_threshold {
                let _ = breaker
                    .execute_with_circuit_breaker("evaluate_script", &config, || async {
                        Err::<(), _>(BenchError("host unavailable"))
                    })
                    .await;
            }
        });

        b.to_async(&runtime).iter(|| async {
            let result = breaker
                .execute_with_circuit_breaker("evaluate_script", &config, || async {
                    Ok::<_, BenchError>(())
                })
                .await;
            black_box(result.is_err());
        });
    });

    group.finish();
}

// ============================================================================
// Retry
// ============================================================================

fn bench_retry_executor(c: &mut Criterion) {
    let mut group = c.benchmark_group("retry_executor");
    let runtime = build_runtime();
    let options: RetryOptions<BenchError> = RetryOptions::new(RetryConfig::default());
    let executor =
        RetryExecutor::with_sleeper(OperationRegistry::shared(), RecordingSleeper::new());

    group.bench_function("immediate_success", |b| {
        b.to_async(&runtime).iter(|| async {
            let result = executor
                .execute_with_retry("evaluate_script", &options, |_| async { Ok(()) })
                .await;
            if let Err(err) = result {
                panic!("retry immediate success failed: {err:?}");
            }
        });
    });

    group.bench_function("exhausted", |b| {
        b.to_async(&runtime).iter(|| async {
            let result: Result<(), _> = executor
                .execute_with_retry("read_resource:glyphs.json", &options, |_| async {
                    Err(BenchError("network unreachable"))
                })
                .await;
            black_box(result.is_err());
        });
    });

    group.finish();
}

criterion_group!(resilience, bench_backoff, bench_circuit_breaker, bench_retry_executor);
criterion_main!(resilience);
