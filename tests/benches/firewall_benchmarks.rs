//! # Firewall Benchmarks
//!
//! | Area | Operation |
//! |------|-----------|
//! | fw-01 Message Filter | rule chain validation, outbound construction |
//! | shared-bus | dedup cache insertion under churn |
//! | shared-types | legal name parsing |

use std::collections::BTreeSet;
use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use fw_01_message_filter::{MessageValidator, OutboundMessage};
use shared_bus::TimeBoundedDedupCache;
use shared_types::{HeaderValue, Headers, InboundMessage, LegalName, DEFAULT_WHITELISTED_HEADERS};

const SOURCE: &str = "CN=Node, O=Bank A, L=London, C=GB";
const TOPIC: &str = "p2p.inbound.bank-a";

fn whitelist() -> BTreeSet<String> {
    DEFAULT_WHITELISTED_HEADERS
        .iter()
        .map(|h| (*h).to_string())
        .collect()
}

fn inbound(header_count: usize) -> InboundMessage {
    let headers: Headers = DEFAULT_WHITELISTED_HEADERS
        .iter()
        .take(header_count)
        .map(|h| ((*h).to_string(), HeaderValue::from("value")))
        .collect();
    let (message, _rx) = InboundMessage::new(SOURCE, TOPIC, vec![0u8; 1024], headers);
    message
}

// ============================================================================
// fw-01: Message Filter
// ============================================================================

fn bench_validation(c: &mut Criterion) {
    let mut group = c.benchmark_group("fw-01-validation");
    let validator = MessageValidator::new(whitelist());

    for header_count in [0, 4, DEFAULT_WHITELISTED_HEADERS.len()] {
        let message = inbound(header_count);
        group.bench_with_input(
            BenchmarkId::new("validate", header_count),
            &message,
            |b, message| {
                b.iter(|| {
                    black_box(validator.validate(message, |topic, _| topic.starts_with("p2p.")))
                })
            },
        );
    }
    group.finish();
}

fn bench_outbound_construction(c: &mut Criterion) {
    let whitelist = whitelist();
    let message = inbound(DEFAULT_WHITELISTED_HEADERS.len());
    c.bench_function("fw-01-outbound-from-inbound", |b| {
        b.iter(|| black_box(OutboundMessage::from_inbound(&message, &whitelist)))
    });
}

// ============================================================================
// shared-bus: Dedup Cache
// ============================================================================

fn bench_dedup_cache(c: &mut Criterion) {
    let mut group = c.benchmark_group("shared-bus-dedup-cache");
    group.measurement_time(Duration::from_secs(5));

    for capacity in [100, 10_000] {
        let keys: Vec<String> = (0..capacity * 2).map(|i| format!("msg-{i}")).collect();
        group.throughput(Throughput::Elements(keys.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("put_if_absent_churn", capacity),
            &keys,
            |b, keys| {
                let cache = TimeBoundedDedupCache::new(capacity, Duration::from_secs(10));
                b.iter(|| {
                    for key in keys {
                        black_box(cache.put_if_absent(key));
                    }
                })
            },
        );
    }
    group.finish();
}

// ============================================================================
// shared-types: Legal Names
// ============================================================================

fn bench_legal_name_parse(c: &mut Criterion) {
    c.bench_function("shared-types-legal-name-parse", |b| {
        b.iter(|| black_box(LegalName::parse(black_box(SOURCE))))
    });
}

criterion_group!(
    benches,
    bench_validation,
    bench_outbound_construction,
    bench_dedup_cache,
    bench_legal_name_parse
);
criterion_main!(benches);
