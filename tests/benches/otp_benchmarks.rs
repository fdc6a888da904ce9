//! # OTP Benchmarks
//!
//! | Operation | Target |
//! |-----------|--------|
//! | Code generation | < 1µs |
//! | Destination normalization | < 1µs |
//! | Issue + verify on the in-memory store | < 100µs |
//! | Verify against a crowded store | linear in store size |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use otp_verification::{
    generate_code, normalize_phone, validate_email, CodeRange, DestinationKind, InMemoryOtpStore,
    OtpApi, OtpConfig, OtpService,
};
use std::sync::Arc;
use tokio::runtime::Runtime;

fn bench_pure_functions(c: &mut Criterion) {
    let mut group = c.benchmark_group("otp-pure");

    group.bench_function("generate_code_full", |b| {
        b.iter(|| black_box(generate_code(CodeRange::FullSixDigit)))
    });

    group.bench_function("normalize_phone", |b| {
        b.iter(|| black_box(normalize_phone(black_box("(555) 123-4567"), "+1")))
    });

    group.bench_function("validate_email", |b| {
        b.iter(|| black_box(validate_email(black_box("investor@example.com"))))
    });

    group.finish();
}

fn bench_issue_verify(c: &mut Criterion) {
    let runtime = Runtime::new().expect("tokio runtime");
    let mut group = c.benchmark_group("otp-service");

    group.bench_function("issue_then_verify", |b| {
        let service = OtpService::new(Arc::new(InMemoryOtpStore::new()), OtpConfig::development());
        b.iter(|| {
            runtime.block_on(async {
                let code = service
                    .issue(DestinationKind::Email, "bench@example.com")
                    .await
                    .expect("issue")
                    .code
                    .expect("development echoes code");
                black_box(
                    service
                        .verify(DestinationKind::Email, "bench@example.com", &code)
                        .await
                        .expect("verify"),
                )
            })
        })
    });

    for crowd in [100usize, 1_000, 10_000] {
        let store = Arc::new(InMemoryOtpStore::new());
        let service = OtpService::new(store, OtpConfig::development());
        runtime.block_on(async {
            for i in 0..crowd {
                service
                    .issue(DestinationKind::Email, &format!("user{i}@example.com"))
                    .await
                    .expect("seed");
            }
        });

        group.throughput(Throughput::Elements(crowd as u64));
        group.bench_with_input(BenchmarkId::new("verify_miss", crowd), &crowd, |b, _| {
            b.iter(|| {
                runtime.block_on(async {
                    black_box(
                        service
                            .verify(DestinationKind::Email, "absent@example.com", "000000")
                            .await
                            .is_err(),
                    )
                })
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_pure_functions, bench_issue_verify);
criterion_main!(benches);
