use criterion::{criterion_group, criterion_main, Criterion};
use std::sync::Arc;

use service::account::domain::NewUser;
use service::account::repository::mock::InMemoryUserRepository;
use service::account::UserService;
use service::auth::PrincipalResolver;
use service::crypto::{Argon2Hasher, CredentialHasher};

fn bench_resolve_principal(c: &mut Criterion) {
    let hasher = Arc::new(Argon2Hasher::default());
    let svc = UserService::new(Arc::new(InMemoryUserRepository::default()), hasher);

    // pre-create user outside of the benchmark using a tokio runtime
    let rt = tokio::runtime::Runtime::new().unwrap();
    rt.block_on(svc.save(NewUser { username: "bench".into(), password: "Benchmark1".into(), enabled: true, role: "user".into() }))
        .unwrap();

    c.bench_function("resolve_principal", |b| {
        b.to_async(&rt).iter(|| async {
            svc.resolve_principal("bench").await.unwrap();
        });
    });

    c.bench_function("authenticate", |b| {
        b.to_async(&rt).iter(|| async {
            svc.authenticate("bench", "Benchmark1").await.unwrap();
        });
    });
}

fn bench_hash(c: &mut Criterion) {
    let hasher = Argon2Hasher::default();
    c.bench_function("argon2id_hash", |b| {
        b.iter(|| hasher.hash("Benchmark1").unwrap());
    });
}

criterion_group!(benches, bench_resolve_principal, bench_hash);
criterion_main!(benches);
