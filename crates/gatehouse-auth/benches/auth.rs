//! Benchmarks for gatehouse authentication.

use std::hint::black_box;
use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use gatehouse_auth::{
    BasicCredentials, Dispatcher, MemoryVerifier, Registry, UserVerifier, salted_hash,
    verify_salted,
};
use gatehouse_config::{AuthMethodConfig, ListenerConfig, UserDef};
use http::HeaderMap;
use http::header::AUTHORIZATION;

fn bench_salted_hash(c: &mut Criterion) {
    let passwords = [
        "short",
        "medium_password_here",
        "this_is_a_much_longer_password_that_someone_might_actually_use_in_practice",
    ];

    let mut group = c.benchmark_group("salted_hash");
    for password in passwords {
        group.bench_with_input(
            BenchmarkId::from_parameter(password.len()),
            password,
            |b, p| b.iter(|| salted_hash(black_box(p), black_box("alice"))),
        );
    }
    group.finish();
}

fn bench_verify_salted(c: &mut Criterion) {
    let hash = salted_hash("test_password_123", "alice");

    c.bench_function("verify_salted_correct", |b| {
        b.iter(|| verify_salted(black_box("test_password_123"), "alice", black_box(&hash)))
    });

    c.bench_function("verify_salted_wrong", |b| {
        b.iter(|| verify_salted(black_box("wrong_password"), "alice", black_box(&hash)))
    });
}

fn bench_parse_header(c: &mut Criterion) {
    let value = BasicCredentials::header_value("alice", "test_password_123");

    c.bench_function("basic_credentials_parse", |b| {
        b.iter(|| BasicCredentials::parse(black_box(&value)))
    });
}

fn local_dispatcher(users: usize) -> Dispatcher {
    let mut listener = ListenerConfig {
        name: "bench".into(),
        realm: "bench".into(),
        auth: Default::default(),
    };
    listener.auth.methods.insert(
        "basic".into(),
        AuthMethodConfig {
            enabled: true,
            ..Default::default()
        },
    );
    for i in 0..users {
        let user = format!("user_{i}");
        listener.auth.users.insert(
            user.clone(),
            UserDef {
                password: salted_hash(&format!("password_{i}"), &user),
                groups: Default::default(),
            },
        );
    }

    let registry = Registry::with_basic(Arc::new(MemoryVerifier::new()));
    let dispatcher = Dispatcher::new(&registry);
    dispatcher
        .init(&registry.prepare(&listener).unwrap())
        .unwrap();
    dispatcher
}

fn headers(user: &str, password: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        BasicCredentials::header_value(user, password)
            .parse()
            .unwrap(),
    );
    headers
}

fn bench_local_check(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let small = local_dispatcher(10);
    let large = local_dispatcher(1000);
    let hit = headers("user_5", "password_5");
    let miss = headers("nobody", "password_5");
    let none = HeaderMap::new();

    let mut group = c.benchmark_group("dispatch_local");

    group.bench_function("10_users", |b| {
        b.iter(|| rt.block_on(small.authenticate(1, "/", "/", black_box(&hit))))
    });

    group.bench_function("1000_users", |b| {
        b.iter(|| rt.block_on(large.authenticate(1, "/", "/", black_box(&hit))))
    });

    group.bench_function("1000_users_miss", |b| {
        b.iter(|| rt.block_on(large.authenticate(1, "/", "/", black_box(&miss))))
    });

    group.bench_function("no_header", |b| {
        b.iter(|| rt.block_on(large.authenticate(1, "/", "/", black_box(&none))))
    });

    group.finish();
}

fn bench_memory_verifier(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let pairs: Vec<_> = (0..100)
        .map(|i| (format!("user_{i}"), format!("password_{i}")))
        .collect();
    let store = MemoryVerifier::from_passwords(pairs.iter().map(|(u, p)| (u.clone(), p)));
    let hash = salted_hash("password_50", "user_50");

    c.bench_function("memory_verifier_hashed", |b| {
        b.iter(|| rt.block_on(store.verify(black_box("user_50"), black_box(&hash), true)))
    });
}

criterion_group!(
    benches,
    bench_salted_hash,
    bench_verify_salted,
    bench_parse_header,
    bench_local_check,
    bench_memory_verifier,
);

criterion_main!(benches);
