use criterion::{black_box, criterion_group, criterion_main, Criterion};

use crewdesk_auth::{
    AuthRequest, CredentialService, HashCost, PasswordPolicy, RequestAuthenticator, RequestMethod,
    Role, RoutePolicy, SessionIdentity, SigningSecret, TokenLifetime, TokenService,
};
use crewdesk_core::{BusinessType, UserId};

const SECRET: &str = "bench-signing-key-0123456789-abcdefghij";

fn identity() -> SessionIdentity {
    SessionIdentity {
        user_id: UserId::new(),
        email: "bench@example.com".to_string(),
        role: Role::Manager,
        business_type: BusinessType::new("restaurant").unwrap(),
    }
}

fn token_service() -> TokenService {
    TokenService::new(&SigningSecret::new(SECRET).unwrap(), TokenLifetime::DEFAULT)
}

/// The default cost should land near 100ms per hash; check it here when
/// changing `HashCost::default()`.
fn bench_password_hashing(c: &mut Criterion) {
    let mut group = c.benchmark_group("password");
    group.sample_size(10);

    let svc = CredentialService::new(HashCost::default(), PasswordPolicy::default()).unwrap();
    let hash = svc.hash_password("Bench-passw0rd").unwrap();

    group.bench_function("hash_default_cost", |b| {
        b.iter(|| svc.hash_password(black_box("Bench-passw0rd")).unwrap());
    });

    group.bench_function("verify_default_cost", |b| {
        b.iter(|| svc.verify_password(black_box("Bench-passw0rd"), black_box(&hash)));
    });

    group.finish();
}

fn bench_token_round_trip(c: &mut Criterion) {
    let mut group = c.benchmark_group("token");
    let svc = token_service();
    let token = svc.issue(identity()).unwrap().token;

    group.bench_function("issue", |b| {
        b.iter(|| svc.issue(black_box(identity())).unwrap());
    });

    group.bench_function("verify", |b| {
        b.iter(|| svc.verify(black_box(&token)).unwrap());
    });

    group.finish();
}

fn bench_request_decision(c: &mut Criterion) {
    let svc = token_service();
    let header = format!("Bearer {}", svc.issue(identity()).unwrap().token);
    let api = RequestAuthenticator::new(svc, RoutePolicy::api());

    c.bench_function("decide_manager_only_api_route", |b| {
        b.iter(|| {
            let request = AuthRequest::new(black_box("/api/upload"), RequestMethod::Write)
                .with_authorization(Some(&header));
            api.decide(&request)
        });
    });
}

criterion_group!(
    benches,
    bench_password_hashing,
    bench_token_round_trip,
    bench_request_decision
);
criterion_main!(benches);
