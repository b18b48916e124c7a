//! End-to-end login behaviour against a mock users API.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

use auth_service::auth::LoginError;
use auth_service::resilience::{CircuitState, RequestContext};
use auth_service::users_api::token::ProfileClaims;
use auth_service::users_api::{Identity, TokenMinter};

mod common;

fn admin() -> Identity {
    Identity {
        username: "admin".into(),
        first_name: "Admin".into(),
        last_name: "User".into(),
        role: "admin".into(),
    }
}

/// Mock that answers 200 with the admin profile and counts calls.
async fn counting_users_api() -> (std::net::SocketAddr, Arc<AtomicU32>) {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = calls.clone();
    let addr = common::start_users_api(move |_| {
        let counter = counter.clone();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
            (200, common::ADMIN_PROFILE.to_string())
        }
    })
    .await;
    (addr, calls)
}

#[tokio::test]
async fn test_valid_credentials_return_profile() {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let seen = requests.clone();
    let addr = common::start_users_api(move |req| {
        seen.lock().unwrap().push(req);
        async { (200, common::ADMIN_PROFILE.to_string()) }
    })
    .await;
    let service = common::login_service(addr, common::fast_breaker());

    let identity = service
        .login(&RequestContext::new(), "admin", "admin")
        .await
        .expect("login should succeed");
    assert_eq!(identity, admin());

    let requests = requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].path(), "/users/admin");

    let auth = requests[0].header("authorization").expect("bearer token sent");
    let token = auth.strip_prefix("Bearer ").expect("bearer scheme");
    let claims = decode::<ProfileClaims>(
        token,
        &DecodingKey::from_secret(common::SECRET.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .unwrap()
    .claims;
    assert_eq!(claims.username, "admin");
    assert_eq!(claims.scope, "read");
}

#[tokio::test]
async fn test_wrong_secret_still_fetches_profile() {
    let (addr, calls) = counting_users_api().await;
    let service = common::login_service(addr, common::fast_breaker());

    let result = service.login(&RequestContext::new(), "admin", "wrong").await;
    assert_eq!(result, Err(LoginError::WrongCredentials));
    assert_eq!(calls.load(Ordering::SeqCst), 1, "fetch precedes the credential check");
}

#[tokio::test]
async fn test_unknown_users_never_authenticate() {
    let (addr, _) = counting_users_api().await;
    let service = common::login_service(addr, common::fast_breaker());
    let ctx = RequestContext::new();

    for (username, secret) in [
        ("mallory", "admin"),
        ("mallory", ""),
        ("", "admin_admin"),
        ("admin_admin", ""),
        ("johnd", "ddd"),
    ] {
        let result = service.login(&ctx, username, secret).await;
        assert_eq!(
            result,
            Err(LoginError::WrongCredentials),
            "{username:?}/{secret:?} must be rejected"
        );
    }
}

#[tokio::test]
async fn test_repeated_logins_are_identical() {
    let (addr, calls) = counting_users_api().await;
    let service = common::login_service(addr, common::fast_breaker());
    let ctx = RequestContext::new();

    let first = service.login(&ctx, "admin", "admin").await.unwrap();
    let second = service.login(&ctx, "admin", "admin").await.unwrap();
    assert_eq!(first, second);
    assert_eq!(calls.load(Ordering::SeqCst), 2, "every login fetches a fresh profile");
}

#[tokio::test]
async fn test_upstream_errors_trip_breaker() {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = calls.clone();
    let addr = common::start_users_api(move |_| {
        let counter = counter.clone();
        async move {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            if n < 2 {
                (200, common::ADMIN_PROFILE.to_string())
            } else {
                (500, "database down".to_string())
            }
        }
    })
    .await;
    let service = common::login_service(addr, common::fast_breaker());
    let ctx = RequestContext::new();

    assert!(service.login(&ctx, "admin", "admin").await.is_ok());
    assert!(service.login(&ctx, "admin", "admin").await.is_ok());
    for _ in 0..3 {
        assert_eq!(
            service.login(&ctx, "admin", "admin").await,
            Err(LoginError::ServiceUnavailable)
        );
    }
    assert_eq!(service.breaker().state(), CircuitState::Open);

    assert_eq!(
        service.login(&ctx, "admin", "admin").await,
        Err(LoginError::ServiceUnavailable)
    );
    assert_eq!(calls.load(Ordering::SeqCst), 5, "open breaker makes no network call");
}

#[tokio::test]
async fn test_open_breaker_denies_every_login_until_cool_down() {
    let healthy = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let flag = healthy.clone();
    let addr = common::start_users_api(move |_| {
        let flag = flag.clone();
        async move {
            if flag.load(Ordering::SeqCst) {
                (200, common::ADMIN_PROFILE.to_string())
            } else {
                (503, "unavailable".to_string())
            }
        }
    })
    .await;
    let service = common::login_service(addr, common::fast_breaker());
    let ctx = RequestContext::new();

    for _ in 0..5 {
        let _ = service.login(&ctx, "admin", "admin").await;
    }
    assert_eq!(service.breaker().state(), CircuitState::Open);

    healthy.store(true, Ordering::SeqCst);
    for (user, secret) in [("admin", "admin"), ("admin", "wrong"), ("mallory", "x")] {
        assert_eq!(
            service.login(&ctx, user, secret).await,
            Err(LoginError::ServiceUnavailable)
        );
    }

    tokio::time::sleep(Duration::from_millis(400)).await;

    for _ in 0..3 {
        assert_eq!(service.login(&ctx, "admin", "admin").await, Ok(admin()));
    }
    assert_eq!(service.breaker().state(), CircuitState::Closed);
}

#[tokio::test]
async fn test_failed_probe_reopens() {
    let (addr, calls) = {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let addr = common::start_users_api(move |_| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                (500, "still down".to_string())
            }
        })
        .await;
        (addr, calls)
    };
    let service = common::login_service(addr, common::fast_breaker());
    let ctx = RequestContext::new();

    for _ in 0..5 {
        let _ = service.login(&ctx, "admin", "admin").await;
    }
    tokio::time::sleep(Duration::from_millis(400)).await;

    assert_eq!(
        service.login(&ctx, "admin", "admin").await,
        Err(LoginError::ServiceUnavailable)
    );
    assert_eq!(calls.load(Ordering::SeqCst), 6, "one probe reached the users API");
    assert_eq!(service.breaker().state(), CircuitState::Open);

    let _ = service.login(&ctx, "admin", "admin").await;
    assert_eq!(calls.load(Ordering::SeqCst), 6, "cool-down restarted");
}

#[tokio::test]
async fn test_malformed_profile_is_unavailable() {
    let addr = common::start_fixed_users_api(200, "<html>not json</html>").await;
    let service = common::login_service(addr, common::fast_breaker());

    let result = service.login(&RequestContext::new(), "admin", "admin").await;
    assert_eq!(result, Err(LoginError::ServiceUnavailable));
    assert_eq!(service.breaker().counts().total_failures, 1);
}

#[tokio::test]
async fn test_partial_profile_still_logs_in() {
    let addr = common::start_fixed_users_api(
        200,
        r#"{"username":"janed","firstname":"Jane","lastname":null}"#,
    )
    .await;
    let service = common::login_service(addr, common::fast_breaker());

    let identity = service
        .login(&RequestContext::new(), "janed", "ddd")
        .await
        .unwrap();
    assert_eq!(identity.first_name, "Jane");
    assert_eq!(identity.last_name, "");
    assert_eq!(service.breaker().counts().total_failures, 0);
}

#[tokio::test]
async fn test_unreachable_users_api_is_unavailable() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let service = common::login_service(addr, common::fast_breaker());

    let result = service.login(&RequestContext::new(), "admin", "admin").await;
    assert_eq!(result, Err(LoginError::ServiceUnavailable));
}

#[tokio::test]
async fn test_cancellation_interrupts_fetch() {
    let addr = common::start_users_api(|_| async {
        tokio::time::sleep(Duration::from_secs(5)).await;
        (200, common::ADMIN_PROFILE.to_string())
    })
    .await;
    let service = common::login_service(addr, common::fast_breaker());

    let ctx = RequestContext::new();
    let canceller = ctx.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        canceller.cancel();
    });

    let started = Instant::now();
    let result = service.login(&ctx, "admin", "admin").await;
    assert_eq!(result, Err(LoginError::ServiceUnavailable));
    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(service.breaker().counts().total_failures, 1);
}

#[tokio::test]
async fn test_deadline_interrupts_fetch() {
    let addr = common::start_users_api(|_| async {
        tokio::time::sleep(Duration::from_secs(5)).await;
        (200, common::ADMIN_PROFILE.to_string())
    })
    .await;
    let service = common::login_service(addr, common::fast_breaker());

    let started = Instant::now();
    let ctx = RequestContext::with_timeout(Duration::from_millis(100));
    let result = service.login(&ctx, "admin", "admin").await;
    assert_eq!(result, Err(LoginError::ServiceUnavailable));
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn test_signing_failures_count_toward_breaker() {
    let (addr, calls) = counting_users_api().await;
    let broken = TokenMinter::new("", Duration::from_secs(60), Duration::from_secs(60));
    let service = common::login_service_with_minter(addr, common::fast_breaker(), broken);
    let ctx = RequestContext::new();

    for _ in 0..5 {
        assert_eq!(
            service.login(&ctx, "admin", "admin").await,
            Err(LoginError::ServiceUnavailable)
        );
    }
    assert_eq!(service.breaker().state(), CircuitState::Open);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_concurrent_logins_share_breaker() {
    let addr = common::start_fixed_users_api(500, "down").await;
    let service = Arc::new(common::login_service(addr, common::fast_breaker()));

    let mut tasks = Vec::new();
    for _ in 0..10 {
        let service = service.clone();
        tasks.push(tokio::spawn(async move {
            service.login(&RequestContext::new(), "admin", "admin").await
        }));
    }
    for task in tasks {
        assert_eq!(task.await.unwrap(), Err(LoginError::ServiceUnavailable));
    }

    assert_eq!(service.breaker().state(), CircuitState::Open);
}
