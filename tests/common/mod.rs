//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use url::Url;

use auth_service::auth::{CredentialSet, LoginService};
use auth_service::config::{JwtConfig, ServiceConfig, TimeoutConfig};
use auth_service::resilience::{BreakerSettings, CircuitBreaker};
use auth_service::users_api::{ProfileFetcher, TokenMinter};

pub const SECRET: &str = "myfancysecret";

pub const ADMIN_PROFILE: &str =
    r#"{"username":"admin","firstname":"Admin","lastname":"User","role":"admin"}"#;

pub const ALLOWED: [&str; 3] = ["admin_admin", "johnd_foo", "janed_ddd"];

/// Request line and headers as received by the mock users API.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub head: String,
}

impl RecordedRequest {
    pub fn path(&self) -> &str {
        self.head
            .lines()
            .next()
            .and_then(|line| line.split_whitespace().nth(1))
            .unwrap_or("")
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.head.lines().skip(1).find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.trim().eq_ignore_ascii_case(name).then(|| value.trim())
        })
    }
}

/// Start a programmable mock users API on an ephemeral port.
pub async fn start_users_api<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(RecordedRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let Some(head) = read_head(&mut socket).await else {
                            return;
                        };
                        let (status, body) = f(RecordedRequest { head }).await;
                        let response_str = format!(
                            "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status,
                            reason(status),
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Mock users API that always answers with the same response.
pub async fn start_fixed_users_api(status: u16, body: &'static str) -> SocketAddr {
    start_users_api(move |_| async move { (status, body.to_string()) }).await
}

async fn read_head(socket: &mut TcpStream) -> Option<String> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if buf.windows(4).any(|w| w == b"\r\n\r\n") {
            return Some(String::from_utf8_lossy(&buf).into_owned());
        }
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        401 => "Unauthorized",
        404 => "Not Found",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

/// Breaker tuned like production but with a short cool-down.
pub fn fast_breaker() -> BreakerSettings {
    BreakerSettings {
        name: "users-api-test".to_string(),
        max_half_open_requests: 3,
        interval: Duration::from_secs(60),
        open_timeout: Duration::from_millis(300),
        min_requests: 5,
        failure_ratio: 0.5,
    }
}

pub fn minter() -> TokenMinter {
    TokenMinter::from_config(&JwtConfig::default())
}

/// Login service talking to the mock at `addr`.
pub fn login_service(addr: SocketAddr, settings: BreakerSettings) -> LoginService {
    login_service_with_minter(addr, settings, minter())
}

pub fn login_service_with_minter(
    addr: SocketAddr,
    settings: BreakerSettings,
    minter: TokenMinter,
) -> LoginService {
    let base_url = Url::parse(&format!("http://{}", addr)).unwrap();
    let fetcher = ProfileFetcher::new(base_url, minter, &TimeoutConfig::default()).unwrap();
    LoginService::new(
        fetcher,
        CircuitBreaker::new(settings),
        CredentialSet::new(ALLOWED),
    )
}

/// Service configuration pointing at the mock at `addr`.
pub fn service_config(users_api: SocketAddr) -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.users_api.base_url = format!("http://{}", users_api);
    config.credentials.allowed = ALLOWED.iter().map(|s| s.to_string()).collect();
    config
}
