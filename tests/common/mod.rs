//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::future::Future;
use std::io::Write;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use authgate::auth::{format_entry, PasswordHash};
use authgate::backend::{BackendServer, ServiceIdentity};
use authgate::config::{BackendServiceConfig, IdentityConfig, ProxyConfig};
use authgate::{CredentialStore, HttpServer, Shutdown};
use tempfile::NamedTempFile;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

pub const USER: &str = "admin";
pub const SECRET: &str = "password123";
pub const HOSTNAME: &str = "test-host";

/// A running edge proxy and the handles that keep it alive.
pub struct ProxyHandle {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    _credentials: NamedTempFile,
}

impl ProxyHandle {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for ProxyHandle {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// Write a credential file holding the default test user.
pub fn credentials_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    let line = format_entry(USER, &PasswordHash::generate(SECRET)).unwrap();
    writeln!(file, "# test users\n{line}").unwrap();
    file
}

/// Start the real backend service on an ephemeral port.
pub async fn start_backend() -> (SocketAddr, Shutdown) {
    let config = BackendServiceConfig::default();
    let mut identity_config = IdentityConfig::default();
    identity_config.environment = "testing".to_string();
    let identity = ServiceIdentity::new(&identity_config, HOSTNAME.to_string());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server = BackendServer::new(&config, identity);
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    (addr, shutdown)
}

/// Start the edge proxy in front of `upstream`.
pub async fn start_proxy(upstream: SocketAddr, response_timeout_ms: u64) -> ProxyHandle {
    let credentials = credentials_file();

    let mut config = ProxyConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.upstream.address = upstream.to_string();
    config.upstream.connect_timeout_ms = 500;
    config.upstream.response_timeout_ms = response_timeout_ms;
    config.auth.credentials_file = Some(credentials.path().display().to_string());

    let store = Arc::new(CredentialStore::load(credentials.path()).unwrap());
    let server = HttpServer::new(config, store).unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    ProxyHandle {
        addr,
        shutdown,
        _credentials: credentials,
    }
}

/// Start a raw TCP backend whose reply is computed from the request head.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let f = f.clone();
            tokio::spawn(async move {
                let mut buf = vec![0u8; 8192];
                let n = socket.read(&mut buf).await.unwrap_or(0);
                let head = String::from_utf8_lossy(&buf[..n]).to_string();

                let (status, body) = f(head).await;
                let status_text = match status {
                    200 => "200 OK",
                    404 => "404 Not Found",
                    500 => "500 Internal Server Error",
                    _ => "200 OK",
                };
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Type: text/plain\r\nX-Backend: raw\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status_text,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}

/// Start a raw TCP backend that writes `prefix` and then goes silent for `stall`.
pub async fn start_stalling_backend(prefix: &'static str, stall: Duration) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut buf = vec![0u8; 8192];
                let _ = socket.read(&mut buf).await;
                let _ = socket.write_all(prefix.as_bytes()).await;
                tokio::time::sleep(stall).await;
            });
        }
    });

    addr
}
