//! Shared utilities for integration testing.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use subdomain_proxy::config::{DomainConfig, ProxyConfig, SubdomainConfig};
use subdomain_proxy::{HttpServer, Shutdown};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// What a mock backend saw of an incoming request.
#[derive(Debug, Clone)]
pub struct RequestHead {
    pub request_line: String,
    pub host: Option<String>,
}

/// Start a simple mock backend that returns a fixed response.
pub async fn start_mock_backend(response: &'static str) -> SocketAddr {
    start_programmable_backend(move |_| async move { (200, response.to_string()) }).await
}

/// Start a programmable mock backend with async support.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn(RequestHead) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let f = f.clone();
            tokio::spawn(async move {
                let Some(head) = read_head(&mut socket).await else {
                    return;
                };
                let (status, body) = f(head).await;
                let status_text = match status {
                    200 => "200 OK",
                    404 => "404 Not Found",
                    500 => "500 Internal Server Error",
                    503 => "503 Service Unavailable",
                    _ => "200 OK",
                };

                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
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

async fn read_head(socket: &mut TcpStream) -> Option<RequestHead> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 || buf.len() > 64 * 1024 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let text = String::from_utf8_lossy(&buf);
    let mut lines = text.split("\r\n");
    let request_line = lines.next()?.to_string();
    let host = lines
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.eq_ignore_ascii_case("host"))
        .map(|(_, value)| value.trim().to_string());

    Some(RequestHead { request_line, host })
}

/// A proxy running on an ephemeral port.
pub struct RunningProxy {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub config_updates: mpsc::UnboundedSender<ProxyConfig>,
    pub handle: JoinHandle<Result<(), std::io::Error>>,
}

pub async fn start_proxy(config: ProxyConfig) -> RunningProxy {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let (config_updates, updates_rx) = mpsc::unbounded_channel();
    let server = HttpServer::new(config);
    let server_shutdown = shutdown.subscribe();
    let handle = tokio::spawn(async move { server.run(listener, updates_rx, server_shutdown).await });

    RunningProxy {
        addr,
        shutdown,
        config_updates,
        handle,
    }
}

/// Client that resolves every name in `hosts` to the proxy.
pub fn client_for(proxy: SocketAddr, hosts: &[&str]) -> reqwest::Client {
    hosts
        .iter()
        .fold(reqwest::Client::builder(), |builder, host| builder.resolve(host, proxy))
        .no_proxy()
        .pool_max_idle_per_host(0)
        .build()
        .unwrap()
}

/// URL for `host` on the proxy's port.
pub fn url(proxy: SocketAddr, host: &str, path: &str) -> String {
    format!("http://{}:{}{}", host, proxy.port(), path)
}

/// Add `servers` under `subdomain` of `domain`.
pub fn add_route(config: &mut ProxyConfig, domain: &str, subdomain: &str, servers: Vec<String>) {
    config
        .domains
        .entry(domain.to_string())
        .or_insert_with(DomainConfig::default)
        .subdomains
        .insert(subdomain.to_string(), SubdomainConfig { servers });
}
