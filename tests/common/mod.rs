//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use user_gateway::config::{ErrorMapping, GatewayConfig};
use user_gateway::{HttpServer, Shutdown};

/// What the mock upstream saw for one request.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// How the mock upstream answers.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Status line and full body.
    Full(u16, String),
    /// Announce `declared` body bytes, send `body`, then hang up.
    Truncated { declared: usize, body: String },
    /// Never answer.
    Silent,
}

pub struct MockUpstream {
    pub addr: SocketAddr,
    pub requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockUpstream {
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn recorded(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

/// Start a programmable mock upstream on an ephemeral port.
pub async fn start_mock_upstream<F>(f: F) -> MockUpstream
where
    F: Fn(&str) -> Reply + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let f = Arc::new(f);

    let recorded = requests.clone();
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => {
                    let f = f.clone();
                    let recorded = recorded.clone();
                    tokio::spawn(async move {
                        serve_one(socket, f.as_ref(), recorded).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    MockUpstream { addr, requests }
}

async fn serve_one<F>(mut socket: TcpStream, f: &F, recorded: Arc<Mutex<Vec<RecordedRequest>>>)
where
    F: Fn(&str) -> Reply,
{
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }

    let head = String::from_utf8_lossy(&buf).to_string();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next().unwrap_or_default().split(' ');
    let method = request_line.next().unwrap_or_default().to_string();
    let path = request_line.next().unwrap_or_default().to_string();
    let headers = lines
        .take_while(|l| !l.is_empty())
        .filter_map(|l| l.split_once(':'))
        .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_string()))
        .collect();

    let reply = f(&path);
    recorded.lock().unwrap().push(RecordedRequest { method, path, headers });

    let response = match reply {
        Reply::Full(status, body) => format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status_text(status),
            body.len(),
            body
        ),
        Reply::Truncated { declared, body } => format!(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            declared, body
        ),
        Reply::Silent => {
            tokio::time::sleep(Duration::from_secs(30)).await;
            return;
        }
    };

    let _ = socket.write_all(response.as_bytes()).await;
    let _ = socket.shutdown().await;
}

fn status_text(status: u16) -> &'static str {
    match status {
        200 => "200 OK",
        404 => "404 Not Found",
        500 => "500 Internal Server Error",
        503 => "503 Service Unavailable",
        _ => "200 OK",
    }
}

/// An address nothing listens on.
pub async fn dead_address() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

pub fn gateway_config(upstream_base_url: &str, mapping: ErrorMapping) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.upstream.base_url = upstream_base_url.to_string();
    config.upstream.system_proxy = false;
    config.upstream.connect_timeout_secs = 1;
    config.errors.mapping = mapping;
    config
}

pub struct RunningGateway {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub handle: tokio::task::JoinHandle<Result<(), std::io::Error>>,
}

impl RunningGateway {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Start the gateway on an ephemeral port.
pub async fn start_gateway(config: GatewayConfig) -> RunningGateway {
    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let server = HttpServer::new(config).unwrap();
    let handle = tokio::spawn(async move { server.run(listener, server_shutdown).await });

    RunningGateway { addr, shutdown, handle }
}

pub fn test_client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
