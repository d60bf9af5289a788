//! Shared utilities for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use endpoint_failover::candidates::{DiscoveryDocument, DiscoveryError, DiscoveryFetcher};
use endpoint_failover::engine::rewrite::targets_base;
use endpoint_failover::transport::{
    ErrorCode, HttpResponse, RequestDescriptor, Transport, TransportError, ATTEMPT_ID_HEADER,
};

/// Start a mock backend on an ephemeral port that answers every request with `body`.
pub async fn start_mock_backend(body: &'static str) -> SocketAddr {
    start_programmable_backend(move |_| (200, body.to_string())).await
}

/// Start a mock backend that answers with the request's attempt id header, empty if absent.
pub async fn start_attempt_echo_backend() -> SocketAddr {
    start_programmable_backend(|request| (200, header_value(request, ATTEMPT_ID_HEADER).unwrap_or_default()))
        .await
}

/// Start a mock backend whose status and body are computed from the raw request.
pub async fn start_programmable_backend<F>(f: F) -> SocketAddr
where
    F: Fn(&str) -> (u16, String) + Send + Sync + 'static,
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
                        let mut buf = [0u8; 4096];
                        let n = socket.read(&mut buf).await.unwrap_or(0);
                        let request = String::from_utf8_lossy(&buf[..n]).into_owned();

                        let (status, body) = f(&request);
                        let status_text = match status {
                            200 => "200 OK",
                            400 => "400 Bad Request",
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
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

fn header_value(request: &str, name: &str) -> Option<String> {
    request.lines().find_map(|line| {
        let (key, value) = line.split_once(':')?;
        key.trim()
            .eq_ignore_ascii_case(name)
            .then(|| value.trim().to_string())
    })
}

/// A local port with nothing listening on it.
pub async fn unused_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

/// Scripted outcome for requests to one base URL.
#[derive(Debug, Clone)]
pub enum Outcome {
    Respond(u16, &'static str),
    Fail(ErrorCode),
}

/// In-process transport answering by base URL.
///
/// Bases without a script answer `200 ok`. Every request is recorded.
#[derive(Default)]
pub struct MockTransport {
    scripts: Mutex<HashMap<String, Outcome>>,
    sent: Mutex<Vec<RequestDescriptor>>,
    delay: Mutex<Option<Duration>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn script(&self, base_url: &str, outcome: Outcome) {
        self.scripts.lock().unwrap().insert(base_url.to_string(), outcome);
    }

    pub fn fail(&self, base_url: &str, code: ErrorCode) {
        self.script(base_url, Outcome::Fail(code));
    }

    pub fn recover(&self, base_url: &str) {
        self.scripts.lock().unwrap().remove(base_url);
    }

    /// Hold every response back for `delay`.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn sent(&self) -> Vec<RequestDescriptor> {
        self.sent.lock().unwrap().clone()
    }

    /// Requests that carried an attempt id.
    pub fn replays(&self) -> Vec<RequestDescriptor> {
        self.sent().into_iter().filter(|r| r.attempt_id.is_some()).collect()
    }

    fn outcome_for(&self, url: &str) -> Option<Outcome> {
        self.scripts
            .lock()
            .unwrap()
            .iter()
            .find(|(base, _)| targets_base(url, base))
            .map(|(_, outcome)| outcome.clone())
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: RequestDescriptor) -> Result<HttpResponse, TransportError> {
        self.sent.lock().unwrap().push(request.clone());

        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        match self.outcome_for(&request.url) {
            Some(Outcome::Fail(code)) => Err(TransportError::new(code, format!("{} failed", request.url))),
            Some(Outcome::Respond(status, body)) => Ok(response(&request.url, status, body)),
            None => Ok(response(&request.url, 200, "ok")),
        }
    }
}

fn response(url: &str, status: u16, body: &str) -> HttpResponse {
    HttpResponse {
        status,
        url: url.to_string(),
        headers: Default::default(),
        body: body.as_bytes().to_vec(),
    }
}

/// Discovery fetcher returning a fixed domain list and counting fetches.
pub struct CountingFetcher {
    domains: Vec<String>,
    calls: AtomicUsize,
    failing: bool,
}

impl CountingFetcher {
    pub fn with_domains(domains: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            domains: domains.iter().map(|d| d.to_string()).collect(),
            calls: AtomicUsize::new(0),
            failing: false,
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            domains: Vec::new(),
            calls: AtomicUsize::new(0),
            failing: true,
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DiscoveryFetcher for CountingFetcher {
    async fn fetch(&self) -> Result<DiscoveryDocument, DiscoveryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing {
            return Err(DiscoveryError::Unavailable("bucket unreachable".into()));
        }
        Ok(DiscoveryDocument {
            domains: self.domains.clone(),
            ..Default::default()
        })
    }
}
