// src/core/testing.rs

// In-memory collaborators for unit tests. Every double counts its calls so
// tests can check that nothing touched the network.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::collections::{HashMap, HashSet};
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use url::Url;

use crate::core::collaborators::{
    DnsResolver, HttpClient, HttpResponse, PeerCertificate, TlsClient, WhoisClient, WhoisRecord,
};
use crate::core::error::{DnsLookupError, TlsProbeError, TransportError, WhoisLookupError};

pub fn response(status: u16, headers: &[(&str, &str)], body: &str) -> HttpResponse {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        map.append(
            HeaderName::from_bytes(name.as_bytes()).unwrap(),
            HeaderValue::from_str(value).unwrap(),
        );
    }
    HttpResponse {
        status,
        headers: map,
        body: body.as_bytes().to_vec(),
    }
}

/// Serves canned responses per URL; unknown URLs fail like a refused
/// connection.
#[derive(Default)]
pub struct FakeHttp {
    get: HashMap<String, Result<HttpResponse, TransportError>>,
    head: HashMap<String, Result<HttpResponse, TransportError>>,
    /// URLs whose GET or HEAD never completes.
    hanging_get: HashSet<String>,
    hanging_head: HashSet<String>,
    calls: AtomicUsize,
    /// Every GET as (url, extra headers) for assertions.
    pub seen_gets: Mutex<Vec<(String, Vec<(String, String)>)>>,
}

impl FakeHttp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_get(mut self, url: &str, result: Result<HttpResponse, TransportError>) -> Self {
        self.get.insert(url.to_string(), result);
        self
    }

    pub fn with_head(mut self, url: &str, result: Result<HttpResponse, TransportError>) -> Self {
        self.head.insert(url.to_string(), result);
        self
    }

    pub fn with_hanging_get(mut self, url: &str) -> Self {
        self.hanging_get.insert(url.to_string());
        self
    }

    pub fn with_hanging_head(mut self, url: &str) -> Self {
        self.hanging_head.insert(url.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn serve(
        table: &HashMap<String, Result<HttpResponse, TransportError>>,
        url: &Url,
    ) -> Result<HttpResponse, TransportError> {
        table
            .get(url.as_str())
            .cloned()
            .unwrap_or_else(|| Err(TransportError::Connect(format!("connection refused: {url}"))))
    }
}

#[async_trait]
impl HttpClient for FakeHttp {
    async fn get(&self, url: &Url, headers: &[(&str, &str)]) -> Result<HttpResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen_gets.lock().unwrap().push((
            url.to_string(),
            headers.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
        ));
        if self.hanging_get.contains(url.as_str()) {
            futures::future::pending::<()>().await;
        }
        Self::serve(&self.get, url)
    }

    async fn head(&self, url: &Url) -> Result<HttpResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.hanging_head.contains(url.as_str()) {
            futures::future::pending::<()>().await;
        }
        Self::serve(&self.head, url)
    }
}

pub struct FakeDns {
    result: Result<Vec<Ipv4Addr>, DnsLookupError>,
    calls: AtomicUsize,
}

impl FakeDns {
    pub fn answering(addrs: &[&str]) -> Self {
        Self::with_result(Ok(addrs.iter().map(|a| a.parse().unwrap()).collect()))
    }

    pub fn with_result(result: Result<Vec<Ipv4Addr>, DnsLookupError>) -> Self {
        Self {
            result,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DnsResolver for FakeDns {
    async fn lookup_a(&self, _host: &str) -> Result<Vec<Ipv4Addr>, DnsLookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}

pub struct FakeWhois {
    result: Result<WhoisRecord, WhoisLookupError>,
    calls: AtomicUsize,
    pub queried: Mutex<Vec<String>>,
}

impl FakeWhois {
    pub fn with_result(result: Result<WhoisRecord, WhoisLookupError>) -> Self {
        Self {
            result,
            calls: AtomicUsize::new(0),
            queried: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WhoisClient for FakeWhois {
    async fn lookup(&self, domain: &str) -> Result<WhoisRecord, WhoisLookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.queried.lock().unwrap().push(domain.to_string());
        self.result.clone()
    }
}

pub struct FakeTls {
    result: Result<PeerCertificate, TlsProbeError>,
    calls: AtomicUsize,
}

impl FakeTls {
    pub fn with_result(result: Result<PeerCertificate, TlsProbeError>) -> Self {
        Self {
            result,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TlsClient for FakeTls {
    async fn peer_certificate(&self, _host: &str, _port: u16) -> Result<PeerCertificate, TlsProbeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}

pub fn peer_certificate(issuer_cn: &str, not_before: &str, not_after: &str) -> PeerCertificate {
    PeerCertificate {
        issuer: vec![
            ("C".to_string(), "US".to_string()),
            ("O".to_string(), "Example Trust".to_string()),
            ("CN".to_string(), issuer_cn.to_string()),
        ],
        not_before: not_before.to_string(),
        not_after: not_after.to_string(),
    }
}

/// A DNS double that never answers, for deadline tests.
pub struct HangingDns;

#[async_trait]
impl DnsResolver for HangingDns {
    async fn lookup_a(&self, _host: &str) -> Result<Vec<Ipv4Addr>, DnsLookupError> {
        futures::future::pending().await
    }
}
