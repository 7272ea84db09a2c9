// src/core/collaborators/mod.rs

// The external services the probes talk to. Each one is a trait so the
// aggregator can be driven by in-memory doubles in tests; the production
// implementations live in the sibling modules.

pub mod dns;
pub mod html;
pub mod http;
pub mod tls;
pub mod whois;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use std::net::Ipv4Addr;
use url::Url;

use crate::core::error::{DnsLookupError, TlsProbeError, TransportError, WhoisLookupError};

/// A completed HTTP exchange. Any status code counts as a response.
#[derive(Debug, Clone, Default)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Header value as text; `None` when missing or not valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn get(&self, url: &Url, headers: &[(&str, &str)]) -> Result<HttpResponse, TransportError>;
    async fn head(&self, url: &Url) -> Result<HttpResponse, TransportError>;
}

#[async_trait]
pub trait DnsResolver: Send + Sync {
    /// A-record lookup, in resolver answer order.
    async fn lookup_a(&self, host: &str) -> Result<Vec<Ipv4Addr>, DnsLookupError>;
}

/// The parts of a WHOIS response the probes care about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WhoisRecord {
    /// Creation dates in the order the registry listed them.
    pub creation_dates: Vec<chrono::DateTime<chrono::Utc>>,
    pub registrar: Option<String>,
}

#[async_trait]
pub trait WhoisClient: Send + Sync {
    async fn lookup(&self, domain: &str) -> Result<WhoisRecord, WhoisLookupError>;
}

/// Peer certificate fields as exposed by the TLS layer. Dates use the fixed
/// `Mon DD HH:MM:SS YYYY GMT` text form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerCertificate {
    /// Issuer distinguished name as ordered (attribute, value) pairs.
    pub issuer: Vec<(String, String)>,
    pub not_before: String,
    pub not_after: String,
}

#[async_trait]
pub trait TlsClient: Send + Sync {
    async fn peer_certificate(&self, host: &str, port: u16) -> Result<PeerCertificate, TlsProbeError>;
}
