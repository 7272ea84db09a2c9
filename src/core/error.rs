// src/core/error.rs

use thiserror::Error;

/// The only failure that stops a reconnaissance run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReconError {
    #[error("invalid target: {0}")]
    InvalidTarget(String),
}

/// Transport-level failure of the HTTP collaborator. A non-2xx status is
/// not one of these.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("HTTP transport error: {0}")]
    Other(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DnsLookupError {
    #[error("no such name: {0}")]
    NoSuchName(String),
    #[error("DNS error: {0}")]
    Other(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WhoisLookupError {
    #[error("no WHOIS record: {0}")]
    NoRecord(String),
    #[error("WHOIS lookup failed: {0}")]
    Lookup(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TlsProbeError {
    #[error("TCP connection error: {0}")]
    Connect(String),
    #[error("TLS handshake error: {0}")]
    Handshake(String),
    #[error("certificate error: {0}")]
    Certificate(String),
}
