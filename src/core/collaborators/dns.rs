// src/core/collaborators/dns.rs

use async_trait::async_trait;
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::error::ResolveErrorKind;
use hickory_resolver::proto::op::ResponseCode;
use hickory_resolver::TokioAsyncResolver;
use std::net::Ipv4Addr;
use std::time::Duration;
use tracing::debug;

use super::DnsResolver;
use crate::core::error::DnsLookupError;

/// `DnsResolver` over hickory's Tokio resolver with the default upstreams.
pub struct HickoryDnsResolver {
    resolver: TokioAsyncResolver,
}

impl HickoryDnsResolver {
    pub fn new(timeout: Duration) -> Self {
        let mut opts = ResolverOpts::default();
        opts.timeout = timeout;
        opts.attempts = 1;
        Self {
            resolver: TokioAsyncResolver::tokio(ResolverConfig::default(), opts),
        }
    }
}

#[async_trait]
impl DnsResolver for HickoryDnsResolver {
    async fn lookup_a(&self, host: &str) -> Result<Vec<Ipv4Addr>, DnsLookupError> {
        debug!(host, "Looking up A records.");
        match self.resolver.ipv4_lookup(host).await {
            Ok(lookup) => Ok(lookup.iter().map(|a| a.0).collect()),
            Err(e) => match e.kind() {
                ResolveErrorKind::NoRecordsFound { response_code, .. }
                    if *response_code == ResponseCode::NXDomain =>
                {
                    Err(DnsLookupError::NoSuchName(host.to_string()))
                }
                // The name exists but carries no A record.
                ResolveErrorKind::NoRecordsFound { .. } => Ok(Vec::new()),
                _ => Err(DnsLookupError::Other(e.to_string())),
            },
        }
    }
}
