// src/core/scanner/mod.rs

// Public interface of the `scanner` module: one sub-module per probe plus the
// aggregator that fans them out.
pub mod dns_scanner;
pub mod fingerprint_scanner;
pub mod metadata_scanner;
pub mod ssl_scanner;
pub mod whois_scanner;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{info, warn};

use crate::config::ReconConfig;
use crate::core::collaborators::dns::HickoryDnsResolver;
use crate::core::collaborators::http::ReqwestHttpClient;
use crate::core::collaborators::tls::NativeTlsClient;
use crate::core::collaborators::whois::IanaWhoisClient;
use crate::core::collaborators::{DnsResolver, HttpClient, TlsClient, WhoisClient};
use crate::core::error::{ReconError, TransportError};
use crate::core::knowledge_base::Vocabulary;
use crate::core::models::{ProbeResult, SiteReport, Target};
use crate::core::target::normalize;

use self::dns_scanner::{run_dns_scan, run_subdomain_scan};
use self::fingerprint_scanner::run_fingerprint_scan;
use self::metadata_scanner::{run_metadata_scan, MetadataResults};
use self::ssl_scanner::run_ssl_scan;
use self::whois_scanner::run_whois_scan;

/// The external services a scan talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub http: Arc<dyn HttpClient>,
    pub dns: Arc<dyn DnsResolver>,
    pub whois: Arc<dyn WhoisClient>,
    pub tls: Arc<dyn TlsClient>,
}

impl Collaborators {
    /// The network-backed implementations.
    pub fn production(config: &ReconConfig) -> Result<Self, TransportError> {
        Ok(Self {
            http: Arc::new(ReqwestHttpClient::new(&config.user_agent, config.timeout)?),
            dns: Arc::new(HickoryDnsResolver::new(config.timeout)),
            whois: Arc::new(IanaWhoisClient::new(config.timeout)),
            tls: Arc::new(NativeTlsClient::new(config.timeout)),
        })
    }
}

/// Runs every probe against one target and merges the outcomes.
pub struct ReconScanner {
    collaborators: Collaborators,
    timeout: Duration,
    browser_user_agent: String,
    vocabulary: Vocabulary,
}

impl ReconScanner {
    pub fn new(collaborators: Collaborators, config: &ReconConfig) -> Self {
        Self {
            collaborators,
            timeout: config.timeout,
            browser_user_agent: config.browser_user_agent.clone(),
            vocabulary: config.vocabulary.clone(),
        }
    }

    /// Normalizes `raw_url` and scans it.
    ///
    /// Fails only when the URL has no host; in that case no probe runs.
    pub async fn run(&self, raw_url: &str) -> Result<SiteReport, ReconError> {
        let target = normalize(raw_url)?;
        Ok(self.run_full_scan(target).await)
    }

    /// Executes all probes concurrently and builds the report.
    ///
    /// Each probe gets the same time budget on its own; one running out only
    /// fails that probe's fields. The HTTP probes apply it per fetch, so a
    /// slow request only fails the field it feeds.
    pub async fn run_full_scan(&self, target: Target) -> SiteReport {
        info!(target = %target.host, "Starting full scan.");
        let c = &self.collaborators;
        let budget = self.timeout;

        let outer = backstop(budget);

        let (dns_addresses, subdomain_guesses, whois_creation_date, certificate, metadata, technologies) = tokio::join!(
            with_deadline("dns", budget, run_dns_scan(c.dns.as_ref(), &target)),
            with_deadline("subdomains", budget, run_subdomain_scan(c.dns.as_ref(), &target)),
            with_deadline("whois", budget, run_whois_scan(c.whois.as_ref(), &target)),
            with_deadline("certificate", budget, run_ssl_scan(c.tls.as_ref(), &target)),
            // These two bound each of their own fetches; the outer limit only
            // catches a probe that overruns anyway.
            metadata_with_deadline(
                outer,
                run_metadata_scan(c.http.as_ref(), &target, &self.browser_user_agent, budget)
            ),
            with_deadline(
                "technologies",
                outer,
                run_fingerprint_scan(c.http.as_ref(), &target, &self.vocabulary, budget)
            )
        );

        let report = SiteReport {
            target,
            title: metadata.title,
            last_modified: metadata.last_modified,
            whois_creation_date,
            dns_addresses,
            subdomain_guesses,
            firewall_names: metadata.firewall_names,
            technologies,
            certificate,
        };
        let (found, failed) = report.tally();
        info!(target = %report.target.host, found, failed, "Full scan finished.");
        report
    }
}

fn timeout_reason(budget: Duration) -> String {
    format!("timed out after {}s", budget.as_secs_f32())
}

/// Outer limit for probes that already enforce `budget` on every fetch.
fn backstop(budget: Duration) -> Duration {
    budget + budget / 4
}

async fn with_deadline<T>(
    probe: &'static str,
    budget: Duration,
    fut: impl Future<Output = ProbeResult<T>>,
) -> ProbeResult<T> {
    match timeout(budget, fut).await {
        Ok(result) => result,
        Err(_) => {
            warn!(probe, "Probe exceeded its time budget.");
            ProbeResult::Failed(timeout_reason(budget))
        }
    }
}

async fn metadata_with_deadline(budget: Duration, fut: impl Future<Output = MetadataResults>) -> MetadataResults {
    match timeout(budget, fut).await {
        Ok(results) => results,
        Err(_) => {
            warn!(probe = "metadata", "Probe exceeded its time budget.");
            MetadataResults::failed(&timeout_reason(budget))
        }
    }
}
