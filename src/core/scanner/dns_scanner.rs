// src/core/scanner/dns_scanner.rs

use tracing::{debug, info, warn};

use crate::core::collaborators::DnsResolver;
use crate::core::error::DnsLookupError;
use crate::core::models::{ProbeResult, Target};

/// Resolves the target's IPv4 addresses.
///
/// A name that does not exist is reported as an empty list rather than a
/// failure; every other resolver error fails the probe.
pub async fn run_dns_scan(resolver: &dyn DnsResolver, target: &Target) -> ProbeResult<Vec<String>> {
    info!(target = %target.host, "Starting DNS scan.");
    match resolve(resolver, &target.host).await {
        Ok(addresses) => {
            info!(count = addresses.len(), "DNS scan finished.");
            ProbeResult::Found(addresses)
        }
        Err(reason) => ProbeResult::Failed(reason),
    }
}

/// Best-effort "subdomain" guesses from the A answers of the target.
///
/// This mirrors a heuristic that is known to be unreliable: A answers carry
/// addresses, not names, so the first label of each answer is normally just
/// the first octet of an IP address. It is not subdomain enumeration.
pub async fn run_subdomain_scan(resolver: &dyn DnsResolver, target: &Target) -> ProbeResult<Vec<String>> {
    info!(target = %target.host, "Starting subdomain guess.");
    match resolve(resolver, &target.host).await {
        Ok(answers) => {
            let guesses = guess_subdomains(&target.host, &answers);
            debug!(count = guesses.len(), "Subdomain guesses derived from A answers.");
            ProbeResult::Found(guesses)
        }
        Err(reason) => ProbeResult::Failed(reason),
    }
}

async fn resolve(resolver: &dyn DnsResolver, host: &str) -> Result<Vec<String>, String> {
    match resolver.lookup_a(host).await {
        Ok(addrs) => Ok(addrs.iter().map(|a| a.to_string()).collect()),
        Err(DnsLookupError::NoSuchName(name)) => {
            debug!(name = %name, "Name does not exist, reporting no addresses.");
            Ok(Vec::new())
        }
        Err(e) => {
            warn!(host, error = %e, "A lookup failed.");
            Err(e.to_string())
        }
    }
}

/// First dot-separated label of each answer, skipping labels equal to the
/// queried host.
pub fn guess_subdomains(host: &str, answers: &[String]) -> Vec<String> {
    answers
        .iter()
        .filter_map(|answer| answer.split('.').next())
        .filter(|label| !label.is_empty() && *label != host)
        .map(str::to_string)
        .collect()
}
