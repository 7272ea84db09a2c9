// src/core/scanner/whois_scanner.rs

use chrono::{DateTime, Utc};
use std::net::IpAddr;
use tracing::{info, warn};

use crate::core::collaborators::WhoisClient;
use crate::core::models::{ProbeResult, Target};

/// Second-level labels that sit under a ccTLD as part of the public suffix,
/// as in `example.co.uk`.
const SECOND_LEVEL_SUFFIXES: &[&str] = &["co", "com", "net", "org", "ac", "gov", "edu"];

/// Looks up the registration creation date of the target's domain.
///
/// When the registry lists several creation dates the first one wins.
pub async fn run_whois_scan(client: &dyn WhoisClient, target: &Target) -> ProbeResult<DateTime<Utc>> {
    let domain = registrable_domain(&target.host);
    info!(domain = %domain, "Starting WHOIS scan.");

    match client.lookup(&domain).await {
        Ok(record) => {
            info!(dates = record.creation_dates.len(), registrar = ?record.registrar, "WHOIS scan finished.");
            ProbeResult::from_option(record.creation_dates.first().copied())
        }
        Err(e) => {
            warn!(domain = %domain, error = %e, "WHOIS lookup failed.");
            ProbeResult::Failed(e.to_string())
        }
    }
}

/// The part of `host` a registry knows about: the last two labels, or three
/// under suffixes like `co.uk`. IP literals pass through unchanged.
pub fn registrable_domain(host: &str) -> String {
    let host = host.trim_end_matches('.');
    if host.parse::<IpAddr>().is_ok() {
        return host.to_string();
    }

    let labels: Vec<&str> = host.split('.').collect();
    let keep = match labels.as_slice() {
        [.., second, tld] if tld.len() == 2 && SECOND_LEVEL_SUFFIXES.contains(second) => 3,
        _ => 2,
    };
    labels[labels.len().saturating_sub(keep)..].join(".")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::collaborators::WhoisRecord;
    use crate::core::error::WhoisLookupError;
    use crate::core::target::normalize;
    use crate::core::testing::FakeWhois;
    use chrono::TimeZone;

    #[test]
    fn test_registrable_domain() {
        assert_eq!(registrable_domain("www.example.com"), "example.com");
        assert_eq!(registrable_domain("example.com"), "example.com");
        assert_eq!(registrable_domain("shop.example.co.uk"), "example.co.uk");
        assert_eq!(registrable_domain("localhost"), "localhost");
        assert_eq!(registrable_domain("93.184.216.34"), "93.184.216.34");
    }

    #[tokio::test]
    async fn test_first_creation_date_wins() {
        let first = Utc.with_ymd_and_hms(1995, 8, 14, 4, 0, 0).unwrap();
        let second = Utc.with_ymd_and_hms(2001, 1, 1, 0, 0, 0).unwrap();
        let whois = FakeWhois::with_result(Ok(WhoisRecord {
            creation_dates: vec![first, second],
            registrar: None,
        }));
        let target = normalize("https://www.example.com/").unwrap();

        assert_eq!(run_whois_scan(&whois, &target).await, ProbeResult::Found(first));
        assert_eq!(whois.queried.lock().unwrap().as_slice(), ["example.com"]);
    }

    #[tokio::test]
    async fn test_no_creation_date_is_absent() {
        let whois = FakeWhois::with_result(Ok(WhoisRecord::default()));
        let target = normalize("https://example.org").unwrap();
        assert_eq!(run_whois_scan(&whois, &target).await, ProbeResult::Absent);
    }

    #[tokio::test]
    async fn test_lookup_error_is_failed() {
        let whois = FakeWhois::with_result(Err(WhoisLookupError::NoRecord("no WHOIS server known for example.zz".into())));
        let target = normalize("https://example.zz").unwrap();
        assert!(matches!(
            run_whois_scan(&whois, &target).await,
            ProbeResult::Failed(reason) if reason.contains("no WHOIS server")
        ));
    }
}
