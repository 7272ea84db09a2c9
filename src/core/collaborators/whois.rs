// src/core/collaborators/whois.rs

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use std::time::Duration;
use tokio::task::spawn_blocking;
use tracing::{debug, error, info};
use whois_rust::{WhoIs, WhoIsLookupOptions};

use super::{WhoisClient, WhoisRecord};
use crate::core::error::WhoisLookupError;

/// Root server that knows which registry serves each TLD.
const IANA_WHOIS_HOST: &str = "whois.iana.org";

static RE_REFERRAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?im)^\s*(?:refer|whois):\s*(\S+)\s*$").unwrap());
static RE_CREATION_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?im)^\s*(?:creation date|created(?: on| date)?|registered(?: on)?|registration (?:time|date)|domain registration date|domain record activated|registered date)\s*[:.]+\s*(.+?)\s*$",
    )
    .unwrap()
});
static RE_REGISTRAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?im)^\s*registrar(?: name)?:\s*(.+?)\s*$").unwrap());

/// Registry phrases for "this domain is not registered".
const NO_MATCH_MARKERS: &[&str] = &[
    "no match for",
    "no entries found",
    "no data found",
    "no object found",
    "domain not found",
    "status: free",
];

/// Date layouts seen across registries, tried in order.
const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%z",
    "%Y-%m-%dT%H:%M:%S%.fZ",
    "%Y-%m-%dT%H:%M:%SZ",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y.%m.%d %H:%M:%S",
    "%d.%m.%Y %H:%M:%S",
];
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d-%b-%Y", "%d.%m.%Y", "%Y.%m.%d", "%Y/%m/%d", "%d/%m/%Y", "%Y%m%d"];

/// `WhoisClient` that asks IANA for the registry's server, then queries it.
#[derive(Debug, Clone)]
pub struct IanaWhoisClient {
    timeout: Duration,
}

impl IanaWhoisClient {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl WhoisClient for IanaWhoisClient {
    async fn lookup(&self, domain: &str) -> Result<WhoisRecord, WhoisLookupError> {
        let domain_owned = domain.to_string();
        let timeout = self.timeout;

        spawn_blocking(move || lookup_blocking(&domain_owned, timeout))
            .await
            .unwrap_or_else(|e| {
                error!(panic = %e, "Blocking WHOIS task panicked!");
                Err(WhoisLookupError::Lookup(format!("WHOIS task failed: {e}")))
            })
    }
}

fn query(host: &str, domain: &str, follow: u16, timeout: Duration) -> Result<String, WhoisLookupError> {
    let client = WhoIs::from_host(host).map_err(|e| WhoisLookupError::Lookup(e.to_string()))?;
    let mut options =
        WhoIsLookupOptions::from_string(domain).map_err(|e| WhoisLookupError::Lookup(e.to_string()))?;
    options.follow = follow;
    options.timeout = Some(timeout);

    debug!(server = host, domain, "Querying WHOIS server.");
    client
        .lookup(options)
        .map_err(|e| WhoisLookupError::Lookup(format!("{host}: {e}")))
}

fn lookup_blocking(domain: &str, timeout: Duration) -> Result<WhoisRecord, WhoisLookupError> {
    let iana_response = query(IANA_WHOIS_HOST, domain, 0, timeout)?;
    let server = referral_server(&iana_response)
        .ok_or_else(|| WhoisLookupError::NoRecord(format!("no WHOIS server known for {domain}")))?;

    let raw = query(&server, domain, 1, timeout)?;
    let record = parse_record(&raw);
    if record.creation_dates.is_empty() && signals_no_match(&raw) {
        return Err(WhoisLookupError::NoRecord(format!("{server} has no record for {domain}")));
    }

    info!(domain, server = %server, dates = record.creation_dates.len(), "WHOIS record retrieved.");
    Ok(record)
}

/// The registry server IANA points at, from its `refer:` or `whois:` line.
pub fn referral_server(raw: &str) -> Option<String> {
    RE_REFERRAL
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim_start_matches("whois://").to_lowercase())
        .filter(|s| !s.is_empty())
}

pub fn signals_no_match(raw: &str) -> bool {
    let lower = raw.to_lowercase();
    NO_MATCH_MARKERS.iter().any(|marker| lower.contains(marker))
}

/// Extracts creation dates and registrar from a raw WHOIS response.
pub fn parse_record(raw: &str) -> WhoisRecord {
    let mut creation_dates = Vec::new();
    for caps in RE_CREATION_DATE.captures_iter(raw) {
        let Some(value) = caps.get(1) else { continue };
        match parse_whois_date(value.as_str()) {
            Some(date) if !creation_dates.contains(&date) => creation_dates.push(date),
            Some(_) => {}
            None => debug!(value = value.as_str(), "Unrecognized WHOIS date format."),
        }
    }

    let registrar = RE_REGISTRAR
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .filter(|s| !s.is_empty());

    WhoisRecord {
        creation_dates,
        registrar,
    }
}

/// Parses one registry date, ignoring trailing zone names like `UTC`.
pub fn parse_whois_date(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    let candidates = [
        Some(value),
        value.rsplit_once(' ').map(|(head, _)| head),
        value.split_whitespace().next(),
    ];
    for candidate in candidates.into_iter().flatten() {
        for format in DATE_TIME_FORMATS {
            if let Ok(dt) = DateTime::parse_from_str(candidate, format) {
                return Some(dt.with_timezone(&Utc));
            }
            if let Ok(naive) = NaiveDateTime::parse_from_str(candidate, format) {
                return Some(naive.and_utc());
            }
        }
        for format in DATE_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(candidate, format) {
                return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
            }
        }
    }
    None
}
