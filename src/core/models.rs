// src/core/models.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use url::Url;

use crate::core::knowledge_base::TechCategory;

// --- Reusable Result Types ---

/// Outcome of a single probe.
///
/// A probe never returns an error to the aggregator: the source either gave us
/// a value, was reachable but had nothing to say, or could not be queried.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum ProbeResult<T> {
    Found(T),
    Absent,
    Failed(String),
}

impl<T> ProbeResult<T> {
    /// `Found` when the option holds a value, `Absent` otherwise.
    pub fn from_option(value: Option<T>) -> Self {
        match value {
            Some(v) => ProbeResult::Found(v),
            None => ProbeResult::Absent,
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        ProbeResult::Failed(reason.into())
    }

    pub fn found(&self) -> Option<&T> {
        match self {
            ProbeResult::Found(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, ProbeResult::Found(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ProbeResult::Failed(_))
    }

    /// The failure reason, if the probe failed.
    pub fn failure(&self) -> Option<&str> {
        match self {
            ProbeResult::Failed(reason) => Some(reason),
            _ => None,
        }
    }
}

// --- Target ---

/// The site under reconnaissance, derived once from the user's URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub scheme: String,
    pub host: String,
    /// The page as given on the command line. HTTP probes fetch this.
    pub url: Url,
}

// --- Certificate Models ---

/// Data extracted from the peer certificate presented on port 443.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateInfo {
    pub issuer: String,
    pub not_before: DateTime<Utc>,
    pub not_after: DateTime<Utc>,
    pub validity_days: i64,
}

// --- Main Report ---

/// Everything learned about one target in one run.
///
/// Each field is filled by its own probe; a failure in one never blanks
/// another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteReport {
    pub target: Target,
    pub title: ProbeResult<String>,
    pub last_modified: ProbeResult<String>,
    pub whois_creation_date: ProbeResult<DateTime<Utc>>,
    pub dns_addresses: ProbeResult<Vec<String>>,
    pub subdomain_guesses: ProbeResult<Vec<String>>,
    pub firewall_names: ProbeResult<Vec<String>>,
    /// Detected keywords with their vocabulary category.
    pub technologies: ProbeResult<BTreeMap<String, TechCategory>>,
    pub certificate: ProbeResult<CertificateInfo>,
}

impl SiteReport {
    /// How many fields were found and how many failed.
    pub fn tally(&self) -> (usize, usize) {
        let outcomes = [
            (self.title.is_found(), self.title.is_failed()),
            (self.last_modified.is_found(), self.last_modified.is_failed()),
            (self.whois_creation_date.is_found(), self.whois_creation_date.is_failed()),
            (self.dns_addresses.is_found(), self.dns_addresses.is_failed()),
            (self.subdomain_guesses.is_found(), self.subdomain_guesses.is_failed()),
            (self.firewall_names.is_found(), self.firewall_names.is_failed()),
            (self.technologies.is_found(), self.technologies.is_failed()),
            (self.certificate.is_found(), self.certificate.is_failed()),
        ];
        outcomes
            .iter()
            .fold((0, 0), |(found, failed), (f, x)| (found + usize::from(*f), failed + usize::from(*x)))
    }
}
