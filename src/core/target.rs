// src/core/target.rs

use tracing::debug;
use url::{Host, Url};

use crate::core::error::ReconError;
use crate::core::models::Target;

/// Parses the raw command-line URL into a `Target`.
///
/// Only absolute URLs carry a host, so bare names like `example.com` are
/// rejected just like `not a url`.
pub fn normalize(raw: &str) -> Result<Target, ReconError> {
    let trimmed = raw.trim();
    let url = Url::parse(trimmed)
        .map_err(|e| ReconError::InvalidTarget(format!("'{trimmed}' is not a URL ({e})")))?;

    let host = match url.host() {
        Some(Host::Domain(domain)) if !domain.is_empty() => domain.to_lowercase(),
        Some(Host::Ipv4(ip)) => ip.to_string(),
        Some(Host::Ipv6(ip)) => ip.to_string(),
        _ => {
            return Err(ReconError::InvalidTarget(format!(
                "'{trimmed}' has no host component"
            )));
        }
    };

    debug!(scheme = url.scheme(), host = %host, "Target normalized.");
    Ok(Target {
        scheme: url.scheme().to_string(),
        host,
        url,
    })
}
