// src/core/scanner/ssl_scanner.rs

use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::{debug, info, warn};

use crate::core::collaborators::{PeerCertificate, TlsClient};
use crate::core::models::{CertificateInfo, ProbeResult, Target};

pub const TLS_PORT: u16 = 443;

/// Date layout of certificate timestamps once the zone token is split off.
const CERT_DATE_LAYOUT: &str = "%b %e %H:%M:%S %Y";

/// Handshakes with the target on port 443 and summarizes its certificate.
///
/// Connection, handshake and certificate problems all end up as `Failed`.
pub async fn run_ssl_scan(client: &dyn TlsClient, target: &Target) -> ProbeResult<CertificateInfo> {
    info!(target = %target.host, "Starting SSL/TLS scan.");

    let peer = match client.peer_certificate(&target.host, TLS_PORT).await {
        Ok(peer) => peer,
        Err(e) => {
            warn!(target = %target.host, error = %e, "TLS probe failed.");
            return ProbeResult::Failed(e.to_string());
        }
    };

    match certificate_info(&peer) {
        Ok(info) => {
            info!(issuer = %info.issuer, validity_days = info.validity_days, "SSL/TLS scan finished.");
            ProbeResult::Found(info)
        }
        Err(reason) => {
            warn!(reason = %reason, "Certificate fields are malformed.");
            ProbeResult::Failed(reason)
        }
    }
}

/// Issuer, validity window and whole-day validity length of a certificate.
pub fn certificate_info(peer: &PeerCertificate) -> Result<CertificateInfo, String> {
    let issuer = issuer_name(peer).ok_or_else(|| "certificate has no issuer".to_string())?;
    let not_before = parse_cert_date(&peer.not_before)?;
    let not_after = parse_cert_date(&peer.not_after)?;

    let validity_days = not_after.signed_duration_since(not_before).num_days();
    if validity_days < 0 {
        return Err(format!(
            "certificate expires ({not_after}) before it becomes valid ({not_before})"
        ));
    }

    Ok(CertificateInfo {
        issuer,
        not_before,
        not_after,
        validity_days,
    })
}

/// The issuer's common name, or the first issuer field when there is none.
fn issuer_name(peer: &PeerCertificate) -> Option<String> {
    peer.issuer
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case("CN") || name.eq_ignore_ascii_case("commonName"))
        .or_else(|| peer.issuer.first())
        .map(|(_, value)| value.clone())
        .filter(|value| !value.is_empty())
}

/// Parses `Mon DD HH:MM:SS YYYY TZ`; only UTC zones are accepted.
pub fn parse_cert_date(text: &str) -> Result<DateTime<Utc>, String> {
    let text = text.trim();
    let (stamp, zone) = text
        .rsplit_once(char::is_whitespace)
        .ok_or_else(|| format!("malformed certificate date '{text}'"))?;
    if !matches!(zone, "GMT" | "UTC" | "Z") {
        return Err(format!("unexpected time zone '{zone}' in certificate date"));
    }

    debug!(stamp, "Parsing certificate date.");
    NaiveDateTime::parse_from_str(stamp.trim(), CERT_DATE_LAYOUT)
        .map(|naive| naive.and_utc())
        .map_err(|e| format!("malformed certificate date '{text}': {e}"))
}
