// src/core/collaborators/tls.rs

use async_trait::async_trait;
use chrono::DateTime;
use native_tls::TlsConnector;
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;
use tokio::task::spawn_blocking;
use tracing::{debug, error, info};
use x509_parser::objects::{oid2sn, oid_registry};
use x509_parser::prelude::*;

use super::{PeerCertificate, TlsClient};
use crate::core::error::TlsProbeError;

/// Text form of certificate dates, e.g. `Jan  1 00:00:00 2024 GMT`.
pub const CERT_DATE_FORMAT: &str = "%b %e %H:%M:%S %Y GMT";

/// `TlsClient` performing a blocking `native-tls` handshake against the
/// platform trust store.
#[derive(Debug, Clone)]
pub struct NativeTlsClient {
    timeout: Duration,
}

impl NativeTlsClient {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl TlsClient for NativeTlsClient {
    async fn peer_certificate(&self, host: &str, port: u16) -> Result<PeerCertificate, TlsProbeError> {
        let host_owned = host.to_string();
        let timeout = self.timeout;

        debug!("Spawning blocking task for TLS connection.");
        spawn_blocking(move || perform_handshake(&host_owned, port, timeout))
            .await
            .unwrap_or_else(|e| {
                error!(panic = %e, "Blocking TLS task panicked!");
                Err(TlsProbeError::Connect(format!("TLS task failed: {e}")))
            })
    }
}

fn connect(host: &str, port: u16, timeout: Duration) -> Result<TcpStream, TlsProbeError> {
    let addrs = (host, port)
        .to_socket_addrs()
        .map_err(|e| TlsProbeError::Connect(format!("cannot resolve {host}: {e}")))?;

    let mut last_error = None;
    for addr in addrs {
        debug!(%addr, "Connecting TCP stream.");
        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(stream) => {
                stream
                    .set_read_timeout(Some(timeout))
                    .and_then(|_| stream.set_write_timeout(Some(timeout)))
                    .map_err(|e| TlsProbeError::Connect(e.to_string()))?;
                return Ok(stream);
            }
            Err(e) => last_error = Some(e),
        }
    }
    Err(TlsProbeError::Connect(match last_error {
        Some(e) => e.to_string(),
        None => format!("no addresses for {host}"),
    }))
}

fn perform_handshake(host: &str, port: u16, timeout: Duration) -> Result<PeerCertificate, TlsProbeError> {
    let connector = TlsConnector::new().map_err(|e| {
        error!(error = %e, "Failed to create TlsConnector");
        TlsProbeError::Handshake(e.to_string())
    })?;

    let stream = connect(host, port, timeout)?;

    debug!(host, "Performing TLS handshake.");
    let mut stream = connector
        .connect(host, stream)
        .map_err(|e| TlsProbeError::Handshake(e.to_string()))?;

    let cert = stream
        .peer_certificate()
        .map_err(|e| TlsProbeError::Certificate(format!("could not get peer certificate: {e}")))?
        .ok_or_else(|| TlsProbeError::Certificate("server presented no certificate".to_string()))?;

    let cert_der = cert
        .to_der()
        .map_err(|e| TlsProbeError::Certificate(format!("could not convert certificate to DER: {e}")))?;

    // The session is done with once the certificate is in hand.
    let _ = stream.shutdown();

    let peer = describe_certificate(&cert_der)?;
    info!(host, issuer = ?peer.issuer, "Peer certificate retrieved.");
    Ok(peer)
}

/// Pulls the issuer and validity window out of a DER certificate.
pub fn describe_certificate(der: &[u8]) -> Result<PeerCertificate, TlsProbeError> {
    let (_, x509) = parse_x509_certificate(der)
        .map_err(|e| TlsProbeError::Certificate(format!("X.509 parse error: {e}")))?;

    let issuer = x509
        .issuer()
        .iter_attributes()
        .filter_map(|attr| {
            let value = attr.as_str().ok()?.to_string();
            let name = oid2sn(attr.attr_type(), oid_registry())
                .map(str::to_string)
                .unwrap_or_else(|_| attr.attr_type().to_id_string());
            Some((name, value))
        })
        .collect();

    let validity = x509.validity();
    Ok(PeerCertificate {
        issuer,
        not_before: format_asn1_time(&validity.not_before)?,
        not_after: format_asn1_time(&validity.not_after)?,
    })
}

fn format_asn1_time(time: &ASN1Time) -> Result<String, TlsProbeError> {
    DateTime::from_timestamp(time.timestamp(), 0)
        .map(|dt| dt.format(CERT_DATE_FORMAT).to_string())
        .ok_or_else(|| TlsProbeError::Certificate(format!("timestamp out of range: {time}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scanner::ssl_scanner::certificate_info;
    use x509_parser::pem::parse_x509_pem;

    // Self-signed P-256 certificate, valid Jan 30 2024 to Mar 1 2025 23:59:59.
    const FIXTURE_PEM: &str = "-----BEGIN CERTIFICATE-----
MIIB0jCCAXmgAwIBAgIUXA8wEZjVWjMXfH3IjCF4Go0JJhUwCgYIKoZIzj0EAwIw
PzELMAkGA1UEBhMCVVMxFjAUBgNVBAoMDUV4YW1wbGUgVHJ1c3QxGDAWBgNVBAMM
D0V4YW1wbGUgVGVzdCBDQTAeFw0yNDAxMzAwMDAwMDBaFw0yNTAzMDEyMzU5NTla
MD8xCzAJBgNVBAYTAlVTMRYwFAYDVQQKDA1FeGFtcGxlIFRydXN0MRgwFgYDVQQD
DA9FeGFtcGxlIFRlc3QgQ0EwWTATBgcqhkjOPQIBBggqhkjOPQMBBwNCAARwNdwx
Jf4jdc1pTqJttZ50YYrMYEb98AeZGPZ9aER6Iufl+4aIpWKEfblH9eOLnMFfCG9E
iUwpBQok3MvEUXgJo1MwUTAdBgNVHQ4EFgQU1NnTMqs2uGOUsxXL1DKC09t/TBEw
HwYDVR0jBBgwFoAU1NnTMqs2uGOUsxXL1DKC09t/TBEwDwYDVR0TAQH/BAUwAwEB
/zAKBggqhkjOPQQDAgNHADBEAiBFt/v/Twmi8x7hrCZO0uFltGvDkqUANJp8bt95
7gflmAIgBMdXgR6WMRHGowwBoCgqtCOd0TnNhmyTbYIa3Y9O68g=
-----END CERTIFICATE-----
";

    fn fixture_der() -> Vec<u8> {
        let (_, pem) = parse_x509_pem(FIXTURE_PEM.as_bytes()).unwrap();
        pem.contents
    }

    #[test]
    fn test_describe_certificate_names_issuer_fields() {
        let peer = describe_certificate(&fixture_der()).unwrap();
        assert_eq!(
            peer.issuer,
            vec![
                ("C".to_string(), "US".to_string()),
                ("O".to_string(), "Example Trust".to_string()),
                ("CN".to_string(), "Example Test CA".to_string()),
            ]
        );
        assert_eq!(peer.not_before, "Jan 30 00:00:00 2024 GMT");
        assert_eq!(peer.not_after, "Mar  1 23:59:59 2025 GMT");
    }

    #[test]
    fn test_described_dates_feed_certificate_info() {
        let peer = describe_certificate(&fixture_der()).unwrap();
        let info = certificate_info(&peer).unwrap();
        assert_eq!(info.issuer, "Example Test CA");
        assert_eq!(info.validity_days, 396);
    }

    #[test]
    fn test_garbage_der_is_certificate_error() {
        assert!(matches!(
            describe_certificate(b"not a certificate"),
            Err(TlsProbeError::Certificate(_))
        ));
    }
}
