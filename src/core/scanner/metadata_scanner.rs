// src/core/scanner/metadata_scanner.rs

use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::core::collaborators::html::HtmlPage;
use crate::core::collaborators::HttpClient;
use crate::core::models::{ProbeResult, Target};

use super::timeout_reason;

/// Custom header some filtering proxies use to announce themselves.
pub const FIREWALL_HEADER: &str = "x-firewall";

/// The three independent page-metadata lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataResults {
    pub title: ProbeResult<String>,
    pub last_modified: ProbeResult<String>,
    pub firewall_names: ProbeResult<Vec<String>>,
}

impl MetadataResults {
    /// All three lookups failed for the same reason.
    pub fn failed(reason: &str) -> Self {
        Self {
            title: ProbeResult::failed(reason),
            last_modified: ProbeResult::failed(reason),
            firewall_names: ProbeResult::failed(reason),
        }
    }
}

/// Fetches title, `Last-Modified` and firewall names concurrently.
///
/// Each fetch runs under its own `budget`, so one slow or failing request
/// never discards what the others found.
pub async fn run_metadata_scan(
    http: &dyn HttpClient,
    target: &Target,
    browser_user_agent: &str,
    budget: Duration,
) -> MetadataResults {
    info!(url = %target.url, "Starting HTTP metadata scan.");
    let (title, last_modified, firewall_names) = tokio::join!(
        bounded("title", budget, fetch_title(http, target)),
        bounded("last_modified", budget, fetch_last_modified(http, target)),
        bounded("firewall", budget, fetch_firewall_names(http, target, browser_user_agent))
    );
    info!("HTTP metadata scan finished.");
    MetadataResults {
        title,
        last_modified,
        firewall_names,
    }
}

async fn bounded<T>(
    fetch: &'static str,
    budget: Duration,
    fut: impl Future<Output = ProbeResult<T>>,
) -> ProbeResult<T> {
    timeout(budget, fut).await.unwrap_or_else(|_| {
        warn!(fetch, "Metadata fetch exceeded its time budget.");
        ProbeResult::Failed(timeout_reason(budget))
    })
}

async fn fetch_title(http: &dyn HttpClient, target: &Target) -> ProbeResult<String> {
    match http.get(&target.url, &[]).await {
        Ok(response) => {
            let title = HtmlPage::parse(&response.text()).title();
            debug!(status = response.status, title = ?title, "Page title extracted.");
            ProbeResult::from_option(title)
        }
        Err(e) => {
            warn!(url = %target.url, error = %e, "Title fetch failed.");
            ProbeResult::Failed(e.to_string())
        }
    }
}

async fn fetch_last_modified(http: &dyn HttpClient, target: &Target) -> ProbeResult<String> {
    match http.head(&target.url).await {
        Ok(response) => {
            let last_modified = response.header("last-modified").map(str::to_string);
            debug!(last_modified = ?last_modified, "HEAD response inspected.");
            ProbeResult::from_option(last_modified)
        }
        Err(e) => {
            warn!(url = %target.url, error = %e, "HEAD request failed.");
            ProbeResult::Failed(e.to_string())
        }
    }
}

async fn fetch_firewall_names(
    http: &dyn HttpClient,
    target: &Target,
    browser_user_agent: &str,
) -> ProbeResult<Vec<String>> {
    match http.get(&target.url, &[("user-agent", browser_user_agent)]).await {
        Ok(response) => {
            let names = response
                .header(FIREWALL_HEADER)
                .map(split_firewall_header)
                .unwrap_or_default();
            debug!(count = names.len(), "Firewall header inspected.");
            ProbeResult::Found(names)
        }
        Err(e) => {
            warn!(url = %target.url, error = %e, "Firewall fetch failed.");
            ProbeResult::Failed(e.to_string())
        }
    }
}

/// Comma-separated firewall names, trimmed, blanks dropped.
pub fn split_firewall_header(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::TransportError;
    use crate::core::target::normalize;
    use crate::core::testing::{response, FakeHttp};

    const URL: &str = "https://example.com/";
    const UA: &str = "Mozilla/5.0 (Test)";
    const BUDGET: Duration = Duration::from_secs(1);

    #[test]
    fn test_split_firewall_header() {
        assert_eq!(split_firewall_header("Cloudflare, ModSecurity"), vec!["Cloudflare", "ModSecurity"]);
        assert_eq!(split_firewall_header(" , "), Vec::<String>::new());
    }

    #[tokio::test]
    async fn test_all_metadata_found() {
        let http = FakeHttp::new()
            .with_get(URL, Ok(response(200, &[("x-firewall", "Sucuri,Imperva")], "<title>Example Domain</title>")))
            .with_head(URL, Ok(response(200, &[("last-modified", "Thu, 17 Oct 2019 07:18:26 GMT")], "")));
        let target = normalize(URL).unwrap();

        let results = run_metadata_scan(&http, &target, UA, BUDGET).await;
        assert_eq!(results.title, ProbeResult::Found("Example Domain".to_string()));
        assert_eq!(
            results.last_modified,
            ProbeResult::Found("Thu, 17 Oct 2019 07:18:26 GMT".to_string())
        );
        assert_eq!(
            results.firewall_names,
            ProbeResult::Found(vec!["Sucuri".to_string(), "Imperva".to_string()])
        );

        let gets = http.seen_gets.lock().unwrap();
        assert!(gets.iter().any(|(_, headers)| headers.iter().any(|(k, v)| k == "user-agent" && v == UA)));
    }

    #[tokio::test]
    async fn test_missing_data_is_absent_or_empty() {
        let http = FakeHttp::new()
            .with_get(URL, Ok(response(404, &[], "<p>not found</p>")))
            .with_head(URL, Ok(response(404, &[], "")));
        let target = normalize(URL).unwrap();

        let results = run_metadata_scan(&http, &target, UA, BUDGET).await;
        assert_eq!(results.title, ProbeResult::Absent);
        assert_eq!(results.last_modified, ProbeResult::Absent);
        assert_eq!(results.firewall_names, ProbeResult::Found(vec![]));
    }

    #[tokio::test]
    async fn test_head_failure_is_isolated() {
        let http = FakeHttp::new()
            .with_get(URL, Ok(response(200, &[], "<title>Still here</title>")))
            .with_head(URL, Err(TransportError::Timeout("HEAD timed out".into())));
        let target = normalize(URL).unwrap();

        let results = run_metadata_scan(&http, &target, UA, BUDGET).await;
        assert_eq!(results.title, ProbeResult::Found("Still here".to_string()));
        assert!(results.last_modified.is_failed());
        assert_eq!(results.firewall_names, ProbeResult::Found(vec![]));
    }

    #[tokio::test]
    async fn test_hanging_head_keeps_title_and_firewall() {
        let http = FakeHttp::new()
            .with_get(URL, Ok(response(200, &[("x-firewall", "Sucuri")], "<title>Up</title>")))
            .with_hanging_head(URL);
        let target = normalize(URL).unwrap();

        let results = run_metadata_scan(&http, &target, UA, Duration::from_millis(100)).await;
        assert_eq!(results.title, ProbeResult::Found("Up".to_string()));
        assert_eq!(results.firewall_names, ProbeResult::Found(vec!["Sucuri".to_string()]));
        assert!(matches!(&results.last_modified, ProbeResult::Failed(reason) if reason.contains("timed out")));
    }
}
