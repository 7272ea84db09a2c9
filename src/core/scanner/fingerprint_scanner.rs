// src/core/scanner/fingerprint_scanner.rs

use futures::future::join_all;
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, info, warn};
use url::Url;

use crate::core::collaborators::html::HtmlPage;
use crate::core::collaborators::HttpClient;
use crate::core::knowledge_base::{TechCategory, Vocabulary, VocabularyEntry};
use crate::core::models::{ProbeResult, Target};

use super::timeout_reason;

/// Heuristic technology detection against the keyword vocabulary.
///
/// Candidates come from three places: `class`/`id` values in the page, the
/// bodies of linked scripts, and response header values. Only candidates that
/// are vocabulary keywords survive, so the result is always a subset of the
/// table. This is approximate by nature and not a full fingerprinting engine.
///
/// The page fetch and every script fetch share one deadline, `budget` from
/// the start of the scan. A script that misses it is skipped like any other
/// unreachable script.
pub async fn run_fingerprint_scan(
    http: &dyn HttpClient,
    target: &Target,
    vocabulary: &Vocabulary,
    budget: Duration,
) -> ProbeResult<BTreeMap<String, TechCategory>> {
    info!(url = %target.url, "Starting fingerprint scan.");
    let deadline = Instant::now() + budget;

    let response = match timeout_at(deadline, http.get(&target.url, &[])).await {
        Ok(Ok(res)) => {
            info!(status = res.status, "Received HTTP response.");
            res
        }
        Ok(Err(e)) => {
            warn!(url = %target.url, error = %e, "HTTP request failed.");
            return ProbeResult::Failed(e.to_string());
        }
        Err(_) => {
            warn!(url = %target.url, "Page fetch exceeded its time budget.");
            return ProbeResult::Failed(timeout_reason(budget));
        }
    };

    let (tokens, script_urls) = {
        let page = HtmlPage::parse(&response.text());
        let urls: Vec<Url> = page
            .script_sources()
            .iter()
            .filter_map(|src| resolve_script_url(&target.url, src))
            .collect();
        (page.class_and_id_tokens(), urls)
    };

    let mut found: BTreeMap<String, TechCategory> = BTreeMap::new();
    let mut record = |entry: &VocabularyEntry| {
        found.insert(entry.keyword.clone(), entry.category);
    };

    // 1. class and id attributes
    for token in &tokens {
        if let Some(entry) = vocabulary.lookup(token) {
            debug!(keyword = %entry.keyword, token = %token, "Attribute matched.");
            record(entry);
        }
    }

    // 2. linked scripts
    debug!(scripts = script_urls.len(), "Fetching linked scripts.");
    let bodies = join_all(script_urls.iter().map(|url| fetch_script(http, url, deadline))).await;
    for body in bodies.into_iter().flatten() {
        vocabulary.keywords_in(&body).into_iter().for_each(&mut record);
    }

    // 3. response headers
    for (name, value) in response.headers.iter() {
        if let Ok(value) = value.to_str() {
            for entry in vocabulary.keywords_in(value) {
                debug!(header = %name, keyword = %entry.keyword, "Header matched.");
                record(entry);
            }
        }
    }

    info!(count = found.len(), "Fingerprint scan finished.");
    ProbeResult::Found(found)
}

/// Absolute http(s) URL for a script `src`, relative paths resolved against
/// the page.
pub fn resolve_script_url(page: &Url, src: &str) -> Option<Url> {
    let url = page.join(src).ok()?;
    matches!(url.scheme(), "http" | "https").then_some(url)
}

/// Script body, or `None` if the fetch failed or ran past `deadline`.
async fn fetch_script(http: &dyn HttpClient, url: &Url, deadline: Instant) -> Option<String> {
    match timeout_at(deadline, http.get(url, &[])).await {
        Ok(Ok(response)) => Some(response.text()),
        Ok(Err(e)) => {
            debug!(url = %url, error = %e, "Skipping unreachable script.");
            None
        }
        Err(_) => {
            debug!(url = %url, "Skipping script that missed the deadline.");
            None
        }
    }
}
