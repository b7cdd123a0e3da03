//! Sitemap fetching and candidate-entity extraction.
//!
//! The only network-touching collaborator in the pipeline: one bounded-
//! timeout HTTP fetch per sitemap (plus one level of sitemap-index
//! children), then pure URL-path analysis to propose candidate entity
//! names for the ontology builder. Fetch and parse failures surface as
//! [`StratBuilderError::SitemapFetch`] / [`StratBuilderError::SitemapParse`];
//! there is no retry here and no silent empty result.

mod parser;

use std::collections::HashMap;

use reqwest::Client;
use tracing::{debug, info, instrument, warn};
use url::Url;

use stratbuilder_shared::{CandidateEntity, Result, StratBuilderError};

pub use parser::{SitemapDocument, parse_sitemap};

/// Maximum number of redirects to follow when fetching a sitemap.
const MAX_REDIRECTS: usize = 3;

/// Default timeout in seconds for sitemap fetches.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Maximum child sitemaps fetched from an index file.
const MAX_CHILD_SITEMAPS: usize = 10;

/// Maximum candidate entities returned to the ontology builder.
const MAX_CANDIDATES: usize = 100;

/// Maximum source URLs recorded per candidate.
const MAX_SOURCE_URLS: usize = 5;

/// User-Agent string for sitemap requests.
const USER_AGENT: &str = concat!("StratBuilder/", env!("CARGO_PKG_VERSION"));

/// Words ignored when reconstructing entity names from URL slugs.
const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
    "from", "as", "is", "was", "are", "were", "been", "be", "have", "has", "had", "do", "does",
    "did", "will", "would", "could", "should", "may", "might", "must", "shall", "can", "need",
    "index", "page", "default", "home", "main", "about", "contact",
];

// ---------------------------------------------------------------------------
// Entry model & options
// ---------------------------------------------------------------------------

/// A single `<url>` entry from a sitemap, in document order.
#[derive(Debug, Clone, PartialEq)]
pub struct SitemapEntry {
    /// Page URL.
    pub url: String,
    /// Raw `<lastmod>` value, if present.
    pub lastmod: Option<String>,
}

/// Configuration for sitemap fetching.
#[derive(Debug, Clone)]
pub struct SitemapOptions {
    /// Timeout for each HTTP request in seconds.
    pub timeout_secs: u64,
}

impl Default for SitemapOptions {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

// ---------------------------------------------------------------------------
// Fetching
// ---------------------------------------------------------------------------

/// Fetch a sitemap URL and return its entries in document order.
///
/// If the URL points at a sitemap index, up to [`MAX_CHILD_SITEMAPS`]
/// children are fetched (one level deep; nested indexes are skipped with a
/// warning) and their entries concatenated in index order.
#[instrument(skip_all, fields(url = %sitemap_url))]
pub async fn fetch_sitemap(sitemap_url: &str, opts: &SitemapOptions) -> Result<Vec<SitemapEntry>> {
    let client = build_client(opts)?;
    let body = fetch_text(&client, sitemap_url).await?;

    match parse_sitemap(&body)? {
        SitemapDocument::UrlSet(entries) => {
            info!(entries = entries.len(), "sitemap fetched");
            Ok(entries)
        }
        SitemapDocument::Index(child_locs) => {
            info!(children = child_locs.len(), "sitemap index fetched");
            let mut all_entries = Vec::new();

            for loc in child_locs.iter().take(MAX_CHILD_SITEMAPS) {
                let child_body = fetch_text(&client, loc).await?;
                match parse_sitemap(&child_body)? {
                    SitemapDocument::UrlSet(entries) => {
                        debug!(child = %loc, entries = entries.len(), "child sitemap parsed");
                        all_entries.extend(entries);
                    }
                    SitemapDocument::Index(_) => {
                        warn!(child = %loc, "nested sitemap index skipped");
                    }
                }
            }

            Ok(all_entries)
        }
    }
}

/// Fetch sitemap entries and extract candidate entities in one call.
pub async fn extract_candidates(
    sitemap_url: &str,
    opts: &SitemapOptions,
) -> Result<Vec<CandidateEntity>> {
    let entries = fetch_sitemap(sitemap_url, opts).await?;
    Ok(candidate_entities(&entries))
}

/// Build a reqwest client with bounded timeout and redirects.
fn build_client(opts: &SitemapOptions) -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
        .timeout(std::time::Duration::from_secs(opts.timeout_secs))
        .build()
        .map_err(|e| StratBuilderError::SitemapFetch(format!("failed to build HTTP client: {e}")))
}

/// Fetch a URL body as text, mapping failures to `SitemapFetch`.
async fn fetch_text(client: &Client, url: &str) -> Result<String> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| StratBuilderError::SitemapFetch(format!("{url}: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(StratBuilderError::SitemapFetch(format!("{url}: HTTP {status}")));
    }

    response
        .text()
        .await
        .map_err(|e| StratBuilderError::SitemapFetch(format!("{url}: failed to read body: {e}")))
}

// ---------------------------------------------------------------------------
// Candidate extraction
// ---------------------------------------------------------------------------

/// Derive candidate entity names from sitemap URL paths.
///
/// The last path segment of each URL is stripped of file extensions,
/// split on slug separators, filtered against stop words, and title-cased.
/// Candidates are counted case-insensitively (first-seen casing wins),
/// sorted by frequency descending with first-seen order as the tie-break,
/// and capped at [`MAX_CANDIDATES`].
pub fn candidate_entities(entries: &[SitemapEntry]) -> Vec<CandidateEntity> {
    let mut candidates: Vec<CandidateEntity> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for entry in entries {
        let Some(name) = entity_name_from_url(&entry.url) else {
            continue;
        };

        let key = name.to_lowercase();
        match index.get(&key) {
            Some(&i) => {
                candidates[i].frequency += 1;
                if candidates[i].source_urls.len() < MAX_SOURCE_URLS {
                    candidates[i].source_urls.push(entry.url.clone());
                }
            }
            None => {
                index.insert(key, candidates.len());
                candidates.push(CandidateEntity {
                    name,
                    frequency: 1,
                    source_urls: vec![entry.url.clone()],
                });
            }
        }
    }

    // Stable sort keeps first-seen order among equal frequencies
    candidates.sort_by(|a, b| b.frequency.cmp(&a.frequency));
    candidates.truncate(MAX_CANDIDATES);
    candidates
}

/// Reconstruct a readable entity name from a URL's last path segment.
fn entity_name_from_url(raw_url: &str) -> Option<String> {
    let parsed = Url::parse(raw_url).ok()?;
    let segment = parsed
        .path_segments()?
        .filter(|s| !s.is_empty())
        .next_back()?
        .to_string();

    let mut slug = segment.as_str();
    for ext in [".html", ".htm", ".php", ".aspx", ".asp"] {
        if let Some(stripped) = slug.strip_suffix(ext) {
            slug = stripped;
            break;
        }
    }

    let words: Vec<String> = slug
        .replace(['-', '_'], " ")
        .split_whitespace()
        .filter(|w| w.len() > 2 && !STOP_WORDS.contains(&w.to_lowercase().as_str()))
        .map(title_case)
        .collect();

    if words.is_empty() {
        None
    } else {
        Some(words.join(" "))
    }
}

/// Uppercase the first character of a word.
fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(c) => {
            let upper: String = c.to_uppercase().collect();
            format!("{upper}{}", chars.collect::<String>())
        }
        None => String::new(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
