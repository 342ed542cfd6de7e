//! Regex scrape resolver
//!
//! Fetches an HTML page and takes the highest version among all regex
//! matches. The first capture group holds the version; a pattern without
//! groups uses the whole match.

use crate::domain::Version;
use crate::error::{ResolverError, VersionError};
use crate::resolver::{max_version, HttpClient, VersionResolver};
use async_trait::async_trait;
use regex::Regex;
use tracing::debug;

/// Scrape resolver
pub struct ScrapeResolver {
    client: HttpClient,
    url: String,
    regex: Regex,
}

impl ScrapeResolver {
    /// Create a new scrape resolver
    pub fn new(client: HttpClient, url: impl Into<String>, regex: Regex) -> Self {
        Self {
            client,
            url: url.into(),
            regex,
        }
    }

    /// Parse every match in `body` into a version
    fn extract_versions(&self, body: &str) -> Result<Vec<Version>, VersionError> {
        self.regex
            .captures_iter(body)
            .filter_map(|caps| caps.get(1).or_else(|| caps.get(0)))
            .map(|m| Version::parse(m.as_str()))
            .collect()
    }
}

#[async_trait]
impl VersionResolver for ScrapeResolver {
    fn kind(&self) -> &'static str {
        "scrape"
    }

    async fn latest_version(&self, component: &str) -> Result<Version, ResolverError> {
        let body = self.client.get_text(&self.url).await?;
        let versions = self.extract_versions(&body)?;
        debug!(component, matches = versions.len(), url = %self.url, "scraped versions");
        max_version(versions, component, &self.url)
    }
}
