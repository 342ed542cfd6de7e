//! GitHub releases / tags resolver
//!
//! API endpoints:
//! - {base}/repos/{project}/releases
//! - {base}/repos/{project}/tags
//!
//! Names go through the configured literal substitutions before parsing.
//! Names that still are not dotted numeric versions (`nightly`, `latest`)
//! are skipped. With date capture enabled, releases use `published_at`
//! and tags need a second request for the tagged commit's committer date.

use crate::domain::Version;
use crate::error::ResolverError;
use crate::resolver::{HttpClient, VersionResolver};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use tracing::debug;

/// Timestamp format used by the GitHub API
const GITHUB_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Release entry
#[derive(Debug, Deserialize)]
struct Release {
    name: Option<String>,
    tag_name: String,
    published_at: Option<String>,
}

impl Release {
    /// Release title, falling back to the tag for untitled releases
    fn version_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.tag_name,
        }
    }
}

/// Tag entry
#[derive(Debug, Deserialize)]
struct Tag {
    name: String,
    commit: TagCommit,
}

#[derive(Debug, Deserialize)]
struct TagCommit {
    url: String,
}

/// Commit detail returned by the tag's commit URL
#[derive(Debug, Deserialize)]
struct CommitDetail {
    commit: CommitInfo,
}

#[derive(Debug, Deserialize)]
struct CommitInfo {
    committer: Signature,
}

#[derive(Debug, Deserialize)]
struct Signature {
    date: String,
}

/// GitHub releases / tags resolver
pub struct GithubReleasesResolver {
    client: HttpClient,
    base_url: String,
    project: String,
    tags: bool,
    substitutions: Vec<(String, String)>,
    set_date: bool,
}

impl GithubReleasesResolver {
    /// Create a resolver for the releases endpoint without substitutions or dates
    pub fn new(client: HttpClient, base_url: impl Into<String>, project: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            project: project.into(),
            tags: false,
            substitutions: Vec::new(),
            set_date: false,
        }
    }

    /// Use the tags endpoint instead of releases
    pub fn with_tags(mut self, tags: bool) -> Self {
        self.tags = tags;
        self
    }

    /// Literal replacements applied to names before parsing
    pub fn with_substitutions(mut self, substitutions: Vec<(String, String)>) -> Self {
        self.substitutions = substitutions;
        self
    }

    /// Capture the release date
    pub fn with_date(mut self, set_date: bool) -> Self {
        self.set_date = set_date;
        self
    }

    /// Build the listing URL
    fn build_url(&self) -> String {
        let endpoint = if self.tags { "tags" } else { "releases" };
        format!("{}/repos/{}/{}", self.base_url, self.project, endpoint)
    }

    async fn latest_release(&self, component: &str, url: &str) -> Result<Version, ResolverError> {
        let releases: Vec<Release> = self.client.get_github_json(url).await?;
        debug!(component, releases = releases.len(), "listed releases");

        let candidates = releases
            .into_iter()
            .map(|r| (r.version_name().to_string(), r));
        let (version, release) = select_latest(candidates, &self.substitutions)
            .ok_or_else(|| ResolverError::no_version_found(component, url))?;

        if !self.set_date {
            return Ok(version);
        }
        let published_at = release.published_at.unwrap_or_default();
        let date = parse_github_date(component, &published_at)?;
        Ok(version.with_date(date))
    }

    async fn latest_tag(&self, component: &str, url: &str) -> Result<Version, ResolverError> {
        let tags: Vec<Tag> = self.client.get_github_json(url).await?;
        debug!(component, tags = tags.len(), "listed tags");

        let candidates = tags.into_iter().map(|t| (t.name.clone(), t));
        let (version, tag) = select_latest(candidates, &self.substitutions)
            .ok_or_else(|| ResolverError::no_version_found(component, url))?;

        if !self.set_date {
            return Ok(version);
        }
        let detail: CommitDetail = self.client.get_github_json(&tag.commit.url).await?;
        let date = parse_github_date(component, &detail.commit.committer.date)?;
        Ok(version.with_date(date))
    }
}

#[async_trait]
impl VersionResolver for GithubReleasesResolver {
    fn kind(&self) -> &'static str {
        "github_releases"
    }

    async fn latest_version(&self, component: &str) -> Result<Version, ResolverError> {
        let url = self.build_url();
        if self.tags {
            self.latest_tag(component, &url).await
        } else {
            self.latest_release(component, &url).await
        }
    }
}

/// Pick the entry with the highest version, skipping names that do not parse
///
/// Substitutions are applied in order to each name before parsing.
pub fn select_latest<T>(
    entries: impl IntoIterator<Item = (String, T)>,
    substitutions: &[(String, String)],
) -> Option<(Version, T)> {
    entries
        .into_iter()
        .filter_map(|(name, entry)| {
            let normalized = substitutions
                .iter()
                .fold(name, |acc, (from, to)| acc.replace(from.as_str(), to));
            Version::parse(&normalized).ok().map(|v| (v, entry))
        })
        .max_by(|a, b| a.0.cmp(&b.0))
}

/// Parse a GitHub `YYYY-MM-DDTHH:MM:SSZ` timestamp into its UTC date
pub fn parse_github_date(component: &str, value: &str) -> Result<NaiveDate, ResolverError> {
    NaiveDateTime::parse_from_str(value, GITHUB_DATE_FORMAT)
        .map(|dt| dt.date())
        .map_err(|e| ResolverError::InvalidDate {
            component: component.to_string(),
            value: value.to_string(),
            message: e.to_string(),
        })
}
