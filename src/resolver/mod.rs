//! Version resolvers for discovering the latest upstream release
//!
//! This module provides:
//! - HTTP client shared foundation
//! - Regex scrape of an HTML page
//! - GitHub branch-name matching
//! - GitHub releases / tags lookup with optional date capture

mod client;
mod github_branches;
mod github_releases;
mod scrape;

pub use client::HttpClient;
pub use github_branches::GithubBranchesResolver;
pub use github_releases::{parse_github_date, select_latest, GithubReleasesResolver};
pub use scrape::ScrapeResolver;

use crate::domain::{ResolverSpec, Version};
use crate::error::ResolverError;
use async_trait::async_trait;
use regex::Regex;

/// Default base URL for the GitHub REST API
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

/// Trait for version resolvers
#[async_trait]
pub trait VersionResolver: Send + Sync {
    /// Resolver type name as written in the config
    fn kind(&self) -> &'static str;

    /// Discover the latest version of `component`
    async fn latest_version(&self, component: &str) -> Result<Version, ResolverError>;
}

/// Create the resolver matching a spec variant
pub fn create_resolver(
    spec: &ResolverSpec,
    client: HttpClient,
    github_api_url: &str,
) -> Result<Box<dyn VersionResolver>, ResolverError> {
    let github_api_url = github_api_url.trim_end_matches('/');
    let resolver: Box<dyn VersionResolver> = match spec {
        ResolverSpec::Scrape { url, regex } => {
            Box::new(ScrapeResolver::new(client, url, compile(regex)?))
        }
        ResolverSpec::GithubBranches { project, regex } => Box::new(GithubBranchesResolver::new(
            client,
            github_api_url,
            project,
            compile(regex)?,
        )),
        ResolverSpec::GithubReleases {
            project,
            tags,
            substitutions,
            set_date,
        } => Box::new(
            GithubReleasesResolver::new(client, github_api_url, project)
                .with_tags(*tags)
                .with_substitutions(substitutions.clone())
                .with_date(*set_date),
        ),
    };
    Ok(resolver)
}

fn compile(pattern: &str) -> Result<Regex, ResolverError> {
    Regex::new(pattern).map_err(|e| ResolverError::InvalidRegex {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })
}

/// Maximum of a set of versions, failing loudly when there are none
pub(crate) fn max_version(
    versions: impl IntoIterator<Item = Version>,
    component: &str,
    source_desc: &str,
) -> Result<Version, ResolverError> {
    versions
        .into_iter()
        .max()
        .ok_or_else(|| ResolverError::no_version_found(component, source_desc))
}
