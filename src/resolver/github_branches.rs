//! GitHub branches resolver
//!
//! For projects that keep one branch per release line (e.g. `branch/24.08`).
//! API endpoint: {base}/repos/{project}/branches

use crate::domain::Version;
use crate::error::{ResolverError, VersionError};
use crate::resolver::{max_version, HttpClient, VersionResolver};
use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use tracing::debug;

/// Branch entry from the GitHub API
#[derive(Debug, Deserialize)]
struct Branch {
    name: String,
}

/// GitHub branches resolver
pub struct GithubBranchesResolver {
    client: HttpClient,
    base_url: String,
    project: String,
    regex: Regex,
}

impl GithubBranchesResolver {
    /// Create a new branches resolver
    pub fn new(
        client: HttpClient,
        base_url: impl Into<String>,
        project: impl Into<String>,
        regex: Regex,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            project: project.into(),
            regex,
        }
    }

    /// Build the branches URL
    fn build_url(&self) -> String {
        format!("{}/repos/{}/branches", self.base_url, self.project)
    }

    /// Versions of branches whose name matches the regex from the start
    fn versions_from_names<'a>(
        &self,
        names: impl IntoIterator<Item = &'a str>,
    ) -> Result<Vec<Version>, VersionError> {
        names
            .into_iter()
            .filter_map(|name| {
                let caps = self.regex.captures(name)?;
                if caps.get(0)?.start() != 0 {
                    return None;
                }
                caps.get(1).map(|m| m.as_str())
            })
            .map(Version::parse)
            .collect()
    }
}

#[async_trait]
impl VersionResolver for GithubBranchesResolver {
    fn kind(&self) -> &'static str {
        "github_branches"
    }

    async fn latest_version(&self, component: &str) -> Result<Version, ResolverError> {
        let url = self.build_url();
        let branches: Vec<Branch> = self.client.get_github_json(&url).await?;
        debug!(component, branches = branches.len(), "listed branches");

        let versions = self.versions_from_names(branches.iter().map(|b| b.name.as_str()))?;
        max_version(versions, component, &url)
    }
}
