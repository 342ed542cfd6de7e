//! Component and resolver specifications loaded from the config file

use serde::{Deserialize, Serialize};

/// Placeholder substituted into `source_url` templates
pub const VERSION_PLACEHOLDER: &str = "{version}";

/// How to discover the latest version of a component
///
/// Tagged by the `type` key in the config file; unknown types are rejected
/// when the config is parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResolverSpec {
    /// Regex scrape of an HTML page
    Scrape {
        /// Page to fetch
        url: String,
        /// Pattern with one capture group holding the version
        regex: String,
    },
    /// Match branch names of a GitHub repository
    GithubBranches {
        /// `owner/repo`
        project: String,
        /// Pattern anchored at the start of the branch name
        regex: String,
    },
    /// Latest GitHub release or tag
    GithubReleases {
        /// `owner/repo`
        project: String,
        /// Use the tags endpoint instead of releases
        #[serde(default)]
        tags: bool,
        /// Literal `(from, to)` replacements applied to names before parsing
        #[serde(default)]
        substitutions: Vec<(String, String)>,
        /// Capture the release or commit date
        #[serde(default)]
        set_date: bool,
    },
}

impl ResolverSpec {
    /// Resolver type name as written in the config
    pub fn kind(&self) -> &'static str {
        match self {
            ResolverSpec::Scrape { .. } => "scrape",
            ResolverSpec::GithubBranches { .. } => "github_branches",
            ResolverSpec::GithubReleases { .. } => "github_releases",
        }
    }

    /// Regex pattern used by this resolver, if any
    pub fn regex(&self) -> Option<&str> {
        match self {
            ResolverSpec::Scrape { regex, .. } | ResolverSpec::GithubBranches { regex, .. } => {
                Some(regex)
            }
            ResolverSpec::GithubReleases { .. } => None,
        }
    }
}

/// A tracked module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentSpec {
    /// Module name, matching the manifest module name
    pub name: String,
    /// Version discovery strategy
    pub get_version: ResolverSpec,
    /// Archive URL template containing `{version}`
    pub source_url: String,
}

impl ComponentSpec {
    /// Source URL for a concrete version
    pub fn source_url_for(&self, version: &str) -> String {
        self.source_url.replace(VERSION_PLACEHOLDER, version)
    }
}

/// The Flatpak runtime; only its version is tracked
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeSpec {
    /// Version discovery strategy
    pub get_version: ResolverSpec,
}
