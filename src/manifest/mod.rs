//! Flatpak manifest reading
//!
//! This module provides functionality to:
//! - Load a manifest as JSON or YAML depending on its extension
//! - Extract the pinned runtime version
//! - Extract each module's pinned version from its first source URL
//! - Look up the sha256 recorded for a module

mod format;

pub use format::ManifestFormat;

use crate::domain::{Version, RUNTIME_NAME};
use crate::error::ManifestError;
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;
use tracing::debug;

/// Trailing `-<version>.tar.gz` of a pinned source URL
const PINNED_URL_PATTERN: &str = r"-([0-9.]+)\.tar\.gz$";

fn pinned_url_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(PINNED_URL_PATTERN).expect("valid pinned URL pattern"))
}

/// The parts of a Flatpak manifest this tool reads
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Manifest {
    /// Pinned runtime version
    #[serde(rename = "runtime-version", deserialize_with = "string_or_number")]
    pub runtime_version: String,
    /// Modules, in manifest order
    #[serde(default)]
    pub modules: Vec<ManifestModule>,
}

/// A module entry; plain strings reference external module files
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ManifestModule {
    /// Inline module definition
    Inline(ModuleEntry),
    /// Path of an included module file
    Include(String),
}

/// Inline module definition
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModuleEntry {
    /// Module name
    pub name: String,
    /// Sources; only the first is inspected
    #[serde(default)]
    pub sources: Vec<Source>,
}

/// A module source
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Source {
    /// Archive URL (absent for git or local sources)
    pub url: Option<String>,
    /// Pinned digest
    pub sha256: Option<String>,
}

/// Accept `runtime-version: 47` as well as `runtime-version: '47'`
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        String(String),
        Integer(u64),
        Float(f64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::String(s) => s,
        Raw::Integer(n) => n.to_string(),
        Raw::Float(f) => f.to_string(),
    })
}

impl Manifest {
    /// Load a manifest, choosing the parser from the file extension
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ManifestError::read_error(path, e))?;
        ManifestFormat::from_path(path).parse(&content, path)
    }

    /// Inline module entries
    pub fn inline_modules(&self) -> impl Iterator<Item = &ModuleEntry> {
        self.modules.iter().filter_map(|m| match m {
            ManifestModule::Inline(entry) => Some(entry),
            ManifestModule::Include(_) => None,
        })
    }

    /// Find an inline module by name
    pub fn module(&self, name: &str) -> Option<&ModuleEntry> {
        self.inline_modules().find(|m| m.name == name)
    }

    /// Pinned versions keyed by component name, the runtime under `runtime`
    ///
    /// Modules whose first source URL lacks the `-<version>.tar.gz` suffix
    /// are left out; at least one module must carry it.
    pub fn current_versions(&self) -> Result<BTreeMap<String, Version>, ManifestError> {
        let mut versions = BTreeMap::new();
        let runtime =
            Version::parse(&self.runtime_version).map_err(ManifestError::InvalidRuntimeVersion)?;
        versions.insert(RUNTIME_NAME.to_string(), runtime);

        let mut pinned = 0;
        for module in self.inline_modules() {
            match module.pinned_version() {
                Some(version) => {
                    versions.insert(module.name.clone(), version);
                    pinned += 1;
                }
                None => debug!(module = %module.name, "no pinned version in first source URL"),
            }
        }

        if pinned == 0 {
            return Err(ManifestError::NoPinnedVersions);
        }
        Ok(versions)
    }

    /// sha256 of a module's first source
    pub fn pinned_digest(&self, name: &str) -> Result<&str, ManifestError> {
        self.module(name)
            .and_then(|m| m.sources.first())
            .and_then(|s| s.sha256.as_deref())
            .ok_or_else(|| ManifestError::MissingDigest {
                name: name.to_string(),
            })
    }
}

impl ModuleEntry {
    /// First source URL, if any
    pub fn first_url(&self) -> Option<&str> {
        self.sources.first().and_then(|s| s.url.as_deref())
    }

    /// Version parsed from the first source URL's `-<version>.tar.gz` suffix
    pub fn pinned_version(&self) -> Option<Version> {
        let caps = pinned_url_regex().captures(self.first_url()?)?;
        Version::parse(caps.get(1)?.as_str()).ok()
    }
}
