//! Template variable environment
//!
//! Variables produced per run:
//! - `runtime_version`
//! - `{module}_version`, `{module}_source_url`, `{module}_sha256`
//! - `{module}_version_date`: `YYYY-MM-DD`, or empty when no date was captured
//!
//! Modules whose latest version is newer than the pinned one need a fresh
//! digest; all others reuse the sha256 already in the manifest.

use crate::checksum::ChecksumFetcher;
use crate::config::Config;
use crate::domain::{ComponentUpdate, Version, RUNTIME_NAME};
use crate::error::{AppError, ManifestError, ResolverError};
use crate::manifest::Manifest;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Flat name -> value mapping fed to the template engine
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TemplateVars(BTreeMap<String, String>);

impl TemplateVars {
    /// Creates an empty environment
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a variable
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.insert(name.into(), value.into());
    }

    /// Look up a variable
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Whether a variable is set
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Number of variables
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no variables are set
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl Extend<(String, String)> for TemplateVars {
    fn extend<T: IntoIterator<Item = (String, String)>>(&mut self, iter: T) {
        self.0.extend(iter);
    }
}

/// Variables known before any download, plus the downloads still needed
#[derive(Debug, Clone, Default)]
pub struct VariablePlan {
    /// Variables resolved so far
    pub vars: TemplateVars,
    /// `module -> source URL` for modules needing a fresh digest
    pub pending_checksums: BTreeMap<String, String>,
    /// Per-component outcome, runtime first
    pub updates: Vec<ComponentUpdate>,
}

/// Decide every variable that does not need a download
pub fn plan_variables(
    config: &Config,
    current: &BTreeMap<String, Version>,
    latest: &BTreeMap<String, Version>,
    manifest: &Manifest,
) -> Result<VariablePlan, AppError> {
    let mut plan = VariablePlan::default();

    let runtime_latest = lookup_latest(latest, RUNTIME_NAME)?;
    let runtime_current = lookup_current(current, RUNTIME_NAME)?;
    plan.vars
        .insert(format!("{}_version", RUNTIME_NAME), runtime_latest.to_string());
    plan.updates.push(ComponentUpdate::new(
        RUNTIME_NAME,
        runtime_current.clone(),
        runtime_latest.clone(),
    ));

    for module in &config.modules {
        let name = module.name.as_str();
        let new_version = lookup_latest(latest, name)?;
        let pinned = lookup_current(current, name)?;
        let source_url = module.source_url_for(&new_version.to_string());

        plan.vars
            .insert(format!("{}_version", name), new_version.to_string());
        plan.vars
            .insert(format!("{}_source_url", name), source_url.clone());
        plan.vars.insert(
            format!("{}_version_date", name),
            new_version.date_string().unwrap_or_default(),
        );

        let update = ComponentUpdate::new(name, pinned.clone(), new_version.clone());
        if update.status.needs_checksum() {
            debug!(module = name, from = %pinned, to = %new_version, "fresh digest needed");
            plan.pending_checksums.insert(name.to_string(), source_url);
        } else {
            let digest = manifest.pinned_digest(name)?;
            plan.vars.insert(format!("{}_sha256", name), digest);
        }
        plan.updates.push(update);
    }

    Ok(plan)
}

/// Complete a plan by downloading and hashing the pending sources
pub async fn build_variables(
    plan: VariablePlan,
    fetcher: &ChecksumFetcher,
) -> Result<(TemplateVars, Vec<ComponentUpdate>), AppError> {
    let VariablePlan {
        mut vars,
        pending_checksums,
        updates,
    } = plan;

    let digests = fetcher.fetch_all(&pending_checksums).await?;
    vars.extend(digests);
    Ok((vars, updates))
}

fn lookup_latest<'a>(
    latest: &'a BTreeMap<String, Version>,
    name: &str,
) -> Result<&'a Version, ResolverError> {
    latest
        .get(name)
        .ok_or_else(|| ResolverError::no_version_found(name, "version lookup results"))
}

fn lookup_current<'a>(
    current: &'a BTreeMap<String, Version>,
    name: &str,
) -> Result<&'a Version, ManifestError> {
    current
        .get(name)
        .ok_or_else(|| ManifestError::UnpinnedModule {
            name: name.to_string(),
        })
}
