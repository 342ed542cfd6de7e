//! Per-component update decisions and the run summary

use super::Version;
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;
use std::path::PathBuf;

/// How the latest upstream version relates to the pinned one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateStatus {
    /// Latest is newer; a fresh digest is required
    Updated,
    /// Latest equals the pinned version
    Unchanged,
    /// Latest is older than the pinned version; the pinned digest is kept
    Downgraded,
}

impl UpdateStatus {
    /// Classify `latest` against `current`
    pub fn between(current: &Version, latest: &Version) -> Self {
        match latest.cmp(current) {
            Ordering::Greater => UpdateStatus::Updated,
            Ordering::Equal => UpdateStatus::Unchanged,
            Ordering::Less => UpdateStatus::Downgraded,
        }
    }

    /// Whether a fresh checksum must be fetched
    pub fn needs_checksum(&self) -> bool {
        matches!(self, UpdateStatus::Updated)
    }
}

impl fmt::Display for UpdateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateStatus::Updated => write!(f, "updated"),
            UpdateStatus::Unchanged => write!(f, "unchanged"),
            UpdateStatus::Downgraded => write!(f, "downgraded"),
        }
    }
}

/// Outcome for a single component
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentUpdate {
    /// Component name (`runtime` for the runtime)
    pub name: String,
    /// Version pinned in the manifest
    pub current: Version,
    /// Latest upstream version
    pub latest: Version,
    /// Release date of the latest version, if captured
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Relation between the two
    pub status: UpdateStatus,
}

impl ComponentUpdate {
    /// Creates a new ComponentUpdate, deriving the status
    pub fn new(name: impl Into<String>, current: Version, latest: Version) -> Self {
        let status = UpdateStatus::between(&current, &latest);
        Self {
            name: name.into(),
            date: latest.date_string(),
            current,
            latest,
            status,
        }
    }

    /// Returns true if the component moves to a newer version
    pub fn is_update(&self) -> bool {
        self.status == UpdateStatus::Updated
    }
}

impl fmt::Display for ComponentUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} -> {}", self.name, self.current, self.latest)
    }
}

/// Summary of a whole run
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    /// Whether downloads and rendering were skipped
    pub dry_run: bool,
    /// Runtime first, then modules in config order
    pub components: Vec<ComponentUpdate>,
    /// Files written by the template renderer
    pub rendered: Vec<PathBuf>,
}

impl RunSummary {
    /// Creates an empty summary
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Default::default()
        }
    }

    /// Number of components with a newer version
    pub fn update_count(&self) -> usize {
        self.components.iter().filter(|c| c.is_update()).count()
    }

    /// Components with a newer version
    pub fn updates(&self) -> impl Iterator<Item = &ComponentUpdate> {
        self.components.iter().filter(|c| c.is_update())
    }
}
