//! Dotted numeric versions
//!
//! A `Version` is a variable-length sequence of non-negative integers
//! (`1`, `1.2`, `47.0.3`). Comparison pads the shorter sequence with zeros,
//! so `1.2 == 1.2.0` and `1.3 > 1.2.9`. Pre-release suffixes are rejected.
//!
//! Versions always display in canonical dotted form: each component as a
//! plain integer (`23.08` displays as `23.8`). The substituted source URLs
//! and template variables therefore never depend on upstream spelling.

use crate::error::VersionError;
use chrono::NaiveDate;
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// A comparable dotted numeric version with an optional release date
#[derive(Debug, Clone)]
pub struct Version {
    parts: Vec<u64>,
    date: Option<NaiveDate>,
}

impl Version {
    /// Build a version from its integer components
    pub fn from_parts(parts: impl Into<Vec<u64>>) -> Result<Self, VersionError> {
        let parts = parts.into();
        if parts.is_empty() {
            return Err(VersionError::Empty);
        }
        Ok(Self { parts, date: None })
    }

    /// Parse a dotted numeric string such as `1.10.2`
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        if input.is_empty() {
            return Err(VersionError::Empty);
        }

        let parts = input
            .split('.')
            .map(|component| {
                if component.is_empty() || !component.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(VersionError::invalid_component(input, component));
                }
                component
                    .parse::<u64>()
                    .map_err(|_| VersionError::invalid_component(input, component))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { parts, date: None })
    }

    /// Component at `index`, zero past the end
    pub fn part(&self, index: usize) -> u64 {
        self.parts.get(index).copied().unwrap_or(0)
    }

    /// Number of explicit components
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Always false; a version has at least one component
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Explicit components
    pub fn parts(&self) -> &[u64] {
        &self.parts
    }

    /// Release date, if the resolver captured one
    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    /// Release date as `YYYY-MM-DD`
    pub fn date_string(&self) -> Option<String> {
        self.date.map(|d| d.format("%Y-%m-%d").to_string())
    }

    /// Attach a release date (builder pattern)
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Components with trailing zeros removed; equal versions share this form
    fn significant_parts(&self) -> &[u64] {
        let end = self
            .parts
            .iter()
            .rposition(|&p| p != 0)
            .map_or(0, |i| i + 1);
        &self.parts[..end]
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for Version {
    type Error = VersionError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl TryFrom<Vec<u64>> for Version {
    type Error = VersionError;

    fn try_from(value: Vec<u64>) -> Result<Self, Self::Error> {
        Self::from_parts(value)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = self.parts.iter();
        if let Some(first) = parts.next() {
            write!(f, "{}", first)?;
        }
        for part in parts {
            write!(f, ".{}", part)?;
        }
        Ok(())
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.significant_parts().hash(state);
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.parts.len().max(other.parts.len());
        (0..len)
            .map(|i| self.part(i).cmp(&other.part(i)))
            .find(|ord| *ord != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
