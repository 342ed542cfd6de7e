//! Component configuration file
//!
//! The config is a YAML document with a `runtime` entry and a list of
//! `modules`:
//!
//! ```yaml
//! runtime:
//!   get_version:
//!     type: github_branches
//!     project: flathub/org.freedesktop.Platform
//!     regex: 'branch/([0-9.]+)'
//! modules:
//!   - name: libfoo
//!     source_url: https://example.com/libfoo-{version}.tar.gz
//!     get_version:
//!       type: scrape
//!       url: https://example.com/downloads
//!       regex: 'libfoo-([0-9.]+)\.tar\.gz'
//! ```
//!
//! Every module yields the template variables `{name}_version`,
//! `{name}_source_url`, `{name}_sha256` and `{name}_version_date`. The date
//! is only captured by `github_releases` with `set_date: true`; for every
//! other module `{name}_version_date` is defined but empty, so a template
//! shared between modules can reference it unconditionally.

use crate::domain::{ComponentSpec, ResolverSpec, RuntimeSpec, RUNTIME_NAME, VERSION_PLACEHOLDER};
use crate::error::ConfigError;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

/// Parsed and validated configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Config {
    /// Runtime version lookup
    pub runtime: RuntimeSpec,
    /// Tracked modules
    #[serde(default)]
    pub modules: Vec<ComponentSpec>,
}

impl Config {
    /// Load and validate a config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_yaml(&content).map_err(|e| match e {
            ConfigError::ParseError { message, .. } => ConfigError::parse_error(path, message),
            other => other,
        })
    }

    /// Parse and validate config text
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)
            .map_err(|e| ConfigError::parse_error("<config>", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configs that would only fail later, mid-run
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_regex(RUNTIME_NAME, &self.runtime.get_version)?;

        let mut seen = HashSet::new();
        for module in &self.modules {
            if module.name == RUNTIME_NAME {
                return Err(ConfigError::ReservedName {
                    name: module.name.clone(),
                });
            }
            if !seen.insert(module.name.as_str()) {
                return Err(ConfigError::DuplicateComponent {
                    name: module.name.clone(),
                });
            }
            if !module.source_url.contains(VERSION_PLACEHOLDER) {
                return Err(ConfigError::MissingPlaceholder {
                    component: module.name.clone(),
                });
            }
            validate_regex(&module.name, &module.get_version)?;
        }

        Ok(())
    }

    /// All lookups to perform: the runtime first, then every module
    pub fn lookups(&self) -> Vec<(&str, &ResolverSpec)> {
        std::iter::once((RUNTIME_NAME, &self.runtime.get_version))
            .chain(
                self.modules
                    .iter()
                    .map(|m| (m.name.as_str(), &m.get_version)),
            )
            .collect()
    }

    /// Find a module by name
    pub fn module(&self, name: &str) -> Option<&ComponentSpec> {
        self.modules.iter().find(|m| m.name == name)
    }
}

fn validate_regex(component: &str, spec: &ResolverSpec) -> Result<(), ConfigError> {
    if let Some(pattern) = spec.regex() {
        Regex::new(pattern).map_err(|e| ConfigError::InvalidRegex {
            component: component.to_string(),
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const CONFIG: &str = r#"
runtime:
  get_version:
    type: github_branches
    project: flathub/org.freedesktop.Platform
    regex: 'branch/([0-9.]+)'
modules:
  - name: libfoo
    source_url: https://example.com/libfoo-{version}.tar.gz
    get_version:
      type: scrape
      url: https://example.com/downloads
      regex: 'libfoo-([0-9.]+)\.tar\.gz'
  - name: bar
    source_url: https://github.com/o/bar/archive/v{version}/bar-{version}.tar.gz
    get_version:
      type: github_releases
      project: o/bar
      substitutions: [["v", ""]]
"#;

    #[test]
    fn test_from_yaml() {
        let config = Config::from_yaml(CONFIG).unwrap();
        assert_eq!(config.modules.len(), 2);
        assert_eq!(config.modules[0].name, "libfoo");
        assert_eq!(config.runtime.get_version.kind(), "github_branches");
        assert!(config.module("bar").is_some());
        assert!(config.module("baz").is_none());
    }

    #[test]
    fn test_lookups_runtime_first() {
        let config = Config::from_yaml(CONFIG).unwrap();
        let names: Vec<_> = config.lookups().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["runtime", "libfoo", "bar"]);
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, CONFIG).unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(config.modules.len(), 2);
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load(Path::new("/nonexistent/config.yaml"));
        assert!(matches!(result, Err(ConfigError::ReadError { .. })));
    }

    #[test]
    fn test_unknown_resolver_type() {
        let yaml = r#"
runtime:
  get_version:
    type: ftp_listing
    url: ftp://example.com
"#;
        let result = Config::from_yaml(yaml);
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn test_duplicate_module() {
        let yaml = r#"
runtime:
  get_version: {type: github_releases, project: o/rt}
modules:
  - name: foo
    source_url: https://example.com/foo-{version}.tar.gz
    get_version: {type: github_releases, project: o/foo}
  - name: foo
    source_url: https://example.com/foo-{version}.tar.gz
    get_version: {type: github_releases, project: o/foo}
"#;
        assert!(matches!(
            Config::from_yaml(yaml),
            Err(ConfigError::DuplicateComponent { .. })
        ));
    }

    #[test]
    fn test_reserved_runtime_name() {
        let yaml = r#"
runtime:
  get_version: {type: github_releases, project: o/rt}
modules:
  - name: runtime
    source_url: https://example.com/rt-{version}.tar.gz
    get_version: {type: github_releases, project: o/rt}
"#;
        assert!(matches!(
            Config::from_yaml(yaml),
            Err(ConfigError::ReservedName { .. })
        ));
    }

    #[test]
    fn test_missing_placeholder() {
        let yaml = r#"
runtime:
  get_version: {type: github_releases, project: o/rt}
modules:
  - name: foo
    source_url: https://example.com/foo-latest.tar.gz
    get_version: {type: github_releases, project: o/foo}
"#;
        assert!(matches!(
            Config::from_yaml(yaml),
            Err(ConfigError::MissingPlaceholder { .. })
        ));
    }

    #[test]
    fn test_invalid_regex() {
        let yaml = r#"
runtime:
  get_version: {type: scrape, url: "https://example.com", regex: "([0-9"}
"#;
        assert!(matches!(
            Config::from_yaml(yaml),
            Err(ConfigError::InvalidRegex { .. })
        ));
    }
}
