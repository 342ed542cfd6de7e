//! Manifest format detection and parsing

use crate::error::ManifestError;
use crate::manifest::Manifest;
use std::path::Path;

/// Serialization format of a manifest file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestFormat {
    /// Strict JSON (`.json`)
    Json,
    /// YAML, for every other extension
    Yaml,
}

impl ManifestFormat {
    /// Select the format from the file extension
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => ManifestFormat::Json,
            _ => ManifestFormat::Yaml,
        }
    }

    /// Parse manifest text in this format
    pub fn parse(&self, content: &str, path: &Path) -> Result<Manifest, ManifestError> {
        match self {
            ManifestFormat::Json => serde_json::from_str(content)
                .map_err(|e| ManifestError::json_parse_error(path, e.to_string())),
            // serde_yaml never instantiates arbitrary tagged types
            ManifestFormat::Yaml => serde_yaml::from_str(content)
                .map_err(|e| ManifestError::yaml_parse_error(path, e.to_string())),
        }
    }
}
