//! Application error types using thiserror
//!
//! Error hierarchy:
//! - VersionError: Malformed version strings or tuples
//! - ConfigError: Issues with the component configuration file
//! - ResolverError: Issues while discovering the latest upstream version
//! - ManifestError: Issues with the pinned manifest
//! - ChecksumError: Download cache and hashing failures
//! - TemplateError: Template discovery and rendering failures

use std::path::PathBuf;
use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Version parsing errors
    #[error(transparent)]
    Version(#[from] VersionError),

    /// Configuration related errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Version lookup errors
    #[error(transparent)]
    Resolver(#[from] ResolverError),

    /// Manifest file related errors
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// Download and digest errors
    #[error(transparent)]
    Checksum(#[from] ChecksumError),

    /// Template rendering errors
    #[error(transparent)]
    Template(#[from] TemplateError),
}

/// Errors raised while constructing a `Version`
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    /// No components at all
    #[error("invalid version: empty version")]
    Empty,

    /// A dotted component that is not a non-negative integer
    #[error("invalid version '{input}': component '{component}' is not a non-negative integer")]
    InvalidComponent { input: String, component: String },
}

/// Errors related to the component configuration file
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parsing error, including unknown resolver types
    #[error("failed to parse config {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    /// Two modules share a name
    #[error("duplicate component name '{name}'")]
    DuplicateComponent { name: String },

    /// A module uses the name reserved for the runtime
    #[error("module name '{name}' is reserved for the runtime")]
    ReservedName { name: String },

    /// Resolver regex does not compile
    #[error("invalid regex '{pattern}' for component '{component}': {message}")]
    InvalidRegex {
        component: String,
        pattern: String,
        message: String,
    },

    /// source_url without a {version} placeholder
    #[error("source_url for component '{component}' has no {{version}} placeholder")]
    MissingPlaceholder { component: String },
}

/// Errors raised while discovering the latest version of a component
#[derive(Error, Debug)]
pub enum ResolverError {
    /// Transport failure (unreachable host, timeout, broken body)
    #[error("failed to fetch {url}: {message}")]
    NetworkError { url: String, message: String },

    /// Non-2xx response
    #[error("unexpected HTTP status {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    /// Body could not be decoded
    #[error("invalid response from {url}: {message}")]
    InvalidResponse { url: String, message: String },

    /// Nothing matched the resolver's pattern
    #[error("no version found for '{component}' at {source_desc}")]
    NoVersionFound {
        component: String,
        source_desc: String,
    },

    /// A scraped or branch-derived version failed to parse
    #[error(transparent)]
    InvalidVersion(#[from] VersionError),

    /// Timestamp not in the expected ISO-8601 UTC format
    #[error("invalid date '{value}' for '{component}': {message}")]
    InvalidDate {
        component: String,
        value: String,
        message: String,
    },

    /// Regex rejected when building the resolver
    #[error("invalid regex '{pattern}': {message}")]
    InvalidRegex { pattern: String, message: String },
}

/// Errors related to the pinned manifest
#[derive(Error, Debug)]
pub enum ManifestError {
    /// Failed to read manifest file
    #[error("failed to read manifest file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON parsing error
    #[error("failed to parse JSON in {path}: {message}")]
    JsonParseError { path: PathBuf, message: String },

    /// YAML parsing error
    #[error("failed to parse YAML in {path}: {message}")]
    YamlParseError { path: PathBuf, message: String },

    /// runtime-version is not a dotted numeric version
    #[error("invalid runtime-version: {0}")]
    InvalidRuntimeVersion(#[source] VersionError),

    /// No module source URL carried a -<version>.tar.gz suffix
    #[error("no module in the manifest has a source URL ending in -<version>.tar.gz")]
    NoPinnedVersions,

    /// A configured module has no pinned version in the manifest
    #[error("module '{name}' has no pinned version in the manifest")]
    UnpinnedModule { name: String },

    /// A configured module has no sha256 on its first source
    #[error("module '{name}' has no sha256 on its first source")]
    MissingDigest { name: String },
}

/// Errors related to the download cache and digest computation
#[derive(Error, Debug)]
pub enum ChecksumError {
    /// Cache directory could not be created
    #[error("failed to create cache directory {path}: {source}")]
    CacheDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// URL has no usable file name
    #[error("cannot derive a cache file name from URL '{url}'")]
    InvalidUrl { url: String },

    /// Download failed
    #[error(transparent)]
    Download(#[from] ResolverError),

    /// Reading or writing a cache file failed
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors related to template rendering
#[derive(Error, Debug)]
pub enum TemplateError {
    /// Template directory could not be listed
    #[error("failed to read template directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Template file could not be read
    #[error("failed to read template {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Rendering failed, e.g. an undefined variable
    #[error("failed to render template {path}: {message}")]
    RenderError { path: PathBuf, message: String },

    /// Rendered output could not be written
    #[error("failed to write {path}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl VersionError {
    /// Creates a new InvalidComponent error
    pub fn invalid_component(input: impl Into<String>, component: impl Into<String>) -> Self {
        VersionError::InvalidComponent {
            input: input.into(),
            component: component.into(),
        }
    }
}

impl ConfigError {
    /// Creates a new ParseError
    pub fn parse_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ConfigError::ParseError {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl ResolverError {
    /// Creates a new NetworkError
    pub fn network_error(url: impl Into<String>, message: impl Into<String>) -> Self {
        ResolverError::NetworkError {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Creates a new InvalidResponse error
    pub fn invalid_response(url: impl Into<String>, message: impl Into<String>) -> Self {
        ResolverError::InvalidResponse {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Creates a new NoVersionFound error
    pub fn no_version_found(component: impl Into<String>, source_desc: impl Into<String>) -> Self {
        ResolverError::NoVersionFound {
            component: component.into(),
            source_desc: source_desc.into(),
        }
    }
}

impl ManifestError {
    /// Creates a new ReadError
    pub fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ManifestError::ReadError {
            path: path.into(),
            source,
        }
    }

    /// Creates a new JsonParseError
    pub fn json_parse_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ManifestError::JsonParseError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new YamlParseError
    pub fn yaml_parse_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ManifestError::YamlParseError {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl ChecksumError {
    /// Creates a new Io error
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ChecksumError::Io {
            path: path.into(),
            source,
        }
    }
}
