//! flatup - Flatpak manifest updater library
//!
//! This library provides the core functionality for keeping a Flatpak
//! manifest current:
//! - Latest-version lookups (web page scraping, GitHub branches, releases and tags)
//! - Comparison against the versions pinned in the manifest
//! - SHA-256 digests of new source archives, with a download cache
//! - Rendering of manifest templates

pub mod checksum;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod manifest;
pub mod orchestrator;
pub mod output;
pub mod progress;
pub mod resolver;
pub mod template;
