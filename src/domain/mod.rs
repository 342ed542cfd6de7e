//! Core domain models for flatup
//!
//! This module contains the fundamental types used throughout the application:
//! - Dotted numeric versions with optional release dates
//! - Component and resolver specifications
//! - Update decisions and the run summary

mod component;
mod update_result;
mod version;

pub use component::{ComponentSpec, ResolverSpec, RuntimeSpec, VERSION_PLACEHOLDER};
pub use update_result::{ComponentUpdate, RunSummary, UpdateStatus};
pub use version::Version;

/// Name under which the runtime is tracked
pub const RUNTIME_NAME: &str = "runtime";
