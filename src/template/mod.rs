//! Manifest template variables and rendering
//!
//! This module provides:
//! - The flat variable environment built from resolved versions
//! - The fresh-digest decision per module
//! - Tera rendering of `*.j2` templates

mod renderer;
mod variables;

pub use renderer::{discover_templates, output_path, TemplateRenderer, TEMPLATE_EXTENSION};
pub use variables::{build_variables, plan_variables, TemplateVars, VariablePlan};
