//! Template rendering with Tera
//!
//! Every `*.j2` file in the template directory is rendered against the
//! variable environment and written next to it with the `.j2` suffix
//! stripped (`org.example.App.json.j2` -> `org.example.App.json`).
//! Referencing a variable that is not set is an error.

use crate::error::TemplateError;
use crate::template::TemplateVars;
use std::error::Error as _;
use std::fs;
use std::path::{Path, PathBuf};
use tera::{Context as TeraContext, Tera};
use tracing::info;

/// Extension marking template files
pub const TEMPLATE_EXTENSION: &str = "j2";

/// Renders manifest templates
pub struct TemplateRenderer {
    context: TeraContext,
}

impl TemplateRenderer {
    /// Create a renderer for a variable environment
    pub fn new(vars: &TemplateVars) -> Self {
        let mut context = TeraContext::new();
        for (name, value) in vars.iter() {
            context.insert(name, value);
        }
        Self { context }
    }

    /// Render template text
    pub fn render_str(&self, template: &str, path: &Path) -> Result<String, TemplateError> {
        Tera::one_off(template, &self.context, false).map_err(|e| TemplateError::RenderError {
            path: path.to_path_buf(),
            message: error_chain(&e),
        })
    }

    /// Render every template in `dir`, in file-name order
    ///
    /// All templates are rendered in memory before any output is written,
    /// so a failing template leaves every output untouched.
    pub fn render_dir(&self, dir: &Path) -> Result<Vec<PathBuf>, TemplateError> {
        let templates = discover_templates(dir)?;

        let mut rendered = Vec::with_capacity(templates.len());
        for path in &templates {
            let content = fs::read_to_string(path).map_err(|e| TemplateError::ReadError {
                path: path.clone(),
                source: e,
            })?;
            rendered.push((output_path(path), self.render_str(&content, path)?));
        }

        let mut written = Vec::with_capacity(rendered.len());
        for (output, text) in rendered {
            fs::write(&output, text).map_err(|e| TemplateError::WriteError {
                path: output.clone(),
                source: e,
            })?;
            info!(output = %output.display(), "rendered");
            written.push(output);
        }
        Ok(written)
    }
}

/// Template files in `dir`, sorted by name
pub fn discover_templates(dir: &Path) -> Result<Vec<PathBuf>, TemplateError> {
    let read_dir_error = |e| TemplateError::ReadDir {
        path: dir.to_path_buf(),
        source: e,
    };

    let mut templates = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_dir_error)? {
        let path = entry.map_err(read_dir_error)?.path();
        let is_template = path.extension().and_then(|e| e.to_str()) == Some(TEMPLATE_EXTENSION);
        if is_template && path.is_file() {
            templates.push(path);
        }
    }
    templates.sort();
    Ok(templates)
}

/// Output path for a template: the same path without the `.j2` suffix
pub fn output_path(template_path: &Path) -> PathBuf {
    template_path.with_extension("")
}

/// Tera wraps the useful message (e.g. the undefined variable) in its source chain
fn error_chain(err: &tera::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = inner.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn vars() -> TemplateVars {
        let mut vars = TemplateVars::new();
        vars.insert("runtime_version", "47");
        vars.insert("foo_version", "1.1.0");
        vars.insert("foo_sha256", "abc123");
        vars
    }

    #[test]
    fn test_render_str() {
        let renderer = TemplateRenderer::new(&vars());
        let out = renderer
            .render_str(
                "runtime-version: '{{ runtime_version }}'\nsha256: {{foo_sha256}}\n",
                Path::new("t.j2"),
            )
            .unwrap();
        assert_eq!(out, "runtime-version: '47'\nsha256: abc123\n");
    }

    #[test]
    fn test_render_no_html_escaping() {
        let mut v = vars();
        v.insert("foo_source_url", "https://example.com/a?x=1&y=<2>");
        let renderer = TemplateRenderer::new(&v);
        let out = renderer
            .render_str("{{ foo_source_url }}", Path::new("t.j2"))
            .unwrap();
        assert_eq!(out, "https://example.com/a?x=1&y=<2>");
    }

    #[test]
    fn test_render_undefined_variable() {
        let renderer = TemplateRenderer::new(&vars());
        let result = renderer.render_str("{{ bar_version }}", Path::new("t.j2"));
        match result {
            Err(TemplateError::RenderError { message, .. }) => {
                assert!(message.contains("bar_version"), "message: {}", message)
            }
            other => panic!("expected render error, got {:?}", other),
        }
    }

    #[test]
    fn test_output_path() {
        assert_eq!(
            output_path(Path::new("/t/org.example.App.json.j2")),
            PathBuf::from("/t/org.example.App.json")
        );
    }

    #[test]
    fn test_render_dir() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.yaml.j2"), "v: {{ foo_version }}\n").unwrap();
        fs::write(dir.path().join("a.json.j2"), "{\"v\": \"{{ runtime_version }}\"}").unwrap();
        fs::write(dir.path().join("notes.txt"), "{{ not rendered }}").unwrap();

        let written = TemplateRenderer::new(&vars()).render_dir(dir.path()).unwrap();

        assert_eq!(
            written,
            vec![dir.path().join("a.json"), dir.path().join("b.yaml")]
        );
        assert_eq!(
            fs::read_to_string(dir.path().join("a.json")).unwrap(),
            "{\"v\": \"47\"}"
        );
        assert_eq!(
            fs::read_to_string(dir.path().join("b.yaml")).unwrap(),
            "v: 1.1.0\n"
        );
        assert!(!dir.path().join("notes").exists());
    }

    #[test]
    fn test_render_dir_failure_writes_nothing() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.yaml.j2"), "v: {{ foo_version }}\n").unwrap();
        fs::write(dir.path().join("b.yaml.j2"), "v: {{ missing }}\n").unwrap();

        let result = TemplateRenderer::new(&vars()).render_dir(dir.path());

        assert!(matches!(result, Err(TemplateError::RenderError { .. })));
        assert!(!dir.path().join("a.yaml").exists());
    }

    #[test]
    fn test_render_dir_missing_directory() {
        let result = TemplateRenderer::new(&vars()).render_dir(Path::new("/nonexistent/templates"));
        assert!(matches!(result, Err(TemplateError::ReadDir { .. })));
    }
}
