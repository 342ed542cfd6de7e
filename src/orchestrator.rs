//! Update orchestrator for coordinating the entire update workflow
//!
//! This module provides:
//! - Workflow coordination: load → lookup → diff → checksum → render
//! - Concurrent version lookups, one per component
//! - Dry-run mode support
//!
//! Any failure aborts the run before a single output file is written.

use crate::checksum::ChecksumFetcher;
use crate::cli::CliArgs;
use crate::config::Config;
use crate::domain::{RunSummary, Version};
use crate::error::AppError;
use crate::manifest::Manifest;
use crate::progress::Progress;
use crate::resolver::{create_resolver, HttpClient};
use crate::template::{build_variables, plan_variables, TemplateRenderer};
use futures::future::try_join_all;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Orchestrator for coordinating the update workflow
pub struct Orchestrator {
    /// CLI arguments for configuration
    args: CliArgs,
    /// HTTP client shared by resolvers and downloads
    client: HttpClient,
}

impl Orchestrator {
    /// Create a new orchestrator with the given CLI arguments
    pub fn new(args: CliArgs) -> Result<Self, AppError> {
        let client = HttpClient::new()?.with_github_token(args.github_token.clone());
        Ok(Self { args, client })
    }

    /// Create an orchestrator with a custom HTTP client (for testing)
    pub fn with_client(args: CliArgs, client: HttpClient) -> Self {
        Self { args, client }
    }

    /// Run the update workflow
    pub async fn run(&self) -> Result<RunSummary, AppError> {
        self.run_with_progress(self.args.show_progress()).await
    }

    /// Run the update workflow with optional progress display
    pub async fn run_with_progress(&self, show_progress: bool) -> Result<RunSummary, AppError> {
        let mut progress = Progress::new(show_progress);
        let mut summary = RunSummary::new(self.args.dry_run);

        // Step 1: Load the config, then look up versions while reading the manifest
        let config = Config::load(&self.args.config)?;

        progress.spinner("Looking up latest versions...");
        let manifest_path = self.args.manifest.clone();
        let lookup = lookup_versions(&config, &self.client, &self.args.github_api_url);
        let read_manifest = async move { Manifest::load(&manifest_path).map_err(AppError::from) };
        let result = tokio::try_join!(lookup, read_manifest);
        progress.finish_and_clear();
        let (latest, manifest) = result?;

        // Step 2: Diff against the pinned versions
        let current = manifest.current_versions()?;
        let plan = plan_variables(&config, &current, &latest, &manifest)?;
        summary.components = plan.updates.clone();

        if self.args.dry_run {
            debug!(pending = plan.pending_checksums.len(), "dry run, skipping downloads");
            return Ok(summary);
        }

        // Step 3: Fresh digests for updated modules
        if !plan.pending_checksums.is_empty() {
            progress.spinner(format!(
                "Fetching {} source archive(s)...",
                plan.pending_checksums.len()
            ));
        }
        let fetcher = ChecksumFetcher::new(self.client.clone(), &self.args.cache_dir);
        let result = build_variables(plan, &fetcher).await;
        progress.finish_and_clear();
        let (vars, _) = result?;

        // Step 4: Render templates
        if let Some(template_dir) = &self.args.template_dir {
            progress.spinner("Rendering templates...");
            let result = TemplateRenderer::new(&vars).render_dir(template_dir);
            progress.finish_and_clear();
            summary.rendered = result?;
        }

        Ok(summary)
    }
}

/// Resolve the latest version of the runtime and every module concurrently
///
/// Results are keyed by component name; the first failing lookup fails the
/// whole batch.
pub async fn lookup_versions(
    config: &Config,
    client: &HttpClient,
    github_api_url: &str,
) -> Result<BTreeMap<String, Version>, AppError> {
    let resolvers = config
        .lookups()
        .into_iter()
        .map(|(name, spec)| Ok((name, create_resolver(spec, client.clone(), github_api_url)?)))
        .collect::<Result<Vec<_>, AppError>>()?;

    let lookups = resolvers.iter().map(|(name, resolver)| async move {
        let version = resolver.latest_version(name).await?;
        info!(component = *name, version = %version, kind = resolver.kind(), "resolved");
        Ok::<_, AppError>((name.to_string(), version))
    });

    Ok(try_join_all(lookups).await?.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use mockito::Server;
    use std::fs;
    use tempfile::TempDir;

    fn make_args(dir: &std::path::Path, extra: &[&str]) -> CliArgs {
        let config = dir.join("config.yaml");
        let manifest = dir.join("app.yaml");
        let cache = dir.join("cache");
        let mut args = vec![
            "flatup".to_string(),
            "-c".to_string(),
            config.display().to_string(),
            "-m".to_string(),
            manifest.display().to_string(),
            "--cache-dir".to_string(),
            cache.display().to_string(),
        ];
        args.extend(extra.iter().map(|s| s.to_string()));
        CliArgs::parse_from(args)
    }

    async fn mock_releases(server: &mut Server, project: &str, names: &[&str]) -> mockito::Mock {
        let body = names
            .iter()
            .map(|n| format!(r#"{{"name": "{0}", "tag_name": "{0}", "published_at": null}}"#, n))
            .collect::<Vec<_>>()
            .join(",");
        server
            .mock("GET", format!("/repos/{}/releases", project).as_str())
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(format!("[{}]", body))
            .create_async()
            .await
    }

    fn write_fixtures(dir: &std::path::Path, server_url: &str) {
        let config = format!(
            r#"
runtime:
  get_version: {{type: github_releases, project: o/runtime}}
modules:
  - name: foo
    source_url: {0}/dl/foo-{{version}}.tar.gz
    get_version:
      type: github_releases
      project: o/foo
      substitutions: [["v", ""]]
  - name: bar
    source_url: {0}/dl/bar-{{version}}.tar.gz
    get_version:
      type: scrape
      url: {0}/bar/downloads
      regex: 'bar-([0-9.]+)\.tar\.gz'
"#,
            server_url
        );
        fs::write(dir.join("config.yaml"), config).unwrap();

        let manifest = format!(
            r#"
runtime-version: '46'
modules:
  - name: foo
    sources:
      - url: {0}/dl/foo-1.0.0.tar.gz
        sha256: old-foo-digest
  - name: bar
    sources:
      - url: {0}/dl/bar-2.0.tar.gz
        sha256: pinned-bar-digest
"#,
            server_url
        );
        fs::write(dir.join("app.yaml"), manifest).unwrap();
    }

    #[tokio::test]
    async fn test_lookup_versions_keys_by_component() {
        let mut server = Server::new_async().await;
        let _rt = mock_releases(&mut server, "o/runtime", &["46", "47"]).await;
        let _foo = mock_releases(&mut server, "o/foo", &["v1.1.0", "nightly", "v1.0.0"]).await;
        let _bar = server
            .mock("GET", "/bar/downloads")
            .with_body("bar-2.0.tar.gz bar-1.9.tar.gz")
            .create_async()
            .await;

        let dir = TempDir::new().unwrap();
        write_fixtures(dir.path(), &server.url());
        let config = Config::load(&dir.path().join("config.yaml")).unwrap();

        let versions = lookup_versions(&config, &HttpClient::new().unwrap(), &server.url())
            .await
            .unwrap();

        assert_eq!(versions.len(), 3);
        assert_eq!(versions["runtime"].to_string(), "47");
        assert_eq!(versions["foo"].to_string(), "1.1.0");
        assert_eq!(versions["bar"].to_string(), "2.0");
    }

    #[tokio::test]
    async fn test_lookup_versions_fails_on_any_error() {
        let mut server = Server::new_async().await;
        let _rt = mock_releases(&mut server, "o/runtime", &["47"]).await;
        let _foo = mock_releases(&mut server, "o/foo", &["v1.1.0"]).await;
        let _bar = server
            .mock("GET", "/bar/downloads")
            .with_status(503)
            .create_async()
            .await;

        let dir = TempDir::new().unwrap();
        write_fixtures(dir.path(), &server.url());
        let config = Config::load(&dir.path().join("config.yaml")).unwrap();

        let result = lookup_versions(&config, &HttpClient::new().unwrap(), &server.url()).await;
        assert!(matches!(result, Err(AppError::Resolver(_))));
    }

    #[tokio::test]
    async fn test_run_renders_fresh_digest() {
        let mut server = Server::new_async().await;
        let _rt = mock_releases(&mut server, "o/runtime", &["47"]).await;
        let _foo = mock_releases(&mut server, "o/foo", &["v1.1.0", "v1.0.0"]).await;
        let _bar = server
            .mock("GET", "/bar/downloads")
            .with_body("bar-2.0.tar.gz")
            .create_async()
            .await;
        let foo_archive = server
            .mock("GET", "/dl/foo-1.1.0.tar.gz")
            .with_body("hello world\n")
            .expect(1)
            .create_async()
            .await;
        let bar_archive = server
            .mock("GET", "/dl/bar-2.0.tar.gz")
            .expect(0)
            .create_async()
            .await;

        let dir = TempDir::new().unwrap();
        write_fixtures(dir.path(), &server.url());
        let templates = dir.path().join("templates");
        fs::create_dir(&templates).unwrap();
        fs::write(
            templates.join("app.yaml.j2"),
            "runtime-version: '{{ runtime_version }}'\nfoo: {{ foo_version }} {{ foo_sha256 }}\nbar: {{ bar_sha256 }}\n",
        )
        .unwrap();

        let args = make_args(
            dir.path(),
            &["-t", templates.to_str().unwrap(), "--github-api-url", &server.url()],
        );
        let summary = Orchestrator::new(args)
            .unwrap()
            .run_with_progress(false)
            .await
            .unwrap();

        foo_archive.assert_async().await;
        bar_archive.assert_async().await;
        assert_eq!(summary.update_count(), 2);
        assert_eq!(summary.rendered, vec![templates.join("app.yaml")]);
        assert_eq!(
            fs::read_to_string(templates.join("app.yaml")).unwrap(),
            "runtime-version: '47'\n\
             foo: 1.1.0 a948904f2f0f479b8f8197694b30184b0d2ed1c1cd2a1ec0fb85d299a192a447\n\
             bar: pinned-bar-digest\n"
        );
    }

    #[tokio::test]
    async fn test_dry_run_skips_downloads_and_rendering() {
        let mut server = Server::new_async().await;
        let _rt = mock_releases(&mut server, "o/runtime", &["47"]).await;
        let _foo = mock_releases(&mut server, "o/foo", &["v1.1.0"]).await;
        let _bar = server
            .mock("GET", "/bar/downloads")
            .with_body("bar-2.0.tar.gz")
            .create_async()
            .await;
        let archive = server
            .mock("GET", "/dl/foo-1.1.0.tar.gz")
            .expect(0)
            .create_async()
            .await;

        let dir = TempDir::new().unwrap();
        write_fixtures(dir.path(), &server.url());
        let templates = dir.path().join("templates");
        fs::create_dir(&templates).unwrap();
        fs::write(templates.join("app.yaml.j2"), "{{ foo_sha256 }}").unwrap();

        let args = make_args(
            dir.path(),
            &["-n", "-t", templates.to_str().unwrap(), "--github-api-url", &server.url()],
        );
        let summary = Orchestrator::new(args)
            .unwrap()
            .run_with_progress(false)
            .await
            .unwrap();

        archive.assert_async().await;
        assert!(summary.dry_run);
        assert_eq!(summary.components.len(), 3);
        assert!(summary.rendered.is_empty());
        assert!(!templates.join("app.yaml").exists());
        assert!(!dir.path().join("cache").exists());
    }

    #[tokio::test]
    async fn test_run_missing_config() {
        let dir = TempDir::new().unwrap();
        let args = make_args(dir.path(), &[]);
        let result = Orchestrator::new(args)
            .unwrap()
            .run_with_progress(false)
            .await;
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
