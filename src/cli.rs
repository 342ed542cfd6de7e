//! CLI argument parsing module for flatup

use crate::checksum::DEFAULT_CACHE_DIR;
use crate::resolver::DEFAULT_GITHUB_API_URL;
use clap::Parser;
use std::path::PathBuf;

/// Update a Flatpak manifest for new versions of its components
#[derive(Parser, Debug, Clone)]
#[command(
    name = "flatup",
    version,
    about = "Update a Flatpak manifest for new versions of its components"
)]
pub struct CliArgs {
    /// Configuration file describing the runtime and tracked modules
    #[arg(short, long)]
    pub config: PathBuf,

    /// Current Flatpak manifest (JSON or YAML)
    #[arg(short, long)]
    pub manifest: PathBuf,

    /// Directory with .j2 templates to render
    #[arg(short, long)]
    pub template_dir: Option<PathBuf>,

    /// Directory where downloaded source archives are cached
    #[arg(long, default_value = DEFAULT_CACHE_DIR)]
    pub cache_dir: PathBuf,

    /// Base URL of the GitHub REST API
    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_GITHUB_API_URL)]
    pub github_api_url: String,

    /// Token for GitHub API requests
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// Dry run mode - report versions without downloading or rendering
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Output results in JSON format
    #[arg(long)]
    pub json: bool,

    /// Enable verbose output
    #[arg(long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Enable quiet mode - minimal output
    #[arg(short, long)]
    pub quiet: bool,
}

impl CliArgs {
    /// Whether spinners should be drawn
    pub fn show_progress(&self) -> bool {
        !self.quiet && !self.json
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse(extra: &[&str]) -> CliArgs {
        let mut args = vec!["flatup", "-c", "config.yaml", "-m", "app.json"];
        args.extend(extra);
        CliArgs::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_required_args() {
        assert!(CliArgs::try_parse_from(["flatup"]).is_err());
        assert!(CliArgs::try_parse_from(["flatup", "-c", "config.yaml"]).is_err());
        assert!(CliArgs::try_parse_from(["flatup", "-m", "app.json"]).is_err());
    }

    #[test]
    fn test_default_args() {
        let args = parse(&[]);
        assert_eq!(args.config, PathBuf::from("config.yaml"));
        assert_eq!(args.manifest, PathBuf::from("app.json"));
        assert!(args.template_dir.is_none());
        assert_eq!(args.cache_dir, PathBuf::from(".cache"));
        assert!(!args.dry_run);
        assert!(!args.json);
        assert!(!args.verbose);
        assert!(!args.quiet);
        assert!(args.show_progress());
    }

    #[test]
    fn test_long_flags() {
        let args = CliArgs::try_parse_from([
            "flatup",
            "--config",
            "c.yaml",
            "--manifest",
            "m.yaml",
            "--template-dir",
            "templates",
            "--cache-dir",
            "/tmp/cache",
        ])
        .unwrap();
        assert_eq!(args.config, PathBuf::from("c.yaml"));
        assert_eq!(args.manifest, PathBuf::from("m.yaml"));
        assert_eq!(args.template_dir, Some(PathBuf::from("templates")));
        assert_eq!(args.cache_dir, PathBuf::from("/tmp/cache"));
    }

    #[test]
    fn test_template_dir_short_flag() {
        let args = parse(&["-t", "templates"]);
        assert_eq!(args.template_dir, Some(PathBuf::from("templates")));
    }

    #[test]
    fn test_github_api_url_flag() {
        let args = parse(&["--github-api-url", "http://127.0.0.1:8080"]);
        assert_eq!(args.github_api_url, "http://127.0.0.1:8080");
    }

    #[test]
    fn test_dry_run_flags() {
        assert!(parse(&["-n"]).dry_run);
        assert!(parse(&["--dry-run"]).dry_run);
    }

    #[test]
    fn test_json_disables_progress() {
        let args = parse(&["--json"]);
        assert!(args.json);
        assert!(!args.show_progress());
    }

    #[test]
    fn test_quiet_flags() {
        assert!(parse(&["-q"]).quiet);
        assert!(!parse(&["--quiet"]).show_progress());
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        let result = CliArgs::try_parse_from([
            "flatup", "-c", "c.yaml", "-m", "m.json", "--verbose", "--quiet",
        ]);
        assert!(result.is_err());
    }
}
