use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

pub const DEFAULT_API_URL: &str = "https://api.github.com";
const DEFAULT_CONFIG_PATH: &str = ".github/teamsync.toml";

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub github: GitHubConfig,
    #[serde(default)]
    pub progress: ProgressConfig,
    /// Keyed by team code.
    #[serde(default)]
    pub teams: BTreeMap<String, TeamConfig>,
}

#[derive(Debug, Deserialize)]
pub struct GitHubConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Repositories searched in sweep mode, as API URLs or `owner/repo`.
    #[serde(default)]
    pub issue_repositories: Vec<String>,
    #[serde(default)]
    pub dry_run: bool,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            issue_repositories: Vec::new(),
            dry_run: false,
        }
    }
}

impl GitHubConfig {
    /// `issue_repositories` as API URLs; `owner/repo` entries are resolved
    /// against `api_url`.
    pub fn repository_urls(&self) -> Vec<String> {
        let base = self.api_url.trim_end_matches('/');
        self.issue_repositories
            .iter()
            .map(|entry| {
                let entry = entry.trim();
                if entry.starts_with("http://") || entry.starts_with("https://") {
                    entry.to_string()
                } else {
                    format!("{base}/repos/{}", entry.trim_matches('/'))
                }
            })
            .collect()
    }
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

#[derive(Debug, Deserialize)]
pub struct ProgressConfig {
    #[serde(default = "default_ranks")]
    pub ranks: HashMap<String, i64>,
    /// Explicit label -> column name overrides.
    #[serde(default)]
    pub columns: HashMap<String, String>,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            ranks: default_ranks(),
            columns: HashMap::new(),
        }
    }
}

fn default_ranks() -> HashMap<String, i64> {
    [
        ("0 - Backlog", 0),
        ("1 - Ready", 1),
        ("2 - Working", 2),
        ("3 - Complete", 3),
    ]
    .into_iter()
    .map(|(label, rank)| (label.to_string(), rank))
    .collect()
}

#[derive(Debug, Deserialize, Default)]
pub struct TeamConfig {
    #[serde(default)]
    pub members: Vec<String>,
    #[serde(default)]
    pub board: Option<String>,
}

/// Secrets and event data read from the process environment.
#[derive(Debug, Clone, Default)]
pub struct Env {
    pub token: Option<String>,
    pub context: Option<String>,
}

impl Env {
    pub fn from_env() -> Self {
        Self {
            token: std::env::var("GITHUB_TOKEN").ok().filter(|s| !s.is_empty()),
            context: std::env::var("GITHUB_CONTEXT")
                .ok()
                .filter(|s| !s.trim().is_empty()),
        }
    }
}

/// Resolve the config path: explicit flag, then `TEAMSYNC_CONFIG`, then the repo default.
pub fn config_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    std::env::var("TEAMSYNC_CONFIG")
        .ok()
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

pub fn load_config(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        tracing::warn!(path = %path.display(), "config file not found, using defaults");
        return Ok(AppConfig::default());
    }
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;
    parse_config(&contents).with_context(|| format!("Failed to parse {}", path.display()))
}

pub fn parse_config(contents: &str) -> Result<AppConfig> {
    let config: AppConfig = toml::from_str(contents)?;
    Ok(config)
}
