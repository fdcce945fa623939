use chrono::Duration;
use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::search::DEFAULT_SEARCH_KIND;

const DEFAULT_API_BASE_URL: &str = "https://pmr.abi.auckland.ac.nz";
const DEFAULT_MODELS_URL: &str = "https://models.physiomeproject.org";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub api: ApiConfig,
  #[serde(default)]
  pub cache: CacheConfig,
  #[serde(default)]
  pub search: SearchConfig,
  /// Custom title printed above listings (defaults to the API host if not set)
  pub title: Option<String>,
  /// Site notice shown until dismissed
  pub notice: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
  /// Backend API root, without a trailing slash
  #[serde(default = "default_base_url")]
  pub base_url: String,
  /// Appended to the POST endpoint names (e.g. "_v2")
  #[serde(default)]
  pub suffix: String,
  /// Public site serving workspace and COMBINE archives
  #[serde(default = "default_models_url")]
  pub models_url: String,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      base_url: default_base_url(),
      suffix: String::new(),
      models_url: default_models_url(),
    }
  }
}

fn default_base_url() -> String {
  DEFAULT_API_BASE_URL.to_string()
}

fn default_models_url() -> String {
  DEFAULT_MODELS_URL.to_string()
}

/// Lifetimes of the list caches, in seconds.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
  #[serde(default = "default_exposures_ttl")]
  pub exposures_ttl_secs: i64,
  #[serde(default = "default_short_ttl")]
  pub workspaces_ttl_secs: i64,
  #[serde(default = "default_short_ttl")]
  pub search_ttl_secs: i64,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      exposures_ttl_secs: default_exposures_ttl(),
      workspaces_ttl_secs: default_short_ttl(),
      search_ttl_secs: default_short_ttl(),
    }
  }
}

fn default_exposures_ttl() -> i64 {
  24 * 60 * 60
}

fn default_short_ttl() -> i64 {
  30 * 60
}

impl CacheConfig {
  pub fn exposures_ttl(&self) -> Result<Duration> {
    ttl("exposures", self.exposures_ttl_secs)
  }

  pub fn workspaces_ttl(&self) -> Result<Duration> {
    ttl("workspaces", self.workspaces_ttl_secs)
  }

  pub fn search_ttl(&self) -> Result<Duration> {
    ttl("search", self.search_ttl_secs)
  }
}

fn ttl(name: &str, secs: i64) -> Result<Duration> {
  Duration::try_seconds(secs)
    .ok_or_else(|| eyre!("Invalid {} cache TTL: {} seconds", name, secs))
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
  /// Index kinds shown as search categories
  #[serde(default = "default_kinds", deserialize_with = "deserialize_trimmed_set")]
  pub kinds: BTreeSet<String>,
}

impl Default for SearchConfig {
  fn default() -> Self {
    Self {
      kinds: default_kinds(),
    }
  }
}

fn default_kinds() -> BTreeSet<String> {
  BTreeSet::from([DEFAULT_SEARCH_KIND.to_string()])
}

fn deserialize_trimmed_set<'de, D>(deserializer: D) -> Result<BTreeSet<String>, D::Error>
where
  D: serde::Deserializer<'de>,
{
  let v: Vec<String> = Vec::deserialize(deserializer)?;
  Ok(v.into_iter().map(|s| s.trim().to_string()).collect())
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./pmrview.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/pmrview/config.yaml
  ///
  /// Falls back to built-in defaults when no file is found. The
  /// `PMRVIEW_API_BASE_URL` environment variable overrides the base URL.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    let mut config = match path {
      Some(p) => Self::load_from_path(&p)?,
      None => {
        tracing::debug!("no configuration file found, using defaults");
        Config::default()
      }
    };

    if let Ok(base_url) = std::env::var("PMRVIEW_API_BASE_URL") {
      config.api.base_url = base_url;
    }
    config.api.base_url = config.api.base_url.trim_end_matches('/').to_string();

    Ok(config)
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("pmrview.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("pmrview").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::from_yaml(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn from_yaml(contents: &str) -> Result<Self> {
    let config: Config = serde_yaml::from_str(contents).map_err(|e| eyre!("{}", e))?;
    Ok(config)
  }

  /// Title for listing headers, falling back to the API host.
  pub fn display_title(&self) -> String {
    if let Some(title) = &self.title {
      return title.clone();
    }
    url::Url::parse(&self.api.base_url)
      .ok()
      .and_then(|u| u.host_str().map(String::from))
      .unwrap_or_else(|| self.api.base_url.clone())
  }

  /// Get the login password from environment variables.
  ///
  /// Checks PMRVIEW_PASSWORD.
  pub fn get_password() -> Result<String> {
    std::env::var("PMRVIEW_PASSWORD")
      .map_err(|_| eyre!("Password not found. Set PMRVIEW_PASSWORD environment variable."))
  }
}
