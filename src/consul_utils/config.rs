use crate::error::{ConsulUtilsError, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILENAME: &str = "consul-utils.yaml";

/// Resolved settings for one command invocation.
///
/// Built once by the CLI (file, then flags) and handed to the API by value.
/// Every section has serde defaults so partial YAML files are fine.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub consul: ConsulConfig,
    pub default_root: String,
    pub cache: CacheConfig,
    pub reporter: ReporterConfig,
    pub log: LogConfig,
    pub search: SearchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ConsulConfig {
    pub host: String,
    pub port: u16,
    pub scheme: String,
    pub token: String,
}

impl Default for ConsulConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8500,
            scheme: "http".to_string(),
            token: String::new(),
        }
    }
}

impl ConsulConfig {
    pub fn base_url(&self) -> String {
        format!("{}://{}:{}", self.scheme, self.host, self.port)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    pub dir: PathBuf,
    /// Seconds before a cached snapshot expires.
    pub ttl: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: PathBuf::from(".consul_cache"),
            ttl: 600,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ReporterConfig {
    /// `text`, `csv` or `json`. Validated when the report is rendered.
    pub output_type: String,
    /// Empty means stdout.
    pub output_file: String,
    pub show_all_scan: bool,
    pub show_filtered: bool,
    pub show_non_filtered: bool,
    pub show_flags: bool,
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            output_type: "text".to_string(),
            output_file: String::new(),
            show_all_scan: false,
            show_filtered: true,
            show_non_filtered: false,
            show_flags: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "error".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SearchField {
    #[default]
    #[serde(alias = "key")]
    Keys,
    #[serde(alias = "value")]
    Values,
}

impl std::str::FromStr for SearchField {
    type Err = ConsulUtilsError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "keys" | "key" => Ok(SearchField::Keys),
            "values" | "value" => Ok(SearchField::Values),
            other => Err(ConsulUtilsError::Config(format!(
                "Invalid search field {other}, expected keys or values"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SearchConfig {
    pub query: Option<String>,
    pub regex: bool,
    pub fields: SearchField,
    pub limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            query: None,
            regex: false,
            fields: SearchField::Keys,
            limit: 10,
        }
    }
}

/// Connection overrides for one side of a paired command (`--host1`, `--root2`...).
/// Unset fields fall back to the shared settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SideOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub scheme: Option<String>,
    pub token: Option<String>,
    pub root: Option<String>,
}

impl Settings {
    /// Load settings from a YAML file. An empty file yields the defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ConsulUtilsError::Config(format!("Cannot read config file {}: {e}", path.display()))
        })?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let settings: Settings = serde_yaml::from_str(&content)?;
        Ok(settings)
    }

    /// Load the explicit config file if given, else the user-level file if it
    /// exists, else the defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match user_config_path() {
            Some(path) if path.exists() => Self::load(path),
            _ => Ok(Self::default()),
        }
    }

    /// Settings for one side of a paired command.
    pub fn for_side(&self, overrides: &SideOverrides) -> Settings {
        let mut side = self.clone();
        if let Some(host) = non_empty(&overrides.host) {
            side.consul.host = host.to_string();
        }
        if let Some(port) = overrides.port {
            side.consul.port = port;
        }
        if let Some(scheme) = non_empty(&overrides.scheme) {
            side.consul.scheme = scheme.to_string();
        }
        if let Some(token) = non_empty(&overrides.token) {
            side.consul.token = token.to_string();
        }
        if let Some(root) = non_empty(&overrides.root) {
            side.default_root = root.to_string();
        }
        side
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

pub fn user_config_path() -> Option<PathBuf> {
    ProjectDirs::from("com", "consul-utils", "consul-utils")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILENAME))
}
