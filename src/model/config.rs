use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

pub const DEFAULT_API_BASE: &str = "https://www.transifex.com/api/2";
const CACHE_DIR_NAME: &str = ".transifex";

fn default_content_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_source_language() -> String {
    "en".to_string()
}

fn default_target_language() -> String {
    "zh-Hant".to_string()
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_window_secs() -> u64 {
    3600
}

fn default_max_requests() -> u32 {
    6000
}

fn default_request_timeout_secs() -> u64 {
    60
}

/// Where the plain target-language text of each resource is dumped.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RawDumpMode {
    /// `<cache_dir>/<slug>.<lang>.txt`, next to the cache entry.
    #[default]
    Separate,
    /// Over the cache entry itself (`<cache_dir>/<slug>`). Legacy layout:
    /// the next run can no longer decode that entry.
    SharedWithCache,
    Off,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TransifexConfig {
    #[serde(default)]
    pub project: String,

    #[serde(default)]
    pub username: String,

    #[serde(default, skip_serializing)]
    pub password: String,

    #[serde(default = "default_api_base")]
    pub api_base: String,
}

impl Default for TransifexConfig {
    fn default() -> Self {
        Self {
            project: String::new(),
            username: String::new(),
            password: String::new(),
            api_base: default_api_base(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,

    #[serde(default = "default_max_requests")]
    pub max_requests: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_secs: default_window_secs(),
            max_requests: default_max_requests(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    #[serde(default = "default_content_root", alias = "root")]
    pub content_root: PathBuf,

    /// Defaults to `<content_root>/.transifex`.
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,

    #[serde(default = "default_source_language", alias = "source_lang")]
    pub source_language: String,

    #[serde(default = "default_target_language", alias = "target_lang")]
    pub target_language: String,

    #[serde(default)]
    pub raw_dump: RawDumpMode,

    #[serde(default)]
    pub transifex: TransifexConfig,

    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            content_root: default_content_root(),
            cache_dir: None,
            source_language: default_source_language(),
            target_language: default_target_language(),
            raw_dump: RawDumpMode::default(),
            transifex: TransifexConfig::default(),
            rate_limit: RateLimitConfig::default(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl SyncConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&data).map_err(|source| ConfigError::Decode {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn cache_dir(&self) -> PathBuf {
        match &self.cache_dir {
            Some(dir) => dir.clone(),
            None => self.content_root.join(CACHE_DIR_NAME),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source_language.trim().is_empty() {
            return Err(ConfigError::Invalid("source_language must not be empty".into()));
        }
        if self.target_language.trim().is_empty() {
            return Err(ConfigError::Invalid("target_language must not be empty".into()));
        }
        if self.transifex.project.trim().is_empty() {
            return Err(ConfigError::Invalid("transifex.project is required".into()));
        }
        if self.rate_limit.max_requests == 0 || self.rate_limit.window_secs == 0 {
            return Err(ConfigError::Invalid(
                "rate_limit.window_secs and rate_limit.max_requests must be positive".into(),
            ));
        }
        Ok(())
    }
}
