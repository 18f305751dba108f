use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::ratelimit::DEFAULT_FALLBACK_WAIT;

pub const DEFAULT_API_URL: &str = "https://api.github.com";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    pub api_url: String,
    pub token_env: Option<String>,
    pub max_rate_limit_wait_secs: Option<u64>,
    /// Wait for a rate limit that names no delay of its own
    pub rate_limit_fallback_secs: u64,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token_env: Some("GITHUB_TOKEN".to_string()),
            max_rate_limit_wait_secs: None,
            rate_limit_fallback_secs: DEFAULT_FALLBACK_WAIT.as_secs(),
        }
    }
}

impl GitHubConfig {
    /// Token from the configured environment variable, if set and non-empty
    pub fn token(&self) -> Option<String> {
        let var = self.token_env.as_deref()?;
        std::env::var(var).ok().filter(|t| !t.trim().is_empty())
    }

    pub fn max_rate_limit_wait(&self) -> Option<Duration> {
        self.max_rate_limit_wait_secs.map(Duration::from_secs)
    }

    pub fn rate_limit_fallback(&self) -> Duration {
        Duration::from_secs(self.rate_limit_fallback_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub table_height: u16,
    pub tick_rate_ms: u64,
    pub render_rate_ms: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            table_height: 25,
            tick_rate_ms: 100,
            render_rate_ms: 16, // ~60fps
        }
    }
}

impl UiConfig {
    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms.max(1))
    }

    pub fn render_rate(&self) -> Duration {
        Duration::from_millis(self.render_rate_ms.max(1))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub filter: String,
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "warn".to_string(),
            file: None,
        }
    }
}

impl LogConfig {
    /// Explicit log file, or ~/.cache/gfi/gfi.log (Linux) / ~/Library/Caches/gfi/gfi.log (macOS)
    pub fn file_path(&self) -> Option<PathBuf> {
        match &self.file {
            Some(path) => Some(path.clone()),
            None => Some(dirs::cache_dir()?.join("gfi").join("gfi.log")),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub github: GitHubConfig,
    pub ui: UiConfig,
    pub log: LogConfig,
}

fn config_path() -> Option<PathBuf> {
    let config_dir = dirs::config_dir()?;
    Some(config_dir.join("gfi").join("config.toml"))
}

impl Config {
    pub fn load() -> Self {
        let Some(path) = config_path() else {
            return Config::default();
        };

        let Ok(content) = std::fs::read_to_string(&path) else {
            return Config::default();
        };

        Self::parse(&content).unwrap_or_default()
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str::<Config>(content)
    }
}
