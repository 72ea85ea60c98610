pub mod schema;

pub use schema::{
    AgentConfig, AskrouteConfig, ProviderConfig, RecipeConfig, SearchConfig, SummarizerConfig,
    WeatherConfig,
};

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub const DEEPSEEK_KEY_VAR: &str = "DEEPSEEK_API_KEY";
pub const ANTHROPIC_KEY_VAR: &str = "ANTHROPIC_API_KEY";
pub const TAVILY_KEY_VAR: &str = "TAVILY_API_KEY";

/// Default askroute home directory (~/.askroute).
pub fn default_home_dir() -> PathBuf {
    directories::BaseDirs::new()
        .map(|d| d.home_dir().join(".askroute"))
        .unwrap_or_else(|| PathBuf::from(".askroute"))
}

/// Default config file location.
pub fn default_config_path() -> PathBuf {
    default_home_dir().join("askroute.toml")
}

/// Resolve a path that may contain `~` to an absolute path.
pub fn resolve_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}

/// Load config from the given path, or return defaults.
pub fn load_config(path: &Path) -> Result<AskrouteConfig> {
    if path.exists() {
        let contents =
            std::fs::read_to_string(path).context("Failed to read askroute config file")?;
        let config: AskrouteConfig =
            toml::from_str(&contents).context("Failed to parse askroute config (TOML)")?;
        Ok(config)
    } else {
        Ok(AskrouteConfig::default())
    }
}

/// Save config to the given path (TOML format).
pub fn save_config(config: &AskrouteConfig, path: &Path) -> Result<()> {
    let contents = toml::to_string_pretty(config).context("Failed to serialize config")?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, contents).context("Failed to write config file")?;
    Ok(())
}

/// API keys, read once from the environment (and `.env`) at startup.
///
/// A missing key is not an error here; the capability that needs it reports
/// itself unavailable when called.
#[derive(Clone, Default)]
pub struct Secrets {
    pub deepseek_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub tavily_api_key: Option<String>,
}

impl Secrets {
    pub fn from_env() -> Self {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary lookup; blank values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());
        Self {
            deepseek_api_key: get(DEEPSEEK_KEY_VAR),
            anthropic_api_key: get(ANTHROPIC_KEY_VAR),
            tavily_api_key: get(TAVILY_KEY_VAR),
        }
    }
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mask = |k: &Option<String>| if k.is_some() { "set" } else { "missing" };
        f.debug_struct("Secrets")
            .field("deepseek_api_key", &mask(&self.deepseek_api_key))
            .field("anthropic_api_key", &mask(&self.anthropic_api_key))
            .field("tavily_api_key", &mask(&self.tavily_api_key))
            .finish()
    }
}
