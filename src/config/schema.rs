//! Configuration schema for askroute.toml.

use crate::types::RoutingPolicy;
use serde::{Deserialize, Serialize};

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AskrouteConfig {
    /// Provider used when none is named on the command line ("deepseek" or "claude").
    pub default_model: String,

    /// Routing policy used when none is named on the command line.
    pub policy: RoutingPolicy,

    /// Log level (debug, info, warn, error).
    pub log_level: String,

    /// Model used by `define_tool` and `recipe_tool`.
    pub tool_model: String,

    /// DeepSeek (OpenAI-compatible) provider.
    pub deepseek: ProviderConfig,

    /// Claude (Anthropic Messages API) provider.
    pub claude: ProviderConfig,

    pub search: SearchConfig,
    pub weather: WeatherConfig,
    pub summarizer: SummarizerConfig,
    pub recipe: RecipeConfig,
    pub agent: AgentConfig,
}

impl Default for AskrouteConfig {
    fn default() -> Self {
        Self {
            default_model: "deepseek".into(),
            policy: RoutingPolicy::Lexical,
            log_level: "info".into(),
            tool_model: "claude".into(),
            deepseek: ProviderConfig::default(),
            claude: ProviderConfig::claude(),
            search: SearchConfig::default(),
            weather: WeatherConfig::default(),
            summarizer: SummarizerConfig::default(),
            recipe: RecipeConfig::default(),
            agent: AgentConfig::default(),
        }
    }
}

/// Endpoint and sampling settings for one model provider.
///
/// `base_url` and `model` are required whenever the section is present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub base_url: String,
    pub model: String,
    #[serde(default = "ProviderConfig::default_temperature")]
    pub temperature: f64,
    #[serde(default = "ProviderConfig::default_max_tokens")]
    pub max_tokens: u32,
}

impl ProviderConfig {
    fn default_temperature() -> f64 {
        0.25
    }

    fn default_max_tokens() -> u32 {
        8192
    }

    /// Defaults for the Claude provider.
    pub fn claude() -> Self {
        Self {
            base_url: "https://api.anthropic.com".into(),
            model: "claude-3-7-sonnet-20250219".into(),
            temperature: 0.0,
            max_tokens: 1024,
        }
    }
}

impl Default for ProviderConfig {
    /// Defaults for the DeepSeek provider.
    fn default() -> Self {
        Self {
            base_url: "https://api.deepseek.com".into(),
            model: "deepseek-chat".into(),
            temperature: Self::default_temperature(),
            max_tokens: Self::default_max_tokens(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub base_url: String,
    /// Results kept by default.
    pub top_n: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.tavily.com".into(),
            top_n: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// Nominatim search endpoint.
    pub geocode_url: String,
    /// NWS points endpoint with `{lat}` and `{lon}` placeholders.
    pub points_url: String,
    pub user_agent: String,
    /// Per-HTTP-call timeout.
    pub timeout_secs: u64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            geocode_url: "https://nominatim.openstreetmap.org/search".into(),
            points_url: "https://api.weather.gov/points/{lat},{lon}".into(),
            user_agent: "weather-tool/1.0".into(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizerConfig {
    pub max_words: u64,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self { max_words: 150 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecipeConfig {
    pub servings: u64,
}

impl Default for RecipeConfig {
    fn default() -> Self {
        Self { servings: 2 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Upper bound on tool steps in the model-delegated loop.
    pub max_steps: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self { max_steps: 4 }
    }
}

