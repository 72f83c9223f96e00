//! Runtime configuration for the skill bridge
//!
//! Defaults mirror the production deployment; every field can be
//! overridden through environment variables (see [`Config::from_env`]).

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Bridge configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Bind address
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Completion backend API key (read from env OPENAI_API_KEY if not set)
    #[serde(default)]
    pub openai_api_key: Option<String>,

    /// Chat completion endpoint URL
    #[serde(default = "default_chat_endpoint")]
    pub chat_endpoint: String,

    /// Model name sent to the completion backend
    #[serde(default = "default_model")]
    pub model: String,

    /// Upper bound on a single completion call, in seconds
    #[serde(default = "default_completion_timeout")]
    pub completion_timeout_secs: u64,

    /// Hard response deadline the platform enforces, in seconds
    #[serde(default = "default_platform_timeout")]
    pub platform_timeout_secs: u64,

    /// Subtracted from the platform deadline to get the poll budget
    #[serde(default = "default_safety_margin_ms")]
    pub safety_margin_ms: u64,

    /// Interval between response-slot reads while polling
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Maximum estimated token cost a conversation may occupy
    #[serde(default = "default_token_ceiling")]
    pub token_ceiling: usize,

    /// TTL of every store entry, in seconds
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,

    /// Period of the full-cache eviction sweep, in seconds
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,

    /// Persona prompt installed at index 0 of every history
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Per-user chat limit, recorded but not enforced
    #[serde(default = "default_chat_limit")]
    pub chat_limit: u32,
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    5002
}
fn default_chat_endpoint() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}
fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}
fn default_completion_timeout() -> u64 {
    120
}
fn default_platform_timeout() -> u64 {
    5
}
fn default_safety_margin_ms() -> u64 {
    500
}
fn default_poll_interval_ms() -> u64 {
    200
}
fn default_token_ceiling() -> usize {
    4096
}
fn default_cache_ttl() -> u64 {
    60 * 30
}
fn default_sweep_interval() -> u64 {
    60 * 30
}
fn default_system_prompt() -> String {
    "당신은 카카오톡에서 대화하는 chatgpt 기반의 친절한 봇입니다.".to_string()
}
fn default_chat_limit() -> u32 {
    100
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            openai_api_key: None,
            chat_endpoint: default_chat_endpoint(),
            model: default_model(),
            completion_timeout_secs: default_completion_timeout(),
            platform_timeout_secs: default_platform_timeout(),
            safety_margin_ms: default_safety_margin_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            token_ceiling: default_token_ceiling(),
            cache_ttl_secs: default_cache_ttl(),
            sweep_interval_secs: default_sweep_interval(),
            system_prompt: default_system_prompt(),
            chat_limit: default_chat_limit(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env(mut self) -> Self {
        if let Ok(val) = std::env::var("BRIDGE_HOST") {
            self.host = val;
        }

        if let Ok(val) = std::env::var("BRIDGE_PORT") {
            if let Ok(port) = val.parse() {
                self.port = port;
            }
        }

        if let Ok(val) = std::env::var("OPENAI_API_KEY") {
            self.openai_api_key = Some(val);
        }

        if let Ok(val) = std::env::var("CHAT_ENDPOINT") {
            self.chat_endpoint = val;
        }

        if let Ok(val) = std::env::var("CHAT_MODEL") {
            self.model = val;
        }

        if let Ok(val) = std::env::var("COMPLETION_TIMEOUT_SECS") {
            if let Ok(secs) = val.parse() {
                self.completion_timeout_secs = secs;
            }
        }

        if let Ok(val) = std::env::var("PLATFORM_TIMEOUT_SECS") {
            if let Ok(secs) = val.parse() {
                self.platform_timeout_secs = secs;
            }
        }

        if let Ok(val) = std::env::var("SAFETY_MARGIN_MS") {
            if let Ok(ms) = val.parse() {
                self.safety_margin_ms = ms;
            }
        }

        if let Ok(val) = std::env::var("POLL_INTERVAL_MS") {
            if let Ok(ms) = val.parse() {
                self.poll_interval_ms = ms;
            }
        }

        if let Ok(val) = std::env::var("TOKEN_CEILING") {
            if let Ok(ceiling) = val.parse() {
                self.token_ceiling = ceiling;
            }
        }

        if let Ok(val) = std::env::var("CACHE_TTL_SECS") {
            if let Ok(secs) = val.parse() {
                self.cache_ttl_secs = secs;
            }
        }

        if let Ok(val) = std::env::var("SWEEP_INTERVAL_SECS") {
            if let Ok(secs) = val.parse() {
                self.sweep_interval_secs = secs;
            }
        }

        if let Ok(val) = std::env::var("SYSTEM_PROMPT") {
            self.system_prompt = val;
        }

        if let Ok(val) = std::env::var("CHAT_LIMIT") {
            if let Ok(limit) = val.parse() {
                self.chat_limit = limit;
            }
        }

        self
    }

    /// Get completion call timeout as Duration
    pub fn completion_timeout(&self) -> Duration {
        Duration::from_secs(self.completion_timeout_secs)
    }

    /// Get store TTL as Duration
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Get sweep period as Duration
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    /// Get poll interval as Duration
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Maximum time a request may spend polling: the platform deadline
    /// minus the safety margin.
    pub fn wait_budget(&self) -> Duration {
        Duration::from_secs(self.platform_timeout_secs)
            .saturating_sub(Duration::from_millis(self.safety_margin_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.port, 5002);
        assert_eq!(config.model, "gpt-3.5-turbo");
        assert_eq!(config.token_ceiling, 4096);
        assert_eq!(config.cache_ttl_secs, 1800);
        assert_eq!(config.sweep_interval_secs, 1800);
    }

    #[test]
    fn test_wait_budget() {
        let config = Config::default();
        assert_eq!(config.wait_budget(), Duration::from_millis(4500));
    }

    #[test]
    fn test_config_from_env() {
        std::env::set_var("BRIDGE_PORT", "8123");
        std::env::set_var("CHAT_ENDPOINT", "http://localhost:9000/v1/chat/completions");
        std::env::set_var("TOKEN_CEILING", "2048");

        let config = Config::default().from_env();

        assert_eq!(config.port, 8123);
        assert_eq!(config.chat_endpoint, "http://localhost:9000/v1/chat/completions");
        assert_eq!(config.token_ceiling, 2048);

        // Cleanup
        std::env::remove_var("BRIDGE_PORT");
        std::env::remove_var("CHAT_ENDPOINT");
        std::env::remove_var("TOKEN_CEILING");
    }

    #[test]
    fn test_duration_conversions() {
        let config = Config::default();
        assert_eq!(config.completion_timeout(), Duration::from_secs(120));
        assert_eq!(config.poll_interval(), Duration::from_millis(200));
        assert_eq!(config.cache_ttl(), Duration::from_secs(1800));
    }
}
