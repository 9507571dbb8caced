use anyhow::{anyhow, Result};
use serde::Serialize;
use std::env;
use tracing::{info, warn};

use crate::fallback::SummaryFallbackStyle;
use crate::llm_providers::{DEFAULT_APP_TITLE, DEFAULT_BASE_URL, DEFAULT_REFERER, ModelCatalog};

// Import logging macros
use crate::{log_system_event, log_validation};

/// Complete application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub llm: LLMConfig,
    pub pipeline: PipelineConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

/// Chat-completion provider configuration
#[derive(Debug, Clone)]
pub struct LLMConfig {
    /// `None` when unset or blank; generation then runs in unconfigured mode
    pub api_key: Option<String>,
    pub base_url: String,
    pub models: ModelCatalog,
    pub timeout_secs: u64,
    pub referer: String,
    pub app_title: String,
}

/// Generation pipeline behaviour switches
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    pub strict_quiz_validation: bool,
    pub summary_fallback: SummaryFallbackStyle,
}

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

/// Logging system configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub file_enabled: bool,
    pub console_enabled: bool,
    pub log_directory: String,
}

impl Config {
    /// Load configuration from environment variables with sensible defaults
    pub fn from_env() -> Result<Self> {
        log_system_event!(config, "Loading application configuration from environment variables");

        let config = Config {
            llm: LLMConfig::from_env()?,
            pipeline: PipelineConfig::from_env()?,
            server: ServerConfig::from_env()?,
            logging: LoggingConfig::from_env()?,
        };

        log_system_event!(config, "Configuration loaded successfully");
        config.log_configuration_summary();

        Ok(config)
    }

    /// Log a summary of loaded configuration (without sensitive data)
    fn log_configuration_summary(&self) {
        info!(
            api_key_masked = %self.llm.api_key.as_deref().map(mask_sensitive_data).unwrap_or_else(|| "<unset>".to_string()),
            base_url = %self.llm.base_url,
            models = ?self.llm.models.iter().collect::<Vec<_>>(),
            timeout_secs = self.llm.timeout_secs,
            strict_quiz_validation = self.pipeline.strict_quiz_validation,
            summary_fallback = ?self.pipeline.summary_fallback,
            server_address = %self.server.address(),
            log_level = %self.logging.level,
            "Configuration summary"
        );
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(anyhow!("Server port must be greater than 0"));
        }

        if self.llm.timeout_secs == 0 {
            return Err(anyhow!("LLM_TIMEOUT_SECS must be greater than 0"));
        }

        if !self.llm.base_url.starts_with("http://") && !self.llm.base_url.starts_with("https://") {
            return Err(anyhow!("OPENROUTER_BASE_URL must start with 'http://' or 'https://'"));
        }

        match self.llm.api_key.as_deref() {
            None => warn!("OPENROUTER_API_KEY is not set - generation endpoints will serve placeholder output"),
            Some(key) if !has_openrouter_key_format(key) => {
                warn!("OPENROUTER_API_KEY does not start with 'sk-or-v1-' - requests may be rejected")
            }
            Some(_) => {}
        }

        log_validation!(success, "configuration", "Configuration validation completed successfully");
        Ok(())
    }
}

impl LLMConfig {
    pub fn from_env() -> Result<Self> {
        let api_key = env::var("OPENROUTER_API_KEY")
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());

        let base_url = env::var("OPENROUTER_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let models = ModelCatalog::from_override(env::var("LLM_MODELS").ok().as_deref());

        let timeout_str = env::var("LLM_TIMEOUT_SECS").unwrap_or_else(|_| "30".to_string());
        let timeout_secs = timeout_str
            .parse::<u64>()
            .map_err(|_| anyhow!("Invalid LLM_TIMEOUT_SECS value: '{}'. Must be a whole number of seconds", timeout_str))?;

        let referer = env::var("HTTP_REFERER").unwrap_or_else(|_| DEFAULT_REFERER.to_string());
        let app_title = env::var("APP_TITLE").unwrap_or_else(|_| DEFAULT_APP_TITLE.to_string());

        Ok(LLMConfig {
            api_key,
            base_url,
            models,
            timeout_secs,
            referer,
            app_title,
        })
    }
}

impl PipelineConfig {
    pub fn from_env() -> Result<Self> {
        let strict_quiz_validation = env::var("QUIZ_STRICT_VALIDATION")
            .unwrap_or_else(|_| "false".to_string())
            .parse::<bool>()
            .unwrap_or(false);

        let fallback_str = env::var("SUMMARY_FALLBACK").unwrap_or_else(|_| "basic".to_string());
        let summary_fallback = SummaryFallbackStyle::parse(&fallback_str).unwrap_or_else(|| {
            info!("Unknown SUMMARY_FALLBACK '{}', defaulting to basic", fallback_str);
            SummaryFallbackStyle::Basic
        });

        Ok(PipelineConfig {
            strict_quiz_validation,
            summary_fallback,
        })
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        let port_str = env::var("PORT")
            .unwrap_or_else(|_| "8000".to_string());

        let port = port_str.parse::<u16>()
            .map_err(|_| anyhow!("Invalid PORT value: '{}'. Must be a number between 1-65535", port_str))?;

        let host = env::var("HOST")
            .unwrap_or_else(|_| "0.0.0.0".to_string());

        Ok(ServerConfig { port, host })
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl LoggingConfig {
    pub fn from_env() -> Result<Self> {
        let level = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info,study_buddy=debug".to_string());

        let file_enabled = env::var("LOG_FILE_ENABLED")
            .unwrap_or_else(|_| "true".to_string())
            .parse::<bool>()
            .unwrap_or(true);

        let console_enabled = env::var("LOG_CONSOLE_ENABLED")
            .unwrap_or_else(|_| "true".to_string())
            .parse::<bool>()
            .unwrap_or(true);

        let log_directory = env::var("LOG_DIRECTORY")
            .unwrap_or_else(|_| "logs".to_string());

        Ok(LoggingConfig {
            level,
            file_enabled,
            console_enabled,
            log_directory,
        })
    }
}

/// Non-secret facts about the configured credential, safe to expose on diagnostics endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CredentialStatus {
    pub api_key_set: bool,
    pub api_key_length: usize,
    pub api_key_masked: String,
    pub api_key_format_correct: bool,
}

impl CredentialStatus {
    pub fn from_key(api_key: Option<&str>) -> Self {
        match api_key {
            Some(key) => Self {
                api_key_set: true,
                api_key_length: key.chars().count(),
                api_key_masked: mask_sensitive_data(key),
                api_key_format_correct: has_openrouter_key_format(key),
            },
            None => Self {
                api_key_set: false,
                api_key_length: 0,
                api_key_masked: "Not set".to_string(),
                api_key_format_correct: false,
            },
        }
    }
}

/// OpenRouter keys carry a versioned prefix
pub fn has_openrouter_key_format(key: &str) -> bool {
    key.starts_with("sk-or-v1-")
}

/// Mask sensitive data in configuration for safe logging
pub fn mask_sensitive_data(data: &str) -> String {
    let chars: Vec<char> = data.chars().collect();
    if chars.len() <= 8 {
        "*".repeat(chars.len())
    } else {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}***{}", head, tail)
    }
}
