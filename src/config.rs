// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Configuration for the comment gate service.
//!
//! Defaults mirror the limits the article platform ships with: 10 comment
//! submissions and 60 likes per client per minute, with the limiter map
//! pruned once it tracks more than 500 clients.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{limiter}: window length must be greater than zero")]
    ZeroInterval { limiter: String },

    #[error("{limiter}: tracked token ceiling must be greater than zero")]
    ZeroTokenCeiling { limiter: String },

    #[error("Invalid value for {var}: {value:?}")]
    InvalidEnv { var: &'static str, value: String },
}

/// Top-level service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server bind address (default: 0.0.0.0:8080)
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Limiter guarding comment creation
    #[serde(default = "LimiterConfig::comment_create")]
    pub comment_limiter: LimiterConfig,

    /// Limiter guarding comment likes
    #[serde(default = "LimiterConfig::comment_like")]
    pub like_limiter: LimiterConfig,

    /// Moderation policy configuration
    #[serde(default)]
    pub moderation: ModerationConfig,

    /// Metrics configuration
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// One limiter instance per action category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LimiterConfig {
    /// Label used in logs and metrics
    pub name: String,

    /// Window length in milliseconds (default: 60000)
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Tracked-token count above which stale entries are pruned (default: 500)
    #[serde(default = "default_unique_tokens")]
    pub unique_token_per_interval: usize,

    /// Accepted requests per token per window at the call site
    pub limit: u32,
}

/// Moderation policy configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModerationConfig {
    /// Authors with fewer prior comments than this are held (default: 3)
    #[serde(default = "default_new_user_threshold")]
    pub new_user_threshold: u64,

    /// Maximum comment length in characters (default: 2000)
    #[serde(default = "default_max_content_chars")]
    pub max_content_chars: usize,

    /// Lower-case substrings that mark content as spam
    #[serde(default = "default_spam_keywords")]
    pub spam_keywords: Vec<String>,
}

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Enable Prometheus metrics endpoint (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Metrics endpoint path (default: /metrics)
    #[serde(default = "default_metrics_path")]
    pub path: String,
}

fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_interval_ms() -> u64 {
    60_000
}

fn default_unique_tokens() -> usize {
    500
}

fn default_new_user_threshold() -> u64 {
    3
}

fn default_max_content_chars() -> usize {
    2000
}

fn default_spam_keywords() -> Vec<String> {
    ["buy now", "discount", "http://", "https://", "www."]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_true() -> bool {
    true
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

impl LimiterConfig {
    /// Comment creation: 10 per minute per client.
    pub fn comment_create() -> Self {
        Self {
            name: "comment_create".to_string(),
            interval_ms: default_interval_ms(),
            unique_token_per_interval: default_unique_tokens(),
            limit: 10,
        }
    }

    /// Comment likes: 60 per minute per client.
    pub fn comment_like() -> Self {
        Self {
            name: "comment_like".to_string(),
            interval_ms: default_interval_ms(),
            unique_token_per_interval: default_unique_tokens(),
            limit: 60,
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval_ms == 0 {
            return Err(ConfigError::ZeroInterval {
                limiter: self.name.clone(),
            });
        }
        if self.unique_token_per_interval == 0 {
            return Err(ConfigError::ZeroTokenCeiling {
                limiter: self.name.clone(),
            });
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            comment_limiter: LimiterConfig::comment_create(),
            like_limiter: LimiterConfig::comment_like(),
            moderation: ModerationConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            new_user_threshold: default_new_user_threshold(),
            max_content_chars: default_max_content_chars(),
            spam_keywords: default_spam_keywords(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            path: default_metrics_path(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to defaults.
    ///
    /// - `BIND_ADDR`
    /// - `COMMENT_RATE_LIMIT`, `LIKE_RATE_LIMIT`: per-window limits
    /// - `RATE_WINDOW_MS`: window length shared by both limiters
    /// - `RATE_TRACKED_TOKENS`: pruning ceiling shared by both limiters
    /// - `NEW_USER_THRESHOLD`, `MAX_COMMENT_CHARS`
    /// - `METRICS_ENABLED`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`Config::from_env`] with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(addr) = lookup("BIND_ADDR") {
            config.bind_addr = addr;
        }
        if let Some(limit) = parse_var(&lookup, "COMMENT_RATE_LIMIT")? {
            config.comment_limiter.limit = limit;
        }
        if let Some(limit) = parse_var(&lookup, "LIKE_RATE_LIMIT")? {
            config.like_limiter.limit = limit;
        }
        if let Some(interval_ms) = parse_var(&lookup, "RATE_WINDOW_MS")? {
            config.comment_limiter.interval_ms = interval_ms;
            config.like_limiter.interval_ms = interval_ms;
        }
        if let Some(ceiling) = parse_var(&lookup, "RATE_TRACKED_TOKENS")? {
            config.comment_limiter.unique_token_per_interval = ceiling;
            config.like_limiter.unique_token_per_interval = ceiling;
        }
        if let Some(threshold) = parse_var(&lookup, "NEW_USER_THRESHOLD")? {
            config.moderation.new_user_threshold = threshold;
        }
        if let Some(max) = parse_var(&lookup, "MAX_COMMENT_CHARS")? {
            config.moderation.max_content_chars = max;
        }
        if let Some(enabled) = parse_var(&lookup, "METRICS_ENABLED")? {
            config.metrics.enabled = enabled;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.comment_limiter.validate()?;
        self.like_limiter.validate()
    }
}

fn parse_var<F, T>(lookup: &F, var: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(var) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnv { var, value }),
    }
}
