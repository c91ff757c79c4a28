// agentctl-config - Layered configuration for the agentctl CLI
//
// Supports configuration from multiple sources:
// 1. Command-line flags (highest priority)
// 2. Environment variables (AGENTCTL_* plus the standard AWS_* ones)
// 3. Config file: --config, AGENTCTL_CONFIG, AGENTCTL_CONFIG_CONTENT,
//    or ./agentctl.toml / ./.agentctl.toml
// 4. Built-in defaults (lowest priority)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

mod env_overrides;
mod sources;
mod validation;

pub use env_overrides::{EnvSource, StdEnvSource, ENV_PREFIX};

/// Client configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    #[serde(default)]
    pub aws: AwsConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub log: LogConfig,

    #[serde(default)]
    pub confirm: ConfirmConfig,

    #[serde(default)]
    pub paging: PagingConfig,
}

/// Where and how requests are sent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AwsConfig {
    /// Falls back to the AWS profile's region when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,

    /// Overrides the regional endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint_url: Option<String>,

    #[serde(default = "default_true")]
    pub sign_requests: bool,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl AwsConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for AwsConfig {
    fn default() -> Self {
        Self {
            region: None,
            profile: None,
            endpoint_url: None,
            sign_requests: true,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
}

/// Rendering of emitted values on stdout
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Pretty-printed, one document per value
    #[default]
    Json,
    /// One compact document per line
    Jsonl,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Jsonl => write!(f, "jsonl"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "jsonl" | "ndjson" => Ok(OutputFormat::Jsonl),
            _ => anyhow::bail!("Unsupported output format: {}. Supported: json, jsonl", s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// Level or EnvFilter directive, e.g. `warn` or `agentctl=debug`
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::Text,
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => anyhow::bail!("Unsupported log format: {}. Supported: text, json", s),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfirmConfig {
    /// Behave as if `--force` was passed to every command
    #[serde(default)]
    pub assume_yes: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PagingConfig {
    #[serde(default = "default_true")]
    pub auto_iterate: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            auto_iterate: true,
            page_size: None,
        }
    }
}

/// Values given on the command line; they win over every other source.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub config_path: Option<PathBuf>,
    pub region: Option<String>,
    pub profile: Option<String>,
    pub endpoint_url: Option<String>,
    pub no_sign_request: bool,
    pub output: Option<OutputFormat>,
    pub log_level: Option<String>,
}

impl ClientConfig {
    /// Load configuration from all sources with priority
    pub fn load(cli: &CliOverrides) -> Result<Self> {
        sources::load_config(cli, &StdEnvSource, std::path::Path::new("."))
    }

    /// Load with an explicit environment and working directory (useful for testing)
    pub fn load_with<E: EnvSource>(
        cli: &CliOverrides,
        env: &E,
        cwd: &std::path::Path,
    ) -> Result<Self> {
        sources::load_config(cli, env, cwd)
    }

    /// Parse TOML content on top of the defaults
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        validation::validate_config(self)
    }
}
