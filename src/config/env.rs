use std::{net::SocketAddr, time::Duration};

use thiserror::Error;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub classifier: ClassifierConfig,
    pub detection: DetectionConfig,
    pub directories: DirectoryConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    pub api_key: Option<String>,
    pub api_url: String,
    pub flavor: ApiFlavor,
    pub model: String,
    pub timeout: Duration,
    pub max_tokens: u32,
}

/// Outbound payload shape understood by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiFlavor {
    ChatCompletions,
    Responses,
}

#[derive(Debug, Clone)]
pub struct DetectionConfig {
    pub strategy: ParseStrategy,
    pub extra_trusted_domains: Vec<String>,
}

/// How the classifier's reply text is turned into a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStrategy {
    StrictJson,
    KeywordHeuristic,
}

#[derive(Debug, Clone)]
pub struct DirectoryConfig {
    pub logs_dir: String,
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}
