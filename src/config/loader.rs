use std::{env, net::SocketAddr, str::FromStr, time::Duration};

use super::env::{
    ApiFlavor, AppConfig, ClassifierConfig, ConfigError, DetectionConfig, DirectoryConfig,
    LoggingConfig, ParseStrategy,
};

pub const DEFAULT_CHAT_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const DEFAULT_RESPONSES_URL: &str = "https://api.groq.com/openai/v1/responses";
pub const DEFAULT_MODEL: &str = "openai/gpt-oss-20b";

pub fn load_config() -> Result<AppConfig, ConfigError> {
    AppConfig::from_lookup(|key| env::var(key).ok())
}

impl AppConfig {
    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_addr = parse_or(
            "BIND_ADDR",
            var("BIND_ADDR"),
            SocketAddr::from(([0, 0, 0, 0], 8000)),
        )?;

        let flavor = match var("CLASSIFIER_API_FLAVOR") {
            None => ApiFlavor::ChatCompletions,
            Some(value) => match value.trim().to_ascii_lowercase().as_str() {
                "chat" | "chat_completions" | "chat-completions" => ApiFlavor::ChatCompletions,
                "responses" => ApiFlavor::Responses,
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "CLASSIFIER_API_FLAVOR",
                        value,
                    })
                }
            },
        };

        let classifier = ClassifierConfig {
            api_key: var("CLASSIFIER_API_KEY").or_else(|| var("GROQ_API_KEY")),
            api_url: var("CLASSIFIER_API_URL").unwrap_or_else(|| default_api_url(flavor).to_string()),
            flavor,
            model: var("CLASSIFIER_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            timeout: Duration::from_secs(parse_or(
                "CLASSIFIER_TIMEOUT_SECS",
                var("CLASSIFIER_TIMEOUT_SECS"),
                15,
            )?),
            max_tokens: parse_or(
                "CLASSIFIER_MAX_TOKENS",
                var("CLASSIFIER_MAX_TOKENS"),
                512,
            )?,
        };

        let detection = DetectionConfig {
            strategy: match var("PARSE_STRATEGY") {
                None => ParseStrategy::StrictJson,
                Some(value) => match value.trim().to_ascii_lowercase().as_str() {
                    "strict" | "json" => ParseStrategy::StrictJson,
                    "keywords" | "keyword" | "heuristic" => ParseStrategy::KeywordHeuristic,
                    _ => {
                        return Err(ConfigError::Invalid {
                            key: "PARSE_STRATEGY",
                            value,
                        })
                    }
                },
            },
            extra_trusted_domains: var("TRUSTED_DOMAINS")
                .map(|value| {
                    value
                        .split(',')
                        .map(|part| part.trim().trim_start_matches('.').to_ascii_lowercase())
                        .filter(|part| !part.is_empty())
                        .collect::<Vec<_>>()
                })
                .unwrap_or_default(),
        };

        let directories = DirectoryConfig {
            logs_dir: var("LOGS_DIR").unwrap_or_else(|| "logs".to_string()),
        };

        let logging = LoggingConfig {
            level: var("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        };

        Ok(Self {
            bind_addr,
            classifier,
            detection,
            directories,
            logging,
        })
    }
}

fn default_api_url(flavor: ApiFlavor) -> &'static str {
    match flavor {
        ApiFlavor::ChatCompletions => DEFAULT_CHAT_URL,
        ApiFlavor::Responses => DEFAULT_RESPONSES_URL,
    }
}

fn parse_or<T: FromStr>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError> {
    match raw {
        Some(value) => value
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}
