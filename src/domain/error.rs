use thiserror::Error;

#[derive(Debug, Error)]
pub enum DetectError {
    #[error("CLASSIFIER_API_KEY not set. Set CLASSIFIER_API_KEY (or GROQ_API_KEY) in environment.")]
    ConfigurationMissing,
    #[error("upstream classifier unavailable: {0}")]
    UpstreamUnavailable(#[from] reqwest::Error),
    #[error("invalid upstream payload: {0}")]
    UpstreamPayloadInvalid(String),
}
