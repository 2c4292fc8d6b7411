//! Per-request pipeline: clean, extract domain, classify, parse, override.

pub mod parse;
pub mod text;
pub mod trust;

use crate::{
    ai::ClassifierClient,
    config::{DetectionConfig, ParseStrategy},
    domain::{DetectError, DetectionRequest, DetectionResponse},
};

pub use text::{clean, extract_domain};
pub use trust::TrustedDomainList;

pub struct RequestNormalizer {
    classifier: ClassifierClient,
    trusted: TrustedDomainList,
    strategy: ParseStrategy,
}

impl RequestNormalizer {
    pub fn new(classifier: ClassifierClient, config: &DetectionConfig) -> Self {
        Self {
            classifier,
            trusted: TrustedDomainList::with_extra(&config.extra_trusted_domains),
            strategy: config.strategy,
        }
    }

    pub fn strategy(&self) -> ParseStrategy {
        self.strategy
    }

    pub fn trusted_domains(&self) -> &TrustedDomainList {
        &self.trusted
    }

    pub async fn detect(&self, request: DetectionRequest) -> Result<DetectionResponse, DetectError> {
        let text = clean(&request.text);
        let domain = extract_domain(&text);
        let model = request.model.as_deref();

        tracing::info!(
            target: "normalizer",
            chars = text.chars().count(),
            domain = domain.as_deref().unwrap_or("none found"),
            model = model.unwrap_or(self.classifier.default_model()),
            "classifying message"
        );

        let raw = self
            .classifier
            .classify(&text, domain.as_deref(), model, self.strategy)
            .await?;

        match self.strategy {
            ParseStrategy::StrictJson => {
                let parsed = parse::parse_strict(&raw).inspect_err(|err| {
                    tracing::warn!(target: "normalizer", error = %err, "classifier reply rejected");
                })?;
                let result = self.trusted.apply_override(parsed, domain.as_deref());
                tracing::info!(
                    target: "normalizer",
                    risk_score = result.risk_score,
                    risk_level = %result.risk_level,
                    is_phishing = result.is_phishing,
                    "classification complete"
                );
                Ok(DetectionResponse::Classification(result))
            }
            ParseStrategy::KeywordHeuristic => {
                let verdict = parse::parse_keywords(raw);
                tracing::info!(
                    target: "normalizer",
                    suspicious = verdict.suspicious,
                    "keyword verdict complete"
                );
                Ok(DetectionResponse::Keywords(verdict))
            }
        }
    }
}
