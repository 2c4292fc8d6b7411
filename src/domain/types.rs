use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Deserialize)]
pub struct DetectionRequest {
    pub text: String,
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

impl RiskLevel {
    /// Bucket used when the classifier omits an explicit level.
    pub fn from_score(score: u8) -> Self {
        match score {
            0..=30 => RiskLevel::Low,
            31..=60 => RiskLevel::Moderate,
            _ => RiskLevel::High,
        }
    }

    fn parse_label(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "low" | "safe" | "minimal" => Some(RiskLevel::Low),
            "moderate" | "medium" => Some(RiskLevel::Moderate),
            "high" | "critical" | "severe" => Some(RiskLevel::High),
            _ => None,
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RiskLevel::Low => "Low",
            RiskLevel::Moderate => "Moderate",
            RiskLevel::High => "High",
        };
        f.write_str(label)
    }
}

impl<'de> Deserialize<'de> for RiskLevel {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        RiskLevel::parse_label(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown risk level {raw:?}")))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassificationResult {
    pub risk_score: u8,
    pub risk_level: RiskLevel,
    pub is_phishing: bool,
    pub reason: String,
}

/// Reply shape of the keyword-heuristic strategy.
#[derive(Debug, Clone, Serialize)]
pub struct KeywordVerdict {
    pub content: Option<String>,
    pub suspicious: bool,
    pub raw_response: Value,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum DetectionResponse {
    Classification(ClassificationResult),
    Keywords(KeywordVerdict),
}
