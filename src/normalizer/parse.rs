use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::{
    ai::inference::extract_reply_text,
    domain::{ClassificationResult, DetectError, KeywordVerdict, RiskLevel},
};

const RISK_KEYWORDS: [&str; 5] = ["phish", "phishing", "malicious", "suspicious", "scam"];

#[derive(Debug, Deserialize)]
struct RawClassification {
    #[serde(deserialize_with = "score_from_number_or_string")]
    risk_score: u8,
    #[serde(default)]
    risk_level: Option<RiskLevel>,
    is_phishing: bool,
    #[serde(default)]
    reason: Option<String>,
}

impl From<RawClassification> for ClassificationResult {
    fn from(raw: RawClassification) -> Self {
        Self {
            risk_score: raw.risk_score,
            risk_level: raw
                .risk_level
                .unwrap_or_else(|| RiskLevel::from_score(raw.risk_score)),
            is_phishing: raw.is_phishing,
            reason: raw.reason.map(|r| r.trim().to_string()).unwrap_or_default(),
        }
    }
}

/// Requires the reply text to be a JSON classification object.
pub fn parse_strict(raw: &Value) -> Result<ClassificationResult, DetectError> {
    let text = extract_reply_text(raw).ok_or_else(|| {
        DetectError::UpstreamPayloadInvalid("response did not contain assistant text".into())
    })?;

    let parsed: RawClassification = serde_json::from_str(strip_code_fence(&text))
        .map_err(|err| DetectError::UpstreamPayloadInvalid(err.to_string()))?;
    Ok(parsed.into())
}

/// Never fails: unknown shapes simply produce `content = None`.
pub fn parse_keywords(raw: Value) -> KeywordVerdict {
    let content = extract_reply_text(&raw);
    let suspicious = content
        .as_deref()
        .map(|text| {
            let lowered = text.to_lowercase();
            RISK_KEYWORDS.iter().any(|k| lowered.contains(k))
        })
        .unwrap_or(false);
    KeywordVerdict {
        content,
        suspicious,
        raw_response: raw,
    }
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = rest.strip_suffix("```").unwrap_or(rest);
    // Drop an info string such as `json` on the opening fence line.
    match body.split_once('\n') {
        Some((info, inner)) if !info.trim_start().starts_with('{') => inner.trim(),
        _ => body.trim(),
    }
}

fn score_from_number_or_string<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let score = match &value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|score| score.is_finite())
    .ok_or_else(|| serde::de::Error::custom(format!("invalid risk_score {value}")))?;
    Ok(score.round().clamp(0.0, 100.0) as u8)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn chat_reply(content: &str) -> Value {
        json!({"choices": [{"message": {"role": "assistant", "content": content}}]})
    }

    #[test]
    fn strict_parses_full_classification() {
        let raw = chat_reply(
            r#"{"risk_score": 85, "risk_level": "High", "is_phishing": true, "reason": "Fake KYC link"}"#,
        );
        let result = parse_strict(&raw).unwrap();
        assert_eq!(
            result,
            ClassificationResult {
                risk_score: 85,
                risk_level: RiskLevel::High,
                is_phishing: true,
                reason: "Fake KYC link".into(),
            }
        );
    }

    #[test]
    fn strict_tolerates_fences_and_loose_fields() {
        let raw = chat_reply(
            "```json\n{\"risk_score\": \"42.6\", \"risk_level\": \"medium\", \"is_phishing\": false}\n```",
        );
        let result = parse_strict(&raw).unwrap();
        assert_eq!(result.risk_score, 43);
        assert_eq!(result.risk_level, RiskLevel::Moderate);
        assert_eq!(result.reason, "");
    }

    #[test]
    fn strict_derives_level_and_clamps_score() {
        let raw = chat_reply(r#"{"risk_score": 140, "is_phishing": true, "reason": "x"}"#);
        let result = parse_strict(&raw).unwrap();
        assert_eq!(result.risk_score, 100);
        assert_eq!(result.risk_level, RiskLevel::High);
    }

    #[test]
    fn strict_rejects_free_text() {
        let raw = chat_reply("This looks like a phishing attempt.");
        assert!(matches!(
            parse_strict(&raw),
            Err(DetectError::UpstreamPayloadInvalid(_))
        ));
    }

    #[test]
    fn strict_rejects_missing_text() {
        let raw = json!({"raw": "<html>bad gateway</html>"});
        assert!(matches!(
            parse_strict(&raw),
            Err(DetectError::UpstreamPayloadInvalid(_))
        ));
    }

    #[test]
    fn keywords_flag_risky_wording() {
        let verdict = parse_keywords(chat_reply("Classic SCAM: do not click."));
        assert!(verdict.suspicious);
        assert_eq!(verdict.content.as_deref(), Some("Classic SCAM: do not click."));
    }

    #[test]
    fn keywords_without_match_are_not_suspicious() {
        let verdict = parse_keywords(chat_reply("Looks like an ordinary order update."));
        assert!(!verdict.suspicious);
    }

    #[test]
    fn keywords_handle_unknown_shape() {
        let raw = json!({"raw": "not json at all"});
        let verdict = parse_keywords(raw.clone());
        assert!(verdict.content.is_none());
        assert!(!verdict.suspicious);
        assert_eq!(verdict.raw_response, raw);
    }

    #[test]
    fn code_fence_without_info_string() {
        assert_eq!(strip_code_fence("```\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```{\"a\":1}```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("  {\"a\":1} "), "{\"a\":1}");
    }
}
