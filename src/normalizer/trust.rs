use crate::domain::{ClassificationResult, RiskLevel};

/// Scores above this are downgraded when the link points at a trusted domain.
pub const OVERRIDE_THRESHOLD: u8 = 60;
pub const TRUSTED_SCORE: u8 = 15;
pub const TRUSTED_REASON: &str = "Link points to a trusted domain";

const DEFAULT_TRUSTED_DOMAINS: &[&str] = &[
    "amazon.in",
    "amazon.com",
    "flipkart.com",
    "google.com",
    "microsoft.com",
    "apple.com",
    "paypal.com",
    "github.com",
    "linkedin.com",
    "sbi.co.in",
    "onlinesbi.sbi",
    "hdfcbank.com",
    "icicibank.com",
    "axisbank.com",
    "irctc.co.in",
    "incometax.gov.in",
    "uidai.gov.in",
];

#[derive(Debug, Clone)]
pub struct TrustedDomainList {
    entries: Vec<String>,
}

impl TrustedDomainList {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: entries.into_iter().map(Into::into).collect(),
        }
    }

    /// Built-in list followed by any configured additions.
    pub fn with_extra(extra: &[String]) -> Self {
        let mut entries: Vec<String> = DEFAULT_TRUSTED_DOMAINS
            .iter()
            .map(|d| d.to_string())
            .collect();
        for domain in extra {
            if !entries.contains(domain) {
                entries.push(domain.clone());
            }
        }
        Self::new(entries)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First entry that `domain` equals or is a subdomain of.
    pub fn find_match(&self, domain: &str) -> Option<&str> {
        let domain = domain.trim_end_matches('.');
        self.entries
            .iter()
            .map(String::as_str)
            .find(|entry| is_same_or_subdomain(domain, entry))
    }

    pub fn apply_override(
        &self,
        result: ClassificationResult,
        domain: Option<&str>,
    ) -> ClassificationResult {
        let Some(domain) = domain else {
            return result;
        };
        let Some(entry) = self.find_match(domain) else {
            return result;
        };
        if result.risk_score <= OVERRIDE_THRESHOLD {
            return result;
        }

        tracing::info!(
            target: "normalizer",
            domain,
            trusted = entry,
            original_score = result.risk_score,
            "trusted domain override applied"
        );
        ClassificationResult {
            risk_score: TRUSTED_SCORE,
            risk_level: RiskLevel::Low,
            is_phishing: false,
            reason: TRUSTED_REASON.to_string(),
        }
    }
}

fn is_same_or_subdomain(domain: &str, entry: &str) -> bool {
    match domain.strip_suffix(entry) {
        Some("") => true,
        Some(prefix) => prefix.ends_with('.'),
        None => false,
    }
}
