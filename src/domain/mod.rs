pub mod error;
pub mod types;

pub use error::DetectError;
pub use types::{
    ClassificationResult, DetectionRequest, DetectionResponse, KeywordVerdict, RiskLevel,
};
