use serde::{Deserialize, Serialize};

use super::Verdict;

/// Response body of the email classification routes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextVerdict {
    pub verdict: Verdict,
    /// Percentage confidence, two-decimal precision.
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Response body of the malware classification route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinaryVerdict {
    pub verdict: Verdict,
    /// Percentage confidence, two-decimal precision.
    pub confidence: f64,
    /// Present only on `Unsupported file type` and `Error`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Request body of `POST /predict_email_text`.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailRequest {
    pub text: String,
}
