use super::classifier::ClassifierError;
use super::engine::Prediction;
use super::features::ExtractionError;
use super::validator::Rejection;
use crate::models::{BinaryVerdict, TextVerdict, Verdict};

/// Terminal state of one classification request.
#[derive(Debug)]
pub enum Outcome {
    /// The classifier produced a label (possibly with fallback confidence).
    Classified(Prediction),
    /// The payload failed the modality precondition.
    Rejected(Rejection),
    /// The payload claimed to be a PE image but could not be parsed.
    ExtractionFailed(ExtractionError),
    /// The classifier itself refused the input.
    InferenceFailed(ClassifierError),
    /// The worker running the request did not finish.
    Aborted(String),
}

impl Outcome {
    pub fn kind(&self) -> &'static str {
        match self {
            Outcome::Classified(_) => "classified",
            Outcome::Rejected(_) => "rejected",
            Outcome::ExtractionFailed(_) => "extraction_failed",
            Outcome::InferenceFailed(_) => "inference_failed",
            Outcome::Aborted(_) => "aborted",
        }
    }
}

/// Collapse an outcome into the malware route's response shape.
pub fn binary_response(outcome: Outcome) -> BinaryVerdict {
    match outcome {
        Outcome::Classified(p) => BinaryVerdict {
            verdict: p.verdict,
            confidence: p.confidence,
            note: None,
        },
        Outcome::Rejected(r) => BinaryVerdict {
            verdict: Verdict::Unsupported,
            confidence: 0.0,
            note: Some(r.note),
        },
        Outcome::ExtractionFailed(e) => error_verdict(format!("Feature extraction failed: {e}")),
        Outcome::InferenceFailed(e) => error_verdict(format!("Classification failed: {e}")),
        Outcome::Aborted(reason) => error_verdict(format!("Classification aborted: {reason}")),
    }
}

/// Collapse an outcome into the email routes' response shape.
pub fn text_response(outcome: Outcome) -> TextVerdict {
    let BinaryVerdict {
        verdict,
        confidence,
        note,
    } = binary_response(outcome);

    TextVerdict {
        verdict,
        score: confidence,
        note,
    }
}

fn error_verdict(note: String) -> BinaryVerdict {
    BinaryVerdict {
        verdict: Verdict::Error,
        confidence: 0.0,
        note: Some(note),
    }
}
