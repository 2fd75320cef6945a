use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use metrics::{counter, histogram};
use uuid::Uuid;

use crate::inference::{
    binary_response, classify, decode_text, extract_features, text_response, validate_binary,
    Classifiers, ExtractionError, FeatureVector, Outcome,
};
use crate::models::{BinaryVerdict, Modality, TextVerdict};

/// Validate → (extract) → classify → normalise, once per request.
///
/// Holds the two classifier handles provisioned at startup; every method is
/// synchronous and never fails, each request ends in exactly one verdict.
#[derive(Debug, Clone)]
pub struct ClassificationPipeline {
    classifiers: Classifiers,
}

impl ClassificationPipeline {
    pub fn new(classifiers: Classifiers) -> Self {
        Self { classifiers }
    }

    pub fn classifiers(&self) -> &Classifiers {
        &self.classifiers
    }

    /// Score email text as Phishing / Safe.
    pub fn classify_text(&self, text: &str) -> TextVerdict {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!("classify", %request_id, modality = "text");
        let _guard = span.enter();
        let start = Instant::now();

        let outcome = self.text_outcome(text);
        record(Modality::Text, &outcome, start);
        text_response(outcome)
    }

    /// Decode uploaded bytes (lossy UTF-8) and score them as email text.
    pub fn classify_text_from_upload(&self, bytes: &[u8]) -> TextVerdict {
        let text = decode_text(bytes);
        self.classify_text(&text)
    }

    /// Score a candidate Windows executable as Malicious / Benign.
    pub fn classify_binary(&self, bytes: &[u8]) -> BinaryVerdict {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!("classify", %request_id, modality = "binary");
        let _guard = span.enter();
        let start = Instant::now();

        let outcome = self.binary_outcome(bytes);
        record(Modality::Binary, &outcome, start);
        binary_response(outcome)
    }

    fn text_outcome(&self, text: &str) -> Outcome {
        match classify(&*self.classifiers.text, text, Modality::Text) {
            Ok(prediction) => Outcome::Classified(prediction),
            Err(e) => Outcome::InferenceFailed(e),
        }
    }

    fn binary_outcome(&self, bytes: &[u8]) -> Outcome {
        if let Err(rejection) = validate_binary(bytes) {
            tracing::debug!(size = bytes.len(), "Payload is not a PE image, rejecting");
            counter!("unsupported_inputs_total").increment(1);
            return Outcome::Rejected(rejection);
        }

        let features = match extract_contained(bytes) {
            Ok(features) => features,
            Err(e) => {
                tracing::warn!(error = %e, size = bytes.len(), "Feature extraction failed");
                counter!("extraction_failures_total").increment(1);
                return Outcome::ExtractionFailed(e);
            }
        };
        tracing::debug!(
            dim = features.as_slice().len(),
            size = bytes.len(),
            "Features extracted"
        );

        match classify(&*self.classifiers.binary, features.as_slice(), Modality::Binary) {
            Ok(prediction) => Outcome::Classified(prediction),
            Err(e) => Outcome::InferenceFailed(e),
        }
    }
}

/// Run the extractor, turning a parser panic into an ordinary failure.
fn extract_contained(bytes: &[u8]) -> Result<FeatureVector, ExtractionError> {
    panic::catch_unwind(AssertUnwindSafe(|| extract_features(bytes))).unwrap_or_else(|payload| {
        let reason = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".into());
        Err(ExtractionError::Malformed(format!("parser panicked: {reason}")))
    })
}

fn record(modality: Modality, outcome: &Outcome, start: Instant) {
    let elapsed = start.elapsed().as_secs_f64();
    histogram!("inference_latency_seconds", "modality" => modality.as_str()).record(elapsed);

    match outcome {
        Outcome::Classified(p) => {
            counter!(
                "classifications_total",
                "modality" => modality.as_str(),
                "verdict" => p.verdict.as_str()
            )
            .increment(1);
            tracing::info!(
                verdict = %p.verdict,
                confidence = p.confidence,
                elapsed_ms = elapsed * 1000.0,
                "Classified"
            );
        }
        other => {
            counter!(
                "classifications_total",
                "modality" => modality.as_str(),
                "verdict" => other.kind()
            )
            .increment(1);
            tracing::info!(
                outcome = other.kind(),
                elapsed_ms = elapsed * 1000.0,
                "Request ended without a classifier verdict"
            );
        }
    }
}
