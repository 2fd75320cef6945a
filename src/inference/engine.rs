use metrics::counter;

use super::classifier::{Classifier, ClassifierError};
use crate::models::{LabelMap, Modality, Verdict};

/// Result of running one input through a classifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub verdict: Verdict,
    /// Percentage in [0, 100], rounded to two decimals.
    pub confidence: f64,
    /// How `confidence` was obtained.
    pub source: ConfidenceSource,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfidenceSource {
    /// Maximum posterior probability reported by the model.
    Posterior,
    /// The model gave no usable probabilities; confidence is 100 on the
    /// alarm label and 0 otherwise.
    Fallback(String),
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Probability-free confidence. Only the alarm path claims certainty.
// TODO: revisit once every deployed artifact carries calibrated
// probabilities; the 100/0 split is not a calibrated score.
pub fn fallback_confidence(verdict: Verdict) -> f64 {
    if verdict.is_alarm() {
        100.0
    } else {
        0.0
    }
}

/// Largest class probability, if the distribution is usable.
fn max_posterior(probs: &[f64]) -> Option<f64> {
    if probs.is_empty() || probs.iter().any(|p| !p.is_finite() || *p < 0.0 || *p > 1.0) {
        return None;
    }
    probs.iter().copied().reduce(f64::max)
}

/// Predict a label and confidence for `input`.
///
/// Only a failing `predict` is an error. Any problem obtaining
/// probabilities degrades to [`fallback_confidence`].
pub fn classify<C, I>(
    classifier: &C,
    input: &I,
    modality: Modality,
) -> Result<Prediction, ClassifierError>
where
    C: Classifier<I> + ?Sized,
    I: ?Sized,
{
    let verdict = LabelMap::for_modality(modality).label(classifier.predict(input)?);

    let (probability, source) = match classifier.predict_proba(input) {
        Ok(probs) => match max_posterior(&probs) {
            Some(p) => (p * 100.0, ConfidenceSource::Posterior),
            None => (
                fallback_confidence(verdict),
                ConfidenceSource::Fallback(format!("unusable probabilities: {probs:?}")),
            ),
        },
        Err(e) => (fallback_confidence(verdict), ConfidenceSource::Fallback(e.to_string())),
    };

    if let ConfidenceSource::Fallback(reason) = &source {
        tracing::debug!(
            model = classifier.name(),
            modality = %modality,
            reason = %reason,
            "Probability unavailable, using fallback confidence"
        );
        counter!("probability_fallback_total", "modality" => modality.as_str()).increment(1);
    }

    Ok(Prediction {
        verdict,
        confidence: round2(probability),
        source,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
