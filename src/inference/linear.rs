//! Artifact-backed linear classifiers.
//!
//! Both models reduce an input to a single decision margin
//! `w · x + b`; class `1` is predicted when the margin is positive. When the
//! artifact was exported with `probability: true` the margin is passed
//! through a logistic sigmoid, otherwise the model only yields hard labels
//! and `predict_proba` reports [`ClassifierError::ProbabilityUnsupported`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::classifier::{Classifier, ClassifierError};

/// On-disk model artifact, tagged by `kind`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    TextLinear(TextModel),
    BinaryLinear(BinaryModel),
}

impl ModelArtifact {
    pub fn kind(&self) -> &'static str {
        match self {
            ModelArtifact::TextLinear(_) => "text_linear",
            ModelArtifact::BinaryLinear(_) => "binary_linear",
        }
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn probabilities(margin: f64) -> Vec<f64> {
    let p = sigmoid(margin);
    vec![1.0 - p, p]
}

fn class_of(margin: f64) -> usize {
    usize::from(margin > 0.0)
}

// ---------------------------------------------------------------------------
// TextModel: TF-IDF + linear decision function
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextModel {
    pub name: String,
    /// Token → column index.
    pub vocabulary: HashMap<String, usize>,
    pub idf: Vec<f64>,
    pub coef: Vec<f64>,
    pub intercept: f64,
    #[serde(default)]
    pub probability: bool,
}

/// Lowercased runs of two or more word characters.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|t| t.chars().count() >= 2)
        .map(|t| t.to_lowercase())
        .collect()
}

impl TextModel {
    pub fn validate(&self) -> Result<(), ClassifierError> {
        let n = self.vocabulary.len();
        if self.idf.len() != n || self.coef.len() != n {
            return Err(ClassifierError::InvalidModel(format!(
                "vocabulary has {n} terms but idf has {} and coef has {}",
                self.idf.len(),
                self.coef.len()
            )));
        }
        if let Some((term, idx)) = self.vocabulary.iter().find(|(_, &idx)| idx >= n) {
            return Err(ClassifierError::InvalidModel(format!(
                "term {term:?} maps to column {idx} outside 0..{n}"
            )));
        }
        Ok(())
    }

    /// L2-normalised TF-IDF weights of the in-vocabulary terms, keyed by column.
    fn transform(&self, text: &str) -> HashMap<usize, f64> {
        let mut tf: HashMap<usize, f64> = HashMap::new();
        for token in tokenize(text) {
            if let Some(&idx) = self.vocabulary.get(&token) {
                *tf.entry(idx).or_insert(0.0) += 1.0;
            }
        }

        for (idx, w) in tf.iter_mut() {
            *w *= self.idf[*idx];
        }

        let norm = tf.values().map(|w| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for w in tf.values_mut() {
                *w /= norm;
            }
        }
        tf
    }

    pub fn decision_function(&self, text: &str) -> f64 {
        self.transform(text)
            .into_iter()
            .map(|(idx, w)| w * self.coef[idx])
            .sum::<f64>()
            + self.intercept
    }
}

impl Classifier<str> for TextModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn predict(&self, input: &str) -> Result<usize, ClassifierError> {
        Ok(class_of(self.decision_function(input)))
    }

    fn predict_proba(&self, input: &str) -> Result<Vec<f64>, ClassifierError> {
        if !self.probability {
            return Err(ClassifierError::ProbabilityUnsupported);
        }
        Ok(probabilities(self.decision_function(input)))
    }
}

// ---------------------------------------------------------------------------
// BinaryModel: standardised features + linear decision function
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BinaryModel {
    pub name: String,
    pub feature_dim: usize,
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
    pub coef: Vec<f64>,
    pub intercept: f64,
    #[serde(default)]
    pub probability: bool,
}

impl BinaryModel {
    pub fn validate(&self) -> Result<(), ClassifierError> {
        let dim = self.feature_dim;
        for (field, len) in [
            ("mean", self.mean.len()),
            ("scale", self.scale.len()),
            ("coef", self.coef.len()),
        ] {
            if len != dim {
                return Err(ClassifierError::InvalidModel(format!(
                    "{field} has {len} entries, feature_dim is {dim}"
                )));
            }
        }
        Ok(())
    }

    pub fn decision_function(&self, features: &[f32]) -> Result<f64, ClassifierError> {
        if features.len() != self.feature_dim {
            return Err(ClassifierError::DimensionMismatch {
                expected: self.feature_dim,
                actual: features.len(),
            });
        }

        let margin = features
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .zip(&self.coef)
            .map(|((&x, (&mu, &sigma)), &w)| {
                // Constant columns were exported with zero scale
                let sigma = if sigma == 0.0 { 1.0 } else { sigma };
                w * ((f64::from(x) - mu) / sigma)
            })
            .sum::<f64>();

        Ok(margin + self.intercept)
    }
}

impl Classifier<[f32]> for BinaryModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn predict(&self, input: &[f32]) -> Result<usize, ClassifierError> {
        Ok(class_of(self.decision_function(input)?))
    }

    fn predict_proba(&self, input: &[f32]) -> Result<Vec<f64>, ClassifierError> {
        if !self.probability {
            return Err(ClassifierError::ProbabilityUnsupported);
        }
        Ok(probabilities(self.decision_function(input)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_model(probability: bool) -> TextModel {
        let terms = [("verify", 2.0), ("account", 1.5), ("meeting", -2.0)];
        TextModel {
            name: "test-text".into(),
            vocabulary: terms
                .iter()
                .enumerate()
                .map(|(i, (t, _))| (t.to_string(), i))
                .collect(),
            idf: vec![1.0; terms.len()],
            coef: terms.iter().map(|(_, w)| *w).collect(),
            intercept: -0.25,
            probability,
        }
    }

    fn binary_model(dim: usize, intercept: f64, probability: bool) -> BinaryModel {
        BinaryModel {
            name: "test-binary".into(),
            feature_dim: dim,
            mean: vec![0.0; dim],
            scale: vec![1.0; dim],
            coef: vec![0.0; dim],
            intercept,
            probability,
        }
    }

    #[test]
    fn test_tokenize() {
        assert_eq!(
            tokenize("Verify your ACCOUNT at http://x.example/a"),
            vec!["verify", "your", "account", "at", "http", "example"]
        );
        assert!(tokenize("a b c").is_empty());
    }

    #[test]
    fn test_text_prediction() {
        let model = text_model(true);
        assert_eq!(model.predict("please verify your account").unwrap(), 1);
        assert_eq!(model.predict("meeting at noon").unwrap(), 0);
        // No known terms → intercept only
        assert_eq!(model.predict("lorem ipsum").unwrap(), 0);
    }

    #[test]
    fn test_text_probabilities_sum_to_one() {
        let probs = text_model(true).predict_proba("verify account").unwrap();
        assert_eq!(probs.len(), 2);
        assert!((probs[0] + probs[1] - 1.0).abs() < 1e-12);
        assert!(probs[1] > 0.5);
    }

    #[test]
    fn test_margin_only_text_model() {
        let err = text_model(false).predict_proba("verify").unwrap_err();
        assert_eq!(err, ClassifierError::ProbabilityUnsupported);
    }

    #[test]
    fn test_text_validate_rejects_ragged_weights() {
        let mut model = text_model(true);
        model.coef.pop();
        assert!(matches!(model.validate(), Err(ClassifierError::InvalidModel(_))));
    }

    #[test]
    fn test_binary_dimension_mismatch() {
        let model = binary_model(4, 1.0, true);
        let err = model.predict(&[0.0; 3]).unwrap_err();
        assert_eq!(
            err,
            ClassifierError::DimensionMismatch {
                expected: 4,
                actual: 3
            }
        );
    }

    #[test]
    fn test_binary_zero_scale_column() {
        let mut model = binary_model(2, 0.0, true);
        model.scale = vec![0.0, 1.0];
        model.coef = vec![1.0, 0.0];
        assert_eq!(model.predict(&[3.0, 0.0]).unwrap(), 1);
    }

    #[test]
    fn test_artifact_tagging() {
        let json = serde_json::to_value(ModelArtifact::BinaryLinear(binary_model(1, 0.0, false)))
            .unwrap();
        assert_eq!(json["kind"], "binary_linear");

        let parsed: ModelArtifact = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.kind(), "binary_linear");
    }
}
