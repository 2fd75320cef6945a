use std::sync::Arc;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ClassifierError {
    /// The model has no probability output (e.g. a margin-only linear model).
    #[error("classifier does not support probability estimates")]
    ProbabilityUnsupported,

    #[error("feature dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("invalid model: {0}")]
    InvalidModel(String),
}

/// A pre-trained binary classifier, shared read-only across requests.
///
/// `predict` returns the class index, where `1` is the positive (alarm)
/// class. `predict_proba` returns one probability per class; models that
/// cannot estimate probabilities keep the default body.
pub trait Classifier<I: ?Sized>: Send + Sync {
    /// Short identifier used in logs and `/health`.
    fn name(&self) -> &str;

    fn predict(&self, input: &I) -> Result<usize, ClassifierError>;

    fn predict_proba(&self, _input: &I) -> Result<Vec<f64>, ClassifierError> {
        Err(ClassifierError::ProbabilityUnsupported)
    }
}

pub type TextClassifier = Arc<dyn Classifier<str>>;
pub type BinaryClassifier = Arc<dyn Classifier<[f32]>>;

/// The two handles provisioned at startup. Cloning shares the same models.
#[derive(Clone)]
pub struct Classifiers {
    pub text: TextClassifier,
    pub binary: BinaryClassifier,
}

impl Classifiers {
    pub fn new(text: TextClassifier, binary: BinaryClassifier) -> Self {
        Self { text, binary }
    }
}

impl std::fmt::Debug for Classifiers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Classifiers")
            .field("text", &self.text.name())
            .field("binary", &self.binary.name())
            .finish()
    }
}
