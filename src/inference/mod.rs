pub mod classifier;
pub mod engine;
pub mod features;
pub mod linear;
pub mod normalizer;
pub mod validator;

pub use classifier::{BinaryClassifier, Classifier, ClassifierError, Classifiers, TextClassifier};
pub use engine::{classify, ConfidenceSource, Prediction};
pub use features::{extract_features, ExtractionError, FeatureVector, FEATURE_DIM};
pub use linear::{BinaryModel, ModelArtifact, TextModel};
pub use normalizer::{binary_response, text_response, Outcome};
pub use validator::{decode_text, validate_binary, Rejection, PE_MAGIC, UNSUPPORTED_NOTE};
