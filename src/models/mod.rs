pub mod response;
pub mod verdict;

pub use response::{BinaryVerdict, EmailRequest, TextVerdict};
pub use verdict::{LabelMap, Modality, Verdict};

use chrono::{DateTime, Utc};
use serde::Serialize;

// ---------------------------------------------------------------------------
// ModelProvenance: what was loaded at startup, and from where
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ModelProvenance {
    pub text: String,
    pub binary: String,
    pub source: String,
    pub loaded_at: DateTime<Utc>,
}
