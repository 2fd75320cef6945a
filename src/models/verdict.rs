use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Modality
// ---------------------------------------------------------------------------

/// Which classifier a payload is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    /// Email body text, scored by the phishing classifier.
    Text,
    /// Candidate Windows executable, scored by the malware classifier.
    Binary,
}

impl Modality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Modality::Text => "text",
            Modality::Binary => "binary",
        }
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Verdict
// ---------------------------------------------------------------------------

/// Discrete outcome label returned to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Safe,
    Phishing,
    Benign,
    Malicious,
    #[serde(rename = "Unsupported file type")]
    Unsupported,
    Error,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Safe => "Safe",
            Verdict::Phishing => "Phishing",
            Verdict::Benign => "Benign",
            Verdict::Malicious => "Malicious",
            Verdict::Unsupported => "Unsupported file type",
            Verdict::Error => "Error",
        }
    }

    /// True for the labels that raise an alarm.
    pub fn is_alarm(&self) -> bool {
        matches!(self, Verdict::Phishing | Verdict::Malicious)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// LabelMap: classifier class index → domain label
// ---------------------------------------------------------------------------

/// Fixed lookup from a binary classifier's class index to the domain label.
/// Class `1` is the positive (alarm) class; every other index is negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelMap {
    pub negative: Verdict,
    pub positive: Verdict,
}

impl LabelMap {
    pub const TEXT: LabelMap = LabelMap {
        negative: Verdict::Safe,
        positive: Verdict::Phishing,
    };

    pub const BINARY: LabelMap = LabelMap {
        negative: Verdict::Benign,
        positive: Verdict::Malicious,
    };

    pub fn for_modality(modality: Modality) -> LabelMap {
        match modality {
            Modality::Text => LabelMap::TEXT,
            Modality::Binary => LabelMap::BINARY,
        }
    }

    pub fn label(&self, class_index: usize) -> Verdict {
        if class_index == 1 {
            self.positive
        } else {
            self.negative
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_wire_name() {
        let json = serde_json::to_string(&Verdict::Unsupported).unwrap();
        assert_eq!(json, "\"Unsupported file type\"");
        assert_eq!(Verdict::Unsupported.to_string(), "Unsupported file type");
    }

    #[test]
    fn test_label_map_is_fixed_lookup() {
        assert_eq!(LabelMap::TEXT.label(1), Verdict::Phishing);
        assert_eq!(LabelMap::TEXT.label(0), Verdict::Safe);
        assert_eq!(LabelMap::BINARY.label(1), Verdict::Malicious);
        assert_eq!(LabelMap::BINARY.label(0), Verdict::Benign);
        // Anything that is not the positive class maps to the negative label
        assert_eq!(LabelMap::BINARY.label(7), Verdict::Benign);
    }

    #[test]
    fn test_alarm_labels() {
        assert!(Verdict::Phishing.is_alarm());
        assert!(Verdict::Malicious.is_alarm());
        assert!(!Verdict::Safe.is_alarm());
        assert!(!Verdict::Benign.is_alarm());
        assert!(!Verdict::Error.is_alarm());
    }
}
