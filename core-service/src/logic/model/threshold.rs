//! Decision Policy - Probability pair → Verdict
//!
//! Ngưỡng cố định, không cấu hình được.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::classifier::ClassProbabilities;

/// p_abnormal at or above this is flagged (inclusive)
pub const ABNORMAL_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerdictLabel {
    Abnormal,
    Normal,
}

impl VerdictLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerdictLabel::Abnormal => "Abnormal",
            VerdictLabel::Normal => "Normal",
        }
    }
}

/// Final classification with the probability of the chosen class
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub label: VerdictLabel,
    pub probability: f64,
}

impl Verdict {
    pub fn is_abnormal(&self) -> bool {
        self.label == VerdictLabel::Abnormal
    }

    pub fn percentage(&self) -> String {
        format_percentage(self.probability)
    }
}

/// Apply the fixed threshold
pub fn decide(probabilities: ClassProbabilities) -> Verdict {
    if probabilities.abnormal() >= ABNORMAL_THRESHOLD {
        Verdict {
            label: VerdictLabel::Abnormal,
            probability: probabilities.abnormal(),
        }
    } else {
        Verdict {
            label: VerdictLabel::Normal,
            probability: probabilities.normal(),
        }
    }
}

/// `0.8734` → `"87.34%"`
pub fn format_percentage(probability: f64) -> String {
    format!("{:.2}%", probability * 100.0)
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.label {
            VerdictLabel::Abnormal => write!(
                f,
                "🚨 Abnormal Usage Detected (Theft Risk: {})",
                self.percentage()
            ),
            VerdictLabel::Normal => write!(f, "✅ Normal Usage (Confidence: {})", self.percentage()),
        }
    }
}
