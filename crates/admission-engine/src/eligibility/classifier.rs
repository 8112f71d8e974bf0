use serde::{Deserialize, Serialize};

use crate::admissions::{SCALE_MAX, SCALE_MIN};

/// Outcome band for a candidate against one programme threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EligibilityCategory {
    /// No threshold: every qualified applicant was admitted.
    Open,
    Far,
    Close,
    Exact,
    SafeLow,
    Safe,
}

impl EligibilityCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            EligibilityCategory::Open => "open",
            EligibilityCategory::Far => "far",
            EligibilityCategory::Close => "close",
            EligibilityCategory::Exact => "exact",
            EligibilityCategory::SafeLow => "safe_low",
            EligibilityCategory::Safe => "safe",
        }
    }

    /// Band owning a gap already rounded to one decimal.
    ///
    /// Works on whole tenths so boundary values land in the band that
    /// closes on them: -0.6 is far, -0.1 and 0.0 are exact, 0.1 is safe-low.
    fn from_gap(gap: f64) -> Self {
        let tenths = (gap * 10.0).round() as i64;
        match tenths {
            i64::MIN..=-6 => EligibilityCategory::Far,
            -5..=-2 => EligibilityCategory::Close,
            -1..=0 => EligibilityCategory::Exact,
            1..=5 => EligibilityCategory::SafeLow,
            _ => EligibilityCategory::Safe,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    /// `candidate - threshold` rounded to one decimal; `None` when open.
    pub gap: Option<f64>,
    pub category: EligibilityCategory,
    pub message: String,
}

pub fn classify(candidate: f64, threshold: Option<f64>) -> Classification {
    let Some(threshold) = threshold else {
        return Classification {
            gap: None,
            category: EligibilityCategory::Open,
            message: "open admission, no threshold".to_string(),
        };
    };

    let gap = round_tenth(candidate - threshold);
    let category = EligibilityCategory::from_gap(gap);
    let distance = gap.abs();
    let message = match category {
        EligibilityCategory::Far => format!("far off – short by {distance:.1} points"),
        EligibilityCategory::Close => format!("close – short by {distance:.1} points"),
        EligibilityCategory::Exact => "spot on".to_string(),
        EligibilityCategory::SafeLow => {
            format!("slightly above threshold by {distance:.1} points")
        }
        EligibilityCategory::Safe => {
            format!("comfortably admitted – {distance:.1} points above threshold")
        }
        EligibilityCategory::Open => "open admission, no threshold".to_string(),
    };

    Classification {
        gap: Some(gap),
        category,
        message,
    }
}

/// Position of a grade on the scale as a 0-100 gauge value.
pub fn scale_to_percent(value: f64) -> f64 {
    ((value - SCALE_MIN) / (SCALE_MAX - SCALE_MIN) * 100.0).clamp(0.0, 100.0)
}

/// Rounds to one decimal, ties to even on the exact binary value.
///
/// `{:.1}` formats from the exact value of the float, so 0.25 becomes 0.2 and
/// 0.35 (stored as 0.34999..) becomes 0.3.
pub(crate) fn round_tenth(value: f64) -> f64 {
    format!("{value:.1}").parse().unwrap_or(value)
}
