use std::fmt;

use serde::Serialize;

use crate::admissions::{SCALE_MAX, SCALE_MIN};

/// A validated grade average on the `[2.0, 12.7]` scale.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct CandidateScore(f64);

impl CandidateScore {
    /// Parses user input, accepting a comma decimal separator.
    pub fn parse(raw: &str) -> Result<Self, ScoreError> {
        let text = raw.trim().replace(',', ".");
        let value = text
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or_else(|| ScoreError::InvalidFormat(raw.trim().to_string()))?;
        Self::new(value)
    }

    pub fn new(value: f64) -> Result<Self, ScoreError> {
        if !(SCALE_MIN..=SCALE_MAX).contains(&value) {
            return Err(ScoreError::OutOfRange(value));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for CandidateScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.0)
    }
}

/// Rejected candidate input; messages are shown to the user as-is.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScoreError {
    #[error("enter a valid number between 2 and 12.7 (got '{0}')")]
    InvalidFormat(String),
    #[error("score must be between 2 and 12.7 (got {0})")]
    OutOfRange(f64),
}
