//! Candidate-facing eligibility: score validation, threshold classification,
//! matching against the admission table and the weighted six-criterion estimate.

pub mod classifier;
pub mod matching;
pub mod router;
pub mod score;
pub mod service;
pub mod weighted;

#[cfg(test)]
mod tests;

pub use classifier::{classify, scale_to_percent, Classification, EligibilityCategory};
pub use matching::{
    evaluate, pick_random, EligibilityResult, MatchMode, MatchQuery, MatchRequest, REACH_MARGIN,
};
pub use router::eligibility_router;
pub use score::{CandidateScore, ScoreError};
pub use service::{EligibilityError, EligibilityService, Facets};
pub use weighted::{
    rank_programs, score_criteria, ChanceCategory, WeightedCriteria, WeightedProgram,
    WeightedRanking, WeightedScore,
};
