use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::classifier::{classify, scale_to_percent, EligibilityCategory};
use super::score::{CandidateScore, ScoreError};
use crate::admissions::edits::deserialize_cell;
use crate::admissions::{
    parse_quotient, AdmissionListing, ListingFilter, ListingOrder, ProgramInfo, RecordId,
    SCALE_MIN,
};

/// How far above the candidate a threshold may sit and still be listed.
pub const REACH_MARGIN: f64 = 0.5;

/// Raw match form as submitted; the score is validated by [`MatchQuery::validate`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchQuery {
    #[serde(default, deserialize_with = "deserialize_cell")]
    pub score: Option<String>,
    #[serde(default)]
    pub include_above_threshold: bool,
    #[serde(default)]
    pub institution: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
}

impl MatchQuery {
    pub fn validate(&self) -> Result<MatchRequest, ScoreError> {
        let score = CandidateScore::parse(self.score.as_deref().unwrap_or_default())?;
        Ok(MatchRequest {
            score,
            include_above_threshold: self.include_above_threshold,
            institution: self.institution.clone(),
            city: self.city.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchRequest {
    pub score: CandidateScore,
    pub include_above_threshold: bool,
    pub institution: Option<String>,
    pub city: Option<String>,
}

impl MatchRequest {
    pub fn new(score: CandidateScore) -> Self {
        Self {
            score,
            include_above_threshold: false,
            institution: None,
            city: None,
        }
    }

    fn ceiling(&self) -> Option<f64> {
        (!self.include_above_threshold).then(|| self.score.value() + REACH_MARGIN)
    }

    /// Store-level pre-filter, ordered by stored threshold then name.
    pub fn source_filter(&self) -> ListingFilter {
        ListingFilter {
            institution: self.institution.clone(),
            city: self.city.clone(),
            threshold_ceiling: self.ceiling(),
            order: ListingOrder::ThresholdDescThenName,
        }
    }
}

/// Whether a match call lists every eligible programme or draws one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    #[default]
    All,
    Random,
}

/// One programme annotated for a candidate. Computed per request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityResult {
    pub record_id: RecordId,
    pub program: ProgramInfo,
    pub candidate_score: CandidateScore,
    pub threshold: Option<f64>,
    pub threshold_label: String,
    pub gap: Option<f64>,
    pub category: EligibilityCategory,
    pub message: String,
    pub score_gauge: f64,
    pub threshold_gauge: f64,
}

/// Annotates listings already fetched with [`MatchRequest::source_filter`].
///
/// Input order is kept. Rows whose parsed threshold exceeds the reach margin
/// are dropped here even if the store let them through.
pub fn evaluate(listings: Vec<AdmissionListing>, request: &MatchRequest) -> Vec<EligibilityResult> {
    let ceiling = request.ceiling();
    listings
        .into_iter()
        .filter_map(|listing| {
            let threshold = parse_quotient(listing.record.admission_threshold.as_deref());
            if let (Some(ceiling), Some(threshold)) = (ceiling, threshold) {
                if threshold > ceiling {
                    return None;
                }
            }
            Some(annotate(listing, request.score, threshold))
        })
        .collect()
}

/// Draws one eligible result uniformly; `None` when nothing is eligible.
pub fn pick_random<G>(
    listings: Vec<AdmissionListing>,
    request: &MatchRequest,
    rng: &mut G,
) -> Option<EligibilityResult>
where
    G: Rng + ?Sized,
{
    evaluate(listings, request).choose(rng).cloned()
}

fn annotate(
    listing: AdmissionListing,
    score: CandidateScore,
    threshold: Option<f64>,
) -> EligibilityResult {
    let classification = classify(score.value(), threshold);
    let threshold_label = match threshold {
        Some(value) => format!("{value:.1}"),
        None => "open admission".to_string(),
    };

    EligibilityResult {
        record_id: listing.record.id,
        program: listing.program,
        candidate_score: score,
        threshold,
        threshold_label,
        gap: classification.gap,
        category: classification.category,
        message: classification.message,
        score_gauge: scale_to_percent(score.value()),
        threshold_gauge: scale_to_percent(threshold.unwrap_or(SCALE_MIN)),
    }
}
