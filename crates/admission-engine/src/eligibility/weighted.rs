//! Candidate-level chance estimate across six criteria.
//!
//! The grade average contributes up to five points on a linear scale and five
//! self-assessed criteria contribute up to five points each. The resulting
//! chance is the same for every programme; programmes are only ordered by it.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::admissions::edits::deserialize_cell;
use crate::admissions::{parse_quotient, AdmissionListing, ProgramInfo, RecordId};
use crate::admissions::{SCALE_MAX, SCALE_MIN};

pub const POINTS_PER_CRITERION: u32 = 5;
pub const CRITERIA: u32 = 6;
pub const MAX_POINTS: u32 = POINTS_PER_CRITERION * CRITERIA;

/// Raw form inputs. Anything missing or unparsable counts as zero points.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightedCriteria {
    #[serde(default, deserialize_with = "deserialize_cell")]
    pub quotient: Option<String>,
    #[serde(default, deserialize_with = "deserialize_cell")]
    pub work_experience: Option<String>,
    #[serde(default, deserialize_with = "deserialize_cell")]
    pub stay_abroad: Option<String>,
    #[serde(default, deserialize_with = "deserialize_cell")]
    pub folk_high_school: Option<String>,
    #[serde(default, deserialize_with = "deserialize_cell")]
    pub application: Option<String>,
    #[serde(default, deserialize_with = "deserialize_cell")]
    pub projects: Option<String>,
}

impl WeightedCriteria {
    fn sub_scores(&self) -> [u32; 5] {
        [
            &self.work_experience,
            &self.stay_abroad,
            &self.folk_high_school,
            &self.application,
            &self.projects,
        ]
        .map(|raw| sub_score(raw.as_deref()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChanceCategory {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl ChanceCategory {
    pub fn from_chance(chance: f64) -> Self {
        if chance >= 0.80 {
            ChanceCategory::Excellent
        } else if chance >= 0.55 {
            ChanceCategory::Good
        } else if chance >= 0.35 {
            ChanceCategory::Fair
        } else {
            ChanceCategory::Poor
        }
    }

    /// Sort rank, best first.
    pub fn rank(&self) -> u8 {
        match self {
            ChanceCategory::Excellent => 1,
            ChanceCategory::Good => 2,
            ChanceCategory::Fair => 3,
            ChanceCategory::Poor => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightedScore {
    pub quotient_score: f64,
    pub total: f64,
    pub max_points: u32,
    /// `total / max_points`, between 0 and 1.
    pub chance: f64,
    pub category: ChanceCategory,
}

pub fn score_criteria(criteria: &WeightedCriteria) -> WeightedScore {
    let quotient_score = quotient_points(criteria.quotient.as_deref());
    let total = quotient_score + criteria.sub_scores().iter().sum::<u32>() as f64;
    let chance = total / MAX_POINTS as f64;

    WeightedScore {
        quotient_score,
        total,
        max_points: MAX_POINTS,
        chance,
        category: ChanceCategory::from_chance(chance),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightedProgram {
    pub record_id: RecordId,
    pub program: ProgramInfo,
    pub category: ChanceCategory,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightedRanking {
    pub score: WeightedScore,
    pub programs: Vec<WeightedProgram>,
}

/// Tags every listing with the candidate's category, best rank then name first.
pub fn rank_programs(listings: Vec<AdmissionListing>, score: &WeightedScore) -> WeightedRanking {
    let mut programs: Vec<WeightedProgram> = listings
        .into_iter()
        .map(|listing| WeightedProgram {
            record_id: listing.record.id,
            program: listing.program,
            category: score.category,
        })
        .collect();

    programs.sort_by(|left, right| {
        match left.category.rank().cmp(&right.category.rank()) {
            Ordering::Equal => left.program.name.cmp(&right.program.name),
            other => other,
        }
    });

    WeightedRanking {
        score: *score,
        programs,
    }
}

fn quotient_points(raw: Option<&str>) -> f64 {
    let Some(quotient) = parse_quotient(raw) else {
        return 0.0;
    };
    let points = (quotient - SCALE_MIN) / (SCALE_MAX - SCALE_MIN) * POINTS_PER_CRITERION as f64;
    points.clamp(0.0, POINTS_PER_CRITERION as f64)
}

fn sub_score(raw: Option<&str>) -> u32 {
    raw.and_then(|value| value.trim().parse::<i64>().ok())
        .map(|points| points.clamp(0, POINTS_PER_CRITERION as i64) as u32)
        .unwrap_or(0)
}
