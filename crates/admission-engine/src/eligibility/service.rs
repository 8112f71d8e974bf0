use std::collections::BTreeSet;
use std::sync::Arc;

use rand::Rng;
use serde::Serialize;
use tracing::debug;

use super::matching::{
    evaluate, pick_random, EligibilityResult, MatchMode, MatchQuery, MatchRequest,
};
use super::score::ScoreError;
use super::weighted::{rank_programs, score_criteria, WeightedCriteria, WeightedRanking};
use crate::admissions::{AdmissionRepository, ListingFilter, RepositoryError};

/// Filter options offered to candidates, taken from the programme catalogue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Facets {
    pub institutions: Vec<String>,
    pub cities: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum EligibilityError {
    #[error(transparent)]
    Score(#[from] ScoreError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Read-only candidate queries over the admission table.
pub struct EligibilityService<R> {
    repository: Arc<R>,
}

impl<R> EligibilityService<R>
where
    R: AdmissionRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Every programme within reach, highest stored threshold first.
    pub fn matches(&self, query: &MatchQuery) -> Result<Vec<EligibilityResult>, EligibilityError> {
        let request = query.validate()?;
        let listings = self.repository.list_joined(&request.source_filter())?;
        let results = evaluate(listings, &request);
        debug!(score = %request.score, results = results.len(), "eligibility matches computed");
        Ok(results)
    }

    /// One programme drawn uniformly from those [`Self::matches`] would list.
    pub fn pick_random<G>(
        &self,
        query: &MatchQuery,
        rng: &mut G,
    ) -> Result<Option<EligibilityResult>, EligibilityError>
    where
        G: Rng + ?Sized,
    {
        let request = query.validate()?;
        let listings = self.repository.list_joined(&request.source_filter())?;
        let picked = pick_random(listings, &request, rng);
        debug!(score = %request.score, found = picked.is_some(), "random eligibility pick");
        Ok(picked)
    }

    /// Runs a validated request in the given mode; random mode yields at most one result.
    pub fn run<G>(
        &self,
        request: &MatchRequest,
        mode: MatchMode,
        rng: &mut G,
    ) -> Result<Vec<EligibilityResult>, RepositoryError>
    where
        G: Rng + ?Sized,
    {
        let listings = self.repository.list_joined(&request.source_filter())?;
        Ok(match mode {
            MatchMode::All => evaluate(listings, request),
            MatchMode::Random => pick_random(listings, request, rng).into_iter().collect(),
        })
    }

    pub fn weighted_ranking(
        &self,
        criteria: &WeightedCriteria,
    ) -> Result<WeightedRanking, RepositoryError> {
        let score = score_criteria(criteria);
        let listings = self.repository.list_joined(&ListingFilter::ordered_by_id())?;
        debug!(
            total = score.total,
            category = ?score.category,
            programs = listings.len(),
            "weighted ranking computed"
        );
        Ok(rank_programs(listings, &score))
    }

    pub fn facets(&self) -> Result<Facets, RepositoryError> {
        let mut institutions = BTreeSet::new();
        let mut cities = BTreeSet::new();
        for program in self.repository.programs()? {
            institutions.extend(non_blank(program.institution));
            cities.extend(non_blank(program.city));
        }

        Ok(Facets {
            institutions: institutions.into_iter().collect(),
            cities: cities.into_iter().collect(),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
