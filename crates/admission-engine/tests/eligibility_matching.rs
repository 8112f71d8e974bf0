use std::sync::Arc;

use admission_engine::admissions::InMemoryAdmissionStore;
use admission_engine::eligibility::{
    ChanceCategory, EligibilityCategory, EligibilityService, MatchQuery, WeightedCriteria,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::json;

fn service() -> EligibilityService<InMemoryAdmissionStore> {
    let data = include_bytes!("fixtures/admission_snapshot.csv");
    let store = InMemoryAdmissionStore::load_snapshot(&data[..]).expect("fixture loads");
    EligibilityService::new(Arc::new(store))
}

fn query(payload: serde_json::Value) -> MatchQuery {
    serde_json::from_value(payload).expect("query parses")
}

#[test]
fn reachable_programmes_are_classified_and_ordered() {
    let results = service()
        .matches(&query(json!({ "score": "9,5" })))
        .expect("matches computed");

    let summary: Vec<(&str, EligibilityCategory)> = results
        .iter()
        .map(|result| (result.program.name.as_str(), result.category))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("Law", EligibilityCategory::Exact),
            ("Architecture", EligibilityCategory::Exact),
            ("Biology", EligibilityCategory::SafeLow),
            ("History", EligibilityCategory::Open),
            ("Nursing", EligibilityCategory::Open),
        ]
    );

    let biology = &results[2];
    assert_eq!(biology.gap, Some(0.5));
    assert_eq!(biology.message, "slightly above threshold by 0.5 points");
    assert!(biology.score_gauge > biology.threshold_gauge);

    let nursing = &results[4];
    assert_eq!(nursing.threshold_label, "open admission");
    assert_eq!(nursing.threshold_gauge, 0.0);
}

#[test]
fn including_everything_keeps_far_programmes() {
    let results = service()
        .matches(&query(json!({
            "score": "7.0",
            "includeAboveThreshold": true,
            "institution": "Copenhagen University"
        })))
        .expect("matches computed");

    let names: Vec<&str> = results
        .iter()
        .map(|result| result.program.name.as_str())
        .collect();
    assert_eq!(names, vec!["Dentistry", "Biology", "History"]);
    assert_eq!(results[0].message, "far off – short by 3.4 points");
}

#[test]
fn random_mode_honours_the_reach_margin() {
    let service = service();
    let mut rng = StdRng::seed_from_u64(2024);

    for _ in 0..50 {
        let picked = service
            .pick_random(&query(json!({ "score": "9.0" })), &mut rng)
            .expect("query valid")
            .expect("some programme is reachable");
        let threshold = picked.threshold.unwrap_or(2.0);
        assert!(threshold <= 9.5, "{} is out of reach", picked.program.name);
    }
}

#[test]
fn weighted_estimate_applies_to_every_programme() {
    let criteria: WeightedCriteria = serde_json::from_value(json!({
        "quotient": "8.0",
        "workExperience": "3",
        "stayAbroad": "3",
        "folkHighSchool": "3",
        "application": "3",
        "projects": "3"
    }))
    .expect("criteria parse");

    let ranking = service().weighted_ranking(&criteria).expect("ranking");
    assert_eq!(ranking.score.category, ChanceCategory::Good);
    assert_eq!(ranking.programs.len(), 7);
    assert_eq!(ranking.programs[0].program.name, "Architecture");
}
