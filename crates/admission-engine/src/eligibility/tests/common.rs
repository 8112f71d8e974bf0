use std::sync::Arc;

use crate::admissions::{AdmissionRecord, InMemoryAdmissionStore, ProgramInfo, RecordId};
use crate::eligibility::EligibilityService;

fn program(key: &str, name: &str, institution: &str, city: &str) -> ProgramInfo {
    ProgramInfo {
        program_key: key.to_string(),
        name: name.to_string(),
        institution: Some(institution.to_string()),
        city: Some(city.to_string()),
        start_term: Some("Summer".to_string()),
        info_link: Some(format!("https://programmes.example/{key}")),
    }
}

/// Six programmes across two cities. Dentistry stores a comma decimal and
/// Nursing an open-admission phrase, which the store treats as non-numeric.
pub(super) fn catalogue_store() -> InMemoryAdmissionStore {
    let store = InMemoryAdmissionStore::new();
    let entries = [
        (1, "P1", "Medicine", "Aarhus University", "Aarhus", Some("11.2")),
        (2, "P2", "Law", "Copenhagen University", "Copenhagen", Some("9.8")),
        (3, "P3", "Nursing", "VIA University College", "Aarhus N", Some("Alle optaget")),
        (4, "P4", "Biology", "Copenhagen University", "Copenhagen", Some("9.0")),
        (5, "P5", "History", "Aarhus University", "Aarhus", None),
        (6, "P6", "Dentistry", "Copenhagen University", "Frederiksberg", Some("10,4")),
    ];

    for (id, key, name, institution, city, threshold) in entries {
        store
            .add_program(program(key, name, institution, city))
            .expect("program added");
        let mut record = AdmissionRecord::new(RecordId(id), key);
        record.admission_threshold = threshold.map(str::to_string);
        store.put_record(record).expect("record stored");
    }
    store
}

pub(super) fn eligibility_service(
    store: InMemoryAdmissionStore,
) -> Arc<EligibilityService<InMemoryAdmissionStore>> {
    Arc::new(EligibilityService::new(Arc::new(store)))
}
