use super::common::*;
use std::sync::Arc;

use crate::admissions::domain::RecordId;
use crate::admissions::reconcile::{ReconciliationImporter, RowAction};
use crate::admissions::repository::AdmissionRepository;
use crate::admissions::snapshot::{ImportError, UnknownHeaderPolicy};
use crate::admissions::InMemoryAdmissionStore;

fn importer(store: &InMemoryAdmissionStore) -> ReconciliationImporter<InMemoryAdmissionStore> {
    ReconciliationImporter::new(Arc::new(store.clone()))
}

#[test]
fn inserts_new_record_for_unknown_program_key() {
    let store = seeded_store();
    let report = importer(&store)
        .reconcile(&[row(&[
            ("id", ""),
            ("programKey", "K123"),
            ("admittedTotal", "55"),
            ("admissionThreshold", "7,8"),
        ])])
        .expect("reconcile succeeds");

    assert_eq!((report.updated, report.inserted, report.skipped), (0, 1, 0));
    let entry = &report.entries[0];
    assert_eq!(entry.action, RowAction::Inserted);
    let id = entry.record_id.expect("inserted id reported");
    assert_eq!(id, RecordId(6));
    assert!(entry.message.contains("programKey=K123"));

    let stored = store.find_by_id(id).unwrap().expect("record inserted");
    assert_eq!(stored.program_key, "K123");
    assert_eq!(stored.admitted_total, Some(55));
    assert_eq!(stored.admission_threshold.as_deref(), Some("7.8"));
    assert_eq!(stored.waitlist_total, None);
}

#[test]
fn skips_rows_without_id_match_or_program_key() {
    let store = seeded_store();
    let before = store.records().unwrap();

    let report = importer(&store)
        .reconcile(&[row(&[("id", ""), ("programKey", "  "), ("admittedTotal", "10")])])
        .expect("reconcile succeeds");

    assert_eq!((report.updated, report.inserted, report.skipped), (0, 0, 1));
    assert_eq!(report.entries[0].action, RowAction::Skipped);
    assert!(report.entries[0].message.contains("missing programKey"));
    assert_eq!(store.records().unwrap(), before);
}

#[test]
fn updates_only_allow_listed_columns_by_primary_key() {
    let store = seeded_store();
    let report = importer(&store)
        .reconcile(&[row(&[
            ("id", "1"),
            ("programKey", "K100"),
            ("name", "Renamed programme"),
            ("waitlistTotal", " 14 "),
            ("admissionThreshold", "Alle optaget"),
            ("applicationsTotal", ""),
            ("notes", "ignored entirely"),
        ])])
        .expect("reconcile succeeds");

    assert_eq!(report.updated, 1);
    assert_eq!(report.entries[0].message, "updated id=1 (programKey=K100)");

    let record = store.find_by_id(RecordId(1)).unwrap().expect("record");
    assert_eq!(record.waitlist_total, Some(14));
    assert_eq!(record.admission_threshold, None);
    assert_eq!(record.applications_total, None);
    assert_eq!(record.admitted_total, Some(120));
    assert_eq!(record.waitlist_threshold.as_deref(), Some("10.5"));

    let programs = store.programs().unwrap();
    assert!(programs.iter().all(|program| program.name != "Renamed programme"));
}

#[test]
fn falls_back_to_unique_natural_key() {
    let store = seeded_store();
    let report = importer(&store)
        .reconcile(&[
            row(&[("programKey", "K200"), ("admittedTotal", "310")]),
            row(&[("id", "999"), ("programKey", "K300"), ("admissionThreshold", "6,2")]),
        ])
        .expect("reconcile succeeds");

    assert_eq!((report.updated, report.inserted, report.skipped), (2, 0, 0));
    assert_eq!(report.entries[0].record_id, Some(RecordId(2)));
    assert_eq!(report.entries[1].record_id, Some(RecordId(3)));

    let law = store.find_by_id(RecordId(2)).unwrap().expect("law");
    assert_eq!(law.admitted_total, Some(310));
    let nursing = store.find_by_id(RecordId(3)).unwrap().expect("nursing");
    assert_eq!(nursing.admission_threshold.as_deref(), Some("6.2"));
    assert!(store.find_by_id(RecordId(999)).unwrap().is_none());
}

#[test]
fn ambiguous_natural_key_falls_through_to_insert() {
    let store = seeded_store();
    let report = importer(&store)
        .reconcile(&[row(&[("programKey", "DUP"), ("admittedTotal", "12")])])
        .expect("reconcile succeeds");

    assert_eq!(report.inserted, 1);
    let records = store.records().unwrap();
    assert_eq!(
        records
            .iter()
            .filter(|record| record.program_key == "DUP")
            .count(),
        3
    );
    assert!(records
        .iter()
        .filter(|record| record.id == RecordId(4) || record.id == RecordId(5))
        .all(|record| record.admitted_total.is_none()));
}

#[test]
fn report_accounts_for_every_row_in_order() {
    let store = seeded_store();
    let rows = vec![
        row(&[("id", "2"), ("admittedTotal", "1")]),
        row(&[("programKey", "NEW-1")]),
        row(&[("id", "")]),
        row(&[("programKey", "NEW-1"), ("waitlistTotal", "3")]),
        row(&[]),
    ];
    let report = importer(&store).reconcile(&rows).expect("reconcile succeeds");

    assert_eq!(report.total(), rows.len());
    assert_eq!(report.messages().count(), rows.len());
    let actions: Vec<RowAction> = report.entries.iter().map(|entry| entry.action).collect();
    assert_eq!(
        actions,
        vec![
            RowAction::Updated,
            RowAction::Inserted,
            RowAction::Skipped,
            RowAction::Updated,
            RowAction::Skipped,
        ]
    );
    let positions: Vec<usize> = report.entries.iter().map(|entry| entry.row).collect();
    assert_eq!(positions, vec![1, 2, 3, 4, 5]);
}

#[test]
fn export_then_import_changes_nothing() {
    let store = seeded_store();
    let service = admin_service(store.clone());
    let before = store.records().unwrap();

    let exported = service.export_csv().expect("export succeeds");
    let report = service.import_csv(&exported).expect("import succeeds");

    assert_eq!(report.updated, 5);
    assert_eq!(report.inserted, 0);
    assert_eq!(report.skipped, 0);
    assert!(report.ignored_headers.is_empty());
    assert_eq!(store.records().unwrap(), before);
}

#[test]
fn failed_commit_leaves_store_untouched() {
    let failing = Arc::new(CommitFailingStore {
        inner: seeded_store(),
    });
    let before = failing.inner.records().unwrap();

    let result = ReconciliationImporter::new(failing.clone()).reconcile(&[
        row(&[("id", "1"), ("admittedTotal", "1")]),
        row(&[("programKey", "K999")]),
    ]);

    match result {
        Err(ImportError::Repository(_)) => {}
        other => panic!("expected repository failure, got {other:?}"),
    }
    assert_eq!(failing.inner.records().unwrap(), before);
}

#[test]
fn unavailable_store_fails_the_whole_call() {
    let result = ReconciliationImporter::new(Arc::new(UnavailableStore))
        .reconcile(&[row(&[("programKey", "K1")])]);
    assert!(matches!(result, Err(ImportError::Repository(_))));
}

#[test]
fn csv_import_reports_or_rejects_unknown_headers() {
    let csv = "id;programKey;admittedTotal;comment\n1;K100;121;typo fixed\n";

    let store = seeded_store();
    let report = importer(&store)
        .import_csv(csv.as_bytes())
        .expect("lenient import succeeds");
    assert_eq!(report.ignored_headers, vec!["comment".to_string()]);
    assert_eq!(
        store.find_by_id(RecordId(1)).unwrap().unwrap().admitted_total,
        Some(121)
    );

    let strict_store = seeded_store();
    let result = importer(&strict_store)
        .with_header_policy(UnknownHeaderPolicy::Reject)
        .import_csv(csv.as_bytes());
    assert!(matches!(result, Err(ImportError::UnknownHeaders(_))));
    assert_eq!(
        strict_store
            .find_by_id(RecordId(1))
            .unwrap()
            .unwrap()
            .admitted_total,
        Some(120)
    );
}
