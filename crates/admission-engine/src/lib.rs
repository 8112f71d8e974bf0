//! Admission statistics reconciliation and eligibility matching.
//!
//! The [`admissions`] module owns the canonical admission-statistics table: the
//! typed column schema, value normalisation, the store abstraction, CSV snapshot
//! I/O, reconciliation imports and administrative edits. The [`eligibility`]
//! module compares a candidate's grade average against historical thresholds.

pub mod admissions;
pub mod config;
pub mod eligibility;
pub mod error;
pub mod telemetry;
