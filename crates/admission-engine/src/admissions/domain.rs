use std::fmt;

use serde::{Deserialize, Serialize};

use super::schema::{Column, FieldSet, FieldValue};

/// Surrogate key assigned by the store; immutable once created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub i64);

impl RecordId {
    /// Lenient parse used for ids arriving as CSV or form text.
    pub fn parse(raw: &str) -> Option<Self> {
        raw.trim().parse::<i64>().ok().map(Self)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Historical admission statistics for one programme offer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdmissionRecord {
    pub id: RecordId,
    pub program_key: String,
    pub admitted_total: Option<i64>,
    pub waitlist_total: Option<i64>,
    pub applications_total: Option<i64>,
    pub first_priority_applicants: Option<i64>,
    /// Canonical period-separated decimal, `None` for open admission.
    pub admission_threshold: Option<String>,
    pub waitlist_threshold: Option<String>,
}

impl AdmissionRecord {
    pub fn new(id: RecordId, program_key: impl Into<String>) -> Self {
        Self {
            id,
            program_key: program_key.into(),
            admitted_total: None,
            waitlist_total: None,
            applications_total: None,
            first_priority_applicants: None,
            admission_threshold: None,
            waitlist_threshold: None,
        }
    }

    /// Writes every column present in `fields`; absent columns are left untouched.
    pub fn apply(&mut self, fields: &FieldSet) {
        for (column, value) in fields.iter() {
            match column {
                Column::Id => {}
                Column::ProgramKey => {
                    if let Some(key) = value.as_text() {
                        self.program_key = key.to_string();
                    }
                }
                Column::AdmittedTotal => self.admitted_total = value.as_integer(),
                Column::WaitlistTotal => self.waitlist_total = value.as_integer(),
                Column::ApplicationsTotal => self.applications_total = value.as_integer(),
                Column::FirstPriorityApplicants => {
                    self.first_priority_applicants = value.as_integer()
                }
                Column::AdmissionThreshold => {
                    self.admission_threshold = value.as_text().map(str::to_string)
                }
                Column::WaitlistThreshold => {
                    self.waitlist_threshold = value.as_text().map(str::to_string)
                }
            }
        }
    }

    /// Current value of a column in its stored form.
    pub fn value(&self, column: Column) -> FieldValue {
        let integer = |value: Option<i64>| value.map(FieldValue::Integer).unwrap_or(FieldValue::Null);
        let decimal = |value: &Option<String>| {
            value
                .clone()
                .map(FieldValue::Decimal)
                .unwrap_or(FieldValue::Null)
        };

        match column {
            Column::Id => FieldValue::Integer(self.id.0),
            Column::ProgramKey => FieldValue::Text(self.program_key.clone()),
            Column::AdmittedTotal => integer(self.admitted_total),
            Column::WaitlistTotal => integer(self.waitlist_total),
            Column::ApplicationsTotal => integer(self.applications_total),
            Column::FirstPriorityApplicants => integer(self.first_priority_applicants),
            Column::AdmissionThreshold => decimal(&self.admission_threshold),
            Column::WaitlistThreshold => decimal(&self.waitlist_threshold),
        }
    }

    /// Stored value rendered as a CSV cell (`None` for null).
    pub fn cell(&self, column: Column) -> Option<String> {
        match self.value(column) {
            FieldValue::Null => None,
            FieldValue::Integer(value) => Some(value.to_string()),
            FieldValue::Decimal(value) | FieldValue::Text(value) => Some(value),
        }
    }
}

/// Read-only programme description joined to a record by its natural key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramInfo {
    pub program_key: String,
    pub name: String,
    pub institution: Option<String>,
    pub city: Option<String>,
    pub start_term: Option<String>,
    pub info_link: Option<String>,
}

/// A record joined with the programme it describes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdmissionListing {
    pub record: AdmissionRecord,
    pub program: ProgramInfo,
}
