use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::normalizer::normalize_quotient_for_storage;

/// Storage type of a column, driving how raw text is normalised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Decimal,
    Text,
}

/// Columns of the admission-statistics table, in export order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Column {
    #[serde(rename = "id")]
    Id,
    #[serde(rename = "programKey")]
    ProgramKey,
    #[serde(rename = "admittedTotal")]
    AdmittedTotal,
    #[serde(rename = "waitlistTotal")]
    WaitlistTotal,
    #[serde(rename = "applicationsTotal")]
    ApplicationsTotal,
    #[serde(rename = "firstPriorityApplicants")]
    FirstPriorityApplicants,
    #[serde(rename = "admissionThreshold")]
    AdmissionThreshold,
    #[serde(rename = "waitlistThreshold")]
    WaitlistThreshold,
}

impl Column {
    pub const fn all() -> [Self; 8] {
        [
            Self::Id,
            Self::ProgramKey,
            Self::AdmittedTotal,
            Self::WaitlistTotal,
            Self::ApplicationsTotal,
            Self::FirstPriorityApplicants,
            Self::AdmissionThreshold,
            Self::WaitlistThreshold,
        ]
    }

    /// The six numeric statistics columns, in export order.
    pub const fn statistics() -> [Self; 6] {
        [
            Self::AdmittedTotal,
            Self::WaitlistTotal,
            Self::ApplicationsTotal,
            Self::FirstPriorityApplicants,
            Self::AdmissionThreshold,
            Self::WaitlistThreshold,
        ]
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::ProgramKey => "programKey",
            Self::AdmittedTotal => "admittedTotal",
            Self::WaitlistTotal => "waitlistTotal",
            Self::ApplicationsTotal => "applicationsTotal",
            Self::FirstPriorityApplicants => "firstPriorityApplicants",
            Self::AdmissionThreshold => "admissionThreshold",
            Self::WaitlistThreshold => "waitlistThreshold",
        }
    }

    pub const fn kind(self) -> ColumnKind {
        match self {
            Self::Id
            | Self::AdmittedTotal
            | Self::WaitlistTotal
            | Self::ApplicationsTotal
            | Self::FirstPriorityApplicants => ColumnKind::Integer,
            Self::AdmissionThreshold | Self::WaitlistThreshold => ColumnKind::Decimal,
            Self::ProgramKey => ColumnKind::Text,
        }
    }

    /// Whether imports and edits may write this column. The surrogate id never is.
    pub const fn mutable(self) -> bool {
        !matches!(self, Self::Id)
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::all()
            .into_iter()
            .find(|column| column.name() == name.trim())
    }

    /// Allow-list lookup shared by the importer and both edit paths.
    pub fn editable(name: &str) -> Option<Self> {
        Self::from_name(name).filter(|column| column.mutable())
    }

    /// Normalises raw text for storage according to the column kind.
    pub fn normalize(self, raw: Option<&str>) -> FieldValue {
        let trimmed = raw.map(str::trim).filter(|value| !value.is_empty());
        match self.kind() {
            ColumnKind::Decimal => normalize_quotient_for_storage(trimmed)
                .map(FieldValue::Decimal)
                .unwrap_or(FieldValue::Null),
            ColumnKind::Integer => trimmed
                .and_then(|value| value.parse::<i64>().ok())
                .map(FieldValue::Integer)
                .unwrap_or(FieldValue::Null),
            ColumnKind::Text => trimmed
                .map(|value| FieldValue::Text(value.to_string()))
                .unwrap_or(FieldValue::Null),
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Display-only columns that accompany the statistics in an export.
pub const DISPLAY_COLUMNS: [&str; 4] = ["name", "institution", "city", "startTerm"];

/// Optional seed-only column carrying the programme info link.
pub const INFO_LINK_COLUMN: &str = "infoLink";

/// Header row of an export, in the fixed snapshot order.
pub fn export_headers() -> Vec<&'static str> {
    let mut headers = vec![Column::Id.name(), Column::ProgramKey.name()];
    headers.extend(DISPLAY_COLUMNS);
    headers.extend(Column::statistics().map(Column::name));
    headers
}

/// Whether a header belongs to the snapshot format at all (mutable or not).
pub fn is_known_header(name: &str) -> bool {
    let name = name.trim();
    Column::from_name(name).is_some()
        || DISPLAY_COLUMNS.contains(&name)
        || name == INFO_LINK_COLUMN
}

/// A normalised cell value ready to be written to the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Integer(i64),
    Decimal(String),
    Text(String),
}

impl FieldValue {
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Decimal(value) | FieldValue::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }
}

/// Set of normalised mutable columns to apply to a single record.
///
/// Values only enter through [`Column::normalize`], so a decimal column can never
/// carry an integer payload. An empty natural key is dropped rather than stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSet {
    values: BTreeMap<Column, FieldValue>,
}

impl FieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalises `raw` for `column` and records it. Immutable columns are ignored.
    pub fn set_raw(&mut self, column: Column, raw: Option<&str>) {
        if !column.mutable() {
            return;
        }

        let value = column.normalize(raw);
        if column == Column::ProgramKey && value.is_null() {
            self.values.remove(&column);
            return;
        }

        self.values.insert(column, value);
    }

    /// Builds a field set from a raw `name -> value` row, keeping allow-listed columns only.
    pub fn from_row<'a, I>(row: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut fields = Self::new();
        for (name, value) in row {
            if let Some(column) = Column::editable(name) {
                fields.set_raw(column, Some(value));
            }
        }
        fields
    }

    pub fn get(&self, column: Column) -> Option<&FieldValue> {
        self.values.get(&column)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Column, &FieldValue)> {
        self.values.iter().map(|(column, value)| (*column, value))
    }

    pub fn columns(&self) -> impl Iterator<Item = Column> + '_ {
        self.values.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }
}
