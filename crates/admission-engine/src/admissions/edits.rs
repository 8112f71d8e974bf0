use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::domain::RecordId;
use super::repository::RepositoryError;
use super::schema::{Column, FieldSet};

/// A single-cell change submitted from the admin table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FieldEdit {
    #[serde(deserialize_with = "deserialize_record_id")]
    pub id: RecordId,
    pub column: String,
    #[serde(default, deserialize_with = "deserialize_cell")]
    pub value: Option<String>,
}

impl FieldEdit {
    pub fn new(id: RecordId, column: impl Into<String>, value: Option<&str>) -> Self {
        Self {
            id,
            column: column.into(),
            value: value.map(str::to_string),
        }
    }

    /// Allow-listed column and its normalised value, or `None` for a disallowed column.
    pub(crate) fn field_set(&self) -> Option<(Column, FieldSet)> {
        let column = Column::editable(&self.column)?;
        let mut fields = FieldSet::new();
        fields.set_raw(column, self.value.as_deref());
        Some((column, fields))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatchEditSummary {
    pub applied: usize,
    pub skipped: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum EditError {
    #[error("column '{0}' cannot be edited")]
    UnknownColumn(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

fn deserialize_record_id<'de, D>(deserializer: D) -> Result<RecordId, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Number(number) => number
            .as_i64()
            .map(RecordId)
            .ok_or_else(|| serde::de::Error::custom("record id must be an integer")),
        Value::String(text) => RecordId::parse(&text)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid record id '{text}'"))),
        other => Err(serde::de::Error::custom(format!(
            "record id must be a number or string, got {other}"
        ))),
    }
}

/// Cell values arrive as strings from inputs but may be numbers or null.
pub(crate) fn deserialize_cell<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(text) => Ok(Some(text)),
        Value::Number(number) => Ok(Some(number.to_string())),
        other => Err(serde::de::Error::custom(format!(
            "cell value must be a string, number or null, got {other}"
        ))),
    }
}
