use std::fmt;

use chrono::TimeZone;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::dates::{DateNormalizer, LocalDay, RawDate};
use crate::domain::common::{DatedRecord, Identifiable};
use crate::errors::InputError;

/// Opaque record identifier assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            Int(i64),
            Text(String),
        }
        Ok(match Wire::deserialize(deserializer)? {
            Wire::Int(value) => RecordId(value.to_string()),
            Wire::Text(value) => RecordId(value),
        })
    }
}

/// Numeric field as it arrives from the store: a number, a numeric string, or nothing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawAmount {
    Number(f64),
    Text(String),
    #[default]
    Missing,
}

impl From<f64> for RawAmount {
    fn from(value: f64) -> Self {
        RawAmount::Number(value)
    }
}

impl From<&str> for RawAmount {
    fn from(value: &str) -> Self {
        RawAmount::Text(value.to_string())
    }
}

pub fn try_coerce_amount(raw: &RawAmount) -> Result<f64, InputError> {
    let value = match raw {
        RawAmount::Number(value) => *value,
        RawAmount::Text(text) => {
            let trimmed = text.trim();
            let normalized = if trimmed.contains('.') {
                trimmed.to_string()
            } else {
                trimmed.replacen(',', ".", 1)
            };
            normalized
                .parse::<f64>()
                .map_err(|_| InputError::InvalidAmount(text.clone()))?
        }
        RawAmount::Missing => return Err(InputError::InvalidAmount("<missing>".into())),
    };
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(InputError::InvalidAmount(value.to_string()))
    }
}

/// Tolerant amount coercion: anything unusable counts as zero.
pub fn coerce_amount(raw: &RawAmount) -> f64 {
    match try_coerce_amount(raw) {
        Ok(value) => value,
        Err(err) => {
            if !matches!(raw, RawAmount::Missing) {
                tracing::warn!(%err, "amount coerced to zero");
            }
            0.0
        }
    }
}

/// Record shape shared by both resources of the remote store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(default, alias = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(default, alias = "fecha", skip_serializing_if = "Option::is_none")]
    pub date: Option<RawDate>,
    #[serde(default, alias = "amountEarned", alias = "amount_earned", alias = "monto")]
    pub amount: RawAmount,
    #[serde(default, alias = "descripcion", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, alias = "categoria", skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl RawRecord {
    fn day<Tz: TimeZone>(&self, normalizer: &DateNormalizer<Tz>) -> Option<LocalDay> {
        normalizer.normalize(self.date.as_ref()?)
    }

    fn id_or_generate(&self) -> RecordId {
        self.id.clone().unwrap_or_else(RecordId::generate)
    }
}

fn non_empty(text: Option<&String>) -> Option<String> {
    text.map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// A day the user worked and what it paid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkDayRecord {
    pub id: RecordId,
    pub date: LocalDay,
    pub amount_earned: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl WorkDayRecord {
    pub fn new(date: LocalDay, amount_earned: f64, description: Option<String>) -> Self {
        Self {
            id: RecordId::generate(),
            date,
            amount_earned,
            description,
        }
    }

    /// `None` when the stored date cannot be read.
    pub fn from_raw<Tz>(raw: &RawRecord, normalizer: &DateNormalizer<Tz>) -> Option<Self>
    where
        Tz: TimeZone,
    {
        Some(Self {
            id: raw.id_or_generate(),
            date: raw.day(normalizer)?,
            amount_earned: coerce_amount(&raw.amount),
            description: non_empty(raw.description.as_ref()),
        })
    }

    pub fn to_raw(&self) -> RawRecord {
        RawRecord {
            id: Some(self.id.clone()),
            date: Some(self.date.into()),
            amount: RawAmount::Number(self.amount_earned),
            description: self.description.clone(),
            category: None,
        }
    }
}

impl Identifiable for WorkDayRecord {
    fn id(&self) -> &RecordId {
        &self.id
    }
}

impl DatedRecord for WorkDayRecord {
    fn day(&self) -> LocalDay {
        self.date
    }

    fn amount(&self) -> f64 {
        self.amount_earned
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    pub id: RecordId,
    pub date: LocalDay,
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub description: String,
}

impl ExpenseRecord {
    pub fn new(
        date: LocalDay,
        amount: f64,
        category: Option<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: RecordId::generate(),
            date,
            amount,
            category,
            description: description.into(),
        }
    }

    pub fn from_raw<Tz>(raw: &RawRecord, normalizer: &DateNormalizer<Tz>) -> Option<Self>
    where
        Tz: TimeZone,
    {
        Some(Self {
            id: raw.id_or_generate(),
            date: raw.day(normalizer)?,
            amount: coerce_amount(&raw.amount),
            category: non_empty(raw.category.as_ref()),
            description: non_empty(raw.description.as_ref()).unwrap_or_default(),
        })
    }

    pub fn to_raw(&self) -> RawRecord {
        RawRecord {
            id: Some(self.id.clone()),
            date: Some(self.date.into()),
            amount: RawAmount::Number(self.amount),
            description: Some(self.description.clone()),
            category: self.category.clone(),
        }
    }
}

impl Identifiable for ExpenseRecord {
    fn id(&self) -> &RecordId {
        &self.id
    }
}

impl DatedRecord for ExpenseRecord {
    fn day(&self) -> LocalDay {
        self.date
    }

    fn amount(&self) -> f64 {
        self.amount
    }

    fn description(&self) -> Option<&str> {
        Some(self.description.as_str()).filter(|text| !text.is_empty())
    }
}

/// Converts a store listing, dropping records whose date is unreadable.
pub fn work_days_from_raw<Tz: TimeZone>(
    raws: &[RawRecord],
    normalizer: &DateNormalizer<Tz>,
) -> Vec<WorkDayRecord> {
    let records: Vec<_> = raws
        .iter()
        .filter_map(|raw| WorkDayRecord::from_raw(raw, normalizer))
        .collect();
    log_skipped("work day", raws.len(), records.len());
    records
}

pub fn expenses_from_raw<Tz: TimeZone>(
    raws: &[RawRecord],
    normalizer: &DateNormalizer<Tz>,
) -> Vec<ExpenseRecord> {
    let records: Vec<_> = raws
        .iter()
        .filter_map(|raw| ExpenseRecord::from_raw(raw, normalizer))
        .collect();
    log_skipped("expense", raws.len(), records.len());
    records
}

fn log_skipped(kind: &str, received: usize, kept: usize) {
    if kept < received {
        tracing::warn!(kind, skipped = received - kept, "records without a usable date");
    }
}
