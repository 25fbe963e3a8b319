use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

/// One basal body temperature reading, destined for `temperature_entries`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemperatureEntry {
    pub date: NaiveDate,
    pub temperature: f64,
}

/// One day flagged as a period day, destined for `period_entries`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeriodEntry {
    pub date: NaiveDate,
    pub flow_intensity: FlowIntensity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowIntensity {
    // The remote enum also knows light, heavy and spotting; the sheet only
    // records whether a day was a period day.
    Medium,
}

/// Opaque account identifier as returned by the admin API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An entry paired with its owner, serialised as a single flat row.
#[derive(Debug, Serialize)]
pub struct OwnedRow<'a, T> {
    #[serde(flatten)]
    pub entry: &'a T,
    pub user_id: &'a UserId,
}

/// Everything pulled out of one spreadsheet, in row order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedEntries {
    pub temperatures: Vec<TemperatureEntry>,
    pub periods: Vec<PeriodEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSummary {
    pub table: String,
    pub uploaded: usize,
    pub batches: usize,
}
