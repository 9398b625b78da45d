//! Exchange rate records and the row shapes shared by the updater and reader

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Key of the metadata row holding the source's publish date.
pub const PUBLISH_DATE_KEY: &str = "publish_date";
/// Key of the metadata row holding the date of the last update run.
pub const UPDATE_DATE_KEY: &str = "update_date";

/// One day of reference rates as published by the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyRates {
    pub date: String,
    pub rates: BTreeMap<String, String>,
}

/// A currency's current rate and its change against the previous day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateRow {
    pub currency: String,
    pub value: String,
    pub diff: String,
    pub diff_percent: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataKey {
    PublishDate,
    UpdateDate,
}

impl MetadataKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetadataKey::PublishDate => PUBLISH_DATE_KEY,
            MetadataKey::UpdateDate => UPDATE_DATE_KEY,
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            PUBLISH_DATE_KEY => Some(MetadataKey::PublishDate),
            UPDATE_DATE_KEY => Some(MetadataKey::UpdateDate),
            _ => None,
        }
    }
}

/// Singleton row carrying a date label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataRow {
    pub key: MetadataKey,
    pub value: String,
}

impl MetadataRow {
    pub fn publish_date(label: &str) -> Self {
        Self {
            key: MetadataKey::PublishDate,
            value: label.to_string(),
        }
    }

    pub fn update_date(date: NaiveDate) -> Self {
        Self {
            key: MetadataKey::UpdateDate,
            value: date.format("%Y-%m-%d").to_string(),
        }
    }
}

/// Stored form of a row, keyed by `id`.
///
/// Rate rows carry all four attributes; metadata rows only `id` and `value`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff_percent: Option<String>,
}

impl From<RateRow> for Item {
    fn from(row: RateRow) -> Self {
        Item {
            id: row.currency,
            value: row.value,
            diff: Some(row.diff),
            diff_percent: Some(row.diff_percent),
        }
    }
}

impl From<MetadataRow> for Item {
    fn from(row: MetadataRow) -> Self {
        Item {
            id: row.key.as_str().to_string(),
            value: row.value,
            diff: None,
            diff_percent: None,
        }
    }
}
