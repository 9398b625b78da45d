//! Read handler that reassembles the stored snapshot into the API response.
use crate::core::{Item, MetadataKey, StoreError};
use crate::store::{Table, scan_pages};
use futures::TryStreamExt;
use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use std::sync::Arc;
use tracing::{debug, info};

pub const NO_DATA_MESSAGE: &str = "No data available, please try later";
const NOT_AVAILABLE: &str = "N/A";

/// Status code and JSON body handed back to the HTTP front end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
}

impl ApiResponse {
    fn ok<T: Serialize>(body: &T) -> Result<Self, StoreError> {
        Ok(Self {
            status_code: 200,
            body: to_pretty_json(body)?,
        })
    }

    pub fn internal_error() -> Self {
        Self {
            status_code: 500,
            body: r#"{"error": "Internal server error"}"#.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRateEntry {
    pub currency: String,
    pub rate: String,
    pub change: String,
    pub change_percentage: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Snapshot {
    pub update_date: String,
    pub publish_date: String,
    pub base_currency: String,
    pub exchange_rates: Vec<ExchangeRateEntry>,
}

impl Snapshot {
    /// Splits stored items into metadata and rate entries, sorted by currency.
    pub fn from_items(items: Vec<Item>, base_currency: &str) -> Result<Self, StoreError> {
        let mut snapshot = Snapshot {
            update_date: NOT_AVAILABLE.to_string(),
            publish_date: NOT_AVAILABLE.to_string(),
            base_currency: base_currency.to_string(),
            exchange_rates: Vec::with_capacity(items.len()),
        };

        for item in items {
            match MetadataKey::from_id(&item.id) {
                Some(MetadataKey::PublishDate) => snapshot.publish_date = item.value,
                Some(MetadataKey::UpdateDate) => snapshot.update_date = item.value,
                None => snapshot.exchange_rates.push(ExchangeRateEntry::try_from(item)?),
            }
        }

        snapshot
            .exchange_rates
            .sort_by(|a, b| a.currency.cmp(&b.currency));
        Ok(snapshot)
    }
}

impl TryFrom<Item> for ExchangeRateEntry {
    type Error = StoreError;

    fn try_from(item: Item) -> Result<Self, Self::Error> {
        let missing = |field: &str| StoreError::MalformedItem {
            id: item.id.clone(),
            reason: format!("missing {field}"),
        };
        let change = item.diff.ok_or_else(|| missing("diff"))?;
        let change_percentage = item.diff_percent.ok_or_else(|| missing("diff_percent"))?;

        Ok(ExchangeRateEntry {
            currency: item.id,
            rate: item.value,
            change,
            change_percentage,
        })
    }
}

fn to_pretty_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    // serde_json only ever writes valid UTF-8
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

pub struct Reader {
    table: Arc<dyn Table>,
    page_size: usize,
    base_currency: String,
}

impl Reader {
    pub fn new(table: Arc<dyn Table>, page_size: usize, base_currency: &str) -> Self {
        Self {
            table,
            page_size,
            base_currency: base_currency.to_string(),
        }
    }

    pub async fn run(&self) -> Result<ApiResponse, StoreError> {
        info!("Reading exchange rates from store");
        let items: Vec<Item> = scan_pages(self.table.as_ref(), self.page_size)
            .try_concat()
            .await?;
        debug!(count = items.len(), "Scanned store");

        if items.is_empty() {
            info!("No data available");
            return ApiResponse::ok(&ErrorBody {
                error: NO_DATA_MESSAGE.to_string(),
            });
        }

        info!("Constructing response");
        let snapshot = Snapshot::from_items(items, &self.base_currency)?;
        ApiResponse::ok(&snapshot)
    }
}
