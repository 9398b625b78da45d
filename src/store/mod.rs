pub mod disk;
pub mod memory;

use crate::core::config::AppConfig;
use crate::core::{Item, StoreError};
use async_trait::async_trait;
use disk::DiskTable;
use futures::stream::{self, Stream};
use std::sync::Arc;
use tracing::{debug, info};

/// One page of a table scan.
#[derive(Debug, Default)]
pub struct ScanPage {
    pub items: Vec<Item>,
    /// Set when the scan stopped at `limit`; pass it back to continue.
    pub last_evaluated_key: Option<String>,
}

/// A key-value table keyed by the item `id`.
#[async_trait]
pub trait Table: Send + Sync {
    /// Returns up to `limit` items in key order, strictly after `exclusive_start_key`.
    async fn scan_page(
        &self,
        exclusive_start_key: Option<&str>,
        limit: usize,
    ) -> Result<ScanPage, StoreError>;

    /// Inserts or replaces every item in one write.
    async fn batch_put(&self, items: &[Item]) -> Result<(), StoreError>;
}

enum ScanState {
    Start,
    After(String),
    Done,
}

/// Lazily scans the whole table, yielding one batch of items per page.
pub fn scan_pages<'a>(
    table: &'a dyn Table,
    page_size: usize,
) -> impl Stream<Item = Result<Vec<Item>, StoreError>> + 'a {
    let page_size = page_size.max(1);
    stream::try_unfold(ScanState::Start, move |state| async move {
        let start_key = match state {
            ScanState::Start => None,
            ScanState::After(key) => Some(key),
            ScanState::Done => return Ok(None),
        };

        let page = table.scan_page(start_key.as_deref(), page_size).await?;
        debug!(
            items = page.items.len(),
            last_key = ?page.last_evaluated_key,
            "Scanned page"
        );

        let next = match page.last_evaluated_key {
            Some(key) => ScanState::After(key),
            None => ScanState::Done,
        };
        Ok::<_, StoreError>(Some((page.items, next)))
    })
}

/// Opens the disk-backed table named in the config.
pub fn open_table(config: &AppConfig) -> anyhow::Result<Arc<dyn Table>> {
    let path = config.data_path()?;
    info!(
        table = %config.store.table_name,
        path = %path.display(),
        "Opening table"
    );
    let table = DiskTable::open(&path, &config.store.table_name)?;
    Ok(Arc::new(table))
}
