use crate::core::{Item, StoreError};
use crate::store::{ScanPage, Table};
use async_trait::async_trait;
use fjall::{Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use std::ops::Bound;
use std::path::Path;
use tracing::debug;

/// Table stored as a fjall partition, one JSON document per key.
pub struct DiskTable {
    keyspace: Keyspace,
    partition: PartitionHandle,
}

impl DiskTable {
    pub fn open(path: &Path, table_name: &str) -> Result<Self, StoreError> {
        std::fs::create_dir_all(path)?;

        let keyspace = fjall::Config::new(path).open()?;
        let partition = keyspace.open_partition(table_name, PartitionCreateOptions::default())?;
        Ok(Self {
            keyspace,
            partition,
        })
    }
}

#[async_trait]
impl Table for DiskTable {
    async fn scan_page(
        &self,
        exclusive_start_key: Option<&str>,
        limit: usize,
    ) -> Result<ScanPage, StoreError> {
        let lower = match exclusive_start_key {
            Some(key) => Bound::Excluded(key.as_bytes().to_vec()),
            None => Bound::Unbounded,
        };

        let mut items = Vec::new();
        for pair in self.partition.range((lower, Bound::Unbounded)).take(limit) {
            let (_, value) = pair?;
            let item: Item = serde_json::from_slice(&value)?;
            items.push(item);
        }

        let last_evaluated_key = if items.len() == limit {
            items.last().map(|item| item.id.clone())
        } else {
            None
        };
        debug!(count = items.len(), "Disk table SCAN");

        Ok(ScanPage {
            items,
            last_evaluated_key,
        })
    }

    async fn batch_put(&self, items: &[Item]) -> Result<(), StoreError> {
        let mut batch = self.keyspace.batch();
        for item in items {
            batch.insert(&self.partition, item.id.as_bytes(), serde_json::to_vec(item)?);
        }
        batch.commit()?;
        self.keyspace.persist(PersistMode::SyncAll)?;
        debug!(count = items.len(), "Disk table PUT");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn rate_item(id: &str, value: &str) -> Item {
        Item {
            id: id.to_string(),
            value: value.to_string(),
            diff: Some("+0.0012".to_string()),
            diff_percent: Some("+0.1105 %".to_string()),
        }
    }

    #[tokio::test]
    async fn test_disk_table_put_and_scan() {
        let dir = tempdir().unwrap();
        let table = DiskTable::open(dir.path(), "rates").unwrap();

        // Initially, table is empty
        let page = table.scan_page(None, 10).await.unwrap();
        assert!(page.items.is_empty());
        assert!(page.last_evaluated_key.is_none());

        table
            .batch_put(&[rate_item("USD", "1.0876"), rate_item("AUD", "1.6502")])
            .await
            .unwrap();

        let page = table.scan_page(None, 10).await.unwrap();
        assert_eq!(
            page.items,
            vec![rate_item("AUD", "1.6502"), rate_item("USD", "1.0876")]
        );
    }

    #[tokio::test]
    async fn test_disk_table_pagination() {
        let dir = tempdir().unwrap();
        let table = DiskTable::open(dir.path(), "rates").unwrap();
        table
            .batch_put(&[
                rate_item("AUD", "1"),
                rate_item("JPY", "2"),
                rate_item("USD", "3"),
            ])
            .await
            .unwrap();

        let first = table.scan_page(None, 2).await.unwrap();
        assert_eq!(first.items.len(), 2);
        assert_eq!(first.last_evaluated_key.as_deref(), Some("JPY"));

        let second = table.scan_page(Some("JPY"), 2).await.unwrap();
        assert_eq!(second.items, vec![rate_item("USD", "3")]);
        assert!(second.last_evaluated_key.is_none());
    }

    #[tokio::test]
    async fn test_disk_table_persists_across_reopen() {
        let dir = tempdir().unwrap();
        {
            let table = DiskTable::open(dir.path(), "rates").unwrap();
            table.batch_put(&[rate_item("USD", "1.0876")]).await.unwrap();
        }

        let table = DiskTable::open(dir.path(), "rates").unwrap();
        let page = table.scan_page(None, 10).await.unwrap();
        assert_eq!(page.items, vec![rate_item("USD", "1.0876")]);
    }

    #[tokio::test]
    async fn test_disk_table_rejects_corrupt_value() {
        let dir = tempdir().unwrap();
        let table = DiskTable::open(dir.path(), "rates").unwrap();
        table
            .partition
            .insert("USD".as_bytes(), "not json".as_bytes())
            .unwrap();

        let result = table.scan_page(None, 10).await;
        assert!(matches!(result, Err(StoreError::Serialization(_))));
    }

    #[tokio::test]
    async fn test_disk_table_scan_ends_with_empty_page_on_exact_multiple() {
        let dir = tempdir().unwrap();
        let table = DiskTable::open(dir.path(), "rates").unwrap();
        table
            .batch_put(&[
                rate_item("AUD", "1"),
                rate_item("JPY", "2"),
                rate_item("NZD", "3"),
                rate_item("USD", "4"),
            ])
            .await
            .unwrap();

        let second = table.scan_page(Some("JPY"), 2).await.unwrap();
        assert_eq!(second.items.len(), 2);
        assert_eq!(second.last_evaluated_key.as_deref(), Some("USD"));

        let third = table.scan_page(Some("USD"), 2).await.unwrap();
        assert!(third.items.is_empty());
        assert!(third.last_evaluated_key.is_none());
    }
}
