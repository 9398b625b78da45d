use crate::core::{Item, StoreError};
use crate::store::{ScanPage, Table};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// In-memory table, ordered by key
#[derive(Clone, Default)]
pub struct MemoryTable {
    inner: Arc<Mutex<BTreeMap<String, Item>>>,
}

impl MemoryTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }
}

#[async_trait]
impl Table for MemoryTable {
    async fn scan_page(
        &self,
        exclusive_start_key: Option<&str>,
        limit: usize,
    ) -> Result<ScanPage, StoreError> {
        let table = self.inner.lock().await;
        let lower = match exclusive_start_key {
            Some(key) => Bound::Excluded(key.to_string()),
            None => Bound::Unbounded,
        };

        let items: Vec<Item> = table
            .range((lower, Bound::Unbounded))
            .take(limit)
            .map(|(_, item)| item.clone())
            .collect();

        let last_evaluated_key = if items.len() == limit {
            items.last().map(|item| item.id.clone())
        } else {
            None
        };
        debug!(count = items.len(), "Memory table SCAN");

        Ok(ScanPage {
            items,
            last_evaluated_key,
        })
    }

    async fn batch_put(&self, items: &[Item]) -> Result<(), StoreError> {
        let mut table = self.inner.lock().await;
        for item in items {
            table.insert(item.id.clone(), item.clone());
        }
        debug!(count = items.len(), "Memory table PUT");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, value: &str) -> Item {
        Item {
            id: id.to_string(),
            value: value.to_string(),
            diff: None,
            diff_percent: None,
        }
    }

    #[tokio::test]
    async fn test_memory_table_put_and_scan() {
        let table = MemoryTable::new();
        assert!(table.is_empty().await);

        table
            .batch_put(&[item("USD", "1.08"), item("AUD", "1.65")])
            .await
            .unwrap();

        let page = table.scan_page(None, 10).await.unwrap();
        assert_eq!(page.items, vec![item("AUD", "1.65"), item("USD", "1.08")]);
        assert!(page.last_evaluated_key.is_none());
    }

    #[tokio::test]
    async fn test_memory_table_put_overwrites() {
        let table = MemoryTable::new();
        table.batch_put(&[item("USD", "1.08")]).await.unwrap();
        table.batch_put(&[item("USD", "1.09")]).await.unwrap();

        assert_eq!(table.len().await, 1);
        let page = table.scan_page(None, 10).await.unwrap();
        assert_eq!(page.items[0].value, "1.09");
    }

    #[tokio::test]
    async fn test_memory_table_scan_is_paginated() {
        let table = MemoryTable::new();
        table
            .batch_put(&[item("AUD", "1"), item("JPY", "2"), item("USD", "3")])
            .await
            .unwrap();

        let first = table.scan_page(None, 2).await.unwrap();
        assert_eq!(first.items.len(), 2);
        assert_eq!(first.last_evaluated_key.as_deref(), Some("JPY"));

        let second = table.scan_page(Some("JPY"), 2).await.unwrap();
        assert_eq!(second.items, vec![item("USD", "3")]);
        assert!(second.last_evaluated_key.is_none());
    }

    #[tokio::test]
    async fn test_memory_table_scan_ends_with_empty_page_on_exact_multiple() {
        let table = MemoryTable::new();
        table
            .batch_put(&[
                item("AUD", "1"),
                item("JPY", "2"),
                item("NZD", "3"),
                item("USD", "4"),
            ])
            .await
            .unwrap();

        let first = table.scan_page(None, 2).await.unwrap();
        assert_eq!(first.last_evaluated_key.as_deref(), Some("JPY"));

        let second = table.scan_page(Some("JPY"), 2).await.unwrap();
        assert_eq!(second.items, vec![item("NZD", "3"), item("USD", "4")]);
        assert_eq!(second.last_evaluated_key.as_deref(), Some("USD"));

        let third = table.scan_page(Some("USD"), 2).await.unwrap();
        assert!(third.items.is_empty());
        assert!(third.last_evaluated_key.is_none());
    }
}
