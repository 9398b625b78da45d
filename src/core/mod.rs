//! Core business logic abstractions

pub mod config;
pub mod error;
pub mod log;
pub mod rates;
pub mod source;

// Re-export main types for cleaner imports
pub use error::{Error, Result, StoreError};
pub use rates::{DailyRates, Item, MetadataKey, MetadataRow, RateRow};
pub use source::RatesSource;
