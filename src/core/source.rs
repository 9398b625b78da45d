//! Rates source abstraction

use crate::core::error::Result;
use crate::core::rates::DailyRates;
use async_trait::async_trait;

#[async_trait]
pub trait RatesSource: Send + Sync {
    /// Returns the published days, newest first.
    async fn fetch_daily_rates(&self) -> Result<Vec<DailyRates>>;
}
