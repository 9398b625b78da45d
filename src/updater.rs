//! Scheduled job that refreshes the stored snapshot from the rates source.
use crate::core::{DailyRates, Error, Item, MetadataRow, RateRow, RatesSource, Result};
use crate::store::Table;
use chrono::{NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info};

const DIFF_DECIMAL_PLACES: u32 = 4;

/// Rounds to four places, half to even, with negative zero folded into zero.
fn round_diff(value: Decimal) -> Decimal {
    let rounded =
        value.round_dp_with_strategy(DIFF_DECIMAL_PLACES, RoundingStrategy::MidpointNearestEven);
    if rounded.is_zero() {
        Decimal::ZERO
    } else {
        rounded
    }
}

/// Renders a change with an explicit `+` when strictly positive.
///
/// Trailing zeros are dropped but one fractional digit is always kept,
/// so zero prints as `0.0` and one half as `0.5`.
pub fn format_signed(value: Decimal) -> String {
    let value = value.normalize();
    let mut text = value.abs().to_string();
    if !text.contains('.') {
        text.push_str(".0");
    }

    if value.is_zero() {
        text
    } else if value.is_sign_positive() {
        format!("+{text}")
    } else {
        format!("-{text}")
    }
}

fn parse_rate(currency: &str, rate: &str) -> Result<Decimal> {
    Decimal::from_str(rate)
        .map_err(|e| Error::Parse(format!("Invalid rate '{rate}' for {currency}: {e}")))
}

/// Builds a rate row for every currency quoted on both days.
pub fn compute_rows(latest: &DailyRates, previous: &DailyRates) -> Result<Vec<RateRow>> {
    let mut rows = Vec::with_capacity(latest.rates.len());

    for (currency, rate) in &latest.rates {
        let Some(previous_rate) = previous.rates.get(currency) else {
            debug!(%currency, "Skipping currency missing from previous day");
            continue;
        };

        let latest_value = parse_rate(currency, rate)?;
        let previous_value = parse_rate(currency, previous_rate)?;
        if previous_value.is_zero() {
            return Err(Error::Parse(format!("Previous rate for {currency} is zero")));
        }

        let out_of_range = || Error::Parse(format!("Rate change for {currency} is out of range"));
        let diff = latest_value
            .checked_sub(previous_value)
            .map(round_diff)
            .ok_or_else(out_of_range)?;
        let diff_percent = diff
            .checked_div(previous_value)
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .map(round_diff)
            .ok_or_else(out_of_range)?;

        rows.push(RateRow {
            currency: currency.clone(),
            value: rate.clone(),
            diff: format_signed(diff),
            diff_percent: format!("{} %", format_signed(diff_percent)),
        });
    }

    Ok(rows)
}

pub struct Updater {
    source: Arc<dyn RatesSource>,
    table: Arc<dyn Table>,
    batch_size: usize,
}

impl Updater {
    pub fn new(source: Arc<dyn RatesSource>, table: Arc<dyn Table>, batch_size: usize) -> Self {
        Self {
            source,
            table,
            batch_size: batch_size.max(1),
        }
    }

    /// Runs one update cycle stamped with today's UTC date.
    pub async fn run(&self) -> Result<()> {
        self.run_on(Utc::now().date_naive()).await
    }

    pub async fn run_on(&self, today: NaiveDate) -> Result<()> {
        let days = self.source.fetch_daily_rates().await?;

        let [latest, previous, ..] = days.as_slice() else {
            return Err(Error::Parse(format!(
                "Expected at least two days of rates, found {}",
                days.len()
            )));
        };
        info!(
            publish_date = %latest.date,
            previous_date = %previous.date,
            currencies = latest.rates.len(),
            "Parsed exchange rates"
        );

        let rows = compute_rows(latest, previous)?;

        let mut items: Vec<Item> = rows.into_iter().map(Item::from).collect();
        items.push(MetadataRow::publish_date(&latest.date).into());
        items.push(MetadataRow::update_date(today).into());

        info!(rows = items.len(), "Updating exchange rates in store");
        for batch in items.chunks(self.batch_size) {
            self.table.batch_put(batch).await?;
            debug!(count = batch.len(), "Wrote batch");
        }

        info!("Job completed");
        Ok(())
    }
}
