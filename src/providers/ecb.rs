use crate::core::{DailyRates, Error, RatesSource, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, instrument};

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "Cube")]
    cube: OuterCube,
}

#[derive(Debug, Deserialize)]
struct OuterCube {
    #[serde(rename = "Cube", default)]
    days: Vec<DayCube>,
}

/// Attributes are only required on the days being compared.
#[derive(Debug, Deserialize)]
struct DayCube {
    #[serde(rename = "@time")]
    time: Option<String>,
    #[serde(rename = "Cube", default)]
    rates: Vec<RateCube>,
}

#[derive(Debug, Deserialize)]
struct RateCube {
    #[serde(rename = "@currency")]
    currency: Option<String>,
    #[serde(rename = "@rate")]
    rate: Option<String>,
}

/// Number of newest days the update compares.
const DAYS_COMPARED: usize = 2;

impl DayCube {
    fn into_daily_rates(self) -> Result<DailyRates> {
        let date = self
            .time
            .ok_or_else(|| Error::Parse("Day entry without a time attribute".to_string()))?;

        let rates = self
            .rates
            .into_iter()
            .map(|r| match (r.currency, r.rate) {
                (Some(currency), Some(rate)) => {
                    Ok((currency.trim().to_string(), rate.trim().to_string()))
                }
                _ => Err(Error::Parse(format!(
                    "Incomplete rate entry on {}",
                    date.trim()
                ))),
            })
            .collect::<Result<_>>()?;

        Ok(DailyRates {
            date: date.trim().to_string(),
            rates,
        })
    }
}

/// Parses the reference rates envelope, keeping the two newest days in document order.
pub fn parse_document(xml: &str) -> Result<Vec<DailyRates>> {
    let envelope: Envelope = quick_xml::de::from_str(xml)
        .map_err(|e| Error::Parse(format!("Invalid rates document: {e}")))?;

    envelope
        .cube
        .days
        .into_iter()
        .take(DAYS_COMPARED)
        .map(DayCube::into_daily_rates)
        .collect()
}

/// Euro foreign exchange reference rates published by the ECB.
pub struct EcbProvider {
    url: String,
    client: reqwest::Client,
}

impl EcbProvider {
    pub fn new(url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("fxsnap/1.0")
            .timeout(timeout)
            .build()
            .map_err(|source| Error::Fetch {
                url: url.to_string(),
                source,
            })?;

        Ok(EcbProvider {
            url: url.to_string(),
            client,
        })
    }

    async fn download(&self) -> std::result::Result<String, reqwest::Error> {
        self.client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await
    }
}

#[async_trait]
impl RatesSource for EcbProvider {
    #[instrument(name = "EcbFetch", skip(self), fields(url = %self.url))]
    async fn fetch_daily_rates(&self) -> Result<Vec<DailyRates>> {
        info!("Downloading exchange rates from European Central Bank");
        let body = self.download().await.map_err(|source| Error::Fetch {
            url: self.url.clone(),
            source,
        })?;
        debug!(bytes = body.len(), "Downloaded rates document");

        parse_document(&body)
    }
}
