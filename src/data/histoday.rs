use chrono::DateTime;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use crate::data::types::{PricePoint, PriceSeries, SeriesError};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("price history endpoint returned {status}")]
    Status { status: StatusCode },
    #[error("endpoint reported error: {0}")]
    Endpoint(String),
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("invalid price series: {0}")]
    InvalidSeries(#[from] SeriesError),
}

/// Client for the CryptoCompare `histoday` endpoint.
pub struct HistodayClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HistodayResponse {
    #[serde(rename = "Response", default)]
    response: Option<String>,
    #[serde(rename = "Message", default)]
    message: Option<String>,
    #[serde(rename = "Data", default)]
    data: Vec<HistodayRecord>,
}

#[derive(Debug, Deserialize)]
struct HistodayRecord {
    time: i64,
    close: f64,
}

impl HistodayClient {
    pub fn new(base_url: String, api_key: Option<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| FetchError::Http {
                url: base_url.clone(),
                source,
            })?;

        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }

    /// Fetch `limit` days of daily close history for a trading pair.
    ///
    /// One GET, no retry; any failure aborts the fetch.
    pub async fn fetch_daily(
        &self,
        fsym: &str,
        tsym: &str,
        limit: u32,
    ) -> Result<PriceSeries, FetchError> {
        let url = format!(
            "{}/data/histoday?fsym={}&tsym={}&limit={}",
            self.base_url, fsym, tsym, limit
        );

        let mut request = self.client.get(&url);
        if let Some(key) = &self.api_key {
            request = request.header("authorization", format!("Apikey {}", key));
        }

        let response = request.send().await.map_err(|source| FetchError::Http {
            url: url.clone(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status { status });
        }

        let body: HistodayResponse =
            response
                .json()
                .await
                .map_err(|e| FetchError::Malformed(e.to_string()))?;

        parse_response(body)
    }
}

/// Convert the endpoint's per-day records into a validated PriceSeries.
///
/// CryptoCompare signals failures in-band with HTTP 200 and
/// `"Response": "Error"`, so that is checked before the payload.
fn parse_response(body: HistodayResponse) -> Result<PriceSeries, FetchError> {
    if body.response.as_deref() == Some("Error") {
        return Err(FetchError::Endpoint(
            body.message.unwrap_or_else(|| "unspecified error".to_string()),
        ));
    }

    let mut points = Vec::with_capacity(body.data.len());
    for record in body.data {
        let timestamp = DateTime::from_timestamp(record.time, 0)
            .ok_or_else(|| FetchError::Malformed(format!("bad epoch timestamp {}", record.time)))?;
        points.push(PricePoint {
            timestamp,
            close: record.close,
        });
    }

    Ok(PriceSeries::new(points)?)
}
