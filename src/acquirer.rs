/*
 *  acquirer.rs
 *
 *  MetarMap - flight categories in lights
 *  (c) 2020-26 Stuart Hunter
 *
 *  Batched METAR acquisition from the aviationweather.gov data API
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use log::{debug, info, warn};
use reqwest::{header, Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::config::MetarSettings;
use crate::metar::{parse_batch, WeatherSnapshot};
use crate::stations::StationId;

const VERSION: &str = concat!("MetarMap/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum MetarError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("upstream returned status {0}")]
    Status(StatusCode),
    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("unexpected response shape: {0}")]
    UnexpectedShape(String),
}

/// Anything that can produce a snapshot for a set of stations.
///
/// A source never fails outward: trouble is logged and an empty snapshot
/// returned, which the loop reads as "no new information".
pub trait MetarSource {
    fn fetch(&self, ids: &[StationId]) -> impl std::future::Future<Output = WeatherSnapshot> + Send;
}

pub struct MetarClient {
    client: Client,
    base_url: String,
    lookback_hours: u32,
}

impl MetarClient {
    pub fn new(settings: &MetarSettings) -> Result<Self, MetarError> {
        let mut headers = header::HeaderMap::new();
        headers.insert("User-Agent", header::HeaderValue::from_static(VERSION));
        headers.insert("Accept", header::HeaderValue::from_static("application/json"));

        let timeout = Duration::from_secs(settings.timeout_secs);
        let client = Client::builder()
            .connect_timeout(timeout.min(Duration::from_secs(10)))
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: settings.base_url.clone(),
            lookback_hours: settings.lookback_hours,
        })
    }

    /// One request for every id; the error path is left to the caller
    pub async fn try_fetch(&self, ids: &[StationId]) -> Result<WeatherSnapshot, MetarError> {
        if ids.is_empty() {
            return Ok(WeatherSnapshot::new());
        }

        let joined = ids.iter().map(StationId::as_str).collect::<Vec<_>>().join(",");
        let hours = self.lookback_hours.to_string();
        debug!("GET {} ids={} hours={}", self.base_url, joined, hours);

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("ids", joined.as_str()),
                ("format", "json"),
                ("taf", "false"),
                ("hours", hours.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            return Ok(WeatherSnapshot::new());
        }
        if !status.is_success() {
            return Err(MetarError::Status(status));
        }

        let body = response.text().await?;
        if body.trim().is_empty() {
            return Ok(WeatherSnapshot::new());
        }

        let records = match serde_json::from_str::<Value>(&body)? {
            Value::Array(records) => records,
            other => {
                return Err(MetarError::UnexpectedShape(format!(
                    "expected an array of reports, got {}",
                    json_kind(&other)
                )));
            }
        };

        let mut snapshot = parse_batch(&records);
        snapshot.retain(|id| ids.contains(id));
        Ok(snapshot)
    }
}

impl MetarSource for MetarClient {
    async fn fetch(&self, ids: &[StationId]) -> WeatherSnapshot {
        match self.try_fetch(ids).await {
            Ok(snapshot) => {
                info!("Received {} current reports for {} stations", snapshot.len(), ids.len());
                snapshot
            }
            Err(e) => {
                warn!("METAR fetch failed: {}", e);
                WeatherSnapshot::new()
            }
        }
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
