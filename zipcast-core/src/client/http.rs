use anyhow::{Context, anyhow};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::model::{CurrentConditions, ForecastPoint, ForecastSeries, Units, WeatherResult};

use super::{ClientError, GENERIC_FAILURE, WeatherClient};

/// Path of the weather endpoint, relative to the backend base URL.
pub const WEATHER_PATH: &str = "/api/weather";

#[derive(Debug, Clone)]
pub struct HttpWeatherClient {
    endpoint: Url,
    http: Client,
}

impl HttpWeatherClient {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let raw = format!("{}{WEATHER_PATH}", base_url.trim_end_matches('/'));
        let endpoint = Url::parse(&raw)
            .with_context(|| format!("Invalid backend base URL: {base_url}"))?;

        if endpoint.cannot_be_a_base() {
            return Err(anyhow!("Invalid backend base URL: {base_url}"));
        }

        Ok(Self {
            endpoint,
            http: Client::new(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn fetch(&self, zip: &str, units: Units) -> Result<WeatherResult, ClientError> {
        let res = self
            .http
            .get(self.endpoint.clone())
            .query(&[("zip", zip), ("units", units.as_str())])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        let server_error = serde_json::from_str::<ApiErrorBody>(&body)
            .ok()
            .and_then(|b| b.error)
            .filter(|m| !m.trim().is_empty());

        if !status.is_success() {
            tracing::warn!(%status, body = %truncate_body(&body), "Weather request failed");
            return Err(ClientError::Server(
                server_error.unwrap_or_else(|| GENERIC_FAILURE.to_string()),
            ));
        }

        if let Some(message) = server_error {
            tracing::warn!(%status, %message, "Weather backend reported an error");
            return Err(ClientError::Server(message));
        }

        let parsed: ApiWeather = serde_json::from_str(&body).inspect_err(|err| {
            tracing::warn!(
                error = %err,
                body = %truncate_body(&body),
                "Malformed weather response"
            );
        })?;

        Ok(parsed.into_result())
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct ApiCurrent {
    name: String,
    main: ApiMain,
}

#[derive(Debug, Deserialize)]
struct ApiForecastEntry {
    dt: i64,
    main: ApiMain,
}

#[derive(Debug, Deserialize)]
struct ApiForecast {
    list: Vec<ApiForecastEntry>,
}

#[derive(Debug, Deserialize)]
struct ApiWeather {
    current: ApiCurrent,
    forecast: ApiForecast,
}

impl ApiWeather {
    fn into_result(self) -> WeatherResult {
        let points = self
            .forecast
            .list
            .into_iter()
            .map(|e| ForecastPoint {
                timestamp: e.dt,
                temperature: e.main.temp,
            })
            .collect();

        WeatherResult::Success {
            current: CurrentConditions {
                name: self.current.name,
                temperature: self.current.main.temp,
            },
            forecast: ForecastSeries::new(points),
        }
    }
}

#[async_trait]
impl WeatherClient for HttpWeatherClient {
    async fn fetch_weather(&self, zip: &str, units: Units) -> WeatherResult {
        match self.fetch(zip, units).await {
            Ok(result) => {
                tracing::debug!(zip, %units, "Weather fetched");
                result
            }
            Err(err) => {
                tracing::debug!(zip, %units, error = %err, "Weather fetch failed");
                WeatherResult::failure(err.to_string())
            }
        }
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}
