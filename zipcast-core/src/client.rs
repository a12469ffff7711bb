use async_trait::async_trait;
use std::fmt::Debug;

use crate::{Config, model::{Units, WeatherResult}};

pub mod http;

pub use http::HttpWeatherClient;

/// Message used when the backend fails without saying why.
pub const GENERIC_FAILURE: &str = "Request failed.";

/// Fetches current conditions and forecast for a zip.
///
/// Implementations never return an error: every failure mode is folded into
/// [`WeatherResult::Failure`].
#[async_trait]
pub trait WeatherClient: Send + Sync + Debug {
    async fn fetch_weather(&self, zip: &str, units: Units) -> WeatherResult;
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Reported by the backend; shown to the user as is.
    #[error("{0}")]
    Server(String),
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
    #[error(transparent)]
    Decode(#[from] serde_json::Error),
}

/// Construct the HTTP client for the configured backend.
pub fn client_from_config(config: &Config) -> anyhow::Result<HttpWeatherClient> {
    HttpWeatherClient::new(config.base_url())
}
