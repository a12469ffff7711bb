//! Core library for the `zipcast` weather lookup widget.
//!
//! This crate defines:
//! - The weather client talking to the backend `/api/weather` endpoint
//! - Persistent, bounded search history over a key-value store
//! - Forecast chart lifecycle on top of a pluggable renderer
//! - The search controller wiring these to a view
//!
//! It is used by `zipcast-cli`, but any front end implementing
//! [`View`] and [`ChartBackend`] can drive it.

pub mod chart;
pub mod client;
pub mod config;
pub mod controller;
pub mod history;
pub mod model;
pub mod store;

pub use chart::{ChartBackend, ChartHandle, ChartId, ChartRenderer, ChartSpec};
pub use client::{HttpWeatherClient, WeatherClient};
pub use config::Config;
pub use controller::{SearchController, SearchForm, SearchState, View};
pub use history::{HistoryList, HistoryStore};
pub use model::{
    CurrentConditions, DailyRange, ForecastPoint, ForecastSeries, HistoryEntry, Units,
    WeatherResult,
};
pub use store::{FileStore, KeyValueStore, MemoryStore};
