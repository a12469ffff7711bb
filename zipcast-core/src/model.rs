use std::{collections::BTreeMap, fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Temperature system requested from the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    /// Celsius.
    Metric,
    /// Fahrenheit.
    #[default]
    Imperial,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
        }
    }

    /// Single-letter scale shown next to temperatures and history entries.
    pub fn symbol(&self) -> char {
        match self {
            Units::Metric => 'C',
            Units::Imperial => 'F',
        }
    }

    pub const fn all() -> &'static [Units] {
        &[Units::Metric, Units::Imperial]
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Units {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.trim().to_lowercase();

        match lower.as_str() {
            "metric" => Ok(Units::Metric),
            "imperial" => Ok(Units::Imperial),
            _ => Err(anyhow::anyhow!(
                "Unknown units '{value}'. Supported units: metric, imperial."
            )),
        }
    }
}

impl FromStr for Units {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Units::try_from(s)
    }
}

/// One remembered query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub zip: String,
    pub units: Units,
}

impl HistoryEntry {
    pub fn new(zip: impl Into<String>, units: Units) -> Self {
        Self {
            zip: zip.into(),
            units,
        }
    }

    /// Text of the history button, e.g. `10001 (F)`.
    pub fn label(&self) -> String {
        format!("{} ({})", self.zip, self.units.symbol())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CurrentConditions {
    pub name: String,
    pub temperature: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastPoint {
    /// Epoch seconds.
    pub timestamp: i64,
    pub temperature: f64,
}

impl ForecastPoint {
    pub fn time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.timestamp, 0)
    }
}

/// Per-day temperature span derived from the forecast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyRange {
    pub date: NaiveDate,
    pub min: f64,
    pub max: f64,
}

/// Format of the x-axis label for each point.
pub const LABEL_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";

/// Days reported by [`ForecastSeries::daily_ranges`].
pub const MAX_FORECAST_DAYS: usize = 5;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForecastSeries {
    pub points: Vec<ForecastPoint>,
}

impl ForecastSeries {
    pub fn new(points: Vec<ForecastPoint>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn temperatures(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.temperature).collect()
    }

    /// Point times rendered in `tz`; timestamps chrono cannot represent
    /// come out as the raw number.
    pub fn labels_in<Tz>(&self, tz: &Tz) -> Vec<String>
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        self.points
            .iter()
            .map(|p| match p.time() {
                Some(utc) => utc.with_timezone(tz).format(LABEL_FORMAT).to_string(),
                None => p.timestamp.to_string(),
            })
            .collect()
    }

    /// Groups the points by calendar date in `tz` and returns the first
    /// [`MAX_FORECAST_DAYS`] days in date order.
    pub fn daily_ranges<Tz: TimeZone>(&self, tz: &Tz) -> Vec<DailyRange> {
        let mut days: BTreeMap<NaiveDate, (f64, f64)> = BTreeMap::new();

        for point in &self.points {
            let Some(utc) = point.time() else {
                continue;
            };
            let date = utc.with_timezone(tz).date_naive();
            let t = point.temperature;

            days.entry(date)
                .and_modify(|(min, max)| {
                    *min = min.min(t);
                    *max = max.max(t);
                })
                .or_insert((t, t));
        }

        days.into_iter()
            .take(MAX_FORECAST_DAYS)
            .map(|(date, (min, max))| DailyRange { date, min, max })
            .collect()
    }
}

/// Outcome of a lookup, as consumed by the chart and the status line.
#[derive(Debug, Clone, PartialEq)]
pub enum WeatherResult {
    Success {
        current: CurrentConditions,
        forecast: ForecastSeries,
    },
    Failure {
        message: String,
    },
}

impl WeatherResult {
    pub fn failure(message: impl Into<String>) -> Self {
        WeatherResult::Failure {
            message: message.into(),
        }
    }
}

/// Rounds to the nearest integer, halves going up (`72.5 -> 73`, `-2.5 -> -2`).
pub fn round_temperature(t: f64) -> i64 {
    (t + 0.5).floor() as i64
}
