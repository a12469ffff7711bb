//! Lifecycle of the single forecast chart.
//!
//! Drawing is delegated to a [`ChartBackend`]; this module only decides what
//! to draw and guarantees that at most one chart is live at a time.

use chrono::{Local, TimeZone};

use crate::model::{DailyRange, ForecastSeries};

pub use crate::model::LABEL_FORMAT;

/// Dataset label of the temperature line.
pub const DATASET_LABEL: &str = "Forecast Temp";

/// Identifier a backend assigns to a chart it created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChartId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickOptions {
    pub max_rotation: u16,
    pub auto_skip: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartOptions {
    pub responsive: bool,
    pub animation: bool,
    /// Bezier curve tension of the line.
    pub tension: f64,
    pub x_ticks: TickOptions,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            responsive: true,
            animation: false,
            tension: 0.25,
            x_ticks: TickOptions {
                max_rotation: 0,
                auto_skip: true,
            },
        }
    }
}

/// Everything a backend needs to draw the forecast line chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub dataset_label: String,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    /// Per-day min/max, for backends that print a summary.
    pub daily: Vec<DailyRange>,
    pub options: ChartOptions,
}

impl ChartSpec {
    /// Line chart of `series` with x labels in the local time zone.
    pub fn line(series: &ForecastSeries) -> Self {
        Self::line_in(series, &Local)
    }

    pub fn line_in<Tz>(series: &ForecastSeries, tz: &Tz) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        Self {
            dataset_label: DATASET_LABEL.to_string(),
            labels: series.labels_in(tz),
            values: series.temperatures(),
            daily: series.daily_ranges(tz),
            options: ChartOptions::default(),
        }
    }
}

/// External renderer. `destroy` must release everything `create` allocated.
pub trait ChartBackend {
    fn create(&mut self, spec: &ChartSpec) -> anyhow::Result<ChartId>;

    fn destroy(&mut self, id: ChartId);
}

/// The live chart. Not `Clone`: only the renderer holds one.
#[derive(Debug, PartialEq)]
pub struct ChartHandle {
    id: ChartId,
    points: usize,
}

impl ChartHandle {
    pub fn id(&self) -> ChartId {
        self.id
    }

    pub fn points(&self) -> usize {
        self.points
    }
}

#[derive(Debug)]
pub struct ChartRenderer<B> {
    backend: B,
    current: Option<ChartHandle>,
}

impl<B: ChartBackend> ChartRenderer<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            current: None,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn current(&self) -> Option<&ChartHandle> {
        self.current.as_ref()
    }

    /// Tears down the held chart, if any.
    pub fn release(&mut self) {
        if let Some(handle) = self.current.take() {
            tracing::trace!(id = handle.id.0, "Destroying chart");
            self.backend.destroy(handle.id);
        }
    }

    /// Replaces the held chart with one drawn from `series`.
    ///
    /// The previous chart is released before the new one is created, even
    /// if creation then fails.
    pub fn render(&mut self, series: &ForecastSeries) -> anyhow::Result<&ChartHandle> {
        self.release();

        let spec = ChartSpec::line(series);
        let id = self.backend.create(&spec)?;
        tracing::trace!(id = id.0, points = spec.values.len(), "Created chart");

        Ok(&*self.current.insert(ChartHandle {
            id,
            points: spec.values.len(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ForecastPoint;
    use chrono::Utc;

    #[derive(Debug, PartialEq)]
    enum Event {
        Created(ChartId),
        Destroyed(ChartId),
    }

    #[derive(Debug, Default)]
    struct RecordingBackend {
        next: u64,
        live: Vec<ChartId>,
        events: Vec<Event>,
        fail_next: bool,
    }

    impl ChartBackend for RecordingBackend {
        fn create(&mut self, _spec: &ChartSpec) -> anyhow::Result<ChartId> {
            if std::mem::take(&mut self.fail_next) {
                anyhow::bail!("canvas unavailable");
            }
            self.next += 1;
            let id = ChartId(self.next);
            self.live.push(id);
            self.events.push(Event::Created(id));
            Ok(id)
        }

        fn destroy(&mut self, id: ChartId) {
            self.live.retain(|l| *l != id);
            self.events.push(Event::Destroyed(id));
        }
    }

    fn series(temps: &[f64]) -> ForecastSeries {
        ForecastSeries::new(
            temps
                .iter()
                .enumerate()
                .map(|(i, t)| ForecastPoint {
                    timestamp: 1_700_000_000 + i as i64 * 10_800,
                    temperature: *t,
                })
                .collect(),
        )
    }

    #[test]
    fn render_twice_keeps_one_live_chart() {
        let mut renderer = ChartRenderer::new(RecordingBackend::default());

        let first = renderer.render(&series(&[70.0])).unwrap().id();
        let second = renderer.render(&series(&[71.0, 72.0])).unwrap().id();

        assert_ne!(first, second);
        assert_eq!(renderer.backend().live, vec![second]);
        assert_eq!(
            renderer.backend().events,
            vec![
                Event::Created(first),
                Event::Destroyed(first),
                Event::Created(second)
            ]
        );
        assert_eq!(renderer.current().map(ChartHandle::points), Some(2));
    }

    #[test]
    fn release_is_idempotent() {
        let mut renderer = ChartRenderer::new(RecordingBackend::default());
        renderer.release();
        renderer.render(&series(&[1.0])).unwrap();
        renderer.release();
        renderer.release();

        assert!(renderer.current().is_none());
        assert!(renderer.backend().live.is_empty());
        assert_eq!(renderer.backend().events.len(), 2);
    }

    #[test]
    fn failed_create_leaves_nothing_held() {
        let mut renderer = ChartRenderer::new(RecordingBackend::default());
        renderer.render(&series(&[1.0])).unwrap();

        renderer.backend.fail_next = true;
        assert!(renderer.render(&series(&[2.0])).is_err());

        assert!(renderer.current().is_none());
        assert!(renderer.backend().live.is_empty());
    }

    #[test]
    fn spec_maps_points_to_labels_and_values() {
        let spec = ChartSpec::line_in(&series(&[70.0, 68.5]), &Utc);

        assert_eq!(spec.dataset_label, "Forecast Temp");
        assert_eq!(spec.values, vec![70.0, 68.5]);
        assert_eq!(
            spec.labels,
            vec!["11/14/2023, 10:13:20 PM", "11/15/2023, 1:13:20 AM"]
        );
        assert_eq!(spec.daily.len(), 2);
        assert!(!spec.options.animation);
        assert!(spec.options.responsive);
        assert!(spec.options.x_ticks.auto_skip);
    }

    #[test]
    fn unrepresentable_timestamp_falls_back_to_number() {
        let series = ForecastSeries::new(vec![ForecastPoint {
            timestamp: i64::MAX,
            temperature: 1.0,
        }]);
        let spec = ChartSpec::line_in(&series, &Utc);
        assert_eq!(spec.labels, vec![i64::MAX.to_string()]);
    }
}
