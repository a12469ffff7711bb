use anyhow::Context;
use std::io::{self, Stdout, Write};

use zipcast_core::{ChartBackend, ChartId, ChartSpec};

/// Most rows drawn; longer series skip labels evenly.
pub const MAX_ROWS: usize = 24;

const BAR_WIDTH: usize = 40;

/// Draws the forecast as horizontal bars, one row per shown point.
///
/// A terminal cannot un-print, so `destroy` only forgets the chart.
#[derive(Debug)]
pub struct TerminalChart<W> {
    out: W,
    next_id: u64,
    live: Option<ChartId>,
}

impl TerminalChart<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TerminalChart<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            next_id: 0,
            live: None,
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn draw(&mut self, spec: &ChartSpec) -> io::Result<()> {
        writeln!(self.out, "{}", spec.dataset_label)?;

        if spec.values.is_empty() {
            writeln!(self.out, "  (no forecast data)")?;
            return Ok(());
        }

        let (min, max) = spec
            .values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(*v), hi.max(*v)));

        let step = if spec.options.x_ticks.auto_skip {
            spec.values.len().div_ceil(MAX_ROWS)
        } else {
            1
        };
        let label_width = spec.labels.iter().map(String::len).max().unwrap_or(0);

        for (label, value) in spec.labels.iter().zip(&spec.values).step_by(step) {
            writeln!(
                self.out,
                "  {label:>label_width$} | {bar:<BAR_WIDTH$} {value:.1}",
                bar = "#".repeat(bar_len(*value, min, max)),
            )?;
        }

        for day in &spec.daily {
            writeln!(
                self.out,
                "  {}  low {:.1}  high {:.1}",
                day.date.format("%a %-m/%-d"),
                day.min,
                day.max
            )?;
        }

        self.out.flush()
    }
}

fn bar_len(value: f64, min: f64, max: f64) -> usize {
    let span = max - min;
    if span <= f64::EPSILON {
        return BAR_WIDTH / 2;
    }
    1 + (((value - min) / span) * (BAR_WIDTH - 1) as f64).round() as usize
}

impl<W: Write> ChartBackend for TerminalChart<W> {
    fn create(&mut self, spec: &ChartSpec) -> anyhow::Result<ChartId> {
        self.draw(spec).context("Failed to draw chart to terminal")?;

        self.next_id += 1;
        let id = ChartId(self.next_id);
        self.live = Some(id);
        Ok(id)
    }

    fn destroy(&mut self, id: ChartId) {
        if self.live == Some(id) {
            self.live = None;
        }
    }
}
