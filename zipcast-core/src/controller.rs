//! Request/response/render cycle behind the search form.
//!
//! Overlapping searches are not cancelled. Each one is tagged with a
//! generation number, and whichever completes last decides the status line
//! and the chart, even when a newer search already completed.

use crate::{
    chart::{ChartBackend, ChartRenderer},
    client::WeatherClient,
    history::{HistoryList, HistoryStore},
    model::{HistoryEntry, Units, WeatherResult, round_temperature},
    store::KeyValueStore,
};

pub const LOADING_TEXT: &str = "Loading...";
pub const EMPTY_ZIP_MESSAGE: &str = "Please enter a zip code.";

/// UI surface the controller writes to.
pub trait View {
    /// Replace the single line of status text.
    fn set_status(&mut self, text: &str);

    /// Redraw the history buttons.
    fn show_history(&mut self, history: &HistoryList);
}

/// Current contents of the search form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchForm {
    pub zip: String,
    pub units: Units,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchState {
    #[default]
    Idle,
    Loading,
    Succeeded,
    Failed,
}

/// A search that has been started but not yet completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    pub generation: u64,
    pub zip: String,
    pub units: Units,
}

#[derive(Debug)]
pub struct SearchController<C, S, B, V> {
    client: C,
    history: HistoryStore<S>,
    chart: ChartRenderer<B>,
    view: V,
    form: SearchForm,
    state: SearchState,
    status: String,
    issued: u64,
    applied: Option<u64>,
}

impl<C, S, B, V> SearchController<C, S, B, V>
where
    C: WeatherClient,
    S: KeyValueStore,
    B: ChartBackend,
    V: View,
{
    pub fn new(client: C, store: S, backend: B, view: V) -> Self {
        Self {
            client,
            history: HistoryStore::new(store),
            chart: ChartRenderer::new(backend),
            view,
            form: SearchForm::default(),
            state: SearchState::Idle,
            status: String::new(),
            issued: 0,
            applied: None,
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn history(&self) -> &HistoryStore<S> {
        &self.history
    }

    pub fn chart(&self) -> &ChartRenderer<B> {
        &self.chart
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn form(&self) -> &SearchForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut SearchForm {
        &mut self.form
    }

    pub fn state(&self) -> SearchState {
        self.state
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    /// Page-load step: show persisted history without fetching anything.
    pub fn init(&mut self) -> HistoryList {
        let history = self.history.load();
        self.view.show_history(&history);
        history
    }

    /// Runs a full search with the current form contents.
    pub async fn submit(&mut self) {
        let Some(ticket) = self.begin_search() else {
            return;
        };
        let result = self.client.fetch_weather(&ticket.zip, ticket.units).await;
        self.complete_search(ticket, result);
    }

    /// Fills the form from history entry `index` and submits it.
    pub async fn select_history(&mut self, index: usize) {
        let Some(entry) = self.history.load().get(index).cloned() else {
            tracing::warn!(index, "No history entry at index");
            return;
        };

        self.form.zip = entry.zip;
        self.form.units = entry.units;
        self.submit().await;
    }

    /// Reads the form and enters `Loading`. Returns `None` when there is
    /// nothing to search for.
    pub fn begin_search(&mut self) -> Option<SearchTicket> {
        let zip = self.form.zip.trim().to_string();
        let units = self.form.units;

        if zip.is_empty() {
            self.state = SearchState::Failed;
            self.set_status(format!("Error: {EMPTY_ZIP_MESSAGE}"));
            return None;
        }

        self.issued += 1;
        let ticket = SearchTicket {
            generation: self.issued,
            zip,
            units,
        };
        tracing::info!(generation = ticket.generation, zip = %ticket.zip, %units, "Searching");

        self.state = SearchState::Loading;
        self.set_status(LOADING_TEXT.to_string());
        Some(ticket)
    }

    /// Applies the outcome of `ticket`'s fetch.
    pub fn complete_search(&mut self, ticket: SearchTicket, result: WeatherResult) {
        if self.applied.is_some_and(|applied| applied > ticket.generation) {
            tracing::debug!(
                generation = ticket.generation,
                newer = self.applied,
                "Applying response that completed after a newer search"
            );
        }
        self.applied = Some(ticket.generation);

        match result {
            WeatherResult::Success { current, forecast } => {
                if let Err(err) = self.chart.render(&forecast) {
                    tracing::warn!(error = %err, "Failed to draw forecast chart");
                }

                self.state = SearchState::Succeeded;
                self.set_status(format!(
                    "Current: {} – {}°",
                    current.name,
                    round_temperature(current.temperature)
                ));

                self.history.push(HistoryEntry::new(ticket.zip, ticket.units));
                let history = self.history.load();
                self.view.show_history(&history);
            }
            WeatherResult::Failure { message } => {
                tracing::info!(generation = ticket.generation, %message, "Search failed");
                self.state = SearchState::Failed;
                self.set_status(format!("Error: {message}"));
            }
        }
    }

    fn set_status(&mut self, text: String) {
        self.view.set_status(&text);
        self.status = text;
    }
}
