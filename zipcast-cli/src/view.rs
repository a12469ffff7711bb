use std::io::{self, Stdout, Write};

use zipcast_core::{HistoryList, View};

/// Prints the status line and history "buttons" to a terminal.
#[derive(Debug)]
pub struct ConsoleView<W> {
    out: W,
}

impl ConsoleView<Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> ConsoleView<W> {
    #[cfg(test)]
    pub fn new(out: W) -> Self {
        Self { out }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, text: &str) {
        if let Err(err) = writeln!(self.out, "{text}") {
            tracing::warn!(error = %err, "Failed to write to terminal");
        }
    }
}

/// `[1] 12180 (F)  [2] 10001 (C)`, numbered for `zipcast replay <n>`.
pub fn history_line(history: &HistoryList) -> String {
    if history.is_empty() {
        return "History: (empty)".to_string();
    }

    let buttons: Vec<String> = history
        .iter()
        .enumerate()
        .map(|(i, entry)| format!("[{}] {}", i + 1, entry.label()))
        .collect();

    format!("History: {}", buttons.join("  "))
}

impl<W: Write> View for ConsoleView<W> {
    fn set_status(&mut self, text: &str) {
        self.line(text);
    }

    fn show_history(&mut self, history: &HistoryList) {
        let line = history_line(history);
        self.line(&line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zipcast_core::{HistoryEntry, Units};

    #[test]
    fn history_line_numbers_entries() {
        let list = HistoryList::normalized(vec![
            HistoryEntry::new("12180", Units::Imperial),
            HistoryEntry::new("10001", Units::Metric),
        ]);
        assert_eq!(history_line(&list), "History: [1] 12180 (F)  [2] 10001 (C)");
    }

    #[test]
    fn history_line_empty() {
        assert_eq!(history_line(&HistoryList::default()), "History: (empty)");
    }

    #[test]
    fn view_writes_one_line_per_update() {
        let mut view = ConsoleView::new(Vec::new());
        view.set_status("Loading...");
        view.set_status("Error: zip not found");

        let out = String::from_utf8(view.into_inner()).unwrap();
        assert_eq!(out, "Loading...\nError: zip not found\n");
    }
}
