use serde::{Deserialize, Serialize};

use crate::{model::HistoryEntry, store::KeyValueStore};

/// Key the list is stored under.
pub const HISTORY_KEY: &str = "history";

/// Most entries kept.
pub const MAX_HISTORY: usize = 6;

/// Past queries, most recent first, unique by zip, at most [`MAX_HISTORY`] long.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryList {
    entries: Vec<HistoryEntry>,
}

impl HistoryList {
    /// Builds a list that honors the invariants: the first entry per zip
    /// wins and the tail past [`MAX_HISTORY`] is dropped.
    pub fn normalized(entries: Vec<HistoryEntry>) -> Self {
        let mut kept: Vec<HistoryEntry> = Vec::with_capacity(MAX_HISTORY);

        for entry in entries {
            if kept.len() == MAX_HISTORY {
                break;
            }
            if !kept.iter().any(|e| e.zip == entry.zip) {
                kept.push(entry);
            }
        }

        Self { entries: kept }
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&HistoryEntry> {
        self.entries.get(index)
    }

    pub fn first(&self) -> Option<&HistoryEntry> {
        self.entries.first()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, HistoryEntry> {
        self.entries.iter()
    }

    fn with_front(&self, entry: HistoryEntry) -> Self {
        let mut entries = Vec::with_capacity(self.entries.len() + 1);
        entries.push(entry);
        entries.extend(self.entries.iter().cloned());
        Self::normalized(entries)
    }
}

impl<'a> IntoIterator for &'a HistoryList {
    type Item = &'a HistoryEntry;
    type IntoIter = std::slice::Iter<'a, HistoryEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Recent lookups persisted under [`HISTORY_KEY`].
#[derive(Debug)]
pub struct HistoryStore<S> {
    store: S,
}

impl<S: KeyValueStore> HistoryStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    #[cfg(test)]
    fn store(&self) -> &S {
        &self.store
    }

    /// Never fails: a missing key or unparsable value reads as empty.
    pub fn load(&self) -> HistoryList {
        let Some(raw) = self.store.get(HISTORY_KEY) else {
            return HistoryList::default();
        };

        match serde_json::from_str::<Vec<HistoryEntry>>(&raw) {
            Ok(entries) => HistoryList::normalized(entries),
            Err(err) => {
                tracing::warn!(error = %err, "Stored history is malformed; treating as empty");
                HistoryList::default()
            }
        }
    }

    /// Moves `entry` to the front, replacing any entry with the same zip,
    /// and rewrites the persisted list.
    pub fn push(&mut self, entry: HistoryEntry) -> HistoryList {
        let updated = self.load().with_front(entry);

        let persisted = serde_json::to_string(&updated)
            .map_err(anyhow::Error::from)
            .and_then(|json| self.store.set(HISTORY_KEY, json));

        if let Err(err) = persisted {
            tracing::warn!(error = %err, "Failed to persist history");
        }

        updated
    }
}
