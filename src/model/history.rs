use crate::model::message::HistoryEntry;

/// Number of trailing entries replayed to the model on each request.
pub const MAX_HISTORY: usize = 20;

/// Append-only log of the conversation.
///
/// Everything is retained; `windowed` decides how much of it is sent.
#[derive(Debug, Default, Clone)]
pub struct HistoryBuffer {
    entries: Vec<HistoryEntry>,
}

impl HistoryBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, entry: HistoryEntry) {
        self.entries.push(entry);
    }

    /// Records a completed exchange. Only called after a successful inference.
    pub fn push_exchange(&mut self, action: &str, narrative: &str) {
        self.append(HistoryEntry::user(action));
        self.append(HistoryEntry::assistant(narrative));
    }

    /// The last `n` entries, oldest first. Shorter if fewer are stored.
    pub fn windowed(&self, n: usize) -> &[HistoryEntry] {
        let start = self.entries.len().saturating_sub(n);
        &self.entries[start..]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
