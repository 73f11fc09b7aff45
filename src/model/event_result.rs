/// A single mutation applied to the game state by extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateChange {
    Damage { amount: u32, health_after: u32 },
    Relocated { location: String },
    ItemAcquired { item: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionReport {
    pub changes: Vec<StateChange>,
}

impl ExtractionReport {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}
