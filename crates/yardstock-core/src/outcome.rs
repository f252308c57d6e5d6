use serde::{Deserialize, Serialize};

/// Per-item failure reported by the bulk-create endpoint. `index` is the
/// zero-based position of the product in the submitted batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemError {
    pub index: usize,
    pub error: String,
}

/// Result of a bulk submission in which at least one product was created.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub created_count: usize,
    pub error_count: usize,
    pub errors: Vec<ItemError>,
}

impl BatchOutcome {
    /// Returns `true` when every submitted product was created.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.error_count == 0
    }
}
