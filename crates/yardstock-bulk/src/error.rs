use thiserror::Error;
use uuid::Uuid;

use crate::wizard::Step;

/// A single field failed validation. The display strings are shown inline
/// next to the offending input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("Name is required")]
    NameRequired,

    #[error("Price is required")]
    PriceRequired,

    #[error("Price must be a valid positive number")]
    PriceInvalid,

    #[error("Quantity is required")]
    QuantityRequired,

    #[error("Quantity must be a valid positive whole number")]
    QuantityInvalid,

    #[error("Quantity must be at most {max}")]
    QuantityTooLarge { max: u32 },
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("CSV read error: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV file has no header row")]
    MissingHeader,

    #[error("CSV header is missing required column \"{0}\"")]
    MissingColumn(String),

    #[error("CSV file contains no product rows")]
    NoRows,

    #[error("CSV file has {count} product rows; at most {max} are allowed")]
    TooManyRows { count: usize, max: usize },

    #[error("{} CSV rows failed validation", .0.len())]
    InvalidRows(Vec<String>),
}

#[derive(Debug, Error)]
pub enum WizardError {
    #[error("\"{action}\" is not available during the {step} step")]
    InvalidTransition { step: Step, action: &'static str },

    #[error("a submission is already in progress")]
    SubmissionInFlight,

    #[error("product {0} is not part of this batch")]
    DraftNotFound(Uuid),

    #[error("image {0} is not attached to this product")]
    ImageNotFound(String),

    #[error("a batch holds at most {0} products")]
    TooManyDrafts(usize),

    #[error("add at least one product before continuing")]
    EmptyBatch,

    #[error("{} problems must be fixed before continuing", .0.len())]
    Validation(Vec<String>),

    #[error("CSV import failed: {0}")]
    Import(#[from] ImportError),
}

impl WizardError {
    /// Flattens the error into the user-facing message list.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        match self {
            WizardError::Validation(messages)
            | WizardError::Import(ImportError::InvalidRows(messages)) => messages.clone(),
            other => vec![other.to_string()],
        }
    }
}
