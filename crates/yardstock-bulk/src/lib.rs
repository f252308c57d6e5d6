pub mod csv_import;
pub mod error;
pub mod matcher;
pub mod normalize;
pub mod preview;
pub mod validate;
pub mod wizard;

pub use csv_import::parse_products_csv;
pub use error::{FieldError, ImportError, WizardError};
pub use matcher::{match_images, ImageMatch, MatchOutcome, MatchResult, MatchTier};
pub use normalize::{check_draft, check_row, normalize_draft, revalidate, Normalized};
pub use preview::PreviewRegistry;
pub use validate::{validate_price, validate_quantity};
pub use wizard::{
    reduce, DraftField, EntryMethod, Step, UploadProgress, WizardAction, WizardSession,
};
