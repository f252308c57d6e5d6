pub mod app_config;
pub mod config;
pub mod drafts;
pub mod outcome;
pub mod vendor;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use drafts::{
    ImageAttachment, PreviewHandle, ProductDraft, ProductStatus, RawRow, UploadedFile,
    DEFAULT_PATTERN, MAX_DRAFTS_PER_BATCH, MAX_IMAGES_PER_DRAFT,
};
pub use outcome::{BatchOutcome, ItemError};
pub use vendor::{load_vendor_profile, VendorProfile};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read vendor profile {path}: {source}")]
    VendorFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse vendor profile: {0}")]
    VendorFileParse(#[from] serde_yaml::Error),

    #[error("vendor profile validation failed: {0}")]
    Validation(String),
}
