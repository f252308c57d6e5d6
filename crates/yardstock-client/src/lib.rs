pub mod client;
pub mod error;
pub(crate) mod retry;
pub mod submit;
pub mod types;

pub use client::CatalogClient;
pub use error::{ClientError, SubmitError};
pub use submit::{interpret_response, prepare_batch, BatchSubmitter, PreparedBatch};
pub use types::{BulkCreateResponse, ImageUpload, ProductPayload};
