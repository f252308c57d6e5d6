//! Wire types for the catalog bulk-create endpoint.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use yardstock_core::{ItemError, UploadedFile};

/// One product as the bulk-create endpoint expects it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPayload {
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price_per_yard: Decimal,
    pub quantity: u32,
    pub material_type: String,
    pub vendor_id: String,
    pub id_number: String,
    pub description: String,
    pub pattern: String,
    /// `true` when the product is available for sale.
    pub status: bool,
    /// Filenames of the image parts sent for this product.
    pub images: Vec<String>,
}

/// An image file part, tied to the product at `product_index`.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub product_index: usize,
    pub file_name: String,
    pub file: Arc<UploadedFile>,
}

impl ImageUpload {
    /// Multipart field name for this image.
    #[must_use]
    pub fn field_name(&self) -> String {
        format!("images[{}]", self.product_index)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BulkCreateResponse {
    pub success: bool,
    pub created_count: usize,
    pub error_count: usize,
    pub errors: Vec<ItemError>,
    /// Older deployments report only the number of created products here.
    pub count: Option<usize>,
}
