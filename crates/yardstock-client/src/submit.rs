//! Turns validated drafts into a bulk-create request and interprets the reply.

use std::sync::Arc;

use yardstock_bulk::{check_draft, validate_price, validate_quantity};
use yardstock_core::{BatchOutcome, ProductDraft, VendorProfile, DEFAULT_PATTERN};

use crate::client::CatalogClient;
use crate::error::SubmitError;
use crate::types::{BulkCreateResponse, ImageUpload, ProductPayload};

/// A batch ready to send: one payload per draft plus every image part.
#[derive(Debug, Clone)]
pub struct PreparedBatch {
    pub products: Vec<ProductPayload>,
    pub images: Vec<ImageUpload>,
}

/// Re-validates `drafts` and shapes them into wire payloads.
///
/// # Errors
///
/// - [`SubmitError::EmptyBatch`] when `drafts` is empty.
/// - [`SubmitError::Validation`] listing every problem across all drafts.
pub fn prepare_batch(
    drafts: &[ProductDraft],
    vendor: &VendorProfile,
) -> Result<PreparedBatch, SubmitError> {
    if drafts.is_empty() {
        return Err(SubmitError::EmptyBatch);
    }

    let problems: Vec<String> = drafts
        .iter()
        .enumerate()
        .flat_map(|(i, d)| {
            check_draft(d)
                .into_iter()
                .map(move |e| format!("Product {}: {e}", i + 1))
        })
        .collect();
    if !problems.is_empty() {
        return Err(SubmitError::Validation(problems));
    }

    let mut products = Vec::with_capacity(drafts.len());
    let mut images = Vec::new();

    for (index, draft) in drafts.iter().enumerate() {
        let invalid = |e: yardstock_bulk::FieldError| {
            SubmitError::Validation(vec![format!("Product {}: {e}", index + 1)])
        };
        let pattern = draft.pattern.trim();

        products.push(ProductPayload {
            name: draft.name.trim().to_owned(),
            price_per_yard: validate_price(&draft.price_input).map_err(invalid)?,
            quantity: validate_quantity(&draft.quantity_input).map_err(invalid)?,
            material_type: draft.material_type.trim().to_owned(),
            vendor_id: vendor.vendor_id.clone(),
            id_number: vendor.id_number.clone(),
            description: draft.description.trim().to_owned(),
            pattern: if pattern.is_empty() {
                DEFAULT_PATTERN.to_owned()
            } else {
                pattern.to_owned()
            },
            status: draft.status.is_available(),
            images: draft
                .images
                .iter()
                .map(|img| img.declared_name.clone())
                .collect(),
        });

        images.extend(draft.images.iter().map(|img| ImageUpload {
            product_index: index,
            file_name: img.declared_name.clone(),
            file: Arc::clone(&img.source),
        }));
    }

    Ok(PreparedBatch { products, images })
}

/// Interprets the endpoint's reply for a batch of `submitted` products.
///
/// # Errors
///
/// Returns [`SubmitError::AllFailed`] when nothing was created.
pub fn interpret_response(
    submitted: usize,
    response: BulkCreateResponse,
) -> Result<BatchOutcome, SubmitError> {
    let created_count = match (response.created_count, response.count) {
        (0, Some(count)) if response.success => count,
        (created, _) => created,
    };

    if created_count == 0 {
        let details = if response.errors.is_empty() {
            "no details returned".to_owned()
        } else {
            response
                .errors
                .iter()
                .map(|e| e.error.as_str())
                .collect::<Vec<_>>()
                .join("; ")
        };
        return Err(SubmitError::AllFailed {
            count: submitted,
            details,
        });
    }

    Ok(BatchOutcome {
        created_count,
        error_count: response.error_count.max(response.errors.len()),
        errors: response.errors,
    })
}

/// Submits wizard batches on behalf of one vendor.
pub struct BatchSubmitter {
    client: CatalogClient,
    vendor: VendorProfile,
}

impl BatchSubmitter {
    #[must_use]
    pub fn new(client: CatalogClient, vendor: VendorProfile) -> Self {
        Self { client, vendor }
    }

    /// Validates and sends `drafts` as one batch.
    ///
    /// Nothing is sent when any draft fails validation.
    ///
    /// # Errors
    ///
    /// - [`SubmitError::EmptyBatch`] / [`SubmitError::Validation`] before any request.
    /// - [`SubmitError::Client`] on transport or HTTP failure.
    /// - [`SubmitError::AllFailed`] when the endpoint created nothing.
    pub async fn submit(&self, drafts: &[ProductDraft]) -> Result<BatchOutcome, SubmitError> {
        let batch = prepare_batch(drafts, &self.vendor)?;
        let response = self
            .client
            .bulk_create(&batch.products, &batch.images)
            .await?;
        let outcome = interpret_response(batch.products.len(), response);

        match &outcome {
            Ok(o) => tracing::info!(
                vendor_id = %self.vendor.vendor_id,
                created = o.created_count,
                failed = o.error_count,
                "bulk submission finished"
            ),
            Err(e) => tracing::warn!(
                vendor_id = %self.vendor.vendor_id,
                error = %e,
                "bulk submission failed"
            ),
        }
        outcome
    }
}

#[cfg(test)]
#[path = "submit_test.rs"]
mod tests;
