//! Conversion from [`RawRow`] input into [`ProductDraft`]s.
//!
//! Validation is repeated on every edit and again before submission, so the
//! normalizer takes attachments by value and hands the same list back
//! untouched: re-normalizing a draft can never drop or duplicate an image.

use rust_decimal::Decimal;
use uuid::Uuid;

use yardstock_core::{
    ImageAttachment, ProductDraft, RawRow, DEFAULT_PATTERN, MAX_IMAGES_PER_DRAFT,
};

use crate::error::FieldError;
use crate::validate::{validate_price, validate_quantity};

/// Outcome of normalizing one row. `draft` is always returned so the form
/// can redisplay it, but it must not be submitted unless `is_valid`.
#[derive(Debug)]
pub struct Normalized {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub draft: ProductDraft,
}

struct FieldChecks {
    errors: Vec<String>,
    price: Result<Decimal, FieldError>,
    quantity: Result<u32, FieldError>,
}

fn check_fields(name: &str, price: &str, quantity: &str) -> FieldChecks {
    let mut errors = Vec::new();

    if name.trim().is_empty() {
        errors.push(FieldError::NameRequired.to_string());
    }

    let price = validate_price(price);
    if let Err(e) = &price {
        errors.push(format!("Price: {e}"));
    }

    let quantity = validate_quantity(quantity);
    if let Err(e) = &quantity {
        errors.push(format!("Quantity: {e}"));
    }

    FieldChecks {
        errors,
        price,
        quantity,
    }
}

/// Validation messages for a raw row, without building a draft.
#[must_use]
pub fn check_row(row: &RawRow) -> Vec<String> {
    check_fields(&row.name, &row.price_per_yard, &row.quantity).errors
}

/// Validation messages for an existing draft, without touching it.
#[must_use]
pub fn check_draft(draft: &ProductDraft) -> Vec<String> {
    check_fields(&draft.name, &draft.price_input, &draft.quantity_input).errors
}

/// Builds a fresh draft from `row`, binding `images` to it unchanged.
#[must_use]
pub fn normalize_draft(row: RawRow, images: Vec<ImageAttachment>) -> Normalized {
    let csv_image_refs: Vec<String> = row
        .image_refs
        .iter()
        .map(|r| r.trim())
        .filter(|r| !r.is_empty())
        .take(MAX_IMAGES_PER_DRAFT)
        .map(str::to_owned)
        .collect();

    let draft = ProductDraft {
        temp_id: Uuid::new_v4(),
        name: row.name,
        price_input: row.price_per_yard,
        price_per_yard: None,
        quantity_input: row.quantity,
        quantity: None,
        material_type: row.material_type,
        pattern: row.pattern,
        description: row.description,
        status: row.status,
        csv_image_refs,
        images,
        price_error: None,
        quantity_error: None,
    };

    revalidate(draft)
}

/// Re-runs validation over an existing draft, keeping its identity, its
/// raw inputs and its images.
#[must_use]
pub fn revalidate(mut draft: ProductDraft) -> Normalized {
    let checks = check_fields(&draft.name, &draft.price_input, &draft.quantity_input);

    draft.name = draft.name.trim().to_string();
    draft.material_type = draft.material_type.trim().to_string();
    draft.description = draft.description.trim().to_string();
    let pattern = draft.pattern.trim();
    draft.pattern = if pattern.is_empty() {
        DEFAULT_PATTERN.to_string()
    } else {
        pattern.to_string()
    };

    match checks.price {
        Ok(value) => {
            draft.price_per_yard = Some(value);
            draft.price_error = None;
        }
        Err(e) => {
            draft.price_per_yard = None;
            draft.price_error = Some(e.to_string());
        }
    }

    match checks.quantity {
        Ok(value) => {
            draft.quantity = Some(value);
            draft.quantity_error = None;
        }
        Err(e) => {
            draft.quantity = None;
            draft.quantity_error = Some(e.to_string());
        }
    }

    Normalized {
        is_valid: checks.errors.is_empty(),
        errors: checks.errors,
        draft,
    }
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
