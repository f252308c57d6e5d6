use std::sync::Arc;

use yardstock_core::{ProductStatus, UploadedFile};

use super::*;
use crate::preview::PreviewRegistry;

fn valid_row() -> RawRow {
    RawRow {
        name: "  Ankara Print ".to_owned(),
        price_per_yard: "₦2,500".to_owned(),
        quantity: "40".to_owned(),
        material_type: " Cotton ".to_owned(),
        pattern: String::new(),
        description: " Bright wax print ".to_owned(),
        status: ProductStatus::Available,
        image_refs: vec!["ankara.jpg".to_owned()],
    }
}

fn attachments(registry: &mut PreviewRegistry, names: &[&str]) -> Vec<ImageAttachment> {
    names
        .iter()
        .map(|n| registry.attach(Arc::new(UploadedFile::new(*n, n.as_bytes().to_vec()))))
        .collect()
}

#[test]
fn normalize_trims_and_parses() {
    let normalized = normalize_draft(valid_row(), Vec::new());
    assert!(normalized.is_valid, "errors: {:?}", normalized.errors);
    let draft = normalized.draft;
    assert_eq!(draft.name, "Ankara Print");
    assert_eq!(draft.material_type, "Cotton");
    assert_eq!(draft.description, "Bright wax print");
    assert_eq!(draft.price_per_yard, Some(Decimal::from(2500)));
    assert_eq!(draft.quantity, Some(40));
    assert_eq!(draft.price_input, "₦2,500");
}

#[test]
fn normalize_defaults_blank_pattern() {
    let draft = normalize_draft(valid_row(), Vec::new()).draft;
    assert_eq!(draft.pattern, DEFAULT_PATTERN);
}

#[test]
fn normalize_keeps_explicit_pattern() {
    let mut row = valid_row();
    row.pattern = " Striped ".to_owned();
    let draft = normalize_draft(row, Vec::new()).draft;
    assert_eq!(draft.pattern, "Striped");
}

#[test]
fn normalize_aggregates_labelled_errors() {
    let row = RawRow {
        name: "   ".to_owned(),
        price_per_yard: String::new(),
        quantity: "0".to_owned(),
        ..RawRow::default()
    };
    let normalized = normalize_draft(row, Vec::new());
    assert!(!normalized.is_valid);
    assert_eq!(
        normalized.errors,
        vec![
            "Name is required".to_owned(),
            "Price: Price is required".to_owned(),
            "Quantity: Quantity must be a valid positive whole number".to_owned(),
        ]
    );
    assert_eq!(
        normalized.draft.price_error.as_deref(),
        Some("Price is required")
    );
    assert!(normalized.draft.quantity_error.is_some());
}

#[test]
fn normalize_caps_and_cleans_image_refs() {
    let mut row = valid_row();
    row.image_refs = vec![
        "a.jpg".to_owned(),
        "  ".to_owned(),
        " b.jpg ".to_owned(),
        "c.jpg".to_owned(),
        "d.jpg".to_owned(),
        "e.jpg".to_owned(),
    ];
    let draft = normalize_draft(row, Vec::new()).draft;
    assert_eq!(draft.csv_image_refs, vec!["a.jpg", "b.jpg", "c.jpg", "d.jpg"]);
}

#[test]
fn normalize_binds_images_unchanged() {
    let mut registry = PreviewRegistry::new();
    let images = attachments(&mut registry, &["one.jpg", "two.jpg"]);
    let ids: Vec<String> = images.iter().map(|i| i.id.clone()).collect();

    let draft = normalize_draft(valid_row(), images).draft;
    let after: Vec<String> = draft.images.iter().map(|i| i.id.clone()).collect();
    assert_eq!(after, ids);
}

#[test]
fn revalidate_twice_keeps_identical_images() {
    let mut registry = PreviewRegistry::new();
    let images = attachments(&mut registry, &["one.jpg", "two.jpg", "three.jpg"]);
    let draft = normalize_draft(valid_row(), images).draft;
    let before: Vec<(String, String)> = draft
        .images
        .iter()
        .map(|i| (i.id.clone(), i.preview.uri()))
        .collect();
    let temp_id = draft.temp_id;

    let once = revalidate(draft).draft;
    let twice = revalidate(once).draft;

    let after: Vec<(String, String)> = twice
        .images
        .iter()
        .map(|i| (i.id.clone(), i.preview.uri()))
        .collect();
    assert_eq!(after, before);
    assert_eq!(twice.temp_id, temp_id);
    assert_eq!(registry.live_count(), 3);
}

#[test]
fn revalidate_keeps_images_on_invalid_draft() {
    let mut registry = PreviewRegistry::new();
    let images = attachments(&mut registry, &["one.jpg"]);
    let mut draft = normalize_draft(valid_row(), images).draft;
    draft.price_input = "free".to_owned();

    let normalized = revalidate(draft);
    assert!(!normalized.is_valid);
    assert_eq!(normalized.draft.images.len(), 1);
    assert_eq!(normalized.draft.price_input, "free");
    assert!(normalized.draft.price_per_yard.is_none());
}

#[test]
fn revalidate_clears_resolved_field_errors() {
    let mut row = valid_row();
    row.quantity = "many".to_owned();
    let mut draft = normalize_draft(row, Vec::new()).draft;
    assert!(draft.quantity_error.is_some());

    draft.quantity_input = "12".to_owned();
    let normalized = revalidate(draft);
    assert!(normalized.is_valid);
    assert!(normalized.draft.quantity_error.is_none());
    assert_eq!(normalized.draft.quantity, Some(12));
}

#[test]
fn check_row_and_check_draft_agree() {
    let mut row = valid_row();
    row.price_per_yard = "-1".to_owned();
    let row_errors = check_row(&row);
    let draft = normalize_draft(row, Vec::new()).draft;
    assert_eq!(check_draft(&draft), row_errors);
    assert_eq!(row_errors, vec!["Price: Price must be a valid positive number"]);
}
