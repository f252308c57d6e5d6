//! Product drafts and the image files bound to them during a bulk upload.

use std::path::Path;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Hard cap on images bound to one draft.
pub const MAX_IMAGES_PER_DRAFT: usize = 4;

/// Hard cap on drafts in one bulk batch.
pub const MAX_DRAFTS_PER_BATCH: usize = 100;

/// Pattern recorded when a row leaves the column blank.
pub const DEFAULT_PATTERN: &str = "Plain";

/// Whether a product is listed as purchasable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    #[default]
    Available,
    Unavailable,
}

impl ProductStatus {
    /// Decodes the textual status column. Only `unavailable` and `false`
    /// (any case, surrounding whitespace ignored) mark a product unavailable;
    /// blank and every other value mean available.
    #[must_use]
    pub fn from_cell(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "unavailable" | "false" => ProductStatus::Unavailable,
            _ => ProductStatus::Available,
        }
    }

    #[must_use]
    pub fn is_available(self) -> bool {
        matches!(self, ProductStatus::Available)
    }
}

impl From<bool> for ProductStatus {
    fn from(available: bool) -> Self {
        if available {
            ProductStatus::Available
        } else {
            ProductStatus::Unavailable
        }
    }
}

impl std::fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProductStatus::Available => write!(f, "available"),
            ProductStatus::Unavailable => write!(f, "unavailable"),
        }
    }
}

/// A product row exactly as entered, before any validation. CSV import and
/// manual entry both produce this shape; `normalize_draft` is the only way
/// to turn it into a [`ProductDraft`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    pub name: String,
    pub price_per_yard: String,
    pub quantity: String,
    pub material_type: String,
    pub pattern: String,
    pub description: String,
    pub status: ProductStatus,
    /// Filename references from the `image1..image4` columns, blanks removed.
    pub image_refs: Vec<String>,
}

/// An image file the vendor selected or dropped into the upload pool.
///
/// Held behind an [`Arc`] so that the pool and every attachment resolved
/// from it share one copy of the bytes.
#[derive(Debug, PartialEq, Eq)]
pub struct UploadedFile {
    pub name: String,
    pub size: u64,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    /// Wraps in-memory bytes, guessing the MIME type from the file name.
    #[must_use]
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let name = name.into();
        let mime_type = mime_guess::from_path(&name)
            .first_or_octet_stream()
            .to_string();
        Self {
            size: u64::try_from(bytes.len()).unwrap_or(u64::MAX),
            name,
            mime_type,
            bytes,
        }
    }

    /// Reads a file from disk. The stored name is the final path component.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the file cannot be read.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::new(name, bytes))
    }

    /// Returns `true` for `image/*` MIME types.
    #[must_use]
    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }
}

/// Display handle derived from an attachment's source file. Must be handed
/// back to the preview registry that issued it when the attachment goes away.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PreviewHandle {
    pub attachment_id: String,
    /// Short content digest of the source bytes.
    pub digest: String,
}

impl PreviewHandle {
    #[must_use]
    pub fn uri(&self) -> String {
        format!("preview://{}/{}", self.attachment_id, self.digest)
    }
}

/// An image bound to one draft.
#[derive(Debug)]
pub struct ImageAttachment {
    pub id: String,
    pub source: Arc<UploadedFile>,
    pub preview: PreviewHandle,
    pub declared_name: String,
    pub size: u64,
    pub mime_type: String,
}

/// One product in the batch being built.
///
/// The `*_input` fields hold the text exactly as typed so that an invalid
/// edit never loses data; `price_per_yard` and `quantity` are only set once
/// the corresponding input validates.
#[derive(Debug)]
pub struct ProductDraft {
    pub temp_id: Uuid,
    pub name: String,
    pub price_input: String,
    pub price_per_yard: Option<Decimal>,
    pub quantity_input: String,
    pub quantity: Option<u32>,
    pub material_type: String,
    pub pattern: String,
    pub description: String,
    pub status: ProductStatus,
    pub csv_image_refs: Vec<String>,
    pub images: Vec<ImageAttachment>,
    pub price_error: Option<String>,
    pub quantity_error: Option<String>,
}

impl ProductDraft {
    /// A blank draft as shown when the vendor adds a row by hand.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            temp_id: Uuid::new_v4(),
            name: String::new(),
            price_input: String::new(),
            price_per_yard: None,
            quantity_input: String::new(),
            quantity: None,
            material_type: String::new(),
            pattern: DEFAULT_PATTERN.to_string(),
            description: String::new(),
            status: ProductStatus::Available,
            csv_image_refs: Vec::new(),
            images: Vec::new(),
            price_error: None,
            quantity_error: None,
        }
    }

    #[must_use]
    pub fn has_images(&self) -> bool {
        !self.images.is_empty()
    }

    /// Number of further images this draft can take.
    #[must_use]
    pub fn remaining_image_slots(&self) -> usize {
        MAX_IMAGES_PER_DRAFT.saturating_sub(self.images.len())
    }

    /// Returns `true` if the row came from CSV and names at least one image.
    #[must_use]
    pub fn declares_image_refs(&self) -> bool {
        self.csv_image_refs.iter().any(|r| !r.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_unavailable_forms() {
        assert_eq!(ProductStatus::from_cell("unavailable"), ProductStatus::Unavailable);
        assert_eq!(ProductStatus::from_cell("FALSE"), ProductStatus::Unavailable);
        assert_eq!(ProductStatus::from_cell("  Unavailable "), ProductStatus::Unavailable);
    }

    #[test]
    fn status_everything_else_is_available() {
        assert_eq!(ProductStatus::from_cell(""), ProductStatus::Available);
        assert_eq!(ProductStatus::from_cell("available"), ProductStatus::Available);
        assert_eq!(ProductStatus::from_cell("true"), ProductStatus::Available);
        assert_eq!(ProductStatus::from_cell("no"), ProductStatus::Available);
    }

    #[test]
    fn status_from_bool() {
        assert_eq!(ProductStatus::from(true), ProductStatus::Available);
        assert_eq!(ProductStatus::from(false), ProductStatus::Unavailable);
        assert!(!ProductStatus::Unavailable.is_available());
    }

    #[test]
    fn status_serde_is_lowercase() {
        let json = serde_json::to_string(&ProductStatus::Unavailable).unwrap();
        assert_eq!(json, "\"unavailable\"");
    }

    #[test]
    fn uploaded_file_guesses_mime_and_size() {
        let file = UploadedFile::new("cotton.JPG", vec![0u8; 12]);
        assert_eq!(file.mime_type, "image/jpeg");
        assert_eq!(file.size, 12);
        assert!(file.is_image());
    }

    #[test]
    fn uploaded_file_unknown_extension_is_octet_stream() {
        let file = UploadedFile::new("notes.zzz", vec![1, 2, 3]);
        assert_eq!(file.mime_type, "application/octet-stream");
        assert!(!file.is_image());
    }

    #[test]
    fn empty_draft_defaults() {
        let draft = ProductDraft::empty();
        assert_eq!(draft.pattern, DEFAULT_PATTERN);
        assert_eq!(draft.status, ProductStatus::Available);
        assert!(!draft.has_images());
        assert_eq!(draft.remaining_image_slots(), MAX_IMAGES_PER_DRAFT);
        assert!(!draft.declares_image_refs());
    }

    #[test]
    fn empty_drafts_have_distinct_ids() {
        assert_ne!(ProductDraft::empty().temp_id, ProductDraft::empty().temp_id);
    }

    #[test]
    fn blank_refs_do_not_count_as_declared() {
        let mut draft = ProductDraft::empty();
        draft.csv_image_refs = vec!["  ".to_string()];
        assert!(!draft.declares_image_refs());
        draft.csv_image_refs.push("silk.jpg".to_string());
        assert!(draft.declares_image_refs());
    }

    #[test]
    fn preview_uri_includes_id_and_digest() {
        let handle = PreviewHandle {
            attachment_id: "a1b2c3d4".to_string(),
            digest: "deadbeef".to_string(),
        };
        assert_eq!(handle.uri(), "preview://a1b2c3d4/deadbeef");
    }
}
