//! Filename matching between CSV image references and an uploaded image pool.
//!
//! Vendors rarely type filenames exactly as they sit on disk, so each
//! reference is resolved through a fixed cascade of key lookups against a
//! table built from the pool. Each hit is tagged with a [`MatchTier`]
//! describing how far the reference was from the real filename; anything
//! other than [`MatchTier::Exact`] is surfaced for review before submission.
//! Misses are warnings, never errors.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::Serialize;

use yardstock_core::{ProductDraft, UploadedFile, MAX_IMAGES_PER_DRAFT};

use crate::preview::PreviewRegistry;

/// How closely a resolved filename matched the CSV reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchTier {
    Exact,
    CaseInsensitive,
    Partial,
    SeparatorVariation,
    ExtensionAdded,
}

impl MatchTier {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            MatchTier::Exact => "exact",
            MatchTier::CaseInsensitive => "case-insensitive",
            MatchTier::Partial => "partial",
            MatchTier::SeparatorVariation => "separator-variation",
            MatchTier::ExtensionAdded => "extension-added",
        }
    }

    /// Only byte-identical matches are trusted without a second look.
    #[must_use]
    pub fn needs_review(self) -> bool {
        self != MatchTier::Exact
    }
}

impl std::fmt::Display for MatchTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One resolved reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageMatch {
    pub csv_name: String,
    pub resolved_file_name: String,
    pub is_exact_match: bool,
    pub match_tier: MatchTier,
    pub file_size: u64,
    pub mime_type: String,
}

/// Matching report for one draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    pub product_name: String,
    pub product_index: usize,
    pub matches: Vec<ImageMatch>,
    /// References with no file in the pool.
    pub missing: Vec<String>,
    /// References that resolved but did not fit under the per-draft image cap.
    pub over_capacity: Vec<String>,
    /// References whose file was already attached to the draft before this
    /// run, so no new attachment was made.
    pub already_attached: Vec<String>,
}

impl MatchResult {
    /// `true` if anything about this product deserves a look before submitting.
    #[must_use]
    pub fn needs_review(&self) -> bool {
        !self.missing.is_empty()
            || !self.over_capacity.is_empty()
            || self.matches.iter().any(|m| m.match_tier.needs_review())
    }
}

#[derive(Debug)]
pub struct MatchOutcome {
    pub drafts: Vec<ProductDraft>,
    pub results: Vec<MatchResult>,
}

impl MatchOutcome {
    #[must_use]
    pub fn matched_count(&self) -> usize {
        self.results.iter().map(|r| r.matches.len()).sum()
    }

    #[must_use]
    pub fn missing_count(&self) -> usize {
        self.results.iter().map(|r| r.missing.len()).sum()
    }
}

/// Filename with its final extension removed. Dotfiles keep their name.
fn stem(name: &str) -> &str {
    match name.rsplit_once('.') {
        Some((base, _)) if !base.is_empty() => base,
        _ => name,
    }
}

/// Lookup from every accepted spelling of a pool filename to the file.
///
/// Keys collide when two files share a stem (`shirt.jpg` and `shirt.png`
/// both register `shirt`); the file inserted last wins.
struct FileLookup<'a> {
    by_key: HashMap<String, &'a Arc<UploadedFile>>,
}

impl<'a> FileLookup<'a> {
    fn build(files: &'a [Arc<UploadedFile>]) -> Self {
        let mut by_key = HashMap::with_capacity(files.len() * 4);
        for file in files {
            let lower = file.name.to_lowercase();
            by_key.insert(file.name.clone(), file);
            by_key.insert(stem(&file.name).to_string(), file);
            by_key.insert(stem(&lower).to_string(), file);
            by_key.insert(lower, file);
        }
        Self { by_key }
    }

    fn resolve(&self, reference: &str) -> Option<&'a Arc<UploadedFile>> {
        let keys = [
            reference.to_string(),
            reference.to_lowercase(),
            format!("{reference}.jpg"),
            format!("{reference}.png"),
            format!("{reference}.jpeg"),
            reference.replace('_', "-"),
            reference.replace('-', "_"),
        ];
        keys.iter().find_map(|key| self.by_key.get(key).copied())
    }
}

fn unify_separators(s: &str) -> String {
    s.replace('_', "-")
}

/// Classifies how `csv_name` relates to the file it resolved to.
#[must_use]
pub fn classify_match(csv_name: &str, file_name: &str) -> MatchTier {
    if csv_name == file_name {
        return MatchTier::Exact;
    }

    let csv_lower = csv_name.to_lowercase();
    let file_lower = file_name.to_lowercase();
    if csv_lower == file_lower {
        return MatchTier::CaseInsensitive;
    }

    let csv_stem = stem(&csv_lower);
    let file_stem = stem(&file_lower);
    if csv_stem != file_stem && !csv_stem.is_empty() && !file_stem.is_empty() {
        if csv_stem.contains(file_stem) || file_stem.contains(csv_stem) {
            return MatchTier::Partial;
        }
        if unify_separators(csv_stem) == unify_separators(file_stem) {
            return MatchTier::SeparatorVariation;
        }
    }

    MatchTier::ExtensionAdded
}

/// Resolves every draft's CSV references against `files` and binds the hits
/// as new attachments.
///
/// Existing images keep their place; new ones are appended until the draft
/// holds [`MAX_IMAGES_PER_DRAFT`]. Every resolved reference gets its own
/// attachment, except that a file the draft already held before this call
/// is listed in [`MatchResult::already_attached`] instead, so re-running the
/// matcher after going back a step does not duplicate images.
///
/// The result is deterministic for a given input apart from attachment ids.
pub fn match_images(
    files: &[Arc<UploadedFile>],
    drafts: Vec<ProductDraft>,
    previews: &mut PreviewRegistry,
) -> MatchOutcome {
    let lookup = FileLookup::build(files);
    let mut results = Vec::with_capacity(drafts.len());
    let mut updated = Vec::with_capacity(drafts.len());

    for (product_index, mut draft) in drafts.into_iter().enumerate() {
        let mut result = MatchResult {
            product_name: draft.name.clone(),
            product_index,
            matches: Vec::new(),
            missing: Vec::new(),
            over_capacity: Vec::new(),
            already_attached: Vec::new(),
        };
        let held_before: HashSet<String> = draft
            .images
            .iter()
            .map(|img| img.declared_name.clone())
            .collect();

        for reference in &draft.csv_image_refs {
            let Some(file) = lookup.resolve(reference) else {
                result.missing.push(reference.clone());
                continue;
            };

            let match_tier = classify_match(reference, &file.name);
            result.matches.push(ImageMatch {
                csv_name: reference.clone(),
                resolved_file_name: file.name.clone(),
                is_exact_match: match_tier == MatchTier::Exact,
                match_tier,
                file_size: file.size,
                mime_type: file.mime_type.clone(),
            });

            if held_before.contains(&file.name) {
                result.already_attached.push(reference.clone());
                continue;
            }
            if draft.images.len() >= MAX_IMAGES_PER_DRAFT {
                result.over_capacity.push(reference.clone());
                continue;
            }
            draft.images.push(previews.attach(Arc::clone(file)));
        }

        if !result.missing.is_empty() {
            tracing::debug!(
                product = %result.product_name,
                missing = result.missing.len(),
                "image references unresolved"
            );
        }

        results.push(result);
        updated.push(draft);
    }

    let outcome = MatchOutcome {
        drafts: updated,
        results,
    };
    tracing::info!(
        files = files.len(),
        products = outcome.results.len(),
        matched = outcome.matched_count(),
        missing = outcome.missing_count(),
        "image matching complete"
    );
    outcome
}

#[cfg(test)]
#[path = "matcher_test.rs"]
mod tests;
