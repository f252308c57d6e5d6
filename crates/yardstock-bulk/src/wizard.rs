//! The bulk-upload wizard as an explicit state machine.
//!
//! [`reduce`] is the only way to move a [`WizardSession`] forward: it takes
//! the session by value together with one [`WizardAction`] and returns the
//! next session. A rejected action leaves drafts, attachments and the step
//! untouched and records its messages in [`WizardSession::errors`].
//!
//! The wizard never talks to the network. When a submission is accepted the
//! session enters [`Step::Submitting`]; the caller performs the request and
//! reports back with [`WizardAction::SubmitSucceeded`] or
//! [`WizardAction::SubmitFailed`]. Every other action is refused while a
//! submission is in flight.

use std::sync::Arc;

use uuid::Uuid;

use yardstock_core::{
    BatchOutcome, ProductDraft, ProductStatus, UploadedFile, MAX_DRAFTS_PER_BATCH,
    MAX_IMAGES_PER_DRAFT,
};

use crate::csv_import::parse_products_csv;
use crate::error::{FieldError, WizardError};
use crate::matcher::{match_images, MatchResult};
use crate::normalize::{check_draft, normalize_draft, revalidate};
use crate::preview::PreviewRegistry;
use crate::validate::{validate_price, validate_quantity};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    MethodSelect,
    CsvUpload,
    ProductForm,
    BulkImageUpload,
    MatchVerification,
    Review,
    Submitting,
    Done,
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Step::MethodSelect => "method-select",
            Step::CsvUpload => "csv-upload",
            Step::ProductForm => "product-form",
            Step::BulkImageUpload => "bulk-image-upload",
            Step::MatchVerification => "match-verification",
            Step::Review => "review",
            Step::Submitting => "submitting",
            Step::Done => "done",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryMethod {
    Csv,
    Manual,
}

/// Editable text fields of a draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftField {
    Name,
    PricePerYard,
    Quantity,
    MaterialType,
    Pattern,
    Description,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadProgress {
    pub completed: usize,
    pub total: usize,
    pub message: String,
}

#[derive(Debug)]
pub enum WizardAction {
    ChooseMethod(EntryMethod),
    ImportCsv { contents: String },
    AddDraft,
    RemoveDraft { temp_id: Uuid },
    EditField {
        temp_id: Uuid,
        field: DraftField,
        value: String,
    },
    SetStatus {
        temp_id: Uuid,
        status: ProductStatus,
    },
    AttachImages {
        temp_id: Uuid,
        files: Vec<Arc<UploadedFile>>,
    },
    RemoveImage { temp_id: Uuid, image_id: String },
    ProceedFromForm,
    UploadImagePool { files: Vec<Arc<UploadedFile>> },
    SkipBulkUpload,
    ConfirmMatches,
    Back,
    RequestSubmit { confirm_missing_images: bool },
    SubmitSucceeded(BatchOutcome),
    /// The request failed as a whole; `messages` are shown on the review step.
    SubmitFailed { messages: Vec<String> },
    Cancel,
}

impl WizardAction {
    fn label(&self) -> &'static str {
        match self {
            WizardAction::ChooseMethod(_) => "choose method",
            WizardAction::ImportCsv { .. } => "import CSV",
            WizardAction::AddDraft => "add product",
            WizardAction::RemoveDraft { .. } => "remove product",
            WizardAction::EditField { .. } => "edit field",
            WizardAction::SetStatus { .. } => "set status",
            WizardAction::AttachImages { .. } => "attach images",
            WizardAction::RemoveImage { .. } => "remove image",
            WizardAction::ProceedFromForm => "continue",
            WizardAction::UploadImagePool { .. } => "upload images",
            WizardAction::SkipBulkUpload => "skip image upload",
            WizardAction::ConfirmMatches => "confirm matches",
            WizardAction::Back => "back",
            WizardAction::RequestSubmit { .. } => "submit",
            WizardAction::SubmitSucceeded(_) => "submission succeeded",
            WizardAction::SubmitFailed { .. } => "submission failed",
            WizardAction::Cancel => "cancel",
        }
    }
}

/// All state of one run through the wizard.
#[derive(Debug)]
pub struct WizardSession {
    pub step: Step,
    pub method: Option<EntryMethod>,
    pub drafts: Vec<ProductDraft>,
    pub match_results: Vec<MatchResult>,
    /// Messages from the most recent action; cleared at the start of each action.
    pub errors: Vec<String>,
    pub progress: Option<UploadProgress>,
    /// Set when submission was refused because some drafts have no images.
    pub awaiting_confirmation: bool,
    pub last_outcome: Option<BatchOutcome>,
    previews: PreviewRegistry,
}

impl Default for WizardSession {
    fn default() -> Self {
        Self::new()
    }
}

impl WizardSession {
    #[must_use]
    pub fn new() -> Self {
        Self {
            step: Step::MethodSelect,
            method: None,
            drafts: Vec::new(),
            match_results: Vec::new(),
            errors: Vec::new(),
            progress: None,
            awaiting_confirmation: false,
            last_outcome: None,
            previews: PreviewRegistry::new(),
        }
    }

    #[must_use]
    pub fn draft(&self, temp_id: Uuid) -> Option<&ProductDraft> {
        self.drafts.iter().find(|d| d.temp_id == temp_id)
    }

    /// Number of preview handles currently held by this session.
    #[must_use]
    pub fn live_previews(&self) -> usize {
        self.previews.live_count()
    }

    /// Soft warnings shown on the review step, one per draft without images.
    #[must_use]
    pub fn missing_image_warnings(&self) -> Vec<String> {
        self.drafts
            .iter()
            .enumerate()
            .filter(|(_, d)| !d.has_images())
            .map(|(i, d)| format!("Product {} ({}) has no images", i + 1, d.name))
            .collect()
    }

    /// Releases everything the session holds. Call when leaving the wizard.
    pub fn teardown(mut self) -> usize {
        self.discard_drafts()
    }

    fn draft_mut(&mut self, temp_id: Uuid) -> Result<&mut ProductDraft, WizardError> {
        self.drafts
            .iter_mut()
            .find(|d| d.temp_id == temp_id)
            .ok_or(WizardError::DraftNotFound(temp_id))
    }

    fn discard_drafts(&mut self) -> usize {
        let drafts = std::mem::take(&mut self.drafts);
        let released = self
            .previews
            .dispose_all(drafts.into_iter().flat_map(|d| d.images));
        released + self.previews.release_all()
    }

    fn reset(&mut self) {
        let released = self.discard_drafts();
        tracing::info!(released, "wizard session discarded");
        *self = Self::new();
    }
}

/// Applies `action` to `session`, returning the next session.
#[must_use]
pub fn reduce(mut session: WizardSession, action: WizardAction) -> WizardSession {
    session.errors.clear();
    let label = action.label();
    let from = session.step;

    if let Err(err) = apply(&mut session, action) {
        tracing::debug!(step = %from, action = label, error = %err, "wizard action rejected");
        session.errors = err.messages();
    } else if session.step != from {
        tracing::debug!(from = %from, to = %session.step, action = label, "wizard step changed");
    }

    session
}

fn apply(session: &mut WizardSession, action: WizardAction) -> Result<(), WizardError> {
    let step = session.step;

    if step == Step::Submitting {
        return match action {
            WizardAction::SubmitSucceeded(outcome) => {
                finish_submission(session, outcome);
                Ok(())
            }
            WizardAction::SubmitFailed { messages } => {
                session.step = Step::Review;
                session.progress = None;
                session.errors = messages;
                Ok(())
            }
            _ => Err(WizardError::SubmissionInFlight),
        };
    }

    match (step, action) {
        (_, WizardAction::Cancel) => {
            session.reset();
            Ok(())
        }

        (Step::MethodSelect, WizardAction::ChooseMethod(EntryMethod::Csv)) => {
            session.method = Some(EntryMethod::Csv);
            session.step = Step::CsvUpload;
            Ok(())
        }
        (Step::MethodSelect, WizardAction::ChooseMethod(EntryMethod::Manual)) => {
            session.method = Some(EntryMethod::Manual);
            session.drafts = vec![ProductDraft::empty()];
            session.step = Step::ProductForm;
            Ok(())
        }

        (Step::CsvUpload, WizardAction::ImportCsv { contents }) => {
            let rows = parse_products_csv(&contents)?;
            session.drafts = rows
                .into_iter()
                .map(|row| normalize_draft(row, Vec::new()).draft)
                .collect();
            session.step = Step::ProductForm;
            Ok(())
        }
        (Step::CsvUpload, WizardAction::Back) => {
            session.method = None;
            session.step = Step::MethodSelect;
            Ok(())
        }

        (Step::ProductForm, action) => apply_form(session, action),

        (Step::BulkImageUpload, WizardAction::UploadImagePool { files }) => {
            let (images, rejected): (Vec<_>, Vec<_>) =
                files.into_iter().partition(|f| f.is_image());
            let drafts = std::mem::take(&mut session.drafts);
            let outcome = match_images(&images, drafts, &mut session.previews);
            session.drafts = outcome.drafts;
            session.match_results = outcome.results;
            session.errors = rejected
                .iter()
                .map(|f| format!("{} is not an image and was ignored", f.name))
                .collect();
            session.step = Step::MatchVerification;
            Ok(())
        }
        (Step::BulkImageUpload, WizardAction::SkipBulkUpload) => {
            session.match_results.clear();
            session.step = Step::Review;
            Ok(())
        }
        (Step::BulkImageUpload, WizardAction::Back) => {
            session.step = Step::ProductForm;
            Ok(())
        }

        (Step::MatchVerification, WizardAction::ConfirmMatches) => {
            session.step = Step::Review;
            Ok(())
        }
        (Step::MatchVerification, WizardAction::Back) => {
            session.step = Step::BulkImageUpload;
            Ok(())
        }

        (Step::Review, WizardAction::RequestSubmit {
            confirm_missing_images,
        }) => begin_submission(session, confirm_missing_images),
        (Step::Review, WizardAction::Back) => {
            session.awaiting_confirmation = false;
            session.step = Step::ProductForm;
            Ok(())
        }

        (step, action) => Err(WizardError::InvalidTransition {
            step,
            action: action.label(),
        }),
    }
}

fn apply_form(session: &mut WizardSession, action: WizardAction) -> Result<(), WizardError> {
    match action {
        WizardAction::AddDraft => {
            if session.drafts.len() >= MAX_DRAFTS_PER_BATCH {
                return Err(WizardError::TooManyDrafts(MAX_DRAFTS_PER_BATCH));
            }
            session.drafts.push(ProductDraft::empty());
            Ok(())
        }
        WizardAction::RemoveDraft { temp_id } => {
            let idx = session
                .drafts
                .iter()
                .position(|d| d.temp_id == temp_id)
                .ok_or(WizardError::DraftNotFound(temp_id))?;
            let draft = session.drafts.remove(idx);
            session.previews.dispose_all(draft.images);
            Ok(())
        }
        WizardAction::EditField {
            temp_id,
            field,
            value,
        } => {
            edit_field(session.draft_mut(temp_id)?, field, value);
            Ok(())
        }
        WizardAction::SetStatus { temp_id, status } => {
            session.draft_mut(temp_id)?.status = status;
            Ok(())
        }
        WizardAction::AttachImages { temp_id, files } => attach_images(session, temp_id, files),
        WizardAction::RemoveImage { temp_id, image_id } => {
            let draft = session.draft_mut(temp_id)?;
            let idx = draft
                .images
                .iter()
                .position(|i| i.id == image_id)
                .ok_or_else(|| WizardError::ImageNotFound(image_id.clone()))?;
            let attachment = draft.images.remove(idx);
            session.previews.dispose(attachment);
            Ok(())
        }
        WizardAction::ProceedFromForm => proceed_from_form(session),
        other => Err(WizardError::InvalidTransition {
            step: Step::ProductForm,
            action: other.label(),
        }),
    }
}

/// Stores the typed text and recomputes the field's inline error.
fn edit_field(draft: &mut ProductDraft, field: DraftField, value: String) {
    match field {
        DraftField::Name => draft.name = value,
        DraftField::PricePerYard => {
            let checked = validate_price(&value);
            draft.price_per_yard = checked.as_ref().ok().copied();
            draft.price_error = checked.err().as_ref().map(FieldError::to_string);
            draft.price_input = value;
        }
        DraftField::Quantity => {
            let checked = validate_quantity(&value);
            draft.quantity = checked.as_ref().ok().copied();
            draft.quantity_error = checked.err().as_ref().map(FieldError::to_string);
            draft.quantity_input = value;
        }
        DraftField::MaterialType => draft.material_type = value,
        DraftField::Pattern => draft.pattern = value,
        DraftField::Description => draft.description = value,
    }
}

/// Appends images to the draft identified by `temp_id`, read against the
/// current state of that draft. Files beyond the per-draft cap and
/// non-image files are reported and skipped.
fn attach_images(
    session: &mut WizardSession,
    temp_id: Uuid,
    files: Vec<Arc<UploadedFile>>,
) -> Result<(), WizardError> {
    let idx = session
        .drafts
        .iter()
        .position(|d| d.temp_id == temp_id)
        .ok_or(WizardError::DraftNotFound(temp_id))?;

    let mut notices = Vec::new();
    for file in files {
        if !file.is_image() {
            notices.push(format!("{} is not an image and was ignored", file.name));
            continue;
        }
        if session.drafts[idx].remaining_image_slots() == 0 {
            notices.push(format!(
                "{} was not added: a product holds at most {} images",
                file.name,
                MAX_IMAGES_PER_DRAFT
            ));
            continue;
        }
        let attachment = session.previews.attach(file);
        session.drafts[idx].images.push(attachment);
    }

    session.errors = notices;
    Ok(())
}

fn proceed_from_form(session: &mut WizardSession) -> Result<(), WizardError> {
    if session.drafts.is_empty() {
        return Err(WizardError::EmptyBatch);
    }

    let mut problems = Vec::new();
    let drafts = std::mem::take(&mut session.drafts);
    session.drafts = drafts
        .into_iter()
        .enumerate()
        .map(|(i, draft)| {
            let normalized = revalidate(draft);
            problems.extend(
                normalized
                    .errors
                    .iter()
                    .map(|e| format!("Product {}: {e}", i + 1)),
            );
            normalized.draft
        })
        .collect();

    if !problems.is_empty() {
        return Err(WizardError::Validation(problems));
    }

    session.step = if session.drafts.iter().any(ProductDraft::declares_image_refs) {
        Step::BulkImageUpload
    } else {
        Step::Review
    };
    Ok(())
}

/// Moves to [`Step::Submitting`] once every draft passes validation.
///
/// Drafts without images need an explicit confirmation. A draft that fails
/// validation sends the wizard back to the product form.
fn begin_submission(
    session: &mut WizardSession,
    confirm_missing_images: bool,
) -> Result<(), WizardError> {
    if session.drafts.is_empty() {
        return Err(WizardError::EmptyBatch);
    }

    let warnings = session.missing_image_warnings();
    if !warnings.is_empty() && !confirm_missing_images {
        session.awaiting_confirmation = true;
        session.errors = warnings;
        return Ok(());
    }

    let problems: Vec<String> = session
        .drafts
        .iter()
        .enumerate()
        .flat_map(|(i, d)| {
            check_draft(d)
                .into_iter()
                .map(move |e| format!("Product {}: {e}", i + 1))
        })
        .collect();
    if !problems.is_empty() {
        session.step = Step::ProductForm;
        session.awaiting_confirmation = false;
        return Err(WizardError::Validation(problems));
    }

    let total = session.drafts.len();
    session.awaiting_confirmation = false;
    session.progress = Some(UploadProgress {
        completed: 0,
        total,
        message: format!("Submitting {total} products"),
    });
    session.step = Step::Submitting;
    tracing::info!(products = total, "bulk submission started");
    Ok(())
}

fn finish_submission(session: &mut WizardSession, outcome: BatchOutcome) {
    let total = session.drafts.len();
    if outcome.is_complete() {
        let released = session.discard_drafts();
        tracing::info!(
            created = outcome.created_count,
            released,
            "bulk submission complete"
        );
        session.progress = Some(UploadProgress {
            completed: outcome.created_count,
            total,
            message: format!("Created {} products", outcome.created_count),
        });
        session.match_results.clear();
        session.step = Step::Done;
    } else {
        tracing::warn!(
            created = outcome.created_count,
            failed = outcome.error_count,
            "bulk submission partially failed"
        );
        session.errors = outcome
            .errors
            .iter()
            .map(|e| {
                let name = session
                    .drafts
                    .get(e.index)
                    .map_or("unknown product", |d| d.name.as_str());
                format!("Product {} ({name}): {}", e.index + 1, e.error)
            })
            .collect();
        session.progress = None;
        session.step = Step::Review;
    }
    session.last_outcome = Some(outcome);
}

#[cfg(test)]
#[path = "wizard_test.rs"]
mod tests;
