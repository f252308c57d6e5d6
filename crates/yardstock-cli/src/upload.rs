//! Headless driver for the bulk-upload wizard.
//!
//! Feeds the same actions a vendor would produce in the UI through
//! [`yardstock_bulk::reduce`], printing each stage to stdout.

use std::path::Path;

use anyhow::Context;
use yardstock_bulk::{reduce, EntryMethod, Step, WizardAction, WizardSession};
use yardstock_client::{prepare_batch, BatchSubmitter, CatalogClient};
use yardstock_core::{load_vendor_profile, AppConfig};

use crate::pool::load_image_pool;
use crate::report::{render_matches, render_outcome, render_review};

/// Applies `action`, failing when it was rejected. Messages from an action
/// that did move the wizard forward are printed as warnings.
fn advance(session: WizardSession, action: WizardAction) -> anyhow::Result<WizardSession> {
    let before = session.step;
    let session = reduce(session, action);
    if session.step == before && !session.errors.is_empty() {
        let messages = session.errors.join("\n  ");
        session.teardown();
        anyhow::bail!("{before} step failed:\n  {messages}");
    }
    for notice in &session.errors {
        eprintln!("warning: {notice}");
    }
    Ok(session)
}

/// Imports `csv` and, when the rows reference images, matches them against
/// the pool in `images`. Leaves the session on the review step.
fn import_and_match(csv: &Path, images: Option<&Path>) -> anyhow::Result<WizardSession> {
    let contents = std::fs::read_to_string(csv)
        .with_context(|| format!("failed to read CSV {}", csv.display()))?;

    let mut session = WizardSession::new();
    for action in [
        WizardAction::ChooseMethod(EntryMethod::Csv),
        WizardAction::ImportCsv { contents },
        WizardAction::ProceedFromForm,
    ] {
        session = advance(session, action)?;
    }

    if session.step != Step::BulkImageUpload {
        return Ok(session);
    }

    match images {
        Some(dir) => {
            let files = load_image_pool(dir)?;
            session = advance(session, WizardAction::UploadImagePool { files })?;
            print!("{}", render_matches(&session.match_results));
            advance(session, WizardAction::ConfirmMatches)
        }
        None => advance(session, WizardAction::SkipBulkUpload),
    }
}

pub(crate) fn run_match(csv: &Path, images: &Path) -> anyhow::Result<()> {
    let session = import_and_match(csv, Some(images))?;
    if session.match_results.is_empty() {
        println!("no image references in {}", csv.display());
    }
    session.teardown();
    Ok(())
}

/// Runs the whole wizard and submits the batch.
///
/// # Errors
///
/// Returns an error for any rejected step, when products lack images and
/// `confirm_missing_images` is off, and when any product fails to upload.
pub(crate) async fn run_upload(
    config: &AppConfig,
    csv: &Path,
    images: Option<&Path>,
    confirm_missing_images: bool,
    dry_run: bool,
) -> anyhow::Result<()> {
    let vendor = load_vendor_profile(&config.vendor_path)?;
    let session = import_and_match(csv, images)?;

    println!("review:");
    print!("{}", render_review(&session.drafts));

    if dry_run {
        let batch = prepare_batch(&session.drafts, &vendor)?;
        println!("{}", serde_json::to_string_pretty(&batch.products)?);
        println!(
            "dry-run: would submit {} products with {} images for vendor {}",
            batch.products.len(),
            batch.images.len(),
            vendor.vendor_id
        );
        session.teardown();
        return Ok(());
    }

    let session = reduce(
        session,
        WizardAction::RequestSubmit {
            confirm_missing_images,
        },
    );
    if session.step != Step::Submitting {
        let messages = session.errors.join("\n  ");
        let awaiting = session.awaiting_confirmation;
        session.teardown();
        if awaiting {
            anyhow::bail!("{messages}\nrerun with --yes to submit products without images");
        }
        anyhow::bail!("submission refused:\n  {messages}");
    }

    let submitter = BatchSubmitter::new(CatalogClient::from_config(config)?, vendor);
    let result = submitter.submit(&session.drafts).await;
    let session = match result {
        Ok(outcome) => reduce(session, WizardAction::SubmitSucceeded(outcome)),
        Err(e) => reduce(
            session,
            WizardAction::SubmitFailed {
                messages: e.messages(),
            },
        ),
    };

    if let Some(outcome) = &session.last_outcome {
        println!("{}", render_outcome(outcome));
    }
    if session.step == Step::Done {
        return Ok(());
    }

    let messages = session.errors.join("\n  ");
    session.teardown();
    anyhow::bail!("upload incomplete:\n  {messages}")
}
