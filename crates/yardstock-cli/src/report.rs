//! Plain-text rendering of wizard results for the terminal.

use std::fmt::Write as _;

use yardstock_bulk::MatchResult;
use yardstock_core::{BatchOutcome, ProductDraft};

/// One block per product: each resolved reference with its tier, then
/// missing and over-capacity references.
pub(crate) fn render_matches(results: &[MatchResult]) -> String {
    let mut out = String::new();
    for result in results {
        let flag = if result.needs_review() { " (review)" } else { "" };
        let _ = writeln!(
            out,
            "{}. {}{flag}",
            result.product_index + 1,
            result.product_name
        );
        for m in &result.matches {
            let _ = writeln!(
                out,
                "   {} -> {} [{}]",
                m.csv_name, m.resolved_file_name, m.match_tier
            );
        }
        for missing in &result.missing {
            let _ = writeln!(out, "   {missing} -> missing");
        }
        for skipped in &result.over_capacity {
            let _ = writeln!(out, "   {skipped} -> skipped, product already has 4 images");
        }
        for kept in &result.already_attached {
            let _ = writeln!(out, "   {kept} -> already attached");
        }
    }

    let matched: usize = results.iter().map(|r| r.matches.len()).sum();
    let missing: usize = results.iter().map(|r| r.missing.len()).sum();
    let _ = writeln!(out, "{matched} matched, {missing} missing");
    out
}

pub(crate) fn render_review(drafts: &[ProductDraft]) -> String {
    let mut out = String::new();
    for (i, draft) in drafts.iter().enumerate() {
        let price = draft
            .price_per_yard
            .map_or_else(|| draft.price_input.clone(), |p| p.to_string());
        let quantity = draft
            .quantity
            .map_or_else(|| draft.quantity_input.clone(), |q| q.to_string());
        let _ = writeln!(
            out,
            "{}. {} | {price}/yd | qty {quantity} | {} | {} image(s)",
            i + 1,
            draft.name,
            draft.status,
            draft.images.len()
        );
        for image in &draft.images {
            let _ = writeln!(out, "   {} {}", image.declared_name, image.preview.uri());
        }
    }
    out
}

pub(crate) fn render_outcome(outcome: &BatchOutcome) -> String {
    let mut out = format!("created {} products", outcome.created_count);
    if outcome.error_count > 0 {
        let _ = write!(out, ", {} failed", outcome.error_count);
    }
    out
}
