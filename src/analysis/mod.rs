//! The analytics engine.
//!
//! A pure, stateless batch transform over one parsed vCon document:
//! normalize the dialog entries, score each call, then aggregate the
//! batch. It performs no I/O and holds no shared state, so it is safe
//! to run concurrently for different files.

pub mod aggregator;
pub mod keywords;
pub mod quality;

use crate::models::{AggregateAnalytics, CallQualityRecord, DialogEntry, NormalizedDialog, VconDocument};
use rand::Rng;

/// Run the full analysis for one uploaded file.
///
/// Returns the aggregate analytics and one quality record per dialog
/// entry, index-aligned with the input order. Total: any well-formed
/// document (including one with zero dialogs) produces valid output.
///
/// The randomness source only feeds the service-attribution pick;
/// passing a seeded generator makes the whole run reproducible.
pub fn analyze(
    document: &VconDocument,
    file_id: i64,
    rng: &mut impl Rng,
) -> (AggregateAnalytics, Vec<CallQualityRecord>) {
    let dialogs = normalize_dialogs(&document.dialog);

    let qualities: Vec<CallQualityRecord> = dialogs
        .iter()
        .enumerate()
        .map(|(index, dialog)| quality::score_call(dialog, index, file_id))
        .collect();

    let analytics = aggregator::aggregate(&dialogs, &qualities, file_id, rng);

    (analytics, qualities)
}

/// Reduce raw dialog entries to the duration and text the engine uses.
///
/// No entry is dropped and order is preserved; the position of each
/// entry defines its call index. An empty transcript falls through to
/// the body, and entries with neither are kept with empty text so all
/// keyword checks evaluate false.
pub fn normalize_dialogs(dialogs: &[DialogEntry]) -> Vec<NormalizedDialog> {
    dialogs
        .iter()
        .map(|entry| {
            let text = entry
                .transcript
                .as_deref()
                .filter(|t| !t.is_empty())
                .or_else(|| entry.body.as_deref().filter(|b| !b.is_empty()))
                .unwrap_or("");
            NormalizedDialog {
                duration_seconds: entry.duration.unwrap_or(0.0),
                text: text.to_lowercase(),
            }
        })
        .collect()
}
