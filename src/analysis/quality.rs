//! Per-call quality scoring.
//!
//! A deterministic keyword/duration heuristic, not an ML model: each
//! normalized dialog is scored independently of every other call.

use crate::analysis::keywords::COMPLAINT_KEYWORDS;
use crate::models::{CallQualityRecord, NormalizedDialog};

/// Fixed agent roster. Order matters: agents are assigned round-robin
/// by call index, so the roster order defines the assignment.
pub const AGENT_ROSTER: [&str; 5] = [
    "Sarah Johnson",
    "Mike Chen",
    "Emily Davis",
    "Alex Rodriguez",
    "Jessica Wilson",
];

/// Calls at or above this duration count as not resolved in time.
pub const RESOLUTION_CUTOFF_SECONDS: f64 = 600.0;

const GREETING_PHRASES: [&str; 3] = ["hello", "good", "thank you for calling"];
const CLOSING_PHRASES: [&str; 3] = ["thank you", "goodbye", "have a great day"];
const AGITATION_PHRASES: [&str; 2] = ["angry", "frustrated"];
const TRANSFER_PHRASES: [&str; 3] = ["transfer", "escalate", "supervisor"];

/// Score one call from its normalized dialog and position in the file.
///
/// Total: every input produces a record. A dialog with no text fails
/// every keyword check (empty text contains none of the phrases) and
/// still gets a score from the duration signals.
pub fn score_call(dialog: &NormalizedDialog, call_index: usize, file_id: i64) -> CallQualityRecord {
    let text = dialog.text.as_str();

    let has_greeting = contains_any(text, &GREETING_PHRASES);
    let has_closing = contains_any(text, &CLOSING_PHRASES);
    let is_calm =
        !contains_any(text, &AGITATION_PHRASES) && !contains_any(text, &COMPLAINT_KEYWORDS);
    let resolved_in_time = dialog.duration_seconds < RESOLUTION_CUTOFF_SECONDS;
    let was_transferred = contains_any(text, &TRANSFER_PHRASES);

    let mut score: f64 = 5.0;
    if has_greeting {
        score += 1.5;
    }
    if has_closing {
        score += 1.5;
    }
    if is_calm {
        score += 2.0;
    }
    if resolved_in_time {
        score += 1.5;
    }
    if was_transferred {
        score -= 2.0;
    }

    CallQualityRecord {
        file_id,
        call_index,
        agent_name: AGENT_ROSTER[call_index % AGENT_ROSTER.len()].to_string(),
        quality_score: round_one_decimal(score.clamp(1.0, 10.0)),
        has_greeting,
        has_closing,
        is_calm,
        resolved_in_time,
        was_transferred,
        duration_seconds: dialog.duration_seconds,
    }
}

fn contains_any(text: &str, phrases: &[&str]) -> bool {
    phrases.iter().any(|p| text.contains(p))
}

/// Round to one decimal place, matching the stored-score precision.
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
