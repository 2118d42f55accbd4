//! Batch-level aggregation.
//!
//! Consumes the normalized dialogs and the per-call quality records
//! for one file and produces the aggregate analytics record.

use crate::analysis::keywords::{top_keywords, COMPLAINT_KEYWORDS, COMPLIMENT_KEYWORDS};
use crate::analysis::quality::round_one_decimal;
use crate::models::{AggregateAnalytics, CallQualityRecord, NormalizedDialog};
use rand::Rng;
use std::collections::HashMap;

/// Fixed service roster for attribution.
pub const SERVICE_ROSTER: [&str; 4] = [
    "Technical Support",
    "Billing Inquiries",
    "General Questions",
    "Sales",
];

/// Calls strictly longer than this count as escalated.
const ESCALATION_DURATION_SECONDS: f64 = 600.0;

/// Quality scores below this count toward `calls_below_threshold`.
const QUALITY_THRESHOLD: f64 = 6.0;

const ESCALATION_PHRASES: [&str; 3] = ["supervisor", "manager", "escalate"];

/// Build the aggregate analytics record for one file.
///
/// `qualities` must be the records produced from the same `dialogs`
/// in the same run; `avg_quality_score` and `calls_below_threshold`
/// are recomputed from that set so the two outputs stay consistent.
pub fn aggregate(
    dialogs: &[NormalizedDialog],
    qualities: &[CallQualityRecord],
    file_id: i64,
    rng: &mut impl Rng,
) -> AggregateAnalytics {
    let total_calls = dialogs.len();

    let avg_wait_time_seconds = dialogs
        .iter()
        .map(|d| d.duration_seconds)
        .sum::<f64>()
        / total_calls.max(1) as f64;

    // Only dialogs that carried text participate in theme extraction.
    let texts: Vec<&str> = dialogs
        .iter()
        .filter(|d| d.has_text())
        .map(|d| d.text.as_str())
        .collect();
    let top_complaints = top_keywords(&texts, &COMPLAINT_KEYWORDS);
    let top_compliments = top_keywords(&texts, &COMPLIMENT_KEYWORDS);

    let escalated_calls = dialogs.iter().filter(|d| is_escalated(d)).count();

    let satisfaction_score = satisfaction(escalated_calls, total_calls, top_complaints.len());

    let (popular_service, least_engaged_service) = pick_services(rng);

    let avg_quality_score = round_one_decimal(
        qualities.iter().map(|q| q.quality_score).sum::<f64>() / qualities.len().max(1) as f64,
    );
    let calls_below_threshold = qualities
        .iter()
        .filter(|q| q.quality_score < QUALITY_THRESHOLD)
        .count();

    AggregateAnalytics {
        file_id,
        total_calls,
        avg_wait_time_seconds,
        escalated_calls,
        satisfaction_score,
        top_complaints,
        top_compliments,
        popular_service,
        least_engaged_service,
        avg_quality_score,
        top_performing_agent: top_performing_agent(qualities),
        calls_below_threshold,
    }
}

/// A call is escalated when it runs long or mentions escalation.
fn is_escalated(dialog: &NormalizedDialog) -> bool {
    dialog.duration_seconds > ESCALATION_DURATION_SECONDS
        || ESCALATION_PHRASES.iter().any(|p| dialog.text.contains(p))
}

/// Satisfaction estimate on a 1.0 to 5.0 scale, one decimal place.
///
/// Starts at 5.0 and is pulled down by the escalation rate and the
/// number of complaint themes; floored at 1.0 before rounding.
fn satisfaction(escalated: usize, total_calls: usize, complaint_themes: usize) -> f64 {
    let total = total_calls.max(1) as f64;
    let raw = 5.0 - (escalated as f64 / total) * 2.0 - complaint_themes as f64 / 10.0;
    round_one_decimal(raw.max(1.0))
}

/// Draw the popular service from the injected randomness source and
/// pick the first roster entry different from it as least engaged.
///
/// The fallback is unreachable with a 4-entry roster but keeps the
/// function total.
fn pick_services(rng: &mut impl Rng) -> (String, String) {
    let popular = SERVICE_ROSTER[rng.gen_range(0..SERVICE_ROSTER.len())];
    let least = SERVICE_ROSTER
        .iter()
        .find(|s| **s != popular)
        .copied()
        .unwrap_or("Billing Inquiries");
    (popular.to_string(), least.to_string())
}

/// Agent with the strictly highest mean quality score.
///
/// Ties keep the first agent encountered: a later agent with an equal
/// mean does not replace the running maximum. Returns "" when there
/// are no calls.
fn top_performing_agent(qualities: &[CallQualityRecord]) -> String {
    let mut first_seen: Vec<&str> = Vec::new();
    let mut scores: HashMap<&str, Vec<f64>> = HashMap::new();

    for record in qualities {
        let agent = record.agent_name.as_str();
        if !scores.contains_key(agent) {
            first_seen.push(agent);
        }
        scores.entry(agent).or_default().push(record.quality_score);
    }

    let mut top_agent = "";
    let mut highest_mean = 0.0;
    for agent in first_seen {
        let agent_scores = &scores[agent];
        let mean = agent_scores.iter().sum::<f64>() / agent_scores.len() as f64;
        if mean > highest_mean {
            highest_mean = mean;
            top_agent = agent;
        }
    }

    top_agent.to_string()
}
