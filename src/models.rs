//! Data models for the vCon analytics service.
//!
//! This module contains the typed representation of uploaded vCon
//! documents plus the analytics and call-quality records the engine
//! produces and the storage layer persists.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A parsed vCon conversation-record document.
///
/// Only the fields the engine consumes are typed strictly; the rest
/// are carried through loosely so that real-world vCon files with
/// extra metadata still parse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VconDocument {
    /// vCon format version marker (required top-level field).
    pub vcon: String,
    /// Unique identifier of the conversation record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    /// Participants in the conversation.
    #[serde(default)]
    pub parties: Vec<Party>,
    /// Recorded dialog turns (required top-level field).
    pub dialog: Vec<DialogEntry>,
    /// Pre-existing analysis attachments, passed through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<serde_json::Value>,
}

/// One participant referenced by a vCon document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Party {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mailto: Option<String>,
}

/// One recorded call/turn within a vCon document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DialogEntry {
    /// Dialog type (e.g. "recording", "text").
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Start timestamp as recorded in the source file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    /// Call duration in seconds. Missing durations are treated as 0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    /// Indexes into the document's party list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parties: Option<serde_json::Value>,
    /// Message body, used as transcript fallback.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// Call transcript text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
}

/// A dialog entry reduced to the two signals the engine scores on.
///
/// Produced by normalization: duration defaults to 0, text is the
/// lowercased transcript (falling back to the body), possibly empty.
/// Order is preserved and defines the call index.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedDialog {
    /// Call duration in seconds (0 when absent).
    pub duration_seconds: f64,
    /// Lowercased transcript or body text; empty when neither exists.
    pub text: String,
}

impl NormalizedDialog {
    /// Whether this dialog carried any transcript/body text.
    pub fn has_text(&self) -> bool {
        !self.text.is_empty()
    }
}

/// Per-call quality assessment, one per dialog entry in a file.
///
/// `call_index` equals the dialog's position in the uploaded document
/// and is unique per file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallQualityRecord {
    /// Identifier of the uploaded file this record belongs to.
    pub file_id: i64,
    /// 0-based position of the dialog within the file.
    pub call_index: usize,
    /// Agent assigned by round-robin over the fixed roster.
    pub agent_name: String,
    /// Heuristic quality score in [1.0, 10.0], one decimal place.
    pub quality_score: f64,
    pub has_greeting: bool,
    pub has_closing: bool,
    pub is_calm: bool,
    pub resolved_in_time: bool,
    pub was_transferred: bool,
    /// Call duration in seconds.
    pub duration_seconds: f64,
}

/// Batch-level analytics for one uploaded file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateAnalytics {
    /// Identifier of the uploaded file this record belongs to.
    pub file_id: i64,
    /// Number of dialog entries in the file.
    pub total_calls: usize,
    /// Mean dialog duration in seconds (0 when there are no dialogs).
    pub avg_wait_time_seconds: f64,
    /// Calls exceeding the duration threshold or mentioning escalation.
    pub escalated_calls: usize,
    /// Estimated satisfaction in [1.0, 5.0], one decimal place.
    pub satisfaction_score: f64,
    /// Up to 5 complaint keywords, most frequent first.
    pub top_complaints: Vec<String>,
    /// Up to 5 compliment keywords, most frequent first.
    pub top_compliments: Vec<String>,
    /// Service drawn from the fixed roster (seedable random pick).
    pub popular_service: String,
    /// First roster service different from the popular one.
    pub least_engaged_service: String,
    /// Mean of all quality scores in the file, one decimal place.
    pub avg_quality_score: f64,
    /// Agent with the highest mean quality score; "" when no calls.
    pub top_performing_agent: String,
    /// Count of calls scoring below 6.0.
    pub calls_below_threshold: usize,
}

/// An uploaded vCon file as persisted by the storage layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VconFileRecord {
    /// Storage-assigned identifier (sequential from 1).
    pub id: i64,
    /// Original filename from the multipart upload.
    pub filename: String,
    pub uploaded_at: DateTime<Utc>,
    /// The raw parsed JSON document.
    pub data: serde_json::Value,
    /// Set once analytics for the file have been stored.
    pub processed: bool,
}

/// Stored aggregate analytics with storage-assigned metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredAnalytics {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub analytics: AggregateAnalytics,
}

/// Stored call-quality record with storage-assigned metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredCallQuality {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub record: CallQualityRecord,
}
