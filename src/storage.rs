//! In-memory persistence for uploaded files and derived records.
//!
//! The engine only returns fully-formed values; everything about
//! keeping them lives here behind the `Storage` trait so a database
//! backend can be swapped in without touching the handlers.

use crate::models::{
    AggregateAnalytics, CallQualityRecord, StoredAnalytics, StoredCallQuality, VconFileRecord,
};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::RwLock;

/// Persistence operations the request handlers depend on.
///
/// All methods are infallible: the in-memory backend cannot fail, and
/// lookups return `Option`/empty collections instead of errors.
pub trait Storage: Send + Sync {
    fn create_vcon_file(&self, filename: String, data: serde_json::Value) -> VconFileRecord;
    fn vcon_file(&self, id: i64) -> Option<VconFileRecord>;
    fn all_vcon_files(&self) -> Vec<VconFileRecord>;
    /// Flip the processed flag once both outputs for the file are stored.
    fn mark_processed(&self, id: i64);

    fn create_analytics(&self, analytics: AggregateAnalytics) -> StoredAnalytics;
    fn analytics_by_file(&self, file_id: i64) -> Option<StoredAnalytics>;
    fn latest_analytics(&self) -> Option<StoredAnalytics>;
    fn all_analytics(&self) -> Vec<StoredAnalytics>;

    fn create_call_quality(&self, record: CallQualityRecord) -> StoredCallQuality;
    fn call_qualities_by_file(&self, file_id: i64) -> Vec<StoredCallQuality>;
    fn all_call_qualities(&self) -> Vec<StoredCallQuality>;
}

#[derive(Default)]
struct Inner {
    vcon_files: HashMap<i64, VconFileRecord>,
    analytics: HashMap<i64, StoredAnalytics>,
    call_qualities: HashMap<i64, StoredCallQuality>,
    next_vcon_id: i64,
    next_analytics_id: i64,
    next_call_quality_id: i64,
}

/// In-memory storage. Identifiers are sequential per record type,
/// starting at 1. Contents are lost on restart.
pub struct MemStorage {
    inner: RwLock<Inner>,
}

impl MemStorage {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                next_vcon_id: 1,
                next_analytics_id: 1,
                next_call_quality_id: 1,
                ..Default::default()
            }),
        }
    }
}

impl Default for MemStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl Storage for MemStorage {
    fn create_vcon_file(&self, filename: String, data: serde_json::Value) -> VconFileRecord {
        let mut inner = self.inner.write().expect("storage lock poisoned");
        let id = inner.next_vcon_id;
        inner.next_vcon_id += 1;

        let record = VconFileRecord {
            id,
            filename,
            uploaded_at: Utc::now(),
            data,
            processed: false,
        };
        inner.vcon_files.insert(id, record.clone());
        record
    }

    fn vcon_file(&self, id: i64) -> Option<VconFileRecord> {
        self.inner
            .read()
            .expect("storage lock poisoned")
            .vcon_files
            .get(&id)
            .cloned()
    }

    fn all_vcon_files(&self) -> Vec<VconFileRecord> {
        let mut files: Vec<VconFileRecord> = self
            .inner
            .read()
            .expect("storage lock poisoned")
            .vcon_files
            .values()
            .cloned()
            .collect();
        files.sort_by_key(|f| f.id);
        files
    }

    fn mark_processed(&self, id: i64) {
        let mut inner = self.inner.write().expect("storage lock poisoned");
        if let Some(file) = inner.vcon_files.get_mut(&id) {
            file.processed = true;
        }
    }

    fn create_analytics(&self, analytics: AggregateAnalytics) -> StoredAnalytics {
        let mut inner = self.inner.write().expect("storage lock poisoned");
        let id = inner.next_analytics_id;
        inner.next_analytics_id += 1;

        let stored = StoredAnalytics {
            id,
            created_at: Utc::now(),
            analytics,
        };
        inner.analytics.insert(id, stored.clone());
        stored
    }

    fn analytics_by_file(&self, file_id: i64) -> Option<StoredAnalytics> {
        self.inner
            .read()
            .expect("storage lock poisoned")
            .analytics
            .values()
            .find(|a| a.analytics.file_id == file_id)
            .cloned()
    }

    fn latest_analytics(&self) -> Option<StoredAnalytics> {
        // Insertion id breaks timestamp ties from the in-memory clock.
        self.inner
            .read()
            .expect("storage lock poisoned")
            .analytics
            .values()
            .max_by_key(|a| (a.created_at, a.id))
            .cloned()
    }

    fn all_analytics(&self) -> Vec<StoredAnalytics> {
        let mut all: Vec<StoredAnalytics> = self
            .inner
            .read()
            .expect("storage lock poisoned")
            .analytics
            .values()
            .cloned()
            .collect();
        all.sort_by_key(|a| a.id);
        all
    }

    fn create_call_quality(&self, record: CallQualityRecord) -> StoredCallQuality {
        let mut inner = self.inner.write().expect("storage lock poisoned");
        let id = inner.next_call_quality_id;
        inner.next_call_quality_id += 1;

        let stored = StoredCallQuality {
            id,
            created_at: Utc::now(),
            record,
        };
        inner.call_qualities.insert(id, stored.clone());
        stored
    }

    fn call_qualities_by_file(&self, file_id: i64) -> Vec<StoredCallQuality> {
        let mut records: Vec<StoredCallQuality> = self
            .inner
            .read()
            .expect("storage lock poisoned")
            .call_qualities
            .values()
            .filter(|q| q.record.file_id == file_id)
            .cloned()
            .collect();
        records.sort_by_key(|q| q.record.call_index);
        records
    }

    fn all_call_qualities(&self) -> Vec<StoredCallQuality> {
        let mut all: Vec<StoredCallQuality> = self
            .inner
            .read()
            .expect("storage lock poisoned")
            .call_qualities
            .values()
            .cloned()
            .collect();
        all.sort_by_key(|q| q.id);
        all
    }
}
