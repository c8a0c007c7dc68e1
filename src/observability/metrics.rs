//! Validation metrics
//!
//! - Counters only
//! - Monotonic increase
//! - Lock-free (relaxed atomics)

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for one validator instance
#[derive(Debug, Default)]
pub struct ValidationMetrics {
    documents_validated: AtomicU64,
    documents_rejected: AtomicU64,
    semantic_rejections: AtomicU64,
    lookup_failures: AtomicU64,
    lookup_timeouts: AtomicU64,
    preorders_accepted: AtomicU64,
    preorders_consumed: AtomicU64,
}

impl ValidationMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_documents_validated(&self) {
        self.documents_validated.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_documents_rejected(&self) {
        self.documents_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_semantic_rejections(&self) {
        self.semantic_rejections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_lookup_failures(&self) {
        self.lookup_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_lookup_timeouts(&self) {
        self.lookup_timeouts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_preorders_accepted(&self) {
        self.preorders_accepted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_preorders_consumed(&self) {
        self.preorders_consumed.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of all counters
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            documents_validated: self.documents_validated.load(Ordering::Relaxed),
            documents_rejected: self.documents_rejected.load(Ordering::Relaxed),
            semantic_rejections: self.semantic_rejections.load(Ordering::Relaxed),
            lookup_failures: self.lookup_failures.load(Ordering::Relaxed),
            lookup_timeouts: self.lookup_timeouts.load(Ordering::Relaxed),
            preorders_accepted: self.preorders_accepted.load(Ordering::Relaxed),
            preorders_consumed: self.preorders_consumed.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub documents_validated: u64,
    pub documents_rejected: u64,
    pub semantic_rejections: u64,
    pub lookup_failures: u64,
    pub lookup_timeouts: u64,
    pub preorders_accepted: u64,
    pub preorders_consumed: u64,
}
