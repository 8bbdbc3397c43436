use super::model::ReplayResult;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Default)]
struct HistoryInner {
    entries: Vec<ReplayResult>,
    index: HashMap<String, usize>,
}

/// Append-only log of replay results, in insertion order.
///
/// Owned by whoever constructs it; share it behind an `Arc` when several
/// executors should record into the same log. No capacity bound is applied.
#[derive(Default)]
pub struct ReplayHistoryStore {
    inner: Mutex<HistoryInner>,
}

impl ReplayHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HistoryInner> {
        // A panic while holding the lock cannot leave a half-written entry
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record a result. A result whose id is already present is dropped.
    pub fn append(&self, result: ReplayResult) {
        let mut inner = self.lock();
        if inner.index.contains_key(&result.id) {
            log::warn!("Replay {} already recorded, ignoring duplicate", result.id);
            return;
        }
        let position = inner.entries.len();
        inner.index.insert(result.id.clone(), position);
        inner.entries.push(result);
    }

    /// Copy of every recorded result, oldest first
    pub fn get_all(&self) -> Vec<ReplayResult> {
        self.lock().entries.clone()
    }

    pub fn get_by_id(&self, id: &str) -> Option<ReplayResult> {
        let inner = self.lock();
        inner
            .index
            .get(id)
            .and_then(|&position| inner.entries.get(position))
            .cloned()
    }

    /// Every replay of one captured request, oldest first
    pub fn by_capture(&self, capture_id: &str) -> Vec<ReplayResult> {
        self.lock()
            .entries
            .iter()
            .filter(|r| r.capture_id == capture_id)
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.entries.clear();
        inner.index.clear();
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }
}
