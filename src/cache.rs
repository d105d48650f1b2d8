use std::sync::Arc;

use dashmap::DashMap;

use crate::domain::Identifier;
use crate::record::CanonicalRecord;

/// Identifier-keyed record cache.
///
/// Unbounded and never expires. Concurrent misses for the same key may both
/// fetch; the later write wins, which is harmless because records are
/// immutable and equal by value.
#[derive(Debug, Default)]
pub struct RecordCache {
    entries: DashMap<Identifier, Arc<CanonicalRecord>>,
}

impl RecordCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &Identifier) -> Option<Arc<CanonicalRecord>> {
        self.entries.get(id).map(|entry| Arc::clone(entry.value()))
    }

    pub fn put(&self, id: Identifier, record: Arc<CanonicalRecord>) {
        self.entries.insert(id, record);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
