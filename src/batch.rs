use std::sync::Arc;
use std::thread;

use tracing::debug;

use crate::domain::Identifier;
use crate::loader::RecordSource;
use crate::record::CanonicalRecord;

/// Loads every identifier on its own scoped thread and returns the records
/// that resolved. Failures drop out silently; output order carries no
/// relation to input order. Fan-out is not limited here, callers chunk.
pub fn load_batch<S>(source: &S, identifiers: &[Identifier]) -> Vec<Arc<CanonicalRecord>>
where
    S: RecordSource + ?Sized,
{
    let records: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = identifiers
            .iter()
            .map(|id| scope.spawn(move || source.load_identifier(id)))
            .collect();
        handles
            .into_iter()
            .filter_map(|handle| handle.join().ok().flatten())
            .collect()
    });
    debug!(
        requested = identifiers.len(),
        loaded = records.len(),
        "batch complete"
    );
    records
}
