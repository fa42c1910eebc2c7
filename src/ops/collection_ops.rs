use crate::model::activity::{Activity, MAX_ACTIVITY};
use crate::model::record::{Record, RecordId};

/// Error type for record operations
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: RecordId },
}

// ---------------------------------------------------------------------------
// Lookup
// ---------------------------------------------------------------------------

pub fn find_record<R: Record>(items: &[R], id: RecordId) -> Option<&R> {
    items.iter().find(|r| r.id() == id)
}

/// Allocate an id for a new record: the current time in milliseconds, or one
/// past the largest id already present, whichever is greater.
///
/// If the largest id is `i64::MAX`, the lowest unused positive id is taken.
pub fn next_id<R: Record>(items: &[R], now_ms: i64) -> RecordId {
    let max = items.iter().map(Record::id).max().unwrap_or(0);
    match max.checked_add(1) {
        Some(past_max) => now_ms.max(past_max),
        None => (1..)
            .find(|id| find_record(items, *id).is_none())
            .unwrap_or(now_ms),
    }
}

// ---------------------------------------------------------------------------
// Mutations
// ---------------------------------------------------------------------------

/// Append `record`, keeping its id if it has a fresh one.
/// Returns the record as stored.
pub fn add_record<R: Record>(items: &mut Vec<R>, mut record: R, now_ms: i64) -> R {
    if record.id() == 0 || find_record(items, record.id()).is_some() {
        record.set_id(next_id(items, now_ms));
    }
    items.push(record.clone());
    record
}

/// Replace the record with the same id, in place. Returns the old value.
pub fn update_record<R: Record>(items: &mut [R], record: R) -> Result<R, RecordError> {
    let id = record.id();
    let slot = items
        .iter_mut()
        .find(|r| r.id() == id)
        .ok_or(RecordError::NotFound { kind: R::KIND, id })?;
    Ok(std::mem::replace(slot, record))
}

/// Remove the record with `id`, keeping the others in order.
pub fn remove_record<R: Record>(items: &mut Vec<R>, id: RecordId) -> Result<R, RecordError> {
    let idx = items
        .iter()
        .position(|r| r.id() == id)
        .ok_or(RecordError::NotFound { kind: R::KIND, id })?;
    Ok(items.remove(idx))
}

/// Prepend `entry`, dropping the oldest entries beyond [`MAX_ACTIVITY`].
pub fn push_activity(log: &mut Vec<Activity>, entry: Activity) {
    log.insert(0, entry);
    log.truncate(MAX_ACTIVITY);
}
