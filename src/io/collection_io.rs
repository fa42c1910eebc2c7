use std::collections::HashSet;

use serde_json::Value;

use crate::io::storage::{Storage, StorageError};
use crate::model::record::{RecordId, Stored};

/// Why a stored value could not be read as a collection.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("no value stored")]
    Absent,
    #[error("stored value is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("stored value is not a JSON array")]
    NotASequence,
}

/// Parse a raw stored value into its elements.
pub fn decode_collection(raw: Option<&str>) -> Result<Vec<Value>, DecodeError> {
    let raw = raw.ok_or(DecodeError::Absent)?;
    match serde_json::from_str::<Value>(raw)? {
        Value::Array(items) => Ok(items),
        _ => Err(DecodeError::NotASequence),
    }
}

/// Decode, treating any failure as an empty collection.
///
/// Corrupt state is "no state": the error is logged and never surfaced.
pub fn decode_or_empty(key: &str, raw: Option<&str>) -> Vec<Value> {
    match decode_collection(raw) {
        Ok(items) => items,
        Err(DecodeError::Absent) => Vec::new(),
        Err(e) => {
            tracing::debug!(key, error = %e, "discarding undecodable collection");
            Vec::new()
        }
    }
}

/// Read the elements stored under `key`. Storage read errors still propagate;
/// only decoding is fail-soft.
pub fn load_values(storage: &dyn Storage, key: &str) -> Result<Vec<Value>, StorageError> {
    let raw = storage.get_item(key)?;
    Ok(decode_or_empty(key, raw.as_deref()))
}

/// Result of a [`normalize`] pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub values: Vec<Value>,
    /// Whether any element was dropped or had its id assigned or rewritten.
    pub changed: bool,
}

/// The integer id of an element, if it has a usable one.
///
/// Missing, null, zero, and non-integer ids all count as absent.
pub fn value_id(value: &Value) -> Option<RecordId> {
    match value.get("id")? {
        Value::Number(n) => {
            let id = n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))?;
            (id != 0).then_some(id)
        }
        _ => None,
    }
}

/// Give every element a unique id.
///
/// Non-object elements are dropped. Elements with a usable id keep it;
/// the rest get `now_ms + position`, moved past any id already in use.
pub fn normalize(values: Vec<Value>, now_ms: i64) -> Normalized {
    let before = values.len();
    let mut objects: Vec<Value> = values.into_iter().filter(Value::is_object).collect();
    let mut changed = objects.len() != before;

    let mut used: HashSet<RecordId> = objects.iter().filter_map(value_id).collect();
    let mut seen: HashSet<RecordId> = HashSet::new();

    for (idx, obj) in objects.iter_mut().enumerate() {
        if let Some(id) = value_id(obj).filter(|id| seen.insert(*id)) {
            // Integral floats such as 12.0 are stored back as integers.
            if !obj["id"].is_i64() {
                obj["id"] = Value::from(id);
                changed = true;
            }
            continue;
        }
        let mut candidate = now_ms + idx as i64;
        while used.contains(&candidate) || candidate == 0 {
            candidate += 1;
        }
        used.insert(candidate);
        seen.insert(candidate);
        obj["id"] = Value::from(candidate);
        changed = true;
    }

    Normalized {
        values: objects,
        changed,
    }
}

/// Decode each element into `T`, dropping (and logging) the ones that
/// do not fit.
pub fn into_items<T: Stored>(values: Vec<Value>) -> Vec<T> {
    values
        .into_iter()
        .enumerate()
        .filter_map(|(idx, value)| match serde_json::from_value::<T>(value) {
            Ok(item) => Some(item),
            Err(e) => {
                tracing::warn!(key = T::KEY, index = idx, error = %e, "dropping malformed element");
                None
            }
        })
        .collect()
}

/// Typed snapshot from a raw stored value, with ids normalized in memory
/// for keyed collections.
pub fn decode_items<T: Stored>(raw: Option<&str>, now_ms: i64) -> Vec<T> {
    let values = decode_or_empty(T::KEY, raw);
    let values = if T::KEYED {
        normalize(values, now_ms).values
    } else {
        values
    };
    into_items(values)
}

/// Serialize a full collection.
pub fn encode_collection<T: Stored>(items: &[T]) -> Result<String, serde_json::Error> {
    serde_json::to_string(items)
}

/// Overwrite the stored value for `key` with `values`.
pub fn save_values(storage: &dyn Storage, key: &str, values: &[Value]) -> Result<(), StorageError> {
    let raw = Value::Array(values.to_vec()).to_string();
    storage.set_item(key, &raw)
}
