use serde::Serialize;
use serde::de::DeserializeOwned;

/// Identifier of a record, unique within its collection.
///
/// New ids are epoch-millisecond derived, so they grow monotonically.
pub type RecordId = i64;

/// A value persisted as one element of a named collection.
pub trait Stored: Serialize + DeserializeOwned + Clone + Send + 'static {
    /// Storage key of the collection this type lives in.
    const KEY: &'static str;

    /// Elements are addressed by `id`; load-time normalization assigns one
    /// to any element that lacks it.
    const KEYED: bool = false;

    /// Contents used for an absent key when seeding is enabled.
    fn seed() -> Vec<Self> {
        Vec::new()
    }
}

/// A domain entity with an identity and a fixed set of string fields.
pub trait Record: Stored {
    /// Singular noun used in activity messages and notices ("project").
    const KIND: &'static str;

    fn id(&self) -> RecordId;

    fn set_id(&mut self, id: RecordId);

    /// Title, name, or role.
    fn label(&self) -> &str;

    /// Fields matched by search, in display order.
    fn search_fields(&self) -> Vec<&str>;

    /// Check required fields before any write is attempted.
    fn validate(&self) -> Result<(), ValidationError>;
}

/// A required form field was left empty.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("please fill in all required fields ({kind} {field} is empty)")]
pub struct ValidationError {
    pub kind: &'static str,
    pub field: &'static str,
}

/// Fail with a [`ValidationError`] when `value` is blank.
pub(crate) fn require(
    kind: &'static str,
    field: &'static str,
    value: &str,
) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError { kind, field })
    } else {
        Ok(())
    }
}

/// "project" -> "Project"
pub fn capitalized(kind: &str) -> String {
    let mut chars = kind.chars();
    match chars.next() {
        None => String::new(),
        Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
    }
}
