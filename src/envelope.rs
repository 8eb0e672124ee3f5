// ✉️ Field Envelopes - change-notification wrapper for every output field
//
// Downstream consumers apply change-data-capture semantics, so each scalar
// is published as {operation, newValue, oldValue}. This job recomputes the
// whole batch each run, which means every envelope is an INSERT and
// oldValue is always null.

use serde::{Deserialize, Deserializer, Serialize};

/// Kind of change carried by an envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Operation {
    Insert,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Insert => "INSERT",
        }
    }
}

/// FieldEnvelope - one field value plus its change metadata
///
/// The label a field is published under is the name of the struct field
/// holding the envelope, so the label travels with the schema instead of
/// with the value. oldValue is always null; deserialization rejects
/// anything else.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldEnvelope<T> {
    pub operation: Operation,
    pub new_value: T,
    pub old_value: Option<T>,
}

impl<T> FieldEnvelope<T> {
    /// Envelope for a freshly inserted value
    pub fn insert(value: T) -> Self {
        FieldEnvelope {
            operation: Operation::Insert,
            new_value: value,
            old_value: None,
        }
    }

    pub fn is_insert(&self) -> bool {
        self.operation == Operation::Insert && self.old_value.is_none()
    }
}

impl<'de, T> Deserialize<'de> for FieldEnvelope<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct RawEnvelope<V> {
            operation: Operation,
            new_value: V,
            old_value: Option<V>,
        }

        let raw = RawEnvelope::<T>::deserialize(deserializer)?;
        if raw.old_value.is_some() {
            return Err(serde::de::Error::custom(format!(
                "oldValue must be null for {} envelopes",
                raw.operation.as_str()
            )));
        }

        Ok(FieldEnvelope {
            operation: raw.operation,
            new_value: raw.new_value,
            old_value: None,
        })
    }
}

/// Wrap a value as an INSERT envelope
///
/// Absent values still get an envelope: `wrap(None::<String>)` publishes
/// `newValue: null`, it does not drop the field.
pub fn wrap<T>(value: T) -> FieldEnvelope<T> {
    FieldEnvelope::insert(value)
}

// ============================================================================
// TESTS
// ============================================================================
