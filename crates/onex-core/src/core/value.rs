// crates/onex-core/src/core/value.rs
// ============================================================================
// Module: Onex Schema Values
// Description: Recursive JSON-shaped value union for contract fields and guard facts.
// Purpose: Provide a closed, serializable value type with lossless JSON conversion.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Schema values are the typed payloads carried by contract documents and
//! guard contexts. The union is a recursive sum type over the JSON value
//! space, so illegal states (for example a value that is simultaneously a
//! string and a number) are unrepresentable.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Number;
use serde_json::Value;

// ============================================================================
// SECTION: Schema Numbers
// ============================================================================

/// Numeric payload distinguishing integers from floats.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum SchemaNumber {
    /// Signed 64-bit integer value.
    Int(i64),
    /// IEEE-754 double value.
    Float(f64),
}

impl SchemaNumber {
    /// Returns the number widened to a float for ordering comparisons.
    #[must_use]
    pub const fn as_f64(&self) -> f64 {
        match self {
            #[allow(clippy::cast_precision_loss, reason = "Widening is explicit and comparison-only.")]
            Self::Int(value) => *value as f64,
            Self::Float(value) => *value,
        }
    }
}

// ============================================================================
// SECTION: Schema Values
// ============================================================================

/// Recursive value union over the JSON value space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum SchemaValue {
    /// Explicit null value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Numeric value.
    Number(SchemaNumber),
    /// String value.
    String(String),
    /// Ordered array of values.
    Array(Vec<SchemaValue>),
    /// Object with deterministically ordered keys.
    Object(BTreeMap<String, SchemaValue>),
}

impl SchemaValue {
    /// Returns true when the value is null.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the numeric payload when the value is a number.
    #[must_use]
    pub const fn as_number(&self) -> Option<SchemaNumber> {
        match self {
            Self::Number(number) => Some(*number),
            _ => None,
        }
    }

    /// Converts a JSON value into a schema value.
    ///
    /// Integer-representable numbers map to [`SchemaNumber::Int`]; all other
    /// numbers map to [`SchemaNumber::Float`].
    #[must_use]
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(flag) => Self::Bool(flag),
            Value::Number(number) => Self::Number(number_from_json(&number)),
            Value::String(text) => Self::String(text),
            Value::Array(elements) => {
                Self::Array(elements.into_iter().map(Self::from_json).collect())
            }
            Value::Object(members) => Self::Object(
                members.into_iter().map(|(key, member)| (key, Self::from_json(member))).collect(),
            ),
        }
    }

    /// Converts the schema value back into a JSON value.
    ///
    /// Non-finite floats have no JSON representation and convert to null,
    /// matching serde_json semantics.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Bool(flag) => Value::Bool(*flag),
            Self::Number(number) => number_to_json(*number),
            Self::String(text) => Value::String(text.clone()),
            Self::Array(elements) => {
                Value::Array(elements.iter().map(Self::to_json).collect())
            }
            Self::Object(members) => {
                let mut map = Map::new();
                for (key, member) in members {
                    map.insert(key.clone(), member.to_json());
                }
                Value::Object(map)
            }
        }
    }
}

impl From<Value> for SchemaValue {
    fn from(value: Value) -> Self {
        Self::from_json(value)
    }
}

// ============================================================================
// SECTION: Conversion Helpers
// ============================================================================

/// Converts a JSON number into a schema number.
fn number_from_json(number: &Number) -> SchemaNumber {
    number.as_i64().map_or_else(
        || SchemaNumber::Float(number.as_f64().unwrap_or(f64::NAN)),
        SchemaNumber::Int,
    )
}

/// Converts a schema number into a JSON value.
fn number_to_json(number: SchemaNumber) -> Value {
    match number {
        SchemaNumber::Int(value) => Value::Number(Number::from(value)),
        SchemaNumber::Float(value) => {
            Number::from_f64(value).map_or(Value::Null, Value::Number)
        }
    }
}
