//! Composite attribute codec.
//!
//! Composite attributes (tag lists, nested instructor/company objects) live
//! as a serialized JSON scalar in relational rows and as native values in
//! documents. Everywhere else they are a [`Composite`].
//!
//! Reads go through [`inflate`], which never fails: a malformed legacy value
//! becomes the empty default so one bad field cannot break a listing. Writes
//! go through [`try_inflate`], which reports the problem instead.

use serde_json::{Map, Value};

use crate::field::CompositeKind;

/// Domain form of a composite attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum Composite {
    Sequence(Vec<String>),
    Object(Map<String, Value>),
}

/// How the target backend persists composites.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageForm {
    /// Compact JSON text in a single column.
    Serialized,
    /// Native array/object.
    Native,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NormalizeError {
    #[error("expected {expected}, got {got}")]
    Shape {
        expected: CompositeKind,
        got: &'static str,
    },

    #[error("malformed serialized value: {0}")]
    Malformed(String),
}

impl Composite {
    #[must_use]
    pub fn empty(kind: CompositeKind) -> Self {
        match kind {
            CompositeKind::SequenceOfString => Composite::Sequence(Vec::new()),
            CompositeKind::StructuredObject => Composite::Object(Map::new()),
        }
    }

    #[must_use]
    pub fn kind(&self) -> CompositeKind {
        match self {
            Composite::Sequence(_) => CompositeKind::SequenceOfString,
            Composite::Object(_) => CompositeKind::StructuredObject,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Composite::Sequence(items) => items.is_empty(),
            Composite::Object(map) => map.is_empty(),
        }
    }

    #[must_use]
    pub fn into_value(self) -> Value {
        match self {
            Composite::Sequence(items) => Value::Array(items.into_iter().map(Value::String).collect()),
            Composite::Object(map) => Value::Object(map),
        }
    }
}

fn value_type(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn sequence_item(item: &Value) -> Result<String, NormalizeError> {
    match item {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(NormalizeError::Shape {
            expected: CompositeKind::SequenceOfString,
            got: value_type(other),
        }),
    }
}

fn from_native(value: &Value, kind: CompositeKind) -> Result<Composite, NormalizeError> {
    match (kind, value) {
        (CompositeKind::SequenceOfString, Value::Array(items)) => items
            .iter()
            .map(sequence_item)
            .collect::<Result<Vec<_>, _>>()
            .map(Composite::Sequence),
        (CompositeKind::StructuredObject, Value::Object(map)) => Ok(Composite::Object(map.clone())),
        (expected, other) => Err(NormalizeError::Shape {
            expected,
            got: value_type(other),
        }),
    }
}

/// Strict conversion to domain form.
///
/// Accepts the native value or its serialized text. `null` and blank text
/// are the empty default.
///
/// # Errors
/// `NormalizeError::Malformed` when text does not parse as JSON,
/// `NormalizeError::Shape` when the parsed value has the wrong shape.
pub fn try_inflate(value: &Value, kind: CompositeKind) -> Result<Composite, NormalizeError> {
    match value {
        Value::Null => Ok(Composite::empty(kind)),
        Value::String(text) => {
            if text.trim().is_empty() {
                return Ok(Composite::empty(kind));
            }
            let parsed: Value =
                serde_json::from_str(text).map_err(|e| NormalizeError::Malformed(e.to_string()))?;
            from_native(&parsed, kind)
        }
        native => from_native(native, kind),
    }
}

/// Lenient conversion used on every read. Absent or malformed values become
/// the empty default.
#[must_use]
pub fn inflate(value: Option<&Value>, kind: CompositeKind) -> Composite {
    let Some(value) = value else {
        return Composite::empty(kind);
    };
    match try_inflate(value, kind) {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!(error = %e, %kind, "composite field degraded to empty default");
            Composite::empty(kind)
        }
    }
}

/// Storage form for the target backend.
#[must_use]
pub fn deflate(value: &Composite, form: StorageForm) -> Value {
    let native = value.clone().into_value();
    match form {
        StorageForm::Native => native,
        StorageForm::Serialized => Value::String(native.to_string()),
    }
}
