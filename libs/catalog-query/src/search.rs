//! Free-text search material.
//!
//! Each stored row carries [`SEARCH_COLUMN`]: the string values of the
//! schema's search columns, case-folded and joined. Composites contribute
//! their element and nested string values, never their keys or JSON
//! punctuation. Both backends match a folded needle against this column as a
//! plain substring, so case folding is the same Unicode-aware
//! [`str::to_lowercase`] everywhere.

use serde_json::{Map, Value};

use crate::field::FieldKind;
use crate::normalize::{Composite, inflate};
use crate::schema::ListingSchema;

/// Internal column holding the folded search text. Never part of a record.
pub const SEARCH_COLUMN: &str = "search_text";

/// Keeps a needle from matching across two values.
const SEPARATOR: char = '\u{1f}';

/// Case folding applied to both stored text and needles.
#[must_use]
pub fn fold(text: &str) -> String {
    text.to_lowercase()
}

fn collect_strings(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(s) => out.push(s.clone()),
        Value::Array(items) => items.iter().for_each(|v| collect_strings(v, out)),
        Value::Object(map) => map.values().for_each(|v| collect_strings(v, out)),
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}

/// Folded search text for one storage row, in either storage form.
#[must_use]
pub fn search_text(schema: &ListingSchema, row: &Map<String, Value>) -> String {
    let mut parts = Vec::new();
    for column in schema.search {
        let Some(field) = schema.field_by_column(column) else {
            continue;
        };
        let stored = row.get(field.column);
        match field.kind {
            FieldKind::Composite(kind) => match inflate(stored, kind) {
                Composite::Sequence(items) => parts.extend(items),
                Composite::Object(map) => map.values().for_each(|v| collect_strings(v, &mut parts)),
            },
            _ => {
                if let Some(Value::String(s)) = stored {
                    parts.push(s.clone());
                }
            }
        }
    }
    let mut joined = String::new();
    for part in parts.iter().filter(|p| !p.is_empty()) {
        if !joined.is_empty() {
            joined.push(SEPARATOR);
        }
        joined.push_str(&fold(part));
    }
    joined
}

/// Whether a write to `row` changes the search text.
#[must_use]
pub fn touches_search(schema: &ListingSchema, row: &Map<String, Value>) -> bool {
    schema.search.iter().any(|column| row.contains_key(*column))
}
