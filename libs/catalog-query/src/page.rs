//! Result envelope shared by both backends.
//!
//! Backend adapters hand over a [`RawPage`] (storage rows plus the total
//! they counted with the same predicate); [`paginate`] turns it into the
//! wire envelope without knowing which backend produced it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::field::FieldKind;
use crate::filter::ListingFilter;
use crate::normalize::inflate;
use crate::schema::ListingSchema;

/// One listing record in domain form, keyed by API field names.
pub type Record = Map<String, Value>;

/// What a backend adapter returns for one listing query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawPage {
    /// Storage rows keyed by column name.
    pub rows: Vec<Map<String, Value>>,
    pub total: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    #[serde(rename = "totalPages")]
    pub total_pages: u64,
}

impl PageInfo {
    #[must_use]
    pub fn new(total: u64, page: u64, limit: u64) -> Self {
        Self {
            total,
            page,
            limit,
            total_pages: total_pages(total, limit),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub pagination: PageInfo,
}

/// `ceil(total / limit)`, 0 when `limit` is 0.
#[must_use]
pub fn total_pages(total: u64, limit: u64) -> u64 {
    if limit == 0 {
        return 0;
    }
    total.div_ceil(limit)
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => matches!(s.trim(), "true" | "1"),
        Value::Null | Value::Array(_) | Value::Object(_) => false,
    }
}

fn numeric(value: &Value, kind: FieldKind) -> Value {
    match value {
        Value::String(s) => {
            let s = s.trim();
            let parsed = if kind == FieldKind::I64 {
                s.parse::<i64>().ok().map(Value::from)
            } else {
                s.parse::<f64>().ok().map(Value::from)
            };
            parsed.unwrap_or(Value::Null)
        }
        other => other.clone(),
    }
}

/// Map a storage row to a domain record.
///
/// Only declared fields survive; composites are inflated, integer booleans
/// become real booleans, internal columns are dropped.
#[must_use]
pub fn record_from_row(row: &Map<String, Value>, schema: &ListingSchema) -> Record {
    let mut record = Record::new();
    for field in schema.fields {
        let stored = row.get(field.column);
        let value = match field.kind {
            FieldKind::Composite(kind) => inflate(stored, kind).into_value(),
            FieldKind::Bool => Value::Bool(stored.is_some_and(truthy)),
            FieldKind::I64 | FieldKind::F64 => stored.map_or(Value::Null, |v| numeric(v, field.kind)),
            FieldKind::String | FieldKind::DateTimeUtc => stored.cloned().unwrap_or(Value::Null),
        };
        record.insert(field.name.to_owned(), value);
    }
    record
}

/// Assemble the envelope for one executed listing query.
#[must_use]
pub fn paginate(raw: RawPage, filter: &ListingFilter) -> Page<Record> {
    let schema = filter.schema();
    let limit = filter.limit();
    let take = usize::try_from(limit).unwrap_or(usize::MAX);
    let data = raw
        .rows
        .iter()
        .take(take)
        .map(|row| record_from_row(row, schema))
        .collect();
    Page {
        data,
        pagination: PageInfo::new(raw.total, filter.page(), limit),
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::kind::ListingKind;
    use serde_json::json;

    fn row(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn total_pages_is_ceiling_division() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(1, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(25, 10), 3);
        assert_eq!(total_pages(25, 0), 0);
        for total in 0..60_u64 {
            for limit in 1..12_u64 {
                let pages = total_pages(total, limit);
                assert!(pages * limit >= total);
                assert!(pages == 0 || (pages - 1) * limit < total);
            }
        }
    }

    #[test]
    fn relational_row_becomes_domain_record() {
        let schema = ListingKind::Courses.schema();
        let stored = row(json!({
            "id": "c1",
            "title": "Rust",
            "is_free": 1,
            "price": 0.0,
            "enrollments": "42",
            "tags": "[\"rust\",\"systems\"]",
            "instructor": "{\"name\":\"Ada\"}",
            "learning_outcomes": "legacy;semicolon;list",
            "__total": 3
        }));
        let record = record_from_row(&stored, schema);
        assert_eq!(record["isFree"], json!(true));
        assert_eq!(record["enrollments"], json!(42));
        assert_eq!(record["tags"], json!(["rust", "systems"]));
        assert_eq!(record["instructor"], json!({"name": "Ada"}));
        assert_eq!(record["learningOutcomes"], json!([]));
        assert_eq!(record["requirements"], json!([]));
        assert_eq!(record["description"], Value::Null);
        assert!(!record.contains_key("__total"));
        assert!(!record.contains_key("is_free"));
    }

    #[test]
    fn document_row_keeps_native_composites() {
        let schema = ListingKind::Resources.schema();
        let stored = row(json!({
            "id": "r1",
            "topics": ["ml", "stats"],
            "author": {"name": "Grace"},
            "is_free": true
        }));
        let record = record_from_row(&stored, schema);
        assert_eq!(record["topics"], json!(["ml", "stats"]));
        assert_eq!(record["author"], json!({"name": "Grace"}));
        assert_eq!(record["isFree"], json!(true));
    }
}
