//! Process-local [`DocumentStore`].
//!
//! Backs the `memory` engine and the test suites. Filters are compiled once
//! per call into a [`Matcher`] tree and evaluated against every document of
//! the collection; ordering follows the usual cross-type rule (missing and
//! null first, then numbers, strings, objects, arrays, booleans).

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use catalog_query::SortDir;
use parking_lot::RwLock;
use regex::{Regex, RegexBuilder};
use serde_json::Value;

use super::store::{Document, DocumentStore, DocumentStoreError, FindOptions};

/// Same cap the common document databases enforce.
pub const DEFAULT_MAX_DOCUMENT_BYTES: usize = 16 * 1024 * 1024;

#[derive(Debug, Default)]
struct Collection {
    docs: Vec<Document>,
    unique: BTreeSet<String>,
}

impl Collection {
    fn check_unique(&self, doc: &Document, skip: Option<usize>) -> Result<(), DocumentStoreError> {
        for field in &self.unique {
            let Some(value) = doc.get(field).filter(|v| !v.is_null()) else {
                continue;
            };
            let clash = self
                .docs
                .iter()
                .enumerate()
                .any(|(i, other)| Some(i) != skip && other.get(field) == Some(value));
            if clash {
                return Err(DocumentStoreError::DuplicateKey { field: field.clone() });
            }
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct InMemoryDocumentStore {
    collections: RwLock<HashMap<String, Collection>>,
    max_document_bytes: usize,
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryDocumentStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
            max_document_bytes: DEFAULT_MAX_DOCUMENT_BYTES,
        }
    }

    #[must_use]
    pub fn with_max_document_bytes(mut self, max: usize) -> Self {
        self.max_document_bytes = max;
        self
    }

    fn check_size(&self, doc: &Document) -> Result<(), DocumentStoreError> {
        let size = serde_json::to_vec(doc)
            .map_err(|e| DocumentStoreError::Backend(e.to_string()))?
            .len();
        if size > self.max_document_bytes {
            return Err(DocumentStoreError::DocumentTooLarge {
                size,
                max: self.max_document_bytes,
            });
        }
        Ok(())
    }
}

#[derive(Debug)]
enum FieldOp {
    Eq(Value),
    Ne(Value),
    In(Vec<Value>),
    Regex(Regex),
}

#[derive(Debug)]
enum Matcher {
    All(Vec<Matcher>),
    Any(Vec<Matcher>),
    Field { path: String, ops: Vec<FieldOp> },
}

fn invalid(msg: impl Into<String>) -> DocumentStoreError {
    DocumentStoreError::InvalidFilter(msg.into())
}

fn compile_regex(pattern: &Value, options: Option<&Value>) -> Result<Regex, DocumentStoreError> {
    let pattern = pattern.as_str().ok_or_else(|| invalid("$regex expects a string"))?;
    let options = options.and_then(Value::as_str).unwrap_or_default();
    RegexBuilder::new(pattern)
        .case_insensitive(options.contains('i'))
        .build()
        .map_err(|e| invalid(e.to_string()))
}

fn compile_ops(cond: &Value) -> Result<Vec<FieldOp>, DocumentStoreError> {
    let operators = match cond {
        Value::Object(map) if !map.is_empty() && map.keys().all(|k| k.starts_with('$')) => map,
        literal => return Ok(vec![FieldOp::Eq(literal.clone())]),
    };
    let mut ops = Vec::with_capacity(operators.len());
    for (op, arg) in operators {
        match op.as_str() {
            "$eq" => ops.push(FieldOp::Eq(arg.clone())),
            "$ne" => ops.push(FieldOp::Ne(arg.clone())),
            "$in" => {
                let values = arg.as_array().ok_or_else(|| invalid("$in expects an array"))?;
                ops.push(FieldOp::In(values.clone()));
            }
            "$regex" => ops.push(FieldOp::Regex(compile_regex(arg, operators.get("$options"))?)),
            "$options" => {}
            other => return Err(invalid(format!("unsupported operator {other}"))),
        }
    }
    Ok(ops)
}

impl Matcher {
    fn compile(filter: &Value) -> Result<Self, DocumentStoreError> {
        let map = filter.as_object().ok_or_else(|| invalid("filter must be an object"))?;
        let mut parts = Vec::with_capacity(map.len());
        for (key, cond) in map {
            match key.as_str() {
                "$and" => parts.push(Matcher::All(Self::compile_list(cond)?)),
                "$or" => parts.push(Matcher::Any(Self::compile_list(cond)?)),
                op if op.starts_with('$') => return Err(invalid(format!("unsupported operator {op}"))),
                path => parts.push(Matcher::Field {
                    path: path.to_owned(),
                    ops: compile_ops(cond)?,
                }),
            }
        }
        Ok(Matcher::All(parts))
    }

    fn compile_list(list: &Value) -> Result<Vec<Matcher>, DocumentStoreError> {
        list.as_array()
            .ok_or_else(|| invalid("$and/$or expect an array"))?
            .iter()
            .map(Self::compile)
            .collect()
    }

    fn matches(&self, doc: &Document) -> bool {
        match self {
            Matcher::All(parts) => parts.iter().all(|m| m.matches(doc)),
            Matcher::Any(parts) => parts.iter().any(|m| m.matches(doc)),
            Matcher::Field { path, ops } => {
                let actual = lookup(doc, path);
                ops.iter().all(|op| op.matches(actual))
            }
        }
    }
}

impl FieldOp {
    fn matches(&self, actual: Option<&Value>) -> bool {
        match self {
            FieldOp::Eq(expected) => value_eq(actual, expected),
            FieldOp::Ne(expected) => !value_eq(actual, expected),
            FieldOp::In(candidates) => candidates.iter().any(|c| value_eq(actual, c)),
            FieldOp::Regex(re) => actual.is_some_and(|v| regex_hits(re, v)),
        }
    }
}

fn lookup<'a>(doc: &'a Document, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = doc.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

fn same(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x.total_cmp(&y) == Ordering::Equal,
            _ => x == y,
        },
        _ => a == b,
    }
}

/// Equality with array-membership semantics: an array field equals a
/// scalar when any element does.
fn value_eq(actual: Option<&Value>, expected: &Value) -> bool {
    match actual {
        None => expected.is_null(),
        Some(Value::Array(items)) if !expected.is_array() => items.iter().any(|item| same(item, expected)),
        Some(value) => same(value, expected),
    }
}

/// Regexes see strings, array elements and nested object strings.
fn regex_hits(re: &Regex, value: &Value) -> bool {
    match value {
        Value::String(s) => re.is_match(s),
        Value::Array(items) => items.iter().any(|v| regex_hits(re, v)),
        Value::Object(map) => map.values().any(|v| regex_hits(re, v)),
        Value::Null | Value::Bool(_) | Value::Number(_) => false,
    }
}

fn type_rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Number(_)) => 1,
        Some(Value::String(_)) => 2,
        Some(Value::Object(_)) => 3,
        Some(Value::Array(_)) => 4,
        Some(Value::Bool(_)) => 5,
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            x.as_f64().unwrap_or_default().total_cmp(&y.as_f64().unwrap_or_default())
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(x @ (Value::Object(_) | Value::Array(_))), Some(y)) if type_rank(Some(x)) == type_rank(Some(y)) => {
            x.to_string().cmp(&y.to_string())
        }
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

fn compare_docs(a: &Document, b: &Document, sort: &[(String, SortDir)]) -> Ordering {
    for (path, dir) in sort {
        let ord = compare_values(lookup(a, path), lookup(b, path));
        let ord = match dir {
            SortDir::Asc => ord,
            SortDir::Desc => ord.reverse(),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

fn to_usize(n: u64) -> usize {
    usize::try_from(n).unwrap_or(usize::MAX)
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn find(
        &self,
        collection: &str,
        filter: &Value,
        options: &FindOptions,
    ) -> Result<Vec<Document>, DocumentStoreError> {
        let matcher = Matcher::compile(filter)?;
        let guard = self.collections.read();
        let Some(coll) = guard.get(collection) else {
            return Ok(Vec::new());
        };
        let mut hits: Vec<&Document> = coll.docs.iter().filter(|d| matcher.matches(d)).collect();
        if !options.sort.is_empty() {
            hits.sort_by(|a, b| compare_docs(a, b, &options.sort));
        }
        let take = options.limit.map_or(usize::MAX, to_usize);
        Ok(hits
            .into_iter()
            .skip(to_usize(options.skip))
            .take(take)
            .cloned()
            .collect())
    }

    async fn count(&self, collection: &str, filter: &Value) -> Result<u64, DocumentStoreError> {
        let matcher = Matcher::compile(filter)?;
        let guard = self.collections.read();
        let n = guard
            .get(collection)
            .map_or(0, |coll| coll.docs.iter().filter(|d| matcher.matches(d)).count());
        Ok(u64::try_from(n).unwrap_or(u64::MAX))
    }

    async fn find_one(&self, collection: &str, filter: &Value) -> Result<Option<Document>, DocumentStoreError> {
        let matcher = Matcher::compile(filter)?;
        let guard = self.collections.read();
        Ok(guard
            .get(collection)
            .and_then(|coll| coll.docs.iter().find(|d| matcher.matches(d)))
            .cloned())
    }

    async fn insert_one(&self, collection: &str, document: Document) -> Result<(), DocumentStoreError> {
        self.check_size(&document)?;
        let mut guard = self.collections.write();
        let coll = guard.entry(collection.to_owned()).or_default();
        coll.check_unique(&document, None)?;
        coll.docs.push(document);
        Ok(())
    }

    async fn update_one(&self, collection: &str, filter: &Value, set: Document) -> Result<u64, DocumentStoreError> {
        let matcher = Matcher::compile(filter)?;
        let mut guard = self.collections.write();
        let Some(coll) = guard.get_mut(collection) else {
            return Ok(0);
        };
        let Some(pos) = coll.docs.iter().position(|d| matcher.matches(d)) else {
            return Ok(0);
        };
        let mut merged = coll.docs[pos].clone();
        merged.extend(set);
        self.check_size(&merged)?;
        coll.check_unique(&merged, Some(pos))?;
        coll.docs[pos] = merged;
        Ok(1)
    }

    async fn ensure_unique_index(&self, collection: &str, field: &str) -> Result<(), DocumentStoreError> {
        let mut guard = self.collections.write();
        let coll = guard.entry(collection.to_owned()).or_default();
        if coll.unique.contains(field) {
            return Ok(());
        }
        let mut seen = Vec::new();
        for value in coll.docs.iter().filter_map(|d| d.get(field)).filter(|v| !v.is_null()) {
            if seen.contains(&value) {
                return Err(DocumentStoreError::DuplicateKey { field: field.to_owned() });
            }
            seen.push(value);
        }
        coll.unique.insert(field.to_owned());
        Ok(())
    }
}
