//! Admin payload → storage row.
//!
//! Steps run in order and any failure aborts before the backend is touched:
//! 0. shape and required-field checks, inline asset decoded
//! 1. composites parsed (structured or serialized input) and deflated to the
//!    target backend's storage form
//! 2. scalars coerced to their storage type, zero/false defaults on create
//! 3. slug derived on create; a blank slug is rejected
//! 4. system fields stamped
//! 5. inline asset uploaded, URL substituted
//!
//! The upload is the only step with an outside effect and always runs last.
//!
//! Only declared writable fields reach the row; anything else in the payload
//! is ignored.

use catalog_query::{
    Composite, FieldDef, FieldKind, ListingSchema, PUBLIC_VISIBILITY, StorageForm, deflate, try_inflate,
};
use serde_json::{Map, Value};

use super::error::DomainError;
use super::media::{InlineAsset, MediaUploader, parse_data_uri};
use super::repo::Row;

const SLUG_FIELD: &str = "slug";
const TITLE_FIELD: &str = "title";
const VISIBILITY_FIELD: &str = "visibility";
const ALLOWED_VISIBILITY: &[&str] = &[PUBLIC_VISIBILITY, "draft"];
const SLUG_MAX_CHARS: usize = 200;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteMode {
    Create,
    Update,
}

pub struct UpsertPipeline<'a> {
    pub schema: &'static ListingSchema,
    pub form: StorageForm,
    pub uploader: &'a dyn MediaUploader,
}

impl UpsertPipeline<'_> {
    /// # Errors
    /// `Validation`, `OversizedField` or `UpstreamAsset` as described in the
    /// module docs.
    pub async fn prepare(&self, payload: Value, mode: WriteMode, now: &str) -> Result<Row, DomainError> {
        let Value::Object(mut payload) = payload else {
            return Err(DomainError::validation("payload", "expected a JSON object"));
        };
        self.check_shape(&payload, mode)?;

        let mut pending = None;
        if let Some(asset_field) = self.schema.asset_field
            && let Some(Value::String(raw)) = payload.get(asset_field)
            && let Some(asset) = parse_data_uri(asset_field, raw)?
        {
            payload.remove(asset_field);
            pending = Some((asset_field, asset));
        }

        let mut row = Row::new();
        for field in self.schema.writable_fields() {
            match payload.get(field.name) {
                Some(value) => {
                    row.insert(field.column.to_owned(), coerce(field, value, self.form)?);
                }
                None if mode == WriteMode::Create => {
                    if let Some(default) = default_value(field, self.form) {
                        row.insert(field.column.to_owned(), default);
                    }
                }
                None => {}
            }
        }

        if mode == WriteMode::Create {
            self.fill_create_defaults(&mut row);
            row.insert("id".to_owned(), Value::String(uuid::Uuid::new_v4().to_string()));
            row.insert("created_at".to_owned(), Value::String(now.to_owned()));
        }
        if row.get(SLUG_FIELD).is_some_and(is_blank) {
            return Err(DomainError::validation(
                SLUG_FIELD,
                "needs at least one letter or digit, from the slug or the title",
            ));
        }
        row.insert("updated_at".to_owned(), Value::String(now.to_owned()));

        if let Some((asset_field, asset)) = pending {
            self.upload_asset(&mut row, asset_field, asset).await?;
        }
        Ok(row)
    }

    async fn upload_asset(&self, row: &mut Row, asset_field: &str, asset: InlineAsset) -> Result<(), DomainError> {
        let Some(field) = self.schema.field(asset_field) else {
            return Ok(());
        };
        let bytes = asset.bytes.len();
        let url = self.uploader.upload(self.schema.collection, asset).await?;
        tracing::info!(collection = self.schema.collection, bytes, %url, "inline asset uploaded");
        row.insert(field.column.to_owned(), coerce(field, &Value::String(url), self.form)?);
        Ok(())
    }

    fn check_shape(&self, payload: &Map<String, Value>, mode: WriteMode) -> Result<(), DomainError> {
        for key in payload.keys() {
            if !self.schema.field(key).is_some_and(FieldDef::is_writable) {
                tracing::debug!(collection = self.schema.collection, key, "ignoring non-writable payload key");
            }
        }
        for field in self.schema.writable_fields().filter(|f| f.required) {
            match payload.get(field.name) {
                Some(v) if is_blank(v) => return Err(DomainError::validation(field.name, "must not be empty")),
                None if mode == WriteMode::Create => {
                    return Err(DomainError::validation(field.name, "is required"));
                }
                _ => {}
            }
        }
        if let Some(v) = payload.get(VISIBILITY_FIELD)
            && !v.as_str().is_some_and(|s| ALLOWED_VISIBILITY.contains(&s))
        {
            return Err(DomainError::validation(
                VISIBILITY_FIELD,
                format!("must be one of {}", ALLOWED_VISIBILITY.join(", ")),
            ));
        }
        Ok(())
    }

    fn fill_create_defaults(&self, row: &mut Row) {
        let slug_missing = row.get(SLUG_FIELD).is_none_or(is_blank);
        if slug_missing
            && self.schema.field(SLUG_FIELD).is_some()
            && let Some(Value::String(title)) = row.get(TITLE_FIELD)
        {
            let slug = slugify(title);
            row.insert(SLUG_FIELD.to_owned(), Value::String(slug));
        }
        if row.get(VISIBILITY_FIELD).is_none_or(Value::is_null) {
            row.insert(VISIBILITY_FIELD.to_owned(), Value::String(PUBLIC_VISIBILITY.to_owned()));
        }
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Lowercase alphanumerics joined by single dashes.
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_dash = false;
    for c in text.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }
    out.chars().take(SLUG_MAX_CHARS).collect()
}

fn default_value(field: &FieldDef, form: StorageForm) -> Option<Value> {
    match field.kind {
        FieldKind::I64 => Some(Value::from(0_i64)),
        FieldKind::F64 => Some(Value::from(0.0_f64)),
        FieldKind::Bool => Some(Value::Bool(false)),
        FieldKind::Composite(kind) => Some(deflate(&Composite::empty(kind), form)),
        FieldKind::String | FieldKind::DateTimeUtc => None,
    }
}

fn coerce(field: &FieldDef, value: &Value, form: StorageForm) -> Result<Value, DomainError> {
    match field.kind {
        FieldKind::String | FieldKind::DateTimeUtc => coerce_text(field, value),
        FieldKind::I64 => coerce_i64(field, value),
        FieldKind::F64 => coerce_f64(field, value),
        FieldKind::Bool => coerce_bool(field, value),
        FieldKind::Composite(kind) => {
            let composite = try_inflate(value, kind).map_err(|e| DomainError::validation(field.name, e.to_string()))?;
            Ok(deflate(&composite, form))
        }
    }
}

fn coerce_text(field: &FieldDef, value: &Value) -> Result<Value, DomainError> {
    let text = match value {
        Value::Null => return Ok(Value::Null),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(_) | Value::Object(_) => return Err(DomainError::validation(field.name, "expected a string")),
    };
    if let Some(max) = field.max_len {
        let len = text.chars().count();
        if len > max {
            return Err(DomainError::oversized(
                field.name,
                format!("'{}' has {len} characters, the limit is {max}", field.name),
            ));
        }
    }
    Ok(Value::String(text))
}

fn coerce_i64(field: &FieldDef, value: &Value) -> Result<Value, DomainError> {
    let parsed = match value {
        Value::Null => Some(0),
        Value::Number(n) => n.as_i64(),
        Value::String(s) if s.trim().is_empty() => Some(0),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        Value::Bool(_) | Value::Array(_) | Value::Object(_) => None,
    };
    parsed
        .map(Value::from)
        .ok_or_else(|| DomainError::validation(field.name, "expected an integer"))
}

fn coerce_f64(field: &FieldDef, value: &Value) -> Result<Value, DomainError> {
    let parsed = match value {
        Value::Null => Some(0.0),
        Value::Number(n) => n.as_f64(),
        Value::String(s) if s.trim().is_empty() => Some(0.0),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        Value::Bool(_) | Value::Array(_) | Value::Object(_) => None,
    };
    parsed
        .map(Value::from)
        .ok_or_else(|| DomainError::validation(field.name, "expected a number"))
}

fn coerce_bool(field: &FieldDef, value: &Value) -> Result<Value, DomainError> {
    let parsed = match value {
        Value::Null => Some(false),
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_i64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Some(true),
            "false" | "0" | "" => Some(false),
            _ => None,
        },
        Value::Array(_) | Value::Object(_) => None,
    };
    parsed
        .map(Value::Bool)
        .ok_or_else(|| DomainError::validation(field.name, "expected a boolean"))
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::domain::media::UploadError;
    use async_trait::async_trait;
    use catalog_query::ListingKind;
    use serde_json::json;
    use std::sync::Mutex;

    const NOW: &str = "2025-03-01T10:00:00.000Z";

    #[derive(Default)]
    struct RecordingUploader {
        calls: Mutex<Vec<(String, InlineAsset)>>,
        fail: bool,
    }

    #[async_trait]
    impl MediaUploader for RecordingUploader {
        async fn upload(&self, folder: &str, asset: InlineAsset) -> Result<String, UploadError> {
            if self.fail {
                return Err(UploadError::Rejected {
                    status: 502,
                    message: "bucket offline".to_owned(),
                });
            }
            let ext = asset.extension().to_owned();
            self.calls.lock().unwrap().push((folder.to_owned(), asset));
            Ok(format!("/media/{folder}/img.{ext}"))
        }
    }

    fn pipeline(kind: ListingKind, form: StorageForm, uploader: &RecordingUploader) -> UpsertPipeline<'_> {
        UpsertPipeline {
            schema: kind.schema(),
            form,
            uploader,
        }
    }

    #[tokio::test]
    async fn create_fills_defaults_and_system_fields() {
        let up = RecordingUploader::default();
        let row = pipeline(ListingKind::Courses, StorageForm::Serialized, &up)
            .prepare(
                json!({"title": "Intro to Rust!", "platform": "Udemy", "price": "19.99", "isFree": "0"}),
                WriteMode::Create,
                NOW,
            )
            .await
            .unwrap();

        assert_eq!(row["slug"], "intro-to-rust");
        assert_eq!(row["visibility"], "public");
        assert_eq!(row["price"], json!(19.99));
        assert_eq!(row["is_free"], json!(false));
        assert_eq!(row["enrollments"], json!(0));
        assert_eq!(row["tags"], json!("[]"));
        assert_eq!(row["instructor"], json!("{}"));
        assert_eq!(row["created_at"], NOW);
        assert_eq!(row["updated_at"], NOW);
        assert_eq!(row["id"].as_str().map(str::len), Some(36));
        assert!(!row.contains_key("description"));
    }

    #[tokio::test]
    async fn composites_accept_both_input_forms() {
        let up = RecordingUploader::default();
        let payload = json!({
            "title": "Backend Engineer",
            "type": "Full-time",
            "tags": "[\"rust\",\"sql\"]",
            "company": {"name": "Acme"}
        });
        let native = pipeline(ListingKind::Jobs, StorageForm::Native, &up)
            .prepare(payload.clone(), WriteMode::Create, NOW)
            .await
            .unwrap();
        assert_eq!(native["tags"], json!(["rust", "sql"]));
        assert_eq!(native["company"], json!({"name": "Acme"}));

        let serialized = pipeline(ListingKind::Jobs, StorageForm::Serialized, &up)
            .prepare(payload, WriteMode::Create, NOW)
            .await
            .unwrap();
        assert_eq!(serialized["tags"], json!(r#"["rust","sql"]"#));
        assert_eq!(serialized["company"], json!(r#"{"name":"Acme"}"#));
    }

    #[tokio::test]
    async fn update_writes_only_present_fields() {
        let up = RecordingUploader::default();
        let row = pipeline(ListingKind::Courses, StorageForm::Serialized, &up)
            .prepare(json!({"rating": 4, "createdAt": "1999-01-01", "id": "forged", "bogus": 1}), WriteMode::Update, NOW)
            .await
            .unwrap();
        let mut keys: Vec<_> = row.keys().cloned().collect();
        keys.sort();
        assert_eq!(keys, ["rating", "updated_at"]);
        assert_eq!(row["rating"], json!(4.0));
    }

    #[tokio::test]
    async fn validation_failures() {
        let up = RecordingUploader::default();
        let p = pipeline(ListingKind::Courses, StorageForm::Serialized, &up);

        let cases = [
            (json!([1, 2]), "payload"),
            (json!({"platform": "Udemy"}), "title"),
            (json!({"title": "  ", "platform": "Udemy"}), "title"),
            (json!({"title": "T", "platform": "Udemy", "enrollments": "many"}), "enrollments"),
            (json!({"title": "T", "platform": "Udemy", "isFree": "maybe"}), "isFree"),
            (json!({"title": "T", "platform": "Udemy", "tags": "{not json"}), "tags"),
            (json!({"title": "T", "platform": "Udemy", "instructor": ["x"]}), "instructor"),
            (json!({"title": "T", "platform": "Udemy", "visibility": "secret"}), "visibility"),
        ];
        for (payload, expected) in cases {
            let err = p.prepare(payload.clone(), WriteMode::Create, NOW).await.unwrap_err();
            assert!(
                matches!(err, DomainError::Validation { ref field, .. } if field == expected),
                "{payload} -> {err:?}"
            );
        }
    }

    #[tokio::test]
    async fn oversized_strings_are_distinct_from_validation() {
        let up = RecordingUploader::default();
        let err = pipeline(ListingKind::Courses, StorageForm::Serialized, &up)
            .prepare(json!({"title": "x".repeat(201), "platform": "Udemy"}), WriteMode::Create, NOW)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::OversizedField { field: Some(ref f), .. } if f == "title"));
    }

    #[tokio::test]
    async fn inline_image_is_uploaded_and_replaced() {
        let up = RecordingUploader::default();
        let row = pipeline(ListingKind::Resources, StorageForm::Native, &up)
            .prepare(
                json!({"title": "Cheatsheet", "type": "PDF", "image": "data:image/png;base64,aGVsbG8="}),
                WriteMode::Create,
                NOW,
            )
            .await
            .unwrap();
        assert_eq!(row["image"], "/media/resources/img.png");
        let calls = up.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "resources");
        assert_eq!(calls[0].1.bytes, b"hello");
    }

    #[tokio::test]
    async fn uploader_failure_aborts() {
        let up = RecordingUploader {
            fail: true,
            ..RecordingUploader::default()
        };
        let err = pipeline(ListingKind::Resources, StorageForm::Native, &up)
            .prepare(
                json!({"title": "Cheatsheet", "type": "PDF", "image": "data:image/png;base64,aGVsbG8="}),
                WriteMode::Create,
                NOW,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::UpstreamAsset { status: Some(502), .. }));
    }

    #[tokio::test]
    async fn rejected_payload_uploads_nothing() {
        let up = RecordingUploader::default();
        let p = pipeline(ListingKind::Courses, StorageForm::Serialized, &up);
        let image = "data:image/png;base64,aGVsbG8=";
        let cases = [
            json!({"title": "T", "platform": "Udemy", "enrollments": "many", "image": image}),
            json!({"title": "T", "platform": "Udemy", "tags": "{not json", "image": image}),
            json!({"title": "x".repeat(201), "platform": "Udemy", "image": image}),
            json!({"title": "???", "platform": "Udemy", "image": image}),
        ];
        for payload in cases {
            assert!(p.prepare(payload.clone(), WriteMode::Create, NOW).await.is_err(), "{payload}");
        }
        let err = p
            .prepare(json!({"rating": "high", "image": image}), WriteMode::Update, NOW)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation { ref field, .. } if field == "rating"));
        assert!(up.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn punctuation_only_title_needs_an_explicit_slug() {
        let up = RecordingUploader::default();
        let p = pipeline(ListingKind::Jobs, StorageForm::Native, &up);

        let err = p
            .prepare(json!({"title": "!!!", "type": "Full-time"}), WriteMode::Create, NOW)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation { ref field, .. } if field == "slug"), "{err:?}");

        let row = p
            .prepare(
                json!({"title": "!!!", "type": "Full-time", "slug": "exclaim"}),
                WriteMode::Create,
                NOW,
            )
            .await
            .unwrap();
        assert_eq!(row["slug"], "exclaim");

        let err = p
            .prepare(json!({"slug": "  "}), WriteMode::Update, NOW)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation { ref field, .. } if field == "slug"), "{err:?}");
    }

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("  Hello,  World -- 2025 "), "hello-world-2025");
        assert_eq!(slugify("C++ & Rust"), "c-rust");
        assert_eq!(slugify("!!!"), "");
    }
}
