//! RFC 9457 Problem Details used as the single error body of the HTTP surface.

use http::StatusCode;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Content type for Problem Details as per RFC 9457.
pub const APPLICATION_PROBLEM_JSON: &str = "application/problem+json";

#[allow(clippy::trivially_copy_pass_by_ref)] // serde requires &T signature
fn serialize_status<S>(status: &StatusCode, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u16(status.as_u16())
}

fn deserialize_status<'de, D>(deserializer: D) -> Result<StatusCode, D::Error>
where
    D: Deserializer<'de>,
{
    let code = u16::deserialize(deserializer)?;
    StatusCode::from_u16(code).map_err(serde::de::Error::custom)
}

/// RFC 9457 Problem Details.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[must_use]
pub struct Problem {
    /// URI reference identifying the problem type.
    #[serde(rename = "type")]
    pub type_url: String,
    pub title: String,
    /// Serialized as a bare number.
    #[serde(serialize_with = "serialize_status", deserialize_with = "deserialize_status")]
    pub status: StatusCode,
    pub detail: String,
    /// Request path this occurrence belongs to.
    #[serde(default)]
    pub instance: String,
    /// Stable machine-readable code from the catalog.
    #[serde(default)]
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    /// Field-level details for 4xx problems.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldViolation>>,
}

/// One offending payload field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl Problem {
    pub fn new(status: StatusCode, title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            type_url: "about:blank".to_owned(),
            title: title.into(),
            status,
            detail: detail.into(),
            instance: String::new(),
            code: String::new(),
            trace_id: None,
            errors: None,
        }
    }

    pub fn with_type(mut self, type_url: impl Into<String>) -> Self {
        self.type_url = type_url.into();
        self
    }

    pub fn with_instance(mut self, uri: impl Into<String>) -> Self {
        self.instance = uri.into();
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    pub fn with_trace_id(mut self, id: impl Into<String>) -> Self {
        self.trace_id = Some(id.into());
        self
    }

    /// Replace the status while keeping the catalog code, used when an
    /// upstream collaborator reports something more specific.
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn with_violation(mut self, violation: FieldViolation) -> Self {
        self.errors.get_or_insert_with(Vec::new).push(violation);
        self
    }
}

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for Problem {
    fn into_response(self) -> axum::response::Response {
        use axum::http::HeaderValue;

        let status = self.status;
        let mut resp = axum::Json(self).into_response();
        *resp.status_mut() = status;
        resp.headers_mut().insert(
            axum::http::header::CONTENT_TYPE,
            HeaderValue::from_static(APPLICATION_PROBLEM_JSON),
        );
        resp
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn builder_collects_violations() {
        let p = Problem::new(StatusCode::BAD_REQUEST, "Validation Failed", "title is required")
            .with_code("CATALOG_VALIDATION")
            .with_instance("/api/admin/courses")
            .with_violation(FieldViolation::new("title", "is required"))
            .with_violation(FieldViolation::new("slug", "must not be empty"));

        assert_eq!(p.status, StatusCode::BAD_REQUEST);
        assert_eq!(p.instance, "/api/admin/courses");
        assert_eq!(p.errors.as_ref().map(Vec::len), Some(2));
    }

    #[test]
    fn status_serializes_as_number_and_optionals_are_skipped() {
        let p = Problem::new(StatusCode::CONFLICT, "Conflict", "slug already exists");
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["status"], 409);
        assert_eq!(json["type"], "about:blank");
        assert!(json.get("trace_id").is_none());
        assert!(json.get("errors").is_none());
    }

    #[test]
    fn deserializes_minimal_document() {
        let raw = r#"{"type":"about:blank","title":"Not Found","status":404,"detail":"missing"}"#;
        let p: Problem = serde_json::from_str(raw).unwrap();
        assert_eq!(p.status, StatusCode::NOT_FOUND);
        assert!(p.code.is_empty());
    }
}
