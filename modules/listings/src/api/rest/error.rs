use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use catalog_errors::{FieldViolation, Problem, catalog};

use crate::domain::error::DomainError;

pub type ApiResult<T> = Result<T, Problem>;

fn current_trace_id() -> Option<String> {
    tracing::Span::current().id().map(|id| id.into_u64().to_string())
}

/// Map domain error to RFC9457 Problem using the catalog error entries
pub fn domain_error_to_problem(e: &DomainError, instance: &str) -> Problem {
    let trace_id = current_trace_id();

    match e {
        DomainError::Validation { field, message } => catalog::VALIDATION
            .with_context(format!("Validation error on '{field}': {message}"), instance, trace_id)
            .with_violation(FieldViolation::new(field.clone(), message.clone())),
        DomainError::NotFound => catalog::NOT_FOUND.with_context("Listing not found", instance, trace_id),
        DomainError::UnknownKind(kind) => {
            catalog::UNKNOWN_LISTING.with_context(format!("Unknown listing kind '{kind}'"), instance, trace_id)
        }
        DomainError::Conflict { field } => catalog::CONFLICT.with_context(
            format!("A listing with this '{field}' already exists"),
            instance,
            trace_id,
        ),
        DomainError::OversizedField { field, message } => {
            let problem = catalog::OVERSIZED_FIELD.with_context(message.clone(), instance, trace_id);
            match field {
                Some(f) => problem.with_violation(FieldViolation::new(f.clone(), message.clone())),
                None => problem,
            }
        }
        DomainError::Configuration(msg) => {
            tracing::error!(error = ?e, "Configuration error: {}", msg);
            catalog::CONFIGURATION.with_context("Storage is not configured for this listing", instance, trace_id)
        }
        DomainError::UpstreamAsset { status, message } => {
            tracing::error!(error = ?e, "Media upload failed");
            let problem = catalog::UPSTREAM_ASSET.with_context(message.clone(), instance, trace_id);
            match status.and_then(|s| StatusCode::from_u16(s).ok()) {
                Some(s) if s.is_client_error() || s.is_server_error() => problem.with_status(s),
                _ => problem,
            }
        }
        DomainError::Storage(_) => {
            tracing::error!(error = ?e, "Storage error occurred");
            catalog::STORAGE.with_context("An internal storage error occurred", instance, trace_id)
        }
    }
}

pub fn json_rejection_to_problem(rejection: &JsonRejection, instance: &str) -> Problem {
    catalog::MALFORMED_BODY.with_context(rejection.body_text(), instance, current_trace_id())
}

/// Implement From<DomainError> for Problem so `?` works in handlers
impl From<DomainError> for Problem {
    fn from(e: DomainError) -> Self {
        domain_error_to_problem(&e, "/")
    }
}
