use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Extension, Path, RawQuery};
use axum::http::{StatusCode, Uri, header};
use axum::response::IntoResponse;
use axum::Json;
use catalog_errors::{Problem, catalog};
use catalog_query::{ListingKind, Page, RawParams, Record, Visibility};
use serde_json::{Value, json};

use super::error::{ApiResult, domain_error_to_problem, json_rejection_to_problem};
use crate::domain::error::DomainError;
use crate::domain::service::ListingService;

fn parse_kind(raw: &str, uri: &Uri) -> ApiResult<ListingKind> {
    raw.parse::<ListingKind>()
        .map_err(|e| domain_error_to_problem(&DomainError::UnknownKind(e.0), uri.path()))
}

fn problem(uri: &Uri) -> impl FnOnce(DomainError) -> Problem + '_ {
    move |e| domain_error_to_problem(&e, uri.path())
}

fn json_payload(body: Result<Json<Value>, JsonRejection>, uri: &Uri) -> ApiResult<Value> {
    body.map(|Json(v)| v)
        .map_err(|rejection| json_rejection_to_problem(&rejection, uri.path()))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Public listing driven by the query string.
pub async fn list_public(
    Extension(svc): Extension<Arc<ListingService>>,
    Path(kind): Path<String>,
    RawQuery(query): RawQuery,
    uri: Uri,
) -> ApiResult<Json<Page<Record>>> {
    let kind = parse_kind(&kind, &uri)?;
    let raw = RawParams::from_query_str(query.as_deref().unwrap_or_default());
    let page = svc.list(kind, &raw, Visibility::Public).await.map_err(problem(&uri))?;
    Ok(Json(page))
}

/// Public listing driven by a JSON body. An empty body lists with defaults.
pub async fn search_public(
    Extension(svc): Extension<Arc<ListingService>>,
    Path(kind): Path<String>,
    uri: Uri,
    body: Bytes,
) -> ApiResult<Json<Page<Record>>> {
    let kind = parse_kind(&kind, &uri)?;
    let raw = if body.iter().all(u8::is_ascii_whitespace) {
        RawParams::new()
    } else {
        let value: Value = serde_json::from_slice(&body).map_err(|e| {
            catalog::MALFORMED_BODY.with_context(format!("Invalid JSON body: {e}"), uri.path(), None)
        })?;
        RawParams::from_json(&value)
    };
    let page = svc.list(kind, &raw, Visibility::Public).await.map_err(problem(&uri))?;
    Ok(Json(page))
}

/// Admin listing: same parameters, every visibility.
pub async fn list_admin(
    Extension(svc): Extension<Arc<ListingService>>,
    Path(kind): Path<String>,
    RawQuery(query): RawQuery,
    uri: Uri,
) -> ApiResult<Json<Page<Record>>> {
    let kind = parse_kind(&kind, &uri)?;
    let raw = RawParams::from_query_str(query.as_deref().unwrap_or_default());
    let page = svc.list(kind, &raw, Visibility::Any).await.map_err(problem(&uri))?;
    Ok(Json(page))
}

pub async fn get_listing(
    Extension(svc): Extension<Arc<ListingService>>,
    Path((kind, id)): Path<(String, String)>,
    uri: Uri,
) -> ApiResult<Json<Record>> {
    let kind = parse_kind(&kind, &uri)?;
    let record = svc.get(kind, &id).await.map_err(problem(&uri))?;
    Ok(Json(record))
}

pub async fn create_listing(
    Extension(svc): Extension<Arc<ListingService>>,
    Path(kind): Path<String>,
    uri: Uri,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let kind = parse_kind(&kind, &uri)?;
    let payload = json_payload(body, &uri)?;
    let record = svc.create(kind, payload).await.map_err(problem(&uri))?;
    let location = record
        .get("id")
        .and_then(Value::as_str)
        .map(|id| format!("/api/admin/{kind}/{id}"))
        .unwrap_or_default();
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(record)))
}

pub async fn update_listing(
    Extension(svc): Extension<Arc<ListingService>>,
    Path((kind, id)): Path<(String, String)>,
    uri: Uri,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<Record>> {
    let kind = parse_kind(&kind, &uri)?;
    let payload = json_payload(body, &uri)?;
    let record = svc.update(kind, &id, payload).await.map_err(problem(&uri))?;
    Ok(Json(record))
}
