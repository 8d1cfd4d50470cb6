//! Router construction, request handlers, and HTTP middleware.
//!
//! # Responsibility
//! - Wire the contact CRUD surface under `/api/contacts`.
//! - Answer cross-origin requests permissively (any origin, no
//!   credentials).
//! - Emit one structured log line per request.

use crate::error::ApiError;
use crate::state::AppState;
use crate::wire::{list_query_from_params, ContactPageView, ContactPayload, ContactView};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, Request, State};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode};
use axum::middleware::{from_fn, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use log::info;
use phonebook_core::{core_version, ContactId};
use serde::Serialize;
use std::collections::HashMap;
use std::time::Instant;

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/contacts", get(list_contacts).post(create_contact))
        .route(
            "/api/contacts/:id",
            get(get_contact).put(update_contact).delete(delete_contact),
        )
        .layer(from_fn(cors_middleware))
        .layer(from_fn(request_log_middleware))
        .with_state(state)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: core_version(),
    })
}

async fn list_contacts(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<ContactPageView>, ApiError> {
    let query = list_query_from_params(&params);
    let page = state.with_contacts(|contacts| contacts.list_contacts(&query))?;
    Ok(Json(ContactPageView::from(page)))
}

async fn create_contact(
    State(state): State<AppState>,
    payload: Result<Json<ContactPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<ContactView>), ApiError> {
    let Json(payload) = payload.map_err(|_| ApiError::invalid_input())?;
    let draft = payload.into_draft();
    let created = state.with_contacts(|contacts| contacts.create_contact(&draft))?;
    Ok((StatusCode::CREATED, Json(ContactView::from(created))))
}

async fn get_contact(
    State(state): State<AppState>,
    Path(id): Path<ContactId>,
) -> Result<Json<ContactView>, ApiError> {
    let contact = state
        .with_contacts(|contacts| contacts.get_contact(id))?
        .ok_or_else(ApiError::contact_not_found)?;
    Ok(Json(ContactView::from(contact)))
}

async fn update_contact(
    State(state): State<AppState>,
    Path(id): Path<ContactId>,
    payload: Result<Json<ContactPayload>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(payload) = payload.map_err(|_| ApiError::invalid_input())?;
    let draft = payload.into_draft();
    state.with_contacts(|contacts| contacts.update_contact(id, &draft))?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_contact(
    State(state): State<AppState>,
    Path(id): Path<ContactId>,
) -> Result<StatusCode, ApiError> {
    state.with_contacts(|contacts| contacts.delete_contact(id))?;
    Ok(StatusCode::NO_CONTENT)
}

/// Permissive CORS: preflights are answered directly with 204 and every
/// response carries the any-origin header.
async fn cors_middleware(req: Request, next: Next) -> Response {
    if req.method() == Method::OPTIONS {
        let mut resp = StatusCode::NO_CONTENT.into_response();
        apply_cors_headers(resp.headers_mut());
        return resp;
    }

    let mut resp = next.run(req).await;
    apply_cors_headers(resp.headers_mut());
    resp
}

fn apply_cors_headers(headers: &mut HeaderMap) {
    headers.insert("access-control-allow-origin", HeaderValue::from_static("*"));
    headers.insert(
        "access-control-allow-methods",
        HeaderValue::from_static("GET,POST,PUT,DELETE,OPTIONS"),
    );
    headers.insert(
        "access-control-allow-headers",
        HeaderValue::from_static("content-type"),
    );
}

async fn request_log_middleware(req: Request, next: Next) -> Response {
    let started_at = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let resp = next.run(req).await;

    info!(
        "event=http_request module=server status={} method={} path={} duration_ms={}",
        resp.status().as_u16(),
        method,
        path,
        started_at.elapsed().as_millis()
    );
    resp
}
