//! Route handlers.
//!
//! Store calls are synchronous and run on the blocking pool.

use super::AppState;
use crate::models::{
    AbTestOutcome, AbTestRequest, CreatePromptRequest, ModelProfile, Prompt, PromptId,
    PromptSummary, Recommendation, WeightVector,
};
use crate::services::{placeholder_compare, recommend};
use crate::storage::StoreMode;
use crate::{Error, Result};
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::json;

/// Body of `GET /api/health`.
#[derive(Debug, Serialize)]
pub struct Health {
    /// Always true while the process serves requests.
    pub ok: bool,
    /// Store operating mode.
    pub mode: StoreMode,
}

/// Runs a synchronous store call on the blocking pool.
async fn blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| Error::operation("spawn_blocking", e))?
}

pub(super) async fn health(State(state): State<AppState>) -> Json<Health> {
    Json(Health {
        ok: true,
        mode: state.service.mode(),
    })
}

pub(super) async fn list_prompts(State(state): State<AppState>) -> Result<Json<Vec<PromptSummary>>> {
    let service = state.service.clone();
    let prompts = blocking(move || service.list_prompts()).await?;
    Ok(Json(prompts))
}

pub(super) async fn create_prompt(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreatePromptRequest>, JsonRejection>,
) -> Result<Response> {
    let Json(request) = payload?;
    let service = state.service.clone();
    let prompt = blocking(move || service.create_prompt(request)).await?;

    // External stores echo only the id; the fallback returns the whole prompt.
    let response = match state.service.mode() {
        StoreMode::ExternalStore => {
            (StatusCode::CREATED, Json(json!({ "id": prompt.id }))).into_response()
        },
        StoreMode::LocalFallback => (StatusCode::CREATED, Json(prompt)).into_response(),
    };
    Ok(response)
}

pub(super) async fn get_prompt(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Prompt>> {
    let service = state.service.clone();
    let prompt = blocking(move || service.get_prompt(&PromptId::new(id))).await?;
    Ok(Json(prompt))
}

pub(super) async fn ab_test(
    payload: std::result::Result<Json<AbTestRequest>, JsonRejection>,
) -> Result<Json<AbTestOutcome>> {
    let Json(request) = payload?;
    Ok(Json(placeholder_compare(&request)))
}

pub(super) async fn recommend_model(
    State(state): State<AppState>,
    payload: std::result::Result<Json<WeightVector>, JsonRejection>,
) -> Result<Json<Recommendation>> {
    let Json(weights) = payload?;
    recommend(state.service.catalog(), &weights)
        .map(Json)
        .ok_or_else(|| Error::operation("recommend", "model catalog is empty"))
}

pub(super) async fn list_models(State(state): State<AppState>) -> Json<&'static [ModelProfile]> {
    Json(state.service.catalog().profiles())
}
