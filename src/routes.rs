use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};

use crate::{
    AppState,
    error::AppResult,
    models::{ShowRecord, ShowView},
    pipeline::IngestionPipeline,
    shows::{self, CreateOutcome, UpdateOutcome},
};

pub const API_KEY_HEADER: &str = "x-api-key";

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/shows", get(list_shows).post(create_show))
        .route("/api/shows/{id}", get(get_show).put(update_show).delete(delete_show))
        .route("/api/job/run", post(run_job))
        .with_state(state)
}

pub async fn list_shows(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<ShowView>>> {
    Ok(Json(state.repository.list_shows().await?))
}

pub async fn get_show(State(state): State<Arc<AppState>>, Path(id): Path<i32>) -> AppResult<Response> {
    Ok(match state.repository.get_show(id).await? {
        Some(show) => Json(show).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    })
}

pub async fn create_show(
    State(state): State<Arc<AppState>>,
    Json(record): Json<ShowRecord>,
) -> AppResult<Response> {
    Ok(match shows::create_show(&state.repository, &record).await? {
        CreateOutcome::Created(show) => {
            let location = HeaderValue::try_from(format!("/api/shows/{}", show.id))
                .map_err(anyhow::Error::from)?;
            (StatusCode::CREATED, [(header::LOCATION, location)], Json(show)).into_response()
        },
        CreateOutcome::AlreadyExists => {
            (StatusCode::CONFLICT, format!("Show {} already exists.", record.id)).into_response()
        },
    })
}

pub async fn update_show(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(record): Json<ShowRecord>,
) -> AppResult<StatusCode> {
    if record.id != id {
        return Ok(StatusCode::BAD_REQUEST);
    }

    Ok(match shows::update_show(&state.repository, &record).await? {
        UpdateOutcome::Updated => StatusCode::NO_CONTENT,
        UpdateOutcome::NotFound => StatusCode::NOT_FOUND,
    })
}

pub async fn delete_show(State(state): State<Arc<AppState>>, Path(id): Path<i32>) -> AppResult<StatusCode> {
    Ok(if state.repository.delete_show(id).await? {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    })
}

/// Runs one ingestion and waits for it. Failures are logged by the run and
/// reported without detail.
pub async fn run_job(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let provided = headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok());
    if !authorized(&state.config.job_api_key, provided) {
        tracing::warn!("job trigger rejected");
        return (StatusCode::UNAUTHORIZED, "Invalid API key.").into_response();
    }

    match IngestionPipeline::new(&state.catalog, &state.repository).run().await {
        Ok(()) => (StatusCode::OK, "Job executed successfully.").into_response(),
        Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, "An error occurred while executing the job.")
            .into_response(),
    }
}

fn authorized(expected: &str, provided: Option<&str>) -> bool {
    !expected.is_empty() && provided == Some(expected)
}
