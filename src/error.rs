use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::pipeline::RunStage;

/// Failures of the catalog fetch and of the persisted store.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("Error fetching shows from catalog: {0}")]
    Network(#[source] reqwest::Error),

    #[error("catalog responded with status {0}")]
    Remote(reqwest::StatusCode),

    #[error("catalog response is not a valid show list: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("store error: {0}")]
    Store(#[from] sea_orm::DbErr),

    #[error("configuration error: {0}")]
    Configuration(String),
}

pub type SyncResult<T> = Result<T, SyncError>;

/// A failed ingestion run, tagged with the stage it failed in.
#[derive(Debug, thiserror::Error)]
#[error("ingestion run failed while {stage}: {source}")]
pub struct IngestError {
    pub stage: RunStage,
    #[source]
    pub source: SyncError,
}

#[derive(Debug)]
pub struct AppError(anyhow::Error);

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for AppError {}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self(err)
    }
}

impl From<SyncError> for AppError {
    fn from(err: SyncError) -> Self {
        Self(anyhow::Error::new(err))
    }
}

impl From<sea_orm::DbErr> for AppError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self(anyhow::Error::new(err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self.0, "request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
