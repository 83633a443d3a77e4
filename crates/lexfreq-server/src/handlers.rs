use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use lexfreq_core::{
    Collapser, Families, LexemeQuery, LexemeTable, OutputMode, QueryError, Strategy,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::error;

pub const DEFAULT_MAX_WORDS: usize = 32;

#[derive(Clone)]
pub struct AppState {
    pub collapser: Arc<Collapser>,
    pub max_words: usize,
}

/// Raw query string; every field is validated by hand so rejections carry
/// a JSON body.
#[derive(Debug, Default, Deserialize)]
pub struct LexemesParams {
    pub words: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub mode: Option<String>,
    pub strategy: Option<String>,
}

#[derive(Serialize)]
pub struct LexemesResponse {
    start: i32,
    end: i32,
    mode: OutputMode,
    strategy: Strategy,
    entries: LexemeTable,
    families: Families,
    skipped: Skipped,
}

#[derive(Serialize)]
struct Skipped {
    unresolved: Vec<String>,
    dropped_bases: Vec<String>,
    absent_terms: usize,
    failed_terms: Vec<String>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/v1/lexemes", get(lexemes))
        .with_state(state)
}

async fn healthz() -> impl IntoResponse {
    "ok"
}

async fn lexemes(
    State(state): State<AppState>,
    Query(params): Query<LexemesParams>,
) -> Result<Response, ApiError> {
    let words = split_words(params.words.as_deref().unwrap_or_default());
    if words.is_empty() {
        return Err(ApiError::bad_request("words is required"));
    }
    if words.len() > state.max_words {
        return Err(ApiError::bad_request(format!(
            "at most {} words per request",
            state.max_words
        )));
    }

    let start = parse_year("start", params.start.as_deref())?;
    let end = parse_year("end", params.end.as_deref())?;
    let mode = params
        .mode
        .as_deref()
        .map(str::parse::<OutputMode>)
        .transpose()
        .map_err(|e| ApiError::bad_request(e.to_string()))?
        .unwrap_or_default();
    let strategy = params
        .strategy
        .as_deref()
        .map(str::parse::<Strategy>)
        .transpose()
        .map_err(|e| ApiError::bad_request(e.to_string()))?
        .unwrap_or_default();

    let query = LexemeQuery::new(&words, start, end)?
        .mode(mode)
        .strategy(strategy);

    // Lookups block on the network; keep them off the async workers.
    let collapser = Arc::clone(&state.collapser);
    let outcome = tokio::task::spawn_blocking(move || collapser.run(&query))
        .await
        .map_err(|err| {
            error!("lexeme query task failed: {err}");
            ApiError::Internal
        })??;

    let response = LexemesResponse {
        start,
        end,
        mode,
        strategy,
        entries: outcome.table,
        families: outcome.families,
        skipped: Skipped {
            unresolved: outcome.expansion.unresolved,
            dropped_bases: outcome.expansion.dropped,
            absent_terms: outcome.retrieval.absent,
            failed_terms: outcome.retrieval.failed_terms,
        },
    };
    Ok(Json(response).into_response())
}

fn split_words(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_year(name: &str, raw: Option<&str>) -> Result<i32, ApiError> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::bad_request(format!("{name} is required")))?;
    raw.parse::<i32>()
        .map_err(|_| ApiError::bad_request(format!("{name} must be a year, got {raw:?}")))
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("internal server error")]
    Internal,
}

impl ApiError {
    fn bad_request<T: Into<String>>(msg: T) -> Self {
        ApiError::BadRequest(msg.into())
    }
}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(msg) => {
                let body = Json(ErrorResponse { error: msg });
                (StatusCode::BAD_REQUEST, body).into_response()
            }
            ApiError::Internal => {
                let body = Json(json!({ "error": "internal server error" }));
                (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
            }
        }
    }
}
