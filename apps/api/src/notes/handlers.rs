//! Axum route handlers for the Notes API.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::header,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::insights::{synthesize, CareerInsights};
use crate::notes::export::render_markdown;
use crate::notes::models::{NoteRequest, NotesDocument, NotesOutput};
use crate::notes::validation::{validate_exam_type, validate_request, ValidationError};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct GuidanceResponse {
    pub notes: Value,
    pub insights: CareerInsights,
    pub generated_at: DateTime<Utc>,
}

// ────────────────────────────────────────────────────────────────────────────
// Shared pipeline
// ────────────────────────────────────────────────────────────────────────────

fn json_body(body: Result<Json<Value>, JsonRejection>) -> Result<Value, AppError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ValidationError::MalformedBody(rejection.body_text()).into())
}

/// Validate → check credential → one worker exchange.
async fn generate(state: &AppState, body: &Value) -> Result<(NoteRequest, NotesDocument), AppError> {
    let request = validate_request(body)?;
    let worker_config = state.config.worker_config()?;

    let request_id = Uuid::new_v4();
    let span = info_span!(
        "notes",
        %request_id,
        exam_type = request.exam_type.as_str(),
        depth = request.depth.as_str(),
    );

    let document = async {
        info!(chars = request.content.chars().count(), "dispatching to agent");
        state.worker.generate(&request, &worker_config).await
    }
    .instrument(span)
    .await?;

    Ok((request, document))
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/notes
///
/// Generates structured study notes. The 200 body is the worker's document verbatim.
pub async fn handle_generate_notes(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let body = json_body(body)?;
    let (_, document) = generate(&state, &body).await?;
    Ok(Json(document.into_raw()))
}

/// POST /api/guidance
///
/// Notes plus the derived career insights for the requested exam type, in one call.
pub async fn handle_guidance(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<GuidanceResponse>, AppError> {
    let body = json_body(body)?;
    let (request, document) = generate(&state, &body).await?;
    let insights = synthesize(document.notes(), request.exam_type);

    Ok(Json(GuidanceResponse {
        notes: document.into_raw(),
        insights,
        generated_at: Utc::now(),
    }))
}

/// POST /api/insights
///
/// Body: `{notes, exam_type}`. Runs only the synthesizer; no worker is launched.
pub async fn handle_insights(
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<CareerInsights>, AppError> {
    let body = json_body(body)?;
    let exam_type = validate_exam_type(body.get("exam_type"))?;
    let notes = NotesOutput::from_value(body.get("notes").unwrap_or(&Value::Null));

    Ok(Json(synthesize(&notes, exam_type)))
}

/// POST /api/notes/markdown
///
/// Body: a notes document. Returns it as Markdown.
pub async fn handle_markdown(
    body: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let body = json_body(body)?;
    let markdown = render_markdown(&NotesOutput::from_value(&body));

    Ok((
        [(header::CONTENT_TYPE, "text/markdown; charset=utf-8")],
        markdown,
    ))
}
