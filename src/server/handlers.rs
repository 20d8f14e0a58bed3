// HTTP handlers: the chat endpoint and read-only content lookups

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, Path, State},
    http::StatusCode,
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::sync::Arc;

use super::error::*;
use super::AppState;
use crate::chat::{assemble_messages, fallback_answer, AnswerSource, ChatReply, ChatRequest};
use crate::content::{build_context_text, ContentStore, Unit};

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/subjects", get(handle_list_subjects))
        .route(
            "/api/subjects/:subject/units/:unit",
            get(handle_get_unit),
        )
        .route(
            "/api/chat",
            post(handle_chat).fallback(method_not_allowed),
        )
        .fallback(route_not_found)
        .with_state(state)
}

/// Answer one student question.
///
/// Validates the body, resolves the unit, then either calls the provider
/// (credential set) or builds the offline demo answer (credential unset).
/// The credential is looked up on every call.
pub async fn handle_chat(
    State(state): State<Arc<AppState>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<JsonResponse<ChatReply>, ApiError> {
    let body = body.map_err(ApiError::from)?;
    let request = ChatRequest::from_body(&body)?;

    let store = load_store(&state).await?;
    let (Some(subject), Some(unit)) = (
        store.find_subject(&request.subject),
        store.find_unit(&request.subject, &request.unit),
    ) else {
        return Err(ApiError::NotFound(MSG_MATERIAL_NOT_FOUND));
    };

    let context_text = build_context_text(subject, unit);

    let Some(api_key) = state.credentials().current() else {
        tracing::info!(
            subject = %subject.id,
            unit = %unit.id,
            "No provider credential configured, answering with fallback"
        );
        let answer = fallback_answer(
            subject,
            unit,
            &request.question,
            &context_text,
            state.credentials().label(),
        );
        return Ok(JsonResponse::ok(ChatReply {
            answer,
            source: AnswerSource::Fallback,
        }));
    };

    let messages = assemble_messages(&context_text, &request.history, &request.question);

    match state.provider().complete(&api_key, &messages).await {
        Ok(completion) => {
            tracing::info!(
                subject = %subject.id,
                unit = %unit.id,
                turns = messages.len(),
                "Answered question via {}",
                state.provider().name()
            );
            Ok(JsonResponse::ok(ChatReply {
                answer: completion.answer,
                source: AnswerSource::OpenAi,
            }))
        }
        Err(e) => {
            tracing::error!(kind = e.kind(), "Provider call failed: {}", e);
            Err(ApiError::Internal {
                message: MSG_TUTOR_FAILED,
                details: state.expose_error_details().then(|| e.diagnostic()),
            })
        }
    }
}

/// Subject listing entry
#[derive(Debug, Serialize)]
pub struct SubjectSummary {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub units: Vec<UnitSummary>,
}

#[derive(Debug, Serialize)]
pub struct UnitSummary {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
}

/// List all subjects with their units
pub async fn handle_list_subjects(
    State(state): State<Arc<AppState>>,
) -> Result<JsonResponse<Vec<SubjectSummary>>, ApiError> {
    let store = load_store(&state).await?;

    let subjects = store
        .subjects()
        .iter()
        .map(|subject| SubjectSummary {
            id: subject.id.clone(),
            name: subject.display_name().to_string(),
            description: subject.description.clone(),
            units: subject
                .units
                .iter()
                .map(|unit| UnitSummary {
                    id: unit.id.clone(),
                    name: unit.display_name().to_string(),
                    grade: unit.grade.clone(),
                })
                .collect(),
        })
        .collect();

    Ok(JsonResponse::ok(subjects))
}

#[derive(Debug, Serialize)]
pub struct SubjectRef {
    pub id: String,
    pub name: String,
}

/// A unit together with the subject it belongs to
#[derive(Debug, Serialize)]
pub struct UnitDetail {
    pub subject: SubjectRef,
    #[serde(flatten)]
    pub unit: Unit,
}

/// Fetch one unit's full study material
pub async fn handle_get_unit(
    State(state): State<Arc<AppState>>,
    Path((subject_id, unit_id)): Path<(String, String)>,
) -> Result<JsonResponse<UnitDetail>, ApiError> {
    let store = load_store(&state).await?;

    let subject = store
        .find_subject(&subject_id)
        .ok_or(ApiError::NotFound(MSG_SUBJECT_NOT_FOUND))?;
    let unit = store
        .find_unit(&subject.id, &unit_id)
        .ok_or(ApiError::NotFound(MSG_UNIT_NOT_FOUND))?;

    Ok(JsonResponse::ok(UnitDetail {
        subject: SubjectRef {
            id: subject.id.clone(),
            name: subject.display_name().to_string(),
        },
        unit: unit.clone(),
    }))
}

#[derive(Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
}

/// Health check endpoint
pub async fn health_check() -> JsonResponse<HealthStatus> {
    JsonResponse::ok(HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

async fn route_not_found() -> JsonResponse<ErrorBody> {
    JsonResponse(
        StatusCode::NOT_FOUND,
        ErrorBody {
            error: MSG_ROUTE_NOT_FOUND.to_string(),
            details: None,
        },
    )
}

async fn load_store(state: &AppState) -> Result<ContentStore, ApiError> {
    ContentStore::load(state.content_path()).await.map_err(|e| {
        tracing::error!("Content store unavailable: {}", e);
        ApiError::content_unavailable()
    })
}
