//! Loop handlers for the CodeLoop web API.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ai::flows;
use crate::data::{validate_prompt, ExperienceLevel, Language, Loop, LoopDraft, LoopStore};
use crate::web::auth::CurrentUser;
use crate::web::error::WebError;
use crate::web::state::WebAppState;

/// Response for a single loop.
#[derive(Debug, Serialize)]
pub struct LoopResponse {
    pub id: Uuid,
    pub user_id: String,
    pub prompt: String,
    pub language: Language,
    pub code: String,
    pub explanation: Option<String>,
    pub experience_level: Option<ExperienceLevel>,
    pub parent_loop_id: Option<Uuid>,
    pub created_at: String,
}

impl From<Loop> for LoopResponse {
    fn from(record: Loop) -> Self {
        Self {
            id: record.id,
            user_id: record.user_id,
            prompt: record.prompt,
            language: record.language,
            code: record.code,
            explanation: record.explanation,
            experience_level: record.experience_level,
            parent_loop_id: record.parent_loop_id,
            created_at: record.created_at.to_rfc3339(),
        }
    }
}

/// Response for listing a user's loops.
#[derive(Debug, Serialize)]
pub struct ListLoopsResponse {
    pub loops: Vec<LoopResponse>,
    pub total: u64,
}

/// Request to create a new loop.
///
/// When `code` is present, generation is skipped and the supplied snippet is
/// saved as-is: this is the retry-save path after a save failure surfaced
/// the generated code back to the client.
#[derive(Debug, Deserialize)]
pub struct CreateLoopRequest {
    pub prompt: String,
    pub language: Language,
    pub code: Option<String>,
    pub experience_level: Option<ExperienceLevel>,
    pub parent_loop_id: Option<Uuid>,
}

/// Request to explain a loop's code.
#[derive(Debug, Default, Deserialize)]
pub struct ExplainLoopRequest {
    pub experience_level: Option<ExperienceLevel>,
}

/// Response for forking a loop: a fresh draft carrying only the lineage
/// pointer. Nothing else is copied from the source record.
#[derive(Debug, Serialize)]
pub struct ForkLoopResponse {
    pub parent_loop_id: Uuid,
}

fn loop_store(state: &WebAppState) -> Result<&LoopStore, WebError> {
    state
        .core()
        .loop_store()
        .ok_or_else(|| WebError::StoreUnavailable("Database not available".to_string()))
}

/// List the signed-in user's loops, most recent first.
pub async fn list_loops(
    State(state): State<WebAppState>,
    user: CurrentUser,
) -> Result<Json<ListLoopsResponse>, WebError> {
    let store = loop_store(&state)?;

    let loops = store
        .list_by_owner(&user.0)
        .map_err(|e| WebError::StoreUnavailable(format!("Failed to list loops: {}", e)))?;
    let total = store
        .count_by_owner(&user.0)
        .map_err(|e| WebError::StoreUnavailable(format!("Failed to count loops: {}", e)))?;

    Ok(Json(ListLoopsResponse {
        loops: loops.into_iter().map(LoopResponse::from).collect(),
        total,
    }))
}

/// Get a single loop by ID.
///
/// Any signed-in caller with the id can read the record; ownership gates
/// only the write paths.
pub async fn get_loop(
    State(state): State<WebAppState>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<LoopResponse>, WebError> {
    let store = loop_store(&state)?;

    let record = store
        .get_by_id(id)
        .map_err(|e| WebError::StoreUnavailable(format!("Failed to get loop: {}", e)))?
        .ok_or_else(|| WebError::NotFound(format!("Loop {} not found", id)))?;

    Ok(Json(LoopResponse::from(record)))
}

/// Create a new loop: generate code for the prompt (unless the client
/// supplied it) and persist the record in one request.
pub async fn create_loop(
    State(state): State<WebAppState>,
    user: CurrentUser,
    Json(req): Json<CreateLoopRequest>,
) -> Result<(StatusCode, Json<LoopResponse>), WebError> {
    // Field constraints are checked before any network call is made
    validate_prompt(&req.prompt)?;

    let store = loop_store(&state)?;

    let supplied_code = req
        .code
        .as_deref()
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(String::from);

    let (code, code_was_generated) = match supplied_code {
        Some(code) => (code, false),
        None => {
            let client = state.core().prompt_client().ok_or_else(|| {
                WebError::Generation("Prompt service not available".to_string())
            })?;
            let code = flows::generate_code(&client, &req.prompt, req.language).await?;
            (code, true)
        }
    };

    let mut draft = LoopDraft::new(user.0, req.prompt, req.language, code);
    if let Some(level) = req.experience_level {
        draft = draft.with_experience_level(level);
    }
    if let Some(parent_loop_id) = req.parent_loop_id {
        draft = draft.with_parent(parent_loop_id);
    }
    draft.validate()?;

    match store.create(&draft) {
        Ok(record) => Ok((StatusCode::CREATED, Json(LoopResponse::from(record)))),
        Err(e) => {
            tracing::error!(error = %e, "Failed to save loop");
            if code_was_generated {
                Err(WebError::SaveFailedAfterGeneration {
                    generated_code: draft.code,
                })
            } else {
                Err(WebError::StoreUnavailable(format!(
                    "Failed to save loop: {}",
                    e
                )))
            }
        }
    }
}

/// Generate (or regenerate) the explanation for a loop's code and persist
/// it, overwriting any previous explanation.
pub async fn explain_loop(
    State(state): State<WebAppState>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(req): Json<ExplainLoopRequest>,
) -> Result<Json<LoopResponse>, WebError> {
    let store = loop_store(&state)?;

    let mut record = store
        .get_by_id(id)
        .map_err(|e| WebError::StoreUnavailable(format!("Failed to get loop: {}", e)))?
        .ok_or_else(|| WebError::NotFound(format!("Loop {} not found", id)))?;

    if record.user_id != user.0 {
        return Err(WebError::Forbidden(
            "Only the owner can explain a loop".to_string(),
        ));
    }

    let client = state
        .core()
        .prompt_client()
        .ok_or_else(|| WebError::Generation("Prompt service not available".to_string()))?;

    let level = req
        .experience_level
        .or(record.experience_level)
        .unwrap_or(ExperienceLevel::Mid);
    let explanation = flows::explain_code(&client, &record.code, level).await?;

    let updated = store
        .set_explanation(id, &explanation)
        .map_err(|e| WebError::StoreUnavailable(format!("Failed to save explanation: {}", e)))?;
    if !updated {
        return Err(WebError::NotFound(format!("Loop {} not found", id)));
    }

    record.explanation = Some(explanation);
    Ok(Json(LoopResponse::from(record)))
}

/// Fork a loop: return a draft seed referencing the source as lineage
/// parent. The source record is not modified.
pub async fn fork_loop(
    State(state): State<WebAppState>,
    _user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ForkLoopResponse>, WebError> {
    let store = loop_store(&state)?;

    let record = store
        .get_by_id(id)
        .map_err(|e| WebError::StoreUnavailable(format!("Failed to get loop: {}", e)))?
        .ok_or_else(|| WebError::NotFound(format!("Loop {} not found", id)))?;

    let seed = record.fork_seed();
    Ok(Json(ForkLoopResponse {
        parent_loop_id: seed.parent_loop_id,
    }))
}
