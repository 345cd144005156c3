use axum::{extract::State, Extension, Json};
use serde_json::{json, Value};

use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::models::journal::{DefaultAchievementInput, JournalSnapshot, SaveEntryRequest};
use crate::services::journal;
use crate::AppState;

pub async fn list_entries(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<JournalSnapshot>> {
    let snapshot = journal::list_entries(&state.db, auth_user.id).await?;
    Ok(Json(snapshot))
}

pub async fn save_entry(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<SaveEntryRequest>,
) -> AppResult<Json<Value>> {
    let date = journal::canonical_entry_date(&body.date)?;

    let entry_id = journal::save_entry(
        &state.db,
        auth_user.id,
        date,
        &body.content,
        &body.goals,
        &body.achievements,
    )
    .await?;

    tracing::debug!(user_id = %auth_user.id, entry_id = %entry_id, date = %date, "Saved journal entry");

    Ok(Json(json!({ "message": "Journal entry saved successfully" })))
}

pub async fn save_default_achievements(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<Value>,
) -> AppResult<Json<Value>> {
    // The wire format is a bare JSON array; anything else is a client bug.
    if !body.is_array() {
        return Err(AppError::Validation("Invalid achievements format".into()));
    }

    let items: Vec<DefaultAchievementInput> = serde_json::from_value(body)
        .map_err(|e| AppError::Validation(format!("Invalid achievements format: {}", e)))?;

    journal::save_default_achievements(&state.db, auth_user.id, &items).await?;

    Ok(Json(
        json!({ "message": "Default achievements saved successfully" }),
    ))
}
