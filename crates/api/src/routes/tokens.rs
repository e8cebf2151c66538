//! Device token registration.

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use notice_common::error::AppError;
use notice_common::types::Registration;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/save-token", post(save_token))
}

/// Request body for token registration.
#[derive(Debug, Deserialize)]
pub struct SaveTokenRequest {
    pub token: Option<String>,
}

/// POST /save-token — Register a device token for notice pushes.
///
/// 201 for a new token, 200 if it was already registered.
async fn save_token(
    State(state): State<AppState>,
    body: Result<Json<SaveTokenRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let Json(req) = body.map_err(|e| AppError::InvalidInput(e.body_text()))?;
    let token = req.token.unwrap_or_default();

    let (status, message) = match state.registry.register(&token).await? {
        Registration::Created => (StatusCode::CREATED, "Token saved successfully"),
        Registration::AlreadyRegistered => (StatusCode::OK, "Token already registered"),
    };

    Ok((status, Json(json!({ "message": message }))))
}
