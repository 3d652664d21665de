/*
 * Responsibility
 * - POST /login: credential 検証 → トークン発行
 * - GET /protected: middleware が載せた AuthCtx を読むだけ
 */
use axum::Json;
use axum::extract::{State, rejection::JsonRejection};

use crate::api::dto::auth::{LoginRequest, LoginResponse};
use crate::api::extractors::AuthCtxExtractor;
use crate::error::AppError;
use crate::state::AppState;

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AppError> {
    let Json(req) = payload
        .map_err(|_| AppError::bad_request("INVALID_BODY", "invalid request body"))?;

    let user = state
        .users
        .authenticate(&req.username, &req.password)
        .ok_or(AppError::InvalidCredentials)?;

    tracing::debug!(user_id = user.id, "login succeeded");

    // A signing failure is a server-side error, not a credential problem.
    let token = state
        .tokens
        .issue(&user.username)
        .map_err(|_| AppError::Internal)?;

    Ok(Json(LoginResponse { token }))
}

pub async fn protected(AuthCtxExtractor(ctx): AuthCtxExtractor) -> String {
    format!("Welcome, {}", ctx.subject)
}
