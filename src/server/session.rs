use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::Utc;

use crate::auth::{RequireAuth, TokenGenerator};
use crate::error::Error;
use crate::server::AppState;
use crate::server::dto::{LoginRequest, LoginResponse};
use crate::server::response::{ApiError, ApiResponse};

const MAX_TOKEN_RETRIES: u32 = 3;

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> impl IntoResponse {
    let generator = TokenGenerator::new();

    let user = state
        .store
        .get_user_by_faculty_id(req.faculty_id.trim())?
        .ok_or_else(|| ApiError::unauthorized("Invalid faculty id or password"))?;

    if !generator.verify(&req.password, &user.password_hash)? {
        tracing::warn!("Failed login for {}", user.faculty_id);
        return Err(ApiError::unauthorized("Invalid faculty id or password"));
    }

    let expires_at = state.session_ttl.map(|ttl| Utc::now() + ttl);

    for _ in 0..MAX_TOKEN_RETRIES {
        let (token, raw_token) = generator.issue(user.id, expires_at)?;

        match state.store.create_token(&token) {
            Ok(()) => {
                tracing::info!("{} logged in", user.faculty_id);
                return Ok((
                    StatusCode::CREATED,
                    Json(ApiResponse::success(LoginResponse {
                        token: raw_token,
                        expires_at,
                        user,
                    })),
                ));
            }
            Err(Error::TokenLookupCollision) => continue,
            Err(e) => return Err(e.into()),
        }
    }

    Err(ApiError::internal("Failed to create token after retries"))
}

pub async fn logout(auth: RequireAuth, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.store.delete_token(&auth.token.id)?;
    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}

pub async fn me(auth: RequireAuth) -> impl IntoResponse {
    Json(ApiResponse::success(auth.user))
}
