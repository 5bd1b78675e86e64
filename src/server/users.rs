use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::auth::{RequireAdmin, TokenGenerator};
use crate::server::AppState;
use crate::server::dto::{CreateUserRequest, UpdateUserRequest};
use crate::server::response::{ApiError, ApiResponse, StoreOptionExt};
use crate::server::validation::{validate_faculty_id, validate_password, validate_user_name};

pub async fn list_users(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let users = state.store.list_users()?;
    Ok::<_, ApiError>(Json(ApiResponse::success(users)))
}

pub async fn create_user(
    admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateUserRequest>,
) -> impl IntoResponse {
    let name = req.name.trim();
    let faculty_id = req.faculty_id.trim();
    validate_user_name(name)?;
    validate_faculty_id(faculty_id)?;
    validate_password(&req.password)?;

    let hash = TokenGenerator::new().hash(&req.password)?;
    let user = state
        .store
        .create_user(name, faculty_id, &hash, req.is_admin)?;

    tracing::info!(
        "{} created user {} (admin: {})",
        admin.user.faculty_id,
        user.faculty_id,
        user.is_admin
    );
    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(user))))
}

pub async fn update_user(
    admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateUserRequest>,
) -> impl IntoResponse {
    let mut user = state.store.get_user(id)?.or_not_found("User not found")?;

    if let Some(name) = req.name.as_deref() {
        validate_user_name(name.trim())?;
        user.name = name.trim().to_string();
    }
    if let Some(password) = req.password.as_deref() {
        validate_password(password)?;
        user.password_hash = TokenGenerator::new().hash(password)?;
    }
    if let Some(is_admin) = req.is_admin {
        if user.is_admin && !is_admin {
            if user.id == admin.user.id {
                return Err(ApiError::bad_request("Cannot remove your own admin rights"));
            }
            if state.store.count_admins()? <= 1 {
                return Err(ApiError::bad_request("Cannot demote the last admin"));
            }
        }
        user.is_admin = is_admin;
    }

    state.store.update_user(&user)?;
    Ok::<_, ApiError>(Json(ApiResponse::success(user)))
}

pub async fn delete_user(
    admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let user = state.store.get_user(id)?.or_not_found("User not found")?;

    if user.id == admin.user.id {
        return Err(ApiError::bad_request("Cannot delete yourself"));
    }
    if user.is_admin && state.store.count_admins()? <= 1 {
        return Err(ApiError::bad_request("Cannot delete the last admin"));
    }

    state.store.delete_user(user.id)?;
    tracing::info!("{} deleted user {}", admin.user.faculty_id, user.faculty_id);
    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}
