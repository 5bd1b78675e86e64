use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};

use crate::auth::{RequireAdmin, RequireAuth};
use crate::server::AppState;
use crate::server::dto::{WeekendDefaultRequest, WeekendOverrideRequest};
use crate::server::response::{ApiError, ApiResponse};
use crate::server::validation::{
    parse_day, parse_scope, parse_weekend_day, validate_class_info,
};

pub async fn get_lab_weekend(
    _auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let config = state.timetable.weekend_config(id)?;
    Ok::<_, ApiError>(Json(ApiResponse::success(config)))
}

pub async fn get_global_weekend(
    _auth: RequireAuth,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let defaults = state.timetable.global_weekend_defaults()?;
    Ok::<_, ApiError>(Json(ApiResponse::success(defaults)))
}

pub async fn set_default(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Json(req): Json<WeekendDefaultRequest>,
) -> impl IntoResponse {
    let day = parse_weekend_day(&req.day)?;
    validate_class_info(req.text.as_deref())?;
    let scope = parse_scope(req.lab_id.as_ref())?;

    let default = state
        .timetable
        .set_weekend_default(scope, day, req.text.as_deref())?;
    Ok::<_, ApiError>(Json(ApiResponse::success(default)))
}

pub async fn set_override(
    admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Json(req): Json<WeekendOverrideRequest>,
) -> impl IntoResponse {
    let day = parse_weekend_day(&req.day)?;
    let source = req.source_day.as_deref().map(parse_day).transpose()?;

    let update = state
        .timetable
        .set_weekend_override(req.lab_id, day, source, Some(admin.user.id))?;
    Ok::<_, ApiError>(Json(ApiResponse::success(update)))
}
