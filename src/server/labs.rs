use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::auth::{RequireAdmin, RequireAuth};
use crate::server::AppState;
use crate::server::dto::{LabNameRequest, TimetableResponse};
use crate::server::response::{ApiError, ApiResponse, StoreOptionExt};
use crate::server::validation::validate_lab_name;

pub async fn list_labs(_auth: RequireAuth, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let labs = state.store.list_labs()?;
    Ok::<_, ApiError>(Json(ApiResponse::success(labs)))
}

pub async fn create_lab(
    admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Json(req): Json<LabNameRequest>,
) -> impl IntoResponse {
    let name = req.name.trim();
    validate_lab_name(name)?;

    let lab = state.store.create_lab(name)?;
    tracing::info!("{} created lab {} ({})", admin.user.faculty_id, lab.name, lab.id);
    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(lab))))
}

pub async fn rename_lab(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<LabNameRequest>,
) -> impl IntoResponse {
    let name = req.name.trim();
    validate_lab_name(name)?;

    state.store.rename_lab(id, name)?;
    let lab = state.store.get_lab(id)?.or_not_found("Lab not found")?;
    Ok::<_, ApiError>(Json(ApiResponse::success(lab)))
}

pub async fn delete_lab(
    admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    if !state.store.delete_lab(id)? {
        return Err(ApiError::not_found("Lab not found"));
    }
    tracing::info!("{} deleted lab {}", admin.user.faculty_id, id);
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_timetable(
    _auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let slots = state.timetable.timetable(id)?;
    let lab = state.store.get_lab(id)?.or_not_found("Lab not found")?;
    let week_start = slots
        .iter()
        .map(|s| s.date)
        .min()
        .unwrap_or_else(|| state.timetable.today());

    Ok::<_, ApiError>(Json(ApiResponse::success(TimetableResponse {
        lab,
        week_start,
        slots,
    })))
}
