use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};

use crate::auth::RequireAuth;
use crate::server::AppState;
use crate::server::dto::{BookingRequest, ReleaseRequest};
use crate::server::response::{ApiError, ApiResponse};
use crate::server::validation::{parse_date, validate_class_info};

/// Books a slot for the calling faculty.
pub async fn book(
    auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Json(req): Json<BookingRequest>,
) -> impl IntoResponse {
    let date = parse_date(&req.date)?;
    validate_class_info(req.class_info.as_deref())?;

    let booking = state
        .timetable
        .book(req.slot_id, date, &auth.user, req.class_info.as_deref())?;
    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(booking))))
}

pub async fn release(
    auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Json(req): Json<ReleaseRequest>,
) -> impl IntoResponse {
    let date = parse_date(&req.date)?;

    let booking = state.timetable.release(req.slot_id, date, &auth.user)?;
    Ok::<_, ApiError>(Json(ApiResponse::success(booking)))
}
