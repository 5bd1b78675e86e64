use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};

use crate::auth::RequireAdmin;
use crate::server::AppState;
use crate::server::dto::{SlotStatusRequest, SlotStatusResponse};
use crate::server::response::{ApiError, ApiResponse};
use crate::server::validation::{parse_status, validate_class_info};

/// Marks a template slot Regular or Free.
pub async fn set_status(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<SlotStatusRequest>,
) -> impl IntoResponse {
    let status = parse_status(&req.status)?;
    validate_class_info(req.class_info.as_deref())?;

    let (slot, evicted_bookings) =
        state
            .timetable
            .set_slot_status(id, status, req.class_info.as_deref())?;
    Ok::<_, ApiError>(Json(ApiResponse::success(SlotStatusResponse {
        slot,
        evicted_bookings,
    })))
}
