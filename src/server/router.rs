use std::sync::Arc;
use std::time::Instant;

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::{
    Router,
    routing::{get, patch, post, put},
};
use chrono::Duration;
use mockable::Clock;
use tower::ServiceBuilder;

use super::{bookings, labs, session, slots, users, weekend};
use crate::store::Store;
use crate::timetable::TimetableService;

pub struct AppState {
    pub store: Arc<dyn Store>,
    pub timetable: TimetableService,
    /// Lifetime of tokens issued at login. `None` means they never expire.
    pub session_ttl: Option<Duration>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, clock: Arc<dyn Clock>, session_ttl_hours: Option<i64>) -> Self {
        Self {
            timetable: TimetableService::new(store.clone(), clock),
            store,
            session_ttl: session_ttl_hours.map(Duration::hours),
        }
    }
}

async fn health() -> &'static str {
    "OK"
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let response = next.run(request).await;

    let latency = start.elapsed();
    let status = response.status();

    tracing::info!(
        "{} {} {} {}ms",
        method,
        uri.path(),
        status.as_u16(),
        latency.as_millis()
    );

    response
}

pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        // Session routes
        .route("/auth/login", post(session::login))
        .route("/auth/logout", post(session::logout))
        .route("/me", get(session::me))
        // User routes (admin)
        .route("/users", get(users::list_users).post(users::create_user))
        .route(
            "/users/{id}",
            patch(users::update_user).delete(users::delete_user),
        )
        // Lab routes
        .route("/labs", get(labs::list_labs).post(labs::create_lab))
        .route(
            "/labs/{id}",
            patch(labs::rename_lab).delete(labs::delete_lab),
        )
        .route("/labs/{id}/timetable", get(labs::get_timetable))
        .route("/labs/{id}/weekend", get(weekend::get_lab_weekend))
        // Weekend configuration
        .route("/weekend/global", get(weekend::get_global_weekend))
        .route("/weekend/defaults", put(weekend::set_default))
        .route("/weekend/overrides", put(weekend::set_override))
        // Booking guard
        .route("/bookings", post(bookings::book))
        .route("/bookings/release", post(bookings::release))
        .route("/slots/{id}/status", put(slots::set_status))
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api_router())
        .layer(ServiceBuilder::new().layer(middleware::from_fn(log_request)))
        .with_state(state)
}
