pub mod admin;
pub mod bookings;
pub mod health;

use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::Router;

use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/book", post(bookings::create_booking))
        .route("/api/bookings", get(bookings::get_bookings_by_phone))
        .route("/api/bookings/:id", get(bookings::get_booking))
        .route(
            "/api/bookings/:id/status",
            put(bookings::update_booking_status),
        )
        .route("/api/admin/login", post(admin::login))
        .route("/api/admin/bookings", get(admin::list_bookings))
        .route(
            "/api/admin/bookings/:id/status",
            put(admin::update_booking_status),
        )
        .with_state(state)
}
