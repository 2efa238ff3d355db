use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::{Booking, BookingForm};
use crate::services::booking::today;
use crate::state::AppState;

// POST /api/book
pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    Json(form): Json<BookingForm>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let id = state.bookings.create_booking(&form, today())?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({"id": id, "message": "booking created"})),
    ))
}

// GET /api/bookings?phone=
#[derive(Deserialize)]
pub struct PhoneQuery {
    #[serde(default)]
    pub phone: String,
}

pub async fn get_bookings_by_phone(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PhoneQuery>,
) -> Result<Json<Vec<Booking>>, AppError> {
    let bookings = state.bookings.get_bookings_by_phone(&query.phone)?;
    Ok(Json(bookings))
}

// GET /api/bookings/:id
pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Booking>, AppError> {
    let booking = state.bookings.get_booking(id)?;
    Ok(Json(booking))
}

// PUT /api/bookings/:id/status
#[derive(Deserialize)]
pub struct StatusUpdate {
    #[serde(default)]
    pub status: String,
}

pub async fn update_booking_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(body): Json<StatusUpdate>,
) -> Result<Json<serde_json::Value>, AppError> {
    state.bookings.update_booking_status(id, &body.status)?;
    Ok(Json(serde_json::json!({"message": "booking status updated"})))
}
