use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::Booking;
use crate::services::auth::SessionSigner;
use crate::services::format::{format_date, format_phone};
use crate::services::validation;
use crate::state::AppState;

use super::bookings::StatusUpdate;

const SESSION_COOKIE: &str = "session";

/// Accepts the session token as a bearer token or as the `session` cookie.
fn check_auth(headers: &HeaderMap, sessions: &SessionSigner) -> Result<String, AppError> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    let cookie = || {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .find_map(|pair| {
                pair.trim()
                    .strip_prefix(SESSION_COOKIE)
                    .and_then(|rest| rest.strip_prefix('='))
            })
    };

    let token = bearer.or_else(cookie).ok_or(AppError::Unauthorized)?;
    sessions.verify(token, Utc::now())
}

// POST /api/admin/login
#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginRequest>,
) -> Result<Response, AppError> {
    let sessions = &state.sessions;
    let valid = sessions.credentials_match(&state.config.admin_username, &body.username)
        & sessions.credentials_match(&state.config.admin_password, &body.password);

    if !valid {
        tracing::warn!(username = %body.username, "admin login failed");
        return Err(AppError::Unauthorized);
    }

    let token = sessions.issue(&body.username, Utc::now())?;
    let cookie = format!(
        "{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Strict; Max-Age={}",
        sessions.ttl_seconds()
    );
    tracing::info!(username = %body.username, "admin logged in");

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(serde_json::json!({"token": token})),
    )
        .into_response())
}

// GET /api/admin/bookings
#[derive(Deserialize)]
pub struct BookingsQuery {
    pub date: Option<String>,
    pub status: Option<String>,
    pub phone: Option<String>,
    pub name: Option<String>,
}

#[derive(Serialize)]
pub struct AdminBooking {
    #[serde(flatten)]
    booking: Booking,
    phone_display: String,
    date_display: String,
}

impl From<Booking> for AdminBooking {
    fn from(booking: Booking) -> Self {
        Self {
            phone_display: format_phone(&booking.phone),
            date_display: format_date(booking.date),
            booking,
        }
    }
}

pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<BookingsQuery>,
) -> Result<Json<Vec<AdminBooking>>, AppError> {
    check_auth(&headers, &state.sessions)?;

    let filter = validation::parse_filter(
        query.date.as_deref(),
        query.status.as_deref(),
        query.phone.as_deref(),
        query.name.as_deref(),
    )?;

    let bookings = state.bookings.list_bookings(&filter)?;
    Ok(Json(bookings.into_iter().map(AdminBooking::from).collect()))
}

// PUT /api/admin/bookings/:id/status
pub async fn update_booking_status(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<StatusUpdate>,
) -> Result<Json<serde_json::Value>, AppError> {
    let admin = check_auth(&headers, &state.sessions)?;

    state.bookings.update_booking_status(id, &body.status)?;
    tracing::info!(id, admin = %admin, "status changed from admin panel");

    Ok(Json(serde_json::json!({"message": "booking status updated"})))
}
