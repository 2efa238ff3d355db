use std::sync::Arc;

use chrono::{NaiveDate, Utc};

use crate::db::BookingRepository;
use crate::errors::{AppError, ValidationError};
use crate::models::{Booking, BookingFilter, BookingForm};
use crate::services::validation;

/// The calendar day submissions are judged against.
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Entry points the HTTP layer calls. Validation always happens before the
/// repository is touched.
#[derive(Clone)]
pub struct BookingService {
    repo: Arc<dyn BookingRepository>,
}

impl BookingService {
    pub fn new(repo: Arc<dyn BookingRepository>) -> Self {
        Self { repo }
    }

    pub fn create_booking(&self, form: &BookingForm, today: NaiveDate) -> Result<i64, AppError> {
        let booking = validation::validate_booking(form, today).inspect_err(|e| {
            tracing::info!(reason = %e, "booking rejected");
        })?;

        match self.repo.create(&booking) {
            Ok(id) => {
                tracing::info!(id, date = %booking.date, guests = booking.guests, "booking created");
                Ok(id)
            }
            Err(e) => {
                tracing::warn!(error = %e, kind = e.kind(), "failed to create booking");
                Err(e)
            }
        }
    }

    pub fn get_bookings_by_phone(&self, raw_phone: &str) -> Result<Vec<Booking>, AppError> {
        if raw_phone.trim().is_empty() {
            return Err(ValidationError::MissingPhone.into());
        }
        let phone = validation::normalize_phone(raw_phone)?;

        let bookings = self.repo.get_by_phone(&phone)?;
        tracing::info!(count = bookings.len(), "bookings found for phone");
        Ok(bookings)
    }

    pub fn update_booking_status(&self, id: i64, raw_status: &str) -> Result<(), AppError> {
        let status = validation::parse_status(raw_status)?;

        self.repo.update_status(id, status).inspect_err(|e| {
            tracing::warn!(id, error = %e, "failed to update booking status");
        })?;

        tracing::info!(id, status = status.as_str(), "booking status updated");
        Ok(())
    }

    pub fn list_bookings(&self, filter: &BookingFilter) -> Result<Vec<Booking>, AppError> {
        if *filter == BookingFilter::default() {
            return self.all_bookings();
        }
        self.repo.list_filtered(filter)
    }

    pub fn all_bookings(&self) -> Result<Vec<Booking>, AppError> {
        self.repo.list()
    }

    pub fn get_booking(&self, id: i64) -> Result<Booking, AppError> {
        self.repo.get_by_id(id)
    }
}
