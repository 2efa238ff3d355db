use std::sync::{Mutex, MutexGuard, PoisonError};

use rusqlite::{Connection, ErrorCode, TransactionBehavior};

use crate::db::queries;
use crate::errors::{AppError, ConflictError};
use crate::models::{Booking, BookingFilter, BookingStatus, NewBooking};

/// Storage for bookings. Implementations enforce the phone/date and
/// phone/name invariants atomically with the write.
pub trait BookingRepository: Send + Sync {
    fn create(&self, booking: &NewBooking) -> Result<i64, AppError>;

    fn get_by_id(&self, id: i64) -> Result<Booking, AppError>;

    /// Newest first: `(date desc, time desc)`.
    fn get_by_phone(&self, phone: &str) -> Result<Vec<Booking>, AppError>;

    fn list(&self) -> Result<Vec<Booking>, AppError>;

    fn list_filtered(&self, filter: &BookingFilter) -> Result<Vec<Booking>, AppError>;

    fn update_status(&self, id: i64, status: BookingStatus) -> Result<(), AppError>;
}

pub struct SqliteBookingRepository {
    conn: Mutex<Connection>,
}

impl SqliteBookingRepository {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        // a panic mid-transaction rolls back on drop, so the connection is still usable
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == ErrorCode::ConstraintViolation
                && e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

impl BookingRepository for SqliteBookingRepository {
    fn create(&self, booking: &NewBooking) -> Result<i64, AppError> {
        let mut conn = self.conn();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        if queries::find_active_booking(&tx, &booking.phone, booking.date, None)?.is_some() {
            return Err(ConflictError::DateAlreadyBooked.into());
        }

        if let Some(name) = queries::find_name_for_phone(&tx, &booking.phone)? {
            if name != booking.name {
                return Err(ConflictError::PhoneNameMismatch.into());
            }
        }

        let id = queries::insert_booking(&tx, booking).map_err(|e| {
            if is_unique_violation(&e) {
                AppError::from(ConflictError::DateAlreadyBooked)
            } else {
                AppError::from(e)
            }
        })?;

        tx.commit()?;
        Ok(id)
    }

    fn get_by_id(&self, id: i64) -> Result<Booking, AppError> {
        queries::get_booking_by_id(&self.conn(), id)?.ok_or_else(|| AppError::booking_not_found(id))
    }

    fn get_by_phone(&self, phone: &str) -> Result<Vec<Booking>, AppError> {
        Ok(queries::get_bookings_for_phone(&self.conn(), phone)?)
    }

    fn list(&self) -> Result<Vec<Booking>, AppError> {
        Ok(queries::get_all_bookings(&self.conn())?)
    }

    fn list_filtered(&self, filter: &BookingFilter) -> Result<Vec<Booking>, AppError> {
        Ok(queries::get_filtered_bookings(&self.conn(), filter)?)
    }

    fn update_status(&self, id: i64, status: BookingStatus) -> Result<(), AppError> {
        let mut conn = self.conn();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let existing = queries::get_booking_by_id(&tx, id)?.ok_or_else(|| AppError::booking_not_found(id))?;

        // reactivating a cancelled booking must not collide with a newer active one
        if status.is_active()
            && !existing.is_active()
            && queries::find_active_booking(&tx, &existing.phone, existing.date, Some(id))?.is_some()
        {
            return Err(ConflictError::DateAlreadyBooked.into());
        }

        if !queries::update_booking_status(&tx, id, status)? {
            return Err(AppError::booking_not_found(id));
        }

        tx.commit()?;
        Ok(())
    }
}
