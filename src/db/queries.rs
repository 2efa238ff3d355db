use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rusqlite::types::{ToSql, Type};
use rusqlite::{params, Connection, OptionalExtension};

use crate::models::{Booking, BookingFilter, BookingStatus, NewBooking};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";

const BOOKING_COLUMNS: &str =
    "id, name, phone, booking_date, booking_time, guests, comments, status, created_at, updated_at";
const BOOKING_ORDER: &str = "ORDER BY booking_date DESC, booking_time DESC, id DESC";

fn now() -> String {
    Utc::now().naive_utc().format(TIMESTAMP_FORMAT).to_string()
}

// ── Writes ──

pub fn insert_booking(conn: &Connection, booking: &NewBooking) -> rusqlite::Result<i64> {
    let now = now();
    conn.execute(
        "INSERT INTO bookings (name, phone, booking_date, booking_time, guests, comments, status, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
        params![
            booking.name,
            booking.phone,
            booking.date.format(DATE_FORMAT).to_string(),
            booking.time.format(TIME_FORMAT).to_string(),
            booking.guests,
            booking.comments,
            booking.status.as_str(),
            now,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn update_booking_status(
    conn: &Connection,
    id: i64,
    status: BookingStatus,
) -> rusqlite::Result<bool> {
    let count = conn.execute(
        "UPDATE bookings SET status = ?1, updated_at = ?2 WHERE id = ?3",
        params![status.as_str(), now(), id],
    )?;
    Ok(count > 0)
}

// ── Invariant lookups ──

/// Id of an active booking holding `(phone, date)`, ignoring `except_id`.
pub fn find_active_booking(
    conn: &Connection,
    phone: &str,
    date: NaiveDate,
    except_id: Option<i64>,
) -> rusqlite::Result<Option<i64>> {
    conn.query_row(
        "SELECT id FROM bookings
         WHERE phone = ?1 AND booking_date = ?2 AND status != 'cancelled' AND id != ?3
         LIMIT 1",
        params![phone, date.format(DATE_FORMAT).to_string(), except_id.unwrap_or(0)],
        |row| row.get(0),
    )
    .optional()
}

/// The name a phone was first booked under, if it was ever used.
pub fn find_name_for_phone(conn: &Connection, phone: &str) -> rusqlite::Result<Option<String>> {
    conn.query_row(
        "SELECT name FROM bookings WHERE phone = ?1 ORDER BY id ASC LIMIT 1",
        params![phone],
        |row| row.get(0),
    )
    .optional()
}

// ── Reads ──

pub fn get_booking_by_id(conn: &Connection, id: i64) -> rusqlite::Result<Option<Booking>> {
    conn.query_row(
        &format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = ?1"),
        params![id],
        parse_booking_row,
    )
    .optional()
}

pub fn get_bookings_for_phone(conn: &Connection, phone: &str) -> rusqlite::Result<Vec<Booking>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings WHERE phone = ?1 {BOOKING_ORDER}"
    ))?;
    let rows = stmt.query_map(params![phone], parse_booking_row)?;
    rows.collect()
}

pub fn get_all_bookings(conn: &Connection) -> rusqlite::Result<Vec<Booking>> {
    let mut stmt = conn.prepare(&format!("SELECT {BOOKING_COLUMNS} FROM bookings {BOOKING_ORDER}"))?;
    let rows = stmt.query_map([], parse_booking_row)?;
    rows.collect()
}

/// Date, status and phone narrow the query in SQL; the name match runs in
/// Rust because SQLite's `LOWER` only folds ASCII.
pub fn get_filtered_bookings(
    conn: &Connection,
    filter: &BookingFilter,
) -> rusqlite::Result<Vec<Booking>> {
    let mut clauses: Vec<String> = vec![];
    let mut params_vec: Vec<Box<dyn ToSql>> = vec![];

    if let Some(date) = filter.date {
        params_vec.push(Box::new(date.format(DATE_FORMAT).to_string()));
        clauses.push(format!("booking_date = ?{}", params_vec.len()));
    }
    if let Some(status) = filter.status {
        params_vec.push(Box::new(status.as_str()));
        clauses.push(format!("status = ?{}", params_vec.len()));
    }
    if let Some(phone) = &filter.phone {
        params_vec.push(Box::new(phone.clone()));
        clauses.push(format!("instr(phone, ?{}) > 0", params_vec.len()));
    }

    let where_sql = if clauses.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", clauses.join(" AND "))
    };

    let mut stmt = conn.prepare(&format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings {where_sql} {BOOKING_ORDER}"
    ))?;
    let params_refs: Vec<&dyn ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
    let rows = stmt.query_map(params_refs.as_slice(), parse_booking_row)?;

    let mut bookings = vec![];
    for row in rows {
        let booking = row?;
        if filter.matches(&booking) {
            bookings.push(booking);
        }
    }
    Ok(bookings)
}

fn parse_booking_row(row: &rusqlite::Row) -> rusqlite::Result<Booking> {
    let date_str: String = row.get(3)?;
    let time_str: String = row.get(4)?;
    let status_str: String = row.get(7)?;
    let created_at_str: String = row.get(8)?;
    let updated_at_str: String = row.get(9)?;

    let date = NaiveDate::parse_from_str(&date_str, DATE_FORMAT)
        .map_err(|e| conversion_error(3, e))?;
    let time = NaiveTime::parse_from_str(&time_str, TIME_FORMAT)
        .map_err(|e| conversion_error(4, e))?;
    let status = BookingStatus::parse(&status_str)
        .ok_or_else(|| conversion_error(7, format!("unknown status: {status_str}")))?;
    let created_at = NaiveDateTime::parse_from_str(&created_at_str, TIMESTAMP_FORMAT)
        .map_err(|e| conversion_error(8, e))?;
    let updated_at = NaiveDateTime::parse_from_str(&updated_at_str, TIMESTAMP_FORMAT)
        .map_err(|e| conversion_error(9, e))?;

    Ok(Booking {
        id: row.get(0)?,
        name: row.get(1)?,
        phone: row.get(2)?,
        date,
        time,
        guests: row.get(5)?,
        comments: row.get::<_, Option<String>>(6)?.unwrap_or_default(),
        status,
        created_at,
        updated_at,
    })
}

fn conversion_error(
    idx: usize,
    err: impl Into<Box<dyn std::error::Error + Send + Sync>>,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, err.into())
}
