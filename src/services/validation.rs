use chrono::{NaiveDate, NaiveTime};

use crate::errors::ValidationError;
use crate::models::{BookingFilter, BookingForm, BookingStatus, NewBooking};

const PHONE_DIGITS: usize = 11;
const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";

/// Normalizes a raw submission into a storable booking. No I/O; `today` is
/// the calendar day the submission is judged against.
pub fn validate_booking(form: &BookingForm, today: NaiveDate) -> Result<NewBooking, ValidationError> {
    for (field, value) in [
        ("name", &form.name),
        ("phone", &form.phone),
        ("date", &form.date),
        ("time", &form.time),
        ("guests", &form.guests),
    ] {
        if value.trim().is_empty() {
            return Err(ValidationError::MissingField { field });
        }
    }

    let phone = normalize_phone(&form.phone)?;

    let date = parse_date(&form.date)?;
    if date < today {
        return Err(ValidationError::DateInPast);
    }

    let time = parse_time(&form.time)?;
    let guests = parse_guests(&form.guests)?;

    Ok(NewBooking {
        name: form.name.clone(),
        phone,
        date,
        time,
        guests,
        comments: form.comments.clone(),
        status: BookingStatus::Pending,
    })
}

/// Keeps the digits, requires 11 of them starting with 7 or 8, and rewrites a
/// leading 8 to 7.
pub fn normalize_phone(raw: &str) -> Result<String, ValidationError> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();

    if digits.len() != PHONE_DIGITS {
        return Err(ValidationError::InvalidPhoneLength);
    }

    match digits.as_bytes()[0] {
        b'7' => Ok(digits),
        b'8' => Ok(format!("7{}", &digits[1..])),
        _ => Err(ValidationError::InvalidPhonePrefix),
    }
}

/// True when `raw` has exactly the byte shape of `pattern`, where `9` stands
/// for any ASCII digit and every other byte must match literally.
fn has_shape(raw: &str, pattern: &str) -> bool {
    raw.len() == pattern.len()
        && raw.bytes().zip(pattern.bytes()).all(|(b, p)| match p {
            b'9' => b.is_ascii_digit(),
            _ => b == p,
        })
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    // chrono skips padding and accepts signs; the wire format is fixed-width
    if !has_shape(raw, "9999-99-99") {
        return Err(ValidationError::InvalidDateFormat);
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| ValidationError::InvalidDateFormat)
}

/// Accepts `HH:MM`, truncating anything longer (`18:30:00` -> `18:30`).
pub fn parse_time(raw: &str) -> Result<NaiveTime, ValidationError> {
    let hhmm = raw.get(..5).ok_or(ValidationError::InvalidTimeFormat)?;
    if !has_shape(hhmm, "99:99") {
        return Err(ValidationError::InvalidTimeFormat);
    }
    NaiveTime::parse_from_str(hhmm, TIME_FORMAT).map_err(|_| ValidationError::InvalidTimeFormat)
}

pub fn parse_guests(raw: &str) -> Result<u32, ValidationError> {
    match raw.trim().parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ValidationError::InvalidGuestCount),
    }
}

pub fn parse_status(raw: &str) -> Result<BookingStatus, ValidationError> {
    BookingStatus::parse(raw.trim()).ok_or(ValidationError::InvalidStatus)
}

/// Builds a listing filter from query-string values. Empty values mean "no filter".
pub fn parse_filter(
    date: Option<&str>,
    status: Option<&str>,
    phone: Option<&str>,
    name: Option<&str>,
) -> Result<BookingFilter, ValidationError> {
    fn present(v: Option<&str>) -> Option<&str> {
        v.map(str::trim).filter(|v| !v.is_empty())
    }

    let date = present(date).map(parse_date).transpose()?;
    let status = present(status).map(parse_status).transpose()?;
    let phone = present(phone)
        .map(|p| p.chars().filter(|c| c.is_ascii_digit()).collect::<String>())
        .filter(|p| !p.is_empty());
    let name = present(name).map(str::to_string);

    Ok(BookingFilter {
        date,
        status,
        phone,
        name,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, 20).unwrap()
    }

    fn form(phone: &str, date: &str, time: &str, guests: &str) -> BookingForm {
        BookingForm {
            name: "Anna".to_string(),
            phone: phone.to_string(),
            date: date.to_string(),
            time: time.to_string(),
            guests: guests.to_string(),
            comments: String::new(),
        }
    }

    #[test]
    fn test_scenario_normalizes_phone_and_time() {
        let booking = validate_booking(&form("8-999-123-45-67", "2025-05-21", "18:30:00", "4"), today()).unwrap();
        assert_eq!(booking.phone, "79991234567");
        assert_eq!(booking.time, NaiveTime::from_hms_opt(18, 30, 0).unwrap());
        assert_eq!(booking.guests, 4);
        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.comments, "");
    }

    #[test]
    fn test_missing_fields() {
        let mut f = form("79991234567", "2025-05-21", "18:30", "2");
        f.name = "  ".to_string();
        assert_eq!(
            validate_booking(&f, today()),
            Err(ValidationError::MissingField { field: "name" })
        );

        let f = form("79991234567", "2025-05-21", "18:30", "");
        assert_eq!(
            validate_booking(&f, today()),
            Err(ValidationError::MissingField { field: "guests" })
        );
    }

    #[test]
    fn test_leading_eight_rewritten() {
        for raw in ["89990001234", "+8 (999) 000-12-34", "8 999 000 12 34"] {
            let phone = normalize_phone(raw).unwrap();
            assert_eq!(phone, "79990001234");
            let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
            assert_eq!(&phone[1..], &digits[1..]);
        }
    }

    #[test]
    fn test_phone_length_checked_before_other_fields() {
        for raw in ["7999000123", "799900012345", "abc", "+7"] {
            assert_eq!(normalize_phone(raw), Err(ValidationError::InvalidPhoneLength));
            assert_eq!(
                validate_booking(&form(raw, "garbage", "garbage", "-1"), today()),
                Err(ValidationError::InvalidPhoneLength)
            );
        }
    }

    #[test]
    fn test_phone_prefix() {
        assert_eq!(normalize_phone("+1 999 000 12 34"), Err(ValidationError::InvalidPhonePrefix));
        assert_eq!(normalize_phone("9990001234 5"), Err(ValidationError::InvalidPhonePrefix));
        assert_eq!(normalize_phone("+7 (999) 000-12-34").unwrap(), "79990001234");
    }

    #[test]
    fn test_date_rules() {
        assert_eq!(parse_date("2025-6-1"), Err(ValidationError::InvalidDateFormat));
        assert_eq!(parse_date("01.06.2025"), Err(ValidationError::InvalidDateFormat));
        assert_eq!(parse_date("2025-02-30"), Err(ValidationError::InvalidDateFormat));
        for padded in ["2025- 6-01", "2025-06- 1", "+2025-6-01", " 2025-6-1", "2025/06/01"] {
            assert_eq!(parse_date(padded), Err(ValidationError::InvalidDateFormat), "{padded}");
        }
        assert_eq!(parse_date("2025-06-01").unwrap(), NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());

        let past = form("79991234567", "2025-05-19", "18:30", "2");
        assert_eq!(validate_booking(&past, today()), Err(ValidationError::DateInPast));

        let same_day = form("79991234567", "2025-05-20", "00:00", "2");
        assert!(validate_booking(&same_day, today()).is_ok());
    }

    #[test]
    fn test_time_rules() {
        assert_eq!(parse_time("09:05").unwrap(), NaiveTime::from_hms_opt(9, 5, 0).unwrap());
        assert_eq!(parse_time("23:59:59.123").unwrap(), NaiveTime::from_hms_opt(23, 59, 0).unwrap());
        assert_eq!(parse_time("9:05"), Err(ValidationError::InvalidTimeFormat));
        assert_eq!(parse_time("24:00"), Err(ValidationError::InvalidTimeFormat));
        assert_eq!(parse_time("12-30"), Err(ValidationError::InvalidTimeFormat));
        assert_eq!(parse_time("ч:мм"), Err(ValidationError::InvalidTimeFormat));
        for padded in [" 9:05", "18: 5", "+9:05", "18:+5", " 9:05:00"] {
            assert_eq!(parse_time(padded), Err(ValidationError::InvalidTimeFormat), "{padded}");
        }
    }

    #[test]
    fn test_guest_count() {
        assert_eq!(parse_guests("12"), Ok(12));
        assert_eq!(parse_guests("0"), Err(ValidationError::InvalidGuestCount));
        assert_eq!(parse_guests("-2"), Err(ValidationError::InvalidGuestCount));
        assert_eq!(parse_guests("two"), Err(ValidationError::InvalidGuestCount));
    }

    #[test]
    fn test_parse_filter() {
        let filter = parse_filter(Some(""), Some("pending"), Some("+7 999"), Some(" Ann ")).unwrap();
        assert_eq!(filter.date, None);
        assert_eq!(filter.status, Some(BookingStatus::Pending));
        assert_eq!(filter.phone.as_deref(), Some("7999"));
        assert_eq!(filter.name.as_deref(), Some("Ann"));

        assert_eq!(
            parse_filter(None, Some("done"), None, None),
            Err(ValidationError::InvalidStatus)
        );
        assert_eq!(
            parse_filter(Some("tomorrow"), None, None, None),
            Err(ValidationError::InvalidDateFormat)
        );
    }
}
