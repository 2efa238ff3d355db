use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Booking {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub time: NaiveTime,
    pub guests: u32,
    /// Free text; an empty string when the guest left none.
    pub comments: String,
    pub status: BookingStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Booking {
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(BookingStatus::Pending),
            "confirmed" => Some(BookingStatus::Confirmed),
            "cancelled" => Some(BookingStatus::Cancelled),
            _ => None,
        }
    }

    /// Anything but `cancelled` holds the (phone, date) slot.
    pub fn is_active(&self) -> bool {
        *self != BookingStatus::Cancelled
    }
}

/// A validated booking that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBooking {
    pub name: String,
    pub phone: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub guests: u32,
    pub comments: String,
    pub status: BookingStatus,
}

/// Raw submission fields exactly as the client sent them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookingForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time: String,
    #[serde(default, deserialize_with = "text_or_number")]
    pub guests: String,
    #[serde(default)]
    pub comments: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookingFilter {
    pub date: Option<NaiveDate>,
    pub status: Option<BookingStatus>,
    /// Digits only; matched as a substring of the stored phone.
    pub phone: Option<String>,
    /// Matched case-insensitively as a substring of the guest name.
    pub name: Option<String>,
}

impl BookingFilter {
    pub fn matches(&self, booking: &Booking) -> bool {
        if self.date.is_some_and(|d| d != booking.date) {
            return false;
        }
        if self.status.is_some_and(|s| s != booking.status) {
            return false;
        }
        if let Some(phone) = &self.phone {
            if !booking.phone.contains(phone.as_str()) {
                return false;
            }
        }
        if let Some(name) = &self.name {
            if !booking.name.to_lowercase().contains(&name.to_lowercase()) {
                return false;
            }
        }
        true
    }
}

fn text_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(i64),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Text(s)) => s,
        Some(Raw::Number(n)) => n.to_string(),
        None => String::new(),
    })
}

/// Times travel as `HH:MM`, never with seconds.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let s = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&s, FORMAT).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn booking(name: &str, phone: &str, date: &str, status: BookingStatus) -> Booking {
        let ts = NaiveDateTime::parse_from_str("2025-05-01 10:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
        Booking {
            id: 1,
            name: name.to_string(),
            phone: phone.to_string(),
            date: date.parse().unwrap(),
            time: NaiveTime::from_hms_opt(19, 0, 0).unwrap(),
            guests: 2,
            comments: String::new(),
            status,
            created_at: ts,
            updated_at: ts,
        }
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(BookingStatus::parse("confirmed"), Some(BookingStatus::Confirmed));
        assert_eq!(BookingStatus::parse("Confirmed"), None);
        assert_eq!(BookingStatus::parse(""), None);
        assert!(!BookingStatus::Cancelled.is_active());
        assert!(BookingStatus::Pending.is_active());
    }

    #[test]
    fn test_booking_serializes_short_time() {
        let b = booking("Anna", "79991234567", "2025-06-01", BookingStatus::Pending);
        let json = serde_json::to_value(&b).unwrap();
        assert_eq!(json["time"], "19:00");
        assert_eq!(json["date"], "2025-06-01");
        assert_eq!(json["status"], "pending");
    }

    #[test]
    fn test_form_accepts_numeric_guests() {
        let form: BookingForm = serde_json::from_str(
            r#"{"name":"Anna","phone":"8-999-123-45-67","date":"2025-06-01","time":"18:30","guests":4}"#,
        )
        .unwrap();
        assert_eq!(form.guests, "4");
        assert_eq!(form.comments, "");

        let form: BookingForm = serde_json::from_str(r#"{"guests":"3"}"#).unwrap();
        assert_eq!(form.guests, "3");
        assert_eq!(form.name, "");
    }

    #[test]
    fn test_filter_combines_with_and() {
        let b = booking("Анна Иванова", "79991234567", "2025-06-01", BookingStatus::Pending);

        assert!(BookingFilter::default().matches(&b));

        let filter = BookingFilter {
            status: Some(BookingStatus::Pending),
            name: Some("анна".to_string()),
            phone: Some("1234".to_string()),
            ..Default::default()
        };
        assert!(filter.matches(&b));

        let filter = BookingFilter {
            date: Some("2025-06-02".parse().unwrap()),
            ..filter
        };
        assert!(!filter.matches(&b));
    }
}
