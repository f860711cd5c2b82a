// Booking entity and the inputs used to create or change one

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize};

const CONFIRMATION_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

fn default_guest_count() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub room_number: String,
    pub guest_name: String,
    #[serde(default)]
    pub guest_email: Option<String>,
    #[serde(default)]
    pub guest_phone: Option<String>,
    #[serde(default = "default_guest_count")]
    pub guest_count: u32,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub cost: f64,
    pub confirmation_number: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub checked_in: bool,
    #[serde(default)]
    pub checked_out: bool,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub check_in_time: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub check_out_time: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    // Set once the room this stay belonged to has been deleted
    #[serde(default, skip_serializing_if = "is_false")]
    pub room_retired: bool,
}

fn is_false(flag: &bool) -> bool {
    !*flag
}

// RFC 3339, or a naive ISO-8601 string (no offset) read as UTC
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            s.parse::<NaiveDateTime>()
                .ok()
                .map(|naive| Utc.from_utc_datetime(&naive))
        })
}

pub(crate) fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => parse_timestamp(text)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp {:?}", text))),
    }
}

// Where a booking is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BookingStage {
    Booked,
    CheckedIn,
    CheckedOut,
}

impl BookingStage {
    pub fn label(&self) -> &'static str {
        match self {
            BookingStage::Booked => "Booked",
            BookingStage::CheckedIn => "Checked In",
            BookingStage::CheckedOut => "Checked Out",
        }
    }
}

impl Booking {
    pub fn is_active(&self) -> bool {
        !self.checked_out
    }

    pub fn stage(&self) -> BookingStage {
        if self.checked_out {
            BookingStage::CheckedOut
        } else if self.checked_in {
            BookingStage::CheckedIn
        } else {
            BookingStage::Booked
        }
    }

    pub fn nights(&self) -> i64 {
        crate::pricing::nights(self.check_in, self.check_out)
    }
}

// Everything a guest supplies when reserving a room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub guest_name: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    #[serde(default)]
    pub guest_email: Option<String>,
    #[serde(default)]
    pub guest_phone: Option<String>,
    #[serde(default)]
    pub guest_count: Option<u32>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl BookingRequest {
    pub fn new(guest_name: impl Into<String>, check_in: NaiveDate, check_out: NaiveDate) -> Self {
        Self {
            guest_name: guest_name.into(),
            check_in,
            check_out,
            guest_email: None,
            guest_phone: None,
            guest_count: None,
            notes: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.guest_email = Some(email.into());
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.guest_phone = Some(phone.into());
        self
    }

    pub fn with_guest_count(mut self, count: u32) -> Self {
        self.guest_count = Some(count);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

// Partial update of an active booking; None leaves the field untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingChanges {
    #[serde(default)]
    pub check_out: Option<NaiveDate>,
    #[serde(default)]
    pub guest_count: Option<u32>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub guest_email: Option<String>,
    #[serde(default)]
    pub guest_phone: Option<String>,
}

// Returned to the caller of a successful booking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingConfirmation {
    pub room_number: String,
    pub confirmation_number: String,
    pub cost: f64,
    pub nights: i64,
}

pub fn generate_confirmation_number<R: Rng + ?Sized>(rng: &mut R, length: usize) -> String {
    (0..length)
        .map(|_| CONFIRMATION_CHARSET[rng.gen_range(0..CONFIRMATION_CHARSET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Booking {
        Booking {
            room_number: "101".into(),
            guest_name: "Alice".into(),
            guest_email: None,
            guest_phone: None,
            guest_count: 1,
            check_in: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            check_out: NaiveDate::from_ymd_opt(2024, 3, 3).unwrap(),
            cost: 3000.0,
            confirmation_number: "AB12CD34".into(),
            notes: None,
            checked_in: false,
            checked_out: false,
            check_in_time: None,
            check_out_time: None,
            created_at: None,
            room_retired: false,
        }
    }

    #[test]
    fn test_stage_follows_flags() {
        let mut booking = sample();
        assert_eq!(booking.stage(), BookingStage::Booked);
        assert!(booking.is_active());

        booking.checked_in = true;
        assert_eq!(booking.stage(), BookingStage::CheckedIn);

        booking.checked_out = true;
        assert_eq!(booking.stage(), BookingStage::CheckedOut);
        assert_eq!(booking.stage().label(), "Checked Out");
        assert!(!booking.is_active());
        assert_eq!(booking.nights(), 2);
    }

    #[test]
    fn test_confirmation_number_alphabet() {
        let mut rng = rand::thread_rng();
        for _ in 0..100 {
            let code = generate_confirmation_number(&mut rng, 8);
            assert_eq!(code.len(), 8);
            assert!(code
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_booking_wire_defaults() {
        let json = r#"{
            "roomNumber": "5",
            "guestName": "Bob",
            "checkIn": "2024-06-01",
            "checkOut": "2024-06-05",
            "cost": 400,
            "confirmationNumber": "ZZZZ0000"
        }"#;
        let booking: Booking = serde_json::from_str(json).unwrap();
        assert_eq!(booking.guest_count, 1);
        assert!(!booking.checked_in);
        assert_eq!(booking.nights(), 4);

        let back = serde_json::to_value(&booking).unwrap();
        assert_eq!(back["checkIn"], "2024-06-01");
        assert_eq!(back["confirmationNumber"], "ZZZZ0000");
    }

    #[test]
    fn test_naive_timestamps_read_as_utc() {
        let json = r#"{
            "roomNumber": "5",
            "guestName": "Bob",
            "checkIn": "2024-05-01",
            "checkOut": "2024-05-03",
            "cost": 400,
            "confirmationNumber": "ZZZZ0000",
            "checkedIn": true,
            "checkInTime": "2024-05-01T14:03:22.123456",
            "checkOutTime": null,
            "createdAt": "2024-04-30T09:00:00+02:00"
        }"#;
        let booking: Booking = serde_json::from_str(json).unwrap();
        let check_in_time = booking.check_in_time.unwrap();
        assert_eq!(check_in_time.to_rfc3339(), "2024-05-01T14:03:22.123456+00:00");
        assert_eq!(booking.check_out_time, None);
        assert_eq!(
            booking.created_at.unwrap().to_rfc3339(),
            "2024-04-30T07:00:00+00:00"
        );

        assert!(parse_timestamp("2024-05-01T14:03:22").is_some());
        assert!(parse_timestamp("yesterday").is_none());
        let bad = json.replace("2024-05-01T14:03:22.123456", "soon");
        assert!(serde_json::from_str::<Booking>(&bad).is_err());
    }

    #[test]
    fn test_retired_flag_only_serialized_when_set() {
        let mut booking = sample();
        let json = serde_json::to_value(&booking).unwrap();
        assert!(json.get("roomRetired").is_none());

        booking.room_retired = true;
        let json = serde_json::to_value(&booking).unwrap();
        assert_eq!(json["roomRetired"], true);
        let back: Booking = serde_json::from_value(json).unwrap();
        assert!(back.room_retired);
    }

    #[test]
    fn test_request_builder() {
        let request = BookingRequest::new(
            "Carol",
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
        )
        .with_email("carol@example.com")
        .with_guest_count(3)
        .with_notes("late arrival");

        assert_eq!(request.guest_count, Some(3));
        assert_eq!(request.guest_email.as_deref(), Some("carol@example.com"));
        assert_eq!(request.guest_phone, None);
        assert_eq!(request.notes.as_deref(), Some("late arrival"));
    }
}
