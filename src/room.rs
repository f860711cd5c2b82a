// Room entity: identity, nightly price and operational status

use serde::{Deserialize, Serialize};

use crate::error::InventoryError;

// Closed set of room categories; the label is display-only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoomType {
    #[serde(rename = "SingleRoom")]
    Single,
    #[serde(rename = "DoubleRoom")]
    Double,
    #[serde(rename = "SuiteRoom")]
    Suite,
}

const ROOM_TYPE_LABELS: [(RoomType, &str, &str); 3] = [
    (RoomType::Single, "SingleRoom", "Single Room"),
    (RoomType::Double, "DoubleRoom", "Double Room"),
    (RoomType::Suite, "SuiteRoom", "Luxury Suite"),
];

impl RoomType {
    pub fn label(&self) -> &'static str {
        ROOM_TYPE_LABELS
            .iter()
            .find(|(t, _, _)| t == self)
            .map(|(_, _, label)| *label)
            .unwrap_or_default()
    }

    pub fn wire_name(&self) -> &'static str {
        ROOM_TYPE_LABELS
            .iter()
            .find(|(t, _, _)| t == self)
            .map(|(_, name, _)| *name)
            .unwrap_or_default()
    }

    // Accepts the wire name ("SingleRoom") or the short form ("single")
    pub fn parse(s: &str) -> Result<Self, InventoryError> {
        let trimmed = s.trim();
        ROOM_TYPE_LABELS
            .iter()
            .find(|(t, name, _)| {
                name.eq_ignore_ascii_case(trimmed)
                    || format!("{:?}", t).eq_ignore_ascii_case(trimmed)
            })
            .map(|(t, _, _)| *t)
            .ok_or_else(|| InventoryError::InvalidRoomType(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    #[default]
    Available,
    Maintenance,
    Cleaning,
}

impl RoomStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomStatus::Available => "available",
            RoomStatus::Maintenance => "maintenance",
            RoomStatus::Cleaning => "cleaning",
        }
    }

    pub fn parse(s: &str) -> Result<Self, InventoryError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "available" => Ok(RoomStatus::Available),
            "maintenance" => Ok(RoomStatus::Maintenance),
            "cleaning" => Ok(RoomStatus::Cleaning),
            _ => Err(InventoryError::InvalidStatus(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub number: String,
    #[serde(rename = "type")]
    pub room_type: RoomType,
    pub price: f64,
    #[serde(default)]
    pub status: RoomStatus,
    #[serde(default)]
    pub is_booked: bool,
    #[serde(default)]
    pub booked_by: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub amenities: Vec<String>,
}

impl Room {
    pub fn new(number: impl Into<String>, room_type: RoomType, price: f64) -> Self {
        Self {
            number: number.into(),
            room_type,
            price,
            status: RoomStatus::Available,
            is_booked: false,
            booked_by: None,
            notes: None,
            amenities: Vec::new(),
        }
    }

    pub fn description(&self, currency_symbol: &str) -> String {
        format!(
            "{} \u{2014} {}{}",
            self.room_type.label(),
            currency_symbol,
            self.price
        )
    }

    // Which dashboard list the room lands in; booking wins over status
    pub fn placement(&self) -> Placement {
        if self.is_booked {
            Placement::Booked
        } else {
            Placement::Idle(self.status)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Booked,
    Idle(RoomStatus),
}

pub fn validate_price(price: f64) -> Result<f64, InventoryError> {
    if price.is_finite() && price > 0.0 {
        Ok(price)
    } else {
        Err(InventoryError::InvalidPrice(price))
    }
}

// Trims, drops blanks and repeats, keeps first-seen order
pub fn normalize_amenities<I, S>(amenities: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for amenity in amenities {
        let amenity = amenity.as_ref().trim();
        if !amenity.is_empty() && !out.iter().any(|a| a == amenity) {
            out.push(amenity.to_string());
        }
    }
    out
}
