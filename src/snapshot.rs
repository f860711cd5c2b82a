// Full-state export/import used by persistence collaborators

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::booking::{lenient_timestamp, Booking};
use crate::error::SnapshotError;
use crate::inventory::{Inventory, InventoryConfig};
use crate::room::{validate_price, Room};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Snapshot {
    pub rooms: Vec<Room>,
    pub bookings: Vec<Booking>,
}

// Legacy layout keyed bookings by room number and only kept active ones
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyBooking {
    guest_name: String,
    check_in: NaiveDate,
    check_out: NaiveDate,
    #[serde(default)]
    guest_email: Option<String>,
    #[serde(default)]
    guest_phone: Option<String>,
    #[serde(default)]
    guest_count: Option<u32>,
    #[serde(default)]
    cost: Option<f64>,
    #[serde(default)]
    confirmation_number: Option<String>,
    #[serde(default)]
    notes: Option<String>,
    #[serde(default)]
    checked_in: bool,
    #[serde(default)]
    checked_out: bool,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    check_in_time: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    check_out_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum BookingsLayout {
    List(Vec<Booking>),
    ByRoom(BTreeMap<String, LegacyBooking>),
}

impl Default for BookingsLayout {
    fn default() -> Self {
        BookingsLayout::List(Vec::new())
    }
}

#[derive(Debug, Clone, Deserialize)]
struct RawSnapshot {
    #[serde(default)]
    rooms: Vec<Room>,
    #[serde(default)]
    bookings: BookingsLayout,
}

impl<'de> Deserialize<'de> for Snapshot {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = RawSnapshot::deserialize(deserializer)?;
        let bookings = match raw.bookings {
            BookingsLayout::List(list) => list,
            BookingsLayout::ByRoom(map) => {
                let prices: BTreeMap<&str, f64> = raw
                    .rooms
                    .iter()
                    .map(|r| (r.number.as_str(), r.price))
                    .collect();
                map.into_iter()
                    .enumerate()
                    .map(|(i, (room_number, legacy))| {
                        let cost = legacy.cost.unwrap_or_else(|| {
                            let price = prices.get(room_number.as_str()).copied().unwrap_or(0.0);
                            price * crate::pricing::nights(legacy.check_in, legacy.check_out) as f64
                        });
                        Booking {
                            confirmation_number: legacy
                                .confirmation_number
                                .unwrap_or_else(|| format!("LEGACY{:04}", i + 1)),
                            room_number,
                            guest_name: legacy.guest_name,
                            guest_email: legacy.guest_email,
                            guest_phone: legacy.guest_phone,
                            guest_count: legacy.guest_count.unwrap_or(1),
                            check_in: legacy.check_in,
                            check_out: legacy.check_out,
                            cost,
                            notes: legacy.notes,
                            checked_in: legacy.checked_in,
                            checked_out: legacy.checked_out,
                            check_in_time: legacy.check_in_time,
                            check_out_time: legacy.check_out_time,
                            created_at: None,
                            room_retired: false,
                        }
                    })
                    .collect()
            }
        };
        Ok(Snapshot {
            rooms: raw.rooms,
            bookings,
        })
    }
}

impl Inventory {
    pub fn export(&self) -> Snapshot {
        Snapshot {
            rooms: self.rooms.clone(),
            bookings: self.bookings.clone(),
        }
    }

    // Rebuilds an inventory, refusing anything that would break its invariants
    pub fn import(snapshot: Snapshot, config: InventoryConfig) -> Result<Self, SnapshotError> {
        let result = validate(&snapshot);
        if let Err(e) = &result {
            warn!(error = %e, "rejecting snapshot");
        }
        result?;

        let Snapshot {
            mut rooms,
            bookings,
        } = snapshot;

        for room in rooms.iter_mut() {
            let active = bookings
                .iter()
                .find(|b| b.room_number == room.number && b.is_active());
            room.is_booked = active.is_some();
            room.booked_by = active.map(|b| b.guest_name.clone());
        }

        Ok(Inventory {
            config,
            rooms,
            bookings,
        })
    }
}

fn validate(snapshot: &Snapshot) -> Result<(), SnapshotError> {
    let mut numbers = HashSet::new();
    for room in &snapshot.rooms {
        if room.number.trim().is_empty() {
            return Err(SnapshotError::InvalidRoom {
                room_number: room.number.clone(),
                reason: "empty room number".to_string(),
            });
        }
        if !numbers.insert(room.number.as_str()) {
            return Err(SnapshotError::DuplicateRoom(room.number.clone()));
        }
        if validate_price(room.price).is_err() {
            return Err(SnapshotError::InvalidRoom {
                room_number: room.number.clone(),
                reason: format!("non-positive price {}", room.price),
            });
        }
    }

    let mut confirmations = HashSet::new();
    let mut active_rooms = HashSet::new();
    for booking in &snapshot.bookings {
        let invalid = |reason: &str| SnapshotError::InvalidBooking {
            confirmation: booking.confirmation_number.clone(),
            reason: reason.to_string(),
        };

        if !confirmations.insert(booking.confirmation_number.as_str()) {
            return Err(SnapshotError::DuplicateConfirmation(
                booking.confirmation_number.clone(),
            ));
        }
        if booking.check_out <= booking.check_in {
            return Err(invalid("check-out is not after check-in"));
        }
        if booking.guest_name.trim().is_empty() {
            return Err(invalid("empty guest name"));
        }
        if booking.guest_count == 0 {
            return Err(invalid("guest count is zero"));
        }
        if booking.checked_out && !booking.checked_in {
            return Err(invalid("checked out without checking in"));
        }
        if booking.is_active() {
            if !numbers.contains(booking.room_number.as_str()) {
                return Err(SnapshotError::UnknownRoom {
                    room_number: booking.room_number.clone(),
                    confirmation: booking.confirmation_number.clone(),
                });
            }
            if !active_rooms.insert(booking.room_number.as_str()) {
                return Err(SnapshotError::MultipleActiveBookings(
                    booking.room_number.clone(),
                ));
            }
        }
    }

    for room in &snapshot.rooms {
        let derived = active_rooms.contains(room.number.as_str());
        if room.is_booked != derived {
            return Err(SnapshotError::BookedFlagMismatch {
                room_number: room.number.clone(),
                stored: room.is_booked,
                derived,
            });
        }
    }
    Ok(())
}
