// Read-only dashboard projections: occupancy figures, guest directory, alerts

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::booking::{Booking, BookingStage};
use crate::inventory::Inventory;
use crate::room::RoomStatus;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OccupancyStats {
    pub total_rooms: usize,
    pub available_rooms: usize,
    pub booked_rooms: usize,
    pub revenue: f64,
    pub occupancy_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestBookingSummary {
    pub room_number: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub confirmation_number: String,
    pub stage: BookingStage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestRecord {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub total_bookings: usize,
    pub bookings: Vec<GuestBookingSummary>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    CheckoutToday,
    CheckoutTomorrow,
    Maintenance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub message: String,
    pub room_number: String,
    pub priority: Priority,
}

pub fn occupancy_stats(inventory: &Inventory) -> OccupancyStats {
    let total_rooms = inventory.rooms().len();
    let available_rooms = inventory.list_available().len();
    let booked_rooms = inventory.list_booked().len();
    let revenue = inventory
        .bookings()
        .iter()
        .filter(|b| b.is_active())
        .map(|b| b.cost)
        .sum();

    let occupancy_rate = if total_rooms > 0 {
        let rate = booked_rooms as f64 / total_rooms as f64 * 100.0;
        (rate * 100.0).round() / 100.0
    } else {
        0.0
    };

    OccupancyStats {
        total_rooms,
        available_rooms,
        booked_rooms,
        revenue,
        occupancy_rate,
    }
}

// Groups retained bookings by guest name; contact details come from the first booking that has them
pub fn guest_directory(inventory: &Inventory) -> Vec<GuestRecord> {
    let mut guests: Vec<GuestRecord> = Vec::new();
    for booking in inventory.bookings() {
        let idx = match guests.iter().position(|g| g.name == booking.guest_name) {
            Some(idx) => idx,
            None => {
                guests.push(GuestRecord {
                    name: booking.guest_name.clone(),
                    email: None,
                    phone: None,
                    total_bookings: 0,
                    bookings: Vec::new(),
                });
                guests.len() - 1
            }
        };

        let guest = &mut guests[idx];
        if guest.email.is_none() {
            guest.email = booking.guest_email.clone();
        }
        if guest.phone.is_none() {
            guest.phone = booking.guest_phone.clone();
        }
        guest.total_bookings += 1;
        guest.bookings.push(summary(booking));
    }
    guests
}

fn summary(booking: &Booking) -> GuestBookingSummary {
    GuestBookingSummary {
        room_number: booking.room_number.clone(),
        check_in: booking.check_in,
        check_out: booking.check_out,
        confirmation_number: booking.confirmation_number.clone(),
        stage: booking.stage(),
    }
}

pub fn notifications(inventory: &Inventory, today: NaiveDate) -> Vec<Notification> {
    let mut out = Vec::new();

    for booking in inventory.bookings().iter().filter(|b| b.is_active()) {
        let days_left = (booking.check_out - today).num_days();
        if days_left == 0 {
            out.push(Notification {
                kind: NotificationKind::CheckoutToday,
                message: format!(
                    "Room {} checkout today - Guest: {}",
                    booking.room_number, booking.guest_name
                ),
                room_number: booking.room_number.clone(),
                priority: Priority::High,
            });
        } else if days_left == 1 {
            out.push(Notification {
                kind: NotificationKind::CheckoutTomorrow,
                message: format!(
                    "Room {} checkout tomorrow - Guest: {}",
                    booking.room_number, booking.guest_name
                ),
                room_number: booking.room_number.clone(),
                priority: Priority::Medium,
            });
        }
    }

    for room in inventory
        .rooms()
        .iter()
        .filter(|r| r.status == RoomStatus::Maintenance)
    {
        out.push(Notification {
            kind: NotificationKind::Maintenance,
            message: format!("Room {} is under maintenance", room.number),
            room_number: room.number.clone(),
            priority: Priority::Medium,
        });
    }
    out
}
