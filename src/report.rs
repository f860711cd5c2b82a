// Bookings report: a pure projection of the inventory plus printable renderings

use std::fmt::Write as _;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::inventory::Inventory;
use crate::room::RoomType;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    pub room_number: String,
    #[serde(rename = "type")]
    pub room_type: RoomType,
    pub guest_name: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub price_per_night: f64,
    pub total_cost: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingReport {
    pub rows: Vec<ReportRow>,
    pub total_bookings: usize,
    pub total_revenue: f64,
}

// One row per currently booked room, in inventory order
pub fn generate_report(inventory: &Inventory) -> BookingReport {
    let rows: Vec<ReportRow> = inventory
        .rooms()
        .iter()
        .filter(|room| room.is_booked)
        .filter_map(|room| {
            inventory.active_booking(&room.number).map(|booking| ReportRow {
                room_number: room.number.clone(),
                room_type: room.room_type,
                guest_name: booking.guest_name.clone(),
                check_in: booking.check_in,
                check_out: booking.check_out,
                price_per_night: room.price,
                total_cost: booking.cost,
            })
        })
        .collect();

    let total_revenue = rows.iter().map(|r| r.total_cost).sum();
    BookingReport {
        total_bookings: rows.len(),
        total_revenue,
        rows,
    }
}

// Structures for XML export
#[derive(Debug, Serialize)]
#[serde(rename = "BookingsReport")]
struct XmlReport {
    #[serde(rename = "@totalBookings")]
    total_bookings: usize,
    #[serde(rename = "@totalRevenue")]
    total_revenue: String,
    #[serde(rename = "Booking")]
    bookings: Vec<XmlBooking>,
}

#[derive(Debug, Serialize)]
struct XmlBooking {
    #[serde(rename = "@room")]
    room: String,
    #[serde(rename = "@type")]
    room_type: String,
    #[serde(rename = "@checkIn")]
    check_in: String,
    #[serde(rename = "@checkOut")]
    check_out: String,
    #[serde(rename = "@pricePerNight")]
    price_per_night: String,
    #[serde(rename = "@totalCost")]
    total_cost: String,
    #[serde(rename = "Guest")]
    guest: String,
}

impl BookingReport {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn to_xml(&self) -> anyhow::Result<String> {
        let doc = XmlReport {
            total_bookings: self.total_bookings,
            total_revenue: format!("{:.2}", self.total_revenue),
            bookings: self
                .rows
                .iter()
                .map(|row| XmlBooking {
                    room: row.room_number.clone(),
                    room_type: row.room_type.wire_name().to_string(),
                    check_in: row.check_in.to_string(),
                    check_out: row.check_out.to_string(),
                    price_per_night: format!("{:.2}", row.price_per_night),
                    total_cost: format!("{:.2}", row.total_cost),
                    guest: row.guest_name.clone(),
                })
                .collect(),
        };
        Ok(quick_xml::se::to_string(&doc)?)
    }

    // Fixed-width table for printing
    pub fn render_text(&self, title: &str, currency_symbol: &str) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", title);
        let _ = writeln!(out, "{}", "=".repeat(title.chars().count()));

        if self.rows.is_empty() {
            let _ = writeln!(out, "No bookings to report");
            return out;
        }

        let _ = writeln!(
            out,
            "{:<8} {:<14} {:<20} {:<10} {:<10} {:>12} {:>12}",
            "Room", "Type", "Guest", "Check-in", "Check-out", "Per night", "Total"
        );
        for row in &self.rows {
            let _ = writeln!(
                out,
                "{:<8} {:<14} {:<20} {:<10} {:<10} {:>12} {:>12}",
                row.room_number,
                row.room_type.label(),
                row.guest_name,
                row.check_in.format("%Y-%m-%d"),
                row.check_out.format("%Y-%m-%d"),
                format!("{}{:.2}", currency_symbol, row.price_per_night),
                format!("{}{:.2}", currency_symbol, row.total_cost),
            );
        }
        let _ = writeln!(out);
        let _ = writeln!(out, "Total bookings: {}", self.total_bookings);
        let _ = writeln!(
            out,
            "Total revenue: {}{:.2}",
            currency_symbol, self.total_revenue
        );
        out
    }
}
