// Inventory: the single owner of rooms and bookings for one hotel
//
// Every mutating method validates first and only then touches state, so a
// refused operation leaves the inventory exactly as it was.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::booking::{
    generate_confirmation_number, Booking, BookingChanges, BookingConfirmation, BookingRequest,
};
use crate::error::InventoryError;
use crate::pricing;
use crate::room::{normalize_amenities, validate_price, Placement, Room, RoomStatus, RoomType};

// Shorter configured lengths are raised to this
pub const MIN_CONFIRMATION_LENGTH: usize = 4;
const ATTEMPTS_PER_LENGTH: usize = 32;

#[derive(Debug, Clone)]
pub struct InventoryConfig {
    pub confirmation_length: usize,
    pub currency_symbol: String,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            confirmation_length: 8,
            currency_symbol: "\u{20b9}".to_string(),
        }
    }
}

// Editable room attributes; booking state is never touched by an edit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomUpdate {
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default, rename = "type")]
    pub room_type: Option<RoomType>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlacementFilter {
    #[default]
    All,
    Available,
    Booked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomSort {
    Number,
    PriceAscending,
    PriceDescending,
    Type,
}

#[derive(Debug, Clone, Default)]
pub struct Inventory {
    pub(crate) config: InventoryConfig,
    pub(crate) rooms: Vec<Room>,
    // Active bookings plus checked-out history, in creation order
    pub(crate) bookings: Vec<Booking>,
}

impl Inventory {
    pub fn new(config: InventoryConfig) -> Self {
        Self {
            config,
            rooms: Vec::new(),
            bookings: Vec::new(),
        }
    }

    pub fn config(&self) -> &InventoryConfig {
        &self.config
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn bookings(&self) -> &[Booking] {
        &self.bookings
    }

    pub fn room(&self, number: &str) -> Option<&Room> {
        self.rooms.iter().find(|r| r.number == number)
    }

    pub fn active_booking(&self, number: &str) -> Option<&Booking> {
        self.bookings
            .iter()
            .find(|b| b.room_number == number && b.is_active())
    }

    pub fn booking_by_confirmation(&self, code: &str) -> Result<&Booking, InventoryError> {
        self.bookings
            .iter()
            .find(|b| b.confirmation_number.eq_ignore_ascii_case(code.trim()))
            .ok_or_else(|| InventoryError::BookingNotFound(code.to_string()))
    }

    fn room_index(&self, number: &str) -> Result<usize, InventoryError> {
        self.rooms
            .iter()
            .position(|r| r.number == number)
            .ok_or_else(|| InventoryError::RoomNotFound(number.to_string()))
    }

    fn active_index(&self, number: &str) -> Option<usize> {
        self.bookings
            .iter()
            .position(|b| b.room_number == number && b.is_active())
    }

    fn latest_is_checked_out(&self, number: &str) -> bool {
        self.bookings
            .iter()
            .rev()
            .find(|b| b.room_number == number && !b.room_retired)
            .map_or(false, |b| b.checked_out)
    }

    // ---- Room management ----

    pub fn add_room(
        &mut self,
        number: &str,
        room_type: RoomType,
        price: f64,
    ) -> Result<Room, InventoryError> {
        let number = number.trim();
        if number.is_empty() {
            return Err(InventoryError::InvalidRoomNumber);
        }
        if self.room(number).is_some() {
            return Err(InventoryError::DuplicateRoom(number.to_string()));
        }
        let price = validate_price(price)?;

        let room = Room::new(number, room_type, price);
        self.rooms.push(room.clone());
        debug!(room = number, ?room_type, price, "room added");
        Ok(room)
    }

    pub fn update_room(&mut self, number: &str, update: RoomUpdate) -> Result<Room, InventoryError> {
        let idx = self.room_index(number)?;
        if let Some(price) = update.price {
            validate_price(price)?;
        }

        let room = &mut self.rooms[idx];
        if let Some(price) = update.price {
            room.price = price;
        }
        if let Some(room_type) = update.room_type {
            room.room_type = room_type;
        }
        Ok(room.clone())
    }

    pub fn delete_room(&mut self, number: &str) -> Result<Room, InventoryError> {
        let idx = self.room_index(number)?;
        if self.rooms[idx].is_booked {
            return Err(InventoryError::RoomCurrentlyBooked(number.to_string()));
        }
        for booking in self.bookings.iter_mut().filter(|b| b.room_number == number) {
            booking.room_retired = true;
        }
        Ok(self.rooms.remove(idx))
    }

    pub fn set_room_status(
        &mut self,
        number: &str,
        status: RoomStatus,
        notes: Option<String>,
    ) -> Result<Room, InventoryError> {
        let idx = self.room_index(number)?;
        let room = &mut self.rooms[idx];
        room.status = status;
        if notes.is_some() {
            room.notes = notes;
        }
        Ok(room.clone())
    }

    pub fn set_amenities(&mut self, number: &str, amenities: Vec<String>) -> Result<Room, InventoryError> {
        let idx = self.room_index(number)?;
        let room = &mut self.rooms[idx];
        room.amenities = normalize_amenities(amenities);
        Ok(room.clone())
    }

    // ---- Booking lifecycle ----

    pub fn book_room(
        &mut self,
        number: &str,
        request: BookingRequest,
    ) -> Result<BookingConfirmation, InventoryError> {
        self.book_room_at(number, request, Utc::now())
    }

    pub fn book_room_at(
        &mut self,
        number: &str,
        request: BookingRequest,
        now: DateTime<Utc>,
    ) -> Result<BookingConfirmation, InventoryError> {
        let idx = self.room_index(number)?;
        if self.rooms[idx].is_booked {
            return Err(InventoryError::RoomAlreadyBooked(number.to_string()));
        }
        let nights = pricing::validate_stay(request.check_in, request.check_out)?;
        let guest_name = request.guest_name.trim();
        if guest_name.is_empty() {
            return Err(InventoryError::InvalidGuestName);
        }
        let guest_count = request.guest_count.unwrap_or(1);
        if guest_count == 0 {
            return Err(InventoryError::InvalidGuestCount);
        }

        let cost = pricing::cost(self.rooms[idx].price, request.check_in, request.check_out)?;
        let confirmation_number = self.fresh_confirmation_number();

        let booking = Booking {
            room_number: number.to_string(),
            guest_name: guest_name.to_string(),
            guest_email: request.guest_email,
            guest_phone: request.guest_phone,
            guest_count,
            check_in: request.check_in,
            check_out: request.check_out,
            cost,
            confirmation_number: confirmation_number.clone(),
            notes: request.notes,
            checked_in: false,
            checked_out: false,
            check_in_time: None,
            check_out_time: None,
            created_at: Some(now),
            room_retired: false,
        };

        let room = &mut self.rooms[idx];
        room.is_booked = true;
        room.booked_by = Some(booking.guest_name.clone());
        self.bookings.push(booking);

        debug!(room = number, %confirmation_number, cost, nights, "room booked");
        Ok(BookingConfirmation {
            room_number: number.to_string(),
            confirmation_number,
            cost,
            nights,
        })
    }

    fn fresh_confirmation_number(&self) -> String {
        let mut rng = rand::thread_rng();
        let length = self.config.confirmation_length.max(MIN_CONFIRMATION_LENGTH);
        unique_confirmation_number(&mut rng, length, |code| {
            self.bookings.iter().any(|b| b.confirmation_number == code)
        })
    }

    // Cancellation: the booking is discarded, not kept in history
    pub fn unbook_room(&mut self, number: &str) -> Result<Booking, InventoryError> {
        let idx = self.room_index(number)?;
        let booking_idx = self
            .active_index(number)
            .ok_or_else(|| InventoryError::NoActiveBooking(number.to_string()))?;

        let booking = self.bookings.remove(booking_idx);
        self.free_room(idx);
        Ok(booking)
    }

    pub fn check_in(&mut self, number: &str) -> Result<Booking, InventoryError> {
        self.check_in_at(number, Utc::now())
    }

    pub fn check_in_at(&mut self, number: &str, at: DateTime<Utc>) -> Result<Booking, InventoryError> {
        self.room_index(number)?;
        let booking_idx = self
            .active_index(number)
            .ok_or_else(|| InventoryError::NoActiveBooking(number.to_string()))?;

        let booking = &mut self.bookings[booking_idx];
        if booking.checked_in {
            return Err(InventoryError::AlreadyCheckedIn(number.to_string()));
        }
        booking.checked_in = true;
        booking.check_in_time = Some(at);
        Ok(booking.clone())
    }

    pub fn check_out(&mut self, number: &str) -> Result<Booking, InventoryError> {
        self.check_out_at(number, Utc::now())
    }

    pub fn check_out_at(&mut self, number: &str, at: DateTime<Utc>) -> Result<Booking, InventoryError> {
        let idx = self.room_index(number)?;
        let booking_idx = match self.active_index(number) {
            Some(i) => i,
            None if self.latest_is_checked_out(number) => {
                return Err(InventoryError::AlreadyCheckedOut(number.to_string()))
            }
            None => return Err(InventoryError::NoActiveBooking(number.to_string())),
        };
        if !self.bookings[booking_idx].checked_in {
            return Err(InventoryError::NotYetCheckedIn(number.to_string()));
        }

        let booking = &mut self.bookings[booking_idx];
        booking.checked_out = true;
        booking.check_out_time = Some(at);
        let booking = booking.clone();
        self.free_room(idx);
        Ok(booking)
    }

    pub fn modify_booking(
        &mut self,
        number: &str,
        changes: BookingChanges,
    ) -> Result<Booking, InventoryError> {
        let idx = self.room_index(number)?;
        let booking_idx = match self.active_index(number) {
            Some(i) => i,
            None if self.latest_is_checked_out(number) => {
                return Err(InventoryError::BookingAlreadyCheckedOut(number.to_string()))
            }
            None => return Err(InventoryError::NoActiveBooking(number.to_string())),
        };

        let current = &self.bookings[booking_idx];
        let check_out = changes.check_out.unwrap_or(current.check_out);
        let cost = pricing::cost(self.rooms[idx].price, current.check_in, check_out)?;
        if changes.guest_count == Some(0) {
            return Err(InventoryError::InvalidGuestCount);
        }

        let booking = &mut self.bookings[booking_idx];
        booking.check_out = check_out;
        booking.cost = cost;
        if let Some(count) = changes.guest_count {
            booking.guest_count = count;
        }
        if changes.notes.is_some() {
            booking.notes = changes.notes;
        }
        if changes.guest_email.is_some() {
            booking.guest_email = changes.guest_email;
        }
        if changes.guest_phone.is_some() {
            booking.guest_phone = changes.guest_phone;
        }
        Ok(booking.clone())
    }

    fn free_room(&mut self, idx: usize) {
        let room = &mut self.rooms[idx];
        room.is_booked = false;
        room.booked_by = None;
    }

    // ---- Projections ----

    pub fn list_available(&self) -> Vec<Room> {
        self.list_by_status(RoomStatus::Available)
    }

    pub fn list_booked(&self) -> Vec<Room> {
        self.rooms
            .iter()
            .filter(|r| r.placement() == Placement::Booked)
            .cloned()
            .collect()
    }

    pub fn list_by_status(&self, status: RoomStatus) -> Vec<Room> {
        self.rooms
            .iter()
            .filter(|r| r.placement() == Placement::Idle(status))
            .cloned()
            .collect()
    }

    pub fn guest_history(&self, guest_name: &str) -> Vec<Booking> {
        let name = guest_name.trim();
        self.bookings
            .iter()
            .filter(|b| b.guest_name == name)
            .cloned()
            .collect()
    }

    pub fn filter_by_type(&self, room_type: Option<RoomType>) -> Vec<Room> {
        self.rooms
            .iter()
            .filter(|r| room_type.map_or(true, |t| r.room_type == t))
            .cloned()
            .collect()
    }

    pub fn search_rooms(&self, query: &str, filter: PlacementFilter) -> Vec<Room> {
        let term = query.trim().to_lowercase();
        self.rooms
            .iter()
            .filter(|room| {
                let matches_search = term.is_empty()
                    || room.number.to_lowercase().contains(&term)
                    || room.room_type.wire_name().to_lowercase().contains(&term)
                    || room
                        .description(&self.config.currency_symbol)
                        .to_lowercase()
                        .contains(&term)
                    || room.price.to_string().contains(&term);

                let matches_filter = match filter {
                    PlacementFilter::All => true,
                    PlacementFilter::Available => !room.is_booked,
                    PlacementFilter::Booked => room.is_booked,
                };

                matches_search && matches_filter
            })
            .cloned()
            .collect()
    }
}

// Draws codes until one is free; a length that keeps colliding is widened by one
fn unique_confirmation_number<R: Rng + ?Sized>(
    rng: &mut R,
    mut length: usize,
    taken: impl Fn(&str) -> bool,
) -> String {
    loop {
        for _ in 0..ATTEMPTS_PER_LENGTH {
            let code = generate_confirmation_number(rng, length);
            if !taken(&code) {
                return code;
            }
        }
        debug!(length, "confirmation codes crowded, widening");
        length += 1;
    }
}

pub fn sort_rooms(rooms: &mut [Room], by: RoomSort) {
    match by {
        RoomSort::Number => rooms.sort_by(|a, b| a.number.cmp(&b.number)),
        RoomSort::PriceAscending => rooms.sort_by(|a, b| a.price.total_cmp(&b.price)),
        RoomSort::PriceDescending => rooms.sort_by(|a, b| b.price.total_cmp(&a.price)),
        RoomSort::Type => rooms.sort_by(|a, b| a.room_type.wire_name().cmp(b.room_type.wire_name())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use chrono::NaiveDate;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn request(guest: &str, check_in: &str, check_out: &str) -> BookingRequest {
        BookingRequest::new(guest, date(check_in), date(check_out))
    }

    fn hotel() -> Inventory {
        let mut inv = Inventory::default();
        inv.add_room("101", RoomType::Single, 1500.0).unwrap();
        inv.add_room("102", RoomType::Double, 2500.0).unwrap();
        inv.add_room("201", RoomType::Suite, 6000.0).unwrap();
        inv
    }

    // booked flag must always mirror the presence of an active booking
    fn assert_booked_flags_consistent(inv: &Inventory) {
        for room in inv.rooms() {
            let active = inv
                .bookings()
                .iter()
                .filter(|b| b.room_number == room.number && !b.checked_out)
                .count();
            assert!(active <= 1, "room {} has {} active bookings", room.number, active);
            assert_eq!(room.is_booked, active == 1, "room {}", room.number);
        }
    }

    #[test]
    fn test_add_room_lists_available_once() {
        for price in [0.5, 1.0, 99.99, 1500.0, 1_000_000.0] {
            let mut inv = Inventory::default();
            inv.add_room("A1", RoomType::Double, price).unwrap();
            let available = inv.list_available();
            assert_eq!(available.iter().filter(|r| r.number == "A1").count(), 1);
            assert_eq!(available[0].status, RoomStatus::Available);
            assert!(!available[0].is_booked);
        }
    }

    #[test]
    fn test_duplicate_room_is_conflict_regardless_of_attributes() {
        let mut inv = hotel();
        let err = inv.add_room("101", RoomType::Suite, 9999.0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(inv.rooms().len(), 3);
        assert_eq!(inv.room("101").unwrap().room_type, RoomType::Single);
    }

    #[test]
    fn test_add_room_rejects_bad_input() {
        let mut inv = Inventory::default();
        assert_eq!(
            inv.add_room("1", RoomType::Single, 0.0).unwrap_err(),
            InventoryError::InvalidPrice(0.0)
        );
        assert_eq!(
            inv.add_room("   ", RoomType::Single, 10.0).unwrap_err(),
            InventoryError::InvalidRoomNumber
        );
        assert!(inv.rooms().is_empty());
    }

    #[test]
    fn test_front_desk_scenario() {
        let mut inv = Inventory::default();
        inv.add_room("101", RoomType::Single, 1500.0).unwrap();

        let confirmation = inv
            .book_room("101", request("Alice", "2024-03-01", "2024-03-03"))
            .unwrap();
        assert_eq!(confirmation.cost, 3000.0);
        assert_eq!(confirmation.nights, 2);
        assert_eq!(confirmation.confirmation_number.len(), 8);
        assert!(inv.room("101").unwrap().is_booked);
        assert_eq!(inv.room("101").unwrap().booked_by.as_deref(), Some("Alice"));
        assert!(inv.list_available().is_empty());

        // deleting while booked must fail and change nothing
        let err = inv.delete_room("101").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PreconditionFailed);
        assert!(inv.room("101").is_some());
        assert!(!inv.list_available().iter().any(|r| r.number == "101"));

        let checked_in = inv.check_in("101").unwrap();
        assert!(checked_in.checked_in);
        assert!(checked_in.check_in_time.is_some());

        let checked_out = inv.check_out("101").unwrap();
        assert!(checked_out.checked_out);
        assert!(!inv.room("101").unwrap().is_booked);
        assert_eq!(inv.list_available().len(), 1);
        assert_eq!(inv.guest_history("Alice").len(), 1);
        assert_booked_flags_consistent(&inv);
    }

    #[test]
    fn test_double_booking_is_conflict() {
        let mut inv = hotel();
        inv.book_room("102", request("Bob", "2024-01-01", "2024-01-02"))
            .unwrap();
        let err = inv
            .book_room("102", request("Carol", "2024-02-01", "2024-02-02"))
            .unwrap_err();
        assert_eq!(err, InventoryError::RoomAlreadyBooked("102".into()));
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(inv.bookings().len(), 1);
    }

    #[test]
    fn test_booking_validation_order_and_atomicity() {
        let mut inv = hotel();

        let same_day = inv.book_room("101", request("Alice", "2024-01-01", "2024-01-01"));
        assert_eq!(same_day.unwrap_err().kind(), ErrorKind::InvalidInput);

        let blank = inv.book_room("101", request("   ", "2024-01-01", "2024-01-02"));
        assert_eq!(blank.unwrap_err(), InventoryError::InvalidGuestName);

        let nobody = inv.book_room(
            "101",
            request("Alice", "2024-01-01", "2024-01-02").with_guest_count(0),
        );
        assert_eq!(nobody.unwrap_err(), InventoryError::InvalidGuestCount);

        let missing = inv.book_room("999", request("Alice", "2024-01-01", "2024-01-02"));
        assert_eq!(missing.unwrap_err().kind(), ErrorKind::NotFound);

        assert!(inv.bookings().is_empty());
        assert_eq!(inv.list_available().len(), 3);
    }

    #[test]
    fn test_cost_matches_price_times_nights() {
        let mut inv = Inventory::default();
        inv.add_room("1", RoomType::Double, 1000.0).unwrap();
        let confirmation = inv
            .book_room("1", request("Dan", "2024-01-01", "2024-01-04"))
            .unwrap();
        assert_eq!(confirmation.cost, 3000.0);
        assert_eq!(inv.active_booking("1").unwrap().cost, 3000.0);
    }

    #[test]
    fn test_guest_name_is_trimmed() {
        let mut inv = hotel();
        inv.book_room("201", request("  Erin ", "2024-01-01", "2024-01-02"))
            .unwrap();
        assert_eq!(inv.guest_history("Erin").len(), 1);
        assert_eq!(inv.guest_history(" Erin").len(), 1);
    }

    #[test]
    fn test_unbook_discards_booking() {
        let mut inv = hotel();
        let err = inv.unbook_room("101").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        inv.book_room("101", request("Frank", "2024-01-01", "2024-01-05"))
            .unwrap();
        let removed = inv.unbook_room("101").unwrap();
        assert_eq!(removed.guest_name, "Frank");
        assert!(!inv.room("101").unwrap().is_booked);
        assert!(inv.guest_history("Frank").is_empty());
        assert_booked_flags_consistent(&inv);
    }

    #[test]
    fn test_unbook_after_check_in_is_allowed() {
        let mut inv = hotel();
        inv.book_room("101", request("Gina", "2024-01-01", "2024-01-05"))
            .unwrap();
        inv.check_in("101").unwrap();
        inv.unbook_room("101").unwrap();
        assert!(inv.list_available().iter().any(|r| r.number == "101"));
        assert!(inv.guest_history("Gina").is_empty());
    }

    #[test]
    fn test_check_in_and_out_transitions() {
        let mut inv = hotel();
        assert_eq!(
            inv.check_in("101").unwrap_err(),
            InventoryError::NoActiveBooking("101".into())
        );
        assert_eq!(
            inv.check_out("101").unwrap_err(),
            InventoryError::NoActiveBooking("101".into())
        );

        inv.book_room("101", request("Hank", "2024-01-01", "2024-01-03"))
            .unwrap();
        assert_eq!(
            inv.check_out("101").unwrap_err(),
            InventoryError::NotYetCheckedIn("101".into())
        );

        let at = Utc::now();
        let booking = inv.check_in_at("101", at).unwrap();
        assert_eq!(booking.check_in_time, Some(at));
        assert_eq!(
            inv.check_in("101").unwrap_err().kind(),
            ErrorKind::Conflict
        );

        inv.check_out("101").unwrap();
        assert_eq!(
            inv.check_out("101").unwrap_err(),
            InventoryError::AlreadyCheckedOut("101".into())
        );
        assert_eq!(
            inv.modify_booking("101", BookingChanges::default()).unwrap_err(),
            InventoryError::BookingAlreadyCheckedOut("101".into())
        );
        assert_booked_flags_consistent(&inv);
    }

    #[test]
    fn test_room_can_be_rebooked_after_checkout() {
        let mut inv = hotel();
        inv.book_room("101", request("Ivy", "2024-01-01", "2024-01-03"))
            .unwrap();
        inv.check_in("101").unwrap();
        inv.check_out("101").unwrap();

        inv.book_room("101", request("Ivy", "2024-02-01", "2024-02-02"))
            .unwrap();
        let history = inv.guest_history("Ivy");
        assert_eq!(history.len(), 2);
        assert!(history[0].checked_out);
        assert!(!history[1].checked_out);
        assert_booked_flags_consistent(&inv);
    }

    #[test]
    fn test_modify_booking_recomputes_cost() {
        let mut inv = hotel();
        inv.book_room("102", request("Jack", "2024-04-01", "2024-04-03"))
            .unwrap();

        let modified = inv
            .modify_booking(
                "102",
                BookingChanges {
                    check_out: Some(date("2024-04-06")),
                    guest_count: Some(2),
                    notes: Some("extra bed".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(modified.cost, 12500.0);
        assert_eq!(modified.guest_count, 2);
        assert_eq!(modified.notes.as_deref(), Some("extra bed"));

        // a new price only applies once the dates are touched again
        inv.update_room(
            "102",
            RoomUpdate {
                price: Some(3000.0),
                room_type: None,
            },
        )
        .unwrap();
        assert_eq!(inv.active_booking("102").unwrap().cost, 12500.0);
        let touched = inv.modify_booking("102", BookingChanges::default()).unwrap();
        assert_eq!(touched.cost, 15000.0);
    }

    #[test]
    fn test_modify_booking_rejects_bad_range_without_mutation() {
        let mut inv = hotel();
        inv.book_room("102", request("Kim", "2024-04-01", "2024-04-03"))
            .unwrap();
        let err = inv
            .modify_booking(
                "102",
                BookingChanges {
                    check_out: Some(date("2024-04-01")),
                    guest_count: Some(4),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        let booking = inv.active_booking("102").unwrap();
        assert_eq!(booking.check_out, date("2024-04-03"));
        assert_eq!(booking.guest_count, 1);
        assert_eq!(booking.cost, 5000.0);
    }

    #[test]
    fn test_update_room_validates_price() {
        let mut inv = hotel();
        let err = inv
            .update_room(
                "201",
                RoomUpdate {
                    price: Some(-1.0),
                    room_type: Some(RoomType::Double),
                },
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(inv.room("201").unwrap().room_type, RoomType::Suite);

        let updated = inv
            .update_room(
                "201",
                RoomUpdate {
                    price: None,
                    room_type: Some(RoomType::Double),
                },
            )
            .unwrap();
        assert_eq!(updated.room_type, RoomType::Double);
        assert_eq!(updated.price, 6000.0);

        assert_eq!(
            inv.update_room("404", RoomUpdate::default()).unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn test_status_lists_are_mutually_exclusive() {
        let mut inv = hotel();
        inv.set_room_status("102", RoomStatus::Maintenance, Some("leaky tap".into()))
            .unwrap();
        inv.set_room_status("201", RoomStatus::Cleaning, None).unwrap();
        inv.book_room("201", request("Liam", "2024-01-01", "2024-01-02"))
            .unwrap();

        let available: Vec<_> = inv.list_available().into_iter().map(|r| r.number).collect();
        let maintenance: Vec<_> = inv
            .list_by_status(RoomStatus::Maintenance)
            .into_iter()
            .map(|r| r.number)
            .collect();
        let cleaning = inv.list_by_status(RoomStatus::Cleaning);
        let booked: Vec<_> = inv.list_booked().into_iter().map(|r| r.number).collect();

        assert_eq!(available, vec!["101"]);
        assert_eq!(maintenance, vec!["102"]);
        assert!(cleaning.is_empty(), "booked room must not show as cleaning");
        assert_eq!(booked, vec!["201"]);
        assert_eq!(inv.room("102").unwrap().notes.as_deref(), Some("leaky tap"));
    }

    #[test]
    fn test_projections_are_snapshots() {
        let mut inv = hotel();
        let mut listed = inv.list_available();
        listed[0].price = 1.0;
        listed[0].is_booked = true;
        assert_eq!(inv.room("101").unwrap().price, 1500.0);
        assert!(!inv.room("101").unwrap().is_booked);

        inv.delete_room("101").unwrap();
        assert_eq!(listed.len(), 3);
        assert_eq!(inv.rooms().len(), 2);
    }

    #[test]
    fn test_booking_by_confirmation() {
        let mut inv = hotel();
        let confirmation = inv
            .book_room("101", request("Mia", "2024-01-01", "2024-01-02"))
            .unwrap();
        let found = inv
            .booking_by_confirmation(&confirmation.confirmation_number.to_lowercase())
            .unwrap();
        assert_eq!(found.guest_name, "Mia");
        assert_eq!(
            inv.booking_by_confirmation("NOPE").unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn test_confirmation_numbers_are_unique() {
        let mut inv = Inventory::new(InventoryConfig {
            confirmation_length: 2,
            ..Default::default()
        });
        let mut seen = std::collections::HashSet::new();
        for i in 0..200 {
            let number = format!("R{}", i);
            inv.add_room(&number, RoomType::Single, 10.0).unwrap();
            let confirmation = inv
                .book_room(&number, request("Guest", "2024-01-01", "2024-01-02"))
                .unwrap();
            assert!(seen.insert(confirmation.confirmation_number));
        }
    }

    #[test]
    fn test_short_confirmation_length_is_raised() {
        let mut inv = Inventory::new(InventoryConfig {
            confirmation_length: 1,
            ..Default::default()
        });
        for i in 0..50 {
            let number = format!("S{}", i);
            inv.add_room(&number, RoomType::Single, 10.0).unwrap();
            let confirmation = inv
                .book_room(&number, request("Guest", "2024-01-01", "2024-01-02"))
                .unwrap();
            assert_eq!(confirmation.confirmation_number.len(), MIN_CONFIRMATION_LENGTH);
        }
    }

    #[test]
    fn test_exhausted_code_space_widens_codes() {
        let taken: std::collections::HashSet<String> =
            ('A'..='Z').chain('0'..='9').map(String::from).collect();
        assert_eq!(taken.len(), 36);

        let mut rng = rand::thread_rng();
        let code = unique_confirmation_number(&mut rng, 1, |c| taken.contains(c));
        assert_eq!(code.len(), 2, "every one-character code is taken");
        assert!(!taken.contains(&code));
    }

    #[test]
    fn test_recreated_room_does_not_inherit_checked_out_history() {
        let mut inv = hotel();
        inv.book_room("101", request("Ivy", "2024-01-01", "2024-01-02"))
            .unwrap();
        inv.check_in("101").unwrap();
        inv.check_out("101").unwrap();
        assert_eq!(
            inv.check_out("101").unwrap_err(),
            InventoryError::AlreadyCheckedOut("101".into())
        );

        inv.delete_room("101").unwrap();
        inv.add_room("101", RoomType::Double, 2000.0).unwrap();
        assert_eq!(
            inv.check_out("101").unwrap_err(),
            InventoryError::NoActiveBooking("101".into())
        );
        assert_eq!(
            inv.modify_booking("101", BookingChanges::default())
                .unwrap_err(),
            InventoryError::NoActiveBooking("101".into())
        );
        // the old stay is still part of the guest's history
        assert_eq!(inv.guest_history("Ivy").len(), 1);
        assert!(inv.guest_history("Ivy")[0].room_retired);
    }

    #[test]
    fn test_search_filter_and_sort() {
        let mut inv = hotel();
        inv.book_room("102", request("Nora", "2024-01-01", "2024-01-02"))
            .unwrap();

        let suites = inv.search_rooms("suite", PlacementFilter::All);
        assert_eq!(suites.len(), 1);
        assert_eq!(suites[0].number, "201");

        let by_price = inv.search_rooms("2500", PlacementFilter::All);
        assert_eq!(by_price[0].number, "102");
        assert!(inv.search_rooms("2500", PlacementFilter::Available).is_empty());
        assert_eq!(inv.search_rooms("", PlacementFilter::Booked).len(), 1);
        assert_eq!(inv.search_rooms("  ", PlacementFilter::All).len(), 3);

        let doubles = inv.filter_by_type(Some(RoomType::Double));
        assert_eq!(doubles.len(), 1);
        assert_eq!(inv.filter_by_type(None).len(), 3);

        let mut rooms = inv.filter_by_type(None);
        sort_rooms(&mut rooms, RoomSort::PriceDescending);
        let order: Vec<_> = rooms.iter().map(|r| r.number.as_str()).collect();
        assert_eq!(order, vec!["201", "102", "101"]);

        sort_rooms(&mut rooms, RoomSort::Type);
        let order: Vec<_> = rooms.iter().map(|r| r.number.as_str()).collect();
        assert_eq!(order, vec!["102", "101", "201"]);
    }

    #[test]
    fn test_set_amenities() {
        let mut inv = hotel();
        let room = inv
            .set_amenities("101", vec!["WiFi".into(), "WiFi".into(), " AC".into()])
            .unwrap();
        assert_eq!(room.amenities, vec!["WiFi", "AC"]);
        assert!(inv.set_amenities("9", vec![]).is_err());
    }
}
