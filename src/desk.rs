// Front desk: owns one inventory behind a lock and persists after every change
//
// Mutations run on a working copy under the write lock. The copy only replaces
// the live inventory once the state sink has accepted its snapshot, so readers
// never see a half-applied or unpersisted change.

use chrono::NaiveDate;
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::booking::{Booking, BookingChanges, BookingConfirmation, BookingRequest};
use crate::dashboard::{self, GuestRecord, Notification, OccupancyStats};
use crate::error::{DeskError, InventoryError, StoreError};
use crate::inventory::{Inventory, InventoryConfig, PlacementFilter, RoomUpdate};
use crate::report::{self, BookingReport};
use crate::room::{Room, RoomStatus, RoomType};
use crate::snapshot::Snapshot;
use crate::store::StateSink;

pub struct FrontDesk<S: StateSink> {
    inventory: RwLock<Inventory>,
    sink: S,
}

impl<S: StateSink> FrontDesk<S> {
    // Restores whatever the sink holds; an empty sink starts an empty hotel
    pub fn open(sink: S, config: InventoryConfig) -> Result<Self, DeskError> {
        let inventory = match sink.load()? {
            Some(snapshot) => Inventory::import(snapshot, config).map_err(StoreError::from)?,
            None => Inventory::new(config),
        };
        info!(
            rooms = inventory.rooms().len(),
            bookings = inventory.bookings().len(),
            "front desk opened"
        );
        Ok(Self::with_inventory(inventory, sink))
    }

    pub fn with_inventory(inventory: Inventory, sink: S) -> Self {
        Self {
            inventory: RwLock::new(inventory),
            sink,
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    fn mutate<T>(
        &self,
        operation: &'static str,
        apply: impl FnOnce(&mut Inventory) -> Result<T, InventoryError>,
    ) -> Result<T, DeskError> {
        let mut live = self.inventory.write();
        let mut next = live.clone();

        let value = match apply(&mut next) {
            Ok(value) => value,
            Err(e) => {
                warn!(operation, kind = %e.kind(), error = %e, "operation refused");
                return Err(e.into());
            }
        };

        if let Err(e) = self.sink.save(&next.export()) {
            warn!(operation, error = %e, "could not persist state, change discarded");
            return Err(e.into());
        }

        *live = next;
        info!(operation, "state updated");
        Ok(value)
    }

    fn read<T>(&self, view: impl FnOnce(&Inventory) -> T) -> T {
        view(&*self.inventory.read())
    }

    // ---- Mutations ----

    pub fn add_room(&self, number: &str, room_type: RoomType, price: f64) -> Result<Room, DeskError> {
        self.mutate("add_room", |inv| inv.add_room(number, room_type, price))
    }

    pub fn update_room(&self, number: &str, update: RoomUpdate) -> Result<Room, DeskError> {
        self.mutate("update_room", |inv| inv.update_room(number, update))
    }

    pub fn delete_room(&self, number: &str) -> Result<Room, DeskError> {
        self.mutate("delete_room", |inv| inv.delete_room(number))
    }

    pub fn set_room_status(
        &self,
        number: &str,
        status: RoomStatus,
        notes: Option<String>,
    ) -> Result<Room, DeskError> {
        self.mutate("set_room_status", |inv| {
            inv.set_room_status(number, status, notes)
        })
    }

    pub fn set_amenities(&self, number: &str, amenities: Vec<String>) -> Result<Room, DeskError> {
        self.mutate("set_amenities", |inv| inv.set_amenities(number, amenities))
    }

    pub fn book_room(
        &self,
        number: &str,
        request: BookingRequest,
    ) -> Result<BookingConfirmation, DeskError> {
        self.mutate("book_room", |inv| inv.book_room(number, request))
    }

    pub fn unbook_room(&self, number: &str) -> Result<Booking, DeskError> {
        self.mutate("unbook_room", |inv| inv.unbook_room(number))
    }

    pub fn check_in(&self, number: &str) -> Result<Booking, DeskError> {
        self.mutate("check_in", |inv| inv.check_in(number))
    }

    pub fn check_out(&self, number: &str) -> Result<Booking, DeskError> {
        self.mutate("check_out", |inv| inv.check_out(number))
    }

    pub fn modify_booking(&self, number: &str, changes: BookingChanges) -> Result<Booking, DeskError> {
        self.mutate("modify_booking", |inv| inv.modify_booking(number, changes))
    }

    // ---- Projections ----

    pub fn rooms(&self) -> Vec<Room> {
        self.read(|inv| inv.rooms().to_vec())
    }

    pub fn room(&self, number: &str) -> Option<Room> {
        self.read(|inv| inv.room(number).cloned())
    }

    pub fn active_booking(&self, number: &str) -> Option<Booking> {
        self.read(|inv| inv.active_booking(number).cloned())
    }

    // Rooms paired with their active booking, both taken under one read lock
    pub fn rooms_with_bookings(
        &self,
        select: impl FnOnce(&Inventory) -> Vec<Room>,
    ) -> Vec<(Room, Option<Booking>)> {
        self.read(|inv| {
            select(inv)
                .into_iter()
                .map(|room| {
                    let booking = inv.active_booking(&room.number).cloned();
                    (room, booking)
                })
                .collect()
        })
    }

    pub fn room_with_booking(&self, number: &str) -> Option<(Room, Option<Booking>)> {
        self.read(|inv| {
            inv.room(number)
                .map(|room| (room.clone(), inv.active_booking(number).cloned()))
        })
    }

    pub fn list_available(&self) -> Vec<Room> {
        self.read(Inventory::list_available)
    }

    pub fn list_booked(&self) -> Vec<Room> {
        self.read(Inventory::list_booked)
    }

    pub fn list_by_status(&self, status: RoomStatus) -> Vec<Room> {
        self.read(|inv| inv.list_by_status(status))
    }

    pub fn guest_history(&self, guest_name: &str) -> Vec<Booking> {
        debug!(guest = guest_name, "guest history requested");
        self.read(|inv| inv.guest_history(guest_name))
    }

    pub fn search_rooms(&self, query: &str, filter: PlacementFilter) -> Vec<Room> {
        self.read(|inv| inv.search_rooms(query, filter))
    }

    pub fn report(&self) -> BookingReport {
        self.read(report::generate_report)
    }

    pub fn stats(&self) -> OccupancyStats {
        self.read(dashboard::occupancy_stats)
    }

    pub fn guests(&self) -> Vec<GuestRecord> {
        self.read(dashboard::guest_directory)
    }

    pub fn notifications(&self, today: NaiveDate) -> Vec<Notification> {
        self.read(|inv| dashboard::notifications(inv, today))
    }

    pub fn currency_symbol(&self) -> String {
        self.read(|inv| inv.config().currency_symbol.clone())
    }

    pub fn export(&self) -> Snapshot {
        self.read(Inventory::export)
    }
}
