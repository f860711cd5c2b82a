// Main library file for the hotel front desk

// Domain model and rules
pub mod booking;
pub mod error;
pub mod inventory;
pub mod pricing;
pub mod room;

// Persistence
pub mod snapshot;
pub mod store;

// Read-side projections
pub mod dashboard;
pub mod report;

// Service and transports
pub mod client;
pub mod desk;
pub mod wire;

// Re-export key types for convenience
pub use booking::{Booking, BookingChanges, BookingConfirmation, BookingRequest, BookingStage};
pub use client::{ApiError, ClientConfig, HotelClient, HttpTransport, LocalTransport, Transport};
pub use dashboard::{GuestRecord, Notification, NotificationKind, OccupancyStats, Priority};
pub use desk::FrontDesk;
pub use error::{DeskError, ErrorKind, InventoryError, SnapshotError, StoreError};
pub use inventory::{Inventory, InventoryConfig, PlacementFilter, RoomSort, RoomUpdate};
pub use report::{BookingReport, ReportRow};
pub use room::{Room, RoomStatus, RoomType};
pub use snapshot::Snapshot;
pub use store::{JsonFileStore, MemoryStore, StateSink};
pub use wire::{Command, RoomView, WireError, WireResponse};
