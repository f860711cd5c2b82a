// Error types shared by the inventory, the front desk and the wire layer

use serde::{Deserialize, Serialize};
use thiserror::Error;

// Coarse failure classes surfaced to transports and the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    Conflict,
    InvalidInput,
    PreconditionFailed,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::PreconditionFailed => "precondition_failed",
        }
    }

    // HTTP status a transport should answer with
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorKind::NotFound => 404,
            ErrorKind::Conflict => 409,
            ErrorKind::InvalidInput => 400,
            ErrorKind::PreconditionFailed => 412,
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "not_found" => Some(ErrorKind::NotFound),
            "conflict" => Some(ErrorKind::Conflict),
            "invalid_input" => Some(ErrorKind::InvalidInput),
            "precondition_failed" => Some(ErrorKind::PreconditionFailed),
            _ => None,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// Every way an inventory operation can be refused
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InventoryError {
    #[error("Room {0} not found")]
    RoomNotFound(String),

    #[error("Room {0} already exists")]
    DuplicateRoom(String),

    #[error("Room number must not be empty")]
    InvalidRoomNumber,

    #[error("Invalid price {0}: must be a positive amount")]
    InvalidPrice(f64),

    #[error("Invalid room type: {0}")]
    InvalidRoomType(String),

    #[error("Invalid room status: {0}")]
    InvalidStatus(String),

    #[error("Cannot delete room {0} while it is booked; unbook it first")]
    RoomCurrentlyBooked(String),

    #[error("Room {0} is already booked")]
    RoomAlreadyBooked(String),

    #[error("Check-out ({check_out}) must be after check-in ({check_in})")]
    InvalidDateRange {
        check_in: chrono::NaiveDate,
        check_out: chrono::NaiveDate,
    },

    #[error("Guest name is required")]
    InvalidGuestName,

    #[error("Guest count must be at least 1")]
    InvalidGuestCount,

    #[error("Room {0} has no active booking")]
    NoActiveBooking(String),

    #[error("No booking with confirmation number {0}")]
    BookingNotFound(String),

    #[error("Guest in room {0} is already checked in")]
    AlreadyCheckedIn(String),

    #[error("Guest in room {0} has not checked in yet")]
    NotYetCheckedIn(String),

    #[error("Guest in room {0} is already checked out")]
    AlreadyCheckedOut(String),

    #[error("Booking for room {0} is checked out and can no longer change")]
    BookingAlreadyCheckedOut(String),
}

impl InventoryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            InventoryError::RoomNotFound(_)
            | InventoryError::NoActiveBooking(_)
            | InventoryError::BookingNotFound(_) => ErrorKind::NotFound,
            InventoryError::DuplicateRoom(_)
            | InventoryError::RoomAlreadyBooked(_)
            | InventoryError::AlreadyCheckedIn(_)
            | InventoryError::AlreadyCheckedOut(_) => ErrorKind::Conflict,
            InventoryError::InvalidRoomNumber
            | InventoryError::InvalidPrice(_)
            | InventoryError::InvalidRoomType(_)
            | InventoryError::InvalidStatus(_)
            | InventoryError::InvalidDateRange { .. }
            | InventoryError::InvalidGuestName
            | InventoryError::InvalidGuestCount => ErrorKind::InvalidInput,
            InventoryError::RoomCurrentlyBooked(_)
            | InventoryError::BookingAlreadyCheckedOut(_)
            | InventoryError::NotYetCheckedIn(_) => ErrorKind::PreconditionFailed,
        }
    }

    // Machine-readable variant name carried in wire error bodies
    pub fn code(&self) -> &'static str {
        match self {
            InventoryError::RoomNotFound(_) => "RoomNotFound",
            InventoryError::DuplicateRoom(_) => "DuplicateRoom",
            InventoryError::InvalidRoomNumber => "InvalidRoomNumber",
            InventoryError::InvalidPrice(_) => "InvalidPrice",
            InventoryError::InvalidRoomType(_) => "InvalidRoomType",
            InventoryError::InvalidStatus(_) => "InvalidStatus",
            InventoryError::RoomCurrentlyBooked(_) => "RoomCurrentlyBooked",
            InventoryError::RoomAlreadyBooked(_) => "RoomAlreadyBooked",
            InventoryError::InvalidDateRange { .. } => "InvalidDateRange",
            InventoryError::InvalidGuestName => "InvalidGuestName",
            InventoryError::InvalidGuestCount => "InvalidGuestCount",
            InventoryError::NoActiveBooking(_) => "NoActiveBooking",
            InventoryError::BookingNotFound(_) => "BookingNotFound",
            InventoryError::AlreadyCheckedIn(_) => "AlreadyCheckedIn",
            InventoryError::NotYetCheckedIn(_) => "NotYetCheckedIn",
            InventoryError::AlreadyCheckedOut(_) => "AlreadyCheckedOut",
            InventoryError::BookingAlreadyCheckedOut(_) => "BookingAlreadyCheckedOut",
        }
    }
}

// Reasons a persisted snapshot is refused at import time
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SnapshotError {
    #[error("Duplicate room number {0} in snapshot")]
    DuplicateRoom(String),

    #[error("Duplicate confirmation number {0} in snapshot")]
    DuplicateConfirmation(String),

    #[error("Room {0} has more than one active booking")]
    MultipleActiveBookings(String),

    #[error("Active booking {confirmation} references unknown room {room_number}")]
    UnknownRoom {
        room_number: String,
        confirmation: String,
    },

    #[error("Room {room_number} is stored as booked={stored} but its bookings say booked={derived}")]
    BookedFlagMismatch {
        room_number: String,
        stored: bool,
        derived: bool,
    },

    #[error("Invalid room {room_number}: {reason}")]
    InvalidRoom { room_number: String, reason: String },

    #[error("Invalid booking {confirmation}: {reason}")]
    InvalidBooking {
        confirmation: String,
        reason: String,
    },
}

// Persistence failures raised by state sinks
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Rejected snapshot: {0}")]
    Snapshot(#[from] SnapshotError),
}

// Front desk failures: either the operation was refused or it could not be persisted
#[derive(Error, Debug)]
pub enum DeskError {
    #[error(transparent)]
    Inventory(#[from] InventoryError),

    #[error("Persistence failed: {0}")]
    Store(#[from] StoreError),
}

impl DeskError {
    // None means an unexpected fault rather than a refused request
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            DeskError::Inventory(e) => Some(e.kind()),
            DeskError::Store(_) => None,
        }
    }
}
