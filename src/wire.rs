// Wire layer: maps REST-style requests onto front desk operations
//
// Nothing here opens sockets. An HTTP server adapter hands `handle` the method,
// the request target and the decoded JSON body, and writes back the returned
// status, content type and body.

use chrono::{NaiveDate, Utc};
use percent_encoding::percent_decode_str;
use reqwest::{Method, Url};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::booking::{Booking, BookingChanges, BookingRequest};
use crate::desk::FrontDesk;
use crate::error::{DeskError, InventoryError};
use crate::inventory::{Inventory, RoomUpdate};
use crate::room::{Room, RoomStatus, RoomType};
use crate::store::StateSink;

pub const CONTENT_JSON: &str = "application/json";
pub const CONTENT_TEXT: &str = "text/plain; charset=utf-8";
pub const CONTENT_XML: &str = "application/xml";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Json,
    Text,
    Xml,
}

// One variant per front desk operation
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    ListRooms,
    ListAvailable,
    ListBooked,
    ListByStatus(RoomStatus),
    AddRoom {
        number: String,
        room_type: RoomType,
        price: f64,
    },
    UpdateRoom {
        number: String,
        update: RoomUpdate,
    },
    DeleteRoom {
        number: String,
    },
    SetRoomStatus {
        number: String,
        status: RoomStatus,
        notes: Option<String>,
    },
    SetAmenities {
        number: String,
        amenities: Vec<String>,
    },
    BookRoom {
        number: String,
        request: BookingRequest,
    },
    UnbookRoom {
        number: String,
    },
    CheckIn {
        number: String,
    },
    CheckOut {
        number: String,
    },
    ModifyBooking {
        number: String,
        changes: BookingChanges,
    },
    Guests,
    GuestHistory {
        guest_name: String,
    },
    Stats,
    Notifications {
        today: Option<NaiveDate>,
    },
    Report {
        format: ReportFormat,
    },
}

impl Command {
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Command::AddRoom { .. }
                | Command::UpdateRoom { .. }
                | Command::DeleteRoom { .. }
                | Command::SetRoomStatus { .. }
                | Command::SetAmenities { .. }
                | Command::BookRoom { .. }
                | Command::UnbookRoom { .. }
                | Command::CheckIn { .. }
                | Command::CheckOut { .. }
                | Command::ModifyBooking { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WireResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Value,
}

impl WireResponse {
    fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            content_type: CONTENT_JSON,
            body,
        }
    }

    fn error(status: u16, kind: &str, code: &str, message: impl Into<String>) -> Self {
        Self::json(
            status,
            json!({ "error": kind, "code": code, "message": message.into() }),
        )
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Error, Debug)]
pub enum WireError {
    #[error("No route for {0}")]
    RouteNotFound(String),

    #[error("Method {method} not allowed on {path}")]
    MethodNotAllowed { method: Method, path: String },

    #[error("Malformed request body: {0}")]
    BadBody(String),

    #[error("Invalid request target: {0}")]
    BadTarget(String),

    #[error(transparent)]
    Inventory(#[from] InventoryError),
}

impl WireError {
    pub fn to_response(&self) -> WireResponse {
        match self {
            WireError::RouteNotFound(_) => {
                WireResponse::error(404, "route_not_found", "RouteNotFound", self.to_string())
            }
            WireError::MethodNotAllowed { .. } => WireResponse::error(
                405,
                "method_not_allowed",
                "MethodNotAllowed",
                self.to_string(),
            ),
            WireError::BadBody(_) => {
                WireResponse::error(400, "invalid_input", "MalformedBody", self.to_string())
            }
            WireError::BadTarget(_) => {
                WireResponse::error(400, "invalid_input", "MalformedTarget", self.to_string())
            }
            WireError::Inventory(e) => inventory_failure(e),
        }
    }
}

fn inventory_failure(e: &InventoryError) -> WireResponse {
    let kind = e.kind();
    WireResponse::error(kind.status_code(), kind.as_str(), e.code(), e.to_string())
}

// Room as presented to clients: entity fields, display text and the active stay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomView {
    #[serde(flatten)]
    pub room: Room,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking: Option<Booking>,
}

// Request bodies

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RoomNumber {
    Text(String),
    Int(i64),
}

impl RoomNumber {
    fn into_string(self) -> String {
        match self {
            RoomNumber::Text(s) => s,
            RoomNumber::Int(n) => n.to_string(),
        }
    }
}

// Older clients send prices as form strings ("1500")
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PriceField {
    Number(f64),
    Text(String),
}

impl PriceField {
    fn into_price(self) -> Result<f64, WireError> {
        match self {
            PriceField::Number(price) => Ok(price),
            PriceField::Text(text) => text
                .trim()
                .parse::<f64>()
                .map_err(|_| WireError::BadBody(format!("price {:?} is not a number", text))),
        }
    }
}

#[derive(Debug, Deserialize)]
struct AddRoomBody {
    number: RoomNumber,
    #[serde(rename = "type", alias = "roomType")]
    room_type: String,
    price: PriceField,
}

#[derive(Debug, Deserialize)]
struct UpdateRoomBody {
    #[serde(default)]
    price: Option<PriceField>,
    #[serde(default, rename = "type", alias = "roomType")]
    room_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StatusBody {
    status: String,
    #[serde(default)]
    notes: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AmenitiesBody {
    #[serde(default)]
    amenities: Vec<String>,
}

fn parse_body<T: serde::de::DeserializeOwned>(body: Option<&Value>) -> Result<T, WireError> {
    let value = body.cloned().unwrap_or_else(|| json!({}));
    serde_json::from_value(value).map_err(|e| WireError::BadBody(e.to_string()))
}

fn parse_date(s: &str) -> Result<NaiveDate, WireError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| WireError::BadTarget(format!("bad date {:?}: {}", s, e)))
}

// Turns "METHOD /path?query" plus a JSON body into a command
pub fn route(method: &Method, target: &str, body: Option<&Value>) -> Result<Command, WireError> {
    let url = Url::parse("http://front-desk.local")
        .and_then(|base| base.join(target))
        .map_err(|e| WireError::BadTarget(e.to_string()))?;
    let segments: Vec<String> = url
        .path_segments()
        .map(|s| {
            s.filter(|p| !p.is_empty())
                .map(decode_segment)
                .collect::<Result<Vec<_>, _>>()
        })
        .transpose()?
        .unwrap_or_default();
    let query = |key: &str| {
        url.query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    };
    let path = url.path().to_string();
    let not_allowed = || WireError::MethodNotAllowed {
        method: method.clone(),
        path: path.clone(),
    };

    let parts: Vec<&str> = segments.iter().map(String::as_str).collect();
    match parts.as_slice() {
        ["rooms"] => match *method {
            Method::GET => match query("status").as_deref() {
                None | Some("") | Some("all") => Ok(Command::ListRooms),
                Some("booked") => Ok(Command::ListBooked),
                Some(other) => match RoomStatus::parse(other)? {
                    RoomStatus::Available => Ok(Command::ListAvailable),
                    status => Ok(Command::ListByStatus(status)),
                },
            },
            Method::POST => {
                let body: AddRoomBody = parse_body(body)?;
                Ok(Command::AddRoom {
                    number: body.number.into_string(),
                    room_type: RoomType::parse(&body.room_type)?,
                    price: body.price.into_price()?,
                })
            }
            _ => Err(not_allowed()),
        },
        ["rooms", number] => {
            let number = number.to_string();
            match *method {
                Method::PUT => {
                    let body: UpdateRoomBody = parse_body(body)?;
                    let room_type = body
                        .room_type
                        .as_deref()
                        .map(RoomType::parse)
                        .transpose()?;
                    Ok(Command::UpdateRoom {
                        number,
                        update: RoomUpdate {
                            price: body.price.map(PriceField::into_price).transpose()?,
                            room_type,
                        },
                    })
                }
                Method::DELETE => Ok(Command::DeleteRoom { number }),
                _ => Err(not_allowed()),
            }
        }
        ["rooms", number, action] => {
            let number = number.to_string();
            match (method.clone(), *action) {
                (Method::PUT, "status") => {
                    let body: StatusBody = parse_body(body)?;
                    Ok(Command::SetRoomStatus {
                        number,
                        status: RoomStatus::parse(&body.status)?,
                        notes: body.notes,
                    })
                }
                (Method::PUT, "amenities") => {
                    let body: AmenitiesBody = parse_body(body)?;
                    Ok(Command::SetAmenities {
                        number,
                        amenities: body.amenities,
                    })
                }
                (Method::POST, "book") => Ok(Command::BookRoom {
                    number,
                    request: parse_body(body)?,
                }),
                (Method::POST, "unbook") => Ok(Command::UnbookRoom { number }),
                (Method::POST, "checkin") => Ok(Command::CheckIn { number }),
                (Method::POST, "checkout") => Ok(Command::CheckOut { number }),
                (Method::PUT, "booking") => Ok(Command::ModifyBooking {
                    number,
                    changes: parse_body(body)?,
                }),
                (_, "status" | "amenities" | "book" | "unbook" | "checkin" | "checkout" | "booking") => {
                    Err(not_allowed())
                }
                _ => Err(WireError::RouteNotFound(path.clone())),
            }
        }
        ["guests"] if *method == Method::GET => Ok(Command::Guests),
        ["guests", name, "history"] if *method == Method::GET => Ok(Command::GuestHistory {
            guest_name: name.to_string(),
        }),
        ["stats"] if *method == Method::GET => Ok(Command::Stats),
        ["notifications"] if *method == Method::GET => Ok(Command::Notifications {
            today: query("today").as_deref().map(parse_date).transpose()?,
        }),
        ["report"] if *method == Method::GET => {
            let format = match query("format").as_deref() {
                None | Some("json") => ReportFormat::Json,
                Some("text") => ReportFormat::Text,
                Some("xml") => ReportFormat::Xml,
                Some(other) => {
                    return Err(WireError::BadTarget(format!("unknown report format {}", other)))
                }
            };
            Ok(Command::Report { format })
        }
        ["guests"] | ["guests", _, "history"] | ["stats"] | ["notifications"] | ["report"] => {
            Err(not_allowed())
        }
        _ => Err(WireError::RouteNotFound(path.clone())),
    }
}

// Path segments arrive percent-encoded; names with spaces are common
fn decode_segment(segment: &str) -> Result<String, WireError> {
    percent_decode_str(segment)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|e| WireError::BadTarget(format!("path segment {:?}: {}", segment, e)))
}

fn room_view(room: Room, booking: Option<Booking>, currency_symbol: &str) -> RoomView {
    RoomView {
        description: room.description(currency_symbol),
        room,
        booking,
    }
}

fn room_views<S: StateSink>(
    desk: &FrontDesk<S>,
    select: impl FnOnce(&Inventory) -> Vec<Room>,
) -> Value {
    let symbol = desk.currency_symbol();
    let views: Vec<RoomView> = desk
        .rooms_with_bookings(select)
        .into_iter()
        .map(|(room, booking)| room_view(room, booking, &symbol))
        .collect();
    json!(views)
}

// Re-reads a changed room so the room and its booking come from the same state
fn changed_room<S: StateSink>(desk: &FrontDesk<S>, room: Room) -> Value {
    let symbol = desk.currency_symbol();
    let view = match desk.room_with_booking(&room.number) {
        Some((current, booking)) => room_view(current, booking, &symbol),
        None => room_view(room, None, &symbol),
    };
    to_value(view)
}

fn to_value<T: Serialize>(value: T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

pub fn dispatch<S: StateSink>(desk: &FrontDesk<S>, command: Command) -> WireResponse {
    let result: Result<(u16, Value), DeskError> = match command {
        Command::ListRooms => Ok((200, room_views(desk, |inv| inv.rooms().to_vec()))),
        Command::ListAvailable => Ok((200, room_views(desk, Inventory::list_available))),
        Command::ListBooked => Ok((200, room_views(desk, Inventory::list_booked))),
        Command::ListByStatus(status) => {
            Ok((200, room_views(desk, |inv| inv.list_by_status(status))))
        }
        Command::AddRoom {
            number,
            room_type,
            price,
        } => desk
            .add_room(&number, room_type, price)
            .map(|room| (201, changed_room(desk, room))),
        Command::UpdateRoom { number, update } => desk
            .update_room(&number, update)
            .map(|room| (200, changed_room(desk, room))),
        Command::DeleteRoom { number } => desk
            .delete_room(&number)
            .map(|room| (200, json!({ "ok": true, "number": room.number }))),
        Command::SetRoomStatus {
            number,
            status,
            notes,
        } => desk
            .set_room_status(&number, status, notes)
            .map(|room| (200, changed_room(desk, room))),
        Command::SetAmenities { number, amenities } => desk
            .set_amenities(&number, amenities)
            .map(|room| (200, changed_room(desk, room))),
        Command::BookRoom { number, request } => desk
            .book_room(&number, request)
            .map(|confirmation| (200, to_value(confirmation))),
        Command::UnbookRoom { number } => desk
            .unbook_room(&number)
            .map(|booking| (200, to_value(booking))),
        Command::CheckIn { number } => desk.check_in(&number).map(|b| (200, to_value(b))),
        Command::CheckOut { number } => desk.check_out(&number).map(|b| (200, to_value(b))),
        Command::ModifyBooking { number, changes } => desk
            .modify_booking(&number, changes)
            .map(|b| (200, to_value(b))),
        Command::Guests => Ok((200, to_value(desk.guests()))),
        Command::GuestHistory { guest_name } => Ok((200, to_value(desk.guest_history(&guest_name)))),
        Command::Stats => Ok((200, to_value(desk.stats()))),
        Command::Notifications { today } => {
            let today = today.unwrap_or_else(|| Utc::now().date_naive());
            Ok((200, to_value(desk.notifications(today))))
        }
        Command::Report { format } => return render_report(desk, format),
    };

    match result {
        Ok((status, body)) => WireResponse::json(status, body),
        Err(DeskError::Inventory(e)) => inventory_failure(&e),
        Err(DeskError::Store(e)) => {
            warn!(error = %e, "persistence fault while serving request");
            WireResponse::error(500, "internal", "PersistenceFailed", e.to_string())
        }
    }
}

fn render_report<S: StateSink>(desk: &FrontDesk<S>, format: ReportFormat) -> WireResponse {
    let report = desk.report();
    match format {
        ReportFormat::Json => WireResponse::json(200, to_value(report)),
        ReportFormat::Text => WireResponse {
            status: 200,
            content_type: CONTENT_TEXT,
            body: Value::String(report.render_text("Bookings Report", &desk.currency_symbol())),
        },
        ReportFormat::Xml => match report.to_xml() {
            Ok(xml) => WireResponse {
                status: 200,
                content_type: CONTENT_XML,
                body: Value::String(xml),
            },
            Err(e) => WireResponse::error(500, "internal", "RenderFailed", e.to_string()),
        },
    }
}

// Full request cycle: route, then dispatch
pub fn handle<S: StateSink>(
    desk: &FrontDesk<S>,
    method: &Method,
    target: &str,
    body: Option<&Value>,
) -> WireResponse {
    let response = match route(method, target, body) {
        Ok(command) => dispatch(desk, command),
        Err(e) => e.to_response(),
    };
    debug!(%method, target, status = response.status, "request handled");
    response
}

// Same as `handle`, for adapters holding the raw request bytes
pub fn handle_raw<S: StateSink>(
    desk: &FrontDesk<S>,
    method: &Method,
    target: &str,
    body: &[u8],
) -> WireResponse {
    if body.iter().all(u8::is_ascii_whitespace) {
        return handle(desk, method, target, None);
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(value) => handle(desk, method, target, Some(&value)),
        Err(e) => WireError::BadBody(e.to_string()).to_response(),
    }
}
