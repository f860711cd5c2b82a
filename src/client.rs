// Async client for the front desk API
//
// `HotelClient` speaks the route table from the wire layer. The transport is a
// seam: `HttpTransport` goes over the network with reqwest, `LocalTransport`
// hands requests straight to an in-process front desk.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::booking::{Booking, BookingChanges, BookingConfirmation, BookingRequest};
use crate::dashboard::{GuestRecord, Notification, OccupancyStats};
use crate::desk::FrontDesk;
use crate::error::ErrorKind;
use crate::inventory::RoomUpdate;
use crate::report::BookingReport;
use crate::room::{RoomStatus, RoomType};
use crate::store::StateSink;
use crate::wire::{self, RoomView, WireResponse, CONTENT_JSON, CONTENT_TEXT, CONTENT_XML};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timeout after {0}ms")]
    Timeout(u64),

    #[error("API error: {status} {code} - {message}")]
    Api {
        status: u16,
        kind: Option<ErrorKind>,
        code: String,
        message: String,
    },

    #[error("Could not decode response: {0}")]
    Decode(String),

    #[error("Client error: {0}")]
    Client(String),
}

impl ApiError {
    // Failure class reported by the server, if the request got that far
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            ApiError::Api { kind, .. } => *kind,
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    fn from_response(response: WireResponse) -> Self {
        let field = |name: &str| {
            response
                .body
                .get(name)
                .and_then(Value::as_str)
                .map(str::to_string)
        };
        ApiError::Api {
            status: response.status,
            kind: field("error").and_then(|k| ErrorKind::from_str(&k)),
            code: field("code").unwrap_or_default(),
            message: field("message").unwrap_or_else(|| match &response.body {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout_ms: u64,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            timeout_ms: 5000,
            user_agent: concat!("hotel-desk/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

// Carries one request to the front desk and brings back its response
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn send(
        &self,
        method: Method,
        target: &str,
        body: Option<Value>,
    ) -> Result<WireResponse, ApiError>;
}

pub struct HttpTransport {
    client: reqwest::Client,
    config: ClientConfig,
}

impl HttpTransport {
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ApiError::Client(e.to_string()))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn transport_error(&self, e: reqwest::Error) -> ApiError {
        if e.is_timeout() {
            ApiError::Timeout(self.config.timeout_ms)
        } else {
            ApiError::Network(e.to_string())
        }
    }
}

fn content_type_of(header: Option<&str>) -> &'static str {
    match header {
        Some(h) if h.contains("json") => CONTENT_JSON,
        Some(h) if h.contains("xml") => CONTENT_XML,
        _ => CONTENT_TEXT,
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        method: Method,
        target: &str,
        body: Option<Value>,
    ) -> Result<WireResponse, ApiError> {
        let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), target);
        let mut request = self.client.request(method, url.as_str());
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await.map_err(|e| self.transport_error(e))?;
        let status = response.status().as_u16();
        let content_type = content_type_of(
            response
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok()),
        );
        let text = response.text().await.map_err(|e| self.transport_error(e))?;

        let body = if content_type == CONTENT_JSON && !text.trim().is_empty() {
            serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))?
        } else {
            Value::String(text)
        };
        Ok(WireResponse {
            status,
            content_type,
            body,
        })
    }
}

// Serves requests from a front desk living in the same process. The desk takes
// blocking locks and may write files, so each request runs on tokio's blocking pool.
pub struct LocalTransport<S: StateSink> {
    desk: Arc<FrontDesk<S>>,
}

impl<S: StateSink> LocalTransport<S> {
    pub fn new(desk: Arc<FrontDesk<S>>) -> Self {
        Self { desk }
    }

    pub fn desk(&self) -> &Arc<FrontDesk<S>> {
        &self.desk
    }
}

#[async_trait]
impl<S: StateSink> Transport for LocalTransport<S> {
    async fn send(
        &self,
        method: Method,
        target: &str,
        body: Option<Value>,
    ) -> Result<WireResponse, ApiError> {
        let desk = Arc::clone(&self.desk);
        let target = target.to_string();
        tokio::task::spawn_blocking(move || wire::handle(&desk, &method, &target, body.as_ref()))
            .await
            .map_err(|e| ApiError::Client(format!("front desk task failed: {}", e)))
    }
}

// Percent-encodes each segment into an absolute path
fn target(segments: &[&str]) -> Result<String, ApiError> {
    let mut url = Url::parse("http://front-desk.local/").map_err(|e| ApiError::Client(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| ApiError::Client("cannot build request path".to_string()))?
        .clear()
        .extend(segments);
    Ok(url.path().to_string())
}

fn decode<T: DeserializeOwned>(response: WireResponse) -> Result<T, ApiError> {
    if !response.is_success() {
        return Err(ApiError::from_response(response));
    }
    serde_json::from_value(response.body).map_err(|e| ApiError::Decode(e.to_string()))
}

fn decode_text(response: WireResponse) -> Result<String, ApiError> {
    if !response.is_success() {
        return Err(ApiError::from_response(response));
    }
    match response.body {
        Value::String(text) => Ok(text),
        other => Err(ApiError::Decode(format!("expected a text body, got {}", other))),
    }
}

pub struct HotelClient<T: Transport> {
    transport: T,
}

impl HotelClient<HttpTransport> {
    pub fn http(config: ClientConfig) -> Result<Self, ApiError> {
        Ok(Self::new(HttpTransport::new(config)?))
    }
}

impl<S: StateSink> HotelClient<LocalTransport<S>> {
    pub fn local(desk: Arc<FrontDesk<S>>) -> Self {
        Self::new(LocalTransport::new(desk))
    }
}

impl<T: Transport> HotelClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn call(
        &self,
        method: Method,
        target: &str,
        body: Option<Value>,
    ) -> Result<WireResponse, ApiError> {
        debug!(%method, target, "sending request");
        let response = self.transport.send(method.clone(), target, body).await?;
        if !response.is_success() {
            warn!(%method, target, status = response.status, "request refused");
        }
        Ok(response)
    }

    async fn get<R: DeserializeOwned>(&self, target: &str) -> Result<R, ApiError> {
        decode(self.call(Method::GET, target, None).await?)
    }

    // ---- Rooms ----

    pub async fn rooms(&self) -> Result<Vec<RoomView>, ApiError> {
        self.get("/rooms").await
    }

    pub async fn available_rooms(&self) -> Result<Vec<RoomView>, ApiError> {
        self.get("/rooms?status=available").await
    }

    pub async fn booked_rooms(&self) -> Result<Vec<RoomView>, ApiError> {
        self.get("/rooms?status=booked").await
    }

    pub async fn rooms_with_status(&self, status: RoomStatus) -> Result<Vec<RoomView>, ApiError> {
        self.get(&format!("/rooms?status={}", status.as_str())).await
    }

    pub async fn add_room(
        &self,
        number: &str,
        room_type: RoomType,
        price: f64,
    ) -> Result<RoomView, ApiError> {
        let body = json!({ "number": number, "type": room_type.wire_name(), "price": price });
        decode(self.call(Method::POST, "/rooms", Some(body)).await?)
    }

    pub async fn update_room(&self, number: &str, update: RoomUpdate) -> Result<RoomView, ApiError> {
        let body = serde_json::to_value(update).map_err(|e| ApiError::Client(e.to_string()))?;
        decode(self.call(Method::PUT, &target(&["rooms", number])?, Some(body)).await?)
    }

    pub async fn delete_room(&self, number: &str) -> Result<(), ApiError> {
        let _: Value = decode(self.call(Method::DELETE, &target(&["rooms", number])?, None).await?)?;
        Ok(())
    }

    pub async fn set_room_status(
        &self,
        number: &str,
        status: RoomStatus,
        notes: Option<&str>,
    ) -> Result<RoomView, ApiError> {
        let body = json!({ "status": status.as_str(), "notes": notes });
        let path = target(&["rooms", number, "status"])?;
        decode(self.call(Method::PUT, &path, Some(body)).await?)
    }

    pub async fn set_amenities(
        &self,
        number: &str,
        amenities: &[String],
    ) -> Result<RoomView, ApiError> {
        let path = target(&["rooms", number, "amenities"])?;
        decode(
            self.call(Method::PUT, &path, Some(json!({ "amenities": amenities })))
                .await?,
        )
    }

    // ---- Bookings ----

    pub async fn book_room(
        &self,
        number: &str,
        request: &BookingRequest,
    ) -> Result<BookingConfirmation, ApiError> {
        let body = serde_json::to_value(request).map_err(|e| ApiError::Client(e.to_string()))?;
        let path = target(&["rooms", number, "book"])?;
        decode(self.call(Method::POST, &path, Some(body)).await?)
    }

    pub async fn unbook_room(&self, number: &str) -> Result<Booking, ApiError> {
        let path = target(&["rooms", number, "unbook"])?;
        decode(self.call(Method::POST, &path, None).await?)
    }

    pub async fn check_in(&self, number: &str) -> Result<Booking, ApiError> {
        let path = target(&["rooms", number, "checkin"])?;
        decode(self.call(Method::POST, &path, None).await?)
    }

    pub async fn check_out(&self, number: &str) -> Result<Booking, ApiError> {
        let path = target(&["rooms", number, "checkout"])?;
        decode(self.call(Method::POST, &path, None).await?)
    }

    pub async fn modify_booking(
        &self,
        number: &str,
        changes: &BookingChanges,
    ) -> Result<Booking, ApiError> {
        let body = serde_json::to_value(changes).map_err(|e| ApiError::Client(e.to_string()))?;
        let path = target(&["rooms", number, "booking"])?;
        decode(self.call(Method::PUT, &path, Some(body)).await?)
    }

    // ---- Dashboard ----

    pub async fn guests(&self) -> Result<Vec<GuestRecord>, ApiError> {
        self.get("/guests").await
    }

    pub async fn guest_history(&self, guest_name: &str) -> Result<Vec<Booking>, ApiError> {
        self.get(&target(&["guests", guest_name, "history"])?).await
    }

    pub async fn stats(&self) -> Result<OccupancyStats, ApiError> {
        self.get("/stats").await
    }

    // Without a date the server uses its own idea of today
    pub async fn notifications(&self, today: Option<NaiveDate>) -> Result<Vec<Notification>, ApiError> {
        match today {
            Some(day) => self.get(&format!("/notifications?today={}", day.format("%Y-%m-%d"))).await,
            None => self.get("/notifications").await,
        }
    }

    pub async fn report(&self) -> Result<BookingReport, ApiError> {
        self.get("/report").await
    }

    pub async fn report_text(&self) -> Result<String, ApiError> {
        decode_text(self.call(Method::GET, "/report?format=text", None).await?)
    }

    pub async fn report_xml(&self) -> Result<String, ApiError> {
        decode_text(self.call(Method::GET, "/report?format=xml", None).await?)
    }
}
