//! Synchronous client for the Events Force REST API attendees resource.
//!
//! # Overview
//! `Attendees` validates caller input, builds endpoint-relative `Request`
//! values and hands them to a `Client`, which resolves them against the
//! account's base URL, adds Basic auth and delegates to an injected
//! `Transport`. Responses are returned raw; this crate never interprets a
//! status code or body on the caller's behalf.
//!
//! # Design
//! - Loosely typed input (`serde_json::Value`) and native Rust values both
//!   convert into validated newtypes through `TryFrom`, so each precondition
//!   lives in exactly one place.
//! - The selected event is per-handle state; take one `Attendees` handle
//!   per event.
//! - Every operation has a `build_*` twin that stops before I/O, keeping
//!   the request construction deterministic and testable.
//!
//! ```no_run
//! use eventsforce_core::{AttendeeQuery, Client, ClientConfig};
//!
//! # fn main() -> Result<(), eventsforce_core::ApiError> {
//! let client = Client::from_config(ClientConfig::new("acme", "api-key"))?;
//! let mut attendees = client.attendees();
//! attendees.set_event(42u64)?;
//! let response = attendees.list(AttendeeQuery::new().payment_status("paid"))?;
//! println!("{} {}", response.status, response.text());
//! # Ok(())
//! # }
//! ```

pub mod attendees;
pub mod client;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod http;
pub mod request;
pub mod scope;
pub mod transport;
pub mod types;

pub use attendees::Attendees;
pub use client::Client;
pub use config::ClientConfig;
pub use error::{ApiError, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use request::Request;
pub use scope::{EventId, EventScope};
pub use transport::{Transport, UreqTransport};
pub use types::{AttendeeId, AttendeeQuery, AttendeeUpdate, Credentials, Password, UserId};
