//! The attendees resource: `events/{eventId}/attendees...`.
//!
//! Each operation validates its arguments in order, then reads the event
//! scope, then builds the request. Nothing is sent unless all three steps
//! succeed. The `build_*` methods stop there and return the `Request`; the
//! plain methods also send it through the client and return the raw
//! response.

use tracing::debug;

use crate::client::Client;
use crate::endpoint::{self, Segment};
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpResponse};
use crate::request::Request;
use crate::scope::{EventId, EventScope};
use crate::transport::{Transport, UreqTransport};
use crate::types::{AttendeeId, AttendeeQuery, AttendeeUpdate, Credentials, Password, UserId};

/// Path prefix shared by every event-scoped resource.
pub const EVENTS_BASE: &str = "events";

/// Handle to the attendees of one event at a time.
///
/// The selected event lives in this handle. Work against several events at
/// once by taking one handle per event from `Client::attendees`.
pub struct Attendees<T = UreqTransport> {
    client: Client<T>,
    scope: EventScope,
}

impl<T: Transport> Attendees<T> {
    pub fn new(client: Client<T>) -> Self {
        Attendees {
            client,
            scope: EventScope::new(),
        }
    }

    /// A handle already scoped to `event_id`.
    pub fn for_event<I>(client: Client<T>, event_id: I) -> Result<Self, ApiError>
    where
        I: TryInto<EventId>,
        ApiError: From<I::Error>,
    {
        let mut attendees = Attendees::new(client);
        attendees.set_event(event_id)?;
        Ok(attendees)
    }

    pub fn set_event<I>(&mut self, event_id: I) -> Result<EventId, ApiError>
    where
        I: TryInto<EventId>,
        ApiError: From<I::Error>,
    {
        let id = self.scope.set(event_id)?;
        debug!(event_id = %id, "attendees scoped to event");
        Ok(id)
    }

    pub fn event_id(&self) -> Result<EventId, ApiError> {
        self.scope.get()
    }

    pub fn client(&self) -> &Client<T> {
        &self.client
    }

    /// `events/` followed by `segments`.
    pub fn gen_endpoint<S>(&self, segments: S) -> Result<String, ApiError>
    where
        S: TryInto<endpoint::Segments>,
        ApiError: From<S::Error>,
    {
        endpoint::build(EVENTS_BASE, segments)
    }

    fn event_endpoint(&self, tail: &[Segment]) -> Result<String, ApiError> {
        let mut segments = vec![Segment::from(self.scope.get()?)];
        segments.extend_from_slice(tail);
        self.gen_endpoint(segments)
    }

    pub fn build_list<Q>(&self, query: Q) -> Result<Request, ApiError>
    where
        Q: TryInto<AttendeeQuery>,
        ApiError: From<Q::Error>,
    {
        let query = query.try_into()?;
        let endpoint = self.event_endpoint(&[Segment::from("attendees.json")])?;
        Ok(Request::new(endpoint).with_query(query.into_pairs()))
    }

    /// GET every attendee of the event matching `query`.
    ///
    /// `query` may be an `AttendeeQuery` or a JSON object; any other JSON
    /// value is an `InvalidArgument`.
    pub fn list<Q>(&self, query: Q) -> Result<HttpResponse, ApiError>
    where
        Q: TryInto<AttendeeQuery>,
        ApiError: From<Q::Error>,
    {
        self.client.send(self.build_list(query)?)
    }

    /// `list` without filters.
    pub fn list_all(&self) -> Result<HttpResponse, ApiError> {
        self.list(AttendeeQuery::new())
    }

    pub fn build_get<I>(&self, attendee_id: I) -> Result<Request, ApiError>
    where
        I: TryInto<AttendeeId>,
        ApiError: From<I::Error>,
    {
        let attendee_id = attendee_id.try_into()?;
        let endpoint =
            self.event_endpoint(&[Segment::from("attendees"), Segment::from(&attendee_id)])?;
        Ok(Request::new(endpoint))
    }

    pub fn get<I>(&self, attendee_id: I) -> Result<HttpResponse, ApiError>
    where
        I: TryInto<AttendeeId>,
        ApiError: From<I::Error>,
    {
        self.client.send(self.build_get(attendee_id)?)
    }

    pub fn build_update<I, D>(&self, attendee_id: I, data: D) -> Result<Request, ApiError>
    where
        I: TryInto<AttendeeId>,
        D: TryInto<AttendeeUpdate>,
        ApiError: From<I::Error> + From<D::Error>,
    {
        let attendee_id = attendee_id.try_into()?;
        let data = data.try_into()?;
        let endpoint =
            self.event_endpoint(&[Segment::from("attendees"), Segment::from(&attendee_id)])?;
        Request::new(endpoint)
            .with_query([("_Http_Method", "PATCH")])
            .with_method(HttpMethod::Post)
            .with_json(&data)
    }

    /// Change fields of one attendee. Sent as POST with the
    /// `_Http_Method=PATCH` override the platform uses in place of PATCH.
    pub fn update<I, D>(&self, attendee_id: I, data: D) -> Result<HttpResponse, ApiError>
    where
        I: TryInto<AttendeeId>,
        D: TryInto<AttendeeUpdate>,
        ApiError: From<I::Error> + From<D::Error>,
    {
        self.client.send(self.build_update(attendee_id, data)?)
    }

    pub fn build_authenticate<U, P>(&self, user_id: U, password: P) -> Result<Request, ApiError>
    where
        U: TryInto<UserId>,
        P: TryInto<Password>,
        ApiError: From<U::Error> + From<P::Error>,
    {
        let credentials = Credentials::new(user_id, password)?;
        let endpoint =
            self.event_endpoint(&[Segment::from("attendees"), Segment::from("authenticate.json")])?;
        Request::new(endpoint)
            .with_method(HttpMethod::Post)
            .with_json(&credentials)
    }

    /// Check an attendee's login. The platform decides what `user_id` means
    /// from the event's attendee id mode.
    pub fn authenticate<U, P>(&self, user_id: U, password: P) -> Result<HttpResponse, ApiError>
    where
        U: TryInto<UserId>,
        P: TryInto<Password>,
        ApiError: From<U::Error> + From<P::Error>,
    {
        self.client.send(self.build_authenticate(user_id, password)?)
    }
}
