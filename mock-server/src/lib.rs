use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;

/// API key accepted by `app()`.
pub const MOCK_API_KEY: &str = "test-api-key";

/// Event id seeded by `seed()`.
pub const SEED_EVENT_ID: u64 = 1;

/// Filters applied as exact matches on the attendee field of the same name.
const EQUALITY_FILTERS: [&str; 3] = ["paymentStatus", "category", "registrationStatus"];

#[derive(Clone, Debug)]
pub struct StoredAttendee {
    pub fields: Map<String, Value>,
    pub password: String,
}

#[derive(Clone, Debug, Default)]
pub struct Event {
    pub attendees: BTreeMap<u64, StoredAttendee>,
}

pub type Db = Arc<RwLock<HashMap<u64, Event>>>;

#[derive(Clone)]
pub struct AppState {
    db: Db,
    api_key: Arc<str>,
}

type ApiResult = Result<Json<Value>, (StatusCode, Json<Value>)>;

fn failure(status: StatusCode, message: &str) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "error": message })))
}

fn attendee(id: u64, first: &str, last: &str, extra: Value, password: &str) -> (u64, StoredAttendee) {
    let mut fields = Map::new();
    fields.insert("personID".to_string(), json!(id));
    fields.insert("firstName".to_string(), json!(first));
    fields.insert("lastName".to_string(), json!(last));
    if let Value::Object(extra) = extra {
        fields.extend(extra);
    }
    (
        id,
        StoredAttendee {
            fields,
            password: password.to_string(),
        },
    )
}

/// One event with three attendees.
pub fn seed() -> HashMap<u64, Event> {
    let attendees = BTreeMap::from([
        attendee(
            1001,
            "Ada",
            "Lovelace",
            json!({
                "email": "ada@example.com",
                "paymentStatus": "paid",
                "category": "delegate",
                "registrationStatus": "complete",
                "lastModified": "2024-01-10 09:00:00"
            }),
            "analytical",
        ),
        attendee(
            1002,
            "Grace",
            "Hopper",
            json!({
                "email": "grace@example.com",
                "paymentStatus": "unpaid",
                "category": "speaker",
                "registrationStatus": "complete",
                "lastModified": "2024-02-01 12:30:00"
            }),
            "cobol",
        ),
        attendee(
            1003,
            "Alan",
            "Turing",
            json!({
                "email": "alan@example.com",
                "paymentStatus": "paid",
                "category": "delegate",
                "registrationStatus": "incomplete",
                "lastModified": "2024-03-05 08:15:00"
            }),
            "enigma",
        ),
    ]);
    HashMap::from([(SEED_EVENT_ID, Event { attendees })])
}

pub fn app() -> Router {
    app_with(seed(), MOCK_API_KEY)
}

pub fn app_with(events: HashMap<u64, Event>, api_key: &str) -> Router {
    let state = AppState {
        db: Arc::new(RwLock::new(events)),
        api_key: Arc::from(api_key),
    };
    Router::new()
        .route("/events/{event_id}/attendees.json", get(list_attendees))
        .route(
            "/events/{event_id}/attendees/{file}",
            get(get_attendee).post(post_attendee),
        )
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Basic auth with any user name and the API key as password.
fn check_auth(headers: &HeaderMap, api_key: &str) -> Result<(), (StatusCode, Json<Value>)> {
    let decoded = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Basic "))
        .and_then(|encoded| STANDARD.decode(encoded).ok())
        .and_then(|bytes| String::from_utf8(bytes).ok());
    match decoded {
        Some(pair) if pair.split_once(':').map(|(_, key)| key) == Some(api_key) => Ok(()),
        _ => Err(failure(StatusCode::UNAUTHORIZED, "invalid api key")),
    }
}

/// `"1001.json"` -> `1001`.
fn parse_attendee_file(file: &str) -> Option<u64> {
    file.strip_suffix(".json")?.parse().ok()
}

fn field_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(if *b { "1" } else { "0" }.to_string()),
        _ => None,
    }
}

fn matches_filters(fields: &Map<String, Value>, params: &HashMap<String, String>) -> bool {
    let equal = EQUALITY_FILTERS.iter().all(|key| match params.get(*key) {
        Some(wanted) => fields.get(*key).and_then(field_text).as_ref() == Some(wanted),
        None => true,
    });
    let recent = match params.get("lastModifiedAfter") {
        Some(after) => fields
            .get("lastModified")
            .and_then(Value::as_str)
            .is_some_and(|modified| modified > after.as_str()),
        None => true,
    };
    equal && recent
}

async fn list_attendees(
    State(state): State<AppState>,
    Path(event_id): Path<u64>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> ApiResult {
    check_auth(&headers, &state.api_key)?;
    let events = state.db.read().await;
    let event = events
        .get(&event_id)
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "event not found"))?;
    let data: Vec<Value> = event
        .attendees
        .values()
        .filter(|a| matches_filters(&a.fields, &params))
        .map(|a| Value::Object(a.fields.clone()))
        .collect();
    Ok(Json(json!({ "data": data })))
}

async fn get_attendee(
    State(state): State<AppState>,
    Path((event_id, file)): Path<(u64, String)>,
    headers: HeaderMap,
) -> ApiResult {
    check_auth(&headers, &state.api_key)?;
    let attendee_id = parse_attendee_file(&file)
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "unknown resource"))?;
    let events = state.db.read().await;
    let attendee = events
        .get(&event_id)
        .and_then(|event| event.attendees.get(&attendee_id))
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "attendee not found"))?;
    Ok(Json(json!({ "data": attendee.fields })))
}

async fn post_attendee(
    State(state): State<AppState>,
    Path((event_id, file)): Path<(u64, String)>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> ApiResult {
    check_auth(&headers, &state.api_key)?;
    if file == "authenticate.json" {
        return authenticate(&state, event_id, &body).await;
    }

    let attendee_id = parse_attendee_file(&file)
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "unknown resource"))?;
    if params.get("_Http_Method").map(String::as_str) != Some("PATCH") {
        return Err(failure(
            StatusCode::METHOD_NOT_ALLOWED,
            "attendees only accept POST with _Http_Method=PATCH",
        ));
    }
    let changes = match body {
        Value::Object(map) if !map.is_empty() => map,
        _ => return Err(failure(StatusCode::BAD_REQUEST, "body must be a non-empty object")),
    };

    let mut events = state.db.write().await;
    let attendee = events
        .get_mut(&event_id)
        .and_then(|event| event.attendees.get_mut(&attendee_id))
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "attendee not found"))?;
    for (key, value) in changes {
        if key != "personID" {
            attendee.fields.insert(key, value);
        }
    }
    info!(event_id, attendee_id, "attendee updated");
    Ok(Json(json!({ "data": attendee.fields })))
}

async fn authenticate(state: &AppState, event_id: u64, body: &Value) -> ApiResult {
    let password = body
        .get("password")
        .and_then(Value::as_str)
        .ok_or_else(|| failure(StatusCode::BAD_REQUEST, "password is required"))?;
    let user_id = body
        .get("userID")
        .ok_or_else(|| failure(StatusCode::BAD_REQUEST, "userID is required"))?;

    let events = state.db.read().await;
    let event = events
        .get(&event_id)
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "event not found"))?;
    let found = event.attendees.iter().find(|(id, attendee)| match user_id {
        Value::Number(n) => n.as_u64() == Some(**id),
        Value::String(s) => {
            s.parse::<u64>().ok() == Some(**id)
                || attendee
                    .fields
                    .get("email")
                    .and_then(Value::as_str)
                    .is_some_and(|email| email.eq_ignore_ascii_case(s))
        }
        _ => false,
    });

    match found {
        Some((id, attendee)) if attendee.password == password => {
            info!(event_id, attendee_id = *id, "attendee authenticated");
            Ok(Json(json!({ "data": { "personID": id, "authenticated": true } })))
        }
        _ => Err(failure(StatusCode::UNAUTHORIZED, "invalid credentials")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_has_one_event_with_three_attendees() {
        let events = seed();
        assert_eq!(events.len(), 1);
        assert_eq!(events[&SEED_EVENT_ID].attendees.len(), 3);
    }

    #[test]
    fn parse_attendee_file_requires_json_suffix() {
        assert_eq!(parse_attendee_file("1001.json"), Some(1001));
        assert_eq!(parse_attendee_file("1001"), None);
        assert_eq!(parse_attendee_file("abc.json"), None);
        assert_eq!(parse_attendee_file("authenticate.json"), None);
    }

    #[test]
    fn filters_match_exact_fields() {
        let fields = seed()[&SEED_EVENT_ID].attendees[&1001].fields.clone();
        let params = HashMap::from([("paymentStatus".to_string(), "paid".to_string())]);
        assert!(matches_filters(&fields, &params));

        let params = HashMap::from([("category".to_string(), "speaker".to_string())]);
        assert!(!matches_filters(&fields, &params));
    }

    #[test]
    fn last_modified_after_is_exclusive() {
        let fields = seed()[&SEED_EVENT_ID].attendees[&1001].fields.clone();
        let at = HashMap::from([(
            "lastModifiedAfter".to_string(),
            "2024-01-10 09:00:00".to_string(),
        )]);
        assert!(!matches_filters(&fields, &at));

        let before = HashMap::from([(
            "lastModifiedAfter".to_string(),
            "2024-01-01 00:00:00".to_string(),
        )]);
        assert!(matches_filters(&fields, &before));
    }

    #[test]
    fn unknown_params_are_ignored() {
        let fields = seed()[&SEED_EVENT_ID].attendees[&1001].fields.clone();
        let params = HashMap::from([("page".to_string(), "2".to_string())]);
        assert!(matches_filters(&fields, &params));
    }

    #[test]
    fn check_auth_compares_password_half() {
        let mut headers = HeaderMap::new();
        assert!(check_auth(&headers, MOCK_API_KEY).is_err());

        let value = format!("Basic {}", STANDARD.encode(format!(":{MOCK_API_KEY}")));
        headers.insert(header::AUTHORIZATION, value.parse().unwrap());
        assert!(check_auth(&headers, MOCK_API_KEY).is_ok());
        assert!(check_auth(&headers, "other-key").is_err());
    }
}
