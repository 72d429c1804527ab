//! Validated argument types for the attendees resource.
//!
//! # Design
//! Each type is built through `TryFrom`, from native Rust values or from a
//! `serde_json::Value` for loosely typed callers. A failed conversion is an
//! `ApiError::InvalidArgument`, so every precondition is checked before an
//! endpoint is built or a request leaves the process.

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Number, Value};

use crate::endpoint::{kind_of, number_text, Segment};
use crate::error::ApiError;

/// A non-negative numeric attendee id.
///
/// The id keeps its textual form: `"1.5"` stays `1.5` and `3.0` renders as
/// `3`. Zero is accepted. Numeric strings are normalized by trimming
/// surrounding whitespace, so `" 7 "` becomes `7`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttendeeId(String);

impl AttendeeId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn from_float(value: f64) -> Result<Self, ApiError> {
        if !value.is_finite() {
            return Err(ApiError::invalid(format!("attendee id must be a finite number, got {value}")));
        }
        if value < 0.0 {
            return Err(negative_attendee_id(value));
        }
        // -0.0 passes the sign check above but would render as "-0".
        Ok(AttendeeId((value + 0.0).to_string()))
    }

    fn from_text(value: &str) -> Result<Self, ApiError> {
        let trimmed = value.trim_matches(is_php_space);
        if !is_numeric(trimmed) {
            return Err(ApiError::invalid(format!(
                "attendee id must be a non-negative number, got {value:?}"
            )));
        }
        if is_negative(trimmed) {
            return Err(negative_attendee_id(trimmed));
        }
        Ok(AttendeeId(trimmed.to_string()))
    }
}

impl fmt::Display for AttendeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&AttendeeId> for Segment {
    fn from(id: &AttendeeId) -> Self {
        Segment::from(format!("{id}.json"))
    }
}

fn negative_attendee_id(value: impl fmt::Display) -> ApiError {
    ApiError::invalid(format!("attendee id must be non-negative, got {value}"))
}

macro_rules! attendee_id_from_unsigned {
    ($($ty:ty),*) => {
        $(impl TryFrom<$ty> for AttendeeId {
            type Error = ApiError;

            fn try_from(value: $ty) -> Result<Self, Self::Error> {
                Ok(AttendeeId(value.to_string()))
            }
        })*
    };
}

macro_rules! attendee_id_from_signed {
    ($($ty:ty),*) => {
        $(impl TryFrom<$ty> for AttendeeId {
            type Error = ApiError;

            fn try_from(value: $ty) -> Result<Self, Self::Error> {
                if value < 0 {
                    return Err(negative_attendee_id(value));
                }
                Ok(AttendeeId(value.to_string()))
            }
        })*
    };
}

attendee_id_from_unsigned!(u8, u16, u32, u64, usize);
attendee_id_from_signed!(i8, i16, i32, i64, isize);

impl TryFrom<f64> for AttendeeId {
    type Error = ApiError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        AttendeeId::from_float(value)
    }
}

impl TryFrom<f32> for AttendeeId {
    type Error = ApiError;

    fn try_from(value: f32) -> Result<Self, Self::Error> {
        AttendeeId::from_float(f64::from(value))
    }
}

impl TryFrom<&str> for AttendeeId {
    type Error = ApiError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        AttendeeId::from_text(value)
    }
}

impl TryFrom<String> for AttendeeId {
    type Error = ApiError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        AttendeeId::from_text(&value)
    }
}

impl TryFrom<&Value> for AttendeeId {
    type Error = ApiError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::Number(n) => attendee_id_from_number(n),
            Value::String(s) => AttendeeId::from_text(s),
            other => Err(ApiError::invalid(format!(
                "attendee id must be a non-negative number, got {}",
                kind_of(other)
            ))),
        }
    }
}

impl TryFrom<Value> for AttendeeId {
    type Error = ApiError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        AttendeeId::try_from(&value)
    }
}

fn attendee_id_from_number(n: &Number) -> Result<AttendeeId, ApiError> {
    if let Some(u) = n.as_u64() {
        return Ok(AttendeeId(u.to_string()));
    }
    if let Some(i) = n.as_i64() {
        return Err(negative_attendee_id(i));
    }
    match n.as_f64() {
        Some(f) => AttendeeId::from_float(f),
        None => Ok(AttendeeId(number_text(n))),
    }
}

fn is_php_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0b' | '\x0c')
}

/// Decimal number with optional sign, fraction and exponent. Hex, `inf` and
/// `nan` are not numeric.
fn is_numeric(s: &str) -> bool {
    let bytes = s.as_bytes();
    let mut i = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        i += 1;
    }
    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let mut digits = i - int_start;
    if i < bytes.len() && bytes[i] == b'.' {
        i += 1;
        let frac_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        digits += i - frac_start;
    }
    if digits == 0 {
        return false;
    }
    if i < bytes.len() && matches!(bytes[i], b'e' | b'E') {
        i += 1;
        if i < bytes.len() && matches!(bytes[i], b'+' | b'-') {
            i += 1;
        }
        let exp_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == exp_start {
            return false;
        }
    }
    i == bytes.len()
}

/// True for a numeric string strictly below zero; `-0` is not negative.
fn is_negative(numeric: &str) -> bool {
    let Some(rest) = numeric.strip_prefix('-') else {
        return false;
    };
    let mantissa = rest.split(['e', 'E']).next().unwrap_or("");
    mantissa.bytes().any(|b| matches!(b, b'1'..=b'9'))
}

/// URL query parameters for listing attendees.
///
/// Keys are not validated and keep insertion order. Values are flattened to
/// strings the way the platform expects: booleans as `1`/`0`, `null`
/// dropped, nested arrays and objects as `key[0]` / `key[sub]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttendeeQuery {
    params: Vec<(String, String)>,
}

impl AttendeeQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an arbitrary parameter.
    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.push((key.into(), value.to_string()));
        self
    }

    /// Only attendees modified after this timestamp (`YYYY-MM-DD HH:MM:SS`).
    pub fn last_modified_after(self, timestamp: &str) -> Self {
        self.param("lastModifiedAfter", timestamp)
    }

    pub fn payment_status(self, status: &str) -> Self {
        self.param("paymentStatus", status)
    }

    pub fn category(self, category: &str) -> Self {
        self.param("category", category)
    }

    pub fn registration_status(self, status: &str) -> Self {
        self.param("registrationStatus", status)
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.params
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn into_pairs(self) -> Vec<(String, String)> {
        self.params
    }
}

impl From<Map<String, Value>> for AttendeeQuery {
    fn from(map: Map<String, Value>) -> Self {
        let mut params = Vec::new();
        for (key, value) in &map {
            flatten_query(key.clone(), value, &mut params);
        }
        AttendeeQuery { params }
    }
}

impl TryFrom<&Value> for AttendeeQuery {
    type Error = ApiError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(AttendeeQuery::from(map.clone())),
            other => Err(ApiError::invalid(format!(
                "attendee query must be a map of parameters, got {}",
                kind_of(other)
            ))),
        }
    }
}

impl TryFrom<Value> for AttendeeQuery {
    type Error = ApiError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        AttendeeQuery::try_from(&value)
    }
}

fn flatten_query(key: String, value: &Value, out: &mut Vec<(String, String)>) {
    match value {
        Value::Null => {}
        Value::Bool(b) => out.push((key, if *b { "1" } else { "0" }.to_string())),
        Value::Number(n) => out.push((key, number_text(n))),
        Value::String(s) => out.push((key, s.clone())),
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                flatten_query(format!("{key}[{index}]"), item, out);
            }
        }
        Value::Object(map) => {
            for (sub, item) in map {
                flatten_query(format!("{key}[{sub}]"), item, out);
            }
        }
    }
}

/// Non-empty set of attendee fields to change, sent as the JSON body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AttendeeUpdate(Map<String, Value>);

impl AttendeeUpdate {
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl TryFrom<Map<String, Value>> for AttendeeUpdate {
    type Error = ApiError;

    fn try_from(map: Map<String, Value>) -> Result<Self, Self::Error> {
        if map.is_empty() {
            return Err(ApiError::invalid("update data must not be empty"));
        }
        Ok(AttendeeUpdate(map))
    }
}

impl TryFrom<&Value> for AttendeeUpdate {
    type Error = ApiError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        AttendeeUpdate::try_from(value.clone())
    }
}

impl TryFrom<Value> for AttendeeUpdate {
    type Error = ApiError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => AttendeeUpdate::try_from(map),
            other => Err(ApiError::invalid(format!(
                "update data must be a non-empty map, got {}",
                kind_of(&other)
            ))),
        }
    }
}

/// The identifier an attendee logs in with. Which one the platform expects
/// depends on the event's attendee id mode; a string stays a string on the
/// wire and a number stays a number. `""`, `"0"` and numeric zero are
/// rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum UserId {
    Text(String),
    Number(Number),
}

impl UserId {
    fn text(value: String) -> Result<Self, ApiError> {
        if is_blank(&value) {
            return Err(ApiError::invalid(format!("user id must not be empty, got {value:?}")));
        }
        Ok(UserId::Text(value))
    }

    fn number(value: Number) -> Result<Self, ApiError> {
        if value.as_f64() == Some(0.0) {
            return Err(ApiError::invalid("user id must not be zero"));
        }
        Ok(UserId::Number(value))
    }
}

impl TryFrom<&str> for UserId {
    type Error = ApiError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        UserId::text(value.to_string())
    }
}

impl TryFrom<String> for UserId {
    type Error = ApiError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        UserId::text(value)
    }
}

macro_rules! user_id_from_int {
    ($($ty:ty),*) => {
        $(impl TryFrom<$ty> for UserId {
            type Error = ApiError;

            fn try_from(value: $ty) -> Result<Self, Self::Error> {
                UserId::number(Number::from(value))
            }
        })*
    };
}

user_id_from_int!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);

impl TryFrom<f64> for UserId {
    type Error = ApiError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Number::from_f64(value)
            .ok_or_else(|| ApiError::invalid(format!("user id must be a finite number, got {value}")))
            .and_then(UserId::number)
    }
}

impl TryFrom<&Value> for UserId {
    type Error = ApiError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(s) => UserId::text(s.clone()),
            Value::Number(n) => UserId::number(n.clone()),
            other => Err(ApiError::invalid(format!(
                "user id must be a string or a number, got {}",
                kind_of(other)
            ))),
        }
    }
}

impl TryFrom<Value> for UserId {
    type Error = ApiError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        UserId::try_from(&value)
    }
}

/// `""` and `"0"` both count as empty credentials on the platform.
fn is_blank(value: &str) -> bool {
    value.is_empty() || value == "0"
}

/// A non-empty password; `"0"` is rejected. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Password(String);

impl Password {
    pub fn expose(&self) -> &str {
        &self.0
    }

    fn new(value: String) -> Result<Self, ApiError> {
        if is_blank(&value) {
            return Err(ApiError::invalid("password must be a non-empty string"));
        }
        Ok(Password(value))
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

impl TryFrom<&str> for Password {
    type Error = ApiError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Password::new(value.to_string())
    }
}

impl TryFrom<String> for Password {
    type Error = ApiError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Password::new(value)
    }
}

impl TryFrom<&Value> for Password {
    type Error = ApiError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(s) => Password::new(s.clone()),
            other => Err(ApiError::invalid(format!(
                "password must be a non-empty string, got {}",
                kind_of(other)
            ))),
        }
    }
}

impl TryFrom<Value> for Password {
    type Error = ApiError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Password::try_from(&value)
    }
}

/// Body of an authentication request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    #[serde(rename = "userID")]
    pub user_id: UserId,
    pub password: Password,
}

impl Credentials {
    /// Validate the user id, then the password.
    pub fn new<U, P>(user_id: U, password: P) -> Result<Self, ApiError>
    where
        U: TryInto<UserId>,
        P: TryInto<Password>,
        ApiError: From<U::Error> + From<P::Error>,
    {
        let user_id = user_id.try_into()?;
        let password = password.try_into()?;
        Ok(Credentials { user_id, password })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn invalid<T: fmt::Debug>(result: Result<T, ApiError>) -> bool {
        matches!(result, Err(ApiError::InvalidArgument(_)))
    }

    #[test]
    fn attendee_id_accepts_non_negative_numbers() {
        assert_eq!(AttendeeId::try_from(0u64).unwrap().as_str(), "0");
        assert_eq!(AttendeeId::try_from(42i32).unwrap().as_str(), "42");
        assert_eq!(AttendeeId::try_from(3.0f64).unwrap().as_str(), "3");
        assert_eq!(AttendeeId::try_from(1.5f64).unwrap().as_str(), "1.5");
        assert_eq!(AttendeeId::try_from(json!(17)).unwrap().as_str(), "17");
    }

    #[test]
    fn attendee_id_accepts_numeric_strings() {
        assert_eq!(AttendeeId::try_from("12").unwrap().as_str(), "12");
        assert_eq!(AttendeeId::try_from("1.5").unwrap().as_str(), "1.5");
        assert_eq!(AttendeeId::try_from(" 7 ").unwrap().as_str(), "7");
        assert_eq!(AttendeeId::try_from("-0").unwrap().as_str(), "-0");
        assert_eq!(AttendeeId::try_from(json!("1e3")).unwrap().as_str(), "1e3");
    }

    #[test]
    fn attendee_id_rejects_negative_and_non_numeric() {
        assert!(invalid(AttendeeId::try_from(-1i64)));
        assert!(invalid(AttendeeId::try_from(-0.5f64)));
        assert!(invalid(AttendeeId::try_from(f64::NAN)));
        assert!(invalid(AttendeeId::try_from("")));
        assert!(invalid(AttendeeId::try_from("test")));
        assert!(invalid(AttendeeId::try_from("-1")));
        assert!(invalid(AttendeeId::try_from("0x1A")));
        assert!(invalid(AttendeeId::try_from("1e")));
        assert!(invalid(AttendeeId::try_from(".")));
        for value in [json!(true), json!(false), json!(null), json!([]), json!({}), json!(-1)] {
            assert!(invalid(AttendeeId::try_from(&value)), "{value} should be rejected");
        }
    }

    #[test]
    fn attendee_id_segment_has_json_suffix() {
        let id = AttendeeId::try_from(5u8).unwrap();
        assert_eq!(Segment::from(&id).as_str(), "5.json");
    }

    #[test]
    fn query_from_map_flattens_values() {
        let query = AttendeeQuery::try_from(json!({
            "paymentStatus": "paid",
            "category": 3,
            "archived": false,
            "skip": null,
            "ids": [1, 2],
            "range": {"from": "a"}
        }))
        .unwrap();
        let expected: Vec<(String, String)> = [
            ("paymentStatus", "paid"),
            ("category", "3"),
            ("archived", "0"),
            ("ids[0]", "1"),
            ("ids[1]", "2"),
            ("range[from]", "a"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        assert_eq!(query.pairs(), expected.as_slice());
    }

    #[test]
    fn query_builder_uses_documented_names() {
        let query = AttendeeQuery::new()
            .last_modified_after("2024-01-01 00:00:00")
            .payment_status("paid")
            .category("delegate")
            .registration_status("complete");
        let keys: Vec<&str> = query.pairs().iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(
            keys,
            ["lastModifiedAfter", "paymentStatus", "category", "registrationStatus"]
        );
    }

    #[test]
    fn query_rejects_scalars() {
        for value in [json!(true), json!(false), json!(""), json!("test"), json!(null), json!(1)] {
            assert!(invalid(AttendeeQuery::try_from(&value)), "{value} should be rejected");
        }
        assert!(AttendeeQuery::try_from(json!({})).unwrap().is_empty());
    }

    #[test]
    fn update_requires_non_empty_map() {
        assert!(invalid(AttendeeUpdate::try_from(json!({}))));
        assert!(invalid(AttendeeUpdate::try_from(json!(""))));
        assert!(invalid(AttendeeUpdate::try_from(json!(1))));
        assert!(invalid(AttendeeUpdate::try_from(json!([]))));
        let update = AttendeeUpdate::try_from(json!({"firstName": "Ada"})).unwrap();
        assert_eq!(serde_json::to_value(&update).unwrap(), json!({"firstName": "Ada"}));
        assert_eq!(update.fields().get("firstName"), Some(&json!("Ada")));
        assert_eq!(update.into_value(), json!({"firstName": "Ada"}));
    }

    #[test]
    fn user_id_rules() {
        assert_eq!(UserId::try_from("u").unwrap(), UserId::Text("u".to_string()));
        assert_eq!(UserId::try_from(12u32).unwrap(), UserId::Number(Number::from(12u32)));
        assert!(invalid(UserId::try_from("")));
        assert!(invalid(UserId::try_from("0")));
        assert!(invalid(UserId::try_from(json!("0"))));
        assert!(invalid(UserId::try_from(0i64)));
        assert!(invalid(UserId::try_from(0.0f64)));
        for value in [json!(false), json!(true), json!(null), json!([]), json!({})] {
            assert!(invalid(UserId::try_from(&value)), "{value} should be rejected");
        }
    }

    #[test]
    fn password_rules() {
        assert!(invalid(Password::try_from("")));
        assert!(invalid(Password::try_from("0")));
        assert!(invalid(Password::try_from(json!("0"))));
        assert_eq!(Password::try_from("00").unwrap().expose(), "00");
        assert!(invalid(Password::try_from(json!(1))));
        assert!(invalid(Password::try_from(json!(true))));
        assert!(invalid(Password::try_from(json!([]))));
        assert_eq!(Password::try_from("secret").unwrap().expose(), "secret");
    }

    #[test]
    fn password_is_redacted_in_debug() {
        let credentials = Credentials::new("u", "hunter2").unwrap();
        assert!(!format!("{credentials:?}").contains("hunter2"));
    }

    #[test]
    fn credentials_serialize_with_platform_names() {
        let body = serde_json::to_string(&Credentials::new("u", "p").unwrap()).unwrap();
        assert_eq!(body, r#"{"userID":"u","password":"p"}"#);

        let body = serde_json::to_value(Credentials::new(42u64, "p").unwrap()).unwrap();
        assert_eq!(body, json!({"userID": 42, "password": "p"}));
    }

    #[test]
    fn credentials_check_user_id_first() {
        let err = Credentials::new("", "").unwrap_err();
        assert!(err.to_string().contains("user id"));
    }
}
