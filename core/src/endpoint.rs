//! Endpoint path construction.
//!
//! An endpoint is a resource base (`events`) followed by `/`-joined
//! segments. Segments are strings or numbers; anything else is rejected when
//! converting loosely typed input into `Segments`.

use serde_json::{Number, Value};

use crate::error::ApiError;

/// One path segment, already rendered as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment(String);

impl Segment {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Segment {
    fn from(value: &str) -> Self {
        Segment(value.to_string())
    }
}

impl From<String> for Segment {
    fn from(value: String) -> Self {
        Segment(value)
    }
}

macro_rules! segment_from_int {
    ($($ty:ty),*) => {
        $(impl From<$ty> for Segment {
            fn from(value: $ty) -> Self {
                Segment(value.to_string())
            }
        })*
    };
}

segment_from_int!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);

/// Path segments appended to a base: either one pre-joined string or a
/// sequence joined with `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segments {
    Single(String),
    Many(Vec<Segment>),
}

impl Segments {
    fn join(&self) -> String {
        match self {
            Segments::Single(path) => path.clone(),
            Segments::Many(parts) => parts
                .iter()
                .map(Segment::as_str)
                .collect::<Vec<_>>()
                .join("/"),
        }
    }
}

impl TryFrom<&str> for Segments {
    type Error = ApiError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Ok(Segments::Single(value.to_string()))
    }
}

impl TryFrom<String> for Segments {
    type Error = ApiError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Ok(Segments::Single(value))
    }
}

impl TryFrom<Vec<Segment>> for Segments {
    type Error = ApiError;

    fn try_from(value: Vec<Segment>) -> Result<Self, Self::Error> {
        Ok(Segments::Many(value))
    }
}

impl TryFrom<&Value> for Segments {
    type Error = ApiError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(path) => Ok(Segments::Single(path.clone())),
            Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => Ok(Segment(s.clone())),
                    Value::Number(n) => Ok(Segment(number_text(n))),
                    other => Err(ApiError::invalid(format!(
                        "endpoint segments must be strings or numbers, got {}",
                        kind_of(other)
                    ))),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Segments::Many),
            other => Err(ApiError::invalid(format!(
                "endpoint must be a string or an array of segments, got {}",
                kind_of(other)
            ))),
        }
    }
}

impl TryFrom<Value> for Segments {
    type Error = ApiError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Segments::try_from(&value)
    }
}

/// Join `base` and `segments` into an endpoint path.
///
/// ```
/// use eventsforce_core::endpoint::{build, Segment};
///
/// let path = build("events", vec![Segment::from(2u64), Segment::from("attendees.json")]).unwrap();
/// assert_eq!(path, "events/2/attendees.json");
/// ```
pub fn build<S>(base: &str, segments: S) -> Result<String, ApiError>
where
    S: TryInto<Segments>,
    ApiError: From<S::Error>,
{
    let segments = segments.try_into()?;
    Ok(format!("{base}/{}", segments.join()))
}

/// Decimal text of a JSON number. Integral floats drop their fraction so
/// `3.0` renders as `3`.
pub(crate) fn number_text(n: &Number) -> String {
    if let Some(u) = n.as_u64() {
        u.to_string()
    } else if let Some(i) = n.as_i64() {
        i.to_string()
    } else {
        n.as_f64().map(|f| f.to_string()).unwrap_or_else(|| n.to_string())
    }
}

/// Short name of a JSON value's type, for error messages.
pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
