//! The event an event-scoped resource operates on.

use std::fmt;

use serde_json::Value;

use crate::endpoint::{kind_of, Segment};
use crate::error::ApiError;

/// A validated, non-negative event identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventId(u64);

impl EventId {
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<EventId> for Segment {
    fn from(id: EventId) -> Self {
        Segment::from(id.0)
    }
}

macro_rules! event_id_from_unsigned {
    ($($ty:ty),*) => {
        $(impl TryFrom<$ty> for EventId {
            type Error = ApiError;

            fn try_from(value: $ty) -> Result<Self, Self::Error> {
                Ok(EventId(u64::from(value)))
            }
        })*
    };
}

macro_rules! event_id_from_signed {
    ($($ty:ty),*) => {
        $(impl TryFrom<$ty> for EventId {
            type Error = ApiError;

            fn try_from(value: $ty) -> Result<Self, Self::Error> {
                u64::try_from(value)
                    .map(EventId)
                    .map_err(|_| ApiError::invalid(format!("event id must be non-negative, got {value}")))
            }
        })*
    };
}

event_id_from_unsigned!(u8, u16, u32, u64);
event_id_from_signed!(i8, i16, i32, i64);

impl TryFrom<&Value> for EventId {
    type Error = ApiError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::Number(n) => {
                if let Some(id) = n.as_u64() {
                    Ok(EventId(id))
                } else if n.is_i64() {
                    Err(ApiError::invalid(format!("event id must be non-negative, got {n}")))
                } else {
                    Err(ApiError::invalid(format!("event id must be an integer, got {n}")))
                }
            }
            other => Err(ApiError::invalid(format!(
                "event id must be a non-negative integer, got {}",
                kind_of(other)
            ))),
        }
    }
}

impl TryFrom<Value> for EventId {
    type Error = ApiError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        EventId::try_from(&value)
    }
}

/// Holds the currently selected event. Unset until `set` succeeds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventScope {
    event_id: Option<EventId>,
}

impl EventScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select an event. On failure the previous selection is kept.
    pub fn set<I>(&mut self, event_id: I) -> Result<EventId, ApiError>
    where
        I: TryInto<EventId>,
        ApiError: From<I::Error>,
    {
        let id = event_id.try_into()?;
        self.event_id = Some(id);
        Ok(id)
    }

    pub fn get(&self) -> Result<EventId, ApiError> {
        self.event_id.ok_or(ApiError::ScopeNotSet)
    }

    pub fn is_set(&self) -> bool {
        self.event_id.is_some()
    }

    pub fn clear(&mut self) {
        self.event_id = None;
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn unset_scope_reports_scope_not_set() {
        let scope = EventScope::new();
        assert!(!scope.is_set());
        assert!(matches!(scope.get(), Err(ApiError::ScopeNotSet)));
    }

    #[test]
    fn set_then_get_returns_id() {
        let mut scope = EventScope::new();
        scope.set(2u64).unwrap();
        assert_eq!(scope.get().unwrap().get(), 2);

        scope.set(json!(9)).unwrap();
        assert_eq!(scope.get().unwrap(), EventId::try_from(9i32).unwrap());
    }

    #[test]
    fn zero_is_a_valid_event() {
        let mut scope = EventScope::new();
        assert_eq!(scope.set(0i64).unwrap().get(), 0);
    }

    #[test]
    fn rejects_negative_and_non_integer_input() {
        let mut scope = EventScope::new();
        assert!(matches!(scope.set(-1i64), Err(ApiError::InvalidArgument(_))));

        for value in [
            json!(-1),
            json!("Test"),
            json!("2"),
            json!(false),
            json!(true),
            json!([1, 2, 3]),
            json!(null),
            json!(2.5),
        ] {
            let err = scope.set(value.clone()).unwrap_err();
            assert!(matches!(err, ApiError::InvalidArgument(_)), "{value} should be rejected");
        }
        assert!(!scope.is_set());
    }

    #[test]
    fn failed_set_keeps_previous_event() {
        let mut scope = EventScope::new();
        scope.set(4u32).unwrap();
        assert!(scope.set(json!(true)).is_err());
        assert_eq!(scope.get().unwrap().get(), 4);
    }

    #[test]
    fn clear_unsets_scope() {
        let mut scope = EventScope::new();
        scope.set(4u8).unwrap();
        scope.clear();
        assert!(matches!(scope.get(), Err(ApiError::ScopeNotSet)));
    }
}
