//! Endpoint-relative request value objects.
//!
//! A `Request` is built fresh for every call and consumed by
//! `Client::send`. It knows nothing about the base URL or credentials; the
//! client adds those when it prepares the wire-level `HttpRequest`.

use serde::Serialize;
use serde_json::Value;

use crate::error::ApiError;
use crate::http::HttpMethod;

#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub endpoint: String,
    pub method: HttpMethod,
    pub query: Vec<(String, String)>,
    pub json: Option<Value>,
}

impl Request {
    /// A GET request for `endpoint` with no query and no body.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Request {
            endpoint: endpoint.into(),
            method: HttpMethod::default(),
            query: Vec::new(),
            json: None,
        }
    }

    /// Replace the query parameters.
    pub fn with_query<K, V>(mut self, params: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.query = params.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        self
    }

    pub fn with_method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    /// Attach `body` as the JSON payload.
    pub fn with_json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, ApiError> {
        self.json = Some(serde_json::to_value(body).map_err(ApiError::Serialization)?);
        Ok(self)
    }

    /// Value of the first query parameter named `key`.
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn defaults_to_bare_get() {
        let req = Request::new("events/2/attendees.json");
        assert_eq!(req.method, HttpMethod::Get);
        assert!(req.query.is_empty());
        assert!(req.json.is_none());
    }

    #[test]
    fn setters_compose() {
        let req = Request::new("events/2/attendees/5.json")
            .with_query([("_Http_Method", "PATCH")])
            .with_method(HttpMethod::Post)
            .with_json(&json!({"firstName": "Ada"}))
            .unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.query_param("_Http_Method"), Some("PATCH"));
        assert_eq!(req.json, Some(json!({"firstName": "Ada"})));
    }

    #[test]
    fn with_query_replaces_previous_params() {
        let req = Request::new("x")
            .with_query([("a", "1")])
            .with_query([("b", "2")]);
        assert_eq!(req.query_param("a"), None);
        assert_eq!(req.query_param("b"), Some("2"));
    }
}
