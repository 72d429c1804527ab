//! Shared client: base URL, credentials and transport.
//!
//! # Design
//! `Client` is a cheap, cloneable handle around an `Arc`. It turns an
//! endpoint-relative `Request` into a wire-level `HttpRequest` in
//! `prepare`, then `send` hands that to the transport and returns the
//! response untouched. Resources such as `Attendees` hold a clone of the
//! client plus their own per-handle state.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::{debug, warn};

use crate::attendees::Attendees;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::request::Request;
use crate::transport::{Transport, UreqTransport};

pub struct Client<T = UreqTransport> {
    inner: Arc<Inner<T>>,
}

struct Inner<T> {
    config: ClientConfig,
    base_url: String,
    authorization: String,
    transport: T,
}

impl<T> Clone for Client<T> {
    fn clone(&self) -> Self {
        Client {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Client<UreqTransport> {
    /// Client using the default ureq transport with the configured timeout.
    pub fn from_config(config: ClientConfig) -> Result<Self, ApiError> {
        let transport = UreqTransport::new(config.timeout());
        Client::new(config, transport)
    }

    pub fn from_env() -> Result<Self, ApiError> {
        Client::from_config(ClientConfig::from_env()?)
    }
}

impl<T: Transport> Client<T> {
    pub fn new(config: ClientConfig, transport: T) -> Result<Self, ApiError> {
        config.validate()?;
        let base_url = config.resolved_base_url();
        let authorization = format!("Basic {}", STANDARD.encode(format!(":{}", config.api_key)));
        Ok(Client {
            inner: Arc::new(Inner {
                config,
                base_url,
                authorization,
                transport,
            }),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    pub fn transport(&self) -> &T {
        &self.inner.transport
    }

    /// A new attendees handle with no event selected.
    pub fn attendees(&self) -> Attendees<T> {
        Attendees::new(self.clone())
    }

    /// Resolve `request` against the base URL and attach headers.
    pub fn prepare(&self, request: &Request) -> HttpRequest {
        let mut url = format!("{}/{}", self.inner.base_url, request.endpoint);
        if !request.query.is_empty() {
            url.push('?');
            url.push_str(&encode_query(&request.query));
        }

        let mut headers = vec![
            ("accept".to_string(), "application/json".to_string()),
            ("authorization".to_string(), self.inner.authorization.clone()),
        ];
        let body = request.json.as_ref().map(|json| {
            headers.push(("content-type".to_string(), "application/json".to_string()));
            json.to_string()
        });

        HttpRequest {
            method: request.method,
            url,
            headers,
            body,
        }
    }

    /// Execute `request` and return the raw response, whatever its status.
    pub fn send(&self, request: Request) -> Result<HttpResponse, ApiError> {
        let http = self.prepare(&request);
        debug!(method = %http.method, endpoint = %request.endpoint, "sending request");

        match self.inner.transport.send(http) {
            Ok(response) => {
                debug!(status = response.status, endpoint = %request.endpoint, "received response");
                Ok(response)
            }
            Err(err) => {
                warn!(error = %err, endpoint = %request.endpoint, "transport failed");
                Err(err.into())
            }
        }
    }
}

fn encode_query(params: &[(String, String)]) -> String {
    params
        .iter()
        .map(|(key, value)| format!("{}={}", urlencoding::encode(key), urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}
