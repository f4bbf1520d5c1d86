use http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    CONTENT_TYPE,
};
use http::{HeaderMap, HeaderValue, Response, StatusCode};
use http_body_util::Full;
use hyper::body::Bytes;
use log::warn;
use serde::Serialize;

/// The blueprint for every response the server writes on the wire.
///
/// All responses, from the mock endpoint and from the control channel alike, carry the same
/// permissive cross-origin headers so that a browser-based control panel can drive the server
/// from any origin.
#[derive(Clone, Debug)]
pub(crate) struct ResponseTemplate {
    status_code: StatusCode,
    headers: HeaderMap,
    body: Option<Vec<u8>>,
}

impl ResponseTemplate {
    pub(crate) fn new(status_code: StatusCode) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
        headers.insert(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("GET, POST, PUT, DELETE"),
        );
        headers.insert(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type"),
        );
        Self {
            status_code,
            headers,
            body: None,
        }
    }

    /// A response whose body is `body` serialized as JSON.
    pub(crate) fn json<B: Serialize>(status_code: StatusCode, body: &B) -> Self {
        Self::new(status_code).set_body_json(body)
    }

    /// Set the response body to the JSON serialization of `body`.
    ///
    /// Serialization failures are logged and turn the response into a bare `500`.
    pub(crate) fn set_body_json<B: Serialize>(mut self, body: &B) -> Self {
        match serde_json::to_vec(body) {
            Ok(body) => {
                self.headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                self.body = Some(body);
            }
            Err(e) => {
                warn!("Failed to serialize a response body: {}", e);
                self.status_code = StatusCode::INTERNAL_SERVER_ERROR;
                self.body = None;
            }
        }
        self
    }

    pub(crate) fn status_code(&self) -> StatusCode {
        self.status_code
    }

    /// Generate a response from the template.
    pub(crate) fn generate_response(self) -> Response<Full<Bytes>> {
        let mut response = Response::new(Full::from(self.body.unwrap_or_default()));
        *response.status_mut() = self.status_code;
        *response.headers_mut() = self.headers;
        response
    }
}
