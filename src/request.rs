use chrono::{DateTime, SecondsFormat, Utc};
use http::{HeaderMap, Method};
use std::fmt;
use std::net::SocketAddr;

/// The head of an incoming request to a [`MockServer`].
///
/// We only capture the request line, the headers and where it came from: the body is left
/// on the connection so that the responder can decide whether to read it at all (a refused
/// connection never does).
///
/// [`MockServer`]: crate::MockServer
#[derive(Debug, Clone)]
pub(crate) struct Request {
    pub method: Method,
    /// The path component of the request target, without the query string.
    pub path: String,
    pub headers: HeaderMap,
    pub peer: Option<SocketAddr>,
    pub received_at: DateTime<Utc>,
}

impl Request {
    pub(crate) fn from_parts(parts: &http::request::Parts, peer: Option<SocketAddr>) -> Request {
        Self {
            method: parts.method.clone(),
            path: parts.uri.path().to_owned(),
            headers: parts.headers.clone(),
            peer,
            received_at: Utc::now(),
        }
    }

    /// `received_at` the way JavaScript's `Date::toISOString` prints it,
    /// e.g. `2024-05-01T09:30:00.123Z`.
    pub(crate) fn timestamp(&self) -> String {
        self.received_at.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub(crate) fn user_agent(&self) -> &str {
        self.headers
            .get(http::header::USER_AGENT)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("N/A")
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)?;
        match self.peer {
            Some(peer) => write!(f, " from {}", peer)?,
            None => write!(f, " from an unknown peer")?,
        }
        write!(f, " (user agent: {})", self.user_agent())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts(builder: http::request::Builder) -> http::request::Parts {
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn path_drops_the_query_string() {
        let parts = parts(http::Request::builder().uri("/api?attempt=3"));

        let request = Request::from_parts(&parts, None);

        assert_eq!(request.path, "/api");
    }

    #[test]
    fn timestamp_is_iso_8601_utc_with_milliseconds() {
        let parts = parts(http::Request::builder().uri("/api"));
        let mut request = Request::from_parts(&parts, None);
        request.received_at = DateTime::parse_from_rfc3339("2024-05-01T09:30:00.123456Z")
            .unwrap()
            .with_timezone(&Utc);

        assert_eq!(request.timestamp(), "2024-05-01T09:30:00.123Z");
    }

    #[test]
    fn display_includes_method_peer_and_user_agent() {
        let parts = parts(
            http::Request::builder()
                .method("DELETE")
                .uri("/api")
                .header("User-Agent", "curl/8.0"),
        );
        let peer: SocketAddr = "127.0.0.1:5555".parse().unwrap();

        let request = Request::from_parts(&parts, Some(peer));

        assert_eq!(
            request.to_string(),
            "DELETE /api from 127.0.0.1:5555 (user agent: curl/8.0)"
        );
    }

    #[test]
    fn missing_user_agent_is_reported_as_not_available() {
        let parts = parts(http::Request::builder().uri("/api"));

        assert_eq!(Request::from_parts(&parts, None).user_agent(), "N/A");
    }
}
