//! Outgoing HTTP response type and the [`IntoResponse`] conversion trait.
//!
//! Handlers build a [`Response`] (or return anything implementing
//! [`IntoResponse`]) and the server turns it into a hyper response at the
//! very end of dispatch.

use bytes::Bytes;
use http_body_util::Full;
use serde::Serialize;
use tracing::error;

use crate::status::Status;

const JSON: &str = "application/json";
const TEXT: &str = "text/plain; charset=utf-8";

// ── Response ─────────────────────────────────────────────────────────────────

/// An outgoing HTTP response.
///
/// ```rust
/// use roster::{Response, Status};
///
/// Response::builder().text("hello");
///
/// Response::builder()
///     .status(Status::BadRequest)
///     .json_value(&serde_json::json!({ "error": "Invalid JSON" }));
/// ```
#[derive(Debug)]
pub struct Response {
    pub(crate) body: Vec<u8>,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) status: Status,
}

impl Response {
    /// Builder for every response; the body method sets `content-type`.
    pub fn builder() -> ResponseBuilder {
        ResponseBuilder { status: Status::Ok }
    }

    pub fn status_code(&self) -> u16 { self.status.into() }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Converts into the hyper response written to the wire.
    pub(crate) fn into_inner(self) -> http::Response<Full<Bytes>> {
        let mut res = http::Response::new(Full::new(Bytes::from(self.body)));
        *res.status_mut() = self.status.into();
        let headers = res.headers_mut();
        for (name, value) in self.headers {
            // Names and values come from this crate only; skip rather than panic.
            match (
                http::HeaderName::from_bytes(name.as_bytes()),
                http::HeaderValue::from_str(&value),
            ) {
                (Ok(name), Ok(value)) => { headers.append(name, value); }
                _ => error!(%name, "dropping invalid response header"),
            }
        }
        res
    }
}

// ── ResponseBuilder ───────────────────────────────────────────────────────────

/// Fluent builder for [`Response`].
///
/// Obtain via [`Response::builder()`]. Defaults to `Status::Ok` (200).
/// Terminated by a typed body method.
pub struct ResponseBuilder {
    status: Status,
}

impl ResponseBuilder {
    pub fn status(mut self, code: Status) -> Self {
        self.status = code;
        self
    }

    /// Terminate with pre-serialized JSON bytes.
    pub fn json(self, body: Vec<u8>) -> Response {
        self.finish(JSON, body)
    }

    /// Terminate with any serializable value as the JSON body.
    ///
    /// A value that fails to serialize turns the response into a bare
    /// `500` with a fixed error payload.
    pub fn json_value<T: Serialize + ?Sized>(self, value: &T) -> Response {
        match serde_json::to_vec(value) {
            Ok(body) => self.finish(JSON, body),
            Err(e) => {
                error!(error = %e, "failed to serialize response body");
                Response::builder()
                    .status(Status::InternalServerError)
                    .json(br#"{"error":"Internal server error"}"#.to_vec())
            }
        }
    }

    /// Terminate with a plain-text body.
    pub fn text(self, body: impl Into<String>) -> Response {
        self.finish(TEXT, body.into().into_bytes())
    }

    fn finish(self, content_type: &str, body: Vec<u8>) -> Response {
        let headers = vec![("content-type".to_owned(), content_type.to_owned())];
        Response { body, headers, status: self.status }
    }
}

// ── IntoResponse ──────────────────────────────────────────────────────────────

/// Conversion into an HTTP [`Response`].
///
/// Handlers may return any implementor. `Result<R, E>` is covered when both
/// sides convert, which lets handlers use `?` with [`ApiError`](crate::ApiError).
pub trait IntoResponse {
    fn into_response(self) -> Response;
}

impl IntoResponse for Response {
    fn into_response(self) -> Response { self }
}

impl<R, E> IntoResponse for Result<R, E>
where
    R: IntoResponse,
    E: IntoResponse,
{
    fn into_response(self) -> Response {
        match self {
            Ok(r) => r.into_response(),
            Err(e) => e.into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_sets_status_and_content_type() {
        let res = Response::builder().status(Status::NotFound).text("Not Found");
        assert_eq!(res.status_code(), 404);
        assert_eq!(res.body(), b"Not Found");
        assert_eq!(res.header("Content-Type"), Some("text/plain; charset=utf-8"));
    }

    #[test]
    fn result_converts_either_side() {
        let ok: Result<Response, Response> = Ok(Response::builder().text("ok"));
        let err: Result<Response, Response> =
            Err(Response::builder().status(Status::BadRequest).text("no"));
        assert_eq!(ok.into_response().status_code(), 200);
        assert_eq!(err.into_response().status_code(), 400);
    }

    #[test]
    fn json_value_serializes_compactly() {
        let res = Response::builder().json_value(&serde_json::json!({ "message": "hi" }));
        assert_eq!(res.body(), br#"{"message":"hi"}"#);
        assert_eq!(res.header("content-type"), Some("application/json"));
    }

    #[test]
    fn into_inner_carries_status_and_headers() {
        let inner = Response::builder()
            .status(Status::ContentTooLarge)
            .json(b"{}".to_vec())
            .into_inner();
        assert_eq!(inner.status(), http::StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(inner.headers()["content-type"], "application/json");
    }
}
