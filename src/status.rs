//! HTTP status codes as a typed enum.
//!
//! Only the codes the service actually answers with. Anything a handler can
//! return is listed here; hyper never sees a raw number from this crate.
//!
//! ```rust
//! use roster::{Response, Status};
//!
//! Response::builder()
//!     .status(Status::NotFound)
//!     .text("Not Found");
//! ```

/// Status codes produced by the service.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Status {
    // ── 2xx Success ───────────────────────────────────────────────────────────
    Ok,                  // 200

    // ── 4xx Client errors ─────────────────────────────────────────────────────
    BadRequest,          // 400
    NotFound,            // 404
    ContentTooLarge,     // 413

    // ── 5xx Server errors ─────────────────────────────────────────────────────
    InternalServerError, // 500
}

impl From<Status> for u16 {
    fn from(s: Status) -> u16 {
        match s {
            Status::Ok                  => 200,
            Status::BadRequest          => 400,
            Status::NotFound            => 404,
            Status::ContentTooLarge     => 413,
            Status::InternalServerError => 500,
        }
    }
}

impl From<Status> for http::StatusCode {
    fn from(s: Status) -> Self {
        match s {
            Status::Ok                  => Self::OK,
            Status::BadRequest          => Self::BAD_REQUEST,
            Status::NotFound            => Self::NOT_FOUND,
            Status::ContentTooLarge     => Self::PAYLOAD_TOO_LARGE,
            Status::InternalServerError => Self::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_and_http_codes_agree() {
        for s in [
            Status::Ok,
            Status::BadRequest,
            Status::NotFound,
            Status::ContentTooLarge,
            Status::InternalServerError,
        ] {
            assert_eq!(http::StatusCode::from(s).as_u16(), u16::from(s));
        }
    }
}
