//! Error types.
//!
//! Two layers live here. [`Error`] covers infrastructure failures: binding a
//! port, loading configuration, touching the store files. [`ApiError`] is the
//! request-level taxonomy; every variant maps to exactly one HTTP status and
//! one JSON `{"error": …}` payload, so handlers return it directly.

use thiserror::Error;

use crate::response::{IntoResponse, Response};
use crate::status::Status;

/// Result alias for infrastructure operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Infrastructure error returned by startup paths and the store layer.
#[derive(Debug, Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid listen address: {0}")]
    Addr(#[from] std::net::AddrParseError),

    #[error("configuration: {0}")]
    Config(#[from] config::ConfigError),

    #[error("csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("row codec: {0}")]
    Codec(#[from] crate::codec::CodecError),
}

/// Which of the two stores a write failed on.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StoreKind {
    /// `profiles.json`, the full-collection store.
    Structured,
    /// `profiles.csv`, the append-only row store.
    Rows,
}

impl StoreKind {
    fn save_failure(self) -> &'static str {
        match self {
            Self::Structured => "Failed to save profile to JSON",
            Self::Rows => "Failed to save profile to CSV",
        }
    }
}

/// A request failure, converted straight into a response.
#[derive(Debug, Error, PartialEq)]
pub enum ApiError {
    /// Body is not JSON, or is JSON but not an object.
    #[error("Invalid JSON")]
    MalformedInput,

    /// Required fields absent, in declared order.
    #[error("Missing fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    /// A required field is present with the wrong JSON type.
    #[error("Invalid field type: {0}")]
    InvalidFieldType(&'static str),

    #[error("Payload too large")]
    PayloadTooLarge,

    #[error("Failed to read request body")]
    BodyRead,

    #[error("{}", .0.save_failure())]
    StoreWrite(StoreKind),

    #[error("Failed to read profiles from CSV")]
    StoreRead,

    #[error("Failed to encode profile row")]
    Codec,
}

impl ApiError {
    pub fn status(&self) -> Status {
        match self {
            Self::MalformedInput
            | Self::MissingFields(_)
            | Self::InvalidFieldType(_)
            | Self::BodyRead => Status::BadRequest,
            Self::PayloadTooLarge => Status::ContentTooLarge,
            Self::StoreWrite(_) | Self::StoreRead | Self::Codec => Status::InternalServerError,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.to_string() });
        Response::builder().status(self.status()).json_value(&body)
    }
}
