//! Incoming HTTP request type.

use bytes::Bytes;

/// An incoming HTTP request with its body fully buffered.
///
/// The router only builds one after a route matched and the body was read
/// within the configured size limit, so handlers never see a partial body.
pub struct Request {
    pub(crate) path: String,
    pub(crate) body: Bytes,
}

impl Request {
    pub(crate) fn new(path: String, body: Bytes) -> Self {
        Self { path, body }
    }

    pub fn path(&self) -> &str { &self.path }
    pub fn body(&self) -> &[u8] { &self.body }
}
