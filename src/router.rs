//! Radix-tree request router.
//!
//! One [`matchit`] tree per HTTP method. A request whose method has no tree,
//! or whose path has no match in that tree, gets `404 Not Found` as plain
//! text and its body is never read. Routes match the whole request target:
//! a target carrying a query string matches nothing.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::{BodyExt, LengthLimitError, Limited};
use matchit::Router as MatchitRouter;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::handler::{BoxedHandler, Handler};
use crate::method::Method;
use crate::request::Request;
use crate::response::{IntoResponse, Response};
use crate::status::Status;

/// Default cap on a buffered request body: 1 MiB.
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

/// The application router.
///
/// Build it once at startup and hand it to [`Server::serve`](crate::Server::serve).
/// Registrations chain:
///
/// ```rust
/// # use roster::{Method, Request, Response, Router};
/// # async fn list(_: Request) -> Response { Response::builder().text("") }
/// Router::new()
///     .on(Method::Get, "/profiles", list)
///     .body_limit(64 * 1024);
/// ```
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
    body_limit: usize,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new(), body_limit: DEFAULT_BODY_LIMIT }
    }

    /// Register a handler for a method + path pair.
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid route or conflicts with one already
    /// registered for `method`. Routes are static, so this fires at startup.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    /// Largest request body, in bytes, buffered for a matched route.
    pub fn body_limit(mut self, bytes: usize) -> Self {
        self.body_limit = bytes;
        self
    }

    pub(crate) fn lookup(&self, method: Method, path: &str) -> Option<BoxedHandler> {
        let matched = self.routes.get(&method)?.at(path).ok()?;
        Some(Arc::clone(matched.value))
    }

    /// Routes one request and produces one response.
    ///
    /// The body is buffered in full, up to the configured limit, before the
    /// handler runs. Over the limit → `413`; a transport error → `400`.
    pub async fn handle<B>(&self, req: http::Request<B>) -> Response
    where
        B: hyper::body::Body<Data = Bytes>,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let (parts, body) = req.into_parts();
        let path = parts.uri.path().to_owned();

        let routed = match parts.uri.query() {
            Some(_) => None,
            None => Method::try_from(&parts.method).ok().and_then(|m| self.lookup(m, &path)),
        };
        let Some(handler) = routed else {
            debug!(method = %parts.method, uri = %parts.uri, "no route");
            return not_found();
        };

        let body = match Limited::new(body, self.body_limit).collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
                warn!(%path, limit = self.body_limit, "request body over limit");
                return ApiError::PayloadTooLarge.into_response();
            }
            Err(e) => {
                warn!(%path, error = %e, "failed to read request body");
                return ApiError::BodyRead.into_response();
            }
        };

        handler.call(Request::new(path, body)).await
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

fn not_found() -> Response {
    Response::builder().status(Status::NotFound).text("Not Found")
}
