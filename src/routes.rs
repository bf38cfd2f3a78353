//! The HTTP surface: two routes over a shared [`ProfileService`].
//!
//! | Method | Path | Handler |
//! |---|---|---|
//! | `POST` | `/submit-profile` | [`submit_profile`] |
//! | `GET`  | `/profiles`       | [`list_profiles`] |
//!
//! Everything else, including either path with a query string, is answered
//! by the router with `404 Not Found`.

use std::sync::Arc;

use serde_json::json;
use tracing::warn;

use crate::error::ApiError;
use crate::method::Method;
use crate::profile::Profile;
use crate::request::Request;
use crate::response::Response;
use crate::router::Router;
use crate::service::ProfileService;

pub const SUBMIT_PATH: &str = "/submit-profile";
pub const LIST_PATH: &str = "/profiles";

/// Builds the application router.
pub fn app(service: Arc<ProfileService>, body_limit: usize) -> Router {
    let submit = {
        let service = Arc::clone(&service);
        move |req: Request| submit_profile(Arc::clone(&service), req)
    };
    let list = move |req: Request| list_profiles(Arc::clone(&service), req);

    Router::new()
        .on(Method::Post, SUBMIT_PATH, submit)
        .on(Method::Get, LIST_PATH, list)
        .body_limit(body_limit)
}

/// `POST /submit-profile`
pub async fn submit_profile(
    service: Arc<ProfileService>,
    req: Request,
) -> Result<Response, ApiError> {
    let profile = Profile::from_body(req.body()).inspect_err(|e| {
        warn!(path = req.path(), error = %e, "rejected profile submission");
    })?;
    service.submit(profile).await?;
    Ok(Response::builder().json_value(&json!({
        "message": "Profile received and saved successfully"
    })))
}

/// `GET /profiles`
pub async fn list_profiles(
    service: Arc<ProfileService>,
    _req: Request,
) -> Result<Response, ApiError> {
    let rows = service.list().await?;
    Ok(Response::builder().json_value(&rows))
}
