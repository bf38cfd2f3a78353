//! # roster
//!
//! A small HTTP service that accepts candidate profiles and lists the ones
//! already stored.
//!
//! ## Endpoints
//!
//! - `POST /submit-profile` takes a JSON object with `Name`, `Title`,
//!   `Targeted Keywords` (array of strings), `Education`, `Certification`
//!   and `Contact`, and appends it to both stores.
//! - `GET /profiles` returns every row of the CSV store as a JSON array.
//!
//! ## Storage
//!
//! Each profile lands in two files: `profiles.json`, a JSON array rewritten
//! in full per submission, and `profiles.csv`, a headerless CSV file grown by
//! appending. The JSON file is the source of truth; on startup the CSV file
//! is rebuilt from it if the two disagree (see [`ProfileService::reconcile`]).
//!
//! ## Running
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use roster::{Config, ProfileService, Server, routes};
//!
//! # async fn run() -> roster::Result<()> {
//! let cfg = Config::load()?;
//! let service = Arc::new(ProfileService::open(&cfg.storage).await?);
//! let app = routes::app(service, cfg.http.max_body_size);
//! Server::bind(&cfg.listen_addr())?.serve(app).await
//! # }
//! ```

mod error;
mod handler;
mod method;
mod request;
mod response;
mod router;
mod server;
mod status;

pub mod codec;
pub mod config;
pub mod profile;
pub mod routes;
pub mod service;
pub mod store;

pub use config::Config;
pub use error::{ApiError, Error, Result, StoreKind};
pub use handler::Handler;
pub use method::Method;
pub use profile::Profile;
pub use request::Request;
pub use response::{IntoResponse, Response, ResponseBuilder};
pub use router::Router;
pub use server::{Server, serve_listener};
pub use service::{ProfileService, Reconciled};
pub use status::Status;
