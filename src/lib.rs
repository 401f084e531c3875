//! # configurator
//!
//! The HTTP routing layer of the build configurator: users, their builds,
//! and the widgets placed in those builds.
//!
//! Business logic lives in controllers outside this crate. What lives here:
//!
//! - **Routing**: method + Express-style path → handler, one radix tree per
//!   method via [`matchit`].
//! - **The wrapper**: [`guard`] runs a controller, and if it fails, turns
//!   the failure into one of a small closed set of responses: a `403` for
//!   uniqueness conflicts (where the route group recognises them) or a
//!   logged generic error body for everything else.
//! - **API documentation**: every route carries a [`RouteDoc`]; the
//!   rendered OpenAPI document is served at `/api-docs`.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use configurator::{routes, AppConfig, Server};
//! # use configurator::routes::Controllers;
//! # fn controllers() -> Controllers { unimplemented!() }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), configurator::Error> {
//!     let config = AppConfig::load()?;
//!     configurator::telemetry::init(&config.logging);
//!
//!     let app = routes::app(controllers(), config.failure_status()?);
//!     Server::bind(&config.server.address())?.serve(app).await
//! }
//! ```
//!
//! ## Writing a controller
//!
//! A controller receives the [`Request`] and a single-use [`ResponseSink`],
//! and either writes through the sink or fails with a [`ControllerError`]:
//!
//! ```rust
//! use configurator::{ControllerError, Request, ResponseSink, UniqueViolation};
//!
//! async fn signup(req: Request, res: ResponseSink) -> Result<(), ControllerError> {
//!     let user: serde_json::Value = req.json()?;
//!     if user["pseudo"] == "neo" {
//!         return Err(UniqueViolation::new("Validation error").field("pseudo", "neo").into());
//!     }
//!     res.json(&user)
//! }
//! ```

mod controller;
mod error;
mod guard;
mod handler;
mod method;
mod request;
mod response;
mod router;
mod server;
mod sink;
mod status;

pub mod config;
pub mod health;
pub mod openapi;
pub mod routes;
pub mod telemetry;

pub use config::AppConfig;
pub use controller::{ControllerError, UniqueViolation, ViolatedField, UNIQUE_VIOLATION};
pub use error::Error;
pub use guard::{guard, ConflictPolicy, GuardPolicy, Guarded, CONFLICT_MESSAGE, UNEXPECTED_ERROR};
pub use handler::Handler;
pub use method::Method;
pub use openapi::RouteDoc;
pub use request::Request;
pub use response::{IntoResponse, Json, Response, ResponseBuilder};
pub use router::Router;
pub use server::{serve_listener, Server};
pub use sink::ResponseSink;
pub use status::Status;
