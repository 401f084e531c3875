//! The configurator's route table.
//!
//! Four groups, each a controller trait plus a `router` function binding its
//! routes through [`guard`](crate::guard()):
//!
//! | Group | Conflicts answered as |
//! |---|---|
//! | [`auth`] | `403 {"status":"error","message":"User already exists"}` |
//! | [`user`] | `403` + the raw violation |
//! | [`build`] | generic failure |
//! | [`widget`] | generic failure |
//!
//! [`app`] merges them and adds health probes and the API document.

use std::sync::Arc;

use crate::health;
use crate::method::Method;
use crate::openapi::{self, Info};
use crate::router::Router;
use crate::status::Status;

/// Adapts one controller-trait method into a closure [`guard`](crate::guard())
/// accepts.
macro_rules! action {
    ($controller:expr, $method:ident) => {{
        let controller = ::std::sync::Arc::clone(&$controller);
        move |req: $crate::Request, res: $crate::ResponseSink| {
            let controller = ::std::sync::Arc::clone(&controller);
            async move { controller.$method(req, res).await }
        }
    }};
}

pub mod auth;
pub mod build;
pub mod user;
pub mod widget;

pub use auth::AuthController;
pub use build::BuildController;
pub use user::UserController;
pub use widget::WidgetController;

/// The collaborators behind every route.
#[derive(Clone)]
pub struct Controllers {
    pub auth: Arc<dyn AuthController>,
    pub user: Arc<dyn UserController>,
    pub build: Arc<dyn BuildController>,
    pub widget: Arc<dyn WidgetController>,
}

impl Controllers {
    /// Uses one value for all four groups.
    pub fn from_shared<T>(controller: Arc<T>) -> Self
    where
        T: AuthController + UserController + BuildController + WidgetController,
    {
        Self {
            auth: controller.clone(),
            user: controller.clone(),
            build: controller.clone(),
            widget: controller,
        }
    }
}

/// Path of the rendered API document.
pub const API_DOCS_PATH: &str = "/api-docs";

/// The whole application: auth, user, build and widget routes (in that
/// order), `GET /healthz`, `GET /readyz` and `GET /api-docs`.
///
/// `failure_status` is the status of the generic failure body in every group.
pub fn app(controllers: Controllers, failure_status: Status) -> Router {
    let api = auth::router(controllers.auth, failure_status)
        .merge(user::router(controllers.user, failure_status))
        .merge(build::router(controllers.build, failure_status))
        .merge(widget::router(controllers.widget, failure_status));

    let document = openapi::document(&api, &Info::default());

    api.on(Method::Get, "/healthz", health::liveness)
        .on(Method::Get, "/readyz", health::readiness)
        .on(Method::Get, API_DOCS_PATH, openapi::handler(&document))
}
