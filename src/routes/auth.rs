//! Authentication routes: login, signup, logout, token refresh.

use std::sync::Arc;

use async_trait::async_trait;

use crate::controller::ControllerError;
use crate::guard::{guard, ConflictPolicy, GuardPolicy};
use crate::method::Method;
use crate::openapi::{Body, Param, Reply, RouteDoc};
use crate::request::Request;
use crate::router::Router;
use crate::sink::ResponseSink;
use crate::status::Status;

/// Session and account-creation collaborator.
#[async_trait]
pub trait AuthController: Send + Sync + 'static {
    /// `POST /login`
    async fn login(&self, req: Request, res: ResponseSink) -> Result<(), ControllerError>;
    /// `POST /signup`
    async fn signup(&self, req: Request, res: ResponseSink) -> Result<(), ControllerError>;
    /// `GET /logout`
    async fn logout(&self, req: Request, res: ResponseSink) -> Result<(), ControllerError>;
    /// `POST /auth/refreshtoken`
    async fn refresh_token(&self, req: Request, res: ResponseSink) -> Result<(), ControllerError>;
}

/// Signup conflicts read "User already exists".
pub fn router(controller: Arc<dyn AuthController>, failure_status: Status) -> Router {
    let policy = GuardPolicy::new(ConflictPolicy::FriendlyMessage).failure_status(failure_status);

    Router::new()
        .documented(Method::Post, "/login", guard(policy, action!(controller, login)), LOGIN)
        .documented(Method::Post, "/signup", guard(policy, action!(controller, signup)), SIGNUP)
        .documented(Method::Get, "/logout", guard(policy, action!(controller, logout)), LOGOUT)
        .documented(
            Method::Post,
            "/auth/refreshtoken",
            guard(policy, action!(controller, refresh_token)),
            REFRESH_TOKEN,
        )
}

const LOGIN: RouteDoc = RouteDoc {
    summary: "Logs user into the system",
    description: "Login user",
    tag: "User",
    params: &[
        Param::query("mail", "The user's mail"),
        Param::query("password", "The user's password"),
    ],
    body: Some(Body { description: "Login user", required: false, schema: "User" }),
    responses: &[
        Reply::list_of(200, "User logged in", "User"),
        Reply::new(400, "Invalid mail/password supplied"),
        Reply::new(404, "Error 404 not found"),
    ],
};

const SIGNUP: RouteDoc = RouteDoc {
    summary: "Create an user",
    description: "Create an user",
    tag: "User",
    params: &[],
    body: Some(Body { description: "Create an user", required: false, schema: "CreateUser" }),
    responses: &[
        Reply::list_of(201, "User created", "CreateUser"),
        Reply::new(400, "Invalid mail/password supplied"),
        Reply::new(403, "User already exists"),
    ],
};

const LOGOUT: RouteDoc = RouteDoc {
    summary: "Logs out current logged in user session",
    description: "Logout user",
    tag: "User",
    params: &[],
    body: None,
    responses: &[Reply::new(200, "User logged out")],
};

const REFRESH_TOKEN: RouteDoc = RouteDoc {
    summary: "Refresh the session token",
    description: "Issue a new access token from a valid refresh token",
    tag: "User",
    params: &[],
    body: None,
    responses: &[
        Reply::new(200, "New token issued"),
        Reply::new(403, "Refresh token rejected"),
    ],
};
