//! User routes.

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

#[async_trait]
pub trait UserController: Send + Sync + 'static {
    /// `GET /user/:id`
    async fn get_user(&self, req: Request, res: ResponseSink) -> Result<(), ControllerError>;
    /// `PATCH /user/:id/biography`
    async fn modify_biography(&self, req: Request, res: ResponseSink) -> Result<(), ControllerError>;
    /// `PATCH /user/:id`
    async fn modify_user(&self, req: Request, res: ResponseSink) -> Result<(), ControllerError>;
    /// `GET /user/:id/mail`: sends the deletion-confirmation email.
    async fn confirm_deletion(&self, req: Request, res: ResponseSink) -> Result<(), ControllerError>;
    /// `DELETE /delete/:id`
    async fn delete_user(&self, req: Request, res: ResponseSink) -> Result<(), ControllerError>;
}

/// Conflicts (a taken pseudo or email) echo the raw violation back.
pub fn router(controller: Arc<dyn UserController>, failure_status: Status) -> Router {
    let policy = GuardPolicy::new(ConflictPolicy::EchoError).failure_status(failure_status);

    Router::new()
        .documented(Method::Get, "/user/:id", guard(policy, action!(controller, get_user)), GET_USER)
        .documented(
            Method::Patch,
            "/user/:id/biography",
            guard(policy, action!(controller, modify_biography)),
            MODIFY_BIOGRAPHY,
        )
        .documented(Method::Patch, "/user/:id", guard(policy, action!(controller, modify_user)), MODIFY_USER)
        .documented(
            Method::Get,
            "/user/:id/mail",
            guard(policy, action!(controller, confirm_deletion)),
            CONFIRM_DELETION,
        )
        .documented(Method::Delete, "/delete/:id", guard(policy, action!(controller, delete_user)), DELETE_USER)
}

const GET_USER: RouteDoc = RouteDoc {
    summary: "Get an user by ID",
    description: "Return an user",
    tag: "User",
    params: &[Param::id("id", "ID of the user to return")],
    body: None,
    responses: &[
        Reply::list_of(200, "User found", "User"),
        Reply::new(400, "Invalid ID supplied"),
        Reply::new(404, "User not found"),
    ],
};

const MODIFY_BIOGRAPHY: RouteDoc = RouteDoc {
    summary: "Update the biography of an user",
    description: "This can only be done by the logged in user",
    tag: "User",
    params: &[Param::id("id", "ID of the user to update")],
    body: Some(Body { description: "New biography", required: true, schema: "User" }),
    responses: &[
        Reply::new(200, "Biography updated successfully"),
        Reply::new(400, "Invalid ID supplied"),
        Reply::new(404, "User not found"),
    ],
};

const MODIFY_USER: RouteDoc = RouteDoc {
    summary: "Update an user by ID",
    description: "This can only be done by the logged in user",
    tag: "User",
    params: &[Param::id("id", "ID of the user to update")],
    body: Some(Body { description: "Fields to update", required: true, schema: "User" }),
    responses: &[
        Reply::list_of(200, "User updated successfully", "User"),
        Reply::new(400, "Invalid ID supplied"),
        Reply::new(403, "Pseudo or email already taken"),
        Reply::new(404, "User not found"),
    ],
};

const CONFIRM_DELETION: RouteDoc = RouteDoc {
    summary: "Send the account deletion confirmation mail",
    description: "Mails the user a link confirming the deletion of their account",
    tag: "User",
    params: &[Param::id("id", "ID of the user to delete")],
    body: None,
    responses: &[
        Reply::new(200, "Confirmation mail sent"),
        Reply::new(404, "User not found"),
    ],
};

const DELETE_USER: RouteDoc = RouteDoc {
    summary: "Delete an user by ID",
    description: "This can only be done by the logged in user",
    tag: "User",
    params: &[Param::id("id", "ID of the user to delete")],
    body: None,
    responses: &[
        Reply::new(200, "The user was successfully deleted"),
        Reply::new(400, "Invalid ID supplied"),
        Reply::new(404, "User not found"),
    ],
};
