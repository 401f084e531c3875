//! Build routes.

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
pub trait BuildController: Send + Sync + 'static {
    /// `GET /user/:id/builds`
    async fn builds_of_user(&self, req: Request, res: ResponseSink) -> Result<(), ControllerError>;
    /// `POST /builds`
    async fn create_build(&self, req: Request, res: ResponseSink) -> Result<(), ControllerError>;
    /// `PATCH /builds/:id`
    async fn modify_build(&self, req: Request, res: ResponseSink) -> Result<(), ControllerError>;
    /// `DELETE /builds/:id`
    async fn delete_build(&self, req: Request, res: ResponseSink) -> Result<(), ControllerError>;
}

/// Every failure, conflicts included, takes the generic path.
pub fn router(controller: Arc<dyn BuildController>, failure_status: Status) -> Router {
    let policy = GuardPolicy::new(ConflictPolicy::Unclassified).failure_status(failure_status);

    Router::new()
        .documented(
            Method::Get,
            "/user/:id/builds",
            guard(policy, action!(controller, builds_of_user)),
            BUILDS_OF_USER,
        )
        .documented(Method::Post, "/builds", guard(policy, action!(controller, create_build)), CREATE_BUILD)
        .documented(Method::Patch, "/builds/:id", guard(policy, action!(controller, modify_build)), MODIFY_BUILD)
        .documented(Method::Delete, "/builds/:id", guard(policy, action!(controller, delete_build)), DELETE_BUILD)
}

const BUILDS_OF_USER: RouteDoc = RouteDoc {
    summary: "Get the builds of an user",
    description: "Return every build owned by the user",
    tag: "Build",
    params: &[Param::id("id", "ID of the user owning the builds")],
    body: None,
    responses: &[
        Reply::list_of(200, "User builds found", "Build"),
        Reply::new(400, "Invalid ID supplied"),
        Reply::new(404, "User build not found"),
    ],
};

const CREATE_BUILD: RouteDoc = RouteDoc {
    summary: "Add a new user build",
    description: "This can only be done by the logged in user",
    tag: "Build",
    params: &[],
    body: Some(Body { description: "The user build to create", required: false, schema: "Build" }),
    responses: &[
        Reply::list_of(200, "User build added successfully", "Build"),
        Reply::new(400, "Invalid build supplied"),
    ],
};

const MODIFY_BUILD: RouteDoc = RouteDoc {
    summary: "Update an user's build by ID",
    description: "This can only be done by the logged in user",
    tag: "Build",
    params: &[Param::id("id", "ID of the user build to update")],
    body: Some(Body { description: "Fields to update", required: true, schema: "Build" }),
    responses: &[
        Reply::new(200, "User build updated successfully"),
        Reply::new(400, "Invalid ID supplied"),
        Reply::new(404, "User build not found"),
    ],
};

const DELETE_BUILD: RouteDoc = RouteDoc {
    summary: "Delete an user build by ID",
    description: "This can only be done by the logged in user",
    tag: "Build",
    params: &[Param::id("id", "ID of the user build to delete")],
    body: None,
    responses: &[
        Reply::new(200, "User build was successfully deleted"),
        Reply::new(400, "Invalid ID supplied"),
        Reply::new(404, "User build was not found"),
    ],
};
