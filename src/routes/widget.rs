//! Widget routes. Widgets belong to a build.

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
pub trait WidgetController: Send + Sync + 'static {
    /// `GET /builds/:id/widgets`
    async fn widgets_of_build(&self, req: Request, res: ResponseSink) -> Result<(), ControllerError>;
    /// `POST /widget`
    async fn create_widget(&self, req: Request, res: ResponseSink) -> Result<(), ControllerError>;
    /// `PATCH /builds/:bid/widgets/:wid`
    async fn modify_widget(&self, req: Request, res: ResponseSink) -> Result<(), ControllerError>;
    /// `DELETE /builds/:bid/widgets/:wid`
    async fn delete_widget(&self, req: Request, res: ResponseSink) -> Result<(), ControllerError>;
}

/// Every failure, conflicts included, takes the generic path.
pub fn router(controller: Arc<dyn WidgetController>, failure_status: Status) -> Router {
    let policy = GuardPolicy::new(ConflictPolicy::Unclassified).failure_status(failure_status);

    Router::new()
        .documented(
            Method::Get,
            "/builds/:id/widgets",
            guard(policy, action!(controller, widgets_of_build)),
            WIDGETS_OF_BUILD,
        )
        .documented(Method::Post, "/widget", guard(policy, action!(controller, create_widget)), CREATE_WIDGET)
        .documented(
            Method::Patch,
            "/builds/:bid/widgets/:wid",
            guard(policy, action!(controller, modify_widget)),
            MODIFY_WIDGET,
        )
        .documented(
            Method::Delete,
            "/builds/:bid/widgets/:wid",
            guard(policy, action!(controller, delete_widget)),
            DELETE_WIDGET,
        )
}

const WIDGET_IN_BUILD: &[Param] = &[
    Param::id("bid", "ID of the build holding the widget"),
    Param::id("wid", "ID of the widget"),
];

const WIDGETS_OF_BUILD: RouteDoc = RouteDoc {
    summary: "Get the widgets of a build",
    description: "Return every widget placed in the build",
    tag: "Widget",
    params: &[Param::id("id", "ID of the build")],
    body: None,
    responses: &[
        Reply::list_of(200, "Build widgets found", "Widget"),
        Reply::new(400, "Invalid ID supplied"),
        Reply::new(404, "User widget not found"),
    ],
};

const CREATE_WIDGET: RouteDoc = RouteDoc {
    summary: "Add a new user widget in build",
    description: "This can only be done by the logged in user",
    tag: "Widget",
    params: &[],
    body: Some(Body { description: "Widget to be added in build", required: false, schema: "Widget" }),
    responses: &[
        Reply::list_of(200, "User widget added successfully", "Widget"),
        Reply::new(400, "Invalid widget supplied"),
    ],
};

const MODIFY_WIDGET: RouteDoc = RouteDoc {
    summary: "Update an user widget in build by ID",
    description: "This can only be done by the logged in user",
    tag: "Widget",
    params: WIDGET_IN_BUILD,
    body: Some(Body { description: "Fields to update", required: true, schema: "Widget" }),
    responses: &[
        Reply::list_of(200, "User widget updated successfully", "Widget"),
        Reply::new(400, "Invalid ID supplied"),
        Reply::new(404, "User widget not found"),
    ],
};

const DELETE_WIDGET: RouteDoc = RouteDoc {
    summary: "Delete an user widget in build by ID",
    description: "This can only be done by the logged in user",
    tag: "Widget",
    params: WIDGET_IN_BUILD,
    body: None,
    responses: &[
        Reply::new(200, "User widget was successfully deleted"),
        Reply::new(400, "Invalid ID supplied"),
        Reply::new(404, "User widget was not found"),
    ],
};
