//! API documentation.
//!
//! Routes carry a [`RouteDoc`] next to their handler. [`document`] walks a
//! router and renders every documented route, plus the component schemas,
//! as an OpenAPI 3.0 document.

use std::sync::Arc;

use serde_json::{json, Map, Value};

use crate::handler::Handler;
use crate::request::Request;
use crate::response::Response;
use crate::router::Router;

/// Documentation of one route.
#[derive(Clone, Copy, Debug)]
pub struct RouteDoc {
    pub summary: &'static str,
    pub description: &'static str,
    pub tag: &'static str,
    pub params: &'static [Param],
    pub body: Option<Body>,
    pub responses: &'static [Reply],
}

/// Where a [`Param`] is read from.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ParamIn {
    Path,
    Query,
}

#[derive(Clone, Copy, Debug)]
pub struct Param {
    pub name: &'static str,
    pub location: ParamIn,
    pub description: &'static str,
    pub required: bool,
    /// JSON-schema type: `"integer"`, `"string"`.
    pub kind: &'static str,
}

impl Param {
    /// A required integer path parameter.
    pub const fn id(name: &'static str, description: &'static str) -> Self {
        Self { name, location: ParamIn::Path, description, required: true, kind: "integer" }
    }

    /// An optional string query parameter.
    pub const fn query(name: &'static str, description: &'static str) -> Self {
        Self { name, location: ParamIn::Query, description, required: false, kind: "string" }
    }
}

/// A JSON request body referencing a component schema.
#[derive(Clone, Copy, Debug)]
pub struct Body {
    pub description: &'static str,
    pub required: bool,
    pub schema: &'static str,
}

/// One documented response. `schema` names a component returned as an array.
#[derive(Clone, Copy, Debug)]
pub struct Reply {
    pub status: u16,
    pub description: &'static str,
    pub schema: Option<&'static str>,
}

impl Reply {
    pub const fn new(status: u16, description: &'static str) -> Self {
        Self { status, description, schema: None }
    }

    pub const fn list_of(status: u16, description: &'static str, schema: &'static str) -> Self {
        Self { status, description, schema: Some(schema) }
    }
}

/// Title and version of the rendered document.
#[derive(Clone, Debug)]
pub struct Info {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Default for Info {
    fn default() -> Self {
        Self {
            title: "Configurator API".to_owned(),
            version: env!("CARGO_PKG_VERSION").to_owned(),
            description: "Users, builds and widgets of the build configurator".to_owned(),
        }
    }
}

/// Renders every documented route of `router`.
pub fn document(router: &Router, info: &Info) -> Value {
    let mut paths = Map::new();
    for entry in router.entries() {
        let Some(doc) = &entry.doc else { continue };
        let item = paths
            .entry(openapi_path(&entry.pattern))
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(item) = item {
            item.insert(entry.method.as_lower().to_owned(), operation(doc));
        }
    }

    json!({
        "openapi": "3.0.0",
        "info": {
            "title": info.title,
            "version": info.version,
            "description": info.description,
        },
        "paths": paths,
        "components": { "schemas": schemas() },
    })
}

/// A handler answering with `document`, serialised once up front.
pub fn handler(document: &Value) -> impl Handler {
    let body = Arc::new(serde_json::to_vec(document).unwrap_or_default());
    move |_req: Request| {
        let body = Arc::clone(&body);
        async move { Response::json(body.to_vec()) }
    }
}

fn operation(doc: &RouteDoc) -> Value {
    let mut op = json!({
        "summary": doc.summary,
        "description": doc.description,
        "tags": [doc.tag],
    });

    if !doc.params.is_empty() {
        op["parameters"] = doc.params.iter()
            .map(|p| json!({
                "in": match p.location { ParamIn::Path => "path", ParamIn::Query => "query" },
                "name": p.name,
                "required": p.required,
                "description": p.description,
                "schema": { "type": p.kind },
            }))
            .collect();
    }

    if let Some(body) = &doc.body {
        op["requestBody"] = json!({
            "description": body.description,
            "required": body.required,
            "content": { "application/json": { "schema": schema_ref(body.schema) } },
        });
    }

    let responses: Map<String, Value> = doc.responses.iter()
        .map(|reply| {
            let mut value = json!({ "description": reply.description });
            if let Some(schema) = reply.schema {
                value["content"] = json!({
                    "application/json": {
                        "schema": { "type": "array", "items": schema_ref(schema) },
                    },
                });
            }
            (reply.status.to_string(), value)
        })
        .collect();
    op["responses"] = Value::Object(responses);

    op
}

fn schema_ref(name: &str) -> Value {
    json!({ "$ref": format!("#/components/schemas/{name}") })
}

/// `/builds/:bid/widgets/:wid` → `/builds/{bid}/widgets/{wid}`.
fn openapi_path(pattern: &str) -> String {
    pattern.split('/')
        .map(|segment| match segment.strip_prefix(':') {
            Some(name) => format!("{{{name}}}"),
            None => segment.to_owned(),
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn schemas() -> Value {
    let user_fields = json!({
        "firstname":       { "type": "string" },
        "lastname":        { "type": "string" },
        "pseudo":          { "type": "string" },
        "password":        { "type": "string" },
        "passwordConfirm": { "type": "string" },
        "email":           { "type": "string" },
        "biography":       { "type": "string" },
    });

    let mut user = user_fields.clone();
    user["id"] = json!({ "type": "integer" });

    json!({
        "User":       { "type": "object", "properties": user },
        "CreateUser": { "type": "object", "properties": user_fields },
        "Build": {
            "type": "object",
            "properties": {
                "id":        { "type": "integer" },
                "title":     { "type": "string" },
                "widget_id": { "type": "integer" },
                "user_id":   { "type": "integer" },
            },
        },
        "Widget": {
            "type": "object",
            "properties": {
                "name":       { "type": "string" },
                "position_x": { "type": "integer" },
                "position_y": { "type": "integer" },
                "build_id":   { "type": "integer" },
            },
        },
    })
}
