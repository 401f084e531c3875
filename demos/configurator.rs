//! The configurator API over an in-memory store.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example configurator
//!
//! Try:
//!   curl -X POST localhost:3000/signup -H 'content-type: application/json' \
//!        -d '{"pseudo":"neo","email":"neo@matrix.io"}'
//!   curl -X POST localhost:3000/signup -H 'content-type: application/json' \
//!        -d '{"pseudo":"neo","email":"other@matrix.io"}'      # 403
//!   curl -X POST localhost:3000/builds -H 'content-type: application/json' \
//!        -d '{"title":"desk","user_id":1}'
//!   curl localhost:3000/user/1/builds
//!   curl localhost:3000/api-docs

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::Context;
use async_trait::async_trait;
use serde_json::{json, Value};

use configurator::routes::{
    self, AuthController, BuildController, Controllers, UserController, WidgetController,
};
use configurator::{AppConfig, ControllerError, Request, ResponseSink, Server, Status, UniqueViolation};

#[derive(Default)]
struct Table {
    next_id: u64,
    rows: BTreeMap<u64, Value>,
}

impl Table {
    fn insert(&mut self, mut row: Value) -> Value {
        self.next_id += 1;
        row["id"] = json!(self.next_id);
        self.rows.insert(self.next_id, row.clone());
        row
    }

    fn patch(&mut self, id: u64, changes: &Value) -> Result<Value, ControllerError> {
        let row = self.rows
            .get_mut(&id)
            .ok_or_else(|| ControllerError::not_found(format!("row {id}")))?;
        if let (Some(row), Some(changes)) = (row.as_object_mut(), changes.as_object()) {
            for (key, value) in changes {
                if key != "id" {
                    row.insert(key.clone(), value.clone());
                }
            }
        }
        Ok(row.clone())
    }

    fn where_eq(&self, column: &str, value: u64) -> Vec<Value> {
        self.rows.values().filter(|row| row[column] == json!(value)).cloned().collect()
    }
}

#[derive(Default)]
struct Store {
    users: Mutex<Table>,
    builds: Mutex<Table>,
    widgets: Mutex<Table>,
}

fn lock(table: &Mutex<Table>) -> Result<MutexGuard<'_, Table>, ControllerError> {
    table.lock().map_err(|_| anyhow::anyhow!("store poisoned").into())
}

fn id(req: &Request, name: &str) -> Result<u64, ControllerError> {
    req.param(name)
        .and_then(|raw| raw.parse().ok())
        .ok_or_else(|| ControllerError::validation(format!("`{name}` must be an integer")))
}

impl Store {
    /// Rejects a pseudo or email another user already has.
    fn check_unique(users: &Table, candidate: &Value, except: Option<u64>) -> Result<(), UniqueViolation> {
        for column in ["pseudo", "email"] {
            let Some(value) = candidate.get(column).filter(|v| !v.is_null()) else { continue };
            let taken = users.rows.iter()
                .any(|(id, row)| Some(*id) != except && &row[column] == value);
            if taken {
                return Err(UniqueViolation::new("Validation error").field(column, value.clone()));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl AuthController for Store {
    async fn login(&self, req: Request, res: ResponseSink) -> Result<(), ControllerError> {
        let credentials: Value = req.json()?;
        let users = lock(&self.users)?;
        let user = users.rows.values()
            .find(|u| u["email"] == credentials["email"])
            .ok_or_else(|| ControllerError::not_found("no user with that email"))?;
        res.json(&json!({ "user": user["id"], "token": format!("demo-{}", user["id"]) }))
    }

    async fn signup(&self, req: Request, res: ResponseSink) -> Result<(), ControllerError> {
        let user: Value = req.json()?;
        let mut users = lock(&self.users)?;
        Store::check_unique(&users, &user, None)?;
        let created = users.insert(user);
        res.status(Status::Created).json(&created)
    }

    async fn logout(&self, _req: Request, res: ResponseSink) -> Result<(), ControllerError> {
        res.json(&json!({ "message": "logged out" }))
    }

    async fn refresh_token(&self, req: Request, res: ResponseSink) -> Result<(), ControllerError> {
        let token = req.header("authorization")
            .and_then(|h| h.strip_prefix("Bearer "))
            .ok_or_else(|| ControllerError::validation("missing bearer token"))?;
        res.json(&json!({ "token": format!("{token}-refreshed") }))
    }
}

#[async_trait]
impl UserController for Store {
    async fn get_user(&self, req: Request, res: ResponseSink) -> Result<(), ControllerError> {
        let id = id(&req, "id")?;
        let users = lock(&self.users)?;
        let user = users.rows.get(&id).ok_or_else(|| ControllerError::not_found(format!("user {id}")))?;
        res.json(user)
    }

    async fn modify_biography(&self, req: Request, res: ResponseSink) -> Result<(), ControllerError> {
        let id = id(&req, "id")?;
        let body: Value = req.json()?;
        let user = lock(&self.users)?.patch(id, &json!({ "biography": body["biography"] }))?;
        res.json(&user)
    }

    async fn modify_user(&self, req: Request, res: ResponseSink) -> Result<(), ControllerError> {
        let id = id(&req, "id")?;
        let changes: Value = req.json()?;
        let mut users = lock(&self.users)?;
        Store::check_unique(&users, &changes, Some(id))?;
        let user = users.patch(id, &changes)?;
        res.json(&user)
    }

    async fn confirm_deletion(&self, req: Request, res: ResponseSink) -> Result<(), ControllerError> {
        let id = id(&req, "id")?;
        let users = lock(&self.users)?;
        let user = users.rows.get(&id).ok_or_else(|| ControllerError::not_found(format!("user {id}")))?;
        let to = &user["email"];
        tracing::info!(%to, user = id, "sending deletion confirmation mail");
        res.json(&json!({ "message": "confirmation mail sent" }))
    }

    async fn delete_user(&self, req: Request, res: ResponseSink) -> Result<(), ControllerError> {
        let id = id(&req, "id")?;
        lock(&self.users)?
            .rows
            .remove(&id)
            .ok_or_else(|| ControllerError::not_found(format!("user {id}")))?;
        res.json(&json!({ "message": "user deleted" }))
    }
}

#[async_trait]
impl BuildController for Store {
    async fn builds_of_user(&self, req: Request, res: ResponseSink) -> Result<(), ControllerError> {
        let id = id(&req, "id")?;
        res.json(&lock(&self.builds)?.where_eq("user_id", id))
    }

    async fn create_build(&self, req: Request, res: ResponseSink) -> Result<(), ControllerError> {
        let build: Value = req.json()?;
        let created = lock(&self.builds)?.insert(build);
        res.json(&[created])
    }

    async fn modify_build(&self, req: Request, res: ResponseSink) -> Result<(), ControllerError> {
        let id = id(&req, "id")?;
        let changes: Value = req.json()?;
        let build = lock(&self.builds)?.patch(id, &changes)?;
        res.json(&build)
    }

    async fn delete_build(&self, req: Request, res: ResponseSink) -> Result<(), ControllerError> {
        let id = id(&req, "id")?;
        lock(&self.builds)?
            .rows
            .remove(&id)
            .ok_or_else(|| ControllerError::not_found(format!("build {id}")))?;
        res.json(&json!({ "message": "build deleted" }))
    }
}

#[async_trait]
impl WidgetController for Store {
    async fn widgets_of_build(&self, req: Request, res: ResponseSink) -> Result<(), ControllerError> {
        let id = id(&req, "id")?;
        res.json(&lock(&self.widgets)?.where_eq("build_id", id))
    }

    async fn create_widget(&self, req: Request, res: ResponseSink) -> Result<(), ControllerError> {
        let widget: Value = req.json()?;
        let created = lock(&self.widgets)?.insert(widget);
        res.json(&[created])
    }

    async fn modify_widget(&self, req: Request, res: ResponseSink) -> Result<(), ControllerError> {
        let (bid, wid) = (id(&req, "bid")?, id(&req, "wid")?);
        let mut changes: Value = req.json()?;
        changes["build_id"] = json!(bid);
        let widget = lock(&self.widgets)?.patch(wid, &changes)?;
        res.json(&[widget])
    }

    async fn delete_widget(&self, req: Request, res: ResponseSink) -> Result<(), ControllerError> {
        let (bid, wid) = (id(&req, "bid")?, id(&req, "wid")?);
        let mut widgets = lock(&self.widgets)?;
        match widgets.rows.get(&wid) {
            Some(widget) if widget["build_id"] == json!(bid) => {
                widgets.rows.remove(&wid);
                res.json(&json!({ "message": "widget deleted" }))
            }
            _ => Err(ControllerError::not_found(format!("widget {wid} in build {bid}"))),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("failed to load configuration")?;
    configurator::telemetry::init(&config.logging);

    let controllers = Controllers::from_shared(Arc::new(Store::default()));
    let app = routes::app(controllers, config.failure_status()?);

    Server::bind(&config.server.address())?.serve(app).await?;
    Ok(())
}
