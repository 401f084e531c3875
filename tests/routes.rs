mod common;

use std::sync::Arc;

use async_trait::async_trait;
use configurator::routes::{self, AuthController, Controllers};
use configurator::{
    ControllerError, Method, Request, Response, ResponseSink, Router, Status, CONFLICT_MESSAGE,
    UNEXPECTED_ERROR,
};
use serde_json::{json, Value};
use tokio::sync::Barrier;

use common::{controllers, violation, Behavior, Captured, Scripted};

#[derive(Clone, Copy, Debug, PartialEq)]
enum Group {
    Auth,
    User,
    Build,
    Widget,
}

/// One concrete request per registered controller route.
const ROUTES: &[(Method, &str, Group)] = &[
    (Method::Post,   "/login",               Group::Auth),
    (Method::Post,   "/signup",              Group::Auth),
    (Method::Get,    "/logout",              Group::Auth),
    (Method::Post,   "/auth/refreshtoken",   Group::Auth),
    (Method::Get,    "/user/5",              Group::User),
    (Method::Patch,  "/user/5/biography",    Group::User),
    (Method::Patch,  "/user/5",              Group::User),
    (Method::Get,    "/user/5/mail",         Group::User),
    (Method::Delete, "/delete/5",            Group::User),
    (Method::Get,    "/user/5/builds",       Group::Build),
    (Method::Post,   "/builds",              Group::Build),
    (Method::Patch,  "/builds/3",            Group::Build),
    (Method::Delete, "/builds/3",            Group::Build),
    (Method::Get,    "/builds/3/widgets",    Group::Widget),
    (Method::Post,   "/widget",              Group::Widget),
    (Method::Patch,  "/builds/3/widgets/8",  Group::Widget),
    (Method::Delete, "/builds/3/widgets/8",  Group::Widget),
];

fn app(behavior: Behavior) -> Router {
    routes::app(controllers(behavior), Status::Ok)
}

fn json_body(res: &Response) -> Value {
    serde_json::from_slice(res.body()).unwrap()
}

async fn send(router: &Router, method: Method, path: &str) -> Option<Response> {
    router.handle(Request::new(method, path)).await
}

#[test]
fn routes_are_registered_in_group_order() {
    let app = app(Behavior::Respond);
    let registered: Vec<_> = app.routes().map(|(m, p)| (m, p.to_owned())).collect();

    let expected: Vec<_> = [
        (Method::Post,   "/login"),
        (Method::Post,   "/signup"),
        (Method::Get,    "/logout"),
        (Method::Post,   "/auth/refreshtoken"),
        (Method::Get,    "/user/:id"),
        (Method::Patch,  "/user/:id/biography"),
        (Method::Patch,  "/user/:id"),
        (Method::Get,    "/user/:id/mail"),
        (Method::Delete, "/delete/:id"),
        (Method::Get,    "/user/:id/builds"),
        (Method::Post,   "/builds"),
        (Method::Patch,  "/builds/:id"),
        (Method::Delete, "/builds/:id"),
        (Method::Get,    "/builds/:id/widgets"),
        (Method::Post,   "/widget"),
        (Method::Patch,  "/builds/:bid/widgets/:wid"),
        (Method::Delete, "/builds/:bid/widgets/:wid"),
        (Method::Get,    "/healthz"),
        (Method::Get,    "/readyz"),
        (Method::Get,    "/api-docs"),
    ]
    .into_iter()
    .map(|(m, p)| (m, p.to_owned()))
    .collect();

    assert_eq!(registered, expected);
}

#[tokio::test]
async fn successful_controllers_answer_untouched() {
    let app = app(Behavior::Respond);

    for &(method, path, _) in ROUTES {
        let res = send(&app, method, path).await.unwrap();
        assert_eq!(res.status_code(), 200, "{method} {path}");
        let body = json_body(&res);
        assert_eq!(body["path"], path, "{method} {path}");
        assert_eq!(body["method"], method.as_str());
    }
}

#[tokio::test]
async fn path_params_reach_controllers_by_name() {
    let app = app(Behavior::Respond);

    let body = json_body(&send(&app, Method::Patch, "/builds/3/widgets/8").await.unwrap());
    assert_eq!(body["bid"], "3");
    assert_eq!(body["wid"], "8");
    assert_eq!(body["id"], Value::Null);

    let body = json_body(&send(&app, Method::Get, "/user/5/builds").await.unwrap());
    assert_eq!(body["id"], "5");
}

#[tokio::test]
async fn params_arrive_decoded_with_trailing_slash_ignored() {
    let app = app(Behavior::Respond);

    let body = json_body(&send(&app, Method::Get, "/user/neo%20anderson/").await.unwrap());
    assert_eq!(body["id"], "neo anderson");

    let res = send(&app, Method::Get, "/user/%FF").await.unwrap();
    assert_eq!(res.status_code(), 400);
}

#[tokio::test]
async fn signup_conflict_reads_user_already_exists() {
    let app = app(Behavior::Conflict);

    let res = send(&app, Method::Post, "/signup").await.unwrap();
    assert_eq!(res.status_code(), 403);
    assert_eq!(json_body(&res), json!({"status": "error", "message": CONFLICT_MESSAGE}));
}

#[tokio::test]
async fn user_conflict_echoes_raw_violation() {
    let app = app(Behavior::Conflict);

    let res = send(&app, Method::Patch, "/user/5").await.unwrap();
    assert_eq!(res.status_code(), 403);
    assert_eq!(json_body(&res), serde_json::to_value(violation()).unwrap());
}

#[tokio::test]
async fn conflicts_follow_each_group_policy() {
    let app = app(Behavior::Conflict);

    for &(method, path, group) in ROUTES {
        let res = send(&app, method, path).await.unwrap();
        let body = json_body(&res);
        match group {
            Group::Auth => {
                assert_eq!(res.status_code(), 403, "{method} {path}");
                assert_eq!(body["message"], CONFLICT_MESSAGE);
            }
            Group::User => {
                assert_eq!(res.status_code(), 403, "{method} {path}");
                assert_eq!(body["name"], "UniqueConstraintError");
            }
            Group::Build | Group::Widget => {
                assert_eq!(res.status_code(), 200, "{method} {path}");
                assert_eq!(body, json!({"error": UNEXPECTED_ERROR}));
            }
        }
    }
}

#[tokio::test]
async fn other_failures_get_the_generic_body() {
    let app = app(Behavior::Fail);

    for &(method, path, _) in ROUTES {
        let res = send(&app, method, path).await.unwrap();
        assert_eq!(res.status_code(), 200, "{method} {path}");
        assert_eq!(json_body(&res), json!({"error": UNEXPECTED_ERROR}), "{method} {path}");
    }
}

#[tokio::test]
async fn failure_status_applies_to_every_group() {
    let app = routes::app(controllers(Behavior::Fail), Status::InternalServerError);

    for &(method, path, _) in ROUTES {
        let res = send(&app, method, path).await.unwrap();
        assert_eq!(res.status_code(), 500, "{method} {path}");
    }
}

#[tokio::test]
async fn generic_failure_logs_exactly_once() {
    let captured = Captured::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(captured.clone())
        .with_ansi(false)
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let app = app(Behavior::Fail);
    let res = send(&app, Method::Get, "/user/5/builds").await.unwrap();

    assert_eq!(json_body(&res), json!({"error": UNEXPECTED_ERROR}));
    assert_eq!(captured.lines_containing("unexpected controller failure"), 1);
    assert_eq!(captured.lines_containing("connection reset by database"), 1);
}

#[tokio::test]
async fn answered_conflicts_are_not_logged() {
    let captured = Captured::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(captured.clone())
        .with_ansi(false)
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let app = app(Behavior::Conflict);
    send(&app, Method::Post, "/signup").await.unwrap();

    assert_eq!(captured.lines_containing("unexpected controller failure"), 0);
}

#[tokio::test]
async fn silent_success_gets_no_wrapper_response() {
    let app = app(Behavior::Silent);
    assert!(send(&app, Method::Delete, "/builds/3").await.is_none());
}

#[tokio::test]
async fn unknown_routes_are_not_found() {
    let app = app(Behavior::Respond);

    let res = send(&app, Method::Put, "/builds/3").await.unwrap();
    assert_eq!(res.status_code(), 404);

    let res = send(&app, Method::Get, "/widgets").await.unwrap();
    assert_eq!(res.status_code(), 404);
}

#[tokio::test]
async fn api_document_lists_every_controller_route() {
    let app = app(Behavior::Respond);

    let res = send(&app, Method::Get, "/api-docs").await.unwrap();
    assert_eq!(res.header("content-type"), Some("application/json"));
    let doc = json_body(&res);

    assert_eq!(doc["openapi"], "3.0.0");
    let operations: usize = doc["paths"].as_object().unwrap()
        .values()
        .map(|item| item.as_object().unwrap().len())
        .sum();
    assert_eq!(operations, ROUTES.len());
    assert!(doc["paths"]["/builds/{bid}/widgets/{wid}"]["delete"].is_object());
    assert!(doc["paths"].get("/healthz").is_none());
}

/// Login waits for signup to be in flight, and the other way round.
struct Interleaved(Barrier);

#[async_trait]
impl AuthController for Interleaved {
    async fn login(&self, _req: Request, res: ResponseSink) -> Result<(), ControllerError> {
        self.0.wait().await;
        res.json(&json!({"token": "abc"}))
    }

    async fn signup(&self, _req: Request, _res: ResponseSink) -> Result<(), ControllerError> {
        self.0.wait().await;
        Err(anyhow::anyhow!("mailer unavailable").into())
    }

    async fn logout(&self, _req: Request, res: ResponseSink) -> Result<(), ControllerError> {
        res.end();
        Ok(())
    }

    async fn refresh_token(&self, _req: Request, res: ResponseSink) -> Result<(), ControllerError> {
        res.end();
        Ok(())
    }
}

#[tokio::test]
async fn concurrent_requests_are_isolated() {
    let scripted = Arc::new(Scripted(Behavior::Respond));
    let controllers = Controllers {
        auth: Arc::new(Interleaved(Barrier::new(2))),
        user: scripted.clone(),
        build: scripted.clone(),
        widget: scripted,
    };
    let app = Arc::new(routes::app(controllers, Status::Ok));

    let (login, signup) = tokio::join!(
        send(&app, Method::Post, "/login"),
        send(&app, Method::Post, "/signup"),
    );

    assert_eq!(json_body(&login.unwrap()), json!({"token": "abc"}));
    assert_eq!(json_body(&signup.unwrap()), json!({"error": UNEXPECTED_ERROR}));
}

#[tokio::test]
async fn health_probes_answer() {
    let app = app(Behavior::Fail);

    let res = send(&app, Method::Get, "/healthz").await.unwrap();
    assert_eq!(res.body(), b"ok");

    let res = send(&app, Method::Get, "/readyz").await.unwrap();
    assert_eq!(res.body(), b"ready");
}
