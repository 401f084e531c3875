//! The error-normalizing wrapper around every controller.
//!
//! [`guard`] turns a controller into a route [`Handler`](crate::Handler).
//! Per request it runs `Invoked → {Succeeded, Failed(classified)}` in one
//! step:
//!
//! - **Succeeded**: whatever the controller wrote through its
//!   [`ResponseSink`] is the response. Nothing is added.
//! - **Failed, conflict** (policy permitting): `403` with a conflict body.
//! - **Failed, anything else**: one `error` event, then the generic body
//!   `{"error":"Unexpected server error. Please try again later."}` with the
//!   policy's failure status.
//!
//! Which conflict body is sent, and whether conflicts are recognised at all,
//! differs between route groups and is captured by [`ConflictPolicy`].

use std::future::Future;

use serde::Serialize;
use tracing::error;

use crate::controller::ControllerError;
use crate::handler::{BoxFuture, ErasedHandler};
use crate::method::Method;
use crate::request::Request;
use crate::response::{IntoResponse, Json, Response};
use crate::sink::ResponseSink;
use crate::status::Status;

/// Message of the friendly conflict body.
pub const CONFLICT_MESSAGE: &str = "User already exists";

/// Message of the generic failure body.
pub const UNEXPECTED_ERROR: &str = "Unexpected server error. Please try again later.";

/// How a [`ControllerError::Conflict`] is answered.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConflictPolicy {
    /// `403 {"status":"error","message":"User already exists"}`.
    FriendlyMessage,
    /// `403` with the serialised [`UniqueViolation`](crate::UniqueViolation).
    EchoError,
    /// Conflicts are not special: they take the generic failure path.
    Unclassified,
}

/// Everything the wrapper needs to answer a failed controller.
#[derive(Clone, Copy, Debug)]
pub struct GuardPolicy {
    pub conflict: ConflictPolicy,
    pub failure_status: Status,
}

#[derive(Serialize)]
struct ConflictBody {
    status: &'static str,
    message: &'static str,
}

#[derive(Serialize)]
struct FailureBody {
    error: &'static str,
}

impl GuardPolicy {
    /// A policy answering generic failures with `200`.
    pub fn new(conflict: ConflictPolicy) -> Self {
        Self { conflict, failure_status: Status::Ok }
    }

    pub fn failure_status(mut self, status: Status) -> Self {
        self.failure_status = status;
        self
    }

    /// Classifies `err` and builds the normalized response.
    ///
    /// Emits exactly one `error` event for failures that are not answered
    /// as conflicts.
    pub fn recover(&self, method: Method, path: &str, err: ControllerError) -> Response {
        match (self.conflict, err) {
            (ConflictPolicy::FriendlyMessage, ControllerError::Conflict(_)) => (
                Status::Forbidden,
                Json(ConflictBody { status: "error", message: CONFLICT_MESSAGE }),
            )
                .into_response(),
            (ConflictPolicy::EchoError, ControllerError::Conflict(violation)) => {
                (Status::Forbidden, Json(violation)).into_response()
            }
            (_, err) => {
                error!(%method, path = %path, error = %err, "unexpected controller failure");
                (self.failure_status, Json(FailureBody { error: UNEXPECTED_ERROR })).into_response()
            }
        }
    }
}

/// Wraps `controller` so that none of its failures escape unanswered.
///
/// ```rust
/// use configurator::{guard, ConflictPolicy, ControllerError, GuardPolicy, Method,
///                    Request, ResponseSink, Router};
///
/// async fn signup(_req: Request, res: ResponseSink) -> Result<(), ControllerError> {
///     res.json(&serde_json::json!({"id": 1}))
/// }
///
/// let policy = GuardPolicy::new(ConflictPolicy::FriendlyMessage);
/// let router = Router::new().on(Method::Post, "/signup", guard(policy, signup));
/// ```
pub fn guard<C, Fut>(policy: GuardPolicy, controller: C) -> Guarded<C>
where
    C: Fn(Request, ResponseSink) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), ControllerError>> + Send + 'static,
{
    Guarded { policy, controller }
}

/// A controller wrapped by [`guard`].
pub struct Guarded<C> {
    policy: GuardPolicy,
    controller: C,
}

impl<C, Fut> ErasedHandler for Guarded<C>
where
    C: Fn(Request, ResponseSink) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), ControllerError>> + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture<Option<Response>> {
        let method = req.method();
        let path = req.path().to_owned();
        let policy = self.policy;

        let (sink, written) = ResponseSink::channel();
        let fut = (self.controller)(req, sink);

        Box::pin(async move {
            let result = fut.await;
            // Resolves once the sink is written or dropped, wherever it went.
            let response = written.await.ok();
            match (result, response) {
                (Ok(()), response) => response,
                // Already answered: the written response stands.
                (Err(err), Some(response)) => {
                    error!(%method, path = %path, error = %err, "controller failed after responding");
                    Some(response)
                }
                (Err(err), None) => Some(policy.recover(method, &path, err)),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;
    use crate::controller::UniqueViolation;

    fn body(res: &Response) -> Value {
        serde_json::from_slice(res.body()).unwrap()
    }

    async fn run<C, Fut>(conflict: ConflictPolicy, controller: C) -> Option<Response>
    where
        C: Fn(Request, ResponseSink) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), ControllerError>> + Send + 'static,
    {
        guard(GuardPolicy::new(conflict), controller)
            .call(Request::new(Method::Post, "/signup"))
            .await
    }

    #[tokio::test]
    async fn success_passes_written_response_through() {
        let res = run(ConflictPolicy::FriendlyMessage, |_req: Request, res: ResponseSink| async move {
            res.status(Status::Created).json(&json!({"id": 9}))
        })
        .await
        .unwrap();

        assert_eq!(res.status_code(), 201);
        assert_eq!(body(&res), json!({"id": 9}));
    }

    #[tokio::test]
    async fn silent_success_adds_nothing() {
        let res = run(ConflictPolicy::Unclassified, |_req: Request, _res: ResponseSink| async move {
            Ok(())
        })
        .await;

        assert!(res.is_none());
    }

    #[tokio::test]
    async fn friendly_policy_hides_conflict_details() {
        let res = run(ConflictPolicy::FriendlyMessage, |_req: Request, _res: ResponseSink| async move {
            Err(ControllerError::from(UniqueViolation::new("Validation error").field("email", "a@b.c")))
        })
        .await
        .unwrap();

        assert_eq!(res.status_code(), 403);
        assert_eq!(body(&res), json!({"status": "error", "message": "User already exists"}));
    }

    #[tokio::test]
    async fn echo_policy_returns_raw_violation() {
        let violation = UniqueViolation::new("Validation error").field("pseudo", "neo");
        let expected = serde_json::to_value(&violation).unwrap();

        let res = run(ConflictPolicy::EchoError, move |_req: Request, _res: ResponseSink| {
            let violation = violation.clone();
            async move { Err(ControllerError::Conflict(violation)) }
        })
        .await
        .unwrap();

        assert_eq!(res.status_code(), 403);
        assert_eq!(body(&res), expected);
    }

    #[tokio::test]
    async fn unclassified_policy_treats_conflict_as_generic() {
        let res = run(ConflictPolicy::Unclassified, |_req: Request, _res: ResponseSink| async move {
            Err(ControllerError::from(UniqueViolation::new("dup")))
        })
        .await
        .unwrap();

        assert_eq!(res.status_code(), 200);
        assert_eq!(body(&res), json!({"error": UNEXPECTED_ERROR}));
    }

    #[tokio::test]
    async fn failure_status_is_configurable() {
        let handler = guard(
            GuardPolicy::new(ConflictPolicy::EchoError).failure_status(Status::InternalServerError),
            |_req: Request, _res: ResponseSink| async move {
                Err(ControllerError::not_found("user 5"))
            },
        );
        let res = handler.call(Request::new(Method::Get, "/user/5")).await.unwrap();

        assert_eq!(res.status_code(), 500);
        assert_eq!(body(&res), json!({"error": UNEXPECTED_ERROR}));
    }

    #[tokio::test]
    async fn failure_after_writing_keeps_written_response() {
        let res = run(ConflictPolicy::FriendlyMessage, |_req: Request, res: ResponseSink| async move {
            res.status(Status::Created).end();
            Err(ControllerError::from(UniqueViolation::new("late")))
        })
        .await
        .unwrap();

        assert_eq!(res.status_code(), 201);
        assert!(res.body().is_empty());
    }

    #[tokio::test]
    async fn response_written_from_spawned_task_is_kept() {
        let res = run(ConflictPolicy::FriendlyMessage, |_req: Request, res: ResponseSink| async move {
            tokio::spawn(async move {
                tokio::task::yield_now().await;
                res.status(Status::Created).end();
            });
            Ok(())
        })
        .await
        .unwrap();

        assert_eq!(res.status_code(), 201);
    }
}
