//! The single-use response-writing capability handed to controllers.
//!
//! Every write method takes `self`, so a controller can answer a request at
//! most once. The wrapper keeps the receiving half and waits for the sink to
//! be written or dropped, so a sink moved into a spawned task still answers.
//! Holding it forever without writing leaves the request pending.

use serde::Serialize;
use tokio::sync::oneshot;

use crate::controller::ControllerError;
use crate::response::{IntoResponse, Response};
use crate::status::Status;

/// Where a controller writes its response.
///
/// ```rust
/// use configurator::{ControllerError, Request, ResponseSink, Status};
///
/// async fn create_build(req: Request, res: ResponseSink) -> Result<(), ControllerError> {
///     let build: serde_json::Value = req.json()?;
///     res.status(Status::Created).json(&build)
/// }
/// ```
#[derive(Debug)]
pub struct ResponseSink {
    tx: oneshot::Sender<Response>,
    status: Status,
}

impl ResponseSink {
    pub(crate) fn channel() -> (Self, oneshot::Receiver<Response>) {
        let (tx, rx) = oneshot::channel();
        (Self { tx, status: Status::Ok }, rx)
    }

    /// Sets the status used by [`json`](Self::json) and [`end`](Self::end).
    pub fn status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    /// Writes a complete response as-is; any status set earlier is ignored.
    pub fn send(self, response: impl IntoResponse) {
        // The receiver only goes away when the request itself was dropped.
        let _ = self.tx.send(response.into_response());
    }

    /// Writes `body` as JSON with the current status.
    pub fn json<T: Serialize + ?Sized>(self, body: &T) -> Result<(), ControllerError> {
        let bytes = serde_json::to_vec(body).map_err(anyhow::Error::from)?;
        let status = self.status;
        self.send(Response::builder().status(status).json(bytes));
        Ok(())
    }

    /// Writes an empty response with the current status.
    pub fn end(self) {
        let status = self.status;
        self.send(Response::status(status));
    }
}
