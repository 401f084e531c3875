//! Handler trait and type erasure.
//!
//! # How async handlers are stored
//!
//! The router holds handlers of *different* types in one route table, so each
//! one is hidden behind `dyn ErasedHandler` and stored as an `Arc`.
//!
//! ```text
//! async fn liveness(req: Request) -> Response { … }   ← plain handler
//! guard(policy, controller)                         ← wrapped controller
//!        ↓ router.on(Method::Get, "/healthz", liveness)
//! handler.into_boxed_handler()                      ← Handler impl
//!        ↓  stored as BoxedHandler = Arc<dyn ErasedHandler>
//! handler.call(req)  at request time                ← one vtable dispatch
//!        ↓
//! BoxFuture<Option<Response>>
//! ```
//!
//! The output is an `Option`: a wrapped controller that succeeds without
//! writing anything produces `None`, and nothing is added on its behalf.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::guard::Guarded;
use crate::request::Request;
use crate::response::{IntoResponse, Response};
use crate::sink::ResponseSink;
use crate::controller::ControllerError;

/// A heap-allocated, type-erased, `Send` future.
pub(crate) type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

/// Internal dispatch interface.
///
/// `#[doc(hidden)] pub` rather than `pub(crate)` because it appears in the
/// return type of the public `Handler` trait's `into_boxed_handler` method.
#[doc(hidden)]
pub trait ErasedHandler {
    fn call(&self, req: Request) -> BoxFuture<Option<Response>>;
}

/// A type-erased handler shared across concurrent requests.
#[doc(hidden)]
pub type BoxedHandler = Arc<dyn ErasedHandler + Send + Sync + 'static>;

/// Implemented for every valid route handler.
///
/// Satisfied automatically by:
///
/// ```text
/// async fn name(req: Request) -> impl IntoResponse
/// ```
///
/// and by controllers wrapped with [`guard`](crate::guard()).
/// The trait is sealed.
pub trait Handler: private::Sealed + Send + Sync + 'static {
    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler;
}

mod private {
    pub trait Sealed {}
}

impl<F, Fut, R> private::Sealed for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
}

impl<F, Fut, R> Handler for F
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(FnHandler(self))
    }
}

impl<C, Fut> private::Sealed for Guarded<C>
where
    C: Fn(Request, ResponseSink) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), ControllerError>> + Send + 'static,
{
}

impl<C, Fut> Handler for Guarded<C>
where
    C: Fn(Request, ResponseSink) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), ControllerError>> + Send + 'static,
{
    fn into_boxed_handler(self) -> BoxedHandler {
        Arc::new(self)
    }
}

/// Newtype wrapper that holds a plain handler `F` and implements
/// [`ErasedHandler`].
struct FnHandler<F>(F);

impl<F, Fut, R> ErasedHandler for FnHandler<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse + Send + 'static,
{
    fn call(&self, req: Request) -> BoxFuture<Option<Response>> {
        let fut = (self.0)(req);
        Box::pin(async move { Some(fut.await.into_response()) })
    }
}
