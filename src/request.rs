//! Incoming HTTP request type.

use std::collections::HashMap;

use bytes::Bytes;
use http_body_util::BodyExt;
use serde::de::DeserializeOwned;

use crate::controller::ControllerError;
use crate::method::Method;
use crate::response::Response;
use crate::status::Status;

/// An incoming HTTP request with its body fully buffered.
#[derive(Debug)]
pub struct Request {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) query: Option<String>,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) body: Bytes,
    pub(crate) params: HashMap<String, String>,
}

impl Request {
    /// Builds a request by hand, for in-process dispatch through
    /// [`Router::handle`](crate::Router::handle).
    ///
    /// `target` may carry a query string: `"/login?mail=a@b.c"`.
    pub fn new(method: Method, target: &str) -> Self {
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, Some(query.to_owned())),
            None => (target, None),
        };
        Self {
            method,
            path: path.to_owned(),
            query,
            headers: Vec::new(),
            body: Bytes::new(),
            params: HashMap::new(),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Reads a hyper request into memory.
    ///
    /// Fails with a ready-made response: `405` for methods outside RFC 9110,
    /// `400` when the body cannot be read.
    pub(crate) async fn from_hyper(
        req: hyper::Request<hyper::body::Incoming>,
    ) -> Result<Self, Response> {
        let (parts, body) = req.into_parts();

        let method = Method::try_from(&parts.method)
            .map_err(|()| Response::status(Status::MethodNotAllowed))?;

        let body = body
            .collect()
            .await
            .map_err(|e| {
                tracing::debug!("failed to read request body: {e}");
                Response::status(Status::BadRequest)
            })?
            .to_bytes();

        let headers = parts.headers.iter()
            .filter_map(|(k, v)| Some((k.as_str().to_owned(), v.to_str().ok()?.to_owned())))
            .collect();

        Ok(Self {
            method,
            path: parts.uri.path().to_owned(),
            query: parts.uri.query().map(str::to_owned),
            headers,
            body,
            params: HashMap::new(),
        })
    }

    pub(crate) fn set_params(&mut self, params: HashMap<String, String>) {
        self.params = params;
    }

    pub fn method(&self) -> Method { self.method }
    pub fn path(&self) -> &str { &self.path }
    pub fn query(&self) -> Option<&str> { self.query.as_deref() }
    pub fn headers(&self) -> &[(String, String)] { &self.headers }
    pub fn body(&self) -> &[u8] { &self.body }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/user/:id`, `req.param("id")` on `/user/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Decodes the body as JSON. A malformed body is a
    /// [`ControllerError::Validation`].
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ControllerError> {
        serde_json::from_slice(&self.body)
            .map_err(|e| ControllerError::Validation(format!("malformed JSON body: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_splits_off_query() {
        let req = Request::new(Method::Post, "/login?mail=a@b.c");
        assert_eq!(req.path(), "/login");
        assert_eq!(req.query(), Some("mail=a@b.c"));
    }

    #[test]
    fn header_lookup_ignores_case() {
        let req = Request::new(Method::Get, "/logout").with_header("Authorization", "Bearer x");
        assert_eq!(req.header("authorization"), Some("Bearer x"));
        assert_eq!(req.header("cookie"), None);
    }

    #[test]
    fn malformed_json_is_a_validation_error() {
        let req = Request::new(Method::Post, "/builds").with_body("{not json");
        let err = req.json::<serde_json::Value>().unwrap_err();
        assert!(matches!(err, ControllerError::Validation(_)));
    }
}
