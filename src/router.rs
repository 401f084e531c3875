//! Radix-tree request router.
//!
//! One tree per HTTP method, O(path-length) lookup. Routes are written
//! Express-style, `/builds/:bid/widgets/:wid`, and kept in registration
//! order. The table is built once at startup and never changes afterwards.
//!
//! Inside a tree every parameter is stored under its position (`{p0}`,
//! `{p1}`, …) rather than its name, so `/builds/:id` and
//! `/builds/:bid/widgets/:wid` can live in the same tree. The declared names
//! are restored when a request matches.
//!
//! Matching follows Express's defaults where they matter to clients: one
//! trailing slash is ignored (`/user/5/` reaches `/user/:id`) and captured
//! parameters are percent-decoded, a parameter that decodes to invalid UTF-8
//! answering `400`. Paths are matched case-sensitively and `HEAD` is only
//! served where a `HEAD` route is registered.

use std::collections::HashMap;
use std::sync::Arc;

use matchit::Router as MatchitRouter;

use crate::handler::{BoxedHandler, Handler};
use crate::method::Method;
use crate::openapi::RouteDoc;
use crate::request::Request;
use crate::response::Response;
use crate::status::Status;

/// A registered (method, pattern, handler) triple.
pub(crate) struct RouteEntry {
    pub(crate) method: Method,
    pub(crate) pattern: String,
    pub(crate) params: Vec<String>,
    pub(crate) handler: BoxedHandler,
    pub(crate) doc: Option<RouteDoc>,
}

/// Outcome of matching a request against the table.
pub(crate) enum Lookup {
    Found(BoxedHandler, HashMap<String, String>),
    /// A captured parameter is not valid UTF-8 once decoded.
    BadParam,
    NotFound,
}

/// The application router.
///
/// Build it once at startup; pass it to [`Server::serve`](crate::Server::serve)
/// or drive it directly with [`Router::handle`]. Every registration returns
/// `self` so calls chain.
#[derive(Default)]
pub struct Router {
    entries: Vec<RouteEntry>,
    trees: HashMap<Method, MatchitRouter<usize>>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for a method + path pair.
    ///
    /// ```rust
    /// # use configurator::{Method, Request, Response, Router};
    /// # async fn get_user(_: Request) -> Response { Response::text("") }
    /// # async fn delete_user(_: Request) -> Response { Response::text("") }
    /// Router::new()
    ///     .on(Method::Get,    "/user/:id",   get_user)
    ///     .on(Method::Delete, "/delete/:id", delete_user);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics on a malformed pattern or when the method + pattern pair is
    /// already taken. Both are programming errors caught at startup.
    pub fn on(self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.add(method, path, handler.into_boxed_handler(), None)
    }

    /// Like [`on`](Self::on), and attaches the route's API documentation.
    pub fn documented(self, method: Method, path: &str, handler: impl Handler, doc: RouteDoc) -> Self {
        self.add(method, path, handler.into_boxed_handler(), Some(doc))
    }

    /// Appends every route of `other`, in its registration order.
    pub fn merge(self, other: Router) -> Self {
        other.entries.into_iter().fold(self, |router, entry| {
            router.add(entry.method, &entry.pattern, entry.handler, entry.doc)
        })
    }

    /// Registered `(method, pattern)` pairs in registration order.
    pub fn routes(&self) -> impl Iterator<Item = (Method, &str)> + '_ {
        self.entries.iter().map(|e| (e.method, e.pattern.as_str()))
    }

    pub(crate) fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    fn add(mut self, method: Method, path: &str, handler: BoxedHandler, doc: Option<RouteDoc>) -> Self {
        let (tree_path, params) = compile(path)
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));

        let index = self.entries.len();
        self.trees
            .entry(method)
            .or_default()
            .insert(tree_path, index)
            .unwrap_or_else(|e| panic!("invalid route `{method} {path}`: {e}"));

        self.entries.push(RouteEntry {
            method,
            pattern: path.to_owned(),
            params,
            handler,
            doc,
        });
        self
    }

    pub(crate) fn lookup(&self, method: Method, path: &str) -> Lookup {
        let path = match path.strip_suffix('/') {
            Some(trimmed) if !trimmed.is_empty() => trimmed,
            _ => path,
        };
        let Some(matched) = self.trees.get(&method).and_then(|tree| tree.at(path).ok()) else {
            return Lookup::NotFound;
        };

        let entry = &self.entries[*matched.value];
        let mut params = HashMap::with_capacity(entry.params.len());
        for (i, name) in entry.params.iter().enumerate() {
            let Some(raw) = matched.params.get(format!("p{i}")) else { continue };
            match urlencoding::decode(raw) {
                Ok(value) => {
                    params.insert(name.clone(), value.into_owned());
                }
                Err(_) => return Lookup::BadParam,
            }
        }
        Lookup::Found(Arc::clone(&entry.handler), params)
    }

    /// Routes one request in process.
    ///
    /// Unknown paths answer `404`, undecodable parameters `400`. `None` means
    /// the matched handler finished without writing a response.
    pub async fn handle(&self, mut req: Request) -> Option<Response> {
        match self.lookup(req.method(), req.path()) {
            Lookup::Found(handler, params) => {
                req.set_params(params);
                handler.call(req).await
            }
            Lookup::BadParam => Some(Response::status(Status::BadRequest)),
            Lookup::NotFound => Some(Response::status(Status::NotFound)),
        }
    }
}

/// Translates `/builds/:bid/widgets/:wid` into `/builds/{p0}/widgets/{p1}`
/// and the parameter names `["bid", "wid"]`.
fn compile(pattern: &str) -> Result<(String, Vec<String>), String> {
    if !pattern.starts_with('/') {
        return Err("pattern must start with `/`".to_owned());
    }

    let mut params: Vec<String> = Vec::new();
    let segments = pattern.split('/')
        .map(|segment| match segment.strip_prefix(':') {
            Some("") => Err("empty parameter name".to_owned()),
            Some(name) if params.iter().any(|p| p == name) => {
                Err(format!("duplicate parameter `{name}`"))
            }
            Some(name) => {
                let slot = format!("{{p{}}}", params.len());
                params.push(name.to_owned());
                Ok(slot)
            }
            None if segment.contains(['{', '}', '*']) => {
                Err(format!("unsupported segment `{segment}`"))
            }
            None => Ok(segment.to_owned()),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok((segments.join("/"), params))
}
