//! Dispatcher core module - resolves a request and runs its chain.
//!
//! A request flows through two chains. The global chain wraps the whole
//! dispatch, so global middleware also see NotFound and MethodNotAllowed.
//! The route chain wraps the matched handler. Both end in a terminal step
//! and both are built fresh for every request.

use std::sync::Arc;
use std::time::Instant;

use anyhow::anyhow;
use http::Method;
use serde::Serialize;
use serde_json::Value;
use smallvec::SmallVec;
use tracing::{debug, info, warn};

use super::handler::HandlerDescriptor;
use crate::error::{reason_phrase, DispatchError};
use crate::middleware::{MiddlewareChain, MiddlewareRef};
use crate::registry::Registry;
use crate::router::{RouteInfo, RouteMatch, Router};
use crate::runtime_config::RuntimeConfig;

/// Maximum inline headers before heap allocation
pub const MAX_INLINE_HEADERS: usize = 16;

/// Header storage for requests and responses.
///
/// Header names are `Arc<str>` since the same few names repeat on every
/// request; values are per-request data.
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// A fully-formed request handed to the dispatcher.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub path: String,
    pub headers: HeaderVec,
    /// Request body parsed as JSON (if present)
    pub body: Option<Value>,
}

impl Request {
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HeaderVec::new(),
            body: None,
        }
    }

    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((Arc::from(name), value.into()));
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Get a header by name (case-insensitive)
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Response produced by a handler, a middleware or the error path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    /// HTTP status code (200, 404, 500, etc.)
    pub status: u16,
    #[serde(skip_serializing)]
    pub headers: HeaderVec,
    pub body: Value,
}

impl Response {
    #[must_use]
    pub fn new(status: u16, headers: HeaderVec, body: Value) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Create a JSON response with a content-type header
    #[must_use]
    pub fn json(status: u16, body: Value) -> Self {
        let mut headers = HeaderVec::new();
        headers.push((Arc::from("content-type"), "application/json".to_string()));
        Self::new(status, headers, body)
    }

    /// Create a plain-text response; the body is a JSON string.
    #[must_use]
    pub fn text(status: u16, body: impl Into<String>) -> Self {
        let mut headers = HeaderVec::new();
        let content_type = "text/plain; charset=utf-8".to_string();
        headers.push((Arc::from("content-type"), content_type));
        Self::new(status, headers, Value::String(body.into()))
    }

    /// Body as text: strings verbatim, anything else serialized as JSON.
    #[must_use]
    pub fn body_text(&self) -> String {
        match &self.body {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }

    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Add or replace a header
    pub fn set_header(&mut self, name: &str, value: String) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((Arc::from(name), value));
    }

    /// A response is well-formed when its status is in `100..=599`.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        Self::is_valid_status(self.status)
    }

    /// Status classes 1xx to 5xx. `http::StatusCode` also accepts 600 to 999.
    #[must_use]
    pub fn is_valid_status(status: u16) -> bool {
        (100..=599).contains(&status)
    }
}

/// Resolves requests against a [`Router`] and runs handlers through their
/// middleware chains.
///
/// The dispatcher owns the route table; register every route before the
/// first dispatch.
#[derive(Clone)]
pub struct Dispatcher {
    router: Arc<Router>,
    registry: Arc<Registry>,
    /// Global middleware, outermost first
    middlewares: Vec<MiddlewareRef>,
    config: RuntimeConfig,
}

impl Dispatcher {
    /// Dispatcher with the default [`RuntimeConfig`]. The router keeps its
    /// own slow-match threshold.
    #[must_use]
    pub fn new(router: Router, registry: Registry) -> Self {
        Self::build(router, registry, RuntimeConfig::default())
    }

    /// Dispatcher whose router logs slow matches per `config`.
    #[must_use]
    pub fn with_config(mut router: Router, registry: Registry, config: RuntimeConfig) -> Self {
        router.set_slow_match_threshold(config.slow_match);
        Self::build(router, registry, config)
    }

    fn build(router: Router, registry: Registry, config: RuntimeConfig) -> Self {
        Dispatcher {
            router: Arc::new(router),
            registry: Arc::new(registry),
            middlewares: Vec::new(),
            config,
        }
    }

    /// Append a global middleware. Global middleware run in the order they
    /// are added, before any route middleware.
    pub fn add_middleware(&mut self, middleware: impl Into<MiddlewareRef>) {
        let middleware = middleware.into();
        debug!(middleware = ?middleware, "Global middleware added");
        self.middlewares.push(middleware);
    }

    #[must_use]
    pub fn router(&self) -> &Router {
        &self.router
    }

    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    #[must_use]
    pub fn middlewares(&self) -> &[MiddlewareRef] {
        &self.middlewares
    }

    #[must_use]
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Match `method` and `path`. A miss is NotFound for GET and HEAD and
    /// MethodNotAllowed for every other verb.
    pub fn resolve(&self, method: &Method, path: &str) -> Result<RouteMatch<'_>, DispatchError> {
        self.router.route(method, path).ok_or_else(|| {
            let method = method.clone();
            let path = path.to_string();
            if method == Method::GET || method == Method::HEAD {
                DispatchError::NotFound { method, path }
            } else {
                DispatchError::MethodNotAllowed { method, path }
            }
        })
    }

    /// Run the global middleware chain around [`Dispatcher::dispatch`].
    pub fn handle(&self, request: Request) -> Result<Response, DispatchError> {
        if self.middlewares.is_empty() {
            return self.dispatch(request);
        }
        let mut chain = MiddlewareChain::new(
            self.middlewares.iter().cloned(),
            &self.registry,
            |req: Request| self.dispatch(req).map_err(anyhow::Error::from),
        );
        chain.handle(request).map_err(DispatchError::from_anyhow)
    }

    /// Resolve the request and run the matched route's chain, without the
    /// global middleware.
    pub fn dispatch(&self, request: Request) -> Result<Response, DispatchError> {
        let RouteMatch { entry, params } = self.resolve(&request.method, &request.path)?;
        let info = RouteInfo::matched(request.path.as_str(), entry.pattern().raw(), params);
        let handler = entry.handler();

        let mut chain = MiddlewareChain::new(
            entry.middleware().iter().cloned(),
            &self.registry,
            |req: Request| self.invoke(handler, &req, &info).map_err(anyhow::Error::from),
        );
        debug!(
            method = %request.method,
            path = %request.path,
            handler = %handler,
            middleware_count = chain.len(),
            "Route chain built"
        );
        chain.handle(request).map_err(DispatchError::from_anyhow)
    }

    /// Invoke a handler and check that it answered with a well-formed
    /// response.
    pub fn invoke(
        &self,
        handler: &HandlerDescriptor,
        request: &Request,
        info: &RouteInfo,
    ) -> Result<Response, DispatchError> {
        let start = Instant::now();
        let response = match handler {
            HandlerDescriptor::Direct(f) => f(request, info).map_err(DispatchError::from_anyhow)?,
            HandlerDescriptor::Deferred { type_id, method } => {
                let method = method
                    .as_deref()
                    .unwrap_or(self.config.default_method.as_str());
                let target = format!("{type_id}#{method}");
                let mut controller = self.registry.construct_controller(type_id)?;
                match controller.call(method, request, info) {
                    Some(result) => result.map_err(DispatchError::from_anyhow)?,
                    None => {
                        return Err(DispatchError::construction(
                            target,
                            anyhow!("controller `{type_id}` has no method `{method}`"),
                        ))
                    }
                }
            }
        };

        if !response.is_valid() {
            return Err(DispatchError::ContractViolation {
                handler: handler.to_string(),
                status: response.status,
            });
        }

        info!(
            method = %request.method,
            path = %request.path,
            handler = %handler,
            status = response.status,
            duration_us = start.elapsed().as_micros(),
            "Handler completed"
        );
        Ok(response)
    }

    /// Answer `status` through the error handler registered for it, or
    /// with the default body when none is registered.
    ///
    /// `cause` is handed to the error handler through
    /// [`RouteInfo::error`]; the default body never includes it.
    pub fn resolve_error(
        &self,
        request: &Request,
        status: u16,
        cause: Option<DispatchError>,
    ) -> Result<Response, DispatchError> {
        match self.router.error_handler(status) {
            Some(handler) => {
                debug!(status, handler = %handler, path = %request.path, "Error handler invoked");
                let info = RouteInfo::for_error(request.path.as_str(), cause.map(Arc::new));
                self.invoke(handler, request, &info)
            }
            None => {
                if let Some(cause) = &cause {
                    warn!(
                        status,
                        path = %request.path,
                        error = %cause,
                        "No error handler registered"
                    );
                }
                Ok(Self::default_error_response(status))
            }
        }
    }

    /// `"<status> <reason>"` as a plain-text response.
    #[must_use]
    pub fn default_error_response(status: u16) -> Response {
        Response::text(status, format!("{status} {}", reason_phrase(status)))
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("router", &self.router)
            .field("middlewares", &self.middlewares)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
