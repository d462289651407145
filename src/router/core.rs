//! Router core module - the route table and the match loop.
//!
//! Routes are stored per verb in registration order and compiled once, when
//! they are added. Matching walks the verb's list and stops at the first
//! entry whose expression matches; registration order is the only tie-break.

use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};

use http::Method;
use tracing::{debug, info, warn};

use super::params::ParameterSet;
use super::pattern::{CompiledPattern, PatternCompiler};
use crate::dispatcher::HandlerDescriptor;
use crate::middleware::MiddlewareRef;

/// Verbs the router knows by name. Any other verb is still accepted and
/// gets its own list.
pub static SUPPORTED_METHODS: [Method; 9] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::PATCH,
    Method::DELETE,
    Method::OPTIONS,
    Method::HEAD,
    Method::CONNECT,
    Method::TRACE,
];

/// Matches slower than this are logged at WARN.
pub const DEFAULT_SLOW_MATCH: Duration = Duration::from_millis(1);

/// A registered route. Immutable once added to a [`Router`].
#[derive(Clone)]
pub struct RouteEntry {
    method: Method,
    pattern: CompiledPattern,
    handler: HandlerDescriptor,
    middleware: Vec<MiddlewareRef>,
}

impl RouteEntry {
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    #[must_use]
    pub fn pattern(&self) -> &CompiledPattern {
        &self.pattern
    }

    #[must_use]
    pub fn handler(&self) -> &HandlerDescriptor {
        &self.handler
    }

    /// Route middleware, outermost first.
    #[must_use]
    pub fn middleware(&self) -> &[MiddlewareRef] {
        &self.middleware
    }
}

impl fmt::Display for RouteEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} -> {}", self.method, self.pattern.raw(), self.handler)
    }
}

impl fmt::Debug for RouteEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteEntry")
            .field("method", &self.method)
            .field("pattern", &self.pattern.raw())
            .field("handler", &self.handler)
            .field("middleware", &self.middleware)
            .finish()
    }
}

/// Result of matching a path against the route table.
#[derive(Debug)]
pub struct RouteMatch<'a> {
    pub entry: &'a RouteEntry,
    pub params: ParameterSet,
}

/// The route table: per-verb ordered routes plus status-keyed error handlers.
///
/// Populate it completely before the first dispatch; it is read-only while
/// serving.
#[derive(Clone, Default)]
pub struct Router {
    routes: HashMap<Method, Vec<RouteEntry>>,
    errors: HashMap<u16, HandlerDescriptor>,
    slow_match: Option<Duration>,
}

impl Router {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Log matches slower than `threshold` at WARN.
    #[must_use]
    pub fn with_slow_match_threshold(mut self, threshold: Duration) -> Self {
        self.slow_match = Some(threshold);
        self
    }

    pub(crate) fn set_slow_match_threshold(&mut self, threshold: Duration) {
        self.slow_match = Some(threshold);
    }

    /// Register a route without route middleware.
    pub fn add(&mut self, method: Method, pattern: &str, handler: HandlerDescriptor) -> &mut Self {
        self.add_with_middleware(method, pattern, handler, Vec::new())
    }

    /// Register a route wrapped in `middleware` (outermost first).
    pub fn add_with_middleware(
        &mut self,
        method: Method,
        pattern: &str,
        handler: HandlerDescriptor,
        middleware: Vec<MiddlewareRef>,
    ) -> &mut Self {
        let pattern = PatternCompiler::compile(pattern);
        debug!(
            method = %method,
            route_pattern = %pattern.raw(),
            expression = %pattern.expression(),
            handler = ?handler,
            middleware_count = middleware.len(),
            "Route registered"
        );
        self.routes.entry(method.clone()).or_default().push(RouteEntry {
            method,
            pattern,
            handler,
            middleware,
        });
        self
    }

    pub fn get(&mut self, pattern: &str, handler: HandlerDescriptor) -> &mut Self {
        self.add(Method::GET, pattern, handler)
    }

    pub fn post(&mut self, pattern: &str, handler: HandlerDescriptor) -> &mut Self {
        self.add(Method::POST, pattern, handler)
    }

    pub fn put(&mut self, pattern: &str, handler: HandlerDescriptor) -> &mut Self {
        self.add(Method::PUT, pattern, handler)
    }

    pub fn patch(&mut self, pattern: &str, handler: HandlerDescriptor) -> &mut Self {
        self.add(Method::PATCH, pattern, handler)
    }

    pub fn delete(&mut self, pattern: &str, handler: HandlerDescriptor) -> &mut Self {
        self.add(Method::DELETE, pattern, handler)
    }

    pub fn options(&mut self, pattern: &str, handler: HandlerDescriptor) -> &mut Self {
        self.add(Method::OPTIONS, pattern, handler)
    }

    pub fn connect(&mut self, pattern: &str, handler: HandlerDescriptor) -> &mut Self {
        self.add(Method::CONNECT, pattern, handler)
    }

    pub fn trace(&mut self, pattern: &str, handler: HandlerDescriptor) -> &mut Self {
        self.add(Method::TRACE, pattern, handler)
    }

    /// Register the handler for `status`. A later registration for the same
    /// status replaces the earlier one.
    pub fn add_error(&mut self, status: u16, handler: HandlerDescriptor) -> &mut Self {
        if let Some(previous) = self.errors.insert(status, handler) {
            debug!(status, previous = ?previous, "Error handler replaced");
        }
        self
    }

    /// Routes consulted for `method`. HEAD is served from the GET list.
    #[must_use]
    pub fn routes_for(&self, method: &Method) -> &[RouteEntry] {
        let routes = if method == Method::HEAD {
            self.routes.get(&Method::GET)
        } else {
            self.routes.get(method)
        };
        routes.map(Vec::as_slice).unwrap_or_default()
    }

    #[must_use]
    pub fn error_handler(&self, status: u16) -> Option<&HandlerDescriptor> {
        self.errors.get(&status)
    }

    /// Number of registered routes across all verbs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every route, known verbs first in [`SUPPORTED_METHODS`] order, then
    /// extension verbs by name. Registration order within a verb.
    pub fn entries(&self) -> impl Iterator<Item = &RouteEntry> {
        let mut extension: Vec<&Method> = self
            .routes
            .keys()
            .filter(|m| !SUPPORTED_METHODS.contains(*m))
            .collect();
        extension.sort_by(|a, b| a.as_str().cmp(b.as_str()));

        SUPPORTED_METHODS
            .iter()
            .chain(extension)
            .filter_map(|m| self.routes.get(m))
            .flatten()
    }

    /// One line per route: `METHOD pattern -> handler`.
    #[must_use]
    pub fn route_summaries(&self) -> Vec<String> {
        self.entries().map(ToString::to_string).collect()
    }

    /// Print all registered routes to stdout
    ///
    /// Useful for verifying that a route table was built as intended.
    pub fn dump_routes(&self) {
        println!(
            "[routes] count={} error_handlers={}",
            self.len(),
            self.errors.len()
        );
        for summary in self.route_summaries() {
            println!("[route] {summary}");
        }
        let mut statuses: Vec<_> = self.errors.iter().collect();
        statuses.sort_by_key(|(status, _)| **status);
        for (status, handler) in statuses {
            println!("[error] {status} -> {handler}");
        }
    }

    /// Find the first route for `method` whose pattern matches `path`.
    #[must_use]
    pub fn route(&self, method: &Method, path: &str) -> Option<RouteMatch<'_>> {
        debug!(method = %method, path = %path, "Route match attempt");
        let match_start = Instant::now();

        let found = self.routes_for(method).iter().find_map(|entry| {
            entry
                .pattern
                .captures(path)
                .map(|captured| (entry, captured))
        });
        let duration = match_start.elapsed();

        let Some((entry, captured)) = found else {
            warn!(
                method = %method,
                path = %path,
                duration_us = duration.as_micros(),
                "No route matched"
            );
            return None;
        };

        let params = ParameterSet::extract(entry.pattern.param_names(), captured, true);
        let threshold = self.slow_match.unwrap_or(DEFAULT_SLOW_MATCH);
        if duration > threshold {
            warn!(
                method = %method,
                path = %path,
                route_pattern = %entry.pattern.raw(),
                duration_us = duration.as_micros(),
                "Slow route matching detected"
            );
        } else {
            info!(
                method = %method,
                path = %path,
                route_pattern = %entry.pattern.raw(),
                handler = %entry.handler,
                path_params = ?params,
                duration_us = duration.as_micros(),
                "Route matched"
            );
        }

        Some(RouteMatch { entry, params })
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("routes", &self.route_summaries())
            .field("error_statuses", &self.errors.keys().collect::<Vec<_>>())
            .finish()
    }
}
