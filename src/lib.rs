//! # quest-router
//!
//! **quest-router** is a request-routing and dispatch engine: given an HTTP
//! verb and a path it selects a registered handler, extracts path
//! parameters, runs an ordered chain of middleware around the handler and
//! produces a response. Failures (no match, wrong verb, handler fault) are
//! answered through status-keyed error handlers.
//!
//! ## Architecture
//!
//! - **[`router`]** - pattern compilation, the per-verb route table,
//!   first-match lookup and parameter extraction
//! - **[`dispatcher`]** - request and response values, handler descriptors,
//!   and the dispatch loop
//! - **[`middleware`]** - continuation-passing middleware and the chain that
//!   runs them, plus auth, metrics and tracing middleware
//! - **[`registry`]** - factories for deferred controllers and named middleware
//! - **[`service`]** - the boundary that turns every fault into a response
//! - **[`error`]** - the fault taxonomy
//! - **[`manifest`]** - route tables declared in YAML, TOML or JSON
//! - **[`runtime_config`]** and **[`logging`]** - environment-driven settings
//!   and `tracing` subscriber setup
//! - **[`cli`]** - the `quest-router` command
//!
//! ### Request Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Host
//!     participant Service as service::AppService
//!     participant Global as global middleware
//!     participant Dispatcher as dispatcher::Dispatcher
//!     participant Router as router::Router
//!     participant Route as route middleware
//!     participant Handler
//!
//!     Host->>Service: handle(request)
//!     Service->>Global: chain.handle(request)
//!     Global->>Dispatcher: dispatch(request)
//!     Dispatcher->>Router: route(method, path)
//!     Router-->>Dispatcher: RouteMatch (entry, params)
//!     Dispatcher->>Route: chain.handle(request)
//!     Route->>Handler: invoke(request, route info)
//!     Handler-->>Route: Response
//!     Route-->>Global: Response
//!     Global-->>Service: Response or DispatchError
//!     Service->>Service: resolve_error(status, cause) on fault
//!     Service-->>Host: Response
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use http::Method;
//! use quest_router::dispatcher::{Dispatcher, HandlerDescriptor, Request, Response};
//! use quest_router::middleware::{MiddlewareRef, TracingMiddleware};
//! use quest_router::registry::Registry;
//! use quest_router::router::Router;
//! use quest_router::service::AppService;
//!
//! let mut router = Router::new();
//! router.get("/", HandlerDescriptor::direct(|_req, _info| Ok(Response::text(200, "home"))));
//! router.get(
//!     "/files/*/:name.:ext",
//!     HandlerDescriptor::direct(|_req, info| {
//!         let params = info.params();
//!         Ok(Response::text(
//!             200,
//!             format!("{:?} {:?}", params.wildcards(), params.get("ext")),
//!         ))
//!     }),
//! );
//!
//! let mut dispatcher = Dispatcher::new(router, Registry::new());
//! dispatcher.add_middleware(MiddlewareRef::instance(TracingMiddleware));
//! let service = AppService::new(dispatcher);
//!
//! let res = service.handle(Request::new(Method::GET, "/files/a/b/report.pdf"));
//! assert_eq!(res.body_text(), r#"["a/b"] Some("pdf")"#);
//!
//! let res = service.handle(Request::new(Method::POST, "/"));
//! assert_eq!(res.status, 405);
//! assert_eq!(res.body_text(), "405 Method Not Allowed");
//! ```
//!
//! ## Matching rules
//!
//! - Routes are tried in registration order per verb; the first match wins.
//! - HEAD requests are served by GET routes.
//! - A miss is 404 for GET and HEAD, 405 for every other verb.
//! - Parameter names are case-insensitive; a repeated name collects a list.

pub mod cli;
pub mod dispatcher;
mod echo;
pub mod error;
pub mod logging;
pub mod manifest;
pub mod middleware;
pub mod registry;
pub mod router;
pub mod runtime_config;
pub mod service;

pub use dispatcher::{Dispatcher, HandlerDescriptor, Request, Response};
pub use echo::{register_echo, EchoController};
pub use error::{DispatchError, HttpError};
pub use router::Router;
pub use service::AppService;
