//! # Dispatcher Module
//!
//! Resolves a request against the route table and runs the matched handler
//! inside its middleware chain.
//!
//! ## Overview
//!
//! The dispatcher:
//! - Looks up the verb and path in the [`Router`](crate::router::Router)
//!   and turns a miss into NotFound (GET/HEAD) or MethodNotAllowed
//! - Builds a [`RouteInfo`](crate::router::RouteInfo) from the match
//! - Runs global middleware around the dispatch and route middleware around
//!   the handler
//! - Resolves deferred handlers through the [`Registry`](crate::registry::Registry),
//!   constructing a fresh controller per invocation
//! - Rejects responses whose status is not a valid HTTP status
//!
//! ## Handlers
//!
//! ```rust
//! use quest_router::dispatcher::{Dispatcher, HandlerDescriptor, Request, Response};
//! use quest_router::registry::Registry;
//! use quest_router::router::Router;
//! use http::Method;
//!
//! let mut router = Router::new();
//! router.get("/hello/:name", HandlerDescriptor::direct(|_req, info| {
//!     let name = info.params().get("name").unwrap_or("world");
//!     Ok(Response::text(200, format!("hello {name}")))
//! }));
//!
//! let dispatcher = Dispatcher::new(router, Registry::new());
//! let response = dispatcher.handle(Request::new(Method::GET, "/hello/ada")).unwrap();
//! assert_eq!(response.body_text(), "hello ada");
//! ```
//!
//! ## Error Handling
//!
//! [`Dispatcher::handle`] returns a typed [`DispatchError`](crate::error::DispatchError);
//! turning it into a response is the job of
//! [`AppService`](crate::service::AppService), which calls
//! [`Dispatcher::resolve_error`].

mod core;
mod handler;

pub use core::{Dispatcher, HeaderVec, Request, Response, MAX_INLINE_HEADERS};
pub use handler::{Controller, HandlerDescriptor, HandlerFn, DEFAULT_HANDLER_METHOD};
