//! # Router Module
//!
//! Path-pattern compilation, the route table and parameter extraction.
//!
//! ## Overview
//!
//! The router is responsible for:
//! - Compiling route patterns (`/users/:id`, `/files/*`, `/doc(.:format)`)
//!   into anchored regular expressions, once, at registration time
//! - Storing routes per verb in registration order, plus error handlers
//!   keyed by status
//! - Matching a verb and path against the table (first match wins)
//! - Extracting named and wildcard parameters from the winning match
//!
//! ## Example
//!
//! ```rust
//! use quest_router::dispatcher::{HandlerDescriptor, Response};
//! use quest_router::router::Router;
//! use http::Method;
//!
//! let mut router = Router::new();
//! router.get(
//!     "/users/:id",
//!     HandlerDescriptor::direct(|_req, info| {
//!         Ok(Response::text(200, info.params().get("id").unwrap_or_default()))
//!     }),
//! );
//!
//! let found = router.route(&Method::GET, "/users/42").unwrap();
//! assert_eq!(found.params.get("id"), Some("42"));
//! // HEAD is served by GET routes
//! assert!(router.route(&Method::HEAD, "/users/42").is_some());
//! ```
//!
//! ## Matching
//!
//! There is no specificity ranking: for a given verb the routes are tried in
//! the order they were added and the first expression that matches the whole
//! path wins. Register specific routes before catch-alls.

mod core;
mod info;
mod params;
mod pattern;
#[cfg(test)]
mod tests;

pub use core::{RouteEntry, RouteMatch, Router, DEFAULT_SLOW_MATCH, SUPPORTED_METHODS};
pub use info::RouteInfo;
pub use params::{ParamValue, ParameterSet};
pub use pattern::{CompiledPattern, ParamName, PatternCompiler, EXPRESSION_SIZE_LIMIT, WILDCARD};
