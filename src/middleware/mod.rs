//! # Middleware Module
//!
//! Continuation-passing middleware and the chain that runs them.
//!
//! A middleware receives the request and the rest of the chain. It may
//! continue by calling [`MiddlewareChain::handle`], inspect or rewrite the
//! response on the way out, or answer on its own without continuing.
//!
//! ## Ordering
//!
//! For a matched request the effective order is global middleware (in the
//! order added to the dispatcher), then route middleware (in the order
//! listed on the route), then the handler. Global middleware also wrap
//! requests that match no route, so they observe NotFound and
//! MethodNotAllowed as errors from the inner chain.
//!
//! ## Bundled middleware
//!
//! - [`AuthMiddleware`] - static token check, answers 401 without continuing
//! - [`MetricsMiddleware`] - request, error and status counters plus latency
//! - [`TracingMiddleware`] - a `request` span around the rest of the chain

mod auth;
mod core;
mod metrics;
mod tracing;

pub use auth::AuthMiddleware;
pub use core::{Middleware, MiddlewareChain, MiddlewareRef};
pub use metrics::MetricsMiddleware;
pub use tracing::TracingMiddleware;
