use tracing::{info_span, Span};

use super::{Middleware, MiddlewareChain};
use crate::dispatcher::{Request, Response};

/// Opens a `request` span around the rest of the chain and records the
/// outcome on it.
pub struct TracingMiddleware;

impl Middleware for TracingMiddleware {
    fn process(
        &self,
        request: Request,
        chain: &mut MiddlewareChain<'_>,
    ) -> anyhow::Result<Response> {
        let span = info_span!(
            "request",
            method = %request.method,
            path = %request.path,
            status = tracing::field::Empty,
            error = tracing::field::Empty,
        );
        let _guard = span.enter();
        let result = chain.handle(request);
        record_outcome(&span, &result);
        result
    }

    fn name(&self) -> &str {
        "tracing"
    }
}

fn record_outcome(span: &Span, result: &anyhow::Result<Response>) {
    match result {
        Ok(response) => {
            span.record("status", response.status);
        }
        Err(err) => {
            span.record("error", tracing::field::display(err));
        }
    }
}
