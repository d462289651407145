use serde_json::json;
use tracing::warn;

use super::{Middleware, MiddlewareChain};
use crate::dispatcher::{Request, Response};

/// Static token check on the `authorization` header.
///
/// Accepts the bare token or `Bearer <token>`. Anything else is answered
/// with a 401 without running the rest of the chain.
pub struct AuthMiddleware {
    token: String,
}

impl AuthMiddleware {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    fn accepts(&self, header: &str) -> bool {
        let presented = header.strip_prefix("Bearer ").unwrap_or(header);
        presented == self.token
    }
}

impl Middleware for AuthMiddleware {
    fn process(
        &self,
        request: Request,
        chain: &mut MiddlewareChain<'_>,
    ) -> anyhow::Result<Response> {
        match request.get_header("authorization") {
            Some(h) if self.accepts(h) => chain.handle(request),
            presented => {
                warn!(
                    method = %request.method,
                    path = %request.path,
                    header_present = presented.is_some(),
                    "Authorization rejected"
                );
                Ok(Response::json(401, json!({ "error": "Unauthorized" })))
            }
        }
    }

    fn name(&self) -> &str {
        "auth"
    }
}
