//! # Service Module
//!
//! The boundary between the dispatcher and whatever hands it requests.
//!
//! [`AppService::handle`] always returns a response. Every fault coming out
//! of the dispatcher is answered through [`Dispatcher::resolve_error`] with
//! the fault's status and the fault itself as the cause:
//!
//! | Fault | Status | Logged at |
//! |---|---|---|
//! | NotFound | 404 | WARN |
//! | MethodNotAllowed | 405 | WARN |
//! | `HttpError` | its status | WARN |
//! | application error | 500 | WARN |
//! | contract violation, construction fault | 500 | ERROR, `contract_breach = true` |
//!
//! If the error handler itself fails, or answers with an invalid status, the
//! default `500 Internal Server Error` body is returned.
//!
//! The request moves into the middleware chain, so error handlers see a
//! request rebuilt from its method and path. Headers and body are not kept.

use tracing::{error, warn};

use crate::dispatcher::{Dispatcher, Request, Response};
use crate::error::DispatchError;

/// Top-level request handler wrapping a [`Dispatcher`].
#[derive(Debug, Clone)]
pub struct AppService {
    dispatcher: Dispatcher,
}

impl AppService {
    #[must_use]
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Dispatch `request` and convert any fault into a response.
    pub fn handle(&self, request: Request) -> Response {
        let method = request.method.clone();
        let path = request.path.clone();
        match self.dispatcher.handle(request) {
            Ok(response) if response.is_valid() => response,
            Ok(response) => {
                // only a middleware can get here; handlers are checked by the dispatcher
                error!(
                    method = %method,
                    path = %path,
                    status = response.status,
                    contract_breach = true,
                    "Middleware returned an invalid response"
                );
                self.fail(Request::new(method, path), 500, None)
            }
            Err(err) => {
                let status = Self::boundary_status(&err);
                if err.is_contract_breach() {
                    error!(
                        method = %method,
                        path = %path,
                        status,
                        error = %err,
                        contract_breach = true,
                        "Framework contract breached"
                    );
                } else {
                    warn!(
                        method = %method,
                        path = %path,
                        status,
                        error = %err,
                        "Request failed"
                    );
                }
                self.fail(Request::new(method, path), status, Some(err))
            }
        }
    }

    /// Status answered for `err`. A halt with an invalid status becomes 500.
    fn boundary_status(err: &DispatchError) -> u16 {
        let status = err.status();
        if Response::is_valid_status(status) {
            status
        } else {
            500
        }
    }

    fn fail(&self, request: Request, status: u16, cause: Option<DispatchError>) -> Response {
        match self.dispatcher.resolve_error(&request, status, cause) {
            Ok(response) => response,
            Err(err) => {
                error!(
                    method = %request.method,
                    path = %request.path,
                    status,
                    error = %err,
                    contract_breach = err.is_contract_breach(),
                    "Error handler failed"
                );
                Dispatcher::default_error_response(500)
            }
        }
    }
}
