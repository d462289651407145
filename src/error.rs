//! # Error Module
//!
//! Typed faults produced while resolving and dispatching a request.
//!
//! Two families of fault exist and they must never be confused:
//!
//! - **Status faults** map onto an HTTP status and are resolved through the
//!   registered error handlers: [`DispatchError::NotFound`] (404),
//!   [`DispatchError::MethodNotAllowed`] (405), [`DispatchError::Http`] (any
//!   status raised on purpose by a handler or middleware) and
//!   [`DispatchError::Application`] (500).
//! - **Contract breaches** mean the router was handed something it cannot
//!   work with: [`DispatchError::ContractViolation`] and
//!   [`DispatchError::Construction`]. The boundary still answers with a 500,
//!   but these are logged separately and [`DispatchError::is_contract_breach`]
//!   lets tests tell them apart from ordinary application errors.
//!
//! Handlers and middleware return `anyhow::Result`, so every variant can
//! travel through user code with `?` and be recovered with
//! [`DispatchError::from_anyhow`].

use std::fmt;

use http::{Method, StatusCode};

/// A fault raised during matching, resolution or execution of a request.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// No route matched a GET or HEAD request.
    #[error("no route matches {method} {path}")]
    NotFound { method: Method, path: String },

    /// No route matched a request with any other verb.
    #[error("no {method} route matches {path}")]
    MethodNotAllowed { method: Method, path: String },

    /// A handler returned something that is not a valid response.
    #[error("handler `{handler}` returned an invalid response (status {status})")]
    ContractViolation { handler: String, status: u16 },

    /// A deferred handler or named middleware could not be constructed.
    #[error("failed to construct `{target}`: {source}")]
    Construction {
        target: String,
        #[source]
        source: anyhow::Error,
    },

    /// A handler or middleware halted with an explicit status.
    #[error(transparent)]
    Http(#[from] HttpError),

    /// Any other fault raised by user code.
    #[error("application fault: {0}")]
    Application(anyhow::Error),
}

impl DispatchError {
    /// The status this fault resolves to at the boundary.
    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            DispatchError::NotFound { .. } => 404,
            DispatchError::MethodNotAllowed { .. } => 405,
            DispatchError::Http(err) => err.status(),
            DispatchError::ContractViolation { .. }
            | DispatchError::Construction { .. }
            | DispatchError::Application(_) => 500,
        }
    }

    /// True for faults that mean the framework contract was broken rather
    /// than the application failing.
    #[must_use]
    pub fn is_contract_breach(&self) -> bool {
        matches!(
            self,
            DispatchError::ContractViolation { .. } | DispatchError::Construction { .. }
        )
    }

    /// Recover a typed fault from an error returned by user code.
    ///
    /// Errors that already are a `DispatchError` or an [`HttpError`] keep
    /// their identity; anything else becomes [`DispatchError::Application`].
    #[must_use]
    pub fn from_anyhow(err: anyhow::Error) -> Self {
        let err = match err.downcast::<DispatchError>() {
            Ok(dispatch) => return dispatch,
            Err(err) => err,
        };
        match err.downcast::<HttpError>() {
            Ok(http) => DispatchError::Http(http),
            Err(err) => DispatchError::Application(err),
        }
    }

    pub(crate) fn construction(target: impl Into<String>, source: anyhow::Error) -> Self {
        DispatchError::Construction {
            target: target.into(),
            source,
        }
    }
}

/// A request halted with an explicit HTTP status.
///
/// Return one from a handler or middleware (`Err(HttpError::forbidden().into())`)
/// to skip the rest of the chain and answer through the error handler
/// registered for that status.
#[derive(Debug)]
pub struct HttpError {
    status: u16,
    cause: Option<anyhow::Error>,
}

impl HttpError {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            cause: None,
        }
    }

    /// Attach the fault that led to this status.
    #[must_use]
    pub fn with_cause(mut self, cause: impl Into<anyhow::Error>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    pub fn bad_request() -> Self {
        Self::new(400)
    }

    pub fn unauthorized() -> Self {
        Self::new(401)
    }

    pub fn forbidden() -> Self {
        Self::new(403)
    }

    pub fn not_found() -> Self {
        Self::new(404)
    }

    pub fn method_not_allowed() -> Self {
        Self::new(405)
    }

    pub fn too_many_requests() -> Self {
        Self::new(429)
    }

    pub fn internal_server_error() -> Self {
        Self::new(500)
    }

    #[must_use]
    pub fn status(&self) -> u16 {
        self.status
    }

    #[must_use]
    pub fn cause(&self) -> Option<&anyhow::Error> {
        self.cause.as_ref()
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.status, reason_phrase(self.status))
    }
}

impl std::error::Error for HttpError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause.as_ref().map(|c| {
            let source: &(dyn std::error::Error + 'static) = c.as_ref();
            source
        })
    }
}

/// Conventional reason phrase for a status code.
#[must_use]
pub fn reason_phrase(status: u16) -> &'static str {
    StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown Status")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_the_taxonomy() {
        let nf = DispatchError::NotFound {
            method: Method::GET,
            path: "/x".into(),
        };
        let mna = DispatchError::MethodNotAllowed {
            method: Method::POST,
            path: "/x".into(),
        };
        assert_eq!(nf.status(), 404);
        assert_eq!(mna.status(), 405);
        assert!(!nf.is_contract_breach());

        let breach = DispatchError::ContractViolation {
            handler: "h".into(),
            status: 0,
        };
        assert_eq!(breach.status(), 500);
        assert!(breach.is_contract_breach());
    }

    #[test]
    fn from_anyhow_keeps_http_status() {
        let err: anyhow::Error = HttpError::forbidden().into();
        let err = DispatchError::from_anyhow(err);
        assert_eq!(err.status(), 403);
        assert!(matches!(err, DispatchError::Http(_)));
    }

    #[test]
    fn from_anyhow_keeps_dispatch_errors() {
        let err: anyhow::Error = DispatchError::construction("x", anyhow::anyhow!("boom")).into();
        assert!(DispatchError::from_anyhow(err).is_contract_breach());
    }

    #[test]
    fn from_anyhow_wraps_other_errors() {
        let err = DispatchError::from_anyhow(anyhow::anyhow!("db down"));
        assert!(matches!(err, DispatchError::Application(_)));
        assert_eq!(err.status(), 500);
    }

    #[test]
    fn reason_phrases() {
        assert_eq!(reason_phrase(404), "Not Found");
        assert_eq!(reason_phrase(405), "Method Not Allowed");
        assert_eq!(reason_phrase(599), "Unknown Status");
        let limited = HttpError::too_many_requests();
        assert_eq!(limited.to_string(), "429 Too Many Requests");
    }
}
