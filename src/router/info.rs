use std::sync::Arc;

use super::params::ParameterSet;
use crate::error::DispatchError;

/// Read-only view of the matched route handed to handlers.
///
/// For a matched route it carries the request path, the authored pattern and
/// the extracted parameters. Error handlers receive the requested path and
/// the fault that led to the error, if any.
#[derive(Debug, Clone)]
pub struct RouteInfo {
    path: String,
    pattern: Option<String>,
    params: ParameterSet,
    error: Option<Arc<DispatchError>>,
}

impl RouteInfo {
    pub fn matched(
        path: impl Into<String>,
        pattern: impl Into<String>,
        params: ParameterSet,
    ) -> Self {
        Self {
            path: path.into(),
            pattern: Some(pattern.into()),
            params,
            error: None,
        }
    }

    pub fn for_error(path: impl Into<String>, error: Option<Arc<DispatchError>>) -> Self {
        Self {
            path: path.into(),
            pattern: None,
            params: ParameterSet::default(),
            error,
        }
    }

    /// Requested path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Pattern of the matched route; `None` for error handlers.
    #[must_use]
    pub fn pattern(&self) -> Option<&str> {
        self.pattern.as_deref()
    }

    #[must_use]
    pub fn params(&self) -> &ParameterSet {
        &self.params
    }

    /// Fault being resolved; only set for error handlers.
    #[must_use]
    pub fn error(&self) -> Option<&DispatchError> {
        self.error.as_deref()
    }
}
