use std::fmt;
use std::sync::Arc;

use anyhow::anyhow;

use super::core::{Request, Response};
use crate::router::RouteInfo;

/// Method invoked on a deferred handler when none is named.
pub const DEFAULT_HANDLER_METHOD: &str = "handle";

/// Signature of a directly invocable handler.
pub type HandlerFn = dyn Fn(&Request, &RouteInfo) -> anyhow::Result<Response> + Send + Sync;

/// A handler type constructed per invocation and called by method name.
///
/// Controllers are built through factories registered on a
/// [`Registry`](crate::registry::Registry); a fresh instance serves each
/// request, so `&mut self` state never leaks between requests.
pub trait Controller {
    /// Invoke `method`. Returns `None` when the controller has no such method.
    fn call(
        &mut self,
        method: &str,
        request: &Request,
        info: &RouteInfo,
    ) -> Option<anyhow::Result<Response>>;
}

/// What to run for a route or an error status.
#[derive(Clone)]
pub enum HandlerDescriptor {
    /// A closure or function, invoked as-is.
    Direct(Arc<HandlerFn>),
    /// A registered controller type plus method name, resolved per request.
    Deferred {
        type_id: String,
        /// `None` selects the dispatcher's default method.
        method: Option<String>,
    },
}

impl HandlerDescriptor {
    pub fn direct<F>(handler: F) -> Self
    where
        F: Fn(&Request, &RouteInfo) -> anyhow::Result<Response> + Send + Sync + 'static,
    {
        HandlerDescriptor::Direct(Arc::new(handler))
    }

    pub fn deferred(type_id: impl Into<String>, method: Option<&str>) -> Self {
        HandlerDescriptor::Deferred {
            type_id: type_id.into(),
            method: method.map(str::to_string),
        }
    }

    /// Parse a `type` or `type#method` reference into a deferred descriptor.
    pub fn parse(reference: &str) -> anyhow::Result<Self> {
        let (type_id, method) = match reference.split_once('#') {
            Some((type_id, method)) => (type_id.trim(), Some(method.trim())),
            None => (reference.trim(), None),
        };
        if type_id.is_empty() {
            return Err(anyhow!("handler reference `{reference}` has no type"));
        }
        if method.is_some_and(str::is_empty) {
            return Err(anyhow!("handler reference `{reference}` has no method"));
        }
        Ok(Self::deferred(type_id, method))
    }
}

impl fmt::Display for HandlerDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandlerDescriptor::Direct(_) => f.write_str("<fn>"),
            HandlerDescriptor::Deferred {
                type_id,
                method: Some(method),
            } => write!(f, "{type_id}#{method}"),
            HandlerDescriptor::Deferred {
                type_id,
                method: None,
            } => f.write_str(type_id),
        }
    }
}

impl fmt::Debug for HandlerDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandlerDescriptor::Direct(_) => f.write_str("Direct(<fn>)"),
            HandlerDescriptor::Deferred { type_id, method } => f
                .debug_struct("Deferred")
                .field("type_id", type_id)
                .field("method", method)
                .finish(),
        }
    }
}
