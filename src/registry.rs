//! # Registry Module
//!
//! Named factories for deferred handlers and named middleware.
//!
//! Route tables refer to controllers by type id (`users#show`) and to
//! middleware by name (`auth`). The registry is where those names become
//! values: controllers are constructed fresh for every invocation,
//! middleware whenever a chain reaches them. Construction may fail and
//! every failure surfaces as [`DispatchError::Construction`].
//!
//! ```rust
//! use std::sync::Arc;
//! use quest_router::dispatcher::{Controller, Request, Response};
//! use quest_router::middleware::TracingMiddleware;
//! use quest_router::registry::Registry;
//! use quest_router::router::RouteInfo;
//!
//! struct Pages;
//!
//! impl Controller for Pages {
//!     fn call(&mut self, method: &str, _req: &Request, _info: &RouteInfo)
//!         -> Option<anyhow::Result<Response>>
//!     {
//!         match method {
//!             "home" => Some(Ok(Response::text(200, "home"))),
//!             _ => None,
//!         }
//!     }
//! }
//!
//! let mut registry = Registry::new();
//! registry.register_controller("pages", || Ok(Box::new(Pages)));
//! registry.register_middleware("tracing", || Ok(Arc::new(TracingMiddleware)));
//! assert!(registry.construct_controller("pages").is_ok());
//! assert!(registry.construct_controller("missing").is_err());
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use anyhow::anyhow;
use tracing::{debug, error};

use crate::dispatcher::Controller;
use crate::error::DispatchError;
use crate::middleware::Middleware;

/// Builds a controller for one invocation.
pub type ControllerFactory = dyn Fn() -> anyhow::Result<Box<dyn Controller>> + Send + Sync;

/// Builds (or hands out a shared) middleware.
pub type MiddlewareFactory = dyn Fn() -> anyhow::Result<Arc<dyn Middleware>> + Send + Sync;

#[derive(Clone, Default)]
pub struct Registry {
    controllers: HashMap<String, Arc<ControllerFactory>>,
    middleware: HashMap<String, Arc<MiddlewareFactory>>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the factory for controller `type_id`, replacing any
    /// previous one.
    pub fn register_controller<F>(&mut self, type_id: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn() -> anyhow::Result<Box<dyn Controller>> + Send + Sync + 'static,
    {
        let type_id = type_id.into();
        debug!(type_id = %type_id, "Controller factory registered");
        self.controllers.insert(type_id, Arc::new(factory));
        self
    }

    /// Register the factory for middleware `name`, replacing any previous
    /// one.
    pub fn register_middleware<F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn() -> anyhow::Result<Arc<dyn Middleware>> + Send + Sync + 'static,
    {
        let name = name.into();
        debug!(middleware = %name, "Middleware factory registered");
        self.middleware.insert(name, Arc::new(factory));
        self
    }

    /// Register a single shared middleware instance under `name`.
    pub fn register_shared_middleware(
        &mut self,
        name: impl Into<String>,
        middleware: Arc<dyn Middleware>,
    ) -> &mut Self {
        self.register_middleware(name, move || Ok(Arc::clone(&middleware)))
    }

    pub fn construct_controller(
        &self,
        type_id: &str,
    ) -> Result<Box<dyn Controller>, DispatchError> {
        let factory = self.controllers.get(type_id).ok_or_else(|| {
            DispatchError::construction(type_id, anyhow!("no controller registered as `{type_id}`"))
        })?;
        factory().map_err(|source| {
            error!(type_id = %type_id, error = %source, "Controller construction failed");
            DispatchError::construction(type_id, source)
        })
    }

    pub fn construct_middleware(&self, name: &str) -> Result<Arc<dyn Middleware>, DispatchError> {
        let factory = self.middleware.get(name).ok_or_else(|| {
            DispatchError::construction(name, anyhow!("no middleware registered as `{name}`"))
        })?;
        factory().map_err(|source| {
            error!(middleware = %name, error = %source, "Middleware construction failed");
            DispatchError::construction(name, source)
        })
    }

    #[must_use]
    pub fn has_controller(&self, type_id: &str) -> bool {
        self.controllers.contains_key(type_id)
    }

    #[must_use]
    pub fn has_middleware(&self, name: &str) -> bool {
        self.middleware.contains_key(name)
    }

    /// Registered controller type ids, sorted.
    #[must_use]
    pub fn controller_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.controllers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Registered middleware names, sorted.
    #[must_use]
    pub fn middleware_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.middleware.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("controllers", &self.controller_names())
            .field("middleware", &self.middleware_names())
            .finish()
    }
}
