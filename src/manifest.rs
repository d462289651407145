//! # Manifest Module
//!
//! Declarative route tables loaded from YAML, TOML or JSON.
//!
//! ```yaml
//! middleware: [tracing]          # global, by registry name
//! routes:
//!   - method: GET
//!     path: /users/:id
//!     handler: users#show        # type_id#method, method optional
//!     middleware: [auth]
//! errors:
//!   404: pages#not_found
//! ```
//!
//! Handlers are always deferred: the manifest names controller types, and
//! a [`Registry`](crate::registry::Registry) supplies the factories. Every
//! verb, handler reference and status is checked when the manifest is
//! loaded, so [`RouteManifest::build_router`] only fails on manifests built
//! by hand.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;

use anyhow::{anyhow, bail, Context};
use http::Method;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::dispatcher::{HandlerDescriptor, Response};
use crate::middleware::MiddlewareRef;
use crate::router::{Router, SUPPORTED_METHODS};

/// One route line of a manifest.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RouteSpec {
    pub method: String,
    pub path: String,
    pub handler: String,
    #[serde(default)]
    pub middleware: Vec<String>,
}

/// Error-handler key. YAML and JSON manifests may write `404` as a number,
/// TOML table keys are always strings.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(untagged)]
pub enum StatusKey {
    Code(u16),
    Text(String),
}

impl StatusKey {
    fn status(&self) -> anyhow::Result<u16> {
        let status = match self {
            StatusKey::Code(code) => *code,
            StatusKey::Text(text) => text
                .trim()
                .parse()
                .map_err(|_| anyhow!("error status `{text}` is not a number"))?,
        };
        if !Response::is_valid_status(status) {
            bail!("status {status} is not a valid HTTP status");
        }
        Ok(status)
    }
}

impl fmt::Display for StatusKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusKey::Code(code) => write!(f, "{code}"),
            StatusKey::Text(text) => f.write_str(text),
        }
    }
}

/// A route table as written in a manifest file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RouteManifest {
    /// Global middleware names, outermost first
    #[serde(default)]
    pub middleware: Vec<String>,
    #[serde(default)]
    pub routes: Vec<RouteSpec>,
    /// Error handler reference per status
    #[serde(default)]
    pub errors: BTreeMap<StatusKey, String>,
}

impl RouteManifest {
    /// Load a manifest, choosing the format by file extension
    /// (`.yaml`/`.yml`, `.toml` or `.json`).
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest: {}", path.display()))?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        let manifest = match extension.as_str() {
            "yaml" | "yml" => Self::from_yaml_str(&content),
            "toml" => Self::from_toml_str(&content),
            "json" => Self::from_json_str(&content),
            other => bail!(
                "Unsupported route manifest extension `{other}` (expected yaml, toml or json)"
            ),
        }
        .with_context(|| format!("Invalid route manifest: {}", path.display()))?;

        info!(
            manifest = %path.display(),
            routes = manifest.routes.len(),
            error_handlers = manifest.errors.len(),
            global_middleware = manifest.middleware.len(),
            "Route manifest loaded"
        );
        Ok(manifest)
    }

    pub fn from_yaml_str(content: &str) -> anyhow::Result<Self> {
        let manifest: Self =
            serde_yaml::from_str(content).context("Failed to parse YAML manifest")?;
        manifest.validate()?;
        Ok(manifest)
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let manifest: Self = toml::from_str(content).context("Failed to parse TOML manifest")?;
        manifest.validate()?;
        Ok(manifest)
    }

    pub fn from_json_str(content: &str) -> anyhow::Result<Self> {
        let manifest: Self =
            serde_json::from_str(content).context("Failed to parse JSON manifest")?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Check every verb, handler reference and error status.
    pub fn validate(&self) -> anyhow::Result<()> {
        for (idx, route) in self.routes.iter().enumerate() {
            parse_method(&route.method).with_context(|| format!("route #{idx} ({})", route.path))?;
            HandlerDescriptor::parse(&route.handler)
                .with_context(|| format!("route #{idx} ({})", route.path))?;
        }
        for (key, handler) in &self.errors {
            key.status()?;
            HandlerDescriptor::parse(handler).with_context(|| format!("error handler for {key}"))?;
        }
        Ok(())
    }

    /// Build the route table in manifest order.
    pub fn build_router(&self) -> anyhow::Result<Router> {
        let mut router = Router::new();
        for route in &self.routes {
            let method = parse_method(&route.method)?;
            let handler = HandlerDescriptor::parse(&route.handler)?;
            let middleware = route
                .middleware
                .iter()
                .map(|name| MiddlewareRef::from(name.as_str()))
                .collect();
            router.add_with_middleware(method, &route.path, handler, middleware);
        }
        for (key, handler) in &self.errors {
            router.add_error(key.status()?, HandlerDescriptor::parse(handler)?);
        }
        debug!(routes = router.len(), "Router built from manifest");
        Ok(router)
    }

    /// Global middleware, outermost first.
    #[must_use]
    pub fn global_middleware(&self) -> Vec<MiddlewareRef> {
        self.middleware
            .iter()
            .map(|name| MiddlewareRef::from(name.as_str()))
            .collect()
    }

    /// Controller type ids referenced by routes and error handlers.
    #[must_use]
    pub fn handler_types(&self) -> BTreeSet<String> {
        self.routes
            .iter()
            .map(|r| r.handler.as_str())
            .chain(self.errors.values().map(String::as_str))
            .filter_map(|reference| match HandlerDescriptor::parse(reference) {
                Ok(HandlerDescriptor::Deferred { type_id, .. }) => Some(type_id),
                _ => None,
            })
            .collect()
    }

    /// Middleware names referenced globally or by any route.
    #[must_use]
    pub fn middleware_names(&self) -> BTreeSet<&str> {
        self.middleware
            .iter()
            .chain(self.routes.iter().flat_map(|r| r.middleware.iter()))
            .map(String::as_str)
            .collect()
    }
}

/// Parse a manifest verb. Only the verbs the router knows by name are
/// accepted.
pub fn parse_method(method: &str) -> anyhow::Result<Method> {
    let upper = method.trim().to_ascii_uppercase();
    SUPPORTED_METHODS
        .iter()
        .find(|m| m.as_str() == upper)
        .cloned()
        .ok_or_else(|| anyhow!("unknown HTTP method `{method}`"))
}
