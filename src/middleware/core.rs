use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::dispatcher::{Request, Response};
use crate::registry::Registry;

/// A step wrapped around the rest of a request's chain.
///
/// Call `chain.handle(request)` to continue, or return a response (or an
/// error) without calling it to short-circuit. Nothing enforces that a
/// middleware continues at most once.
pub trait Middleware: Send + Sync {
    fn process(
        &self,
        request: Request,
        chain: &mut MiddlewareChain<'_>,
    ) -> anyhow::Result<Response>;

    /// Name used in logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// A middleware as listed on a route or on the dispatcher: either an
/// instance, or a name resolved through the [`Registry`] when the chain
/// reaches it.
#[derive(Clone)]
pub enum MiddlewareRef {
    Instance(Arc<dyn Middleware>),
    Named(String),
}

impl MiddlewareRef {
    pub fn instance<M: Middleware + 'static>(middleware: M) -> Self {
        MiddlewareRef::Instance(Arc::new(middleware))
    }

    /// Resolve to a runnable middleware. Named middleware are built by the
    /// registry; an unknown name is a construction fault.
    pub fn resolve(&self, registry: &Registry) -> anyhow::Result<Arc<dyn Middleware>> {
        match self {
            MiddlewareRef::Instance(m) => Ok(Arc::clone(m)),
            MiddlewareRef::Named(name) => Ok(registry.construct_middleware(name)?),
        }
    }
}

impl From<&str> for MiddlewareRef {
    fn from(name: &str) -> Self {
        MiddlewareRef::Named(name.to_string())
    }
}

impl From<String> for MiddlewareRef {
    fn from(name: String) -> Self {
        MiddlewareRef::Named(name)
    }
}

impl From<Arc<dyn Middleware>> for MiddlewareRef {
    fn from(middleware: Arc<dyn Middleware>) -> Self {
        MiddlewareRef::Instance(middleware)
    }
}

impl fmt::Debug for MiddlewareRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MiddlewareRef::Instance(m) => write!(f, "Instance({})", m.name()),
            MiddlewareRef::Named(name) => write!(f, "Named({name})"),
        }
    }
}

type Terminal<'a> = Box<dyn Fn(Request) -> anyhow::Result<Response> + 'a>;

/// Ordered, single-use queue of middleware ending in a terminal step.
///
/// Each call to [`MiddlewareChain::handle`] pops the head of the queue and
/// hands the request to it together with the shortened chain. Once the
/// queue is empty the terminal step runs.
pub struct MiddlewareChain<'a> {
    queue: VecDeque<MiddlewareRef>,
    registry: &'a Registry,
    terminal: Terminal<'a>,
}

impl<'a> MiddlewareChain<'a> {
    pub fn new<I, F>(middleware: I, registry: &'a Registry, terminal: F) -> Self
    where
        I: IntoIterator<Item = MiddlewareRef>,
        F: Fn(Request) -> anyhow::Result<Response> + 'a,
    {
        Self {
            queue: middleware.into_iter().collect(),
            registry,
            terminal: Box::new(terminal),
        }
    }

    /// Run the next step: the head middleware, or the terminal step when
    /// no middleware remain.
    pub fn handle(&mut self, request: Request) -> anyhow::Result<Response> {
        let Some(next) = self.queue.pop_front() else {
            return (self.terminal)(request);
        };
        let middleware = next.resolve(self.registry)?;
        debug!(
            middleware = middleware.name(),
            remaining = self.queue.len(),
            path = %request.path,
            "Middleware invoked"
        );
        middleware.process(request, self)
    }

    /// Middleware still queued.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
