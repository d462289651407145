#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use quest_router::dispatcher::{HandlerDescriptor, Request, Response};
use quest_router::middleware::{Middleware, MiddlewareChain};
use quest_router::DispatchError;

/// Handler answering 200 with a fixed text body.
pub fn text(body: &'static str) -> HandlerDescriptor {
    HandlerDescriptor::direct(move |_req, _info| Ok(Response::text(200, body)))
}

/// Handler answering 200 with the extracted parameters as JSON.
pub fn params_json() -> HandlerDescriptor {
    HandlerDescriptor::direct(|_req, info| {
        Ok(Response::json(200, serde_json::to_value(info.params())?))
    })
}

/// Shared log of the steps a request went through.
#[derive(Clone, Default)]
pub struct Trail(Arc<Mutex<Vec<String>>>);

impl Trail {
    pub fn push(&self, step: impl Into<String>) {
        self.0.lock().unwrap().push(step.into());
    }

    pub fn steps(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    /// Handler that records `name` and answers 200 with `name` as body.
    pub fn handler(&self, name: &'static str) -> HandlerDescriptor {
        let trail = self.clone();
        HandlerDescriptor::direct(move |_req, _info| {
            trail.push(name);
            Ok(Response::text(200, name))
        })
    }
}

/// Middleware that records itself on the way in and out, and optionally
/// answers without continuing.
pub struct Recorder {
    pub name: &'static str,
    pub trail: Trail,
    pub short_circuit: Option<u16>,
}

impl Recorder {
    pub fn new(name: &'static str, trail: &Trail) -> Self {
        Self {
            name,
            trail: trail.clone(),
            short_circuit: None,
        }
    }

    pub fn halting(name: &'static str, trail: &Trail, status: u16) -> Self {
        Self {
            short_circuit: Some(status),
            ..Self::new(name, trail)
        }
    }
}

impl Middleware for Recorder {
    fn process(
        &self,
        request: Request,
        chain: &mut MiddlewareChain<'_>,
    ) -> anyhow::Result<Response> {
        self.trail.push(format!("{}:in", self.name));
        if let Some(status) = self.short_circuit {
            return Ok(Response::text(status, self.name));
        }
        let result = chain.handle(request);
        let outcome = match &result {
            Ok(res) => res.status.to_string(),
            Err(err) => match err.downcast_ref::<DispatchError>() {
                Some(fault) => format!("err {}", fault.status()),
                None => "err".to_string(),
            },
        };
        self.trail.push(format!("{}:out {outcome}", self.name));
        result
    }

    fn name(&self) -> &str {
        self.name
    }
}
