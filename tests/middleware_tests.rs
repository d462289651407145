use std::sync::Arc;

use http::Method;
use quest_router::dispatcher::{Dispatcher, Request, Response};
use quest_router::middleware::{
    AuthMiddleware, MetricsMiddleware, Middleware, MiddlewareChain, MiddlewareRef,
    TracingMiddleware,
};
use quest_router::registry::Registry;
use quest_router::router::Router;
use quest_router::service::AppService;
use quest_router::DispatchError;

mod common;
use common::{text, Recorder, Trail};

fn get(path: &str) -> Request {
    Request::new(Method::GET, path)
}

fn terminal(trail: &Trail) -> impl Fn(Request) -> anyhow::Result<Response> + '_ {
    move |_req| {
        trail.push("T");
        Ok(Response::text(200, "T"))
    }
}

#[test]
fn test_chain_runs_middleware_in_order() {
    let trail = Trail::default();
    let registry = Registry::new();
    let mut chain = MiddlewareChain::new(
        [
            MiddlewareRef::instance(Recorder::new("M1", &trail)),
            MiddlewareRef::instance(Recorder::new("M2", &trail)),
        ],
        &registry,
        terminal(&trail),
    );
    assert_eq!(chain.len(), 2);

    let res = chain.handle(get("/")).unwrap();
    assert_eq!(res.body_text(), "T");
    assert!(chain.is_empty());
    assert_eq!(
        trail.steps(),
        ["M1:in", "M2:in", "T", "M2:out 200", "M1:out 200"]
    );
}

#[test]
fn test_short_circuit_skips_the_rest_of_the_chain() {
    let trail = Trail::default();
    let registry = Registry::new();
    let mut chain = MiddlewareChain::new(
        [
            MiddlewareRef::instance(Recorder::halting("M1", &trail, 503)),
            MiddlewareRef::instance(Recorder::new("M2", &trail)),
        ],
        &registry,
        terminal(&trail),
    );

    let res = chain.handle(get("/")).unwrap();
    assert_eq!(res.status, 503);
    assert_eq!(trail.steps(), ["M1:in"]);
}

#[test]
fn test_empty_chain_calls_terminal_directly() {
    let trail = Trail::default();
    let registry = Registry::new();
    let mut chain = MiddlewareChain::new(Vec::new(), &registry, terminal(&trail));
    assert!(chain.is_empty());
    chain.handle(get("/")).unwrap();
    assert_eq!(trail.steps(), ["T"]);
}

/// Continues twice; the chain does not stop it.
struct Twice;

impl Middleware for Twice {
    fn process(
        &self,
        request: Request,
        chain: &mut MiddlewareChain<'_>,
    ) -> anyhow::Result<Response> {
        chain.handle(request.clone())?;
        chain.handle(request)
    }
}

#[test]
fn test_continuation_is_not_limited_to_once() {
    let trail = Trail::default();
    let registry = Registry::new();
    let twice = [MiddlewareRef::instance(Twice)];
    let mut chain = MiddlewareChain::new(twice, &registry, terminal(&trail));
    chain.handle(get("/")).unwrap();
    assert_eq!(trail.steps(), ["T", "T"]);
}

#[test]
fn test_global_middleware_wrap_route_middleware() {
    let trail = Trail::default();
    let mut router = Router::new();
    router.add_with_middleware(
        Method::GET,
        "/orders",
        trail.handler("handler"),
        vec![
            MiddlewareRef::instance(Recorder::new("route1", &trail)),
            MiddlewareRef::instance(Recorder::new("route2", &trail)),
        ],
    );
    let mut dispatcher = Dispatcher::new(router, Registry::new());
    dispatcher.add_middleware(MiddlewareRef::instance(Recorder::new("global1", &trail)));
    dispatcher.add_middleware(MiddlewareRef::instance(Recorder::new("global2", &trail)));

    dispatcher.handle(get("/orders")).unwrap();
    assert_eq!(
        trail.steps(),
        [
            "global1:in",
            "global2:in",
            "route1:in",
            "route2:in",
            "handler",
            "route2:out 200",
            "route1:out 200",
            "global2:out 200",
            "global1:out 200",
        ]
    );
}

#[test]
fn test_global_middleware_observe_misses() {
    let trail = Trail::default();
    let mut router = Router::new();
    router.get("/known", text("ok"));
    let mut dispatcher = Dispatcher::new(router, Registry::new());
    dispatcher.add_middleware(MiddlewareRef::instance(Recorder::new("global", &trail)));

    let err = dispatcher.handle(get("/unknown")).unwrap_err();
    assert!(matches!(err, DispatchError::NotFound { .. }));

    let put = Request::new(Method::PUT, "/known");
    let err = dispatcher.handle(put).unwrap_err();
    assert!(matches!(err, DispatchError::MethodNotAllowed { .. }));

    assert_eq!(
        trail.steps(),
        ["global:in", "global:out err 404", "global:in", "global:out err 405"]
    );
}

#[test]
fn test_route_middleware_short_circuit_skips_handler() {
    let trail = Trail::default();
    let mut router = Router::new();
    router.add_with_middleware(
        Method::GET,
        "/private",
        trail.handler("handler"),
        vec![MiddlewareRef::instance(Recorder::halting("gate", &trail, 403))],
    );
    let dispatcher = Dispatcher::new(router, Registry::new());

    let res = dispatcher.handle(get("/private")).unwrap();
    assert_eq!(res.status, 403);
    assert_eq!(trail.steps(), ["gate:in"]);
}

#[test]
fn test_named_middleware_resolve_through_registry() {
    let trail = Trail::default();
    let mut registry = Registry::new();
    let recorder_trail = trail.clone();
    registry.register_middleware("recorder", move || {
        Ok(Arc::new(Recorder::new("named", &recorder_trail)))
    });

    let mut router = Router::new();
    let recorder = vec!["recorder".into()];
    router.add_with_middleware(Method::GET, "/a", trail.handler("a"), recorder);
    let ghost = vec!["ghost".into()];
    router.add_with_middleware(Method::GET, "/b", trail.handler("b"), ghost);
    let dispatcher = Dispatcher::new(router, registry);

    dispatcher.handle(get("/a")).unwrap();
    assert_eq!(trail.steps(), ["named:in", "a", "named:out 200"]);

    let err = dispatcher.handle(get("/b")).unwrap_err();
    assert!(matches!(err, DispatchError::Construction { .. }));
}

#[test]
fn test_unknown_named_middleware_is_a_500_at_the_boundary() {
    let mut router = Router::new();
    router.add_with_middleware(Method::GET, "/b", text("b"), vec!["ghost".into()]);
    let service = AppService::new(Dispatcher::new(router, Registry::new()));

    let res = service.handle(get("/b"));
    assert_eq!(res.status, 500);
    assert_eq!(res.body_text(), "500 Internal Server Error");
}

#[test]
fn test_auth_middleware() {
    let mut router = Router::new();
    router.add_with_middleware(
        Method::GET,
        "/secret",
        text("classified"),
        vec![MiddlewareRef::instance(AuthMiddleware::new("s3cret"))],
    );
    let dispatcher = Dispatcher::new(router, Registry::new());

    let res = dispatcher.handle(get("/secret")).unwrap();
    assert_eq!(res.status, 401);
    assert_eq!(res.body["error"], "Unauthorized");

    let res = dispatcher
        .handle(get("/secret").with_header("Authorization", "wrong"))
        .unwrap();
    assert_eq!(res.status, 401);

    let res = dispatcher
        .handle(get("/secret").with_header("authorization", "s3cret"))
        .unwrap();
    assert_eq!(res.body_text(), "classified");

    let res = dispatcher
        .handle(get("/secret").with_header("authorization", "Bearer s3cret"))
        .unwrap();
    assert_eq!(res.status, 200);
}

#[test]
fn test_metrics_middleware_counts() {
    let metrics = Arc::new(MetricsMiddleware::new());
    let mut router = Router::new();
    router.get("/ok", text("ok"));
    let mut dispatcher = Dispatcher::new(router, Registry::new());
    let shared: Arc<dyn Middleware> = Arc::<MetricsMiddleware>::clone(&metrics);
    dispatcher.add_middleware(shared);

    dispatcher.handle(get("/ok")).unwrap();
    dispatcher.handle(get("/ok")).unwrap();
    let _ = dispatcher.handle(get("/missing"));

    assert_eq!(metrics.request_count(), 3);
    assert_eq!(metrics.error_count(), 1);
    assert_eq!(metrics.status_counts().get(&200), Some(&2));
}

#[test]
fn test_tracing_middleware_is_transparent() {
    let mut router = Router::new();
    router.get("/traced/:id", text("traced"));
    let mut dispatcher = Dispatcher::new(router, Registry::new());
    dispatcher.add_middleware(MiddlewareRef::instance(TracingMiddleware));

    let res = dispatcher.handle(get("/traced/1")).unwrap();
    assert_eq!(res.body_text(), "traced");
    assert!(dispatcher.handle(get("/elsewhere")).is_err());
    assert_eq!(TracingMiddleware.name(), "tracing");
}
