use serde_json::json;

use crate::dispatcher::{Controller, Request, Response};
use crate::registry::Registry;
use crate::router::RouteInfo;

/// Controller that answers every method by echoing the request back.
///
/// Used by the CLI to dispatch against a manifest without real handlers.
#[derive(Debug, Clone)]
pub struct EchoController {
    type_id: String,
}

impl EchoController {
    pub fn new(type_id: impl Into<String>) -> Self {
        Self {
            type_id: type_id.into(),
        }
    }
}

impl Controller for EchoController {
    fn call(
        &mut self,
        method: &str,
        request: &Request,
        info: &RouteInfo,
    ) -> Option<anyhow::Result<Response>> {
        let status = match info.error() {
            Some(err) => err.status(),
            None => 200,
        };
        Some(Ok(Response::json(
            status,
            json!({
                "handler": format!("{}#{method}", self.type_id),
                "method": request.method.as_str(),
                "path": info.path(),
                "pattern": info.pattern(),
                "params": info.params(),
                "error": info.error().map(ToString::to_string),
                "body": request.body,
            }),
        )))
    }
}

/// Register an [`EchoController`] under every id in `type_ids`.
pub fn register_echo<'a, I>(registry: &mut Registry, type_ids: I)
where
    I: IntoIterator<Item = &'a str>,
{
    for type_id in type_ids {
        let id = type_id.to_string();
        registry.register_controller(type_id, move || {
            Ok(Box::new(EchoController::new(id.as_str())))
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::ParameterSet;
    use http::Method;

    #[test]
    fn echoes_route_and_params() {
        let mut controller = EchoController::new("users");
        let info = RouteInfo::matched("/users/7", "/users/:id", ParameterSet::default());
        let req = Request::new(Method::GET, "/users/7");
        let res = controller.call("show", &req, &info).unwrap().unwrap();
        assert_eq!(res.status, 200);
        assert_eq!(res.body["handler"], "users#show");
        assert_eq!(res.body["pattern"], "/users/:id");
    }
}
