//! Route table, global middleware list and route lookup.

use log::debug;

use crate::parser::{Method, Request};
use crate::server::handler::{Middleware, MiddlewareScope, Route, Stage};

/// Routes and global middleware, in registration order.
///
/// A router is filled in completely before the server starts and is only read afterwards.
#[derive(Debug, Default, Clone)]
pub struct Router {
    routes: Vec<Route>,
    middleware: Vec<Middleware>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a prepared route.
    pub fn route(&mut self, route: Route) -> &mut Route {
        self.routes.push(route);
        let last = self.routes.len() - 1;
        &mut self.routes[last]
    }

    /// Register several prepared routes as they are.
    pub fn routes(&mut self, routes: impl IntoIterator<Item = Route>) {
        self.routes.extend(routes);
    }

    /// Register a handler for `method` and `path`.
    ///
    /// The returned route can be given hooks:
    ///
    /// ```
    /// use yinzer_http::{stage, Router};
    ///
    /// let mut router = Router::new();
    /// router
    ///     .get("/status", stage(|_ctx| Box::pin(async { Ok(Some(serde_json::json!("up"))) })))
    ///     .after_handler = Some(stage(|ctx| Box::pin(async move {
    ///         ctx.response.set_header("X-Checked", "yes");
    ///         Ok(None)
    ///     })));
    /// ```
    pub fn add_route(&mut self, method: Method, path: impl Into<String>, handler: Stage) -> &mut Route {
        self.route(Route::new(method, path, handler))
    }

    pub fn get(&mut self, path: impl Into<String>, handler: Stage) -> &mut Route {
        self.add_route(Method::GET, path, handler)
    }

    pub fn post(&mut self, path: impl Into<String>, handler: Stage) -> &mut Route {
        self.add_route(Method::POST, path, handler)
    }

    pub fn put(&mut self, path: impl Into<String>, handler: Stage) -> &mut Route {
        self.add_route(Method::PUT, path, handler)
    }

    pub fn patch(&mut self, path: impl Into<String>, handler: Stage) -> &mut Route {
        self.add_route(Method::PATCH, path, handler)
    }

    pub fn delete(&mut self, path: impl Into<String>, handler: Stage) -> &mut Route {
        self.add_route(Method::DELETE, path, handler)
    }

    pub fn head(&mut self, path: impl Into<String>, handler: Stage) -> &mut Route {
        self.add_route(Method::HEAD, path, handler)
    }

    pub fn options(&mut self, path: impl Into<String>, handler: Stage) -> &mut Route {
        self.add_route(Method::OPTIONS, path, handler)
    }

    /// Register `routes` under `prefix`, sharing an optional gate that runs before each
    /// route's own hooks.
    pub fn group(
        &mut self,
        prefix: &str,
        routes: impl IntoIterator<Item = Route>,
        before_group: Option<Stage>,
    ) {
        for mut route in routes {
            route.path = format!("{prefix}{}", route.path);
            route.before_group = before_group.clone();
            self.routes.push(route);
        }
    }

    /// Register a global middleware. Middleware runs in registration order.
    pub fn before_all(&mut self, handler: Stage, scope: MiddlewareScope) {
        self.middleware.push(Middleware { scope, handler });
    }

    pub fn registered_routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn middleware(&self) -> &[Middleware] {
        &self.middleware
    }

    /// Find the route for `request`.
    ///
    /// An exact (path, method) match wins; otherwise the first route, in registration
    /// order, whose pattern fits the path segment by segment, whatever its method.
    /// `None` means 404.
    pub fn find(&self, request: &Request) -> Option<&Route> {
        let path = request.route_path();

        let exact = self
            .routes
            .iter()
            .find(|route| route.method == request.method && route.path == path);
        if exact.is_some() {
            return exact;
        }

        let parameterized = self
            .routes
            .iter()
            .find(|route| route.matches_pattern(path));
        if parameterized.is_none() {
            debug!("No route for {} {path}", request.method);
        }
        parameterized
    }
}
