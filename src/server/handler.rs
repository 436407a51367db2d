//! Request context, pipeline callbacks and route definitions.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::Value;

use crate::parser::{Method, Request};
use crate::server::error::Error;
use crate::server::response::Response;

/// A boxed future borrowing from the request context.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// What a pipeline stage produces: an optional body, or a failure.
///
/// `Ok(None)` (or an empty value, see [`is_empty_result`]) lets the pipeline continue.
pub type StageResult = Result<Option<Value>, Error>;

/// A middleware, hook or handler.
///
/// Every stage returns a future, so synchronous callbacks just wrap their result in
/// `Box::pin(async move { ... })`.
pub type Stage = Arc<dyn for<'a> Fn(&'a mut Context) -> BoxFuture<'a, StageResult> + Send + Sync>;

/// Turns a failure into a response body. Sets the status on the context itself.
pub type ErrorHandler = Arc<dyn for<'a> Fn(&'a mut Context, &'a Error) -> BoxFuture<'a, Value> + Send + Sync>;

/// Wrap a closure as a [`Stage`].
pub fn stage<F>(f: F) -> Stage
where
    F: for<'a> Fn(&'a mut Context) -> BoxFuture<'a, StageResult> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Whether a stage result counts as "nothing returned".
///
/// `null`, `false`, `0` and `""` are empty; objects and arrays never are, even when they
/// have no entries.
pub fn is_empty_result(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// The request and the response being built for it.
#[derive(Debug)]
pub struct Context {
    pub request: Request,
    pub response: Response,
}

impl Context {
    /// Pair `request` with a fresh default response.
    pub fn new(request: Request) -> Self {
        let response = Response::new(&request);
        Self { request, response }
    }

    /// Throw away every change made to the response so far.
    pub fn reset_response(&mut self) {
        self.response = Response::new(&self.request);
    }
}

/// A route: a path pattern and method bound to a handler and optional hooks.
#[derive(Clone)]
pub struct Route {
    /// The path pattern; `:name` segments capture one path segment.
    pub path: String,
    /// The HTTP method to match.
    pub method: Method,
    /// The handler function.
    pub handler: Stage,
    /// Runs before the handler; a non-empty result replaces the handler.
    pub before_handler: Option<Stage>,
    /// Runs after the handler; its result is ignored.
    pub after_handler: Option<Stage>,
    /// Gate shared by every route of a group.
    pub before_group: Option<Stage>,
}

impl Route {
    pub fn new(method: Method, path: impl Into<String>, handler: Stage) -> Self {
        Self {
            path: path.into(),
            method,
            handler,
            before_handler: None,
            after_handler: None,
            before_group: None,
        }
    }

    pub fn get(path: impl Into<String>, handler: Stage) -> Self {
        Self::new(Method::GET, path, handler)
    }

    pub fn post(path: impl Into<String>, handler: Stage) -> Self {
        Self::new(Method::POST, path, handler)
    }

    pub fn put(path: impl Into<String>, handler: Stage) -> Self {
        Self::new(Method::PUT, path, handler)
    }

    pub fn patch(path: impl Into<String>, handler: Stage) -> Self {
        Self::new(Method::PATCH, path, handler)
    }

    pub fn delete(path: impl Into<String>, handler: Stage) -> Self {
        Self::new(Method::DELETE, path, handler)
    }

    pub fn head(path: impl Into<String>, handler: Stage) -> Self {
        Self::new(Method::HEAD, path, handler)
    }

    pub fn options(path: impl Into<String>, handler: Stage) -> Self {
        Self::new(Method::OPTIONS, path, handler)
    }

    /// Attach a hook that runs before the handler.
    pub fn with_before_handler(mut self, hook: Stage) -> Self {
        self.before_handler = Some(hook);
        self
    }

    /// Attach a hook that runs after the handler.
    pub fn with_after_handler(mut self, hook: Stage) -> Self {
        self.after_handler = Some(hook);
        self
    }

    /// Whether `path` (without query string) fits this route's pattern segment by segment.
    pub fn matches_pattern(&self, path: &str) -> bool {
        let pattern: Vec<&str> = self.path.split('/').collect();
        let segments: Vec<&str> = path.split('/').collect();

        pattern.len() == segments.len()
            && pattern
                .iter()
                .zip(&segments)
                .all(|(expected, actual)| expected.starts_with(':') || expected == actual)
    }
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("path", &self.path)
            .field("method", &self.method)
            .field("before_handler", &self.before_handler.is_some())
            .field("after_handler", &self.after_handler.is_some())
            .field("before_group", &self.before_group.is_some())
            .finish()
    }
}

/// Which routes a global middleware applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MiddlewareScope {
    /// Only the listed route paths.
    Include(Vec<String>),
    /// Every route path except the listed ones.
    AllExcept(Vec<String>),
}

impl MiddlewareScope {
    /// Apply to every route.
    pub fn all() -> Self {
        MiddlewareScope::AllExcept(Vec::new())
    }

    pub fn include<S: Into<String>>(paths: impl IntoIterator<Item = S>) -> Self {
        MiddlewareScope::Include(paths.into_iter().map(Into::into).collect())
    }

    pub fn all_except<S: Into<String>>(paths: impl IntoIterator<Item = S>) -> Self {
        MiddlewareScope::AllExcept(paths.into_iter().map(Into::into).collect())
    }

    /// Whether a middleware with this scope runs for the route registered at `path`.
    pub fn applies_to(&self, path: &str) -> bool {
        match self {
            MiddlewareScope::Include(paths) => paths.iter().any(|p| p == path),
            MiddlewareScope::AllExcept(excluded) => !excluded.iter().any(|p| p == path),
        }
    }
}

/// A global middleware entry.
#[derive(Clone)]
pub struct Middleware {
    pub scope: MiddlewareScope,
    pub handler: Stage,
}

impl std::fmt::Debug for Middleware {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Middleware").field("scope", &self.scope).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn noop() -> Stage {
        stage(|_ctx| Box::pin(async { Ok(None) }))
    }

    #[test]
    fn test_empty_results() {
        assert!(is_empty_result(&Value::Null));
        assert!(is_empty_result(&json!(false)));
        assert!(is_empty_result(&json!(0)));
        assert!(is_empty_result(&json!("")));
        assert!(!is_empty_result(&json!({})));
        assert!(!is_empty_result(&json!([])));
        assert!(!is_empty_result(&json!("Unauthorized")));
        assert!(!is_empty_result(&json!(true)));
        assert!(!is_empty_result(&json!(-1)));
    }

    #[test]
    fn test_pattern_matching() {
        let route = Route::get("/users/:id/post/:post", noop());
        assert!(route.matches_pattern("/users/1/post/3"));
        assert!(!route.matches_pattern("/users/1/post"));
        assert!(!route.matches_pattern("/users/1/comment/3"));
        assert!(!route.matches_pattern("/users/1/post/3/extra"));

        let route = Route::get("/status", noop());
        assert!(route.matches_pattern("/status"));
        assert!(!route.matches_pattern("/statuses"));
    }

    #[test]
    fn test_middleware_scope() {
        let scope = MiddlewareScope::all_except(["/auth/login", "/status"]);
        assert!(!scope.applies_to("/status"));
        assert!(scope.applies_to("/users"));

        let scope = MiddlewareScope::include(["/admin"]);
        assert!(scope.applies_to("/admin"));
        assert!(!scope.applies_to("/users"));

        assert!(MiddlewareScope::all().applies_to("/anything"));
    }

    #[test]
    fn test_route_builders() {
        let route = Route::post("/register", noop())
            .with_before_handler(noop())
            .with_after_handler(noop());
        assert_eq!(route.method, Method::POST);
        assert_eq!(route.path, "/register");
        assert!(route.before_handler.is_some());
        assert!(route.after_handler.is_some());
        assert!(route.before_group.is_none());

        assert_eq!(Route::head("/status", noop()).method, Method::HEAD);
        assert_eq!(Route::options("/status", noop()).method, Method::OPTIONS);
    }
}
