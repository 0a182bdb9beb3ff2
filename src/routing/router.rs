//! Fluent route declarations.
//!
//! # Responsibilities
//! - Chain guards (URL, constraints, predicates, verbs, post templates)
//! - Collect middleware for the route being declared
//! - Dispatch the first fully-guarded route to a view or controller
//! - Turn every later declaration of the request into a no-op
//!
//! # Design Decisions
//! - One `Router` per request; declarations share it through `&mut self`
//! - Guard outcomes live in a three-state `RouteState`, changed only by
//!   `RouteState::next`
//! - A failed guard never errors; the declaration just stops applying
//! - Groups share guard state with their parent; they only scope
//!   middleware and delay the namespace/verb/middleware reset

use axum::http::StatusCode;
use serde_json::Value;

use crate::config::{Config, DEFAULT_NAMESPACE};
use crate::container::Container;
use crate::http::{Request, Response};
use crate::observability::metrics;
use crate::routing::error::RoutingError;
use crate::routing::middleware::{IntoSpecs, MiddlewareQueue, MiddlewareRegistry};
use crate::routing::target::{ControllerTarget, IntoTarget};
use crate::routing::url_route::UrlRoute;
use crate::view::View;

/// Guard state of the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteState {
    /// Every guard so far has passed.
    Guarding,
    /// A guard failed; the rest of the declaration is a no-op.
    Blocked,
    /// A route dispatched; every later declaration is a no-op.
    Matched,
}

/// Inputs to [`RouteState::next`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteEvent {
    GuardFailed,
    Dispatched,
    Reset,
}

impl RouteState {
    /// The single transition function of the router.
    pub fn next(self, event: RouteEvent) -> RouteState {
        match (self, event) {
            (RouteState::Matched, _) => RouteState::Matched,
            (RouteState::Guarding, RouteEvent::Dispatched) => RouteState::Matched,
            (RouteState::Blocked, RouteEvent::Dispatched) => RouteState::Blocked,
            (_, RouteEvent::GuardFailed) => RouteState::Blocked,
            (_, RouteEvent::Reset) => RouteState::Guarding,
        }
    }
}

/// A guard condition: a plain `bool` or a closure evaluated lazily.
pub trait Condition {
    fn evaluate(self) -> bool;
}

impl Condition for bool {
    fn evaluate(self) -> bool {
        self
    }
}

impl<F: FnOnce() -> bool> Condition for F {
    fn evaluate(self) -> bool {
        self()
    }
}

/// Collaborators a router reads from and dispatches to.
#[derive(Clone, Copy)]
pub struct RouteContext<'a> {
    pub request: &'a dyn Request,
    pub response: &'a dyn Response,
    pub container: &'a dyn Container,
    pub view: &'a dyn View,
    pub config: &'a dyn Config,
    pub middleware: &'a MiddlewareRegistry,
}

/// Route declaration DSL, evaluated top to bottom once per request.
///
/// ```ignore
/// router.get().url("blog/{slug}").view("post", json!({}))?;
/// router.using("auth")?.group(|r| {
///     r.namespace("admin");
///     r.url("admin/posts").dispatch("PostController@index")?;
///     Ok(())
/// })?;
/// ```
pub struct Router<'a> {
    cx: RouteContext<'a>,
    state: RouteState,
    current_route: Option<UrlRoute>,
    is_group: bool,
    /// Allowed verbs, `None` for any.
    methods: Option<Vec<String>>,
    default_namespace: String,
    namespace: String,
    /// `{templates_directory}/views/`, stripped from view slugs.
    view_prefix: String,
    middleware_queue: Option<MiddlewareQueue<'a>>,
}

impl<'a> Router<'a> {
    pub fn new(cx: RouteContext<'a>) -> Self {
        let default_namespace = cx
            .config
            .get_str("routing.default_namespace")
            .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string());
        let templates = cx
            .config
            .get_str("theme.templates_directory")
            .unwrap_or_else(|| "templates".to_string());

        Self {
            cx,
            state: RouteState::Guarding,
            current_route: None,
            is_group: false,
            methods: None,
            namespace: default_namespace.clone(),
            default_namespace,
            view_prefix: format!("{}/views/", templates.trim_matches('/')),
            middleware_queue: None,
        }
    }

    pub fn state(&self) -> RouteState {
        self.state
    }

    /// True while the current declaration may still dispatch.
    pub fn can_proceed(&self) -> bool {
        self.state == RouteState::Guarding
    }

    /// True once any declaration of this request has dispatched.
    pub fn has_matched(&self) -> bool {
        self.state == RouteState::Matched
    }

    pub fn current_route(&self) -> Option<&UrlRoute> {
        self.current_route.as_ref()
    }

    pub fn current_namespace(&self) -> &str {
        &self.namespace
    }

    /// Run `callback` as a group of declarations.
    ///
    /// Middleware added inside the group only applies to the next
    /// dispatch attempt. When the outermost group ends, the namespace,
    /// verbs and middleware set before or inside it are cleared. A
    /// nested group just runs its callback; a blocked one is skipped and
    /// leaves the router untouched.
    pub fn group<F>(&mut self, callback: F) -> Result<&mut Self, RoutingError>
    where
        F: FnOnce(&mut Self) -> Result<(), RoutingError>,
    {
        if !self.can_proceed() {
            return Ok(self);
        }
        if self.is_group {
            callback(self)?;
            return Ok(self);
        }

        self.is_group = true;
        let result = callback(self);
        self.is_group = false;
        self.reset();
        result.map(|()| self)
    }

    /// Continue only if `condition` holds.
    pub fn when(&mut self, condition: impl Condition) -> &mut Self {
        if self.can_proceed() && !condition.evaluate() {
            self.fail("when");
        }
        self
    }

    /// Continue only if `condition` does not hold.
    pub fn not(&mut self, condition: impl Condition) -> &mut Self {
        if self.can_proceed() && condition.evaluate() {
            self.fail("not");
        }
        self
    }

    /// Continue only if the request path matches `pattern`.
    ///
    /// `{name}` segments capture the matching path segment.
    pub fn url(&mut self, pattern: &str) -> &mut Self {
        if !self.can_proceed() {
            return self;
        }

        let route = self.route_mut();
        route.add_url(pattern);
        if !route.is_match() {
            self.fail("url");
        }
        self
    }

    /// Constrain captured parameters with anchored regular expressions.
    pub fn constrain<I, K, V>(&mut self, tests: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        if !self.can_proceed() {
            return self;
        }

        let route = self.route_mut();
        route.add_tests(tests);
        if !route.is_match() {
            self.fail("constrain");
        }
        self
    }

    /// Continue only if the request resolves to a post using template `slug`.
    pub fn when_post_template(&mut self, slug: &str) -> &mut Self {
        if self.can_proceed() && !self.cx.request.is_post_template(slug) {
            self.fail("post_template");
        }
        self
    }

    pub fn get(&mut self) -> &mut Self {
        self.only("GET")
    }

    pub fn post(&mut self) -> &mut Self {
        self.only("POST")
    }

    pub fn put(&mut self) -> &mut Self {
        self.only("PUT")
    }

    pub fn patch(&mut self) -> &mut Self {
        self.only("PATCH")
    }

    pub fn delete(&mut self) -> &mut Self {
        self.only("DELETE")
    }

    /// Allow any of `verbs`; an empty list allows every verb.
    ///
    /// Checked when the declaration reaches `view` or `dispatch`.
    pub fn any<I, S>(&mut self, verbs: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let verbs: Vec<String> = verbs
            .into_iter()
            .map(|v| v.as_ref().to_ascii_uppercase())
            .collect();
        self.methods = if verbs.is_empty() { None } else { Some(verbs) };
        self
    }

    /// Namespace `Class@method` targets resolve against.
    pub fn namespace(&mut self, namespace: impl Into<String>) -> &mut Self {
        self.namespace = namespace.into();
        self
    }

    /// Require middleware, given as `name` or `name|arg1,arg2`.
    ///
    /// Fails immediately if a name is not registered.
    pub fn using(&mut self, specs: impl IntoSpecs) -> Result<&mut Self, RoutingError> {
        let registry = self.cx.middleware;
        let scoped = self.is_group;
        self.middleware_queue
            .get_or_insert_with(|| MiddlewareQueue::new(registry))
            .add(specs, scoped)?;
        Ok(self)
    }

    /// Render view `slug` if every guard passed.
    ///
    /// Returns whether this declaration dispatched.
    pub fn view(&mut self, slug: &str, data: Value) -> Result<bool, RoutingError> {
        let dispatched = self.try_match("view");
        let result = if dispatched {
            self.render_view(slug, &data)
        } else {
            Ok(())
        };

        self.reset();
        result.map(|()| dispatched)
    }

    /// Invoke a controller action if every guard passed.
    ///
    /// `target` is a `"Class@method"` string resolved against the current
    /// namespace, a fully-qualified `(class, method)` pair, or a
    /// [`ControllerTarget`]. Returns whether this declaration dispatched.
    pub fn dispatch(&mut self, target: impl IntoTarget) -> Result<bool, RoutingError> {
        let target = match target.into_target() {
            Ok(target) => target,
            Err(e) => {
                // A malformed target never matches; scoped middleware is still spent.
                if let Some(queue) = self.middleware_queue.as_mut() {
                    queue.de_scope();
                }
                self.reset();
                return Err(e);
            }
        };

        let dispatched = self.try_match("controller");
        let result = if dispatched {
            self.call_controller(&target)
        } else {
            Ok(())
        };

        self.reset();
        result.map(|()| dispatched)
    }

    /// Start the next declaration.
    ///
    /// Guard state and the current route survive only a match. Namespace,
    /// verbs and middleware survive only inside a group.
    pub fn reset(&mut self) {
        if !self.has_matched() {
            self.state = self.state.next(RouteEvent::Reset);
            self.current_route = None;
        }

        if !self.is_group {
            self.namespace = self.default_namespace.clone();
            self.methods = None;
            self.middleware_queue = None;
        }
    }

    fn route_mut(&mut self) -> &mut UrlRoute {
        let request = self.cx.request;
        self.current_route
            .get_or_insert_with(|| UrlRoute::new(request.path_segments().to_vec()))
    }

    fn only(&mut self, verb: &str) -> &mut Self {
        self.methods = Some(vec![verb.to_string()]);
        self.check_method();
        self
    }

    fn check_method(&mut self) {
        if !self.can_proceed() {
            return;
        }

        let request = self.cx.request;
        let method = request.method();
        let allowed = match &self.methods {
            Some(verbs) => verbs.iter().any(|v| v == method),
            None => true,
        };
        if !allowed {
            self.fail("method");
        }
    }

    fn maybe_run_middleware(&mut self) {
        let request = self.cx.request;
        let guarding = self.can_proceed();

        if let Some(queue) = self.middleware_queue.as_mut() {
            let rejected = guarding && !queue.passes(request);
            queue.de_scope();
            if rejected {
                self.fail("middleware");
            }
        }
    }

    /// Final checks of a terminal call; marks the request matched on success.
    fn try_match(&mut self, kind: &'static str) -> bool {
        self.check_method();
        self.maybe_run_middleware();

        if !self.can_proceed() {
            return false;
        }

        self.state = self.state.next(RouteEvent::Dispatched);
        self.cx.response.set_status(StatusCode::OK);
        self.cx.request.set_current_route(self.current_route.as_ref());
        metrics::record_route_matched(kind);

        tracing::debug!(
            kind = kind,
            method = %self.cx.request.method(),
            params = ?self.current_route.as_ref().map(UrlRoute::parameters),
            "Route matched"
        );
        true
    }

    fn render_view(&self, slug: &str, data: &Value) -> Result<(), RoutingError> {
        let slug = slug.trim_start_matches('/');
        let slug = slug.strip_prefix(self.view_prefix.as_str()).unwrap_or(slug);

        let body = self.cx.view.render(slug, data)?;
        self.cx.response.send(&body);
        Ok(())
    }

    fn call_controller(&self, target: &ControllerTarget) -> Result<(), RoutingError> {
        let class = target.class_in(&self.namespace);
        let container = self.cx.container;

        if !container.has(&class) {
            return Err(RoutingError::ControllerNotFound(class));
        }
        let instance = container
            .resolve(&class)
            .ok_or_else(|| RoutingError::ControllerNotFound(class.clone()))?;

        tracing::debug!(controller = %class, action = %target.method(), "Dispatching controller");
        let body = container.resolve_method(
            instance.as_ref(),
            target.method(),
            self.cx.request,
            self.cx.view,
        )?;
        self.cx.response.send(&body);
        Ok(())
    }

    fn fail(&mut self, guard: &'static str) {
        tracing::trace!(guard = guard, "Route guard failed");
        self.state = self.state.next(RouteEvent::GuardFailed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matched_is_absorbing() {
        for event in [RouteEvent::GuardFailed, RouteEvent::Dispatched, RouteEvent::Reset] {
            assert_eq!(RouteState::Matched.next(event), RouteState::Matched);
        }
    }

    #[test]
    fn test_guarding_transitions() {
        assert_eq!(RouteState::Guarding.next(RouteEvent::GuardFailed), RouteState::Blocked);
        assert_eq!(RouteState::Guarding.next(RouteEvent::Dispatched), RouteState::Matched);
        assert_eq!(RouteState::Guarding.next(RouteEvent::Reset), RouteState::Guarding);
    }

    #[test]
    fn test_blocked_transitions() {
        assert_eq!(RouteState::Blocked.next(RouteEvent::GuardFailed), RouteState::Blocked);
        assert_eq!(RouteState::Blocked.next(RouteEvent::Dispatched), RouteState::Blocked);
        assert_eq!(RouteState::Blocked.next(RouteEvent::Reset), RouteState::Guarding);
    }

    #[test]
    fn test_conditions() {
        assert!(true.evaluate());
        assert!(!false.evaluate());
        assert!((|| true).evaluate());

        let mut called = false;
        assert!(!(|| {
            called = true;
            false
        })
        .evaluate());
        assert!(called);
    }
}
