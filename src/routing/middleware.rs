//! Named route middleware.
//!
//! # Responsibilities
//! - Hold the boot-time registry of middleware handlers by name
//! - Collect `name|arg1,arg2` specs for the route being declared
//! - Evaluate collected middleware in declaration order
//! - Purge group-scoped entries after every dispatch attempt
//!
//! # Design Decisions
//! - Unknown names fail at declaration time, not at evaluation time
//! - Evaluation stops at the first handler that does not pass
//! - The registry is an explicit value shared via `Arc`, not a global

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};

use crate::http::Request;
use crate::routing::error::RoutingError;

/// A check that decides whether a route may dispatch.
pub trait Middleware: Send + Sync {
    /// Returns true if the route may proceed.
    fn passes(&self, request: &dyn Request, args: &[String]) -> bool;
}

impl<F> Middleware for F
where
    F: Fn(&dyn Request, &[String]) -> bool + Send + Sync,
{
    fn passes(&self, request: &dyn Request, args: &[String]) -> bool {
        self(request, args)
    }
}

/// Registry of middleware handlers, populated once at boot.
#[derive(Clone, Default)]
pub struct MiddlewareRegistry {
    handlers: HashMap<String, Arc<dyn Middleware>>,
}

impl MiddlewareRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under `name`, replacing any previous handler.
    pub fn register(&mut self, name: impl Into<String>, handler: impl Middleware + 'static) {
        let name = name.into();
        tracing::debug!(middleware = %name, "Registered middleware");
        self.handlers.insert(name, Arc::new(handler));
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Middleware>> {
        self.handlers.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for MiddlewareRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiddlewareRegistry")
            .field("handlers", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Middleware collected for the route currently being declared.
#[derive(Debug)]
pub struct MiddlewareQueue<'a> {
    registry: &'a MiddlewareRegistry,
    /// Middleware name -> arguments, in declaration order.
    stack: IndexMap<String, Vec<String>>,
    /// Names added while inside a group.
    scoped: IndexSet<String>,
}

impl<'a> MiddlewareQueue<'a> {
    pub fn new(registry: &'a MiddlewareRegistry) -> Self {
        Self {
            registry,
            stack: IndexMap::new(),
            scoped: IndexSet::new(),
        }
    }

    /// Add one or more `name` / `name|arg1,arg2` specs.
    ///
    /// Re-adding a name replaces its arguments. Fails on the first name
    /// that is not registered.
    pub fn add(&mut self, specs: impl IntoSpecs, scoped: bool) -> Result<(), RoutingError> {
        for spec in specs.into_specs() {
            let (name, args) = parse_spec(&spec);

            if !self.registry.contains(name) {
                return Err(RoutingError::UnknownMiddleware(name.to_string()));
            }

            if scoped {
                self.scoped.insert(name.to_string());
            }
            self.stack.insert(name.to_string(), args);
        }
        Ok(())
    }

    /// Run every collected middleware in order.
    ///
    /// Stops at the first handler that does not pass; later handlers are
    /// not invoked.
    pub fn passes(&self, request: &dyn Request) -> bool {
        for (name, args) in &self.stack {
            let Some(handler) = self.registry.get(name) else {
                return false;
            };

            if !handler.passes(request, args) {
                tracing::trace!(middleware = %name, "Middleware rejected route");
                return false;
            }
        }
        true
    }

    /// Drop group-scoped entries, keeping the rest in order.
    pub fn de_scope(&mut self) {
        for name in self.scoped.drain(..) {
            self.stack.shift_remove(&name);
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.stack.contains_key(name)
    }

    /// Arguments stored for `name`.
    pub fn args(&self, name: &str) -> Option<&[String]> {
        self.stack.get(name).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }
}

/// One middleware spec or a list of them.
pub trait IntoSpecs {
    fn into_specs(self) -> Vec<String>;
}

impl IntoSpecs for &str {
    fn into_specs(self) -> Vec<String> {
        vec![self.to_string()]
    }
}

impl IntoSpecs for String {
    fn into_specs(self) -> Vec<String> {
        vec![self]
    }
}

impl<S: AsRef<str>> IntoSpecs for &[S] {
    fn into_specs(self) -> Vec<String> {
        self.iter().map(|s| s.as_ref().to_string()).collect()
    }
}

impl<S: AsRef<str>, const N: usize> IntoSpecs for [S; N] {
    fn into_specs(self) -> Vec<String> {
        self.iter().map(|s| s.as_ref().to_string()).collect()
    }
}

impl<S: AsRef<str>> IntoSpecs for Vec<S> {
    fn into_specs(self) -> Vec<String> {
        self.iter().map(|s| s.as_ref().to_string()).collect()
    }
}

/// Split `name|a,b` into its name and argument list.
fn parse_spec(spec: &str) -> (&str, Vec<String>) {
    match spec.split_once('|') {
        Some((name, args)) => (name, args.split(',').map(str::to_string).collect()),
        None => (spec, Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpRequest;
    use std::sync::Mutex;

    fn allow(_: &dyn Request, _: &[String]) -> bool {
        true
    }

    fn deny(_: &dyn Request, _: &[String]) -> bool {
        false
    }

    #[test]
    fn test_parse_spec() {
        assert_eq!(parse_spec("auth"), ("auth", vec![]));
        assert_eq!(
            parse_spec("role|editor,author"),
            ("role", vec!["editor".to_string(), "author".to_string()])
        );
    }

    #[test]
    fn test_unknown_middleware_rejected() {
        let registry = MiddlewareRegistry::new();
        let mut queue = MiddlewareQueue::new(&registry);
        let err = queue.add("nonexistent", false).unwrap_err();
        assert!(matches!(err, RoutingError::UnknownMiddleware(name) if name == "nonexistent"));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_last_write_wins() {
        let mut registry = MiddlewareRegistry::new();
        registry.register("role", allow);
        let mut queue = MiddlewareQueue::new(&registry);
        queue.add("role|editor", false).unwrap();
        queue.add(vec!["role|admin,owner"], false).unwrap();
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.args("role").unwrap(), ["admin", "owner"]);
    }

    #[test]
    fn test_passes_in_order_with_short_circuit() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut registry = MiddlewareRegistry::new();
        for (name, result) in [("a", true), ("b", false), ("c", true)] {
            let calls = calls.clone();
            registry.register(name, move |_: &dyn Request, _: &[String]| {
                calls.lock().unwrap().push(name);
                result
            });
        }

        let request = HttpRequest::new("GET", "/");
        let mut queue = MiddlewareQueue::new(&registry);
        queue.add(["a", "b", "c"], false).unwrap();

        assert!(!queue.passes(&request));
        assert_eq!(*calls.lock().unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_passes_when_every_handler_passes() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut registry = MiddlewareRegistry::new();
        for name in ["a", "b", "c"] {
            let calls = calls.clone();
            registry.register(name, move |_: &dyn Request, _: &[String]| {
                calls.lock().unwrap().push(name);
                true
            });
        }

        let request = HttpRequest::new("GET", "/");
        let mut queue = MiddlewareQueue::new(&registry);
        queue.add(["a", "b", "c"], false).unwrap();

        assert!(queue.passes(&request));
        assert_eq!(*calls.lock().unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_args_are_passed_to_handler() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut registry = MiddlewareRegistry::new();
        let sink = seen.clone();
        registry.register("role", move |_: &dyn Request, args: &[String]| {
            sink.lock().unwrap().extend_from_slice(args);
            true
        });

        let request = HttpRequest::new("GET", "/");
        let mut queue = MiddlewareQueue::new(&registry);
        queue.add(["role|editor,author"], false).unwrap();

        assert!(queue.passes(&request));
        assert_eq!(*seen.lock().unwrap(), vec!["editor", "author"]);
    }

    #[test]
    fn test_empty_queue_passes() {
        let registry = MiddlewareRegistry::new();
        let queue = MiddlewareQueue::new(&registry);
        assert!(queue.passes(&HttpRequest::new("GET", "/")));
    }

    #[test]
    fn test_de_scope_removes_only_scoped() {
        let mut registry = MiddlewareRegistry::new();
        registry.register("auth", allow);
        registry.register("csrf", deny);
        registry.register("log", allow);

        let mut queue = MiddlewareQueue::new(&registry);
        queue.add(["csrf"], false).unwrap();
        queue.add(["auth"], true).unwrap();
        queue.add(["log"], false).unwrap();
        queue.de_scope();

        assert!(queue.contains("csrf"));
        assert!(queue.contains("log"));
        assert!(!queue.contains("auth"));

        // A second purge has nothing left to remove.
        queue.de_scope();
        assert_eq!(queue.len(), 2);
    }
}
