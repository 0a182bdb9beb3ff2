//! Dependency-injection container.
//!
//! # Data Flow
//! ```text
//! Boot:
//!     container.controller("theme::controllers::PostController", factory)
//!     container.singleton("site", SiteInfo { .. })
//!
//! Dispatch (router terminal):
//!     "PostController@show" + namespace
//!     → has(class)            (else ControllerNotFound)
//!     → resolve(class)        (factory builds the controller)
//!     → resolve_method(..)    (action runs with an ActionContext)
//!     → rendered body
//! ```
//!
//! # Design Decisions
//! - Controllers are registered explicitly by fully-qualified name
//! - A fresh controller is built per dispatch; services are shared `Arc`s
//! - Registration takes `&self` so the container can live behind an `Arc`

pub mod controller;

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;

pub use controller::{ActionContext, Controller, ControllerError};

use crate::http::Request;
use crate::view::View;

/// The container collaborator used by the router.
pub trait Container {
    /// Shared service registered under `name`.
    fn get(&self, name: &str) -> Option<Arc<dyn Any + Send + Sync>>;

    /// Whether a controller class is registered.
    fn has(&self, class: &str) -> bool;

    /// Build a fresh controller instance.
    fn resolve(&self, class: &str) -> Option<Box<dyn Controller>>;

    /// Invoke `method` on `instance`, injecting the action context.
    fn resolve_method(
        &self,
        instance: &dyn Controller,
        method: &str,
        request: &dyn Request,
        view: &dyn View,
    ) -> Result<String, ControllerError>;
}

type ControllerFactory = Arc<dyn Fn(&ServiceContainer) -> Box<dyn Controller> + Send + Sync>;

/// Container of controller factories and named singletons.
#[derive(Default)]
pub struct ServiceContainer {
    controllers: DashMap<String, ControllerFactory>,
    services: DashMap<String, Arc<dyn Any + Send + Sync>>,
}

impl ServiceContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a controller factory under its fully-qualified class name.
    pub fn controller<C, F>(&self, class: impl Into<String>, factory: F)
    where
        C: Controller + 'static,
        F: Fn(&ServiceContainer) -> C + Send + Sync + 'static,
    {
        let factory: ControllerFactory =
            Arc::new(move |c: &ServiceContainer| -> Box<dyn Controller> { Box::new(factory(c)) });
        self.controllers.insert(class.into(), factory);
    }

    /// Register a shared service.
    pub fn singleton<T: Any + Send + Sync>(&self, name: impl Into<String>, value: T) {
        self.services.insert(name.into(), Arc::new(value));
    }

    /// Typed lookup of a shared service.
    pub fn service<T: Any + Send + Sync>(&self, name: &str) -> Option<Arc<T>> {
        self.get(name).and_then(|s| s.downcast::<T>().ok())
    }

    pub fn controller_count(&self) -> usize {
        self.controllers.len()
    }
}

impl Container for ServiceContainer {
    fn get(&self, name: &str) -> Option<Arc<dyn Any + Send + Sync>> {
        self.services.get(name).map(|s| s.value().clone())
    }

    fn has(&self, class: &str) -> bool {
        self.controllers.contains_key(class)
    }

    fn resolve(&self, class: &str) -> Option<Box<dyn Controller>> {
        // Release the map guard before running the factory.
        let factory = self.controllers.get(class).map(|f| f.value().clone())?;
        Some(factory(self))
    }

    fn resolve_method(
        &self,
        instance: &dyn Controller,
        method: &str,
        request: &dyn Request,
        view: &dyn View,
    ) -> Result<String, ControllerError> {
        let cx = ActionContext {
            request,
            container: self,
            view,
        };
        instance.call(method, &cx)
    }
}

impl fmt::Debug for ServiceContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceContainer")
            .field("controllers", &self.controllers.len())
            .field("services", &self.services.len())
            .finish()
    }
}
