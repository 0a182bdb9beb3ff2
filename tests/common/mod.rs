//! Shared fixtures for routing and server tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::sync::{Arc, Mutex};

use serde_json::Value;
use snap_routing::config::SnapConfig;
use snap_routing::container::{ActionContext, Controller, ControllerError, ServiceContainer};
use snap_routing::http::{HttpRequest, HttpResponse, Request};
use snap_routing::routing::{MiddlewareRegistry, RouteContext, Router};
use snap_routing::view::{View, ViewError};

/// Names of the middleware invoked, in order.
pub type CallLog = Arc<Mutex<Vec<String>>>;

/// View that records what it was asked to render.
#[derive(Default)]
pub struct SpyView {
    renders: RefCell<Vec<(String, Value)>>,
}

impl SpyView {
    pub fn rendered(&self) -> Vec<String> {
        self.renders.borrow().iter().map(|(slug, _)| slug.clone()).collect()
    }

    pub fn last_data(&self) -> Option<Value> {
        self.renders.borrow().last().map(|(_, data)| data.clone())
    }
}

impl View for SpyView {
    fn render(&self, slug: &str, data: &Value) -> Result<String, ViewError> {
        self.renders
            .borrow_mut()
            .push((slug.to_string(), data.clone()));
        Ok(format!("view:{slug}"))
    }
}

/// Controller whose actions echo their name and route parameters.
pub struct PageController {
    pub prefix: &'static str,
}

impl Controller for PageController {
    fn call(&self, action: &str, cx: &ActionContext<'_>) -> Result<String, ControllerError> {
        match action {
            "index" | "home" => Ok(format!("{}:{}", self.prefix, action)),
            "show" => Ok(format!("{}:{}", self.prefix, cx.param("slug")?)),
            _ => Err(ControllerError::unknown_action("PageController", action)),
        }
    }
}

/// Registry with `allow`, `audit`, `deny` and `role|..` middleware writing to `log`.
pub fn middleware(log: &CallLog) -> MiddlewareRegistry {
    let mut registry = MiddlewareRegistry::new();

    let calls = log.clone();
    registry.register("allow", move |_: &dyn Request, _: &[String]| {
        calls.lock().unwrap().push("allow".to_string());
        true
    });

    let calls = log.clone();
    registry.register("audit", move |_: &dyn Request, _: &[String]| {
        calls.lock().unwrap().push("audit".to_string());
        true
    });

    let calls = log.clone();
    registry.register("deny", move |_: &dyn Request, _: &[String]| {
        calls.lock().unwrap().push("deny".to_string());
        false
    });

    let calls = log.clone();
    registry.register("role", move |_: &dyn Request, args: &[String]| {
        calls.lock().unwrap().push(format!("role:{}", args.join(",")));
        true
    });

    registry
}

pub fn container() -> ServiceContainer {
    let container = ServiceContainer::new();
    container.controller("theme::controllers::PageController", |_: &ServiceContainer| {
        PageController { prefix: "page" }
    });
    container.controller("admin::PageController", |_: &ServiceContainer| PageController {
        prefix: "admin",
    });
    container
}

/// Collaborators for one simulated request.
pub struct Harness {
    pub request: HttpRequest,
    pub response: HttpResponse,
    pub container: ServiceContainer,
    pub view: SpyView,
    pub config: SnapConfig,
    pub middleware: MiddlewareRegistry,
    pub calls: CallLog,
}

impl Harness {
    pub fn new(method: &str, path: &str) -> Self {
        Self::with_request(HttpRequest::new(method, path))
    }

    pub fn with_request(request: HttpRequest) -> Self {
        let calls = CallLog::default();
        Self {
            request,
            response: HttpResponse::new(),
            container: container(),
            view: SpyView::default(),
            config: SnapConfig::default(),
            middleware: middleware(&calls),
            calls,
        }
    }

    pub fn router(&self) -> Router<'_> {
        Router::new(RouteContext {
            request: &self.request,
            response: &self.response,
            container: &self.container,
            view: &self.view,
            config: &self.config,
            middleware: &self.middleware,
        })
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}
