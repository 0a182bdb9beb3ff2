//! Controllers and the context their actions run in.

use std::any::Any;
use std::sync::Arc;

use thiserror::Error;

use crate::container::Container;
use crate::http::Request;
use crate::view::{View, ViewError};

/// A routable controller.
///
/// Actions are selected by name; the controller maps each name to one of
/// its methods and returns the rendered body.
pub trait Controller {
    fn call(&self, action: &str, cx: &ActionContext<'_>) -> Result<String, ControllerError>;
}

/// Dependencies injected into a controller action.
#[derive(Clone, Copy)]
pub struct ActionContext<'a> {
    pub request: &'a dyn Request,
    pub container: &'a dyn Container,
    pub view: &'a dyn View,
}

impl<'a> ActionContext<'a> {
    /// Parameter captured by the matched route.
    pub fn param(&self, name: &str) -> Result<String, ControllerError> {
        self.request
            .route_param(name)
            .ok_or_else(|| ControllerError::MissingParameter(name.to_string()))
    }

    /// Typed service registered in the container.
    pub fn service<T: Any + Send + Sync>(&self, name: &str) -> Result<Arc<T>, ControllerError> {
        self.container
            .get(name)
            .and_then(|s| s.downcast::<T>().ok())
            .ok_or_else(|| ControllerError::MissingService(name.to_string()))
    }

    /// Render a view with `data`.
    pub fn render(&self, slug: &str, data: &serde_json::Value) -> Result<String, ControllerError> {
        Ok(self.view.render(slug, data)?)
    }
}

/// Errors raised by controller actions.
#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("action `{action}` not found on controller `{controller}`")]
    UnknownAction { controller: String, action: String },

    #[error("route parameter `{0}` is missing")]
    MissingParameter(String),

    #[error("service `{0}` is not registered")]
    MissingService(String),

    #[error(transparent)]
    View(#[from] ViewError),

    #[error("{0}")]
    Failed(String),
}

impl ControllerError {
    pub fn unknown_action(controller: &str, action: &str) -> Self {
        Self::UnknownAction {
            controller: controller.to_string(),
            action: action.to_string(),
        }
    }
}
