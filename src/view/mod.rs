//! View rendering.
//!
//! # Data Flow
//! ```text
//! router.view("templates/views/post", data)
//!     → strip "{templates_directory}/views/" prefix
//!     → View::render("post", data)
//!     → template.rs loads "{views_dir}/post.html"
//!     → rendered body → Response::send
//! ```

pub mod template;

use thiserror::Error;

pub use template::TemplateView;

/// The view collaborator used by the router and controllers.
pub trait View {
    fn render(&self, slug: &str, data: &serde_json::Value) -> Result<String, ViewError>;
}

/// Errors raised while rendering a view.
#[derive(Debug, Error)]
pub enum ViewError {
    #[error("view `{0}` not found")]
    NotFound(String),

    #[error("failed to render view: {0}")]
    Render(#[from] minijinja::Error),
}
