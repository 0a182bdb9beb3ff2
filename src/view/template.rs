//! File-backed views rendered with minijinja.

use std::path::{Path, PathBuf};

use minijinja::{path_loader, Environment, ErrorKind};

use crate::view::{View, ViewError};

/// Renders `{slug}.{extension}` templates from a views directory.
#[derive(Debug)]
pub struct TemplateView {
    env: Environment<'static>,
    extension: String,
    root: Option<PathBuf>,
}

impl TemplateView {
    /// Load templates lazily from `dir`.
    pub fn from_dir(dir: impl AsRef<Path>, extension: impl Into<String>) -> Self {
        let root = dir.as_ref().to_path_buf();
        let mut env = Environment::new();
        env.set_loader(path_loader(root.clone()));
        Self {
            env,
            extension: extension.into(),
            root: Some(root),
        }
    }

    /// An in-memory view set, populated with [`add_template`](Self::add_template).
    pub fn in_memory(extension: impl Into<String>) -> Self {
        Self {
            env: Environment::new(),
            extension: extension.into(),
            root: None,
        }
    }

    /// Register a template source for `slug`.
    pub fn add_template(&mut self, slug: &str, source: impl Into<String>) -> Result<(), ViewError> {
        let name = self.template_name(slug);
        self.env.add_template_owned(name, source.into())?;
        Ok(())
    }

    /// Directory templates are loaded from, if file-backed.
    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    fn template_name(&self, slug: &str) -> String {
        format!("{}.{}", slug.trim_matches('/'), self.extension)
    }
}

impl View for TemplateView {
    fn render(&self, slug: &str, data: &serde_json::Value) -> Result<String, ViewError> {
        let name = self.template_name(slug);
        let template = self.env.get_template(&name).map_err(|e| match e.kind() {
            ErrorKind::TemplateNotFound => ViewError::NotFound(slug.to_string()),
            _ => ViewError::Render(e),
        })?;
        Ok(template.render(data)?)
    }
}
