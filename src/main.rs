//! Snap theme server.
//!
//! # Architecture Overview
//!
//! ```text
//!   Client Request
//!   ──────────────▶ http::server (request id, timeout, trace)
//!                        │
//!                        ▼
//!                  routing::Router ◀── route table (below)
//!                   │         │
//!          guards + middleware │
//!                   ▼         ▼
//!              view::View   container::Controller
//!                   └────┬────┘
//!   Client Response ◀────┘ (404 when nothing matched)
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use serde_json::json;
use snap_routing::config::{load_config, watcher::ConfigWatcher, SnapConfig};
use snap_routing::container::{ActionContext, Controller, ControllerError, ServiceContainer};
use snap_routing::http::{AppState, HttpServer, Request};
use snap_routing::observability::{logging, metrics};
use snap_routing::routing::{MiddlewareRegistry, Router, RoutingError};
use snap_routing::view::TemplateView;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

#[derive(Parser)]
#[command(name = "snap-serve")]
#[command(about = "Serve a Snap theme route table", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured bind address.
    #[arg(short, long)]
    bind: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => SnapConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.server.bind_address = bind.to_string();
    }

    logging::init_logging(&config.observability.log_level);
    tracing::info!("snap-serve v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    // Keep the watcher alive for the lifetime of the server.
    let (_watcher, config_updates) = match &cli.config {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            (Some(watcher.run()?), updates)
        }
        None => {
            let (_, updates) = mpsc::unbounded_channel();
            (None, updates)
        }
    };

    let view = TemplateView::from_dir(
        config.theme.views_directory(),
        config.theme.view_extension.clone(),
    );
    let listener = TcpListener::bind(&config.server.bind_address).await?;

    tracing::info!(
        address = %listener.local_addr()?,
        templates = %config.theme.templates_directory,
        namespace = %config.routing.default_namespace,
        "Configuration loaded"
    );

    let state = AppState::new(routes, middleware(), container(), view, config);
    HttpServer::new(state).run(listener, config_updates).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// The theme's route declarations.
fn routes(router: &mut Router<'_>) -> Result<(), RoutingError> {
    router
        .get()
        .url("/")
        .view("templates/views/home", json!({ "title": "Snap" }))?;

    router
        .get()
        .url("blog")
        .dispatch("PostController@index")?;

    router
        .get()
        .url("blog/{slug}")
        .constrain([("slug", "[a-z0-9-]+")])
        .dispatch("PostController@show")?;

    router.post().url("contact").view("contact-sent", json!({}))?;

    router.using("header|x-snap-admin,1")?.group(|r| {
        r.get().url("admin").view("admin/dashboard", json!({}))?;
        r.any(["GET", "POST"])
            .url("admin/posts/{id}")
            .constrain([("id", "[0-9]+")])
            .dispatch(("theme::controllers::PostController", "edit"))?;
        Ok(())
    })?;

    Ok(())
}

fn middleware() -> MiddlewareRegistry {
    let mut registry = MiddlewareRegistry::new();
    // header|name,value: the request carries `name` with exactly `value`.
    registry.register("header", |request: &dyn Request, args: &[String]| {
        match args {
            [name, value] => request.header(name) == Some(value.as_str()),
            _ => false,
        }
    });
    registry
}

fn container() -> ServiceContainer {
    let container = ServiceContainer::new();
    container.singleton("site.name", String::from("Snap"));
    container.controller("theme::controllers::PostController", |c: &ServiceContainer| {
        PostController {
            site: c
                .service::<String>("site.name")
                .map(|s| s.to_string())
                .unwrap_or_default(),
        }
    });
    container
}

struct PostController {
    site: String,
}

impl Controller for PostController {
    fn call(&self, action: &str, cx: &ActionContext<'_>) -> Result<String, ControllerError> {
        match action {
            "index" => cx.render("posts", &json!({ "site": self.site })),
            "show" => cx.render("post", &json!({ "site": self.site, "slug": cx.param("slug")? })),
            "edit" => cx.render("admin/edit", &json!({ "id": cx.param("id")? })),
            _ => Err(ControllerError::unknown_action("PostController", action)),
        }
    }
}
