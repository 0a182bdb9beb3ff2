//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with a single theme handler
//! - Wire up middleware (tracing, timeout, request ID)
//! - Run the theme's route table with a fresh `Router` per request
//! - Fall through to 404 when no declaration matched
//! - Apply hot-reloaded configuration between requests
//!
//! # Design Decisions
//! - The view and the layer stack are built once, so the `server` and
//!   `theme` sections are fixed at boot; reloads apply the rest

use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::State,
    http::{request::Parts, HeaderName, Request, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::SnapConfig;
use crate::container::ServiceContainer;
use crate::http::request::HttpRequest;
use crate::http::response::HttpResponse;
use crate::observability::metrics;
use crate::routing::{MiddlewareRegistry, RouteContext, RouteTable, Router as ThemeRouter, RoutingError};
use crate::view::View;

const X_REQUEST_ID: &str = "x-request-id";

/// Shared state injected into the theme handler.
#[derive(Clone)]
pub struct AppState {
    pub routes: Arc<RouteTable>,
    pub middleware: Arc<MiddlewareRegistry>,
    pub container: Arc<ServiceContainer>,
    pub view: Arc<dyn View + Send + Sync>,
    pub config: Arc<ArcSwap<SnapConfig>>,
}

impl AppState {
    pub fn new<F>(
        routes: F,
        middleware: MiddlewareRegistry,
        container: ServiceContainer,
        view: impl View + Send + Sync + 'static,
        config: SnapConfig,
    ) -> Self
    where
        F: for<'a> Fn(&mut ThemeRouter<'a>) -> Result<(), RoutingError> + Send + Sync + 'static,
    {
        Self {
            routes: Arc::new(routes),
            middleware: Arc::new(middleware),
            container: Arc::new(container),
            view: Arc::new(view),
            config: Arc::new(ArcSwap::from_pointee(config)),
        }
    }
}

/// HTTP host for a theme's route table.
pub struct HttpServer {
    router: Router,
    state: AppState,
}

impl HttpServer {
    pub fn new(state: AppState) -> Self {
        let config = state.config.load_full();
        let router = Self::build_router(&config, state.clone());
        Self { router, state }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &SnapConfig, state: AppState) -> Router {
        let request_id = HeaderName::from_static(X_REQUEST_ID);

        Router::new()
            .fallback(theme_handler)
            .with_state(state)
            .layer(PropagateRequestIdLayer::new(request_id.clone()))
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.server.request_timeout_secs,
            )))
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
    }

    /// The Axum router, for embedding or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until Ctrl-C, applying config updates as they arrive.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<SnapConfig>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let shared = self.state.config.clone();
        tokio::spawn(async move {
            while let Some(config) = config_updates.recv().await {
                let next = reloadable(&shared.load(), config);
                shared.store(Arc::new(next));
                tracing::info!("Applied updated configuration");
            }
        });

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn theme_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let (parts, _body) = request.into_parts();

    let response = render_request(&state, &parts);
    metrics::record_request(parts.method.as_str(), response.status().as_u16(), start);
    response
}

/// Run the route table for one request.
pub fn render_request(state: &AppState, parts: &Parts) -> Response {
    let config = state.config.load_full();
    let request = HttpRequest::from_parts(parts);
    let response = HttpResponse::new();

    let outcome = {
        let cx = RouteContext {
            request: &request,
            response: &response,
            container: state.container.as_ref(),
            view: state.view.as_ref(),
            config: config.as_ref(),
            middleware: state.middleware.as_ref(),
        };
        let mut router = ThemeRouter::new(cx);
        (state.routes)(&mut router).map(|()| router.has_matched())
    };

    match outcome {
        Ok(true) => response.into_response(),
        Ok(false) => {
            tracing::debug!(method = %parts.method, path = %parts.uri.path(), "No route matched");
            (StatusCode::NOT_FOUND, "Not Found").into_response()
        }
        Err(e) => {
            tracing::error!(
                method = %parts.method,
                path = %parts.uri.path(),
                error = %e,
                "Route table failed"
            );
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    }
}

/// `next`, with the sections that only take effect at boot kept from `current`.
fn reloadable(current: &SnapConfig, mut next: SnapConfig) -> SnapConfig {
    if next.server != current.server {
        tracing::warn!("Server settings changed; restart to apply them");
        next.server = current.server.clone();
    }
    if next.theme != current.theme {
        tracing::warn!(
            templates = %next.theme.templates_directory,
            "Theme settings changed; restart to apply them"
        );
        next.theme = current.theme.clone();
    }
    next
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
