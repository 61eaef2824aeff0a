//! # HTTP Server
//!
//! Serves the librarian method table over HTTP.

use std::io;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::config::HttpServerConfig;
use super::routes::{health_routes, librarian_routes};
use crate::service::LibrarianService;
use crate::store::Library;

/// HTTP server for one librarian service
pub struct LibrarianServer {
    config: HttpServerConfig,
    router: Router,
}

impl LibrarianServer {
    pub fn new<L: Library + 'static>(
        config: HttpServerConfig,
        service: Arc<LibrarianService<L>>,
    ) -> Self {
        let router = Self::build_router(service);
        Self { config, router }
    }

    /// Build the combined router with all endpoints
    pub fn build_router<L: Library + 'static>(service: Arc<LibrarianService<L>>) -> Router {
        Router::new()
            .merge(health_routes())
            .nest("/librarian", librarian_routes(service))
            .layer(TraceLayer::new_for_http())
    }

    pub fn config(&self) -> &HttpServerConfig {
        &self.config
    }

    /// Serve until Ctrl-C
    pub async fn start(self) -> Result<(), io::Error> {
        let addr = self.config.listen_addr()?;
        let listener = TcpListener::bind(addr).await?;
        info!(%addr, "librarian listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
                info!("shutting down");
            })
            .await
    }
}
