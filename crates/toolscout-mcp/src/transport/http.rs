//! JSON-RPC over HTTP POST.

use crate::error::Result;
use crate::server::McpServer;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

pub struct HttpTransport {
    addr: SocketAddr,
    path: String,
}

impl HttpTransport {
    pub fn new(addr: SocketAddr, path: impl Into<String>) -> Self {
        Self {
            addr,
            path: path.into(),
        }
    }

    pub fn addr(&self) -> &SocketAddr {
        &self.addr
    }

    /// Router answering `POST {path}`.
    pub fn router(&self, server: Arc<McpServer>) -> Router {
        Router::new()
            .route(&self.path, post(handle_mcp_request))
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .with_state(server)
    }

    pub async fn serve(self, server: Arc<McpServer>) -> Result<()> {
        let router = self.router(server);
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        info!("Serving MCP over HTTP at http://{}{}", self.addr, self.path);
        axum::serve(listener, router).await?;
        Ok(())
    }
}

async fn handle_mcp_request(State(server): State<Arc<McpServer>>, body: String) -> Response {
    match server.handle_message(&body).await {
        Some(response) => (StatusCode::OK, Json(response)).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}
