//! # HTTP Server
//!
//! Main HTTP server combining the function and batch routers.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::Request,
    http::{header, HeaderName, HeaderValue, Method},
    middleware::{self, Next},
    response::Response,
    Router,
};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use uuid::Uuid;

use super::batch_routes::batch_routes;
use super::config::HttpServerConfig;
use super::errors::ApiError;
use super::function_routes::function_routes;
use super::state::GatewayState;
use crate::observability::{log_event, log_event_with_fields, Event};

/// HTTP server exposing registered functions
pub struct GatewayServer {
    config: HttpServerConfig,
    router: Router,
}

impl GatewayServer {
    pub fn new(config: HttpServerConfig, state: Arc<GatewayState>) -> Self {
        let router = Self::build_router(state);
        Self { config, router }
    }

    /// Build the combined router with all endpoints
    pub fn build_router(state: Arc<GatewayState>) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::ACCEPT, header::CONTENT_TYPE])
            .expose_headers([HeaderName::from_static(REQUEST_ID_HEADER)]);

        // Static batch paths take precedence over `/:name`
        Router::new()
            .merge(batch_routes(Arc::clone(&state)))
            .merge(function_routes(state))
            .fallback(not_found)
            .layer(middleware::from_fn(log_requests))
            .layer(cors)
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Serve until Ctrl-C
    pub async fn start(self) -> Result<(), std::io::Error> {
        let addr = self.config.socket_addr();
        let listener = TcpListener::bind(&addr).await?;

        log_event_with_fields(Event::Serving, &[("addr", &addr)]);

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        log_event(Event::ShutdownComplete);
        Ok(())
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // No signal handler; serve until the process is killed
        std::future::pending::<()>().await;
    }
    log_event(Event::ShutdownStart);
}

/// Response header carrying the request's log correlation id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

async fn not_found() -> ApiError {
    ApiError::NotFound
}

async fn log_requests(request: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    let mut response = next.run(request).await;

    log_event_with_fields(
        Event::RequestHandled,
        &[
            ("request_id", &request_id),
            ("method", &method),
            ("path", &path),
            ("status", response.status().as_str()),
            ("duration_ms", &start.elapsed().as_millis().to_string()),
        ],
    );
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response
            .headers_mut()
            .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
    }
    response
}
