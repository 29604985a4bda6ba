//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the fixed endpoints and the proxy fallback
//! - Wire up middleware (request ID, tracing, CORS, panic catching)
//! - Bind server to listener
//! - Dispatch proxied paths to the route table and forwarder

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    response::Response,
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::{validate_config, ConfigError, Environment, GatewayConfig};
use crate::health::BackendProbe;
use crate::http::handlers;
use crate::http::request::{request_id, UuidRequestId};
use crate::http::response;
use crate::observability::metrics;
use crate::proxy::client::build_client;
use crate::proxy::Forwarder;
use crate::routing::{RouteTable, TargetOrigin};
use crate::security::cors::cors_layer;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub routes: Arc<RouteTable>,
    pub forwarder: Forwarder,
    pub probe: BackendProbe,
    pub backend_url: Arc<str>,
    pub started_at: Instant,
}

impl AppState {
    pub fn environment(&self) -> Environment {
        self.config.environment
    }
}

/// HTTP server for the gateway.
pub struct GatewayServer {
    router: Router,
    config: Arc<GatewayConfig>,
}

impl GatewayServer {
    /// Create a new server. The configuration is validated here as well,
    /// so a server never exists without a usable backend origin.
    pub fn new(config: GatewayConfig) -> Result<Self, ConfigError> {
        validate_config(&config).map_err(ConfigError::Validation)?;
        let target = TargetOrigin::parse(config.backend.url.as_deref().unwrap_or_default())
            .map_err(|e| ConfigError::Validation(vec![e]))?;

        let routes = Arc::new(RouteTable::from_config(&config.routes, &target));

        // One pool shared by proxied traffic and the probe.
        let client = build_client(&config.timeouts);
        let forwarder = Forwarder::with_client(client.clone(), config.timeouts.clone());
        let probe = BackendProbe::new(
            client,
            target.clone(),
            config.backend.health_path.clone(),
            config.timeouts.clone(),
        );

        let config = Arc::new(config);
        let state = AppState {
            config: config.clone(),
            routes,
            forwarder,
            probe,
            backend_url: Arc::from(target.to_string()),
            started_at: Instant::now(),
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let environment = config.environment;

        Router::new()
            .route("/", get(handlers::index))
            .route("/health", get(handlers::health))
            .route("/test-backend", get(handlers::test_backend))
            .fallback(proxy_handler)
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(cors_layer(&config.cors, environment))
                    .layer(CatchPanicLayer::custom(
                        move |panic: Box<dyn std::any::Any + Send + 'static>| {
                            response::panic_response(panic, environment)
                        },
                    )),
            )
    }

    /// Run the server until `shutdown` fires (or its sender is dropped).
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            backend = self.config.backend.url.as_deref().unwrap_or_default(),
            environment = %self.config.environment,
            "HTTP server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Proxy handler for every path without a fixed endpoint.
/// Looks up the route and forwards the request.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let request_id = request_id(&request);

    let Some(rule) = state.routes.match_path(&path) else {
        tracing::warn!(request_id = %request_id, method = %method, path = %path, "No route matched");
        metrics::record_request(method.as_str(), 404, "none", start_time);
        return response::not_found(&path);
    };

    let client_addr = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);

    let result = state.forwarder.forward(request, rule, client_addr).await;
    let response = response::relay(result, state.environment(), &state.backend_url);

    metrics::record_request(method.as_str(), response.status().as_u16(), &rule.name, start_time);
    response
}
