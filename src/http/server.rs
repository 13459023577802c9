//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the proxy handler
//! - Wire up middleware (tracing, timeout, request ID)
//! - Dispatch requests to the routing table
//! - Forward requests to the matched backend
//! - Swap in new routing tables on config reload

use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ProxyConfig;
use crate::http::request::{backend_uri, prepare_forward, request_id};
use crate::http::response::rewrite_response_headers;
use crate::lifecycle::ShutdownSignal;
use crate::observability::metrics;
use crate::routing::{RouteError, Router as RoutingTable};

/// Live routing table, replaced wholesale on reload.
pub type SharedRoutingTable = Arc<ArcSwap<RoutingTable>>;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub routes: SharedRoutingTable,
    pub client: Client<HttpConnector, Body>,
}

/// HTTP server for the proxy.
pub struct HttpServer {
    router: Router,
    routes: SharedRoutingTable,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Result<Self, RouteError> {
        let routes = Arc::new(ArcSwap::from_pointee(RoutingTable::from_config(&config.routes)?));

        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        let state = AppState {
            routes: routes.clone(),
            client,
        };

        let router = Self::build_router(&config, state);
        Ok(Self {
            router,
            routes,
        })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs))),
            )
    }

    /// Handle to the live routing table.
    pub fn routing_table(&self) -> SharedRoutingTable {
        self.routes.clone()
    }

    /// Run the server until `shutdown` fires.
    ///
    /// Configurations received on `config_updates` replace the routing
    /// table; listener and timeout settings apply only at startup.
    pub async fn run(
        self,
        listener: TcpListener,
        config_updates: mpsc::UnboundedReceiver<ProxyConfig>,
        shutdown: ShutdownSignal,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let reloader = tokio::spawn(apply_config_updates(self.routes.clone(), config_updates));

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown.recv())
            .await?;

        reloader.abort();
        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Compile each received configuration and swap it in.
async fn apply_config_updates(
    routes: SharedRoutingTable,
    mut config_updates: mpsc::UnboundedReceiver<ProxyConfig>,
) {
    while let Some(config) = config_updates.recv().await {
        match RoutingTable::from_config(&config.routes) {
            Ok(table) => {
                routes.store(Arc::new(table));
                tracing::info!(routes = config.routes.len(), "Routing table reloaded");
            }
            Err(e) => {
                tracing::error!(error = %e, "Rejected routing table, keeping current one");
            }
        }
    }
}

/// Main proxy handler.
/// Looks up the route, rewrites the path, and forwards the request.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = request_id(request.headers());
    let method = request.method().to_string();
    let path = request.uri().path().to_string();

    // 1. Match Route
    let table = state.routes.load_full();
    let route = match table.match_request(&request) {
        Some(r) => r,
        None => {
            tracing::warn!(request_id = %request_id, path = %path, "No route matched");
            metrics::record_request(&method, 404, metrics::NO_ROUTE, start_time);
            return (StatusCode::NOT_FOUND, "No matching route found").into_response();
        }
    };

    // 2. Rewrite Path
    let backend_path = match route.rule().process(&path) {
        Ok(p) => p,
        Err(e) => {
            tracing::error!(request_id = %request_id, route = %route.name(), error = %e, "Path rewrite failed");
            metrics::record_request(&method, 500, route.name(), start_time);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Path rewrite failed").into_response();
        }
    };

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %path,
        route = %route.name(),
        backend_path = %backend_path,
        "Proxying request"
    );

    let (mut parts, body) = request.into_parts();
    parts.uri = match backend_uri(&parts.uri, &backend_path, route.server()) {
        Ok(uri) => uri,
        Err(e) => {
            tracing::error!(request_id = %request_id, route = %route.name(), error = %e, "Invalid backend URI");
            metrics::record_request(&method, 500, route.name(), start_time);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Invalid backend URI").into_response();
        }
    };
    prepare_forward(&mut parts, route.server());

    // 3. Forward
    match state.client.request(Request::from_parts(parts, body)).await {
        Ok(response) => {
            let (mut parts, body) = response.into_parts();
            rewrite_response_headers(&mut parts.headers, route);
            metrics::record_request(&method, parts.status.as_u16(), route.name(), start_time);
            Response::from_parts(parts, Body::new(body))
        }
        Err(e) => {
            tracing::error!(request_id = %request_id, route = %route.name(), error = %e, "Upstream error");
            metrics::record_request(&method, 502, route.name(), start_time);
            (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
        }
    }
}
