//! Shared utilities for integration testing.

use std::net::SocketAddr;

use axum::{
    http::{header, HeaderMap, StatusCode, Uri},
    response::IntoResponse,
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use dirproxy::config::ProxyConfig;
use dirproxy::http::SharedRoutingTable;
use dirproxy::{HttpServer, Shutdown};

/// Start a mock backend on an ephemeral port.
///
/// - `/redirect` answers 302 to `/login` and sets a cookie scoped to `/`
/// - `/absolute` answers 302 to its own absolute `/login` URL
/// - `/headers` echoes the forwarded host and request ID
/// - anything else echoes the path and query it received
pub async fn start_mock_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let app = Router::new()
        .route(
            "/redirect",
            get(|| async {
                (
                    StatusCode::FOUND,
                    [(header::LOCATION, "/login"), (header::SET_COOKIE, "sid=1; Path=/")],
                )
            }),
        )
        .route(
            "/absolute",
            get(move || async move {
                (
                    StatusCode::FOUND,
                    [(header::LOCATION, format!("http://{addr}/login?from=absolute"))],
                )
            }),
        )
        .route(
            "/headers",
            get(|headers: HeaderMap| async move {
                let forwarded = headers
                    .get("x-forwarded-host")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("-")
                    .to_string();
                let has_id = headers.contains_key("x-request-id");
                format!("{forwarded} {has_id}")
            }),
        )
        .fallback(|uri: Uri| async move {
            uri.path_and_query()
                .map(|p| p.to_string())
                .unwrap_or_default()
                .into_response()
        });

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// A proxy running in the background.
pub struct TestProxy {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub config_updates: mpsc::UnboundedSender<ProxyConfig>,
    pub routes: SharedRoutingTable,
}

/// Start the proxy on an ephemeral port.
pub async fn start_proxy(config: ProxyConfig) -> TestProxy {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let (config_updates, updates_rx) = mpsc::unbounded_channel();
    let server = HttpServer::new(config).unwrap();
    let routes = server.routing_table();
    let signal = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, updates_rx, signal).await;
    });

    TestProxy {
        addr,
        shutdown,
        config_updates,
        routes,
    }
}

/// HTTP client that does not follow redirects.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}
