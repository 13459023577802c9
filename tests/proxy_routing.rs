//! End-to-end tests for directory-prefix routing through the proxy.

use std::net::SocketAddr;
use std::time::Duration;

use dirproxy::config::{FlagValue, ProxyConfig, RouteConfig};

mod common;

fn route(name: &str, directory: &str, server: SocketAddr) -> RouteConfig {
    RouteConfig {
        name: name.into(),
        directory: Some(directory.into()),
        append_trailing_slash: None,
        host: None,
        server: server.to_string(),
        priority: 0,
    }
}

fn config(routes: Vec<RouteConfig>) -> ProxyConfig {
    let mut config = ProxyConfig::default();
    config.routes = routes;
    config
}

#[tokio::test]
async fn test_directory_is_stripped_before_forwarding() {
    let backend = common::start_mock_backend().await;
    let proxy = common::start_proxy(config(vec![route("backend", "backend", backend)])).await;
    let client = common::client();

    let res = client
        .get(format!("http://{}/backend/x?y=1", proxy.addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), "/x?y=1");

    let res = client
        .get(format!("http://{}/backend/", proxy.addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.text().await.unwrap(), "/");

    proxy.shutdown.trigger();
}

#[tokio::test]
async fn test_unmatched_path_is_not_found() {
    let backend = common::start_mock_backend().await;
    let proxy = common::start_proxy(config(vec![route("backend", "backend", backend)])).await;
    let client = common::client();

    for path in ["/other", "/backendx", "/backend"] {
        let res = client
            .get(format!("http://{}{}", proxy.addr, path))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 404, "path = {path}");
    }

    proxy.shutdown.trigger();
}

#[tokio::test]
async fn test_redirects_and_cookies_are_reverted() {
    let backend = common::start_mock_backend().await;
    let proxy = common::start_proxy(config(vec![route("backend", "backend", backend)])).await;
    let client = common::client();

    let res = client
        .get(format!("http://{}/backend/redirect", proxy.addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 302);
    assert_eq!(res.headers()["location"], "/backend/login");
    assert_eq!(res.headers()["set-cookie"], "sid=1; Path=/backend/");

    let res = client
        .get(format!("http://{}/backend/absolute", proxy.addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.headers()["location"], "/backend/login?from=absolute");

    proxy.shutdown.trigger();
}

#[tokio::test]
async fn test_forwarded_headers() {
    let backend = common::start_mock_backend().await;
    let proxy = common::start_proxy(config(vec![route("backend", "backend", backend)])).await;
    let client = common::client();

    let res = client
        .get(format!("http://{}/backend/headers", proxy.addr))
        .send()
        .await
        .unwrap();
    assert!(res.headers().contains_key("x-request-id"));
    assert_eq!(res.text().await.unwrap(), format!("{} true", proxy.addr));

    proxy.shutdown.trigger();
}

#[tokio::test]
async fn test_loose_prefix_without_trailing_slash() {
    let backend = common::start_mock_backend().await;
    let mut svc = route("svc", "svc", backend);
    svc.append_trailing_slash = Some(FlagValue::Text("false".into()));
    let proxy = common::start_proxy(config(vec![svc])).await;
    let client = common::client();

    let res = client
        .get(format!("http://{}/svcx", proxy.addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.text().await.unwrap(), "/x");

    proxy.shutdown.trigger();
}

#[tokio::test]
async fn test_upstream_failure_is_bad_gateway() {
    // Reserve a port, then free it so nothing listens there
    let closed = {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };
    let proxy = common::start_proxy(config(vec![route("dead", "dead", closed)])).await;
    let client = common::client();

    let res = client
        .get(format!("http://{}/dead/x", proxy.addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 502);

    proxy.shutdown.trigger();
}

#[tokio::test]
async fn test_reload_replaces_routing_table() {
    let backend = common::start_mock_backend().await;
    let proxy = common::start_proxy(config(vec![route("backend", "backend", backend)])).await;
    let client = common::client();

    proxy
        .config_updates
        .send(config(vec![route("api", "api", backend)]))
        .unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    let table = proxy.routes.load();
    assert_eq!(table.len(), 1);
    assert_eq!(table.routes()[0].name(), "api");
    drop(table);

    let res = client
        .get(format!("http://{}/api/x", proxy.addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.text().await.unwrap(), "/x");

    let res = client
        .get(format!("http://{}/backend/x", proxy.addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);

    proxy.shutdown.trigger();
}

#[tokio::test]
async fn test_rejected_reload_keeps_routing_table() {
    let backend = common::start_mock_backend().await;
    let proxy = common::start_proxy(config(vec![route("backend", "backend", backend)])).await;
    let client = common::client();

    let mut broken = route("api", "api", backend);
    broken.server = "not a server".into();
    proxy.config_updates.send(config(vec![broken])).unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    let table = proxy.routes.load();
    assert_eq!(table.routes()[0].name(), "backend");
    drop(table);

    let res = client
        .get(format!("http://{}/backend/x", proxy.addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), "/x");

    let res = client
        .get(format!("http://{}/api/x", proxy.addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);

    proxy.shutdown.trigger();
}
