//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Compile route configuration into rules
//! - Look up the matching route for a request
//! - Return matched route or explicit no-match
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) rule scan (acceptable for typical route counts)
//! - Higher priority first, config order breaks ties
//! - Explicit no-match rather than silent default

use std::str::FromStr;

use axum::body::Body;
use axum::http::{uri::Authority, Request};
use thiserror::Error;

use crate::config::RouteConfig;
use crate::routing::directory::DirectoryRule;
use crate::routing::error::RuleError;
use crate::routing::rule::{AcceptEverythingRule, CompositeRule, HostRule, Rule};

/// Errors raised while compiling a single route.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("route {route:?}: {source}")]
    Rule {
        route: String,
        #[source]
        source: RuleError,
    },

    #[error("route {route:?}: invalid server address {server:?}")]
    InvalidServer { route: String, server: String },
}

/// A compiled route: a rule plus the backend it forwards to.
#[derive(Debug)]
pub struct Route {
    name: String,
    server: Authority,
    priority: u32,
    rule: Box<dyn Rule>,
}

impl Route {
    pub fn new(name: impl Into<String>, server: Authority, priority: u32, rule: Box<dyn Rule>) -> Self {
        Self {
            name: name.into(),
            server,
            priority,
            rule,
        }
    }

    /// Compile a route from its configuration.
    ///
    /// A `host` yields a [`HostRule`], a `directory` (or a trailing slash
    /// flag) yields a [`DirectoryRule`], both yield a [`CompositeRule`] with
    /// the host checked first, and neither accepts everything.
    pub fn from_config(config: &RouteConfig) -> Result<Self, RouteError> {
        let server = Authority::from_str(&config.server).map_err(|_| RouteError::InvalidServer {
            route: config.name.clone(),
            server: config.server.clone(),
        })?;
        let rule = build_rule(config).map_err(|source| RouteError::Rule {
            route: config.name.clone(),
            source,
        })?;
        Ok(Self::new(config.name.clone(), server, config.priority, rule))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Backend authority (`host:port`) requests are forwarded to.
    pub fn server(&self) -> &Authority {
        &self.server
    }

    pub fn priority(&self) -> u32 {
        self.priority
    }

    pub fn rule(&self) -> &dyn Rule {
        self.rule.as_ref()
    }
}

fn build_rule(config: &RouteConfig) -> Result<Box<dyn Rule>, RuleError> {
    let mut rules: Vec<Box<dyn Rule>> = Vec::new();

    if let Some(host) = &config.host {
        rules.push(Box::new(HostRule::new(host.as_str())));
    }

    if config.directory.is_some() || config.append_trailing_slash.is_some() {
        let mut builder = DirectoryRule::builder().maybe_directory(config.directory.as_deref());
        if let Some(flag) = &config.append_trailing_slash {
            builder = builder.append_trailing_slash(flag.as_setting());
        }
        rules.push(Box::new(builder.build()?));
    }

    Ok(match rules.len() {
        0 => Box::new(AcceptEverythingRule),
        1 => rules.remove(0),
        _ => Box::new(CompositeRule::new(rules)),
    })
}

/// Ordered collection of routes. First match wins.
#[derive(Debug, Default)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    /// Create a router, ordering routes by descending priority.
    pub fn new(mut routes: Vec<Route>) -> Self {
        // Stable sort keeps config order among equal priorities
        routes.sort_by(|a, b| b.priority.cmp(&a.priority));
        Self { routes }
    }

    /// Compile all configured routes.
    pub fn from_config(configs: &[RouteConfig]) -> Result<Self, RouteError> {
        let routes = configs
            .iter()
            .map(Route::from_config)
            .collect::<Result<Vec<_>, _>>()?;
        tracing::info!(routes = routes.len(), "Routing table compiled");
        Ok(Self::new(routes))
    }

    /// Find the first route whose rule matches the request.
    pub fn match_request(&self, req: &Request<Body>) -> Option<&Route> {
        self.routes.iter().find(|route| route.rule.matches(req))
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::FlagValue;

    fn route(name: &str, directory: Option<&str>, priority: u32) -> RouteConfig {
        RouteConfig {
            name: name.into(),
            directory: directory.map(Into::into),
            append_trailing_slash: None,
            host: None,
            server: "127.0.0.1:3000".into(),
            priority,
        }
    }

    fn request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::default()).unwrap()
    }

    fn matched<'a>(router: &'a Router, uri: &str) -> Option<&'a str> {
        router.match_request(&request(uri)).map(Route::name)
    }

    #[test]
    fn test_first_match_wins() {
        let router = Router::from_config(&[
            route("api", Some("api"), 0),
            route("api-v2", Some("api/v2"), 0),
            route("fallback", None, 0),
        ])
        .unwrap();

        assert_eq!(matched(&router, "/api/v2/users"), Some("api"));
        assert_eq!(matched(&router, "/api/users"), Some("api"));
        assert_eq!(matched(&router, "/other"), Some("fallback"));
    }

    #[test]
    fn test_priority_ordering() {
        let router = Router::from_config(&[
            route("api", Some("api"), 0),
            route("api-v2", Some("api/v2"), 10),
        ])
        .unwrap();

        assert_eq!(router.len(), 2);
        assert_eq!(router.routes()[0].name(), "api-v2");
        assert_eq!(router.routes()[0].priority(), 10);
        assert_eq!(router.routes()[1].priority(), 0);
        assert_eq!(matched(&router, "/api/v2/users"), Some("api-v2"));
        assert_eq!(matched(&router, "/api/v1/users"), Some("api"));
    }

    #[test]
    fn test_no_match() {
        let router = Router::from_config(&[route("api", Some("api"), 0)]).unwrap();
        assert_eq!(matched(&router, "/apix"), None);
        let empty = Router::default();
        assert!(empty.is_empty());
        assert!(empty.match_request(&request("/")).is_none());
    }

    #[test]
    fn test_host_and_directory_compose() {
        let mut config = route("scoped", Some("app"), 0);
        config.host = Some("example.com".into());
        let router = Router::from_config(&[config]).unwrap();

        let req = Request::builder()
            .uri("/app/page")
            .header("Host", "example.com")
            .body(Body::default())
            .unwrap();
        let route = router.match_request(&req).unwrap();
        assert_eq!(route.rule().process("/app/page").unwrap(), "/page");
        assert_eq!(route.rule().revert("/page"), "/app/page");

        assert_eq!(matched(&router, "/app/page"), None);
    }

    #[test]
    fn test_trailing_slash_flag_from_config() {
        let mut config = route("svc", Some("svc"), 0);
        config.append_trailing_slash = Some(FlagValue::Bool(false));
        let router = Router::from_config(&[config]).unwrap();
        assert_eq!(matched(&router, "/svcx"), Some("svc"));

        let mut config = route("svc", Some("svc"), 0);
        config.append_trailing_slash = Some(FlagValue::Text("no".into()));
        let router = Router::from_config(&[config]).unwrap();
        assert_eq!(matched(&router, "/svcx"), None);
    }

    #[test]
    fn test_flag_without_directory_is_rejected() {
        let mut config = route("broken", None, 0);
        config.append_trailing_slash = Some(FlagValue::Text("false".into()));
        assert_eq!(
            Route::from_config(&config).unwrap_err(),
            RouteError::Rule {
                route: "broken".into(),
                source: RuleError::MissingDirectory,
            }
        );
    }

    #[test]
    fn test_invalid_server() {
        let mut config = route("api", Some("api"), 0);
        config.server = "not a server".into();
        assert!(matches!(
            Route::from_config(&config),
            Err(RouteError::InvalidServer { .. })
        ));
    }
}
