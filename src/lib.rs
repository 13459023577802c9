//! Directory-prefix routing reverse proxy library.
//!
//! Requests are matched against an ordered table of rules. A matching
//! [`DirectoryRule`](routing::DirectoryRule) strips its directory from the
//! path before the request reaches the backend, and restores it on
//! backend-authored paths such as redirect targets and cookie paths.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::schema::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::{DirectoryRule, Rule, Router};
