//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → routing table picks a route, rule.process rewrites the path
//!     → request.rs (backend URI, forwarded headers)
//!     → backend
//!     → response.rs (rule.revert on Location / Set-Cookie)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::X_REQUEST_ID;
pub use server::{AppState, HttpServer, SharedRoutingTable};
