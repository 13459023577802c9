//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (host, path, headers)
//!     → router.rs (route lookup)
//!     → rule.rs / directory.rs (evaluate match conditions)
//!     → Return: matched Route or no match
//!
//! Matched Route:
//!     rule.process(path)  → path forwarded to the backend
//!     rule.revert(path)   → backend-authored path restored for the client
//!
//! Route Compilation (at startup and on reload):
//!     RouteConfig[]
//!     → Build rules (host, directory, composite)
//!     → Sort by priority
//!     → Freeze as immutable Router
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in hot path (prefix matching only)
//! - Deterministic: same input always matches same route
//! - First match wins (ordered by priority)

pub mod directory;
pub mod error;
pub mod router;
pub mod rule;

pub use directory::{DirectoryRule, DirectoryRuleBuilder};
pub use error::{RuleError, RuleResult};
pub use router::{Route, RouteError, Router};
pub use rule::{AcceptEverythingRule, CompositeRule, HostRule, Rule};
