//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Parsed request (host, path)
//!     → router.rs (ordered dispatch)
//!     → matcher.rs (evaluate host / path-prefix conditions)
//!     → Return: exactly one Route
//!
//! Router construction (at startup):
//!     trigger host + path prefix + image mode
//!     → Compile matchers
//!     → Freeze as immutable Router
//! ```
//!
//! # Design Decisions
//! - Router built at startup, immutable at runtime
//! - No regex in hot path (prefix matching only)
//! - Deterministic: same input always matches same route
//! - First match wins; forward is the catch-all

pub mod matcher;
pub mod router;

pub use router::{Route, Router};
