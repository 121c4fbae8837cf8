//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Client read / upstream connect / upstream read:
//!     → timeouts.rs (enforce connect and idle deadlines)
//!     → On failure: the connection handler applies its fallback and closes
//! ```
//!
//! # Design Decisions
//! - Every socket operation that can stall has an optional deadline
//! - No retries: requests are forwarded exactly once, byte-for-byte

pub mod timeouts;
