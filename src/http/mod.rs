//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (accept loop, one task per connection)
//!     → request.rs (first read, request-line parse)
//!     → [routing layer picks a handler]
//!     → response.rs (build or rewrite raw HTTP/1.1 bytes)
//!     → Send to client, close
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{ProxyRequest, RequestError, MAX_REQUEST_BYTES};
pub use response::RawResponse;
pub use server::{handle_connection, AppState, ProxyServer};

/// Position of the first occurrence of `needle` in `haystack`.
pub(crate) fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}
