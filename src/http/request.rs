//! Request-line parsing.
//!
//! # Responsibilities
//! - Split the first line of the raw request into method and target
//! - Resolve absolute-form targets (proxy style) into host, port, path
//! - Keep the raw bytes untouched for verbatim forwarding
//!
//! # Design Decisions
//! - Only the first line is inspected; headers are forwarded as-is
//! - Origin-form targets (`/path`) carry no host
//! - Port defaults to 80 regardless of scheme (no TLS interception); an explicit port is always kept
//! - The path is taken from the raw target, so dot segments are not resolved before routing

use bytes::Bytes;
use thiserror::Error;
use url::Url;

use crate::http::find_subsequence;

/// Maximum bytes taken from the client's first read.
pub const MAX_REQUEST_BYTES: usize = 4096;

pub const DEFAULT_PORT: u16 = 80;

/// Why a request line could not be used.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("request line has fewer than two tokens")]
    TooFewTokens,

    #[error("request target is not valid UTF-8")]
    InvalidTarget,
}

/// Immutable view of a client request.
#[derive(Debug, Clone)]
pub struct ProxyRequest {
    raw: Bytes,
    method: String,
    target: String,
    host: Option<String>,
    port: u16,
    path: String,
}

impl ProxyRequest {
    /// Parse the request line of `raw`.
    pub fn parse(raw: Bytes) -> Result<Self, RequestError> {
        let line_end = find_subsequence(&raw, b"\r\n").unwrap_or(raw.len());
        let first_line = &raw[..line_end];

        let mut tokens = first_line.split(|b| *b == b' ');
        let (method, target) = match (tokens.next(), tokens.next()) {
            (Some(method), Some(target)) => (method, target),
            _ => return Err(RequestError::TooFewTokens),
        };

        let method = String::from_utf8_lossy(method).into_owned();
        let target = std::str::from_utf8(target)
            .map_err(|_| RequestError::InvalidTarget)?
            .to_string();

        let (host, port, path) = resolve_target(&target);

        Ok(Self {
            raw,
            method,
            target,
            host,
            port,
            path,
        })
    }

    /// The bytes exactly as received from the client.
    pub fn raw(&self) -> &Bytes {
        &self.raw
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Lowercased hostname, when the target is absolute.
    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Path plus `?query` when present.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// `host:port` for dialing upstream.
    pub fn authority(&self) -> Option<String> {
        self.host.as_ref().map(|h| {
            if h.contains(':') {
                format!("[{}]:{}", h, self.port)
            } else {
                format!("{}:{}", h, self.port)
            }
        })
    }
}

fn resolve_target(target: &str) -> (Option<String>, u16, String) {
    match Url::parse(target) {
        Ok(url) => {
            let host = url
                .host_str()
                .filter(|h| !h.is_empty())
                .map(|h| h.trim_start_matches('[').trim_end_matches(']').to_ascii_lowercase());
            let (authority, rest) = split_authority(target);
            // `Url::port` hides an explicit port that equals the scheme default.
            let port = url
                .port()
                .or_else(|| url.port_or_known_default().filter(|p| has_explicit_port(authority, *p)))
                .unwrap_or(DEFAULT_PORT);
            (host, port, origin_form_path(rest))
        }
        Err(_) => (None, DEFAULT_PORT, origin_form_path(target)),
    }
}

/// Split an absolute target after `scheme://` into the raw authority and the
/// unnormalized remainder (path, query, fragment).
fn split_authority(target: &str) -> (&str, &str) {
    let after_scheme = target.split_once("://").map_or(target, |(_, rest)| rest);
    let end = after_scheme.find(['/', '?', '#']).unwrap_or(after_scheme.len());
    after_scheme.split_at(end)
}

fn has_explicit_port(authority: &str, port: u16) -> bool {
    authority
        .rsplit_once(':')
        .is_some_and(|(_, p)| p == port.to_string())
}

fn origin_form_path(target: &str) -> String {
    let target = target.split('#').next().unwrap_or_default();
    let (path, query) = target.split_once('?').unwrap_or((target, ""));
    let path = if path.is_empty() { "/" } else { path };
    if query.is_empty() {
        path.to_string()
    } else {
        format!("{}?{}", path, query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(raw: &'static [u8]) -> Result<ProxyRequest, RequestError> {
        ProxyRequest::parse(Bytes::from_static(raw))
    }

    #[test]
    fn absolute_target() {
        let req = parse(b"GET http://Example.com:8081/foo?x=1 HTTP/1.1\r\nHost: example.com\r\n\r\n").unwrap();
        assert_eq!(req.method(), "GET");
        assert_eq!(req.target(), "http://Example.com:8081/foo?x=1");
        assert_eq!(req.host(), Some("example.com"));
        assert_eq!(req.port(), 8081);
        assert_eq!(req.path(), "/foo?x=1");
        assert_eq!(req.authority().as_deref(), Some("example.com:8081"));
    }

    #[test]
    fn absolute_target_defaults() {
        let req = parse(b"GET http://example.com HTTP/1.1\r\n\r\n").unwrap();
        assert_eq!(req.port(), 80);
        assert_eq!(req.path(), "/");
    }

    #[test]
    fn explicit_default_port_is_kept() {
        let req = parse(b"GET https://example.com:443/image HTTP/1.1\r\n\r\n").unwrap();
        assert_eq!(req.port(), 443);
        assert_eq!(req.authority().as_deref(), Some("example.com:443"));

        let req = parse(b"GET http://example.com:80/ HTTP/1.1\r\n\r\n").unwrap();
        assert_eq!(req.port(), 80);
    }

    #[test]
    fn https_without_port_still_dials_80() {
        let req = parse(b"GET https://example.com/ HTTP/1.1\r\n\r\n").unwrap();
        assert_eq!(req.port(), 80);
    }

    #[test]
    fn dot_segments_are_not_resolved() {
        let req = parse(b"GET http://example.com/a/../image.png HTTP/1.1\r\n\r\n").unwrap();
        assert_eq!(req.path(), "/a/../image.png");
    }

    #[test]
    fn query_without_path_gets_root() {
        let req = parse(b"GET http://example.com?q=1#frag HTTP/1.1\r\n\r\n").unwrap();
        assert_eq!(req.path(), "/?q=1");
    }

    #[test]
    fn origin_form_has_no_host() {
        let req = parse(b"GET /image/cat.png?size=2 HTTP/1.1\r\n\r\n").unwrap();
        assert_eq!(req.host(), None);
        assert_eq!(req.path(), "/image/cat.png?size=2");
        assert_eq!(req.authority(), None);
    }

    #[test]
    fn too_few_tokens_is_malformed() {
        assert_eq!(parse(b"GARBAGE\r\n\r\n").unwrap_err(), RequestError::TooFewTokens);
        assert_eq!(parse(b"").unwrap_err(), RequestError::TooFewTokens);
    }

    #[test]
    fn two_tokens_are_enough() {
        let req = parse(b"GET /image").unwrap();
        assert_eq!(req.path(), "/image");
    }

    #[test]
    fn non_utf8_target_is_malformed() {
        assert_eq!(
            parse(b"GET /\xff\xfe HTTP/1.1\r\n\r\n").unwrap_err(),
            RequestError::InvalidTarget
        );
    }

    #[test]
    fn ipv6_authority_is_bracketed() {
        let req = parse(b"GET http://[::1]:9000/ HTTP/1.1\r\n\r\n").unwrap();
        assert_eq!(req.host(), Some("::1"));
        assert_eq!(req.authority().as_deref(), Some("[::1]:9000"));
    }

    #[test]
    fn raw_bytes_are_preserved() {
        let raw: &[u8] = b"POST http://a.test/x HTTP/1.1\r\nContent-Length: 2\r\n\r\nhi";
        let req = ProxyRequest::parse(Bytes::from_static(raw)).unwrap();
        assert_eq!(req.raw().as_ref(), raw);
    }
}
