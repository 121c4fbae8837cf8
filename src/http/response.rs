//! Raw response construction and rewriting.
//!
//! # Responsibilities
//! - Build HTTP/1.1 responses by hand (status line, headers, body)
//! - Split a buffered upstream response into head and body
//! - Rewrite `Content-Length` / `Content-Type` after the body is replaced
//!
//! # Design Decisions
//! - Header lines other than the two rewritten ones keep their bytes and order
//! - Status reasons come from `http::StatusCode` so status lines stay canonical

use http::StatusCode;

use crate::http::find_subsequence;

/// Blank line separating the header section from the body.
pub const HEAD_DELIMITER: &[u8] = b"\r\n\r\n";

/// `HTTP/1.1 <code> <reason>`.
pub fn status_line(status: StatusCode) -> String {
    format!(
        "HTTP/1.1 {} {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("")
    )
}

/// A response assembled from parts and serialized in one buffer.
#[derive(Debug, Clone)]
pub struct RawResponse {
    status: StatusCode,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Set the body and an accurate `Content-Length`.
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Serialize. `Content-Length` is always emitted last among headers.
    pub fn into_bytes(self) -> Vec<u8> {
        let mut head = status_line(self.status);
        head.push_str("\r\n");
        for (name, value) in &self.headers {
            head.push_str(name);
            head.push_str(": ");
            head.push_str(value);
            head.push_str("\r\n");
        }
        head.push_str(&format!("Content-Length: {}\r\n", self.body.len()));
        head.push_str("\r\n");

        let mut out = head.into_bytes();
        out.extend_from_slice(&self.body);
        out
    }
}

/// `200 OK` carrying `body` typed as `content_type`.
pub fn ok(content_type: &str, body: impl Into<Vec<u8>>) -> Vec<u8> {
    RawResponse::new(StatusCode::OK)
        .header("Content-Type", content_type)
        .body(body)
        .into_bytes()
}

pub fn not_found() -> Vec<u8> {
    RawResponse::new(StatusCode::NOT_FOUND)
        .body("No memes available.")
        .into_bytes()
}

pub fn internal_error() -> Vec<u8> {
    RawResponse::new(StatusCode::INTERNAL_SERVER_ERROR).into_bytes()
}

pub fn bad_gateway() -> Vec<u8> {
    RawResponse::new(StatusCode::BAD_GATEWAY).into_bytes()
}

/// Split at the first blank-line delimiter. `None` when there is none.
pub fn split_head_body(response: &[u8]) -> Option<(&[u8], &[u8])> {
    let end = find_subsequence(response, HEAD_DELIMITER)?;
    Some((&response[..end], &response[end + HEAD_DELIMITER.len()..]))
}

/// MIME type for an encoder format name; `None` for unrecognized formats.
pub fn content_type_for_format(format: &str) -> Option<&'static str> {
    match format.to_ascii_lowercase().as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

fn header_is(line: &[u8], name: &str) -> bool {
    line.len() > name.len()
        && line[..name.len()].eq_ignore_ascii_case(name.as_bytes())
        && line[name.len()] == b':'
}

/// Rewrite `head` (status line + header lines, without the trailing blank line)
/// for a replacement body of `body_len` bytes encoded as `format`.
///
/// `Content-Length` lines are replaced; `Content-Type` lines are replaced when
/// `format` is recognized, else left untouched. Missing headers are appended.
pub fn rewrite_headers(head: &[u8], body_len: usize, format: &str) -> Vec<u8> {
    let new_type = content_type_for_format(format);
    let new_length = format!("Content-Length: {}", body_len);

    let mut lines: Vec<Vec<u8>> = Vec::new();
    let mut saw_length = false;
    let mut saw_type = false;

    for line in split_lines(head) {
        if header_is(line, "content-length") {
            saw_length = true;
            lines.push(new_length.as_bytes().to_vec());
        } else if header_is(line, "content-type") {
            saw_type = true;
            match new_type {
                Some(mime) => lines.push(format!("Content-Type: {}", mime).into_bytes()),
                None => lines.push(line.to_vec()),
            }
        } else {
            lines.push(line.to_vec());
        }
    }

    if !saw_length {
        lines.push(new_length.into_bytes());
    }
    if let (false, Some(mime)) = (saw_type, new_type) {
        lines.push(format!("Content-Type: {}", mime).into_bytes());
    }

    lines.join(&b"\r\n"[..])
}

fn split_lines(head: &[u8]) -> impl Iterator<Item = &[u8]> {
    let mut rest = Some(head);
    std::iter::from_fn(move || {
        let current = rest?;
        match find_subsequence(current, b"\r\n") {
            Some(i) => {
                rest = Some(&current[i + 2..]);
                Some(&current[..i])
            }
            None => {
                rest = None;
                Some(current)
            }
        }
    })
}

/// Rewritten head + delimiter + new body, ready for a single write.
pub fn assemble(head: &[u8], body: &[u8], format: &str) -> Vec<u8> {
    let mut out = rewrite_headers(head, body.len(), format);
    out.extend_from_slice(HEAD_DELIMITER);
    out.extend_from_slice(body);
    out
}
