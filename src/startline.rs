//! Request-line and status-line parsing (spec §4.2).

use bytes::Bytes;

use crate::error::{truncate_for_diagnostic, ErrorCode, HttpDecodeError};

/// HTTP protocol version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpVersion {
    /// HTTP/1.0
    Http10,
    /// HTTP/1.1
    Http11,
}

impl HttpVersion {
    /// Parse a version token (e.g. `b"HTTP/1.1"`), case-insensitively.
    pub fn parse(bytes: &[u8]) -> Result<Self, HttpDecodeError> {
        if bytes.eq_ignore_ascii_case(b"HTTP/1.1") {
            Ok(Self::Http11)
        } else if bytes.eq_ignore_ascii_case(b"HTTP/1.0") {
            Ok(Self::Http10)
        } else {
            Err(HttpDecodeError::new(
                ErrorCode::UnsupportedHttpVersion,
                format!(
                    "unsupported HTTP version '{}'",
                    truncate_for_diagnostic(&String::from_utf8_lossy(bytes))
                ),
            ))
        }
    }

    /// The canonical wire representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Http10 => "HTTP/1.0",
            Self::Http11 => "HTTP/1.1",
        }
    }
}

impl std::fmt::Display for HttpVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed HTTP request line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    /// The method, upper-cased for matching.
    pub method: String,
    /// The request target, exactly as it appeared on the wire.
    pub path: Bytes,
    /// The protocol version.
    pub version: HttpVersion,
    /// The original, unmodified line bytes (without the CRLF).
    pub raw: Bytes,
}

/// A parsed HTTP status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseLine {
    /// The protocol version.
    pub version: HttpVersion,
    /// The three-digit status code, in `[100, 599]`.
    pub status: u16,
    /// The reason phrase — taken from the wire, or a well-known default.
    pub reason: String,
    /// The original, unmodified line bytes (without the CRLF).
    pub raw: Bytes,
}

/// Either half of the tagged start-line variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartLine {
    Request(RequestLine),
    Response(ResponseLine),
}

/// Split `line` on ASCII spaces into trimmed, non-empty tokens.
fn split_ws(line: &[u8]) -> Vec<&[u8]> {
    line.split(|&b| b == b' ')
        .filter(|tok| !tok.is_empty())
        .collect()
}

/// Parse a request line: `METHOD SP request-target SP HTTP-version`.
///
/// Tolerates repeated spaces between tokens and leading/trailing
/// whitespace on the line as a whole. The request target must not
/// itself contain embedded whitespace (the token split already enforces
/// this by construction).
pub fn parse_request_line(raw: &Bytes) -> Result<RequestLine, HttpDecodeError> {
    let trimmed = trim_ascii_ws(raw);
    let tokens = split_ws(trimmed);

    if tokens.len() != 3 {
        return Err(HttpDecodeError::new(
            ErrorCode::InvalidStartLine,
            format!(
                "expected 'METHOD target VERSION', found {} token(s): '{}'",
                tokens.len(),
                truncate_for_diagnostic(&String::from_utf8_lossy(trimmed))
            ),
        ));
    }

    let method_bytes = tokens[0];
    let path_bytes = tokens[1];
    let version_bytes = tokens[2];

    if !method_bytes.iter().all(|&b| b.is_ascii_graphic()) {
        return Err(HttpDecodeError::new(
            ErrorCode::InvalidStartLine,
            "method contains non-printable bytes".to_string(),
        ));
    }

    let method = String::from_utf8_lossy(method_bytes)
        .to_ascii_uppercase();
    let version = HttpVersion::parse(version_bytes)?;

    Ok(RequestLine {
        method,
        path: Bytes::copy_from_slice(path_bytes),
        version,
        raw: raw.clone(),
    })
}

/// Parse a status line: `HTTP-version SP status-code [SP reason-phrase]`.
pub fn parse_response_line(raw: &Bytes) -> Result<ResponseLine, HttpDecodeError> {
    let trimmed = trim_ascii_ws(raw);

    if trimmed.len() < 5 || !trimmed[..5].eq_ignore_ascii_case(b"HTTP/") {
        return Err(HttpDecodeError::new(
            ErrorCode::InvalidStartLine,
            format!(
                "status line does not start with 'HTTP/': '{}'",
                truncate_for_diagnostic(&String::from_utf8_lossy(trimmed))
            ),
        ));
    }

    // Split at the first run of whitespace after the version token.
    let after_scheme = trimmed;
    let version_end = after_scheme
        .iter()
        .position(|&b| b == b' ')
        .ok_or_else(|| {
            HttpDecodeError::new(
                ErrorCode::InvalidStartLine,
                "status line missing status code".to_string(),
            )
        })?;

    let version = HttpVersion::parse(&after_scheme[..version_end])?;

    let rest = trim_ascii_ws_leading(&after_scheme[version_end..]);
    let code_end = rest
        .iter()
        .position(|&b| b == b' ')
        .unwrap_or(rest.len());
    let code_bytes = &rest[..code_end];

    if code_bytes.len() != 3 || !code_bytes.iter().all(u8::is_ascii_digit) {
        return Err(HttpDecodeError::new(
            ErrorCode::InvalidStatusCode,
            format!(
                "status code must be exactly three digits, found '{}'",
                truncate_for_diagnostic(&String::from_utf8_lossy(code_bytes))
            ),
        ));
    }

    let status: u16 = std::str::from_utf8(code_bytes)
        .unwrap()
        .parse()
        .map_err(|_| {
            HttpDecodeError::new(
                ErrorCode::InvalidStatusCode,
                format!(
                    "status code is not a valid integer: '{}'",
                    String::from_utf8_lossy(code_bytes)
                ),
            )
        })?;

    if !(100..=599).contains(&status) {
        return Err(HttpDecodeError::new(
            ErrorCode::InvalidStatusCode,
            format!("status code {status} is outside the valid range [100, 599]"),
        ));
    }

    let reason_bytes = trim_ascii_ws_leading(&rest[code_end..]);
    let reason = if reason_bytes.is_empty() {
        default_reason_phrase(status).to_string()
    } else {
        String::from_utf8_lossy(reason_bytes).into_owned()
    };

    Ok(ResponseLine {
        version,
        status,
        reason,
        raw: raw.clone(),
    })
}

fn trim_ascii_ws(data: &[u8]) -> &[u8] {
    let start = data.iter().position(|&b| b != b' ' && b != b'\t').unwrap_or(data.len());
    let data = &data[start..];
    let end = data
        .iter()
        .rposition(|&b| b != b' ' && b != b'\t')
        .map_or(0, |p| p + 1);
    &data[..end]
}

fn trim_ascii_ws_leading(data: &[u8]) -> &[u8] {
    let start = data.iter().position(|&b| b != b' ' && b != b'\t').unwrap_or(data.len());
    &data[start..]
}

/// Well-known reason phrases for common status codes, with `"Unknown"` as
/// the default for any code not in this table.
pub fn default_reason_phrase(status: u16) -> &'static str {
    match status {
        100 => "Continue",
        101 => "Switching Protocols",
        200 => "OK",
        201 => "Created",
        202 => "Accepted",
        204 => "No Content",
        206 => "Partial Content",
        301 => "Moved Permanently",
        302 => "Found",
        303 => "See Other",
        304 => "Not Modified",
        307 => "Temporary Redirect",
        308 => "Permanent Redirect",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        406 => "Not Acceptable",
        408 => "Request Timeout",
        409 => "Conflict",
        410 => "Gone",
        411 => "Length Required",
        413 => "Payload Too Large",
        414 => "URI Too Long",
        415 => "Unsupported Media Type",
        418 => "I'm a teapot",
        422 => "Unprocessable Entity",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        501 => "Not Implemented",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        505 => "HTTP Version Not Supported",
        _ => "Unknown",
    }
}
