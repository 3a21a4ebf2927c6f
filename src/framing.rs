//! Body-framing determination (spec §4.6).
//!
//! Decides, from a message's headers and context, how its body is delimited
//! on the wire: `Transfer-Encoding: chunked`, a `Content-Length`, an
//! upgrade/no-body case, or (for responses only) closing the connection.

use crate::error::{ErrorCode, HttpDecodeError};
use crate::headers::HeaderMap;
use crate::startline::HttpVersion;

/// How a message's body is delimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyStrategy {
    /// `Transfer-Encoding: chunked` is present and is the final coding.
    Chunked,
    /// A single, valid `Content-Length` gives the exact body size.
    FixedLength(u64),
    /// No body is present (e.g. no framing header on a request).
    None,
    /// The body runs until the connection closes (responses only).
    CloseDelimited,
    /// A `101 Switching Protocols` response; bytes after it are opaque.
    Upgrade,
}

/// The role of the message being framed, since framing rules differ between
/// requests and responses (RFC 9112 §6.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageRole {
    Request,
    Response { status: u16 },
}

/// Determine the body-framing strategy for a message, given its headers.
///
/// `method_allows_no_body_default` signals whether, absent any framing
/// header, this message has no body by default (true for requests; for
/// responses it depends on the request method and status, which the caller
/// resolves before calling this with `no_body_by_rule = true`).
pub fn determine_body_strategy(
    headers: &HeaderMap,
    role: MessageRole,
    no_body_by_rule: bool,
    _version: HttpVersion,
) -> Result<BodyStrategy, HttpDecodeError> {
    if let MessageRole::Response { status } = role {
        if status == 101 {
            return Ok(BodyStrategy::Upgrade);
        }
        if no_body_by_rule {
            return Ok(BodyStrategy::None);
        }
    }

    let transfer_encoding = headers.get_all("transfer-encoding");
    let content_length = headers.get_all("content-length");

    if transfer_encoding.len() > 1 {
        return Err(HttpDecodeError::new(
            ErrorCode::InvalidSyntax,
            "multiple Transfer-Encoding headers".to_string(),
        ));
    }

    if !transfer_encoding.is_empty() {
        if !content_length.is_empty() {
            return Err(HttpDecodeError::new(
                ErrorCode::InvalidSyntax,
                "message has both Content-Length with Transfer-Encoding".to_string(),
            ));
        }

        let final_coding = transfer_encoding
            .last()
            .map(|s| s.trim().to_ascii_lowercase())
            .unwrap_or_default();

        if final_coding != "chunked" {
            return Err(HttpDecodeError::new(
                ErrorCode::UnsupportedFeature,
                format!("unsupported transfer-coding '{final_coding}'"),
            ));
        }

        return Ok(BodyStrategy::Chunked);
    }

    if !content_length.is_empty() {
        if content_length.len() > 1 {
            return Err(HttpDecodeError::new(
                ErrorCode::InvalidSyntax,
                "multiple Content-Length headers".to_string(),
            ));
        }

        let value = content_length[0].trim();
        let is_well_formed = !value.is_empty()
            && value.bytes().all(|b| b.is_ascii_digit())
            && (value.len() == 1 || !value.starts_with('0'));
        if !is_well_formed {
            return Err(HttpDecodeError::new(
                ErrorCode::InvalidSyntax,
                format!("Content-Length is not a valid non-negative integer: '{value}'"),
            ));
        }

        let length: u64 = value.parse().map_err(|_| {
            HttpDecodeError::new(
                ErrorCode::MessageTooLarge,
                format!("Content-Length exceeds the representable message size: '{value}'"),
            )
        })?;

        return Ok(BodyStrategy::FixedLength(length));
    }

    match role {
        MessageRole::Request => Ok(BodyStrategy::None),
        MessageRole::Response { .. } => Ok(BodyStrategy::CloseDelimited),
    }
}
