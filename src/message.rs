//! Fully-decoded message views, assembled from decoder events.
//!
//! These are convenience aggregates for callers (and the CLI) that want a
//! single finished value rather than an event stream; the decoder itself
//! never builds one of these internally.

use bytes::Bytes;
use serde::Serialize;

use crate::decoder::{RequestDecoder, ResponseDecoder};
use crate::error::{ErrorCode, HttpDecodeError};
use crate::event::Event;
use crate::startline::{RequestLine, ResponseLine, StartLine};

/// A single header field in appearance order, as received on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderView {
    pub name: String,
    pub value: String,
}

/// A fully decoded request, assembled from one complete run of a
/// [`RequestDecoder`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodedRequest {
    pub method: String,
    pub target: String,
    pub version: String,
    pub headers: Vec<HeaderView>,
    #[serde(skip)]
    pub body: Bytes,
}

/// A fully decoded response, assembled from one complete run of a
/// [`ResponseDecoder`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodedResponse {
    pub version: String,
    pub status: u16,
    pub reason: String,
    pub headers: Vec<HeaderView>,
    #[serde(skip)]
    pub body: Bytes,
}

/// Decode one complete request from `data` in a single call.
///
/// # Errors
///
/// Returns [`HttpDecodeError`] if the data is malformed or exceeds a
/// configured limit. Returns an [`ErrorCode::InvalidSyntax`] error if `data`
/// does not contain a complete message.
pub fn decode_request(
    data: &[u8],
    config: crate::config::ParserConfig,
) -> Result<DecodedRequest, HttpDecodeError> {
    let mut decoder = RequestDecoder::new(config);
    let events = decoder.feed(data)?;
    if !decoder.is_message_finished() {
        return Err(HttpDecodeError::new(
            ErrorCode::InvalidSyntax,
            "input does not contain a complete request".to_string(),
        ));
    }
    Ok(assemble_request(events))
}

fn assemble_request(events: Vec<Event>) -> DecodedRequest {
    let mut request_line: Option<RequestLine> = None;
    let mut headers = Vec::new();
    let mut body = Vec::new();

    for event in events {
        match event {
            Event::StartLineParsed(StartLine::Request(rl)) => request_line = Some(rl),
            Event::HeaderLine { name, value } => headers.push(HeaderView { name, value }),
            Event::BodyData(data) => body.extend_from_slice(&data),
            _ => {}
        }
    }

    let rl = request_line.expect("request line must precede a finished message");
    DecodedRequest {
        method: rl.method,
        target: String::from_utf8_lossy(&rl.path).into_owned(),
        version: rl.version.as_str().to_string(),
        headers,
        body: Bytes::from(body),
    }
}

/// Decode one complete response from `data` in a single call.
///
/// `request_was_head` must reflect the method of the request this response
/// answers, since that affects body framing.
///
/// # Errors
///
/// Returns [`HttpDecodeError`] under the same conditions as
/// [`decode_request`]. A close-delimited body is finalized automatically,
/// treating the end of `data` as the connection EOF.
pub fn decode_response(
    data: &[u8],
    config: crate::config::ParserConfig,
    request_was_head: bool,
) -> Result<DecodedResponse, HttpDecodeError> {
    let mut decoder = ResponseDecoder::new(config, request_was_head);
    let mut events = decoder.feed(data)?;
    if !decoder.is_message_finished() {
        events.extend(decoder.finish()?);
    }
    if !decoder.is_message_finished() {
        return Err(HttpDecodeError::new(
            ErrorCode::InvalidSyntax,
            "input does not contain a complete response".to_string(),
        ));
    }
    Ok(assemble_response(events))
}

fn assemble_response(events: Vec<Event>) -> DecodedResponse {
    let mut response_line: Option<ResponseLine> = None;
    let mut headers = Vec::new();
    let mut body = Vec::new();

    for event in events {
        match event {
            Event::StartLineParsed(StartLine::Response(sl)) => response_line = Some(sl),
            Event::HeaderLine { name, value } => headers.push(HeaderView { name, value }),
            Event::BodyData(data) => body.extend_from_slice(&data),
            _ => {}
        }
    }

    let sl = response_line.expect("status line must precede a finished message");
    DecodedResponse {
        version: sl.version.as_str().to_string(),
        status: sl.status,
        reason: sl.reason,
        headers,
        body: Bytes::from(body),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParserConfig;

    #[test]
    fn decodes_a_simple_request_in_one_call() {
        let req = decode_request(
            b"GET /hello?x=1 HTTP/1.1\r\nHost: example.com\r\n\r\n",
            ParserConfig::default(),
        )
        .unwrap();
        assert_eq!(req.method, "GET");
        assert_eq!(req.target, "/hello?x=1");
        assert_eq!(req.version, "HTTP/1.1");
        assert_eq!(req.headers.len(), 1);
        assert!(req.body.is_empty());
    }

    #[test]
    fn decode_request_rejects_incomplete_input() {
        let err = decode_request(b"GET / HTTP/1.1\r\n", ParserConfig::default()).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidSyntax);
    }

    #[test]
    fn decodes_a_request_with_a_body() {
        let req = decode_request(
            b"POST /x HTTP/1.1\r\nContent-Length: 4\r\n\r\nabcd",
            ParserConfig::default(),
        )
        .unwrap();
        assert_eq!(&req.body[..], b"abcd");
    }

    #[test]
    fn decodes_a_close_delimited_response() {
        let resp = decode_response(
            b"HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\n\r\nall the bytes",
            ParserConfig::default(),
            false,
        )
        .unwrap();
        assert_eq!(resp.status, 200);
        assert_eq!(&resp.body[..], b"all the bytes");
    }
}
