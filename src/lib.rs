//! # WireFrame
//!
//! An **incremental, streaming HTTP/1.x message decoder and encoder**,
//! implemented as a family of composable state machines, designed for use
//! both as a Rust library and as a CLI tool.
//!
//! WireFrame processes requests and responses incrementally (byte-by-byte
//! or in arbitrarily-sized chunks delivered across however many `feed`
//! calls), making it suitable for both synchronous and asynchronous
//! transports. It follows **RFC 9112** for message syntax and supports
//! chunked transfer encoding, trailers, and close-delimited response bodies.
//!
//! ## Quick start — one-shot decoding
//!
//! ```rust
//! use wireframe::{decode_request, ParserConfig};
//!
//! let raw = b"GET /hello HTTP/1.1\r\nHost: example.com\r\n\r\n";
//! let request = decode_request(raw, ParserConfig::default()).expect("valid request");
//! assert_eq!(request.method, "GET");
//! assert_eq!(request.target, "/hello");
//! ```
//!
//! ## Quick start — incremental decoding
//!
//! ```rust
//! use wireframe::{Event, ParserConfig, RequestDecoder};
//!
//! let mut decoder = RequestDecoder::new(ParserConfig::default());
//!
//! let events = decoder.feed(b"GET / HTTP/1.1\r\n").unwrap();
//! assert!(matches!(events[0], Event::StartLineParsed(_)));
//! assert!(!decoder.is_finished());
//!
//! let events = decoder.feed(b"Host: example.com\r\n\r\n").unwrap();
//! assert!(events.iter().any(|e| matches!(e, Event::MessageComplete)));
//! assert!(decoder.is_finished());
//! ```

mod body;
mod config;
mod decoder;
mod encoder;
mod error;
mod event;
mod framing;
mod headers;
mod line;
mod message;
mod output;
mod startline;

pub use body::chunked::{ChunkedBodyDecoder, ChunkedBodyOutput};
pub use body::fixed::{FixedBodyOutput, FixedLengthBodyDecoder};
pub use config::{EncoderConfig, ParserConfig, HOP_BY_HOP_HEADERS};
pub use decoder::{RequestDecoder, ResponseDecoder};
pub use encoder::{Encoder, OutboundBody};
pub use error::{Disposition, ErrorCategory, ErrorCode, HttpDecodeError};
pub use event::Event;
pub use framing::{determine_body_strategy, BodyStrategy, MessageRole};
pub use headers::{HeaderDecoder, HeaderMap, HeaderValue};
pub use message::{decode_request, decode_response, DecodedRequest, DecodedResponse, HeaderView};
pub use output::{
    format_request_debug, format_request_headers_only, format_request_json, format_response_debug,
    format_response_json,
};
pub use startline::{
    default_reason_phrase, parse_request_line, parse_response_line, HttpVersion, RequestLine,
    ResponseLine, StartLine,
};
