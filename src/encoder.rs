//! Message encoding — the reverse direction of [`crate::decoder`] (spec §4.7).

use bytes::{BufMut, Bytes, BytesMut};

use crate::config::{EncoderConfig, HOP_BY_HOP_HEADERS};
use crate::startline::HttpVersion;

/// How the body of an outgoing message will be framed on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutboundBody {
    /// No body; no framing header is emitted.
    None,
    /// A body of a known, fixed length; a `Content-Length` header is added.
    FixedLength(usize),
    /// A body sent as a series of chunks; a `Transfer-Encoding: chunked`
    /// header is added. Use [`Encoder::encode_chunk`] and
    /// [`Encoder::encode_last_chunk`] to produce the body itself.
    Chunked,
}

/// Encodes HTTP/1.x request and response heads and chunked body framing.
///
/// Holds no per-message state — construct once and reuse across messages.
#[derive(Debug, Clone, Default)]
pub struct Encoder {
    config: EncoderConfig,
}

impl Encoder {
    /// Build an encoder with the given configuration.
    pub fn new(config: EncoderConfig) -> Self {
        Self { config }
    }

    /// Encode a full request head: request line, normalized headers (with
    /// hop-by-hop headers stripped and the framing header applied), and the
    /// terminating blank line. The returned bytes do not include any body.
    pub fn encode_request_head(
        &self,
        method: &str,
        target: &str,
        version: HttpVersion,
        headers: &[(String, String)],
        body: OutboundBody,
    ) -> Bytes {
        let mut buf = BytesMut::new();
        buf.put_slice(method.as_bytes());
        buf.put_u8(b' ');
        buf.put_slice(target.as_bytes());
        buf.put_u8(b' ');
        buf.put_slice(version.as_str().as_bytes());
        buf.put_slice(b"\r\n");
        self.write_headers(&mut buf, headers, body);
        buf.put_slice(b"\r\n");
        buf.freeze()
    }

    /// Encode a full response head: status line, normalized headers, and the
    /// terminating blank line.
    pub fn encode_response_head(
        &self,
        version: HttpVersion,
        status: u16,
        reason: &str,
        headers: &[(String, String)],
        body: OutboundBody,
    ) -> Bytes {
        let mut buf = BytesMut::new();
        buf.put_slice(version.as_str().as_bytes());
        buf.put_u8(b' ');
        buf.put_slice(status.to_string().as_bytes());
        buf.put_u8(b' ');
        buf.put_slice(reason.as_bytes());
        buf.put_slice(b"\r\n");
        self.write_headers(&mut buf, headers, body);
        buf.put_slice(b"\r\n");
        buf.freeze()
    }

    fn write_headers(&self, buf: &mut BytesMut, headers: &[(String, String)], body: OutboundBody) {
        for (name, value) in headers {
            if HOP_BY_HOP_HEADERS.contains(&name.to_ascii_lowercase().as_str()) {
                continue;
            }
            buf.put_slice(name.as_bytes());
            buf.put_slice(b": ");
            buf.put_slice(value.as_bytes());
            buf.put_slice(b"\r\n");
        }

        match body {
            OutboundBody::None => {}
            OutboundBody::FixedLength(len) => {
                buf.put_slice(b"Content-Length: ");
                buf.put_slice(len.to_string().as_bytes());
                buf.put_slice(b"\r\n");
            }
            OutboundBody::Chunked => {
                buf.put_slice(b"Transfer-Encoding: chunked\r\n");
            }
        }
    }

    /// Segment `data` into one or more wire-format chunks, each no larger
    /// than the configured chunk size.
    pub fn encode_chunked_body(&self, data: &[u8]) -> Bytes {
        if data.is_empty() {
            return self.encode_chunk(data);
        }
        let mut buf = BytesMut::new();
        for piece in data.chunks(self.config.chunk_size.max(1)) {
            buf.extend_from_slice(&self.encode_chunk(piece));
        }
        buf.freeze()
    }

    /// Encode a single chunk: size line (hex), CRLF, data, CRLF. An empty
    /// `data` produces a zero-size chunk, which is *not* the same as the
    /// terminal chunk (that still needs [`Encoder::encode_last_chunk`]).
    pub fn encode_chunk(&self, data: &[u8]) -> Bytes {
        let mut buf = BytesMut::new();
        buf.put_slice(format!("{:x}", data.len()).as_bytes());
        buf.put_slice(b"\r\n");
        buf.put_slice(data);
        buf.put_slice(b"\r\n");
        buf.freeze()
    }

    /// Encode the terminal zero-size chunk, followed by any trailer fields
    /// and the terminating blank line.
    pub fn encode_last_chunk(&self, trailers: &[(String, String)]) -> Bytes {
        let mut buf = BytesMut::new();
        buf.put_slice(b"0\r\n");
        for (name, value) in trailers {
            buf.put_slice(name.as_bytes());
            buf.put_slice(b": ");
            buf.put_slice(value.as_bytes());
            buf.put_slice(b"\r\n");
        }
        buf.put_slice(b"\r\n");
        buf.freeze()
    }
}
