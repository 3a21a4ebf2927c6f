//! Fixed-length body decoding (spec §4.4) — bodies framed by `Content-Length`.

use bytes::{Bytes, BytesMut};

/// Accumulates exactly `total` bytes of body data across successive feeds.
#[derive(Debug, Clone)]
pub struct FixedLengthBodyDecoder {
    total: u64,
    received: u64,
    buffered: BytesMut,
}

/// Outcome of feeding bytes into a [`FixedLengthBodyDecoder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedBodyOutput {
    /// Body bytes newly available from this call.
    pub data: Bytes,
    /// Whether the body has now been fully received.
    pub complete: bool,
}

impl FixedLengthBodyDecoder {
    /// Start a decoder expecting exactly `total` bytes of body.
    pub fn new(total: u64) -> Self {
        Self {
            total,
            received: 0,
            buffered: BytesMut::new(),
        }
    }

    /// The number of bytes still expected.
    pub fn remaining(&self) -> u64 {
        self.total - self.received
    }

    /// Whether the body is already complete (relevant for a zero-length body).
    pub fn is_complete(&self) -> bool {
        self.received >= self.total
    }

    /// Feed `data`, consuming at most [`FixedLengthBodyDecoder::remaining`]
    /// bytes from its front. Returns the body bytes consumed and whether the
    /// body is now complete; any bytes beyond `total` are left untouched in
    /// `data` for the caller to treat as trailing input (e.g. the next
    /// pipelined message).
    pub fn feed<'a>(&mut self, data: &'a [u8]) -> (FixedBodyOutput, &'a [u8]) {
        let remaining = self.remaining() as usize;
        let take = remaining.min(data.len());
        self.buffered.extend_from_slice(&data[..take]);
        self.received += take as u64;

        let output = FixedBodyOutput {
            data: self.buffered.split().freeze(),
            complete: self.is_complete(),
        };
        (output, &data[take..])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consumes_exactly_the_declared_length() {
        let mut dec = FixedLengthBodyDecoder::new(5);
        let (out, rest) = dec.feed(b"hello world");
        assert_eq!(&out.data[..], b"hello");
        assert!(out.complete);
        assert_eq!(rest, b" world");
    }

    #[test]
    fn accumulates_across_multiple_feeds() {
        let mut dec = FixedLengthBodyDecoder::new(10);
        let (out1, rest1) = dec.feed(b"hello");
        assert_eq!(&out1.data[..], b"hello");
        assert!(!out1.complete);
        assert!(rest1.is_empty());

        let (out2, rest2) = dec.feed(b"world!");
        assert_eq!(&out2.data[..], b"world");
        assert!(out2.complete);
        assert_eq!(rest2, b"!");
    }

    #[test]
    fn zero_length_body_is_immediately_complete() {
        let dec = FixedLengthBodyDecoder::new(0);
        assert!(dec.is_complete());
    }

    #[test]
    fn zero_length_body_leaves_all_input_untouched() {
        let mut dec = FixedLengthBodyDecoder::new(0);
        let (out, rest) = dec.feed(b"next request");
        assert!(out.data.is_empty());
        assert!(out.complete);
        assert_eq!(rest, b"next request");
    }

    #[test]
    fn handles_byte_at_a_time_feeding() {
        let mut dec = FixedLengthBodyDecoder::new(3);
        let mut collected = Vec::new();
        for b in b"abc" {
            let (out, _) = dec.feed(&[*b]);
            collected.extend_from_slice(&out.data);
        }
        assert_eq!(collected, b"abc");
        assert!(dec.is_complete());
    }
}
