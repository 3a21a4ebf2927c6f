//! Events emitted incrementally by [`crate::decoder::MessageDecoder`] (spec §3).

use bytes::Bytes;

use crate::headers::HeaderMap;
use crate::startline::StartLine;

/// One unit of progress reported by a decoder's `feed` call.
///
/// A single `feed` call may produce zero, one, or many events, depending on
/// how much of the message the newly fed bytes complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The start line (request- or status-line) has been fully parsed.
    StartLineParsed(StartLine),
    /// A single header field has been parsed; its name/value are in
    /// original casing, before any folding of repeated names.
    HeaderLine { name: String, value: String },
    /// The header block is complete and headers have been folded into a
    /// single [`HeaderMap`].
    HeadersComplete(HeaderMap),
    /// A slice of decoded body data is available. For chunked bodies this
    /// may be emitted once per chunk; for fixed-length bodies, once per
    /// `feed` call that produces body bytes.
    BodyData(Bytes),
    /// The body has been fully received. Carries trailers, if the body was
    /// chunked and trailers were sent (empty map otherwise).
    BodyComplete { trailers: HeaderMap },
    /// The entire message — start line, headers, and body — is complete.
    MessageComplete,
}
