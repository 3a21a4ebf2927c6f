//! Incremental header-block decoding (spec §4.3).

use bytes::{Bytes, BytesMut};

use crate::config::ParserConfig;
use crate::error::{truncate_for_diagnostic, ErrorCode, HttpDecodeError};
use crate::line::{find_line, LineResult};

/// The value(s) associated with a single header name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderValue {
    /// The name appeared exactly once.
    Single(String),
    /// The name appeared more than once; values are kept in appearance order.
    Multi(Vec<String>),
}

impl HeaderValue {
    /// All values for this entry, in appearance order.
    pub fn values(&self) -> Vec<&str> {
        match self {
            Self::Single(v) => vec![v.as_str()],
            Self::Multi(vs) => vs.iter().map(String::as_str).collect(),
        }
    }

    /// The first value, for call sites that only care about one.
    pub fn first(&self) -> &str {
        match self {
            Self::Single(v) => v,
            Self::Multi(vs) => vs.first().map_or("", String::as_str),
        }
    }
}

/// An insertion-ordered, case-insensitive header collection.
///
/// Lookups key on the lowercased header name. Alongside the folded map, a
/// parallel raw log records every header line exactly as it was received
/// (original casing, appearance order, including duplicates).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    entries: Vec<(String, HeaderValue)>,
    pub raw: Vec<(String, String)>,
}

impl HeaderMap {
    /// An empty header map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a header line. `name` must already be lowercased; `original_name`
    /// preserves the casing as received for the raw log.
    fn insert(&mut self, original_name: &str, name: String, value: String) {
        self.raw.push((original_name.to_string(), value.clone()));

        if let Some((_, existing)) = self.entries.iter_mut().find(|(k, _)| *k == name) {
            match existing {
                HeaderValue::Single(prev) => {
                    let prev = std::mem::take(prev);
                    *existing = HeaderValue::Multi(vec![prev, value]);
                }
                HeaderValue::Multi(values) => values.push(value),
            }
        } else {
            self.entries.push((name, HeaderValue::Single(value)));
        }
    }

    /// Look up a header by case-insensitive name.
    pub fn get(&self, name: &str) -> Option<&HeaderValue> {
        let name = name.to_ascii_lowercase();
        self.entries.iter().find(|(k, _)| *k == name).map(|(_, v)| v)
    }

    /// The first value for `name`, if present.
    pub fn get_first(&self, name: &str) -> Option<&str> {
        self.get(name).map(HeaderValue::first)
    }

    /// All values for `name` (empty if absent).
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.get(name).map(HeaderValue::values).unwrap_or_default()
    }

    /// The number of distinct header names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no headers were recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(lowercase name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &HeaderValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Collapse every multi-valued entry into a single value joined with
    /// `sep`, in appearance order. Used for trailer fields, which (unlike
    /// headers) fold duplicates by concatenation rather than keeping an
    /// ordered list.
    pub fn collapse_duplicates(&mut self, sep: &str) {
        for (_, value) in &mut self.entries {
            if let HeaderValue::Multi(values) = value {
                *value = HeaderValue::Single(values.join(sep));
            }
        }
    }
}

/// Decoding phase of a [`HeaderDecoder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderPhase {
    /// Still accumulating header lines.
    Line,
    /// The blank terminating line was seen; the map is final.
    Done,
}

/// Incrementally accumulates a header block across successive byte buffers.
#[derive(Debug, Clone)]
pub struct HeaderDecoder {
    residual: BytesMut,
    map: HeaderMap,
    cumulative_bytes: usize,
    phase: HeaderPhase,
}

/// One freshly parsed header line, returned by [`HeaderDecoder::decode`] for
/// each line consumed in that call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderLine {
    pub name: String,
    pub value: String,
}

/// Outcome of feeding bytes into a [`HeaderDecoder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderDecodeOutput {
    /// Every header line newly consumed during this call.
    pub lines: Vec<HeaderLine>,
    /// Whether the header block is now complete (blank line observed).
    pub done: bool,
}

impl HeaderDecoder {
    /// Start a new, empty header decoder.
    pub fn new() -> Self {
        Self {
            residual: BytesMut::new(),
            map: HeaderMap::new(),
            cumulative_bytes: 0,
            phase: HeaderPhase::Line,
        }
    }

    /// Feed `data` — the unconsumed tail of the current input buffer — into
    /// the decoder. Bytes past the terminating CRLF (belonging to the body)
    /// remain in `data` untouched by this call; callers should re-slice their
    /// own input based on bytes actually consumed, tracked via
    /// [`HeaderDecoder::take_residual_after_done`] once `done` is observed.
    ///
    /// # Panics
    ///
    /// Panics if called again after `done` has already been reported.
    pub fn decode(
        &mut self,
        data: &[u8],
        config: &ParserConfig,
    ) -> Result<HeaderDecodeOutput, HttpDecodeError> {
        assert!(
            self.phase != HeaderPhase::Done,
            "HeaderDecoder::decode called after completion"
        );

        self.residual.extend_from_slice(data);
        let mut lines = Vec::new();

        loop {
            let residual_bytes = Bytes::copy_from_slice(&self.residual);
            match find_line(&residual_bytes, config.max_header_line_bytes)? {
                LineResult::NeedMore => break,
                LineResult::Found { line, consumed } => {
                    let _ = self.residual.split_to(consumed);

                    if line.is_empty() {
                        self.phase = HeaderPhase::Done;
                        return Ok(HeaderDecodeOutput { lines, done: true });
                    }

                    let header_line = self.parse_and_store(&line, config)?;
                    lines.push(header_line);
                }
            }
        }

        Ok(HeaderDecodeOutput { lines, done: false })
    }

    /// Bytes left over after the blank terminating line — the start of the
    /// message body (or the next message, for a headers-only block).
    pub fn take_residual_after_done(&mut self) -> Bytes {
        let bytes = self.residual.split().freeze();
        bytes
    }

    /// The finalized header map. Only meaningful once `done` has been seen.
    pub fn into_map(self) -> HeaderMap {
        self.map
    }

    /// Borrow the header map built so far.
    pub fn map(&self) -> &HeaderMap {
        &self.map
    }

    fn parse_and_store(
        &mut self,
        line: &[u8],
        config: &ParserConfig,
    ) -> Result<HeaderLine, HttpDecodeError> {
        self.cumulative_bytes += line.len();
        if self.cumulative_bytes > config.max_header_bytes {
            return Err(HttpDecodeError::new(
                ErrorCode::HeaderTooLarge,
                format!(
                    "cumulative header bytes exceed maximum of {}",
                    config.max_header_bytes
                ),
            ));
        }

        // Reject obsolete line folding: a continuation line starts with SP/HT.
        if line.first().is_some_and(|&b| b == b' ' || b == b'\t') {
            return Err(HttpDecodeError::new(
                ErrorCode::InvalidHeader,
                "obsolete header line folding is not supported".to_string(),
            ));
        }

        let colon = line.iter().position(|&b| b == b':');
        let colon = match colon {
            Some(0) | None => {
                return Err(HttpDecodeError::new(
                    ErrorCode::InvalidHeader,
                    "header line missing a colon or has an empty name".to_string(),
                ))
            }
            Some(idx) => idx,
        };

        let name_raw = trim_ows(&line[..colon]);
        let value_raw = trim_ows(&line[colon + 1..]);

        if name_raw.is_empty() {
            return Err(HttpDecodeError::new(
                ErrorCode::InvalidHeader,
                "header name is empty after trimming".to_string(),
            ));
        }
        if name_raw.len() > config.max_header_name_bytes {
            return Err(HttpDecodeError::new(
                ErrorCode::HeaderNameTooLarge,
                format!(
                    "header name exceeds maximum of {} bytes",
                    config.max_header_name_bytes
                ),
            ));
        }
        if value_raw.len() > config.max_header_value_bytes {
            return Err(HttpDecodeError::new(
                ErrorCode::HeaderValueTooLarge,
                format!(
                    "header value exceeds maximum of {} bytes",
                    config.max_header_value_bytes
                ),
            ));
        }
        if !name_raw.iter().all(|&b| is_tchar(b)) {
            return Err(HttpDecodeError::new(
                ErrorCode::InvalidHeader,
                format!(
                    "header name contains invalid characters: '{}'",
                    truncate_for_diagnostic(&String::from_utf8_lossy(name_raw))
                ),
            ));
        }

        let original_name = String::from_utf8_lossy(name_raw).into_owned();
        let lowercase_name = original_name.to_ascii_lowercase();
        let value = String::from_utf8_lossy(value_raw).into_owned();

        self.map.insert(&original_name, lowercase_name, value.clone());

        // Count every header *line* received, not distinct names: repeated
        // names fold into one `HeaderValue::Multi` entry and would otherwise
        // never trip this bound no matter how many times they repeat.
        if self.map.raw.len() > config.max_header_count {
            return Err(HttpDecodeError::new(
                ErrorCode::HeaderTooMany,
                format!(
                    "header count exceeds maximum of {}",
                    config.max_header_count
                ),
            ));
        }

        Ok(HeaderLine {
            name: original_name,
            value,
        })
    }
}

impl Default for HeaderDecoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Trim ASCII horizontal whitespace (SP, HTAB) from both ends.
fn trim_ows(data: &[u8]) -> &[u8] {
    let start = data
        .iter()
        .position(|&b| b != b' ' && b != b'\t')
        .unwrap_or(data.len());
    let data = &data[start..];
    let end = data
        .iter()
        .rposition(|&b| b != b' ' && b != b'\t')
        .map_or(0, |p| p + 1);
    &data[..end]
}

/// `tchar` per RFC 9110 §5.6.2 — valid header-name characters.
#[inline]
fn is_tchar(b: u8) -> bool {
    matches!(
        b,
        b'!' | b'#'
            | b'$'
            | b'%'
            | b'&'
            | b'\''
            | b'*'
            | b'+'
            | b'-'
            | b'.'
            | b'^'
            | b'_'
            | b'`'
            | b'|'
            | b'~'
            | b'0'..=b'9'
            | b'a'..=b'z'
            | b'A'..=b'Z'
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> ParserConfig {
        ParserConfig::default()
    }

    #[test]
    fn parses_a_single_header() {
        let mut dec = HeaderDecoder::new();
        let out = dec.decode(b"Host: example.com\r\n\r\n", &cfg()).unwrap();
        assert!(out.done);
        assert_eq!(out.lines.len(), 1);
        assert_eq!(dec.map().get_first("host"), Some("example.com"));
    }

    #[test]
    fn folds_repeated_names_into_multi() {
        let mut dec = HeaderDecoder::new();
        dec.decode(b"Set-Cookie: a=1\r\nSet-Cookie: b=2\r\n\r\n", &cfg())
            .unwrap();
        assert_eq!(dec.map().get_all("set-cookie"), vec!["a=1", "b=2"]);
    }

    #[test]
    fn splits_across_calls() {
        let mut dec = HeaderDecoder::new();
        let out1 = dec.decode(b"Hos", &cfg()).unwrap();
        assert!(!out1.done);
        assert!(out1.lines.is_empty());
        let out2 = dec.decode(b"t: example.com\r\n\r\n", &cfg()).unwrap();
        assert!(out2.done);
        assert_eq!(dec.map().get_first("host"), Some("example.com"));
    }

    #[test]
    fn rejects_missing_colon() {
        let mut dec = HeaderDecoder::new();
        let err = dec.decode(b"NoColonHere\r\n\r\n", &cfg()).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidHeader);
    }

    #[test]
    fn rejects_empty_name() {
        let mut dec = HeaderDecoder::new();
        let err = dec.decode(b": value\r\n\r\n", &cfg()).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidHeader);
    }

    #[test]
    fn rejects_obsolete_line_folding() {
        let mut dec = HeaderDecoder::new();
        dec.decode(b"X-A: one\r\n", &cfg()).unwrap();
        let err = dec.decode(b" continued\r\n\r\n", &cfg()).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidHeader);
    }

    #[test]
    fn enforces_header_count_limit() {
        let mut dec = HeaderDecoder::new();
        let config = ParserConfig {
            max_header_count: 1,
            ..cfg()
        };
        dec.decode(b"A: 1\r\n", &config).unwrap();
        let err = dec.decode(b"B: 2\r\n\r\n", &config).unwrap_err();
        assert_eq!(err.code, ErrorCode::HeaderTooMany);
    }

    #[test]
    fn enforces_header_count_limit_against_repeated_names_too() {
        // A single distinct name repeated many times must still trip the
        // count bound; folding duplicates into one `HeaderValue::Multi`
        // entry must not let them bypass it.
        let mut dec = HeaderDecoder::new();
        let config = ParserConfig {
            max_header_count: 2,
            ..cfg()
        };
        dec.decode(b"X-A: 1\r\nX-A: 2\r\n", &config).unwrap();
        let err = dec.decode(b"X-A: 3\r\n\r\n", &config).unwrap_err();
        assert_eq!(err.code, ErrorCode::HeaderTooMany);
    }

    #[test]
    fn enforces_name_length_limit() {
        let mut dec = HeaderDecoder::new();
        let config = ParserConfig {
            max_header_name_bytes: 2,
            ..cfg()
        };
        let err = dec.decode(b"Long: v\r\n\r\n", &config).unwrap_err();
        assert_eq!(err.code, ErrorCode::HeaderNameTooLarge);
    }

    #[test]
    fn enforces_value_length_limit() {
        let mut dec = HeaderDecoder::new();
        let config = ParserConfig {
            max_header_value_bytes: 2,
            ..cfg()
        };
        let err = dec.decode(b"X: toolong\r\n\r\n", &config).unwrap_err();
        assert_eq!(err.code, ErrorCode::HeaderValueTooLarge);
    }

    #[test]
    fn residual_after_done_is_body_prefix() {
        let mut dec = HeaderDecoder::new();
        dec.decode(b"Host: h\r\n\r\nBODYSTART", &cfg()).unwrap();
        assert_eq!(&dec.take_residual_after_done()[..], b"BODYSTART");
    }

    #[test]
    fn case_folds_name_preserves_raw_casing() {
        let mut dec = HeaderDecoder::new();
        dec.decode(b"Content-Type: text/plain\r\n\r\n", &cfg())
            .unwrap();
        assert_eq!(dec.map().get_first("CONTENT-TYPE"), Some("text/plain"));
        assert_eq!(dec.map().raw[0].0, "Content-Type");
    }

    #[test]
    #[should_panic]
    fn decode_after_done_panics() {
        let mut dec = HeaderDecoder::new();
        dec.decode(b"Host: h\r\n\r\n", &cfg()).unwrap();
        let _ = dec.decode(b"more", &cfg());
    }
}
